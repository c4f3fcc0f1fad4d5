use std::fs;
use std::path::{Path, PathBuf};

use mt_engine::{ConverterOptions, MigrateConfig, DEFAULT_ASSETS_DIR, DEFAULT_ROOT_PATH};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::Cli;

const SETTINGS_FILENAME: &str = "mt2hexo.ron";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings from {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse settings from {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

/// Optional settings file; command-line flags take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSettings {
    pub host: Option<String>,
    pub assets: Option<String>,
    pub root_path: Option<String>,
    pub skip_draft: Option<bool>,
    pub fence: Option<String>,
}

impl FileSettings {
    /// Load the explicit settings file, or `<source_dir>/mt2hexo.ron` if present.
    pub fn load(explicit: Option<&Path>, source_dir: &Path) -> Result<Self, SettingsError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = source_dir.join(SETTINGS_FILENAME);
                if !candidate.is_file() {
                    return Ok(Self::default());
                }
                candidate
            }
        };
        let content = fs::read_to_string(&path).map_err(|source| SettingsError::Read {
            path: path.clone(),
            source,
        })?;
        ron::from_str(&content).map_err(|source| SettingsError::Parse { path, source })
    }
}

/// Effective settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub config: MigrateConfig,
    pub converter: ConverterOptions,
}

impl Settings {
    pub fn resolve(cli: &Cli, file: FileSettings) -> Self {
        let mut config = MigrateConfig::default_with_source(cli.source_dir.clone());
        config.host = cli.host.clone().or(file.host);
        config.assets = cli
            .assets
            .clone()
            .or(file.assets)
            .unwrap_or_else(|| DEFAULT_ASSETS_DIR.to_string());
        config.root_path = cli
            .root_path
            .clone()
            .or(file.root_path)
            .unwrap_or_else(|| DEFAULT_ROOT_PATH.to_string());
        config.skip_draft = cli.skip_draft || file.skip_draft.unwrap_or(false);

        let mut converter = ConverterOptions::default();
        if let Some(fence) = file.fence {
            converter.fence = fence;
        }
        Self { config, converter }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        let mut full = vec!["mt2hexo", "export.txt", "site"];
        full.extend_from_slice(args);
        Cli::try_parse_from(full).unwrap()
    }

    #[test]
    fn defaults_apply_without_flags_or_file() {
        let settings = Settings::resolve(&cli(&[]), FileSettings::default());
        assert_eq!(settings.config, MigrateConfig::default_with_source("site"));
        assert_eq!(settings.converter.fence, "```");
    }

    #[test]
    fn flags_override_file_values() {
        let file = FileSettings {
            host: Some("old.example.com".into()),
            assets: Some("images".into()),
            root_path: Some("/".into()),
            skip_draft: Some(true),
            fence: Some("~~~".into()),
        };
        let settings = Settings::resolve(&cli(&["--host", "new.example.com"]), file);
        assert_eq!(settings.config.host.as_deref(), Some("new.example.com"));
        assert_eq!(settings.config.assets, "images");
        assert_eq!(settings.config.root_path, "/");
        assert!(settings.config.skip_draft);
        assert_eq!(settings.converter.fence, "~~~");
    }

    #[test]
    fn settings_file_is_found_in_source_dir() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(SETTINGS_FILENAME),
            "(host: Some(\"example.com\"), skip_draft: Some(true))",
        )
        .unwrap();
        let file = FileSettings::load(None, temp.path()).unwrap();
        assert_eq!(file.host.as_deref(), Some("example.com"));
        assert_eq!(file.skip_draft, Some(true));
        assert_eq!(file.assets, None);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let explicit = temp.path().join("absent.ron");
        assert!(matches!(
            FileSettings::load(Some(&explicit), temp.path()),
            Err(SettingsError::Read { .. })
        ));
        assert_eq!(
            FileSettings::load(None, temp.path()).unwrap(),
            FileSettings::default()
        );
    }
}
