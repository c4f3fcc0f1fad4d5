use std::path::PathBuf;

use clap::Parser;

/// Convert a Movable Type export into Hexo posts.
#[derive(Debug, Parser)]
#[command(name = "mt2hexo", version)]
pub struct Cli {
    /// The Movable Type export file
    pub export_file: PathBuf,

    /// The Hexo source directory posts and assets are written into
    pub source_dir: PathBuf,

    /// Host of the old blog; its page and image URLs are rewritten
    #[arg(long)]
    pub host: Option<String>,

    /// Assets directory, relative to the source directory [default: assets]
    #[arg(long)]
    pub assets: Option<String>,

    /// Site root path used in rewritten links [default: /blog/]
    #[arg(long = "root-path", alias = "rootPath")]
    pub root_path: Option<String>,

    /// Do not write posts whose status is not Publish
    #[arg(long = "skip-draft", alias = "skipDraft")]
    pub skip_draft: bool,

    /// Exit without waiting for asset downloads to finish
    #[arg(long)]
    pub detach_downloads: bool,

    /// RON settings file [default: <source_dir>/mt2hexo.ron when present]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Also write the log to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log skipped records and scheduled downloads
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_flag_spellings_are_accepted() {
        let cli = Cli::try_parse_from([
            "mt2hexo",
            "export.txt",
            "source",
            "--host=example.com",
            "--rootPath=/",
            "--skipDraft",
        ])
        .unwrap();
        assert_eq!(cli.host.as_deref(), Some("example.com"));
        assert_eq!(cli.root_path.as_deref(), Some("/"));
        assert!(cli.skip_draft);
        assert!(cli.assets.is_none());
    }

    #[test]
    fn both_positionals_are_required() {
        assert!(Cli::try_parse_from(["mt2hexo", "export.txt"]).is_err());
    }
}
