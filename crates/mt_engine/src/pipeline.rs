use std::fs;
use std::path::{Path, PathBuf};

use chrono::TimeZone;
use mt_core::{
    post_relative_path, render_document, split_export, Post, PostRecord, PublicationState,
};
use mt_logging::{mt_debug, mt_error, mt_info};
use thiserror::Error;

use crate::convert::Converter;
use crate::persist::{ensure_output_dir, PersistError, PostWriter, WriteOutcome};
use crate::rewrite::AssetRewriter;

pub const DEFAULT_ASSETS_DIR: &str = "assets";
pub const DEFAULT_ROOT_PATH: &str = "/blog/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrateConfig {
    /// Site source directory; posts go under `_posts`/`_drafts` in here.
    pub source_dir: PathBuf,
    /// Host of the old blog. Without it no URL is rewritten.
    pub host: Option<String>,
    /// Assets directory, relative to `source_dir`.
    pub assets: String,
    /// Site root path used in rewritten links.
    pub root_path: String,
    pub skip_draft: bool,
}

impl MigrateConfig {
    pub fn default_with_source(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            host: None,
            assets: DEFAULT_ASSETS_DIR.to_string(),
            root_path: DEFAULT_ROOT_PATH.to_string(),
            skip_draft: false,
        }
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.source_dir.join(&self.assets)
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("export file {0:?} does not exist")]
    ExportMissing(PathBuf),
    #[error("source directory {0:?} does not exist")]
    SourceDirMissing(PathBuf),
    #[error("failed to read export file {path:?}: {source}")]
    ReadExport {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("record {index} failed: {source}")]
    Record { index: usize, source: PersistError },
}

/// Result of processing one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    SkippedNoBasename,
    SkippedDraft,
    SkippedExisting(PathBuf),
    Written(PathBuf),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub written: Vec<PathBuf>,
    pub skipped_existing: usize,
    pub skipped_draft: usize,
    pub skipped_no_basename: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: RecordOutcome) {
        match outcome {
            RecordOutcome::Written(path) => self.written.push(path),
            RecordOutcome::SkippedExisting(_) => self.skipped_existing += 1,
            RecordOutcome::SkippedDraft => self.skipped_draft += 1,
            RecordOutcome::SkippedNoBasename => self.skipped_no_basename += 1,
        }
    }

    pub fn processed(&self) -> usize {
        self.written.len() + self.skipped_existing + self.skipped_draft + self.skipped_no_basename
    }
}

/// Check the inputs, create the assets directory and read the export.
pub fn load_export(export_file: &Path, config: &MigrateConfig) -> Result<String, PipelineError> {
    if !export_file.is_file() {
        return Err(PipelineError::ExportMissing(export_file.to_path_buf()));
    }
    let text = fs::read_to_string(export_file).map_err(|source| PipelineError::ReadExport {
        path: export_file.to_path_buf(),
        source,
    })?;
    if !config.source_dir.is_dir() {
        return Err(PipelineError::SourceDirMissing(config.source_dir.clone()));
    }
    ensure_output_dir(&config.assets_dir())?;
    Ok(text)
}

/// Turns export records into post files, one record at a time.
///
/// Naive `DATE` values are read in `tz`.
pub struct Pipeline<Tz: TimeZone> {
    config: MigrateConfig,
    converter: Box<dyn Converter>,
    rewriter: Option<AssetRewriter>,
    writer: PostWriter,
    tz: Tz,
}

impl<Tz: TimeZone> Pipeline<Tz> {
    pub fn new(
        config: MigrateConfig,
        converter: Box<dyn Converter>,
        rewriter: Option<AssetRewriter>,
        tz: Tz,
    ) -> Self {
        let writer = PostWriter::new(config.source_dir.clone());
        Self {
            config,
            converter,
            rewriter,
            writer,
            tz,
        }
    }

    /// Process every record in order. The first failing record aborts the run.
    pub fn run(&self, export: &str) -> Result<RunSummary, PipelineError> {
        let mut summary = RunSummary::default();
        for (index, raw) in split_export(export).iter().enumerate() {
            match self.process_record(raw) {
                Ok(outcome) => summary.record(outcome),
                Err(source) => {
                    mt_error!("Record {} failed, aborting: {}", index, source);
                    return Err(PipelineError::Record { index, source });
                }
            }
        }
        mt_info!(
            "Processed {} records: {} written, {} existing, {} drafts skipped, {} without basename",
            summary.processed(),
            summary.written.len(),
            summary.skipped_existing,
            summary.skipped_draft,
            summary.skipped_no_basename
        );
        Ok(summary)
    }

    pub fn process_record(&self, raw: &str) -> Result<RecordOutcome, PersistError> {
        let post = Post::from_record(PostRecord::parse(raw), &self.tz);

        if post.state == PublicationState::Draft && self.config.skip_draft {
            mt_debug!("Skipping draft {:?}", post.basename);
            return Ok(RecordOutcome::SkippedDraft);
        }
        if !post.has_basename() {
            mt_debug!("Skipping record without basename (title {:?})", post.title);
            return Ok(RecordOutcome::SkippedNoBasename);
        }

        let relative = post_relative_path(&post);
        match self.writer.write_if_absent(&relative, || self.render(&post))? {
            WriteOutcome::Written(path) => {
                mt_info!("Wrote {:?}", path);
                Ok(RecordOutcome::Written(path))
            }
            WriteOutcome::SkippedExisting(path) => {
                mt_debug!("Skipping existing {:?}", path);
                Ok(RecordOutcome::SkippedExisting(path))
            }
        }
    }

    fn render(&self, post: &Post) -> String {
        let body = self.convert(&post.body_html);
        let extended_html = post.extended_body_html.trim();
        let extended = if extended_html.is_empty() {
            None
        } else {
            Some(self.convert(extended_html))
        };
        render_document(post, &body, extended.as_deref())
    }

    fn convert(&self, html: &str) -> String {
        match &self.rewriter {
            Some(rewriter) => self.converter.to_markdown(&rewriter.rewrite(html)),
            None => self.converter.to_markdown(html),
        }
    }
}
