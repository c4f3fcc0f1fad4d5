//! mt2hexo engine: HTML conversion, asset downloads and post file output.
mod convert;
mod download;
mod fetch;
mod persist;
mod pipeline;
mod rewrite;
mod types;

pub use convert::{Converter, ConverterOptions, Html2MdConverter, PostConverter};
pub use download::{AssetRequest, AssetSink, DownloadQueue, DownloadStats};
pub use fetch::{AssetFetcher, FetchSettings, ReqwestAssetFetcher};
pub use persist::{ensure_output_dir, PersistError, PostWriter, WriteOutcome};
pub use pipeline::{
    load_export, MigrateConfig, Pipeline, PipelineError, RecordOutcome, RunSummary,
    DEFAULT_ASSETS_DIR, DEFAULT_ROOT_PATH,
};
pub use rewrite::AssetRewriter;
pub use types::{FailureKind, FetchError};
