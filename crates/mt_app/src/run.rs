use std::sync::Arc;

use anyhow::Context;
use mt_engine::{
    load_export, AssetRewriter, DownloadQueue, FetchSettings, Pipeline, PostConverter,
    ReqwestAssetFetcher, RunSummary,
};
use mt_logging::{mt_info, mt_warn};

use crate::cli::Cli;
use crate::settings::{FileSettings, Settings};

/// Run one migration: convert every record, then settle the asset downloads.
pub fn run(cli: &Cli) -> anyhow::Result<RunSummary> {
    let file = FileSettings::load(cli.config.as_deref(), &cli.source_dir)?;
    let Settings { config, converter } = Settings::resolve(cli, file);

    let export = load_export(&cli.export_file, &config)?;
    mt_info!(
        "Converting {:?} into {:?} (host {:?}, assets {:?}, root path {:?})",
        cli.export_file,
        config.source_dir,
        config.host,
        config.assets,
        config.root_path
    );

    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    let fetcher = Arc::new(ReqwestAssetFetcher::new(FetchSettings::default()));
    let queue = Arc::new(DownloadQueue::new(fetcher, runtime.handle().clone()));

    let rewriter = match config.host.as_deref() {
        Some(host) => Some(
            AssetRewriter::new(
                host,
                config.root_path.clone(),
                config.assets.clone(),
                config.source_dir.clone(),
                queue.clone(),
            )
            .context("invalid host pattern")?,
        ),
        None => {
            mt_warn!("No host given; URLs are left unchanged and no assets are downloaded");
            None
        }
    };

    let pipeline = Pipeline::new(
        config,
        Box::new(PostConverter::new(converter)),
        rewriter,
        chrono::Local,
    );
    let result = pipeline.run(&export);

    if cli.detach_downloads {
        mt_info!(
            "Not waiting for {} asset downloads still in flight",
            queue.in_flight()
        );
        runtime.shutdown_background();
    } else {
        let stats = runtime.block_on(queue.drain());
        mt_info!(
            "Asset downloads: {} scheduled, {} completed, {} failed",
            stats.scheduled,
            stats.completed,
            stats.failed
        );
    }

    Ok(result?)
}
