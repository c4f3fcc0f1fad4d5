use std::path::PathBuf;
use std::sync::Arc;

use mt_core::{page_reference, AssetLocation};
use regex::{Captures, Regex};

use crate::download::{AssetRequest, AssetSink};

/// Extensions treated as links to other pages of the old blog.
const PAGE_EXTENSIONS: &[&str] = &["html", "htm", "php"];

/// Rewrites absolute URLs pointing at the old blog host.
///
/// Page links become `{root_path}{path}/`. Images are scheduled for download
/// and replaced by `{root_path}/{assets}{dir}/{file}`. Everything else is
/// left as is.
pub struct AssetRewriter {
    pattern: Regex,
    root_path: String,
    assets: String,
    source_dir: PathBuf,
    sink: Arc<dyn AssetSink>,
}

impl AssetRewriter {
    pub fn new(
        host: &str,
        root_path: impl Into<String>,
        assets: impl Into<String>,
        source_dir: impl Into<PathBuf>,
        sink: Arc<dyn AssetSink>,
    ) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(
            r#"https?://{}(/[^\s^"]*?)\.(html?|jpe?g|png|gif|php)"#,
            regex::escape(host)
        ))?;
        Ok(Self {
            pattern,
            root_path: root_path.into(),
            assets: assets.into(),
            source_dir: source_dir.into(),
            sink,
        })
    }

    /// Single pass over `text`; downloads are scheduled as matches are found.
    pub fn rewrite(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, |caps: &Captures| self.replace(caps))
            .into_owned()
    }

    fn replace(&self, caps: &Captures) -> String {
        let matched = &caps[0];
        if PAGE_EXTENSIONS.contains(&&caps[2]) {
            return page_reference(&self.root_path, &caps[1]);
        }
        let Some(location) = AssetLocation::from_url(matched) else {
            return matched.to_string();
        };
        self.sink.schedule(AssetRequest {
            url: location.url.clone(),
            dest_dir: location.local_dir(&self.source_dir, &self.assets),
            file_name: location.file_name.clone(),
        });
        location.local_reference(&self.root_path, &self.assets)
    }
}
