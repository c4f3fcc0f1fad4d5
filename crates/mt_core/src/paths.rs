use std::path::{Path, PathBuf};

use url::Url;

use crate::post::Post;

/// Destination of a post relative to the site source directory:
/// `{bucket}/{YYYY}/{MM}/{basename}.md`.
pub fn post_relative_path(post: &Post) -> PathBuf {
    let mut path = PathBuf::from(post.state.bucket());
    for part in post.date.partition().split('/') {
        path.push(part);
    }
    path.push(format!("{}.md", post.basename));
    path
}

/// Site-relative link replacing a hosted page URL. `url_path` is the URL path
/// with its extension removed.
pub fn page_reference(root_path: &str, url_path: &str) -> String {
    format!("{root_path}{url_path}/")
}

/// Where a hosted asset is stored locally and how posts refer to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLocation {
    pub url: String,
    /// Directory part of the URL path, always starting with `/`.
    pub url_dir: String,
    pub file_name: String,
}

impl AssetLocation {
    /// Returns `None` when `raw_url` is not an absolute URL.
    pub fn from_url(raw_url: &str) -> Option<Self> {
        let parsed = Url::parse(raw_url).ok()?;
        let file_name = raw_url.rsplit('/').next().unwrap_or_default().to_string();
        let url_dir = dirname(parsed.path()).to_string();
        Some(Self {
            url: raw_url.to_string(),
            url_dir,
            file_name,
        })
    }

    /// Link written into the post: `{root_path}/{assets}{url_dir}/{file_name}`.
    pub fn local_reference(&self, root_path: &str, assets: &str) -> String {
        format!(
            "{root_path}/{assets}{dir}/{file}",
            dir = self.url_dir,
            file = self.file_name
        )
    }

    /// Directory the asset is downloaded into, under `source_dir`.
    pub fn local_dir(&self, source_dir: &Path, assets: &str) -> PathBuf {
        let mut dir = source_dir.join(assets);
        let relative = self.url_dir.trim_start_matches('/');
        if !relative.is_empty() {
            dir.push(relative);
        }
        dir
    }
}

fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(idx) => &path[..idx],
    }
}
