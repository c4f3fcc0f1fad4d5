//! mt2hexo core: pure parsing and rendering of Movable Type export records.
mod escape;
mod paths;
mod post;
mod record;
mod render;

pub use escape::{escape_percent, escape_title};
pub use paths::{page_reference, post_relative_path, AssetLocation};
pub use post::{Post, PostDate, PublicationState};
pub use record::{split_export, Metadata, PostRecord, RECORD_DELIMITER, SECTION_DELIMITER};
pub use render::{render_document, MORE_MARKER, TEASER_THRESHOLD};
