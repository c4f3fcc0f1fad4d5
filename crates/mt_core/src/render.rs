use std::fmt::Write;

use crate::escape::escape_title;
use crate::post::Post;

/// Hexo's "read more" divider.
pub const MORE_MARKER: &str = "<!-- more -->";

/// Characters of body text after which the divider is placed when the post
/// has no extended body. A heuristic for "first paragraph", not a content
/// boundary.
pub const TEASER_THRESHOLD: usize = 100;

/// Assemble the final document: front matter, body, and the divider followed
/// by the extended body when there is one.
///
/// `body` and `extended` are already converted Markdown. Whether the post has
/// an extended body is decided by the caller on the source HTML; `Some` always
/// gets the divider, even when the converted text came out empty.
pub fn render_document(post: &Post, body: &str, extended: Option<&str>) -> String {
    let mut doc = front_matter(post);

    match extended {
        Some(extended) => {
            doc.push_str(body);
            doc.push('\n');
            doc.push_str(MORE_MARKER);
            doc.push('\n');
            doc.push_str(extended);
        }
        None => push_with_teaser(&mut doc, body),
    }
    doc
}

fn front_matter(post: &Post) -> String {
    let mut out = String::from("---\n");
    let _ = writeln!(out, "title: {}", escape_title(&post.title));
    let _ = writeln!(out, "date: {}", post.date.to_iso_string());
    if !post.categories.is_empty() {
        out.push_str("categories:\n");
        for category in &post.categories {
            let _ = writeln!(out, "- {category}");
        }
    }
    if !post.tags.is_empty() {
        out.push_str("tags:\n");
        for tag in &post.tags {
            let _ = writeln!(out, "- {tag}");
        }
    }
    out.push_str("---\n");
    out
}

fn push_with_teaser(doc: &mut String, body: &str) {
    let mut count = 0usize;
    let mut inserted = false;
    for line in body.split('\n') {
        doc.push_str(line);
        doc.push('\n');
        count += line.chars().count();
        if !inserted && count > TEASER_THRESHOLD {
            doc.push('\n');
            doc.push_str(MORE_MARKER);
            doc.push('\n');
            inserted = true;
        }
    }
}
