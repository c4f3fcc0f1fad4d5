use std::path::Path;
use std::sync::{Arc, Mutex};

use mt_engine::{AssetRequest, AssetRewriter, AssetSink};
use pretty_assertions::assert_eq;

#[derive(Default)]
struct RecordingSink {
    requests: Mutex<Vec<AssetRequest>>,
}

impl RecordingSink {
    fn take(&self) -> Vec<AssetRequest> {
        self.requests.lock().unwrap().drain(..).collect()
    }
}

impl AssetSink for RecordingSink {
    fn schedule(&self, request: AssetRequest) {
        self.requests.lock().unwrap().push(request);
    }
}

fn rewriter(sink: Arc<RecordingSink>) -> AssetRewriter {
    AssetRewriter::new("example.com", "/blog/", "assets", "site", sink).unwrap()
}

#[test]
fn page_links_become_site_paths() {
    let sink = Arc::new(RecordingSink::default());
    let rewriter = rewriter(sink.clone());

    let out = rewriter.rewrite(r#"<a href="https://example.com/old/post.html">x</a>"#);
    assert_eq!(out, r#"<a href="/blog//old/post/">x</a>"#);
    assert_eq!(
        rewriter.rewrite("see http://example.com/cgi/view.php?id=1"),
        "see /blog//cgi/view/?id=1"
    );
    assert!(sink.take().is_empty());
}

#[test]
fn images_are_localized_and_scheduled_once() {
    let sink = Arc::new(RecordingSink::default());
    let rewriter = rewriter(sink.clone());

    let out = rewriter.rewrite(r#"<img src="https://example.com/img/a.png">"#);
    assert_eq!(out, r#"<img src="/blog//assets/img/a.png">"#);
    assert_eq!(
        sink.take(),
        vec![AssetRequest {
            url: "https://example.com/img/a.png".to_string(),
            dest_dir: Path::new("site").join("assets").join("img"),
            file_name: "a.png".to_string(),
        }]
    );
}

#[test]
fn every_occurrence_schedules_a_download() {
    let sink = Arc::new(RecordingSink::default());
    let rewriter = rewriter(sink.clone());

    let text = "https://example.com/a.jpg and https://example.com/b/c.JPEG and https://example.com/d.gif";
    let out = rewriter.rewrite(text);
    assert_eq!(
        out,
        "/blog//assets//a.jpg and https://example.com/b/c.JPEG and /blog//assets//d.gif"
    );
    let urls: Vec<_> = sink.take().into_iter().map(|r| r.url).collect();
    assert_eq!(
        urls,
        vec!["https://example.com/a.jpg", "https://example.com/d.gif"]
    );
}

#[test]
fn other_hosts_are_untouched() {
    let sink = Arc::new(RecordingSink::default());
    let rewriter = rewriter(sink.clone());

    let text = "https://cdn.example.org/img/a.png https://example.com/feed.xml";
    assert_eq!(rewriter.rewrite(text), text);
    assert!(sink.take().is_empty());
}
