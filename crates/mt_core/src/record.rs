use std::collections::HashMap;

/// Line separating two posts in an export document.
pub const RECORD_DELIMITER: &str = "--------";
/// Line separating the sections of a single post.
pub const SECTION_DELIMITER: &str = "-----";

const CATEGORY_KEY: &str = "CATEGORY";

/// Split an export document into raw post records.
///
/// Records are separated by lines consisting of exactly eight dashes. The
/// trailing fragment after the last delimiter is returned as well; it usually
/// holds no metadata and is skipped downstream.
pub fn split_export(text: &str) -> Vec<String> {
    split_on_line(text, RECORD_DELIMITER)
}

fn split_on_line(text: &str, delimiter: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    for line in text.split('\n') {
        if line.trim_end_matches('\r') == delimiter {
            parts.push(std::mem::take(&mut current));
            continue;
        }
        current.push_str(line);
        current.push('\n');
    }
    // The last line had no newline of its own in the input.
    if current.ends_with('\n') {
        current.pop();
    }
    parts.push(current);
    parts
}

/// One post's raw sections, in export order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostRecord {
    pub metadata: Metadata,
    pub body: String,
    pub extended_body: String,
    pub excerpt: String,
    pub keywords: String,
}

impl PostRecord {
    /// Parse a raw record. Missing sections become empty strings; sections
    /// after the keywords (comments, pings) are ignored.
    pub fn parse(raw: &str) -> Self {
        let mut sections = split_on_line(raw, SECTION_DELIMITER).into_iter();
        let mut next = || sections.next().unwrap_or_default();

        let metadata = Metadata::parse(&next());
        let body = strip_marker(&next(), "BODY:");
        let extended_body = strip_marker(&next(), "EXTENDED BODY:");
        let excerpt = strip_marker(&next(), "EXCERPT:");
        let keywords = strip_marker(&next(), "KEYWORDS:");

        Self {
            metadata,
            body,
            extended_body,
            excerpt,
            keywords,
        }
    }
}

fn strip_marker(section: &str, marker: &str) -> String {
    let trimmed = section.trim_start_matches(['\n', '\r']);
    match trimmed.strip_prefix(marker) {
        Some(rest) => rest
            .strip_prefix("\r\n")
            .or_else(|| rest.strip_prefix('\n'))
            .unwrap_or(rest)
            .to_string(),
        None => section.to_string(),
    }
}

/// Field map of a record's metadata section.
///
/// `CATEGORY` accumulates in order of appearance; every other key keeps the
/// last value seen. Unknown keys are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    fields: HashMap<String, String>,
    categories: Vec<String>,
}

impl Metadata {
    pub fn parse(block: &str) -> Self {
        let mut meta = Self::default();
        for line in block.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let (key, value) = match line.split_once(':') {
                Some((key, value)) => (key, value.trim()),
                None => (line.trim_end_matches('\r'), ""),
            };
            meta.insert(key, value);
        }
        meta
    }

    pub fn insert(&mut self, key: &str, value: &str) {
        if key == CATEGORY_KEY {
            self.categories.push(value.to_string());
        } else {
            self.fields.insert(key.to_string(), value.to_string());
        }
    }

    /// Value of a single-valued field, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }
}
