use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, TimeDelta, TimeZone, Utc,
};

use crate::record::PostRecord;

/// Naive timestamp layouts accepted in the `DATE` field, tried in order.
const NAIVE_FORMATS: &[&str] = &[
    "%m/%d/%Y %I:%M:%S %p",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Parsed `DATE` field of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostDate {
    Valid(DateTime<FixedOffset>),
    Invalid,
}

impl PostDate {
    /// Parse a raw date. Timestamps without an offset are read as wall-clock
    /// time in `tz`.
    pub fn parse<Tz: TimeZone>(raw: &str, tz: &Tz) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return PostDate::Invalid;
        }
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return PostDate::Valid(parsed);
        }
        let naive = NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            });
        naive
            .and_then(|naive| resolve_local(tz, naive))
            .map(|local| PostDate::Valid(local.fixed_offset()))
            .unwrap_or(PostDate::Invalid)
    }

    /// `YYYY/MM` directory partition in the post's own offset.
    pub fn partition(&self) -> String {
        match self {
            PostDate::Valid(date) => date.format("%Y/%m").to_string(),
            PostDate::Invalid => "Invalid date".to_string(),
        }
    }

    /// UTC ISO-8601 timestamp with milliseconds, or `null` when unparseable.
    pub fn to_iso_string(&self) -> String {
        match self {
            PostDate::Valid(date) => date
                .with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            PostDate::Invalid => "null".to_string(),
        }
    }
}

/// Wall-clock times skipped by a daylight-saving change move forward past the gap.
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + TimeDelta::hours(1))).earliest())
}

/// Publication bucket a post is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicationState {
    Published,
    Draft,
}

impl PublicationState {
    pub fn from_status(status: Option<&str>) -> Self {
        match status {
            Some("Publish") => PublicationState::Published,
            _ => PublicationState::Draft,
        }
    }

    pub fn bucket(&self) -> &'static str {
        match self {
            PublicationState::Published => "_posts",
            PublicationState::Draft => "_drafts",
        }
    }
}

/// A post assembled from one export record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub date: PostDate,
    pub state: PublicationState,
    pub basename: String,
    pub title: String,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub body_html: String,
    pub extended_body_html: String,
}

impl Post {
    pub fn from_record<Tz: TimeZone>(record: PostRecord, tz: &Tz) -> Self {
        let meta = &record.metadata;
        let date = PostDate::parse(meta.get("DATE").unwrap_or_default(), tz);
        let state = PublicationState::from_status(meta.get("STATUS"));
        let basename = meta.get("BASENAME").unwrap_or_default().to_string();
        let title = meta.get("TITLE").unwrap_or_default().to_string();
        let tags = split_tags(meta.get("TAGS").unwrap_or_default());
        let categories = meta.categories().to_vec();

        Self {
            date,
            state,
            basename,
            title,
            categories,
            tags,
            body_html: record.body,
            extended_body_html: record.extended_body,
        }
    }

    pub fn has_basename(&self) -> bool {
        !self.basename.is_empty()
    }
}

/// Tags are comma separated and kept untrimmed.
fn split_tags(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(',').map(ToOwned::to_owned).collect()
}
