use serde::Deserialize;

/// Envelope of the listings blob: an update stamp plus the job array.
/// Jobs stay raw `Value`s at this level so one malformed record cannot
/// fail decoding of the whole document.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingsDocument {
    #[serde(rename = "lastUpdated", default)]
    pub last_updated: Option<String>,
    pub jobs: Vec<serde_json::Value>,
}

/// A job record as the upstream scraper stores it. Serde names follow the
/// JSON document where they differ from Rust convention. The location array
/// stays untyped because only its length matters.
#[derive(Debug, Clone, Deserialize)]
pub struct JobRecord {
    pub title: String,
    pub country: String,
    pub city: String,
    pub multi_location_array: Vec<serde_json::Value>,
    #[serde(rename = "subCategory")]
    pub sub_category: String,
    #[serde(rename = "postedDate")]
    pub posted_date: String,
    pub url: String,
}

/// One derived row of the feed, one field per output column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    pub number: usize,
    pub posted_date: String,
    pub title: String,
    pub location: String,
    pub discipline: String,
    pub level: String,
    pub url: String,
}

/// A record that failed to decode, remembered by its position in the input.
#[derive(Debug, Clone)]
pub struct SkippedRecord {
    pub index: usize,
    pub reason: String,
}
