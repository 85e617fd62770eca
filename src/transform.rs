//! Core transformation from the raw listings document to the CSV feed.
//!
//! Everything in here is pure string and JSON work. Callers hand in the blob
//! text and get CSV back; fetching and serving live elsewhere.

use metrics::counter;
use tracing::{error, info, warn};

use crate::constants::{CSV_HEADER, MULTIPLE_LOCATIONS, STALE_AFTER_DAYS};
use crate::error::Result;
use crate::types::{CsvRow, JobRecord, ListingsDocument, SkippedRecord};

/// Outcome of transforming one listings document.
#[derive(Debug, Clone, Default)]
pub struct TransformReport {
    pub rows: Vec<CsvRow>,
    pub skipped: Vec<SkippedRecord>,
}

/// Transform the raw listings blob into the CSV feed.
///
/// This never fails: a document that does not decode degrades to a
/// header-only feed, and individual bad records are skipped.
pub fn transform(json_text: &str) -> String {
    render_csv(&transform_report(json_text).rows)
}

/// Like [`transform`], but keeps the derived rows and skip reasons around
/// for callers that report on the run.
pub fn transform_report(json_text: &str) -> TransformReport {
    counter!("feed_transform_docs_total").increment(1);
    match serde_json::from_str::<ListingsDocument>(json_text) {
        Ok(document) => transform_document(&document),
        Err(e) => {
            counter!("feed_transform_doc_parse_errors_total").increment(1);
            warn!("listings document did not decode, serving header only: {e}");
            TransformReport::default()
        }
    }
}

fn transform_document(document: &ListingsDocument) -> TransformReport {
    match &document.last_updated {
        Some(stamp) => {
            info!("job listings last updated {stamp}");
            warn_if_stale(stamp);
        }
        None => info!("job listings document carries no lastUpdated stamp"),
    }

    let mut report = TransformReport::default();
    for (index, raw) in document.jobs.iter().enumerate() {
        match derive_row(index, raw) {
            Ok(row) => report.rows.push(row),
            Err(e) => {
                error!("error parsing job #{index}: {e}");
                counter!("feed_records_skipped_total").increment(1);
                report.skipped.push(SkippedRecord {
                    index,
                    reason: e.to_string(),
                });
            }
        }
    }
    counter!("feed_rows_emitted_total").increment(report.rows.len() as u64);
    report
}

/// Render rows under the fixed header. Every line ends with `\n` and no
/// field is quoted, so commas in titles are replaced before this point.
pub fn render_csv(rows: &[CsvRow]) -> String {
    let mut out = String::new();
    out.push_str(CSV_HEADER);
    out.push('\n');
    for row in rows {
        out.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            row.number, row.posted_date, row.title, row.location, row.discipline, row.level, row.url
        ));
    }
    out
}

/// Decode one raw job record and derive its display columns. The row keeps
/// the record's position in the input array as its Number.
fn derive_row(index: usize, raw: &serde_json::Value) -> Result<CsvRow> {
    let job: JobRecord = serde_json::from_value(raw.clone())?;
    let location = derive_location(&job);
    let discipline = derive_discipline(&job);
    let level = derive_level(&job.title);
    Ok(CsvRow {
        number: index,
        posted_date: job.posted_date,
        title: job.title.replace(',', "-"),
        location,
        discipline,
        level,
        url: job.url,
    })
}

/// Location column: the country, unless the posting names exactly one city
/// and that city is not the upstream "Multiple Locations" placeholder.
fn derive_location(job: &JobRecord) -> String {
    if job.multi_location_array.len() == 1 && job.city != MULTIPLE_LOCATIONS {
        job.city.clone()
    } else {
        job.country.clone()
    }
}

/// Discipline column: title keywords win over the stored subCategory.
/// Matching is case sensitive and matches substrings anywhere in the title.
fn derive_discipline(job: &JobRecord) -> String {
    if job.title.contains("Product Manage") || job.title.contains("Program Manage") {
        "Program Management".to_string()
    } else if job.title.contains("Research Scien") {
        "Data Science".to_string()
    } else {
        job.sub_category.clone()
    }
}

/// Level column, matched case-insensitively against the title. The checks
/// run in order and the last hit wins, so "Principal Team Lead" lands on
/// Principal rather than Senior.
fn derive_level(title: &str) -> String {
    let folded = title.to_lowercase();
    let mut level = "Entry Level";
    if folded.contains("lead") {
        level = "Senior";
    }
    if folded.starts_with("senior") || folded.starts_with("sr") {
        level = "Senior";
    }
    if folded.starts_with("principal") || folded.starts_with("chief of staff") {
        level = "Principal";
    }
    level.to_string()
}

fn warn_if_stale(stamp: &str) {
    // Stamps that are not RFC 3339 just skip the check.
    if let Ok(updated) = chrono::DateTime::parse_from_rfc3339(stamp) {
        let age = chrono::Utc::now().signed_duration_since(updated.with_timezone(&chrono::Utc));
        if age.num_days() >= STALE_AFTER_DAYS {
            warn!(
                "job listings are {} days old (last updated {stamp})",
                age.num_days()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_job() -> serde_json::Value {
        json!({
            "title": "Software Engineer",
            "country": "United States",
            "city": "Seattle",
            "multi_location_array": ["Seattle"],
            "subCategory": "Engineering",
            "postedDate": "2025-08-01",
            "url": "https://jobs.example.com/1001"
        })
    }

    fn doc_with_jobs(jobs: Vec<serde_json::Value>) -> String {
        json!({ "lastUpdated": "2025-08-20T07:00:00Z", "jobs": jobs }).to_string()
    }

    #[test]
    fn test_full_document_renders_expected_rows() {
        let mut second = sample_job();
        second["title"] = json!("Senior Product Manager, Growth");
        second["country"] = json!("Canada");
        second["city"] = json!("Multiple Locations");
        second["multi_location_array"] = json!(["Toronto", "Vancouver"]);
        second["subCategory"] = json!("Product");
        second["postedDate"] = json!("2025-07-15");
        second["url"] = json!("https://jobs.example.com/1002");

        let csv = transform(&doc_with_jobs(vec![sample_job(), second]));

        let expected = "Number,PostedDate,Title,Location,Discipline,Level,JobPostingUrl\n\
            0,2025-08-01,Software Engineer,Seattle,Engineering,Entry Level,https://jobs.example.com/1001\n\
            1,2025-07-15,Senior Product Manager- Growth,Canada,Program Management,Senior,https://jobs.example.com/1002\n";
        assert_eq!(csv, expected);
    }

    #[test]
    fn test_row_numbers_keep_input_positions_when_a_record_is_skipped() {
        let mut broken = sample_job();
        broken.as_object_mut().unwrap().remove("country");

        let report =
            transform_report(&doc_with_jobs(vec![sample_job(), broken, sample_job()]));

        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].number, 0);
        assert_eq!(report.rows[1].number, 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].index, 1);
        assert!(!report.skipped[0].reason.is_empty());
    }

    #[test]
    fn test_wrong_typed_field_skips_only_that_record() {
        let mut broken = sample_job();
        broken["country"] = json!(42);

        let report = transform_report(&doc_with_jobs(vec![broken, sample_job()]));

        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].number, 1);
        assert_eq!(report.skipped[0].index, 0);
    }

    #[test]
    fn test_malformed_document_serves_header_only() {
        let header_only = "Number,PostedDate,Title,Location,Discipline,Level,JobPostingUrl\n";
        assert_eq!(transform("not json at all"), header_only);
        assert_eq!(transform("[1,2,3]"), header_only);
    }

    #[test]
    fn test_document_without_jobs_array_serves_header_only() {
        let text = json!({ "lastUpdated": "2025-08-20T07:00:00Z" }).to_string();
        assert_eq!(
            transform(&text),
            "Number,PostedDate,Title,Location,Discipline,Level,JobPostingUrl\n"
        );
    }

    #[test]
    fn test_missing_last_updated_still_emits_rows() {
        let text = json!({ "jobs": [sample_job()] }).to_string();
        let report = transform_report(&text);
        assert_eq!(report.rows.len(), 1);
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn test_empty_jobs_array_serves_header_only() {
        assert_eq!(
            transform(&doc_with_jobs(vec![])),
            "Number,PostedDate,Title,Location,Discipline,Level,JobPostingUrl\n"
        );
    }

    #[test]
    fn test_location_prefers_a_single_real_city() {
        let mut job = sample_job();
        job["city"] = json!("Remote");
        job["multi_location_array"] = json!(["Remote"]);
        let report = transform_report(&doc_with_jobs(vec![job]));
        assert_eq!(report.rows[0].location, "Remote");
    }

    #[test]
    fn test_location_placeholder_city_falls_back_to_country() {
        let mut job = sample_job();
        job["city"] = json!("Multiple Locations");
        job["multi_location_array"] = json!(["Multiple Locations"]);
        let report = transform_report(&doc_with_jobs(vec![job]));
        assert_eq!(report.rows[0].location, "United States");
    }

    #[test]
    fn test_location_multiple_entries_fall_back_to_country() {
        let mut job = sample_job();
        job["multi_location_array"] = json!(["Seattle", "Toronto"]);
        let report = transform_report(&doc_with_jobs(vec![job]));
        assert_eq!(report.rows[0].location, "United States");

        let mut job = sample_job();
        job["multi_location_array"] = json!([]);
        let report = transform_report(&doc_with_jobs(vec![job]));
        assert_eq!(report.rows[0].location, "United States");
    }

    #[test]
    fn test_discipline_title_keywords_beat_subcategory() {
        let mut job = sample_job();
        job["title"] = json!("Senior Program Manager");
        let report = transform_report(&doc_with_jobs(vec![job]));
        assert_eq!(report.rows[0].discipline, "Program Management");

        let mut job = sample_job();
        job["title"] = json!("Research Scientist, Vision");
        let report = transform_report(&doc_with_jobs(vec![job]));
        assert_eq!(report.rows[0].discipline, "Data Science");
    }

    #[test]
    fn test_discipline_matching_is_case_sensitive() {
        let mut job = sample_job();
        job["title"] = json!("senior product manager");
        job["subCategory"] = json!("Product");
        let report = transform_report(&doc_with_jobs(vec![job]));
        assert_eq!(report.rows[0].discipline, "Product");
    }

    #[test]
    fn test_level_overrides_run_in_order() {
        assert_eq!(derive_level("Software Engineer"), "Entry Level");
        assert_eq!(derive_level("Team Lead"), "Senior");
        assert_eq!(derive_level("Head of Thought Leadership"), "Senior");
        assert_eq!(derive_level("Senior Engineer"), "Senior");
        assert_eq!(derive_level("Sr. Staff Engineer"), "Senior");
        assert_eq!(derive_level("SENIOR ENGINEER"), "Senior");
        assert_eq!(derive_level("Senior Lead Engineer"), "Senior");
        assert_eq!(derive_level("Principal Engineer"), "Principal");
        assert_eq!(derive_level("Principal Lead Engineer"), "Principal");
        assert_eq!(derive_level("Principal Team Lead"), "Principal");
        assert_eq!(derive_level("Chief of Staff"), "Principal");
        assert_eq!(derive_level("chief of staff to the CEO"), "Principal");
    }

    #[test]
    fn test_commas_in_titles_become_hyphens_without_quoting() {
        let mut job = sample_job();
        job["title"] = json!("Manager, Data, Platform");
        let csv = transform(&doc_with_jobs(vec![job]));

        let row = csv.lines().nth(1).unwrap();
        assert!(row.contains("Manager- Data- Platform"));
        assert!(!row.contains('"'));
        assert_eq!(row.split(',').count(), 7);
    }

    #[test]
    fn test_transform_is_deterministic() {
        let text = doc_with_jobs(vec![sample_job(), sample_job()]);
        assert_eq!(transform(&text), transform(&text));
    }
}
