/// Shared string constants so the feed format is defined in one place

/// Header row of the CSV feed. Column order is part of the contract.
pub const CSV_HEADER: &str = "Number,PostedDate,Title,Location,Discipline,Level,JobPostingUrl";

/// City placeholder the upstream scraper emits when a posting has no single city.
pub const MULTIPLE_LOCATIONS: &str = "Multiple Locations";

// Where the listings blob lives unless config/env says otherwise
pub const DEFAULT_BUCKET: &str = "ddjobs";
pub const DEFAULT_OBJECT: &str = "currentjobs.json";

/// Age of the listings document, in days, past which a warning is logged.
pub const STALE_AFTER_DAYS: i64 = 7;
