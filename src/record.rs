//! Canonical activity records produced by the Sanitization Core.
//!
//! Every field is private. Records are built only by
//! [`RecordSanitizer`](crate::RecordSanitizer), so any `ActivityRecord` in
//! the program already satisfies the crate's invariants: non-negative
//! integer counters, scrubbed text, and a favicon that is either an allowed
//! URL or the sentinel.

use serde::{Serialize, Serializer};

/// Placeholder stored whenever a favicon is absent or unsafe.
pub const NO_FAVICON: &str = "no_favicon";

/// A favicon reference that passed URL sanitization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Favicon {
    /// An `http`/`https` (or otherwise allow-listed) URL, kept verbatim.
    Url(String),
    /// The sentinel: no usable favicon.
    Missing,
}

impl Favicon {
    /// Returns the stored form: the URL, or [`NO_FAVICON`].
    pub fn as_str(&self) -> &str {
        match self {
            Favicon::Url(url) => url,
            Favicon::Missing => NO_FAVICON,
        }
    }

    /// Returns `true` for the sentinel.
    pub fn is_missing(&self) -> bool {
        matches!(self, Favicon::Missing)
    }
}

impl Serialize for Favicon {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One day's contribution to an [`ActivityRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayRecord {
    date: String,
    summary: u64,
    counter: u64,
}

impl DayRecord {
    pub(crate) fn new(date: String, summary: u64, counter: u64) -> Self {
        Self {
            date,
            summary,
            counter,
        }
    }

    /// Scrubbed date label. Its format is owned by the caller.
    pub fn date(&self) -> &str {
        &self.date
    }

    /// Seconds spent on this day.
    pub fn summary(&self) -> u64 {
        self.summary
    }

    /// Visits on this day.
    pub fn counter(&self) -> u64 {
        self.counter
    }
}

/// Accumulated usage for one tracked domain or URL.
///
/// Serializes with the field names the storage layer expects:
///
/// ```
/// use activity_guard::sanitize_record;
/// use serde_json::json;
///
/// let record = sanitize_record(&json!({"url": "example.com", "summaryTime": 12.7}));
/// let stored = serde_json::to_value(&record).unwrap();
///
/// assert_eq!(
///     stored,
///     json!({
///         "url": "example.com",
///         "summaryTime": 12,
///         "counter": 0,
///         "favicon": "no_favicon",
///         "days": []
///     })
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    url: String,
    summary_time: u64,
    counter: u64,
    favicon: Favicon,
    days: Vec<DayRecord>,
}

impl ActivityRecord {
    pub(crate) fn new(
        url: String,
        summary_time: u64,
        counter: u64,
        favicon: Favicon,
        days: Vec<DayRecord>,
    ) -> Self {
        Self {
            url,
            summary_time,
            counter,
            favicon,
            days,
        }
    }

    /// Scrubbed URL or domain of the tracked site.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Total seconds spent.
    pub fn summary_time(&self) -> u64 {
        self.summary_time
    }

    /// Total visits.
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Sanitized favicon.
    pub fn favicon(&self) -> &Favicon {
        &self.favicon
    }

    /// Per-day breakdown in chronological order. Never absent, possibly empty.
    pub fn days(&self) -> &[DayRecord] {
        &self.days
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn favicon_serializes_as_plain_string() {
        let url = Favicon::Url("https://example.com/favicon.ico".to_string());

        assert_eq!(
            serde_json::to_value(&url).unwrap(),
            json!("https://example.com/favicon.ico")
        );
        assert_eq!(serde_json::to_value(&Favicon::Missing).unwrap(), json!(NO_FAVICON));
    }

    #[test]
    fn favicon_sentinel_reports_missing() {
        assert!(Favicon::Missing.is_missing());
        assert_eq!(Favicon::Missing.as_str(), NO_FAVICON);
        assert!(!Favicon::Url("https://a.example".to_string()).is_missing());
    }

    #[test]
    fn record_serializes_with_storage_field_names() {
        let record = ActivityRecord::new(
            "example.com".to_string(),
            60,
            2,
            Favicon::Missing,
            vec![DayRecord::new("2024-01-01".to_string(), 60, 2)],
        );

        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "url": "example.com",
                "summaryTime": 60,
                "counter": 2,
                "favicon": "no_favicon",
                "days": [{"date": "2024-01-01", "summary": 60, "counter": 2}]
            })
        );
    }
}
