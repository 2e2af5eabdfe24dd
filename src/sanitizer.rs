//! The Sanitization Core.
//!
//! Every function here is total: it accepts any JSON value (the shape that
//! untrusted data arrives in) and returns a safe value. Unsafe content
//! degrades to an empty string, the favicon sentinel, or zero. Nothing in
//! this module performs I/O or keeps state between calls.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use url::Url;

use crate::config::{GuardConfig, SchemeAllowList};
use crate::record::{ActivityRecord, DayRecord, Favicon};

/// Scheme fragments that disqualify a favicon URL wherever they appear.
const SMUGGLED_SCHEMES: [&str; 3] = ["javascript:", "data:", "vbscript:"];

/// Redirect targets additionally may not mention `file:`.
const REDIRECT_BLOCKED_SCHEMES: [&str; 4] = ["javascript:", "data:", "vbscript:", "file:"];

/// Upper bound on strip passes before the input is discarded.
const MAX_STRIP_PASSES: usize = 16;

static RE_SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("valid script regex"));

static RE_SCHEME_FRAGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)javascript:|data:|vbscript:").expect("valid scheme regex"));

static RE_EVENT_HANDLER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)on\w+\s*=").expect("valid handler regex"));

static RE_HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

static DEFAULT_SANITIZER: LazyLock<RecordSanitizer> = LazyLock::new(RecordSanitizer::default);

static NULL: Value = Value::Null;

/// Field-level sanitizer parameterized by a [`GuardConfig`].
///
/// The free functions in this module ([`sanitize_text`], [`sanitize_record`],
/// ...) use a default-configured instance.
///
/// # Examples
///
/// ```
/// use activity_guard::{GuardConfig, RecordSanitizer};
/// use serde_json::json;
///
/// let config = GuardConfig { text_limit: 5, ..GuardConfig::default() };
/// let sanitizer = RecordSanitizer::new(&config);
///
/// assert_eq!(sanitizer.text(&json!("<b>hello world</b>")), "hello");
/// ```
#[derive(Debug, Clone)]
pub struct RecordSanitizer {
    text_limit: usize,
    favicon_schemes: SchemeAllowList,
}

impl Default for RecordSanitizer {
    fn default() -> Self {
        Self::new(&GuardConfig::default())
    }
}

impl RecordSanitizer {
    /// Creates a sanitizer from `config`.
    ///
    /// A zero `text_limit` is raised to 1 so a hand-built config cannot make
    /// every text field vanish silently.
    pub fn new(config: &GuardConfig) -> Self {
        Self {
            text_limit: config.text_limit.max(1),
            favicon_schemes: config.favicon_schemes.clone(),
        }
    }

    /// Scrubs a text value. Non-string input yields `""`.
    pub fn text(&self, input: &Value) -> String {
        match input {
            Value::String(s) => self.scrub(s),
            _ => String::new(),
        }
    }

    /// Scrubs a string: markup, script blocks, event handlers and
    /// `javascript:`/`data:`/`vbscript:` fragments are removed, then the
    /// result is trimmed and cut to the configured length.
    pub fn scrub(&self, input: &str) -> String {
        let Some(stripped) = strip_until_stable(input) else {
            return String::new();
        };

        let trimmed = stripped.trim();
        match trimmed.char_indices().nth(self.text_limit) {
            Some((cut, _)) => trimmed[..cut].trim_end().to_string(),
            None => trimmed.to_string(),
        }
    }

    /// Checks a favicon value against the configured scheme allow-list.
    pub fn url(&self, input: &Value) -> Favicon {
        match input {
            Value::String(s) => check_url(s, &self.favicon_schemes),
            _ => Favicon::Missing,
        }
    }

    /// Normalizes one backup element into an [`ActivityRecord`].
    ///
    /// Missing or mistyped fields default to their zero value; `days` that is
    /// not an array becomes empty.
    pub fn record(&self, raw: &Value) -> ActivityRecord {
        let days = match raw.get("days") {
            Some(Value::Array(items)) => items.iter().map(|day| self.day(day)).collect(),
            _ => Vec::new(),
        };

        ActivityRecord::new(
            self.text(field(raw, "url")),
            to_non_negative_int(field(raw, "summaryTime")),
            to_non_negative_int(field(raw, "counter")),
            self.url(field(raw, "favicon")),
            days,
        )
    }

    /// Normalizes one element of a record's `days`.
    pub fn day(&self, raw: &Value) -> DayRecord {
        DayRecord::new(
            self.text(field(raw, "date")),
            to_non_negative_int(field(raw, "summary")),
            to_non_negative_int(field(raw, "counter")),
        )
    }

    /// Normalizes every element of a batch.
    pub fn records(&self, raw: &[Value]) -> Vec<ActivityRecord> {
        raw.iter().map(|item| self.record(item)).collect()
    }
}

/// Scrubs a text value with the default limit. Non-string input yields `""`.
///
/// ```
/// use activity_guard::sanitize_text;
/// use serde_json::json;
///
/// assert_eq!(sanitize_text(&json!("<script>alert(1)</script>hello")), "hello");
/// assert_eq!(sanitize_text(&json!("<img onerror=alert(1)>")), "");
/// assert_eq!(sanitize_text(&json!(42)), "");
/// ```
pub fn sanitize_text(input: &Value) -> String {
    DEFAULT_SANITIZER.text(input)
}

/// Scrubs a string with the default limit.
pub fn scrub_text(input: &str) -> String {
    DEFAULT_SANITIZER.scrub(input)
}

/// Checks `input` against `allowed`, returning the original string or the sentinel.
///
/// The string is returned unchanged (not re-serialized by the URL parser).
///
/// ```
/// use activity_guard::{sanitize_url, Favicon, SchemeAllowList};
/// use serde_json::json;
///
/// let http = SchemeAllowList::default();
/// assert_eq!(sanitize_url(&json!("javascript:alert(1)"), &http), Favicon::Missing);
/// assert_eq!(sanitize_url(&json!("not a url"), &http), Favicon::Missing);
/// assert_eq!(
///     sanitize_url(&json!("https://example.com/a.png"), &http),
///     Favicon::Url("https://example.com/a.png".to_string())
/// );
/// ```
pub fn sanitize_url(input: &Value, allowed: &SchemeAllowList) -> Favicon {
    match input {
        Value::String(s) => check_url(s, allowed),
        _ => Favicon::Missing,
    }
}

/// [`sanitize_url`] with the default `http`/`https` allow-list.
pub fn sanitize_favicon(input: &Value) -> Favicon {
    DEFAULT_SANITIZER.url(input)
}

/// Normalizes a backup element with the default configuration.
pub fn sanitize_record(raw: &Value) -> ActivityRecord {
    DEFAULT_SANITIZER.record(raw)
}

/// Normalizes one day entry with the default configuration.
pub fn sanitize_day(raw: &Value) -> DayRecord {
    DEFAULT_SANITIZER.day(raw)
}

/// Coerces any value to a non-negative integer.
///
/// Numbers and numeric strings are floored; negative, non-numeric and NaN
/// input becomes 0; values past `u64::MAX` saturate.
///
/// ```
/// use activity_guard::to_non_negative_int;
/// use serde_json::json;
///
/// assert_eq!(to_non_negative_int(&json!(1.9)), 1);
/// assert_eq!(to_non_negative_int(&json!(-5)), 0);
/// assert_eq!(to_non_negative_int(&json!(" 42 ")), 42);
/// assert_eq!(to_non_negative_int(&json!("abc")), 0);
/// assert_eq!(to_non_negative_int(&json!(null)), 0);
/// ```
pub fn to_non_negative_int(input: &Value) -> u64 {
    match input {
        Value::Number(n) => {
            if let Some(exact) = n.as_u64() {
                exact
            } else if n.is_i64() {
                0
            } else {
                floor_non_negative(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => floor_non_negative(parse_numeric(s)),
        Value::Bool(b) => u64::from(*b),
        _ => 0,
    }
}

/// Numeric coercion without clamping: absent is 0, unparsable is NaN.
///
/// ```
/// use activity_guard::coerce_number;
///
/// assert_eq!(coerce_number(None), 0.0);
/// assert_eq!(coerce_number(Some("-2.5")), -2.5);
/// assert!(coerce_number(Some("ten")).is_nan());
/// ```
pub fn coerce_number(input: Option<&str>) -> f64 {
    match input {
        Some(s) => parse_numeric(s),
        None => 0.0,
    }
}

/// Returns `true` if `url` is safe to navigate to: `http`/`https` only and
/// no `javascript:`, `data:`, `vbscript:` or `file:` anywhere in it.
///
/// ```
/// use activity_guard::is_valid_redirect_url;
///
/// assert!(is_valid_redirect_url("https://example.com/next"));
/// assert!(!is_valid_redirect_url("https://example.com/?u=file:///etc/passwd"));
/// assert!(!is_valid_redirect_url("ftp://example.com"));
/// ```
pub fn is_valid_redirect_url(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }
    match Url::parse(url) {
        Ok(parsed) => {
            matches!(parsed.scheme(), "http" | "https")
                && !contains_any_ci(url, &REDIRECT_BLOCKED_SCHEMES)
        }
        Err(_) => false,
    }
}

fn field<'a>(raw: &'a Value, key: &str) -> &'a Value {
    raw.get(key).unwrap_or(&NULL)
}

fn check_url(raw: &str, allowed: &SchemeAllowList) -> Favicon {
    if raw.is_empty() {
        return Favicon::Missing;
    }
    let Ok(parsed) = Url::parse(raw) else {
        return Favicon::Missing;
    };
    // The parser only sees the leading scheme; smuggled ones hide in the path or query.
    if !allowed.allows(parsed.scheme()) || contains_any_ci(raw, &SMUGGLED_SCHEMES) {
        return Favicon::Missing;
    }
    Favicon::Url(raw.to_string())
}

fn contains_any_ci(haystack: &str, needles: &[&str]) -> bool {
    let lower = haystack.to_lowercase();
    needles.iter().any(|needle| lower.contains(needle))
}

/// Applies the strip passes until the text stops changing.
///
/// Returns `None` if the text is still changing after [`MAX_STRIP_PASSES`],
/// which only happens for deliberately nested payloads.
fn strip_until_stable(input: &str) -> Option<String> {
    let mut current = input.to_string();
    for _ in 0..MAX_STRIP_PASSES {
        let next = strip_once(&current);
        if next == current {
            return Some(current);
        }
        current = next;
    }
    None
}

fn strip_once(input: &str) -> String {
    // Script blocks go before the generic tag pass so their bodies go with them.
    let text = RE_SCRIPT_BLOCK.replace_all(input, "");
    let text = RE_SCHEME_FRAGMENT.replace_all(&text, "");
    let text = RE_EVENT_HANDLER.replace_all(&text, "");
    let text = RE_HTML_TAG.replace_all(&text, "");
    text.into_owned()
}

fn floor_non_negative(value: f64) -> u64 {
    if value.is_nan() || value <= 0.0 {
        return 0;
    }
    // Float-to-int casts saturate at u64::MAX.
    value.floor() as u64
}

fn parse_numeric(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }

    let radix = match s.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return parse_radix_digits(&s[2..], radix);
    }

    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    if unsigned == "Infinity" {
        return if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }
    if !unsigned
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return f64::NAN;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

/// Parses the digits after a `0x`/`0o`/`0b` prefix. A sign or any stray
/// character is NaN; values past `u64` stay large floats and saturate later.
fn parse_radix_digits(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    let mut value = 0.0_f64;
    for c in digits.chars() {
        let Some(digit) = c.to_digit(radix) else {
            return f64::NAN;
        };
        value = value * f64::from(radix) + f64::from(digit);
    }
    value
}
