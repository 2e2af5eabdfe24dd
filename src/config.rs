//! Explicit configuration for the sanitization layer.
//!
//! There is no process-wide settings object. A [`GuardConfig`] is passed to
//! whatever needs it and replaced wholesale through
//! [`Guard::reload`](crate::Guard::reload).

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigErrorKind};

/// Maximum length, in characters, of any scrubbed text field.
pub const DEFAULT_TEXT_LIMIT: usize = 1000;

/// Schemes accepted for favicon URLs by default.
pub const DEFAULT_FAVICON_SCHEMES: [&str; 2] = ["http", "https"];

/// A normalized set of URL schemes.
///
/// Entries are lower-cased and stripped of a trailing `:`, so `"HTTPS:"` and
/// `"https"` are the same entry. An empty list rejects every URL.
///
/// ```
/// use activity_guard::SchemeAllowList;
///
/// let schemes = SchemeAllowList::new(["HTTPS:", "http"]);
/// assert!(schemes.allows("https"));
/// assert!(!schemes.allows("ftp"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct SchemeAllowList {
    schemes: Vec<String>,
}

impl SchemeAllowList {
    /// Builds an allow-list from scheme names.
    pub fn new<I, S>(schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for scheme in schemes {
            let scheme = scheme.as_ref().trim().trim_end_matches(':').to_ascii_lowercase();
            if !scheme.is_empty() && !normalized.contains(&scheme) {
                normalized.push(scheme);
            }
        }
        Self { schemes: normalized }
    }

    /// Returns `true` if `scheme` (as reported by a URL parser, without `:`) is allowed.
    pub fn allows(&self, scheme: &str) -> bool {
        self.schemes
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(scheme))
    }

    /// Returns the normalized entries.
    pub fn schemes(&self) -> &[String] {
        &self.schemes
    }
}

impl Default for SchemeAllowList {
    fn default() -> Self {
        Self::new(DEFAULT_FAVICON_SCHEMES)
    }
}

impl From<Vec<String>> for SchemeAllowList {
    fn from(schemes: Vec<String>) -> Self {
        Self::new(schemes)
    }
}

impl From<SchemeAllowList> for Vec<String> {
    fn from(list: SchemeAllowList) -> Self {
        list.schemes
    }
}

/// Settings consumed by the Sanitization Core and the decoders.
///
/// Missing keys in a JSON document fall back to the defaults:
///
/// ```
/// use activity_guard::GuardConfig;
///
/// let config = GuardConfig::from_json(r#"{"textLimit": 200}"#).unwrap();
/// assert_eq!(config.text_limit, 200);
/// assert!(config.favicon_schemes.allows("https"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GuardConfig {
    /// Maximum length of a scrubbed text field, in characters. Must be > 0.
    pub text_limit: usize,
    /// Schemes a favicon URL may use.
    pub favicon_schemes: SchemeAllowList,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            text_limit: DEFAULT_TEXT_LIMIT,
            favicon_schemes: SchemeAllowList::default(),
        }
    }
}

impl GuardConfig {
    /// Parses and validates a persisted configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the document is not valid JSON for this
    /// shape, or if `textLimit` is zero.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: GuardConfig = serde_json::from_str(text).map_err(|err| {
            ConfigError::new(ConfigErrorKind::Malformed, format!("line {}", err.line()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants a hand-built config must also satisfy.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.text_limit == 0 {
            return Err(ConfigError::new(
                ConfigErrorKind::OutOfRange,
                "textLimit must be greater than 0",
            ));
        }
        Ok(())
    }
}
