//! The Query Decoder for the block page.
//!
//! The block page is opened with its parameters in the query string, and
//! anyone can craft a link to it. The favicon gets the same URL check as
//! every other entry point. `domain` and `url` are forwarded as-is: they are
//! only displayed on the extension's own page and are scrubbed again by the
//! Sanitization Core if they are ever persisted.

use std::fmt;

use serde_json::Value;
use url::{form_urlencoded, Url};

use crate::config::{GuardConfig, SchemeAllowList};
use crate::error::QueryError;
use crate::logging::{Boundary, BoundaryLog};
use crate::record::Favicon;
use crate::sanitizer::{coerce_number, sanitize_url};
use crate::tainted::Tainted;

/// The closed set of block page query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockParam {
    /// Blocked domain.
    Domain,
    /// URL the user was trying to open.
    Url,
    /// Daily limit, in seconds.
    LimitTime,
    /// Visits so far today.
    SummaryCounter,
    /// Favicon of the blocked site.
    Favicon,
}

impl BlockParam {
    /// All parameters, in query order.
    pub const ALL: [BlockParam; 5] = [
        BlockParam::Domain,
        BlockParam::Url,
        BlockParam::LimitTime,
        BlockParam::SummaryCounter,
        BlockParam::Favicon,
    ];

    /// Query-string key.
    pub fn key(&self) -> &'static str {
        match self {
            BlockParam::Domain => "domain",
            BlockParam::Url => "url",
            BlockParam::LimitTime => "summaryTime",
            BlockParam::SummaryCounter => "summaryCounter",
            BlockParam::Favicon => "favicon",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|param| param.key() == key)
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for BlockParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Values decoded from a block page URL.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockQuery {
    /// `domain`, if present.
    pub domain: Option<String>,
    /// `url`, if present.
    pub url: Option<String>,
    /// `summaryTime` coerced to a number; absent is 0, garbage is NaN.
    pub limit_time: f64,
    /// `summaryCounter` coerced to a number; absent is 0, garbage is NaN.
    pub summary_counter: f64,
    /// Sanitized `favicon`.
    pub favicon: Favicon,
}

/// Decoder for block page URLs.
///
/// # Examples
///
/// ```
/// use activity_guard::{QueryDecoder, Tainted};
///
/// let decoder = QueryDecoder::default();
/// let page = "chrome-extension://id/src/block.html?domain=example.com&summaryTime=60&favicon=javascript:alert(1)";
/// let query = decoder.decode(Tainted::new(page.to_string())).unwrap();
///
/// assert_eq!(query.domain.as_deref(), Some("example.com"));
/// assert_eq!(query.limit_time, 60.0);
/// assert!(query.favicon.is_missing());
/// ```
#[derive(Debug, Clone, Default)]
pub struct QueryDecoder {
    favicon_schemes: SchemeAllowList,
}

impl QueryDecoder {
    /// Creates a decoder that checks favicons against `config`.
    pub fn new(config: &GuardConfig) -> Self {
        Self {
            favicon_schemes: config.favicon_schemes.clone(),
        }
    }

    /// Decodes the query string of a block page URL.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] if `page` is not an absolute URL.
    pub fn decode(&self, page: Tainted<String>) -> Result<BlockQuery, QueryError> {
        let log = BoundaryLog::new(Boundary::Query);
        let parsed = Url::parse(page.peek()).map_err(|err| {
            log.rejected(err);
            QueryError::new(err)
        })?;

        // Like URLSearchParams::get, the first occurrence of a key wins.
        let mut values: [Option<String>; 5] = Default::default();
        for (key, value) in parsed.query_pairs() {
            if let Some(param) = BlockParam::from_key(&key) {
                let slot = &mut values[param.index()];
                if slot.is_none() {
                    *slot = Some(value.into_owned());
                }
            }
        }
        let [domain, url, limit_time, summary_counter, favicon] = values;

        let favicon = match favicon {
            Some(raw) => sanitize_url(&Value::String(raw), &self.favicon_schemes),
            None => Favicon::Missing,
        };
        if favicon.is_missing() {
            log.debug(format_args!("favicon replaced by sentinel"));
        }

        Ok(BlockQuery {
            domain,
            url,
            limit_time: coerce_number(limit_time.as_deref()),
            summary_counter: coerce_number(summary_counter.as_deref()),
            favicon,
        })
    }
}

/// Decodes a block page URL with the default configuration.
pub fn decode_block_query(page: &str) -> Result<BlockQuery, QueryError> {
    QueryDecoder::default().decode(Tainted::new(page.to_string()))
}

/// Builds the query string (with leading `?`) that [`decode_block_query`] reads.
///
/// Every value is percent-encoded, so a crafted domain cannot smuggle in
/// extra parameters.
///
/// ```
/// use activity_guard::{build_block_query, Favicon};
///
/// let query = build_block_query("a.example&favicon=javascript:x", "https://a.example/", 60, 3, &Favicon::Missing);
/// assert_eq!(
///     query,
///     "?domain=a.example%26favicon%3Djavascript%3Ax&url=https%3A%2F%2Fa.example%2F&summaryTime=60&summaryCounter=3&favicon=no_favicon"
/// );
/// ```
pub fn build_block_query(
    domain: &str,
    url: &str,
    limit_time: u64,
    summary_counter: u64,
    favicon: &Favicon,
) -> String {
    let limit_time = limit_time.to_string();
    let summary_counter = summary_counter.to_string();
    let encoded = form_urlencoded::Serializer::new(String::new())
        .append_pair(BlockParam::Domain.key(), domain)
        .append_pair(BlockParam::Url.key(), url)
        .append_pair(BlockParam::LimitTime.key(), &limit_time)
        .append_pair(BlockParam::SummaryCounter.key(), &summary_counter)
        .append_pair(BlockParam::Favicon.key(), favicon.as_str())
        .finish();
    format!("?{}", encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "chrome-extension://abc/src/block.html";

    #[test]
    fn decodes_all_fields() {
        let query = decode_block_query(&format!(
            "{}?domain=example.com&url=https%3A%2F%2Fexample.com%2Fa&summaryTime=90&summaryCounter=4&favicon=https%3A%2F%2Fexample.com%2Ff.ico",
            PAGE
        ))
        .unwrap();

        assert_eq!(query.domain.as_deref(), Some("example.com"));
        assert_eq!(query.url.as_deref(), Some("https://example.com/a"));
        assert_eq!(query.limit_time, 90.0);
        assert_eq!(query.summary_counter, 4.0);
        assert_eq!(
            query.favicon,
            Favicon::Url("https://example.com/f.ico".to_string())
        );
    }

    #[test]
    fn missing_fields_default() {
        let query = decode_block_query(PAGE).unwrap();

        assert_eq!(query.domain, None);
        assert_eq!(query.url, None);
        assert_eq!(query.limit_time, 0.0);
        assert_eq!(query.summary_counter, 0.0);
        assert!(query.favicon.is_missing());
    }

    #[test]
    fn numbers_are_coerced_not_clamped() {
        let query =
            decode_block_query(&format!("{}?summaryTime=-12.5&summaryCounter=lots", PAGE)).unwrap();

        assert_eq!(query.limit_time, -12.5);
        assert!(query.summary_counter.is_nan());
    }

    #[test]
    fn hostile_favicons_become_sentinel() {
        for favicon in [
            "javascript%3Aalert(1)",
            "data%3Atext%2Fhtml%2C%3Cscript%3E",
            "https%3A%2F%2Fevil.example%2F%3Fx%3Dvbscript%3Ay",
            "%2F%2Fevil.example%2Ff.ico",
        ] {
            let query = decode_block_query(&format!("{}?favicon={}", PAGE, favicon)).unwrap();
            assert!(query.favicon.is_missing(), "accepted {}", favicon);
        }
    }

    #[test]
    fn domain_and_url_pass_through() {
        let query =
            decode_block_query(&format!("{}?domain=%3Cb%3Ex%3C%2Fb%3E", PAGE)).unwrap();
        assert_eq!(query.domain.as_deref(), Some("<b>x</b>"));
    }

    #[test]
    fn first_occurrence_wins() {
        let query = decode_block_query(&format!(
            "{}?favicon=https%3A%2F%2Fok.example%2Ff.ico&favicon=javascript%3Ax",
            PAGE
        ))
        .unwrap();

        assert!(!query.favicon.is_missing());
    }

    #[test]
    fn unparsable_page_is_an_error() {
        assert!(decode_block_query("block.html?domain=x").is_err());
        assert!(decode_block_query("").is_err());
    }

    #[test]
    fn custom_schemes_apply() {
        let config = GuardConfig {
            favicon_schemes: SchemeAllowList::new(["https"]),
            ..GuardConfig::default()
        };
        let decoder = QueryDecoder::new(&config);
        let query = decoder
            .decode(Tainted::new(format!(
                "{}?favicon=http%3A%2F%2Fexample.com%2Ff.ico",
                PAGE
            )))
            .unwrap();

        assert!(query.favicon.is_missing());
    }

    #[test]
    fn built_query_decodes_back() {
        let favicon = Favicon::Url("https://example.com/f.ico?a=1&b=2".to_string());
        let query = build_block_query("example.com", "https://example.com/x?y=1", 120, 7, &favicon);
        let decoded = decode_block_query(&format!("{}{}", PAGE, query)).unwrap();

        assert_eq!(decoded.domain.as_deref(), Some("example.com"));
        assert_eq!(decoded.url.as_deref(), Some("https://example.com/x?y=1"));
        assert_eq!(decoded.limit_time, 120.0);
        assert_eq!(decoded.summary_counter, 7.0);
        assert_eq!(decoded.favicon, favicon);
    }

    #[test]
    fn param_keys() {
        let keys: Vec<&str> = BlockParam::ALL.iter().map(BlockParam::key).collect();
        assert_eq!(
            keys,
            ["domain", "url", "summaryTime", "summaryCounter", "favicon"]
        );
        assert_eq!(BlockParam::from_key("summaryTime"), Some(BlockParam::LimitTime));
        assert_eq!(BlockParam::from_key("limitTime"), None);
    }
}
