use serde_json::Value;

use crate::backup::BackupDecoder;
use crate::config::GuardConfig;
use crate::error::{BackupError, ConfigError, QueryError};
use crate::gate::{Message, MessageGate};
use crate::logging::{Boundary, BoundaryLog};
use crate::query::{BlockQuery, QueryDecoder};
use crate::record::ActivityRecord;
use crate::sanitizer::RecordSanitizer;
use crate::tainted::Tainted;
use crate::verified::Verified;

/// Every trust boundary, configured from one [`GuardConfig`].
///
/// `Guard` holds no hidden global state: the configuration is passed in and
/// replaced explicitly with [`reload`](Self::reload).
///
/// # Examples
///
/// ```
/// use activity_guard::{Guard, GuardConfig, Tainted};
///
/// let mut guard = Guard::default();
/// guard.reload_from_json(r#"{"textLimit": 3}"#).unwrap();
///
/// let records = guard
///     .decode_backup(Tainted::new(r#"[{"url":"example.com","summaryTime":1}]"#.to_string()))
///     .unwrap();
/// assert_eq!(records.as_ref()[0].url(), "exa");
///
/// // A rejected reload keeps the previous config.
/// assert!(guard.reload(GuardConfig { text_limit: 0, ..GuardConfig::default() }).is_err());
/// assert_eq!(guard.config().text_limit, 3);
/// ```
#[derive(Debug, Clone)]
pub struct Guard {
    config: GuardConfig,
    backup: BackupDecoder,
    query: QueryDecoder,
    gate: MessageGate,
}

impl Default for Guard {
    fn default() -> Self {
        Self::build(GuardConfig::default())
    }
}

impl Guard {
    /// Creates a guard from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` fails validation.
    pub fn new(config: GuardConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: GuardConfig) -> Self {
        Self {
            backup: BackupDecoder::new(&config),
            query: QueryDecoder::new(&config),
            gate: MessageGate::new(),
            config,
        }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Replaces the configuration. On error the previous one stays in force.
    pub fn reload(&mut self, config: GuardConfig) -> Result<(), ConfigError> {
        config.validate()?;
        BoundaryLog::new(Boundary::Config).info(format_args!(
            "configuration reloaded (text limit {}, {} favicon schemes)",
            config.text_limit,
            config.favicon_schemes.schemes().len()
        ));
        *self = Self::build(config);
        Ok(())
    }

    /// Parses a persisted configuration document and applies it.
    pub fn reload_from_json(&mut self, text: &str) -> Result<(), ConfigError> {
        self.reload(GuardConfig::from_json(text)?)
    }

    /// Returns the field-level sanitizer.
    pub fn sanitizer(&self) -> &RecordSanitizer {
        self.backup.sanitizer()
    }

    /// Decodes a backup file. See [`BackupDecoder::decode`].
    pub fn decode_backup(
        &self,
        raw: Tainted<String>,
    ) -> Result<Verified<Vec<ActivityRecord>>, BackupError> {
        self.backup.decode(raw)
    }

    /// Normalizes a `Restore` payload. See [`BackupDecoder::normalize_payload`].
    pub fn normalize_payload(
        &self,
        raw: Tainted<Value>,
    ) -> Result<Verified<Vec<ActivityRecord>>, BackupError> {
        self.backup.normalize_payload(raw)
    }

    /// Runs a message through the gate. See [`MessageGate::admit`].
    pub fn admit(&self, raw: Tainted<Value>) -> Option<Message> {
        self.gate.admit(raw)
    }

    /// Decodes a block page URL. See [`QueryDecoder::decode`].
    pub fn decode_block_query(&self, page: Tainted<String>) -> Result<BlockQuery, QueryError> {
        self.query.decode(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchemeAllowList;
    use crate::error::ConfigErrorKind;
    use serde_json::json;

    #[test]
    fn new_rejects_invalid_config() {
        let err = Guard::new(GuardConfig {
            text_limit: 0,
            ..GuardConfig::default()
        })
        .unwrap_err();

        assert_eq!(err.kind(), ConfigErrorKind::OutOfRange);
    }

    #[test]
    fn reload_applies_to_every_boundary() {
        let mut guard = Guard::default();
        guard
            .reload(GuardConfig {
                text_limit: 4,
                favicon_schemes: SchemeAllowList::new(["https"]),
            })
            .unwrap();

        assert_eq!(guard.sanitizer().scrub("abcdef"), "abcd");

        let query = guard
            .decode_block_query(Tainted::new(
                "chrome-extension://x/block.html?favicon=http%3A%2F%2Fa.example%2Ff.ico"
                    .to_string(),
            ))
            .unwrap();
        assert!(query.favicon.is_missing());

        let records = guard
            .normalize_payload(Tainted::new(json!([{"url": "a", "favicon": "http://a.example/f.ico"}])))
            .unwrap();
        assert!(records.as_ref()[0].favicon().is_missing());
    }

    #[test]
    fn failed_json_reload_keeps_previous_config() {
        let mut guard = Guard::default();

        assert!(guard.reload_from_json("{").is_err());
        assert!(guard.reload_from_json(r#"{"textLimit": 0}"#).is_err());
        assert_eq!(guard.config(), &GuardConfig::default());
    }

    #[test]
    fn admit_delegates_to_gate() {
        let guard = Guard::default();

        assert!(guard.admit(Tainted::new(json!({"type": "Restore"}))).is_some());
        assert!(guard.admit(Tainted::new(json!(42))).is_none());
    }
}
