//! The Backup Decoder.
//!
//! Turns user-supplied backup text into sanitized records. Structure is
//! checked first and fails closed: a backup with one malformed element is
//! rejected whole. Only then does every element go through the
//! Sanitization Core, which handles dangerous values of legal types.

use serde_json::Value;

use crate::config::GuardConfig;
use crate::error::{BackupError, BackupErrorKind};
use crate::logging::{Boundary, BoundaryLog};
use crate::record::ActivityRecord;
use crate::sanitizer::RecordSanitizer;
use crate::tainted::Tainted;
use crate::verified::Verified;

/// Decoder for backup files and `Restore` message payloads.
///
/// # Examples
///
/// ```
/// use activity_guard::{BackupDecoder, BackupErrorKind, Tainted};
///
/// let decoder = BackupDecoder::default();
///
/// let err = decoder.decode(Tainted::new(r#"{"not":"a list"}"#.to_string())).unwrap_err();
/// assert_eq!(err.kind(), BackupErrorKind::InvalidSchema);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BackupDecoder {
    sanitizer: RecordSanitizer,
}

impl BackupDecoder {
    /// Creates a decoder that sanitizes with `config`.
    pub fn new(config: &GuardConfig) -> Self {
        Self {
            sanitizer: RecordSanitizer::new(config),
        }
    }

    /// Returns the field-level sanitizer this decoder applies.
    pub fn sanitizer(&self) -> &RecordSanitizer {
        &self.sanitizer
    }

    /// Parses, validates and sanitizes raw backup text.
    ///
    /// # Errors
    ///
    /// - [`BackupErrorKind::InvalidInput`] if the text is empty
    /// - [`BackupErrorKind::InvalidFormat`] if it is not JSON
    /// - [`BackupErrorKind::InvalidSchema`] if it is not a list of records
    pub fn decode(
        &self,
        raw: Tainted<String>,
    ) -> Result<Verified<Vec<ActivityRecord>>, BackupError> {
        let log = BoundaryLog::new(Boundary::Backup);
        let result = self.decode_text(raw.peek());
        match &result {
            Ok(records) => log.info(format_args!(
                "restored {} records from {} bytes",
                records.as_ref().len(),
                raw.peek().len()
            )),
            Err(err) => log.rejected(format_args!("{}: {}", err.kind(), err.detail())),
        }
        result
    }

    /// Validates and sanitizes an already-parsed payload.
    ///
    /// # Errors
    ///
    /// Returns [`BackupErrorKind::InvalidSchema`] if the value is not a list
    /// of records.
    pub fn decode_value(
        &self,
        raw: Tainted<Value>,
    ) -> Result<Verified<Vec<ActivityRecord>>, BackupError> {
        let items = validate_backup_schema(raw.peek())?;
        Ok(Verified::new_unchecked(self.sanitizer.records(items)))
    }

    /// Normalizes a payload that an earlier decode already produced, such as
    /// the data attached to a `Restore` message.
    ///
    /// Only the top-level list is required; every element is sanitized
    /// best-effort, so a negative `summaryTime` becomes 0 instead of failing.
    ///
    /// # Errors
    ///
    /// Returns [`BackupErrorKind::InvalidSchema`] if the value is not a list.
    pub fn normalize_payload(
        &self,
        raw: Tainted<Value>,
    ) -> Result<Verified<Vec<ActivityRecord>>, BackupError> {
        match raw.peek() {
            Value::Array(items) => Ok(Verified::new_unchecked(self.sanitizer.records(items))),
            _ => Err(schema_error("payload is not a list")),
        }
    }

    fn decode_text(&self, raw: &str) -> Result<Verified<Vec<ActivityRecord>>, BackupError> {
        if raw.is_empty() {
            return Err(BackupError::new(
                BackupErrorKind::InvalidInput,
                "backup is empty",
            ));
        }

        let parsed: Value = serde_json::from_str(raw).map_err(|err| {
            BackupError::new(
                BackupErrorKind::InvalidFormat,
                format!("json error at line {} column {}", err.line(), err.column()),
            )
        })?;

        self.decode_value(Tainted::new(parsed))
    }
}

/// Decodes backup text with the default configuration.
///
/// ```
/// use activity_guard::{decode_backup, BackupErrorKind};
///
/// assert_eq!(decode_backup("").unwrap_err().kind(), BackupErrorKind::InvalidInput);
///
/// let records = decode_backup(r#"[{"url":"a.example","summaryTime":1.5}]"#).unwrap();
/// assert_eq!(records[0].summary_time(), 1);
/// ```
pub fn decode_backup(raw: &str) -> Result<Vec<ActivityRecord>, BackupError> {
    BackupDecoder::default()
        .decode(Tainted::new(raw.to_string()))
        .map(Verified::into_inner)
}

/// Validates and sanitizes a parsed payload with the default configuration.
pub fn decode_backup_value(raw: &Value) -> Result<Vec<ActivityRecord>, BackupError> {
    let items = validate_backup_schema(raw)?;
    Ok(RecordSanitizer::default().records(items))
}

/// Checks the backup shape and returns its elements.
///
/// The payload must be an array whose every element is an object with a
/// string `url` and a non-negative numeric `summaryTime`. Other fields are
/// not checked here; the Sanitization Core defaults them.
pub fn validate_backup_schema(raw: &Value) -> Result<&[Value], BackupError> {
    let Value::Array(items) = raw else {
        return Err(schema_error("backup is not a list"));
    };

    for (index, item) in items.iter().enumerate() {
        let Value::Object(fields) = item else {
            return Err(schema_error(format!("element {} is not an object", index)));
        };
        if !matches!(fields.get("url"), Some(Value::String(_))) {
            return Err(schema_error(format!("element {} has no string url", index)));
        }
        let summary_ok = match fields.get("summaryTime") {
            Some(Value::Number(n)) => n.as_f64().is_some_and(|t| t >= 0.0),
            _ => false,
        };
        if !summary_ok {
            return Err(schema_error(format!(
                "element {} has no non-negative summaryTime",
                index
            )));
        }
    }

    Ok(items)
}

fn schema_error(detail: impl Into<String>) -> BackupError {
    BackupError::new(BackupErrorKind::InvalidSchema, detail)
}
