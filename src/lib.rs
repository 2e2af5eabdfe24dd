//! Trust-boundary validation for a browser activity tracker.
//!
//! Every piece of data entering the tracker from outside its own code
//! crosses one of four boundaries, and this crate guards each:
//! - **Sanitization Core**: total functions that turn arbitrary JSON values
//!   into markup-free text, allow-listed favicon URLs and non-negative counts
//! - **Backup Decoder**: parses and validates user-supplied backup files
//! - **Message Gate**: checks the shape of runtime messages before dispatch
//! - **Query Decoder**: extracts typed parameters from a block page URL
//!
//! # Core Types
//!
//! - [`Tainted<T>`]: untrusted input, readable only inside this crate
//! - [`Verified<T>`]: output of a decoder, the only thing an
//!   [`ActivityStore`] accepts
//! - [`Guard`]: all boundaries built from one [`GuardConfig`]
//! - [`Dispatcher`]: routes gated messages to storage
//!
//! # Examples
//!
//! ```
//! use activity_guard::{Favicon, Guard, Tainted};
//!
//! let guard = Guard::default();
//!
//! let records = guard
//!     .decode_backup(Tainted::new(
//!         r#"[{"url":"<script>x</script>a.com","summaryTime":12.9,"favicon":"javascript:alert(1)"}]"#
//!             .to_string(),
//!     ))
//!     .unwrap();
//!
//! let record = &records.as_ref()[0];
//! assert_eq!(record.url(), "a.com");
//! assert_eq!(record.summary_time(), 12);
//! assert_eq!(record.favicon(), &Favicon::Missing);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod backup;
mod config;
mod dispatch;
mod error;
mod gate;
mod guard;
mod logging;
mod query;
mod record;
mod sanitizer;
mod store;
mod tainted;
mod verified;

#[cfg(test)]
mod test_utils;

pub use backup::{decode_backup, decode_backup_value, validate_backup_schema, BackupDecoder};
pub use config::{GuardConfig, SchemeAllowList, DEFAULT_FAVICON_SCHEMES, DEFAULT_TEXT_LIMIT};
pub use dispatch::{Dispatcher, Outcome};
pub use error::{
    BackupError, BackupErrorKind, ConfigError, ConfigErrorKind, Error, QueryError, StoreError,
    StoreErrorKind,
};
pub use gate::{is_valid_message, Command, Message, MessageGate, Rejection, TagKey};
pub use guard::Guard;
pub use logging::{Boundary, BoundaryLog};
pub use query::{build_block_query, decode_block_query, BlockParam, BlockQuery, QueryDecoder};
pub use record::{ActivityRecord, DayRecord, Favicon, NO_FAVICON};
pub use sanitizer::{
    coerce_number, is_valid_redirect_url, sanitize_day, sanitize_favicon, sanitize_record,
    sanitize_text, sanitize_url, scrub_text, to_non_negative_int, RecordSanitizer,
};
pub use store::{ActivityStore, MemoryStore};
pub use tainted::Tainted;
pub use verified::Verified;
