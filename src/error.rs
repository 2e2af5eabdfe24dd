use std::fmt;

/// Errors surfaced by this crate.
///
/// Sanitizers never produce errors; only decoders, configuration loading and
/// the storage collaborator do.
#[derive(Debug)]
pub enum Error {
    /// A backup payload was rejected.
    Backup(BackupError),
    /// A block page URL could not be parsed.
    Query(QueryError),
    /// A configuration document was rejected.
    Config(ConfigError),
    /// The storage collaborator failed.
    Store(StoreError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Backup(e) => write!(f, "{}", e),
            Error::Query(e) => write!(f, "{}", e),
            Error::Config(e) => write!(f, "{}", e),
            Error::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Backup(e) => Some(e),
            Error::Query(e) => Some(e),
            Error::Config(e) => Some(e),
            Error::Store(e) => Some(e),
        }
    }
}

impl From<BackupError> for Error {
    fn from(e: BackupError) -> Self {
        Error::Backup(e)
    }
}

impl From<QueryError> for Error {
    fn from(e: QueryError) -> Self {
        Error::Query(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        Error::Store(e)
    }
}

/// Error returned when a backup cannot be restored.
///
/// The `Display` text is the same for every kind: end users only ever learn
/// that the file is invalid. [`kind`](Self::kind) and [`detail`](Self::detail)
/// exist for diagnostics and never contain the rejected payload.
///
/// # Examples
///
/// ```
/// use activity_guard::{decode_backup, BackupErrorKind};
///
/// let err = decode_backup("not json at all").unwrap_err();
/// assert_eq!(err.kind(), BackupErrorKind::InvalidFormat);
/// assert_eq!(err.to_string(), "invalid or corrupted backup file");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupError {
    kind: BackupErrorKind,
    detail: String,
}

impl BackupError {
    /// Creates a new backup error.
    pub fn new(kind: BackupErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> BackupErrorKind {
        self.kind
    }

    /// Returns the diagnostic detail.
    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl fmt::Display for BackupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid or corrupted backup file")
    }
}

impl std::error::Error for BackupError {}

/// Why a backup was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupErrorKind {
    /// Input was empty before any parsing was attempted.
    InvalidInput,
    /// The blob is not well-formed JSON.
    InvalidFormat,
    /// The JSON does not have the backup shape.
    InvalidSchema,
}

impl fmt::Display for BackupErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput => write!(f, "invalid input"),
            Self::InvalidFormat => write!(f, "invalid format"),
            Self::InvalidSchema => write!(f, "invalid schema"),
        }
    }
}

/// Error returned when a block page URL is not a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    source: url::ParseError,
}

impl QueryError {
    pub(crate) fn new(source: url::ParseError) -> Self {
        Self { source }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block page url could not be parsed: {}", self.source)
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Error returned when a configuration document is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    kind: ConfigErrorKind,
    message: String,
}

impl ConfigError {
    /// Creates a new configuration error.
    pub fn new(kind: ConfigErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ConfigErrorKind {
        self.kind
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "configuration rejected ({}): {}", self.kind, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Kind of configuration error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorKind {
    /// The document is not JSON of the expected shape.
    Malformed,
    /// A value is outside its permitted range.
    OutOfRange,
}

impl fmt::Display for ConfigErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed"),
            Self::OutOfRange => write!(f, "out of range"),
        }
    }
}

/// Error returned by an [`ActivityStore`](crate::ActivityStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    kind: StoreErrorKind,
    message: Option<String>,
}

impl StoreError {
    /// Creates a new store error with the specified kind.
    pub fn new(kind: StoreErrorKind) -> Self {
        Self {
            kind,
            message: None,
        }
    }

    /// Creates a new store error with a custom message.
    pub fn with_message(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: Some(message.into()),
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> StoreErrorKind {
        self.kind
    }

    /// Returns the error message, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(msg) = &self.message {
            write!(f, "store error ({}): {}", self.kind, msg)
        } else {
            write!(f, "store error ({})", self.kind)
        }
    }
}

impl std::error::Error for StoreError {}

/// Kind of store error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// The backing storage could not be reached.
    Unavailable,
    /// The storage refused the write.
    Rejected,
}

impl fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "unavailable"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_error_display_is_uniform() {
        for kind in [
            BackupErrorKind::InvalidInput,
            BackupErrorKind::InvalidFormat,
            BackupErrorKind::InvalidSchema,
        ] {
            let err = BackupError::new(kind, "detail");
            assert_eq!(err.to_string(), "invalid or corrupted backup file");
            assert_eq!(err.kind(), kind);
        }
    }

    #[test]
    fn backup_error_kinds_display() {
        assert_eq!(BackupErrorKind::InvalidInput.to_string(), "invalid input");
        assert_eq!(BackupErrorKind::InvalidFormat.to_string(), "invalid format");
        assert_eq!(BackupErrorKind::InvalidSchema.to_string(), "invalid schema");
    }

    #[test]
    fn store_error_display() {
        let plain = StoreError::new(StoreErrorKind::Unavailable);
        assert_eq!(plain.to_string(), "store error (unavailable)");

        let detailed = StoreError::with_message(StoreErrorKind::Rejected, "quota exceeded");
        assert_eq!(detailed.to_string(), "store error (rejected): quota exceeded");
        assert_eq!(detailed.message(), Some("quota exceeded"));
    }

    #[test]
    fn error_wraps_sources() {
        let err: Error = BackupError::new(BackupErrorKind::InvalidSchema, "not a list").into();

        assert!(matches!(err, Error::Backup(_)));
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.to_string(), "invalid or corrupted backup file");
    }
}
