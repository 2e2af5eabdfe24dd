use std::fmt;

/// A trust boundary that untrusted data crosses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// Inter-process runtime messages.
    Message,
    /// User-supplied backup files.
    Backup,
    /// Block page query strings.
    Query,
    /// Handoff to the storage collaborator.
    Store,
    /// Configuration documents.
    Config,
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Boundary::Message => write!(f, "message"),
            Boundary::Backup => write!(f, "backup"),
            Boundary::Query => write!(f, "query"),
            Boundary::Store => write!(f, "store"),
            Boundary::Config => write!(f, "config"),
        }
    }
}

/// A logging handle bound to one trust boundary.
///
/// Every event carries a `boundary` field so diagnostics from the gate, the
/// backup decoder and the query decoder can be told apart. Callers pass
/// lengths, kinds and reasons; never the rejected payload.
#[derive(Debug, Clone, Copy)]
pub struct BoundaryLog {
    boundary: Boundary,
}

impl BoundaryLog {
    /// Creates a logger for `boundary`.
    pub fn new(boundary: Boundary) -> Self {
        Self { boundary }
    }

    /// Returns the boundary this logger reports for.
    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    /// Logs an info-level message.
    pub fn info(&self, args: fmt::Arguments<'_>) {
        tracing::info!(target: "activity_guard", boundary = %self.boundary, "{}", args);
    }

    /// Logs a warning-level message.
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        tracing::warn!(target: "activity_guard", boundary = %self.boundary, "{}", args);
    }

    /// Logs a debug-level message.
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(target: "activity_guard", boundary = %self.boundary, "{}", args);
    }

    /// Records that input was turned away at this boundary.
    pub fn rejected(&self, reason: impl fmt::Display) {
        tracing::warn!(
            target: "activity_guard",
            boundary = %self.boundary,
            reason = %reason,
            "input rejected"
        );
    }
}
