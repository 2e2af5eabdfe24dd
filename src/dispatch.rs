//! Message routing into the storage collaborator.
//!
//! This is the only place where a gate verdict turns into a storage write.
//! Every path either completes one `replace_all` or leaves storage untouched.

use serde_json::Value;

use crate::error::{BackupErrorKind, StoreError};
use crate::gate::Command;
use crate::guard::Guard;
use crate::logging::{Boundary, BoundaryLog};
use crate::store::ActivityStore;
use crate::tainted::Tainted;

/// What happened to one incoming message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The gate rejected the message's shape.
    Dropped,
    /// Valid shape, but no handler for its tag.
    Ignored,
    /// All stored activity was cleared.
    Cleared,
    /// Stored activity was replaced with this many records.
    Restored(usize),
    /// A restore payload was rejected; storage was not touched.
    RestoreRejected(BackupErrorKind),
}

/// Routes gated messages to an [`ActivityStore`].
///
/// # Examples
///
/// ```
/// use activity_guard::{Dispatcher, Guard, MemoryStore, Outcome, Tainted};
/// use serde_json::json;
///
/// let dispatcher = Dispatcher::new(Guard::default(), MemoryStore::new());
///
/// let outcome = dispatcher
///     .handle(Tainted::new(json!({"message": "Restore", "data": [{"url": "a.example"}]})))
///     .unwrap();
/// assert_eq!(outcome, Outcome::Restored(1));
///
/// assert_eq!(dispatcher.handle(Tainted::new(json!(null))).unwrap(), Outcome::Dropped);
/// ```
#[derive(Debug)]
pub struct Dispatcher<S> {
    guard: Guard,
    store: S,
    log: BoundaryLog,
}

impl<S: ActivityStore> Dispatcher<S> {
    /// Creates a dispatcher writing to `store`.
    pub fn new(guard: Guard, store: S) -> Self {
        Self {
            guard,
            store,
            log: BoundaryLog::new(Boundary::Store),
        }
    }

    /// Returns the guard, e.g. to decode backups with the same config.
    pub fn guard(&self) -> &Guard {
        &self.guard
    }

    /// Returns the guard mutably, for [`Guard::reload`].
    pub fn guard_mut(&mut self) -> &mut Guard {
        &mut self.guard
    }

    /// Returns the store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Gates and handles one message.
    ///
    /// Invalid messages and rejected payloads are reported through
    /// [`Outcome`], never as errors.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] only if the store itself fails a write.
    pub fn handle(&self, raw: Tainted<Value>) -> Result<Outcome, StoreError> {
        let Some(message) = self.guard.admit(raw) else {
            return Ok(Outcome::Dropped);
        };

        match message.command() {
            None => {
                self.log.debug(format_args!(
                    "no handler for tag of {} bytes",
                    message.tag().len()
                ));
                Ok(Outcome::Ignored)
            }
            Some(Command::ClearAllData) => {
                self.store.clear_all()?;
                self.log.info(format_args!("cleared all activity"));
                Ok(Outcome::Cleared)
            }
            Some(Command::Restore) => {
                let payload = Tainted::new(message.into_payload());
                match self.guard.normalize_payload(payload) {
                    Ok(records) => {
                        let count = records.as_ref().len();
                        self.store.replace_all(records)?;
                        self.log.info(format_args!("restored {} records", count));
                        Ok(Outcome::Restored(count))
                    }
                    Err(err) => {
                        self.log.rejected(format_args!("restore payload: {}", err.detail()));
                        Ok(Outcome::RestoreRejected(err.kind()))
                    }
                }
            }
        }
    }
}
