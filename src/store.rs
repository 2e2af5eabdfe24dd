use std::sync::{PoisonError, RwLock};

use crate::error::{StoreError, StoreErrorKind};
use crate::record::ActivityRecord;
use crate::verified::Verified;

/// The storage collaborator: accepts only sanitized record sets.
///
/// # Compile-Time Safety
///
/// `replace_all` takes `Verified<Vec<ActivityRecord>>`, and only this crate's
/// decoders can produce one. Raw JSON or `Tainted` values cannot reach
/// storage.
///
/// Implementations must make `replace_all` atomic from a reader's point of
/// view: readers see the old set or the new set, never a mix.
///
/// # Examples
///
/// ```
/// use activity_guard::{ActivityStore, BackupDecoder, MemoryStore, Tainted};
///
/// let store = MemoryStore::new();
/// let records = BackupDecoder::default()
///     .decode(Tainted::new(r#"[{"url":"a.example","summaryTime":5}]"#.to_string()))
///     .unwrap();
///
/// store.replace_all(records).unwrap();
/// assert_eq!(store.len(), 1);
///
/// store.clear_all().unwrap();
/// assert!(store.is_empty());
/// ```
// BREAKING CHANGE WARNING: replace_all MUST keep taking Verified<...>.
// Accepting raw records or JSON lets unsanitized data into storage (CWE-79).
pub trait ActivityStore {
    /// Replaces every stored record with `records`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the write fails; the previous contents must
    /// then remain in place.
    fn replace_all(&self, records: Verified<Vec<ActivityRecord>>) -> Result<(), StoreError>;

    /// Removes every stored record.
    fn clear_all(&self) -> Result<(), StoreError> {
        self.replace_all(Verified::new_unchecked(Vec::new()))
    }
}

/// An in-memory [`ActivityStore`].
///
/// A replace swaps the whole vector under a write lock, so concurrent
/// readers never see a partial restore.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<ActivityRecord>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.with_records(<[ActivityRecord]>::len)
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Provides borrowed access to the stored records via callback.
    ///
    /// The read lock is held for the duration of `f`.
    pub fn with_records<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[ActivityRecord]) -> R,
    {
        let guard = self.records.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Returns a copy of the stored records.
    pub fn snapshot(&self) -> Vec<ActivityRecord> {
        self.with_records(<[ActivityRecord]>::to_vec)
    }
}

impl ActivityStore for MemoryStore {
    fn replace_all(&self, records: Verified<Vec<ActivityRecord>>) -> Result<(), StoreError> {
        let mut guard = self.records.write().map_err(|_| {
            StoreError::with_message(StoreErrorKind::Unavailable, "store lock poisoned")
        })?;
        *guard = records.into_inner();
        Ok(())
    }
}
