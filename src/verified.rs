/// A wrapper for data that has been through the Sanitization Core.
///
/// `Verified<T>` is what decoders hand to the storage collaborator. Unlike raw
/// values or [`Tainted<T>`](crate::Tainted), it proves that the value was
/// produced by one of this crate's decoding paths.
///
/// # Construction Invariants
///
/// `Verified<T>` cannot be constructed by external code. There is no public
/// constructor and no `From<T>` implementation. Construction is restricted to
/// `new_unchecked`, which is `pub(crate)` and only called after sanitization.
///
/// # Security Properties
///
/// - No public construction (enforces the sanitization bottleneck)
/// - Does NOT implement `Deref` (explicit access only)
/// - Does NOT implement `Default`
///
/// # Examples
///
/// External callers cannot create `Verified<T>` directly:
///
/// ```compile_fail
/// use activity_guard::Verified;
///
/// let verified = Verified::new(Vec::<u8>::new());
/// ```
///
/// Verified values come out of decoders:
///
/// ```
/// use activity_guard::{BackupDecoder, Tainted};
///
/// let decoder = BackupDecoder::default();
/// let raw = Tainted::new(r#"[{"url":"https://a.example","summaryTime":3}]"#.to_string());
/// let records = decoder.decode(raw).expect("valid backup");
///
/// assert_eq!(records.as_ref().len(), 1);
/// assert_eq!(records.into_inner()[0].summary_time(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verified<T> {
    inner: T,
}

impl<T> Verified<T> {
    /// Creates a `Verified<T>` without performing validation.
    ///
    /// # Safety (Policy-Level)
    ///
    /// Callers inside the crate must have passed the value through the
    /// Sanitization Core first. This is a policy requirement, not a
    /// memory-safety one.
    pub(crate) fn new_unchecked(value: T) -> Self {
        Self { inner: value }
    }

    /// Consumes the `Verified<T>` and returns the inner value.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T> AsRef<T> for Verified<T> {
    fn as_ref(&self) -> &T {
        &self.inner
    }
}
