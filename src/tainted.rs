use std::fmt;

/// A wrapper for data that crossed a trust boundary and has not been sanitized.
///
/// `Tainted<T>` marks raw backup text, inter-process messages and block page
/// URLs. The wrapped value is only reachable from inside this crate, so the
/// only way to turn it into something the storage layer accepts is to run it
/// through a decoder or the gate.
///
/// # Security Properties
///
/// - Does NOT implement `Deref` or any implicit conversion traits
/// - Inner value is inaccessible to callers outside the crate
/// - `Debug` reports only the wrapper, never the payload
///
/// # Examples
///
/// ```
/// use activity_guard::Tainted;
///
/// let upload = Tainted::new("[{\"url\":\"<script>x()</script>\"}]".to_string());
///
/// // Debug output does not echo the payload
/// assert_eq!(format!("{:?}", upload), "Tainted(..)");
/// ```
#[derive(Clone)]
pub struct Tainted<T> {
    // BREAKING CHANGE WARNING: This field MUST remain private.
    // Making it public lets unsanitized data reach storage (CWE-20).
    inner: T,
}

impl<T> Tainted<T> {
    /// Wraps an untrusted value in `Tainted`.
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    /// Borrows the raw value for validation.
    ///
    /// `pub(crate)`: only decoders and the gate may look inside.
    pub(crate) fn peek(&self) -> &T {
        &self.inner
    }

    /// Extracts the raw value for validation.
    ///
    /// BREAKING CHANGE WARNING: Changing visibility to `pub` bypasses every
    /// decoder in the crate (CWE-74, CWE-79).
    pub(crate) fn into_inner(self) -> T {
        self.inner
    }
}

// BREAKING CHANGE WARNING: Do NOT add Deref, AsRef, Borrow, From<T> or Into<T>.

impl<T> fmt::Debug for Tainted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Tainted(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tainted_debug_hides_payload() {
        let upload = Tainted::new("<script>alert(1)</script>".to_string());
        let debug_output = format!("{:?}", upload);

        assert_eq!(debug_output, "Tainted(..)");
        assert!(!debug_output.contains("script"));
    }

    #[test]
    fn tainted_inner_is_crate_visible() {
        let tainted = Tainted::new(42);
        assert_eq!(*tainted.peek(), 42);
        assert_eq!(tainted.into_inner(), 42);
    }

    mod proptests {
        use super::*;
        use crate::{sanitizer::scrub_text, test_utils::arb_hostile_text};
        use proptest::prelude::*;

        proptest! {
            /// Property: Cloning a Tainted value results in identical scrubbing outcomes
            #[test]
            fn proptest_tainted_clone_preserves_value(input in arb_hostile_text()) {
                let tainted1 = Tainted::new(input);
                let tainted2 = tainted1.clone();

                prop_assert_eq!(scrub_text(tainted1.peek()), scrub_text(&tainted2.into_inner()));
            }
        }
    }
}
