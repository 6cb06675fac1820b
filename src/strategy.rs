//! Execution Strategy — one portable truth, one vectorized fast path
//!
//! Each numeric component in this crate ships two implementations of the same
//! contract: a hardware-accelerated kernel and a portable one. The portable
//! kernel is always present and always correct; the accelerated kernel is a
//! speed upgrade selected at runtime. A component's `initialize()` flips its
//! toggle on (if the CPU actually qualifies), `shutdown()` flips it off, and
//! an untouched toggle reads as [`Strategy::Portable`] — so calling any
//! operation before initialization is safe and merely slower.

use std::sync::atomic::{AtomicBool, Ordering};

/// Which kernel a dispatching operation should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Hardware fast path: SSE scalar/vector intrinsics on x86-64,
    /// NEON on aarch64. Attempted only where the CPU qualifies.
    Accelerated,
    /// Plain Rust. The reference implementation for every contract.
    Portable,
}

impl Strategy {
    /// Probe the running CPU for a usable fast path.
    ///
    /// Resolves via the std feature-detection macros, which cache the CPUID
    /// result after the first call.
    #[must_use]
    pub fn detect() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            if is_x86_feature_detected!("sse") {
                return Self::Accelerated;
            }
        }
        #[cfg(target_arch = "aarch64")]
        {
            if std::arch::is_aarch64_feature_detected!("neon") {
                return Self::Accelerated;
            }
        }
        Self::Portable
    }
}

/// Per-component on/off switch for the accelerated path.
///
/// A relaxed atomic: reads never block, and an uninitialized toggle answers
/// [`Strategy::Portable`].
pub(crate) struct Toggle {
    accelerated: AtomicBool,
}

impl Toggle {
    pub(crate) const fn new() -> Self {
        Self {
            accelerated: AtomicBool::new(false),
        }
    }

    /// Detect and, if the CPU qualifies, enable the fast path.
    /// Returns whether the accelerated strategy is now active.
    pub(crate) fn enable(&self, component: &str) -> bool {
        let detected = Strategy::detect();
        let on = detected == Strategy::Accelerated;
        self.accelerated.store(on, Ordering::Relaxed);
        log::debug!("{component}: initialize -> {detected:?}");
        on
    }

    pub(crate) fn disable(&self, component: &str) {
        self.accelerated.store(false, Ordering::Relaxed);
        log::debug!("{component}: shutdown -> Portable");
    }

    pub(crate) fn strategy(&self) -> Strategy {
        if self.accelerated.load(Ordering::Relaxed) {
            Strategy::Accelerated
        } else {
            Strategy::Portable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_does_not_panic() {
        // Whichever CPU runs this, detection must resolve to one of the two.
        let s = Strategy::detect();
        assert!(s == Strategy::Accelerated || s == Strategy::Portable);
    }

    #[test]
    fn test_toggle_defaults_to_portable() {
        let t = Toggle::new();
        assert_eq!(t.strategy(), Strategy::Portable);
    }

    #[test]
    fn test_toggle_roundtrip() {
        let t = Toggle::new();
        let enabled = t.enable("test");
        assert_eq!(enabled, Strategy::detect() == Strategy::Accelerated);
        t.disable("test");
        assert_eq!(t.strategy(), Strategy::Portable);
    }
}
