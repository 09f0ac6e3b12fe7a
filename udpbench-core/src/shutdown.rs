use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Process-wide "please stop" flag, observed by every worker and control
/// loop. Registering OS signals onto this flag is the caller's
/// responsibility; this type only carries the flag itself.
#[derive(Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        StopFlag(Arc::new(AtomicBool::new(false)))
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Exposes the underlying atomic for signal registration (e.g. via
    /// `signal_hook::flag::register`). Signal wiring itself lives outside
    /// this crate.
    pub fn raw(&self) -> Arc<AtomicBool> {
        self.0.clone()
    }
}
