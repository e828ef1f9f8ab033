//! Cooperative cancellation token.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Clonable cancellation flag shared between an evaluation and its owner.
///
/// Triggering is sticky until [`Interrupt::reset`]. Evaluation observes the
/// flag at checkpoints only, so a triggered interrupt stops work at the next
/// method execution or aggregate row.
#[derive(Clone, Debug, Default)]
pub struct Interrupt(Arc<AtomicBool>);

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn trigger(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }
}
