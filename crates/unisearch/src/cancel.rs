//! Cooperative cancellation keyed by search generation.
//!
//! Every submitted query gets a monotonically increasing generation number.
//! Starting a new generation implicitly cancels all older ones: matchers
//! carry a [`CancellationToken`] bound to their generation and check it at
//! each natural iteration boundary (per feature, per file).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Tracks the active search generation.
///
/// When a new search starts, call `next_generation()` to get a fresh number.
/// In-flight searches holding tokens for older generations observe
/// cancellation the next time they check.
#[derive(Debug, Default)]
pub struct GenerationTracker {
    active: Arc<AtomicU64>,
}

impl GenerationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the active generation and returns the new number.
    ///
    /// This effectively cancels any in-flight searches using older
    /// generations.
    pub fn next_generation(&self) -> u64 {
        self.active.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Returns the current active generation without incrementing.
    pub fn current(&self) -> u64 {
        self.active.load(Ordering::SeqCst)
    }

    /// Creates a cancellation token bound to the given generation.
    ///
    /// The token reports as cancelled once the active generation has moved
    /// past `generation`.
    pub fn token_for(&self, generation: u64) -> CancellationToken {
        CancellationToken {
            active: Arc::clone(&self.active),
            generation,
        }
    }
}

/// A cancellation token for terminating long-running matcher loops.
#[derive(Clone, Debug)]
pub struct CancellationToken {
    active: Arc<AtomicU64>,
    generation: u64,
}

impl CancellationToken {
    /// Creates a token that is never cancelled.
    ///
    /// Useful for tests or operations that should not be interruptible.
    pub fn noop() -> Self {
        Self {
            active: Arc::new(AtomicU64::new(0)),
            generation: 0,
        }
    }

    /// Checks if this token is still active.
    ///
    /// Returns `Some(())` if still active, `None` if cancelled. This enables
    /// use with the `?` operator for early returns from matcher loops.
    #[inline]
    pub fn is_cancelled(&self) -> Option<()> {
        if self.generation != self.active.load(Ordering::Relaxed) {
            None
        } else {
            Some(())
        }
    }
}

impl Default for CancellationToken {
    /// Default creates a noop token that is never cancelled.
    fn default() -> Self {
        Self::noop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_token_is_never_cancelled() {
        let token = CancellationToken::noop();
        assert!(token.is_cancelled().is_some());
    }

    #[test]
    fn newer_generation_cancels_older_token() {
        let tracker = GenerationTracker::new();
        let generation = tracker.next_generation();
        let token = tracker.token_for(generation);
        assert!(token.is_cancelled().is_some());

        tracker.next_generation();
        assert!(token.is_cancelled().is_none());
    }

    #[test]
    fn current_does_not_advance() {
        let tracker = GenerationTracker::new();
        let generation = tracker.next_generation();
        assert_eq!(tracker.current(), generation);
        assert_eq!(tracker.current(), generation);
    }
}
