//! Progress reporting and cooperative cancellation.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Blocks placed so far out of the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Blocks fully placed, including every slice of split blocks
    pub processed: usize,
    /// Blocks in the input
    pub total: usize,
}

impl Progress {
    /// Completion as a rounded percentage (0-100).
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        let pct = (self.processed.min(self.total) as f64 / self.total as f64 * 100.0).round();
        pct as u8
    }

    /// Whether every block has been placed.
    pub fn is_complete(&self) -> bool {
        self.processed >= self.total
    }
}

/// Cancellation token checked before each block.
///
/// Clones share state, so one handle can be given to the paginator and
/// another kept by the caller.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token in the non-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested on this token or any clone.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_rounds() {
        assert_eq!(Progress { processed: 1, total: 3 }.percent(), 33);
        assert_eq!(Progress { processed: 2, total: 3 }.percent(), 67);
        assert_eq!(Progress { processed: 3, total: 3 }.percent(), 100);
        assert_eq!(Progress { processed: 0, total: 0 }.percent(), 100);
    }

    #[test]
    fn test_token_shared_between_clones() {
        let token = CancellationToken::new();
        let worker = token.clone();
        assert!(!worker.is_cancelled());

        token.cancel();
        token.cancel();
        assert!(worker.is_cancelled());
    }
}
