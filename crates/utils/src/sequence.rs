//! Request sequencing for fetches whose responses can resolve out of order.
//!
//! Every fetch takes a [`SequenceToken`] before it starts. When its response
//! arrives it may only be applied while that token is still the newest one
//! issued; anything older has been superseded and is dropped.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic ticket identifying one issued request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SequenceToken(u64);

impl SequenceToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new token, superseding every token issued before it
    pub fn issue(&self) -> SequenceToken {
        SequenceToken(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_latest(&self, token: SequenceToken) -> bool {
        self.latest.load(Ordering::Acquire) == token.0
    }

    pub fn latest(&self) -> Option<SequenceToken> {
        match self.latest.load(Ordering::Acquire) {
            0 => None,
            n => Some(SequenceToken(n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_monotonic() {
        let sequencer = RequestSequencer::new();
        assert_eq!(sequencer.latest(), None);
        let first = sequencer.issue();
        let second = sequencer.issue();
        assert!(second > first);
        assert_eq!(sequencer.latest(), Some(second));
    }

    #[test]
    fn test_only_newest_token_is_latest() {
        let sequencer = RequestSequencer::new();
        let stale = sequencer.issue();
        assert!(sequencer.is_latest(stale));
        let fresh = sequencer.issue();
        assert!(!sequencer.is_latest(stale));
        assert!(sequencer.is_latest(fresh));
    }

    #[test]
    fn test_concurrent_issue_never_repeats() {
        let sequencer = std::sync::Arc::new(RequestSequencer::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let sequencer = sequencer.clone();
                std::thread::spawn(move || {
                    (0..100)
                        .map(|_| sequencer.issue().value())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        let mut all: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 800);
        assert_eq!(sequencer.latest().map(|t| t.value()), Some(800));
    }
}
