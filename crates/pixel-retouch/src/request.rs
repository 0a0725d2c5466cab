//! Sequence-numbered pass requests.
//!
//! Parameter changes can arrive faster than passes complete. Every request
//! carries a [`Sequence`] drawn from a [`Generation`]; a finished pass is
//! committed only if its sequence is still the latest one issued, so a slow
//! early pass can never overwrite a newer result.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::retouch::RetouchSettings;
use crate::tone::ToneParams;

/// Monotonic request number. Larger is newer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sequence(pub u64);

impl std::fmt::Display for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Issues sequences and answers "is this still the newest request?".
///
/// Shared between the task that issues requests and the workers that finish
/// them; all operations take `&self`.
#[derive(Debug, Default)]
pub struct Generation {
    latest: AtomicU64,
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next sequence. The first call returns `Sequence(1)`.
    pub fn next(&self) -> Sequence {
        Sequence(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Most recently issued sequence (`Sequence(0)` before any request).
    pub fn latest(&self) -> Sequence {
        Sequence(self.latest.load(Ordering::Acquire))
    }

    /// True if no request has been issued after `sequence`.
    pub fn is_latest(&self, sequence: Sequence) -> bool {
        self.latest() == sequence
    }
}

/// A result tagged with the request that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Stamped<T> {
    pub sequence: Sequence,
    pub value: T,
}

impl<T> Stamped<T> {
    pub fn new(sequence: Sequence, value: T) -> Self {
        Self { sequence, value }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Stamped<U> {
        Stamped {
            sequence: self.sequence,
            value: f(self.value),
        }
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

/// A retouch pass with its sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct RetouchRequest {
    pub sequence: Sequence,
    pub settings: RetouchSettings,
}

/// A tone-grading pass with its sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeRequest {
    pub sequence: Sequence,
    pub params: ToneParams,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_sequences_increase() {
        let generation = Generation::new();
        assert_eq!(generation.latest(), Sequence(0));
        assert_eq!(generation.next(), Sequence(1));
        assert_eq!(generation.next(), Sequence(2));
        assert_eq!(generation.latest(), Sequence(2));
    }

    #[test]
    fn test_only_newest_is_latest() {
        let generation = Generation::new();
        let first = generation.next();
        assert!(generation.is_latest(first));

        let second = generation.next();
        assert!(!generation.is_latest(first));
        assert!(generation.is_latest(second));
    }

    #[test]
    fn test_concurrent_issue_is_unique() {
        let generation = Arc::new(Generation::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let generation = Arc::clone(&generation);
                std::thread::spawn(move || (0..100).map(|_| generation.next().0).collect::<Vec<_>>())
            })
            .collect();

        let mut all: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 400);
        assert_eq!(generation.latest(), Sequence(400));
    }

    #[test]
    fn test_stamped_map_keeps_sequence() {
        let stamped = Stamped::new(Sequence(7), 21).map(|v| v * 2);
        assert_eq!(stamped.sequence, Sequence(7));
        assert_eq!(stamped.into_inner(), 42);
    }

    #[test]
    fn test_sequence_display() {
        assert_eq!(Sequence(12).to_string(), "#12");
    }
}
