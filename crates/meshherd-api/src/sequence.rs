use std::sync::atomic::{AtomicU8, Ordering};

/// Transaction sequence number source shared by every outgoing frame.
///
/// Yields 1..=255 and wraps back to 1; zero is never handed out.
#[derive(Debug, Default)]
pub struct TransactionSequence {
    current: AtomicU8,
}

impl TransactionSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting after `last`, e.g. to resume from a known value.
    pub fn starting_after(last: u8) -> Self {
        Self {
            current: AtomicU8::new(last),
        }
    }

    pub fn next(&self) -> u8 {
        let previous = self
            .current
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                Some(if n == u8::MAX { 1 } else { n + 1 })
            })
            .unwrap_or_else(|n| n);
        if previous == u8::MAX { 1 } else { previous + 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_one() {
        let seq = TransactionSequence::new();
        assert_eq!(seq.next(), 1);
        assert_eq!(seq.next(), 2);
    }

    #[test]
    fn wraps_to_one_skipping_zero() {
        let seq = TransactionSequence::starting_after(254);
        assert_eq!(seq.next(), 255);
        assert_eq!(seq.next(), 1);
    }
}
