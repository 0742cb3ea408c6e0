//! Interrupt-to-main-loop rotation handoff
//!
//! The producer (edge interrupt) only ever adds; the consumer (main loop)
//! swaps the word back to zero. Neither side needs interrupts masked and
//! no increment is lost however the two interleave. On Cortex-M0+ the
//! read-modify-write comes from `portable-atomic`.

use portable_atomic::{AtomicU32, Ordering};

/// Pending rotation count shared between interrupt and main loop
pub struct RotationCounter {
    pending: AtomicU32,
}

impl Default for RotationCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl RotationCounter {
    /// Create a new counter with nothing pending
    pub const fn new() -> Self {
        Self {
            pending: AtomicU32::new(0),
        }
    }

    /// Record one rotation (interrupt context)
    pub fn record_edge(&self) {
        self.pending.fetch_add(1, Ordering::Relaxed);
    }

    /// Take everything recorded since the last call (main loop)
    pub fn take(&self) -> u32 {
        self.pending.swap(0, Ordering::AcqRel)
    }

    /// Pending count without consuming it
    pub fn peek(&self) -> u32 {
        self.pending.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_take_resets() {
        let counter = RotationCounter::new();
        counter.record_edge();
        counter.record_edge();
        assert_eq!(counter.peek(), 2);
        assert_eq!(counter.take(), 2);
        assert_eq!(counter.take(), 0);
    }

    #[test]
    fn test_slow_consumer_loses_nothing() {
        let counter = RotationCounter::new();
        for _ in 0..1000 {
            counter.record_edge();
        }
        assert_eq!(counter.take(), 1000);
    }

    #[test]
    fn test_concurrent_producer_and_consumer() {
        let counter = Arc::new(RotationCounter::new());
        let producer = {
            let counter = Arc::clone(&counter);
            thread::spawn(move || {
                for _ in 0..100_000 {
                    counter.record_edge();
                }
            })
        };

        let mut consumed = 0u32;
        while !producer.is_finished() {
            consumed += counter.take();
        }
        producer.join().unwrap();
        consumed += counter.take();

        assert_eq!(consumed, 100_000);
    }
}
