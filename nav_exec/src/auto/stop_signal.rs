//! # Stop Signal
//!
//! A one-shot flag shared between the perception task, which requests stops, and the navigator,
//! which consumes them. Repeated requests before a consume coalesce into one.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::sync::{Mutex, MutexGuard};

use log::trace;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Concurrency safe one-shot stop request.
///
/// Share between tasks in an `Arc`.
#[derive(Debug, Default)]
pub struct StopSignal {
    state: Mutex<StopState>,
}

#[derive(Debug, Default)]
struct StopState {
    set: bool,

    /// Total number of calls to `request`, including coalesced ones
    num_requests: u64,

    /// Number of times a set signal was consumed
    num_consumed: u64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the signal. Setting an already set signal has no further effect.
    pub fn request(&self) {
        let mut state = self.lock();
        state.set = true;
        state.num_requests += 1;
        trace!("Stop requested ({} total)", state.num_requests);
    }

    /// Atomically test and clear the signal, returning whether it was set.
    pub fn consume_if_set(&self) -> bool {
        let mut state = self.lock();

        if state.set {
            state.set = false;
            state.num_consumed += 1;
            true
        } else {
            false
        }
    }

    /// Returns whether the signal is set, without clearing it.
    pub fn is_set(&self) -> bool {
        self.lock().set
    }

    /// Total number of requests made, including those coalesced into an already set signal.
    pub fn num_requests(&self) -> u64 {
        self.lock().num_requests
    }

    /// Number of requests which have been consumed.
    pub fn num_consumed(&self) -> u64 {
        self.lock().num_consumed
    }

    /// Lock the state. The state is a pair of plain values so a panic while holding the lock
    /// cannot leave it inconsistent, and a poisoned lock is recovered.
    fn lock(&self) -> MutexGuard<'_, StopState> {
        match self.state.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use std::{
        sync::{
            atomic::{AtomicBool, Ordering},
            Arc,
        },
        thread,
    };

    use super::*;

    #[test]
    fn test_consume_once() {
        let sig = StopSignal::new();
        assert!(!sig.consume_if_set());

        sig.request();
        assert!(sig.is_set());
        assert!(sig.consume_if_set());
        assert!(!sig.consume_if_set());
        assert!(!sig.is_set());
    }

    #[test]
    fn test_coalescing() {
        let sig = StopSignal::new();
        sig.request();
        sig.request();
        sig.request();

        assert!(sig.consume_if_set());
        assert!(!sig.consume_if_set());
        assert_eq!(sig.num_requests(), 3);
        assert_eq!(sig.num_consumed(), 1);
    }

    #[test]
    fn test_concurrent() {
        let sig = Arc::new(StopSignal::new());
        let done = Arc::new(AtomicBool::new(false));

        let consumer = {
            let sig = sig.clone();
            let done = done.clone();
            thread::spawn(move || {
                let mut consumed = 0u64;
                while !done.load(Ordering::SeqCst) {
                    if sig.consume_if_set() {
                        consumed += 1;
                    }
                }
                consumed
            })
        };

        let producers: Vec<_> = (0..4)
            .map(|_| {
                let sig = sig.clone();
                thread::spawn(move || {
                    for _ in 0..1000 {
                        sig.request();
                    }
                })
            })
            .collect();

        for p in producers {
            p.join().unwrap();
        }
        done.store(true, Ordering::SeqCst);

        let mut consumed = consumer.join().unwrap();
        if sig.consume_if_set() {
            consumed += 1;
        }

        assert_eq!(sig.num_requests(), 4000);
        assert_eq!(sig.num_consumed(), consumed);
        assert!(consumed >= 1 && consumed <= 4000);
        assert!(!sig.is_set());
    }
}
