//! # Rifa Testing
//!
//! Testing utilities and helpers for the rifa storefront architecture.
//!
//! This crate provides:
//! - Mock implementations of Environment traits (fixed clock,
//!   deterministic random sources)
//! - The fluent [`ReducerTest`] harness for Given-When-Then reducer tests
//!
//! ## Example
//!
//! ```ignore
//! use rifa_testing::{ReducerTest, mocks::test_clock};
//!
//! ReducerTest::new(SelectionReducer::new())
//!     .with_env(test_environment())
//!     .given_state(SelectionState::new())
//!     .when_action(SelectionAction::ClearSelection)
//!     .then_state(|state| assert!(state.selection.is_empty()))
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use rifa_core::environment::{Clock, RandomSource};

mod reducer_test;

pub use reducer_test::{ReducerTest, assertions};

/// Mock implementations for testing.
pub mod mocks {
    use super::{Clock, DateTime, RandomSource, Utc};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::sync::Mutex;

    /// Fixed clock for deterministic tests.
    ///
    /// Always returns the same time, making tests reproducible.
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC).
    ///
    /// # Panics
    ///
    /// Panics if the hardcoded timestamp fails to parse, which should
    /// never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Deterministic random source that always picks the lowest indices.
    ///
    /// Useful for unit tests that assert on exact allocations: sampling
    /// `k` of `len` returns `0..k`, and `pick_index` returns `0`.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct FirstKRandom;

    impl RandomSource for FirstKRandom {
        fn sample_indices(&self, len: usize, k: usize) -> Vec<usize> {
            assert!(k <= len, "requested {k} indices from a range of {len}");
            (0..k).collect()
        }

        fn pick_index(&self, len: usize) -> usize {
            assert!(len > 0, "cannot pick from an empty range");
            0
        }
    }

    /// Seeded random source for reproducible statistical tests.
    ///
    /// Backed by `StdRng`, so the draw sequence is fixed per seed while
    /// remaining uniform - the right tool for chi-square style checks.
    #[derive(Debug)]
    pub struct SeededRandom {
        rng: Mutex<StdRng>,
    }

    impl SeededRandom {
        /// Create a seeded random source
        #[must_use]
        pub fn new(seed: u64) -> Self {
            Self {
                rng: Mutex::new(StdRng::seed_from_u64(seed)),
            }
        }
    }

    impl RandomSource for SeededRandom {
        #[allow(clippy::unwrap_used)] // test utility - a poisoned lock is a test bug
        fn sample_indices(&self, len: usize, k: usize) -> Vec<usize> {
            let mut rng = self.rng.lock().unwrap();
            rand::seq::index::sample(&mut *rng, len, k).into_vec()
        }

        #[allow(clippy::unwrap_used)] // test utility - a poisoned lock is a test bug
        fn pick_index(&self, len: usize) -> usize {
            let mut rng = self.rng.lock().unwrap();
            rng.gen_range(0..len)
        }
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, FirstKRandom, SeededRandom, test_clock};
