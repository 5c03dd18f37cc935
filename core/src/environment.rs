//! Dependency injection traits.
//!
//! All external dependencies are abstracted behind traits and injected via
//! an Environment struct, so reducers stay deterministic under test:
//! production wires `SystemClock`/`ThreadRngSource`, tests wire fixed
//! clocks and seeded random sources.

use chrono::{DateTime, Utc};
use rand::Rng;

/// Clock trait - abstracts time operations for testability.
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Randomness trait - abstracts uniform random selection for testability.
///
/// Drawing ticket numbers and raffle winners must be unbiased, so the
/// contract is stated in terms of uniform sampling rather than raw bytes:
/// implementations must make every size-`k` subset (respectively every
/// index) equally likely.
pub trait RandomSource: Send + Sync {
    /// Draw `k` distinct indices uniformly at random from `0..len`.
    ///
    /// The returned order is unspecified; callers that need a stable
    /// presentation sort the mapped values themselves.
    ///
    /// # Panics
    ///
    /// Implementations may panic if `k > len`; callers check bounds first.
    fn sample_indices(&self, len: usize, k: usize) -> Vec<usize>;

    /// Draw one index uniformly at random from `0..len`.
    ///
    /// # Panics
    ///
    /// Implementations may panic if `len == 0`; callers check first.
    fn pick_index(&self, len: usize) -> usize;
}

/// Production random source backed by the thread-local RNG.
///
/// Uses `rand::seq::index::sample`, a uniform partial Fisher-Yates /
/// Floyd selection - every size-`k` subset is equally likely, unlike the
/// comparator-shuffle idiom this replaces.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngSource;

impl RandomSource for ThreadRngSource {
    fn sample_indices(&self, len: usize, k: usize) -> Vec<usize> {
        rand::seq::index::sample(&mut rand::thread_rng(), len, k).into_vec()
    }

    fn pick_index(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}
