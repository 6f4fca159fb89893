//! Timestamp sources for dictionary replicas.
//!
//! A replica never generates timestamps itself: it asks the [`Clock`] it was
//! constructed with. The contract a clock must honor is that values returned
//! to one replica are unique, never decrease, and follow that replica's
//! causal order of operations. Nothing in the dictionary verifies it.
//!
//! Two clocks are provided:
//! - [`ManualClock`] holds whatever value it was last set to. Useful for
//!   tests and simulations that need exact control over timestamps.
//! - [`HybridClock`] combines physical time with a logical counter so that
//!   timestamps are strictly increasing even when the physical clock stalls
//!   or goes backward.
//!
//! # Example
//!
//! ```
//! use lww_dict::clock::{Clock, HybridClock};
//!
//! let clock = HybridClock::new();
//!
//! let ts1 = clock.now();
//! let ts2 = clock.now();
//! assert!(ts2 > ts1);
//!
//! // Fold in a timestamp observed on a remote replica
//! let remote = ts2 + (1000 << HybridClock::LOGICAL_BITS);
//! let ts3 = clock.receive(remote);
//! assert!(ts3 > remote);
//! ```

use alloc::rc::Rc;
use alloc::sync::Arc;
use core::cmp;
use core::sync::atomic::{AtomicI64, Ordering};

/// A source of timestamps for local writes.
///
/// Takes `&self` so that one clock can be shared between several replicas
/// through a reference, an [`Rc`] or an [`Arc`].
pub trait Clock {
    /// Get the timestamp for the next local write.
    fn now(&self) -> i64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> i64 {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now(&self) -> i64 {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> i64 {
        (**self).now()
    }
}

/// A clock that reports whatever time it was last set to.
#[derive(Debug, Default)]
pub struct ManualClock {
    time: AtomicI64,
}

impl ManualClock {
    /// Create a clock reading 0.
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Create a clock reading `time`.
    pub fn starting_at(time: i64) -> Self {
        Self {
            time: AtomicI64::new(time),
        }
    }

    /// Set the current time.
    pub fn set(&self, time: i64) {
        self.time.store(time, Ordering::SeqCst);
    }

    /// Move the current time forward by `by` and return the new reading.
    pub fn advance(&self, by: i64) -> i64 {
        self.time.fetch_add(by, Ordering::SeqCst) + by
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.time.load(Ordering::SeqCst)
    }
}

/// A Hybrid Logical Clock packed into a single `i64`.
///
/// The upper bits hold physical milliseconds, the lower
/// [`LOGICAL_BITS`](Self::LOGICAL_BITS) a counter for events within the
/// same millisecond. Packed timestamps order the same way as the
/// `(physical, logical)` pairs they encode.
#[derive(Debug)]
pub struct HybridClock {
    last: AtomicI64,
    /// Function to get the current physical time in milliseconds.
    /// On `std`, this defaults to `SystemTime`. On `no_std`, you provide it.
    physical_time_fn: fn() -> u64,
}

#[cfg(feature = "std")]
fn system_time_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(not(feature = "std"))]
fn fallback_time_ms() -> u64 {
    0 // In no_std, user must provide a time source
}

impl HybridClock {
    /// Number of low bits reserved for the logical counter.
    pub const LOGICAL_BITS: u32 = 16;

    const MAX_PHYSICAL: u64 = (i64::MAX >> Self::LOGICAL_BITS) as u64;

    /// Create a clock backed by the system time.
    ///
    /// On `no_std` targets the physical component is always 0, so the clock
    /// degrades to a plain logical counter. Use
    /// [`with_time_source`](Self::with_time_source) to supply real time.
    pub fn new() -> Self {
        #[cfg(feature = "std")]
        let physical_time_fn: fn() -> u64 = system_time_ms;
        #[cfg(not(feature = "std"))]
        let physical_time_fn: fn() -> u64 = fallback_time_ms;
        Self::with_time_source(physical_time_fn)
    }

    /// Create a clock with a custom physical time source.
    /// The function should return milliseconds (monotonic if possible).
    pub fn with_time_source(time_fn: fn() -> u64) -> Self {
        Self {
            last: AtomicI64::new(i64::MIN),
            physical_time_fn: time_fn,
        }
    }

    /// Pack a `(physical, logical)` pair into a timestamp.
    #[must_use]
    pub fn pack(physical: u64, logical: u16) -> i64 {
        let physical = cmp::min(physical, Self::MAX_PHYSICAL) as i64;
        (physical << Self::LOGICAL_BITS) | i64::from(logical)
    }

    /// Physical milliseconds encoded in a timestamp.
    #[must_use]
    pub fn physical(timestamp: i64) -> u64 {
        (timestamp >> Self::LOGICAL_BITS) as u64
    }

    /// Logical counter encoded in a timestamp.
    #[must_use]
    pub fn logical(timestamp: i64) -> u16 {
        (timestamp & 0xFFFF) as u16
    }

    /// Fold a timestamp observed on another replica into this clock.
    ///
    /// Returns a new timestamp strictly greater than both the local clock
    /// and `remote`.
    pub fn receive(&self, remote: i64) -> i64 {
        self.last.fetch_max(remote, Ordering::SeqCst);
        self.now()
    }

    /// Get the last generated timestamp, if any.
    pub fn last_timestamp(&self) -> Option<i64> {
        match self.last.load(Ordering::SeqCst) {
            i64::MIN => None,
            last => Some(last),
        }
    }
}

impl Default for HybridClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for HybridClock {
    /// Generate a timestamp for a local event.
    ///
    /// Guarantees strictly increasing timestamps even if the physical clock
    /// goes backward.
    fn now(&self) -> i64 {
        let wall = Self::pack((self.physical_time_fn)(), 0);
        let next = |last: i64| cmp::max(wall, last.saturating_add(1));
        let prev = match self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(next(last)))
        {
            Ok(prev) | Err(prev) => prev,
        };
        next(prev)
    }
}
