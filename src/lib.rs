//! # lww-dict
//!
//! A last-writer-wins element dictionary: a replicated key-value map that
//! accepts writes on every replica without coordination and converges once
//! replicas exchange and merge their states.
//!
//! Every write is stamped by the replica's [`Clock`](clock::Clock). A key's
//! presence is derived from two histories, the latest add and the latest
//! remove of that key. When an add and a remove carry the same timestamp,
//! the key stays present.
//!
//! ## `no_std` Support
//!
//! This crate supports `no_std` environments with the `alloc` crate.
//! Disable the default `std` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! lww-dict = { version = "0.1", default-features = false }
//! ```
//!
//! Note: without `std`, [`HybridClock::new`](clock::HybridClock::new) has no
//! physical time source and counts logically only.
//!
//! ## Quick Start
//!
//! ```
//! use lww_dict::prelude::*;
//!
//! let clock = ManualClock::starting_at(1);
//! let mut d1 = LWWElementDict::new(1, &clock);
//! d1.add("a", 1);
//!
//! clock.set(2);
//! let mut d2 = LWWElementDict::new(2, &clock);
//! d2.add("b", 2);
//!
//! d1.merge(&d2);
//! assert_eq!(d1.len(), 2);
//! ```
//!
//! ## The `Crdt` Trait
//!
//! [`LWWElementDict`] implements [`Crdt`], which merges another replica in
//! place, and [`DeltaCrdt`], which ships only the entries a peer is missing.
//! [`LWWElementDict::merged`] is the non-mutating form of the same merge.
//! Merge is commutative, associative, and idempotent as long as the clocks
//! hand out unique timestamps.

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

mod crdt;
mod lww_dict;
mod timed_value;

pub mod clock;
pub mod prelude;

pub use crdt::{Crdt, DeltaCrdt};
pub use lww_dict::{LWWDictDelta, LWWElementDict, ReplicaState};
pub use timed_value::{TimedValue, Tombstone};
