//! Convenient re-exports for common usage.
//!
//! ```
//! use lww_dict::prelude::*;
//! ```

pub use crate::clock::{Clock, HybridClock, ManualClock};
pub use crate::Crdt;
pub use crate::DeltaCrdt;
pub use crate::LWWDictDelta;
pub use crate::LWWElementDict;
pub use crate::ReplicaState;
pub use crate::TimedValue;
pub use crate::Tombstone;
