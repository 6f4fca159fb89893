use core::cmp::Ordering;

/// A payload stamped with the timestamp of the write that produced it.
///
/// Ordering between timed values is decided by [`TimedValue::compare`], which
/// looks at the timestamp only: two writes at the same instant compare equal
/// whatever they carry. The derived `PartialEq` is structural and is used to
/// compare replica states, never to resolve conflicts.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimedValue<T> {
    payload: T,
    timestamp: i64,
}

/// Removal marker recorded in a dictionary's remove map.
pub type Tombstone = TimedValue<()>;

impl<T> TimedValue<T> {
    /// Stamp `payload` with `timestamp`.
    pub fn new(payload: T, timestamp: i64) -> Self {
        Self { payload, timestamp }
    }

    /// Get the payload.
    #[must_use]
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// Get the timestamp.
    #[must_use]
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Consume the value, returning its payload.
    pub fn into_payload(self) -> T {
        self.payload
    }

    /// Compare two timed values by timestamp only.
    #[must_use]
    pub fn compare<U>(&self, other: &TimedValue<U>) -> Ordering {
        self.timestamp.cmp(&other.timestamp)
    }
}

impl Tombstone {
    /// Create a removal marker at `timestamp`.
    pub fn tombstone(timestamp: i64) -> Self {
        Self::new((), timestamp)
    }
}
