/// Core trait for state-based replicated data types.
///
/// Replicas are updated independently and later reconciled by merging their
/// states. Once every replica has merged every other, they hold the same
/// state without any coordination having taken place.
///
/// # Properties
///
/// All implementations must satisfy:
/// - **Commutativity:** `a.merge(b) == b.merge(a)`
/// - **Associativity:** `a.merge(b.merge(c)) == a.merge(b).merge(c)`
/// - **Idempotency:** `a.merge(a) == a`
pub trait Crdt {
    /// Merge another replica's state into this one.
    ///
    /// After merging, `self` holds the reconciled state of both replicas.
    fn merge(&mut self, other: &Self);
}

/// Extension trait for delta-state replicated types.
///
/// Instead of shipping the full state to a peer, a replica computes the
/// part of its state the peer would actually adopt and ships only that.
///
/// # Example
///
/// ```
/// use lww_dict::prelude::*;
///
/// let clock = ManualClock::starting_at(1);
/// let mut a = LWWElementDict::new(1, &clock);
/// let mut b = LWWElementDict::new(2, &clock);
/// a.add("x", 10);
/// b.add("y", 20);
///
/// // Generate a delta from `a` that `b` doesn't have
/// let delta = a.delta(&b);
/// assert_eq!(delta.len(), 1);
///
/// b.apply_delta(&delta);
/// assert!(b.lookup(&"x"));
/// ```
pub trait DeltaCrdt: Crdt {
    /// The type of delta produced by this type.
    type Delta;

    /// Generate a delta containing the state in `self` that `other` would
    /// adopt when merging `self`.
    fn delta(&self, other: &Self) -> Self::Delta;

    /// Apply a delta to this replica's state.
    ///
    /// Applying `a.delta(&b)` to `b` is equivalent to `b.merge(&a)`.
    fn apply_delta(&mut self, delta: &Self::Delta);
}
