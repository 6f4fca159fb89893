use alloc::collections::BTreeMap;
use core::cmp::Ordering;

use crate::clock::Clock;
use crate::timed_value::{TimedValue, Tombstone};
use crate::{Crdt, DeltaCrdt};

/// A last-writer-wins element dictionary (LWW-Element-Dict).
///
/// Keeps two independent histories over the same key space: `adds` records
/// the latest write of every key, `removes` the latest removal. A key is
/// present when it has been added and not removed later; an add and a remove
/// at the same timestamp leave the key present.
///
/// Concurrent writes to the same key on different replicas are resolved by
/// timestamp, and equal timestamps by replica id: the lower id wins, so the
/// outcome does not depend on which side of the merge a replica sits.
///
/// Local access is single-threaded: wrap a replica in a mutex if several
/// threads need to write to it.
///
/// # Example
///
/// ```
/// use lww_dict::prelude::*;
///
/// let clock = ManualClock::starting_at(1);
/// let mut d1 = LWWElementDict::new(1, &clock);
/// d1.add("a", "foo");
///
/// let mut d2 = LWWElementDict::new(2, &clock).merged(&d1);
/// clock.set(5);
/// d2.add("a", "bar");
/// clock.set(8);
/// d1.remove(&"a");
///
/// // The latest write is a remove, whichever side merges
/// assert!(d1.merged(&d2).values().is_empty());
/// assert!(d2.merged(&d1).values().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct LWWElementDict<K: Ord + Clone, V: Clone, C: Clock, R: Ord + Clone = u64> {
    id: R,
    clock: C,
    adds: BTreeMap<K, TimedValue<V>>,
    removes: BTreeMap<K, Tombstone>,
}

/// The replicated state of a dictionary, detached from its clock.
///
/// This is what a transport ships between replicas. Rebuild a dictionary
/// from it with [`LWWElementDict::from_snapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReplicaState<K: Ord, V, R = u64> {
    /// Id of the replica the state was taken from.
    pub id: R,
    /// Latest add of every key.
    pub adds: BTreeMap<K, TimedValue<V>>,
    /// Latest remove of every key.
    pub removes: BTreeMap<K, Tombstone>,
}

/// The entries of one replica that another would adopt when merging it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LWWDictDelta<K: Ord, V, R = u64> {
    origin: R,
    adds: BTreeMap<K, TimedValue<V>>,
    removes: BTreeMap<K, Tombstone>,
}

impl<K: Ord, V, R> LWWDictDelta<K, V, R> {
    /// Id of the replica that produced the delta.
    pub fn origin(&self) -> &R {
        &self.origin
    }

    /// Number of entries carried, adds and removes together.
    #[must_use]
    pub fn len(&self) -> usize {
        self.adds.len() + self.removes.len()
    }

    /// Check if the delta carries nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adds.is_empty() && self.removes.is_empty()
    }
}

impl<K, V, C, R> LWWElementDict<K, V, C, R>
where
    K: Ord + Clone,
    V: Clone,
    C: Clock,
    R: Ord + Clone,
{
    /// Create an empty dictionary for replica `id`, stamping writes with
    /// `clock`.
    pub fn new(id: R, clock: C) -> Self {
        Self {
            id,
            clock,
            adds: BTreeMap::new(),
            removes: BTreeMap::new(),
        }
    }

    /// Rebuild a dictionary from a replicated state.
    pub fn from_snapshot(state: ReplicaState<K, V, R>, clock: C) -> Self {
        Self {
            id: state.id,
            clock,
            adds: state.adds,
            removes: state.removes,
        }
    }

    /// Copy out the replicated state, without the clock.
    #[must_use]
    pub fn snapshot(&self) -> ReplicaState<K, V, R> {
        ReplicaState {
            id: self.id.clone(),
            adds: self.adds.clone(),
            removes: self.removes.clone(),
        }
    }

    /// Add or update a key with a fresh timestamp.
    ///
    /// Returns `false` without touching the state when the recorded add for
    /// `key` is at least as recent as the clock's reading.
    pub fn add(&mut self, key: K, value: V) -> bool {
        let candidate = TimedValue::new(value, self.clock.now());
        if let Some(existing) = self.adds.get(&key) {
            if existing.compare(&candidate) != Ordering::Less {
                tracing::trace!(
                    timestamp = candidate.timestamp(),
                    recorded = existing.timestamp(),
                    "ignoring stale add"
                );
                return false;
            }
        }
        self.adds.insert(key, candidate);
        true
    }

    /// Remove a present key with a fresh timestamp.
    ///
    /// Returns `false` without touching the state when the key is not
    /// present or the recorded remove is at least as recent as the clock's
    /// reading.
    pub fn remove(&mut self, key: &K) -> bool {
        if !self.lookup(key) {
            tracing::trace!("ignoring remove of absent key");
            return false;
        }
        let candidate = Tombstone::tombstone(self.clock.now());
        if let Some(existing) = self.removes.get(key) {
            if existing.compare(&candidate) != Ordering::Less {
                tracing::trace!(
                    timestamp = candidate.timestamp(),
                    recorded = existing.timestamp(),
                    "ignoring stale remove"
                );
                return false;
            }
        }
        self.removes.insert(key.clone(), candidate);
        true
    }

    /// Check whether a key is present.
    ///
    /// Biased towards addition: a remove only hides an add with a strictly
    /// older timestamp.
    #[must_use]
    pub fn lookup(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Get the value of a present key.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        let add = self.adds.get(key)?;
        match self.removes.get(key) {
            Some(remove) if remove.compare(add) == Ordering::Greater => None,
            _ => Some(add.payload()),
        }
    }

    /// Iterate over present entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.adds
            .keys()
            .filter_map(move |key| self.get(key).map(|value| (key, value)))
    }

    /// Snapshot of the present entries, without timestamps or tombstones.
    #[must_use]
    pub fn values(&self) -> BTreeMap<K, V> {
        self.iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Number of present entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Check if no entry is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Get this replica's id.
    #[must_use]
    pub fn id(&self) -> &R {
        &self.id
    }

    /// Get the clock stamping this replica's writes.
    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Largest timestamp recorded in either history.
    ///
    /// Feed it to [`HybridClock::receive`](crate::clock::HybridClock::receive)
    /// after adopting a merged state so that later local writes order after
    /// everything this replica has seen.
    #[must_use]
    pub fn max_timestamp(&self) -> Option<i64> {
        let adds = self.adds.values().map(TimedValue::timestamp);
        let removes = self.removes.values().map(TimedValue::timestamp);
        adds.chain(removes).max()
    }

    /// Merge with another replica, returning a new dictionary.
    ///
    /// Neither input is modified. The result keeps this replica's id and
    /// clock. `a.merged(&b)` and `b.merged(&a)` hold the same entries.
    #[must_use]
    pub fn merged(&self, other: &Self) -> Self
    where
        C: Clone,
    {
        let mut result = self.clone();
        result.merge(other);
        result
    }
}

impl<K, V, C, R> PartialEq for LWWElementDict<K, V, C, R>
where
    K: Ord + Clone,
    V: Clone + PartialEq,
    C: Clock,
    R: Ord + Clone,
{
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.adds == other.adds && self.removes == other.removes
    }
}

impl<K, V, C, R> Eq for LWWElementDict<K, V, C, R>
where
    K: Ord + Clone,
    V: Clone + Eq,
    C: Clock,
    R: Ord + Clone,
{
}

/// Whether `ours` survives a merge against `theirs`.
///
/// The newer timestamp wins. On a tie, `ours` is kept unless the other side
/// is dominant, i.e. has the lower replica id.
fn keeps_ours<P, Q>(ours: &TimedValue<P>, theirs: &TimedValue<Q>, dominant: bool) -> bool {
    match ours.compare(theirs) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => !dominant,
    }
}

/// Merge `replica` into `source` key by key, last writer wins.
fn merge_map<K: Ord + Clone, P: Clone>(
    source: &mut BTreeMap<K, TimedValue<P>>,
    replica: &BTreeMap<K, TimedValue<P>>,
    dominant: bool,
) {
    for (key, theirs) in replica {
        let adopt = match source.get(key) {
            Some(ours) => !keeps_ours(ours, theirs, dominant),
            None => true,
        };
        if adopt {
            source.insert(key.clone(), theirs.clone());
        }
    }
}

/// Entries of `ours` that a merge into `theirs` would adopt.
fn diff_map<K: Ord + Clone, P: Clone>(
    ours: &BTreeMap<K, TimedValue<P>>,
    theirs: &BTreeMap<K, TimedValue<P>>,
    dominant: bool,
) -> BTreeMap<K, TimedValue<P>> {
    ours.iter()
        .filter(|(key, value)| match theirs.get(*key) {
            Some(existing) => !keeps_ours(existing, *value, dominant),
            None => true,
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

impl<K, V, C, R> Crdt for LWWElementDict<K, V, C, R>
where
    K: Ord + Clone,
    V: Clone,
    C: Clock,
    R: Ord + Clone,
{
    fn merge(&mut self, other: &Self) {
        let dominant = self.id >= other.id;
        merge_map(&mut self.adds, &other.adds, dominant);
        merge_map(&mut self.removes, &other.removes, dominant);
        tracing::debug!(
            adds = self.adds.len(),
            removes = self.removes.len(),
            "merged replica state"
        );
    }
}

impl<K, V, C, R> DeltaCrdt for LWWElementDict<K, V, C, R>
where
    K: Ord + Clone,
    V: Clone,
    C: Clock,
    R: Ord + Clone,
{
    type Delta = LWWDictDelta<K, V, R>;

    fn delta(&self, other: &Self) -> Self::Delta {
        // Dominance as seen by `other`, the side that will apply the delta.
        let dominant = other.id >= self.id;
        LWWDictDelta {
            origin: self.id.clone(),
            adds: diff_map(&self.adds, &other.adds, dominant),
            removes: diff_map(&self.removes, &other.removes, dominant),
        }
    }

    fn apply_delta(&mut self, delta: &Self::Delta) {
        let dominant = self.id >= delta.origin;
        merge_map(&mut self.adds, &delta.adds, dominant);
        merge_map(&mut self.removes, &delta.removes, dominant);
        tracing::debug!(
            entries = delta.len(),
            adds = self.adds.len(),
            removes = self.removes.len(),
            "applied replica delta"
        );
    }
}
