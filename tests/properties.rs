//! Property tests for the merge algebra.
//!
//! Replicas are driven by random operation sequences. Unless a test says
//! otherwise the shared clock ticks before every write, so timestamps are
//! unique across replicas as the clock contract requires.

use lww_dict::prelude::*;
use proptest::prelude::*;

type Dict<'c> = LWWElementDict<u8, u16, &'c ManualClock>;

const REPLICAS: usize = 3;

#[derive(Debug, Clone)]
enum Op {
    Add { replica: usize, key: u8, value: u16 },
    Remove { replica: usize, key: u8 },
    Merge { from: usize, into: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let replica = 0..REPLICAS;
    let key = 0u8..6;
    prop_oneof![
        3 => (replica.clone(), key.clone(), any::<u16>())
            .prop_map(|(replica, key, value)| Op::Add { replica, key, value }),
        2 => (replica.clone(), key).prop_map(|(replica, key)| Op::Remove { replica, key }),
        1 => (replica.clone(), replica).prop_map(|(from, into)| Op::Merge { from, into }),
    ]
}

/// Run `ops` against fresh replicas with ids 1..=3.
///
/// `ticks[i]` decides whether the clock advances before the i-th operation.
fn run<'c>(clock: &'c ManualClock, ops: &[Op], ticks: &[bool]) -> Vec<Dict<'c>> {
    let mut replicas: Vec<Dict<'c>> = (1..=REPLICAS as u64)
        .map(|id| LWWElementDict::new(id, clock))
        .collect();
    for (i, op) in ops.iter().enumerate() {
        if ticks.get(i).copied().unwrap_or(true) {
            clock.advance(1);
        }
        match *op {
            Op::Add { replica, key, value } => {
                replicas[replica].add(key, value);
            }
            Op::Remove { replica, key } => {
                replicas[replica].remove(&key);
            }
            Op::Merge { from, into } => {
                let other = replicas[from].clone();
                replicas[into].merge(&other);
            }
        }
    }
    replicas
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    #[test]
    fn merge_idempotent(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let clock = ManualClock::new();
        for replica in run(&clock, &ops, &[]) {
            let merged = replica.merged(&replica);
            prop_assert_eq!(merged.values(), replica.values());
            prop_assert_eq!(merged, replica);
        }
    }

    #[test]
    fn merge_commutative(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let clock = ManualClock::new();
        let r = run(&clock, &ops, &[]);
        prop_assert_eq!(r[0].merged(&r[1]).values(), r[1].merged(&r[0]).values());
        prop_assert_eq!(r[1].merged(&r[2]).values(), r[2].merged(&r[1]).values());
    }

    #[test]
    fn merge_associative(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let clock = ManualClock::new();
        let r = run(&clock, &ops, &[]);
        let left = r[0].merged(&r[1]).merged(&r[2]);
        let right = r[0].merged(&r[1].merged(&r[2]));
        prop_assert_eq!(left.values(), right.values());
    }

    #[test]
    fn merge_commutative_with_timestamp_ties(
        ops in prop::collection::vec(op_strategy(), 0..40),
        ticks in prop::collection::vec(any::<bool>(), 40),
    ) {
        let clock = ManualClock::new();
        let r = run(&clock, &ops, &ticks);
        prop_assert_eq!(r[0].merged(&r[2]).values(), r[2].merged(&r[0]).values());
        prop_assert_eq!(r[0].merged(&r[0]).values(), r[0].values());
    }

    #[test]
    fn delta_equivalent_to_merge(
        ops in prop::collection::vec(op_strategy(), 0..40),
        ticks in prop::collection::vec(any::<bool>(), 40),
    ) {
        let clock = ManualClock::new();
        let r = run(&clock, &ops, &ticks);
        for (a, b) in [(0, 1), (1, 0), (2, 0)] {
            let mut via_delta = r[b].clone();
            via_delta.apply_delta(&r[a].delta(&r[b]));
            prop_assert_eq!(via_delta, r[b].merged(&r[a]));
        }
    }

    #[test]
    fn merged_replicas_converge(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let clock = ManualClock::new();
        let r = run(&clock, &ops, &[]);
        let all = r[0].merged(&r[1]).merged(&r[2]);
        let others = r[2].merged(&r[0]).merged(&r[1]);
        prop_assert_eq!(all.values(), others.values());
        prop_assert!(r[1].merged(&all).delta(&all).is_empty());
    }
}
