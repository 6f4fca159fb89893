//! Example: three replicas of a configuration store gossiping over a
//! simulated network.
//!
//! Run with `RUST_LOG=lww_dict=trace` to see ignored writes and merges.

use lww_dict::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Replicated configuration (LWW-Element-Dict) ===\n");

    let clocks = [HybridClock::new(), HybridClock::new(), HybridClock::new()];
    let mut nodes: Vec<_> = clocks
        .iter()
        .enumerate()
        .map(|(i, clock)| LWWElementDict::new(i as u64 + 1, clock))
        .collect();

    nodes[0].add("region", "eu-west");
    nodes[0].add("replicas", "3");
    println!("Node 1 writes: {:?}", nodes[0].values());

    // Node 2 syncs with node 1, then both keep writing while partitioned
    let from_node_1 = nodes[0].delta(&nodes[1]);
    nodes[1].apply_delta(&from_node_1);
    println!("Node 2 after sync: {:?}", nodes[1].values());

    nodes[0].remove(&"replicas");
    nodes[1].add("region", "us-east");
    nodes[2].add("feature-flag", "on");

    println!("\n--- Partitioned writes ---");
    for node in &nodes {
        println!("Node {}: {:?}", node.id(), node.values());
    }

    // Anti-entropy: every node merges every other
    let snapshots: Vec<_> = nodes.iter().map(|node| node.snapshot()).collect();
    for (node, clock) in nodes.iter_mut().zip(&clocks) {
        for state in &snapshots {
            node.merge(&LWWElementDict::from_snapshot(state.clone(), clock));
        }
        if let Some(seen) = node.max_timestamp() {
            clock.receive(seen);
        }
    }

    println!("\n--- After anti-entropy ---");
    for node in &nodes {
        println!("Node {}: {:?}", node.id(), node.values());
    }
}
