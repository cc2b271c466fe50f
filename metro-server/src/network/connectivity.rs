//! Undirected reachability over the platform graph.

use std::collections::{BTreeMap, HashSet, VecDeque};

use crate::domain::PlatformId;

use super::graph::Network;

/// Whether every platform is reachable from the first one, ignoring hop
/// direction.
///
/// An empty network counts as connected. Only used to annotate overview
/// output; routing never depends on it.
pub fn is_connected(network: &Network) -> bool {
    let Some(root) = network.first_id() else {
        return true;
    };

    // Reverse index, built once so each node's incoming hops are O(1) away
    let mut incoming: BTreeMap<&PlatformId, Vec<&PlatformId>> = BTreeMap::new();
    for hop in network.hops() {
        incoming.entry(&hop.to).or_default().push(&hop.from);
    }

    let mut visited: HashSet<&PlatformId> = HashSet::new();
    let mut queue: VecDeque<&PlatformId> = VecDeque::new();
    visited.insert(root);
    queue.push_back(root);

    while let Some(current) = queue.pop_front() {
        let outgoing = network.hops_from(current).iter().map(|hop| &hop.to);
        let reverse = incoming.get(current).into_iter().flatten().copied();

        for next in outgoing.chain(reverse) {
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }

    visited.len() == network.node_count()
}
