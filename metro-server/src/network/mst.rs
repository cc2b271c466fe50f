//! Minimum spanning tree of the platform graph, for network overviews.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};

use crate::domain::PlatformId;

use super::graph::Network;

/// Heap entry: hop duration, then endpoints for a stable order, then the
/// hop's position in its origin's adjacency list.
type Frontier<'a> = Reverse<(u32, &'a PlatformId, &'a PlatformId, usize)>;

/// Prim's algorithm from the smallest platform id.
///
/// Follows hops in their stored direction. A disconnected graph yields the
/// tree of the part reachable from the start, not an error.
pub fn build_mst(network: &Network) -> Network {
    let mut tree = Network::new();
    let Some(root) = network.first_id() else {
        return tree;
    };

    let mut included: HashSet<&PlatformId> = HashSet::new();
    let mut frontier: BinaryHeap<Frontier<'_>> = BinaryHeap::new();

    if let Some(platform) = network.node(root) {
        tree.insert_platform(platform.clone());
    }
    included.insert(root);
    push_hops(network, root, &mut frontier);

    while let Some(Reverse((_, from, _, index))) = frontier.pop() {
        if included.len() == network.node_count() {
            break;
        }
        let hop = &network.hops_from(from)[index];
        if included.contains(&hop.to) {
            continue;
        }

        if let Some(platform) = network.node(&hop.to) {
            tree.insert_platform(platform.clone());
        }
        tree.add_hop(hop.clone());
        included.insert(&hop.to);
        push_hops(network, &hop.to, &mut frontier);
    }

    tree
}

fn push_hops<'a>(network: &'a Network, from: &PlatformId, frontier: &mut BinaryHeap<Frontier<'a>>) {
    for (index, hop) in network.hops_from(from).iter().enumerate() {
        frontier.push(Reverse((hop.duration_secs, &hop.from, &hop.to, index)));
    }
}
