//! Shortest paths over the platform graph.
//!
//! Dijkstra with a min-heap keyed on accumulated cost. Costs are integers so
//! that the duration criterion's tie-break is exact: one cost unit is a
//! millisecond of travel.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::PlatformId;
use crate::network::{Hop, Network, Platform};

use super::config::RoutingConfig;

/// Cost units per second of travel.
pub const COST_UNITS_PER_SECOND: u64 = 1000;

/// What a route search optimises for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criterion {
    /// Shortest total travel time; fewer transfers only break ties.
    Duration,
    /// Fewest line changes; travel time only breaks ties.
    Transfers,
}

impl Criterion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Criterion::Duration => "duration",
            Criterion::Transfers => "transfers",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One platform on a path, with the hop used to reach it.
#[derive(Debug, Clone, PartialEq)]
pub struct PathStep {
    pub platform: PlatformId,
    /// `None` for the origin
    pub via: Option<Hop>,
}

/// A raw node/hop path as found by [`find_path`].
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub steps: Vec<PathStep>,
    /// Search cost, in cost units
    pub cost: u64,
    pub criterion: Criterion,
}

impl Path {
    /// Sum of hop durations along the path.
    pub fn duration_secs(&self) -> u32 {
        self.hops().map(|hop| hop.duration_secs).sum()
    }

    /// Hops along the path, in order.
    pub fn hops(&self) -> impl Iterator<Item = &Hop> {
        self.steps.iter().filter_map(|step| step.via.as_ref())
    }

    /// Number of transfer hops taken.
    pub fn transfer_count(&self) -> usize {
        self.hops().filter(|hop| hop.is_transfer).count()
    }
}

/// Cost of taking `hop` on a search that started at `origin`.
fn hop_cost(
    network: &Network,
    origin: &Platform,
    hop: &Hop,
    criterion: Criterion,
    config: &RoutingConfig,
) -> u64 {
    if !hop.is_transfer {
        return u64::from(hop.duration_secs) * COST_UNITS_PER_SECOND;
    }

    // Changing platform inside the departure station is not a real transfer
    let at_origin_station = network
        .node(&hop.to)
        .is_some_and(|p| p.parent_station == origin.parent_station);
    if at_origin_station {
        return 0;
    }

    let base = u64::from(hop.duration_secs) * COST_UNITS_PER_SECOND;
    match criterion {
        Criterion::Transfers => {
            base + u64::from(config.transfer_penalty_secs) * COST_UNITS_PER_SECOND
        }
        Criterion::Duration => base + config.tie_break_units,
    }
}

/// Find the cheapest path from `from` to `to` under `criterion`.
///
/// Returns `None` when either platform is unknown or `to` is unreachable.
/// A path from a platform to itself is a single step of zero cost.
pub fn find_path(
    network: &Network,
    from: &PlatformId,
    to: &PlatformId,
    criterion: Criterion,
    config: &RoutingConfig,
) -> Option<Path> {
    let origin = network.node(from)?;
    if !network.contains(to) {
        return None;
    }

    let mut best: HashMap<&PlatformId, u64> = HashMap::new();
    let mut previous: HashMap<&PlatformId, &Hop> = HashMap::new();
    let mut settled: HashSet<&PlatformId> = HashSet::new();
    let mut heap = BinaryHeap::new();

    best.insert(&origin.id, 0);
    heap.push(Reverse((0u64, &origin.id)));

    while let Some(Reverse((cost, current))) = heap.pop() {
        // Stale entry for an already settled platform
        if !settled.insert(current) {
            continue;
        }

        if current == to {
            return Some(Path {
                steps: reconstruct(&origin.id, current, &previous),
                cost,
                criterion,
            });
        }

        for hop in network.hops_from(current) {
            if settled.contains(&hop.to) {
                continue;
            }
            let next = cost + hop_cost(network, origin, hop, criterion, config);
            if best.get(&hop.to).is_none_or(|&known| next < known) {
                best.insert(&hop.to, next);
                previous.insert(&hop.to, hop);
                heap.push(Reverse((next, &hop.to)));
            }
        }
    }

    None
}

/// Walk predecessor hops back from `end` to `start`.
fn reconstruct(
    start: &PlatformId,
    end: &PlatformId,
    previous: &HashMap<&PlatformId, &Hop>,
) -> Vec<PathStep> {
    let mut hops = Vec::new();
    let mut current = end;
    while current != start {
        let Some(hop) = previous.get(current) else {
            break;
        };
        hops.push((*hop).clone());
        current = &hop.from;
    }
    hops.reverse();

    let mut steps = Vec::with_capacity(hops.len() + 1);
    steps.push(PathStep {
        platform: start.clone(),
        via: None,
    });
    steps.extend(hops.into_iter().map(|hop| PathStep {
        platform: hop.to.clone(),
        via: Some(hop),
    }));
    steps
}
