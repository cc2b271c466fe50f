//! The platform graph.
//!
//! Nodes are platforms: one line stopping at one physical station. Edges are
//! directed hops, either a ride between consecutive platforms of a trip or a
//! walk between two platforms of the same station. Maps are ordered so that
//! "an arbitrary node" is always the smallest id, which keeps traversals
//! reproducible.

use std::collections::BTreeMap;

use crate::domain::{Line, PlatformId, StationId};
use crate::timetable::PlatformRow;

use super::error::NetworkError;

/// A graph node: one line's stopping point at one station.
#[derive(Debug, Clone, PartialEq)]
pub struct Platform {
    pub id: PlatformId,
    pub parent_station: StationId,
    pub name: String,
    pub line: Line,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<PlatformRow> for Platform {
    fn from(row: PlatformRow) -> Self {
        Self {
            id: row.id,
            parent_station: row.parent_station,
            name: row.name,
            line: row.line,
            latitude: row.latitude,
            longitude: row.longitude,
        }
    }
}

/// A directed graph edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Hop {
    pub from: PlatformId,
    pub to: PlatformId,
    pub duration_secs: u32,
    pub distance_meters: f64,
    /// Walk between platforms rather than a ride
    pub is_transfer: bool,
}

impl Hop {
    /// A ride between consecutive platforms of one trip.
    pub fn ride(from: PlatformId, to: PlatformId, duration_secs: u32, distance_meters: f64) -> Self {
        Self {
            from,
            to,
            duration_secs,
            distance_meters,
            is_transfer: false,
        }
    }

    /// A walk between two platforms of one station. Walks cover no distance.
    pub fn transfer(from: PlatformId, to: PlatformId, duration_secs: u32) -> Self {
        Self {
            from,
            to,
            duration_secs,
            distance_meters: 0.0,
            is_transfer: true,
        }
    }
}

/// Adjacency-list graph of platforms and hops.
///
/// Immutable once built and shared across requests behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct Network {
    nodes: BTreeMap<PlatformId, Platform>,
    edges: BTreeMap<PlatformId, Vec<Hop>>,
    /// Platforms grouped by physical station
    stations: BTreeMap<StationId, Vec<PlatformId>>,
}

impl Network {
    /// Create an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a platform unless one with the same id exists.
    ///
    /// Returns `true` if the platform was inserted.
    pub fn insert_platform(&mut self, platform: Platform) -> bool {
        if self.nodes.contains_key(&platform.id) {
            return false;
        }
        self.stations
            .entry(platform.parent_station.clone())
            .or_default()
            .push(platform.id.clone());
        self.nodes.insert(platform.id.clone(), platform);
        true
    }

    /// Append a hop to its origin's adjacency list.
    pub fn add_hop(&mut self, hop: Hop) {
        self.edges.entry(hop.from.clone()).or_default().push(hop);
    }

    /// Look up a platform.
    pub fn node(&self, id: &PlatformId) -> Option<&Platform> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &PlatformId) -> bool {
        self.nodes.contains_key(id)
    }

    /// All platforms, ordered by id.
    pub fn nodes(&self) -> impl Iterator<Item = &Platform> {
        self.nodes.values()
    }

    /// Hops leaving `id`, in insertion order.
    pub fn hops_from(&self, id: &PlatformId) -> &[Hop] {
        self.edges.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All hops, grouped by origin.
    pub fn hops(&self) -> impl Iterator<Item = &Hop> {
        self.edges.values().flatten()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Smallest platform id, used as the start of traversals.
    pub fn first_id(&self) -> Option<&PlatformId> {
        self.nodes.keys().next()
    }

    /// Whether two platforms belong to the same physical station.
    pub fn same_station(&self, a: &PlatformId, b: &PlatformId) -> bool {
        match (self.nodes.get(a), self.nodes.get(b)) {
            (Some(a), Some(b)) => a.parent_station == b.parent_station,
            _ => false,
        }
    }

    /// The platform and every other platform of its line at the same station.
    ///
    /// Round-trip lines stop at each station once per direction, on different
    /// platforms. The platform itself comes first.
    pub fn line_siblings(&self, id: &PlatformId) -> Vec<PlatformId> {
        let Some(platform) = self.nodes.get(id) else {
            return Vec::new();
        };

        let mut siblings = vec![id.clone()];
        if let Some(at_station) = self.stations.get(&platform.parent_station) {
            siblings.extend(
                at_station
                    .iter()
                    .filter(|other| *other != id)
                    .filter(|other| {
                        self.nodes
                            .get(*other)
                            .is_some_and(|p| p.line.id == platform.line.id)
                    })
                    .cloned(),
            );
        }
        siblings
    }

    /// Check that every hop's endpoints are platforms of this network.
    pub fn validate(&self) -> Result<(), NetworkError> {
        for hop in self.hops() {
            for end in [&hop.from, &hop.to] {
                if !self.nodes.contains_key(end) {
                    return Err(NetworkError::DanglingEdge {
                        from: hop.from.clone(),
                        to: hop.to.clone(),
                        missing: end.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
