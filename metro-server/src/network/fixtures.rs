//! Hand-built graphs shared by tests across the crate.

use crate::domain::{Line, LineId, PlatformId, StationId};

use super::graph::{Hop, Network, Platform};

pub(crate) fn pid(s: &str) -> PlatformId {
    PlatformId::parse(s).unwrap()
}

pub(crate) fn platform(id: &str, station: &str, name: &str, line: &str) -> Platform {
    Platform {
        id: pid(id),
        parent_station: StationId::parse(station).unwrap(),
        name: name.into(),
        line: Line::new(LineId::parse(line).unwrap(), line, "000000"),
        latitude: 48.85,
        longitude: 2.35,
    }
}

/// P1 -(L1, 60 s)-> P2 =(walk 90 s)= P3 -(L2, 120 s)-> P4.
///
/// P2 and P3 are both "Bravo", station SB.
pub(crate) fn scenario_network() -> Network {
    let mut network = Network::new();
    network.insert_platform(platform("P1", "SA", "Alpha", "L1"));
    network.insert_platform(platform("P2", "SB", "Bravo", "L1"));
    network.insert_platform(platform("P3", "SB", "Bravo", "L2"));
    network.insert_platform(platform("P4", "SC", "Charlie", "L2"));

    network.add_hop(Hop::ride(pid("P1"), pid("P2"), 60, 450.0));
    network.add_hop(Hop::transfer(pid("P2"), pid("P3"), 90));
    network.add_hop(Hop::transfer(pid("P3"), pid("P2"), 90));
    network.add_hop(Hop::ride(pid("P3"), pid("P4"), 120, 900.0));
    network
}
