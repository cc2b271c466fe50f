//! Groups a raw path into ride segments, one per train boarded.

use crate::network::{Network, Platform};

use super::itinerary::{Segment, Stop};
use super::path::Path;

/// Split a path into segments and clean up platform-change artefacts.
///
/// A new segment starts at the origin and after every transfer hop; the
/// transfer's walking time becomes the new segment's connecting time.
/// Multi-platform stations produce "transfers" that only cross a platform,
/// so a segment's first or last stop is dropped when it has the same name as
/// its neighbour, with its time moved into the connecting time. Segments
/// left with fewer than two stops are not rides and are dropped too. The
/// first segment never has a connecting time.
pub fn segment(network: &Network, path: &Path) -> Vec<Segment> {
    let raw = split(network, path);

    let mut segments: Vec<Segment> = Vec::with_capacity(raw.len());
    // Time moved forward from dropped stops and segments
    let mut carry = 0u32;

    for mut segment in raw {
        let mut connecting = segment.connecting_secs.unwrap_or(0) + carry;
        carry = 0;

        if segment.stops.len() >= 2 && segment.stops[0].name == segment.stops[1].name {
            segment.stops.remove(0);
            let boarded = &mut segment.stops[0];
            connecting += boarded.duration_secs;
            boarded.duration_secs = 0;
            boarded.distance_meters = 0.0;
        }

        let len = segment.stops.len();
        if len >= 2 && segment.stops[len - 1].name == segment.stops[len - 2].name {
            if let Some(dropped) = segment.stops.pop() {
                carry += dropped.duration_secs;
            }
        }

        if segment.stops.len() < 2 {
            carry += connecting + segment.ride_secs();
            continue;
        }

        if let Some(last) = segment.stops.last() {
            segment.direction = last.name.clone();
        }
        segment.connecting_secs = Some(connecting);
        segments.push(segment);
    }

    if let Some(first) = segments.first_mut() {
        first.connecting_secs = None;
    }
    segments
}

/// Cut the path at transfer hops, without any cleanup.
fn split(network: &Network, path: &Path) -> Vec<Segment> {
    let mut segments: Vec<Segment> = Vec::new();

    for step in &path.steps {
        let Some(platform) = network.node(&step.platform) else {
            continue;
        };

        match &step.via {
            Some(hop) if !hop.is_transfer => {
                let stop = stop(platform, hop.duration_secs, hop.distance_meters);
                match segments.last_mut() {
                    Some(current) => current.stops.push(stop),
                    None => segments.push(open(platform, 0)),
                }
            }
            Some(hop) => segments.push(open(platform, hop.duration_secs)),
            None => segments.push(open(platform, 0)),
        }
    }

    segments
}

fn stop(platform: &Platform, duration_secs: u32, distance_meters: f64) -> Stop {
    Stop {
        id: platform.id.clone(),
        name: platform.name.clone(),
        duration_secs,
        distance_meters,
    }
}

/// A new segment boarding at `platform`.
fn open(platform: &Platform, connecting_secs: u32) -> Segment {
    Segment {
        stops: vec![stop(platform, 0, 0.0)],
        line: platform.line.clone(),
        direction: platform.name.clone(),
        connecting_secs: Some(connecting_secs),
    }
}
