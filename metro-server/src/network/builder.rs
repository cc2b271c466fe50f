//! Builds the platform graph from timetable rows.

use geo::{Haversine, Length, LineString, Point, line_string};
use tracing::{debug, info, warn};

use crate::planner::RoutingConfig;
use crate::timetable::{PlatformRow, TimetableStore};

use super::error::NetworkError;
use super::graph::{Hop, Network, Platform};

/// Great-circle distance between two platforms, in metres.
pub fn great_circle_meters(from: &PlatformRow, to: &PlatformRow) -> f64 {
    let src = Point::new(from.longitude, from.latitude);
    let dst = Point::new(to.longitude, to.latitude);
    let line: LineString<f64> = line_string![src.0, dst.0];
    Haversine.length(&line)
}

/// Scan the timetable once and materialise the platform graph.
///
/// Store failures are fatal and returned as-is; the caller decides whether a
/// later attempt is worthwhile.
pub async fn build_network<S: TimetableStore>(
    store: &S,
    config: &RoutingConfig,
) -> Result<Network, NetworkError> {
    let rides = store.ride_hops().await?;
    let transfers = store.transfers().await?;

    let mut network = Network::new();
    let mut excluded = 0usize;
    let mut clamped = 0usize;

    for row in rides {
        if config.is_excluded_ride_origin(&row.from.id) {
            debug!(from = %row.from.id, to = %row.to.id, "Skipping ride from excluded platform");
            excluded += 1;
            network.insert_platform(Platform::from(row.from));
            network.insert_platform(Platform::from(row.to));
            continue;
        }

        let distance = great_circle_meters(&row.from, &row.to);
        let raw = row
            .next_departure
            .signed_duration_since(row.departure)
            .num_seconds();
        let duration = if raw < 0 {
            warn!(
                from = %row.from.id,
                to = %row.to.id,
                seconds = raw,
                "Negative ride duration clamped to zero"
            );
            clamped += 1;
            0
        } else {
            u32::try_from(raw).unwrap_or(u32::MAX)
        };

        let hop = Hop::ride(row.from.id.clone(), row.to.id.clone(), duration, distance);
        network.insert_platform(Platform::from(row.from));
        network.insert_platform(Platform::from(row.to));
        network.add_hop(hop);
    }

    let mut orphaned = 0usize;
    for row in transfers {
        // A walk only makes sense between platforms some train actually serves
        if !network.contains(&row.from) || !network.contains(&row.to) {
            orphaned += 1;
            continue;
        }
        network.add_hop(Hop::transfer(row.from, row.to, row.time_secs));
    }
    if orphaned > 0 {
        warn!(orphaned, "Ignored transfers touching platforms without rides");
    }

    network.validate()?;

    info!(
        platforms = network.node_count(),
        hops = network.edge_count(),
        excluded,
        clamped,
        "Built metro network"
    );
    Ok(network)
}
