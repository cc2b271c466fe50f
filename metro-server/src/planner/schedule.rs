//! Binds segmented itineraries to real scheduled trains.
//!
//! A running clock walks through the segments. For each one the timetable is
//! asked for the next train from the boarding platform that also calls at
//! the alighting platform. Past the last train of the day, the first train of
//! the next service day is used instead, and every later time keeps counting
//! past 24:00 so that the itinerary stays monotonic.

use tracing::{debug, warn};

use crate::domain::{PlatformId, SECONDS_PER_DAY, ServiceTime, ceil_to_minute};
use crate::network::Network;
use crate::timetable::{Departure, DepartureQuery, StoreError, TimetableStore};

use super::config::RoutingConfig;
use super::itinerary::{Itinerary, SegmentTimes, TimedItinerary};

/// Fill in departure times and directions for every segment.
///
/// Segments without any service are given the running clock as departure
/// and keep their default direction; binding never fails for lack of
/// trains. Only store errors are returned, after transient ones have been
/// retried.
pub async fn bind_times<S: TimetableStore>(
    store: &S,
    network: &Network,
    mut itinerary: Itinerary,
    requested: ServiceTime,
    config: &RoutingConfig,
) -> Result<TimedItinerary, StoreError> {
    let mut clock = requested;
    // Service days skipped by falling back to a first train
    let mut days_ahead = 0u32;
    let mut previous: Option<(ServiceTime, u32)> = None;
    let mut times = Vec::with_capacity(itinerary.segments.len());

    for segment in &mut itinerary.segments {
        if let Some((departed, ride_secs)) = previous {
            let connecting = segment.connecting_secs.unwrap_or(0);
            clock = departed
                .plus_secs(ceil_to_minute(ride_secs))
                .plus_secs(ceil_to_minute(connecting));
        }

        let (Some(first), Some(last)) = (segment.first_stop(), segment.last_stop()) else {
            continue;
        };
        let origins = boarding_set(network, &first.id);
        let destinations = boarding_set(network, &last.id);
        let ride_secs = segment.ride_secs();

        let query = DepartureQuery::after(
            origins.clone(),
            destinations.clone(),
            clock.minus_days(days_ahead),
        );
        let mut found = lookup(store, &query, config).await?;

        if found.is_none() {
            let first_train = DepartureQuery::first_of_service(origins, destinations);
            found = lookup(store, &first_train, config).await?;
            if found.is_some() {
                days_ahead += 1;
                warn!(
                    from = %first.id,
                    to = %last.id,
                    after = %clock,
                    "No train left today, using first train of next service day"
                );
            }
        }

        let bound = match found {
            Some(departure) => {
                let offset = days_ahead * SECONDS_PER_DAY;
                segment.direction = departure.direction_label().to_string();
                debug!(
                    trip = %departure.trip,
                    departure = %departure.departure.plus_secs(offset),
                    direction = %segment.direction,
                    "Bound segment"
                );
                SegmentTimes {
                    departure: departure.departure.plus_secs(offset),
                    arrival: departure.arrival.plus_secs(offset),
                    trip: Some(departure.trip),
                }
            }
            None => {
                debug!(from = %first.id, to = %last.id, "No service for segment");
                SegmentTimes {
                    departure: clock,
                    arrival: clock.plus_secs(ride_secs),
                    trip: None,
                }
            }
        };

        previous = Some((bound.departure, ride_secs));
        times.push(bound);
    }

    Ok(TimedItinerary { itinerary, times })
}

/// The platform plus its same-line siblings, so either direction of a
/// round-trip line can be boarded.
fn boarding_set(network: &Network, id: &PlatformId) -> Vec<PlatformId> {
    let siblings = network.line_siblings(id);
    if siblings.is_empty() {
        vec![id.clone()]
    } else {
        siblings
    }
}

/// Ask the store, retrying transient failures.
async fn lookup<S: TimetableStore>(
    store: &S,
    query: &DepartureQuery,
    config: &RoutingConfig,
) -> Result<Option<Departure>, StoreError> {
    let attempts = config.store_attempts.max(1);
    let mut attempt = 1;
    loop {
        match store.next_departure(query).await {
            Err(e) if e.is_transient() && attempt < attempts => {
                warn!(attempt, error = %e, "Departure lookup failed, retrying");
                tokio::time::sleep(config.store_retry_delay()).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}
