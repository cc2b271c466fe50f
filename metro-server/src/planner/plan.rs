//! Request-level planning: one or two timed itineraries between platforms.

use futures::future::try_join_all;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{PlatformId, ServiceTime};
use crate::network::{Network, NetworkError, NetworkHandle};
use crate::timetable::{StoreError, TimetableStore};

use super::config::RoutingConfig;
use super::itinerary::{Itinerary, TimedItinerary};
use super::path::{Criterion, find_path};
use super::schedule::bind_times;
use super::segment::segment;

/// Errors that can occur while planning.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("unknown platform: {0}")]
    UnknownPlatform(PlatformId),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A planning request.
#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub from: PlatformId,
    pub to: PlatformId,
    /// Desired departure; `None` means now
    pub departure: Option<ServiceTime>,
}

impl PlanRequest {
    pub fn new(from: PlatformId, to: PlatformId) -> Self {
        Self {
            from,
            to,
            departure: None,
        }
    }

    pub fn departing_at(mut self, departure: ServiceTime) -> Self {
        self.departure = Some(departure);
        self
    }
}

/// Search and segment one route, without times.
///
/// `None` when either platform is unknown or no path joins them. A route
/// from a platform to itself is an itinerary with no segments.
pub fn route(
    network: &Network,
    from: &PlatformId,
    to: &PlatformId,
    criterion: Criterion,
    config: &RoutingConfig,
) -> Option<Itinerary> {
    let path = find_path(network, from, to, criterion, config)?;
    let segments = segment(network, &path);
    debug!(
        %from,
        %to,
        %criterion,
        cost = path.cost,
        segments = segments.len(),
        "Found route"
    );
    Some(Itinerary::new(segments, criterion, config.carbon_grams_per_km))
}

/// Plan a journey.
///
/// The fastest itinerary always comes first. The fewest-changes itinerary
/// follows only when it actually has fewer segments. An empty list means
/// there is no route at all.
pub async fn plan<S: TimetableStore>(
    handle: &NetworkHandle,
    store: &S,
    config: &RoutingConfig,
    request: &PlanRequest,
) -> Result<Vec<TimedItinerary>, PlanError> {
    let network = handle.network(store, config).await?;

    for id in [&request.from, &request.to] {
        if !network.contains(id) {
            return Err(PlanError::UnknownPlatform(id.clone()));
        }
    }

    let Some(fastest) = route(&network, &request.from, &request.to, Criterion::Duration, config)
    else {
        info!(from = %request.from, to = %request.to, "No route");
        return Ok(Vec::new());
    };

    let mut itineraries = vec![fastest];
    if let Some(fewest) = route(&network, &request.from, &request.to, Criterion::Transfers, config)
        && fewest.segments.len() < itineraries[0].segments.len()
    {
        itineraries.push(fewest);
    }

    let departure = request
        .departure
        .unwrap_or_else(|| ServiceTime::from_civil(chrono::Local::now().time()));

    let timed = try_join_all(
        itineraries
            .into_iter()
            .map(|itinerary| bind_times(store, &network, itinerary, departure, config)),
    )
    .await?;

    info!(
        from = %request.from,
        to = %request.to,
        %departure,
        itineraries = timed.len(),
        "Planned journey"
    );
    Ok(timed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::fixtures::pid;
    use crate::network::{Hop, build_network};
    use crate::timetable::CsvTimetable;
    use crate::timetable::fixtures::{
        FlakyStore, route as route_record, scenario_tables, scenario_timetable, stop, stop_time,
        transfer, trip,
    };

    fn t(s: &str) -> ServiceTime {
        ServiceTime::parse(s).unwrap()
    }

    fn request(from: &str, to: &str, at: &str) -> PlanRequest {
        PlanRequest::new(pid(from), pid(to)).departing_at(t(at))
    }

    /// The scenario plus line 3, a slow direct run from Alpha to Charlie
    /// arriving on P6.
    fn with_direct_line() -> CsvTimetable {
        let mut tables = scenario_tables();
        tables.routes.push(route_record("L3", "3", "9F9825"));
        tables.stops.push(stop("P5", "Alpha", "SA", 48.8530, 2.3480));
        tables.stops.push(stop("P6", "Charlie", "SC", 48.8610, 2.3600));
        tables.trips.push(trip("L3", "T3", "Charlie"));
        tables.stop_times.push(stop_time("T3", "08:02:00", "P5", 1));
        tables.stop_times.push(stop_time("T3", "08:12:00", "P6", 2));
        tables.transfers.push(transfer("P1", "P5", 60));
        tables.transfers.push(transfer("P5", "P1", 60));
        tables.transfers.push(transfer("P4", "P6", 60));
        tables.transfers.push(transfer("P6", "P4", 60));
        CsvTimetable::from_tables(tables).unwrap()
    }

    #[tokio::test]
    async fn scenario_route_has_two_segments() {
        let store = scenario_timetable();
        let network = build_network(&store, &RoutingConfig::default()).await.unwrap();

        let itinerary = route(
            &network,
            &pid("P1"),
            &pid("P4"),
            Criterion::Duration,
            &RoutingConfig::default(),
        )
        .unwrap();

        assert_eq!(itinerary.segments.len(), 2);
        assert_eq!(itinerary.segments[0].line.id.as_str(), "L1");
        assert_eq!(itinerary.segments[1].line.id.as_str(), "L2");
        assert_eq!(itinerary.segments[1].connecting_secs, Some(90));
        assert_eq!(itinerary.total_duration_secs(), 270);
        assert!(itinerary.carbon_grams > 0.0);
    }

    #[tokio::test]
    async fn same_platform_is_an_empty_itinerary() {
        let store = scenario_timetable();
        let network = build_network(&store, &RoutingConfig::default()).await.unwrap();

        let itinerary = route(
            &network,
            &pid("P2"),
            &pid("P2"),
            Criterion::Transfers,
            &RoutingConfig::default(),
        )
        .unwrap();

        assert!(itinerary.segments.is_empty());
        assert_eq!(itinerary.total_duration_secs(), 0);
    }

    #[tokio::test]
    async fn plans_fastest_itinerary_with_times() {
        let store = scenario_timetable();
        let handle = NetworkHandle::new();

        let timed = plan(&handle, &store, &RoutingConfig::default(), &request("P1", "P4", "07:55"))
            .await
            .unwrap();

        assert_eq!(timed.len(), 1);
        let only = &timed[0];
        assert_eq!(only.itinerary.criterion, Criterion::Duration);
        assert_eq!(only.departure(), Some(t("08:00")));
        assert_eq!(only.arrival(), Some(t("08:07")));
        assert_eq!(only.itinerary.segments[0].connecting_secs, None);
    }

    #[tokio::test]
    async fn fewer_changes_alternative_is_offered() {
        let store = with_direct_line();
        let handle = NetworkHandle::new();

        let timed = plan(&handle, &store, &RoutingConfig::default(), &request("P1", "P6", "07:55"))
            .await
            .unwrap();

        assert_eq!(timed.len(), 2);
        assert_eq!(timed[0].itinerary.criterion, Criterion::Duration);
        assert_eq!(timed[0].itinerary.segments.len(), 2);
        assert_eq!(timed[1].itinerary.criterion, Criterion::Transfers);
        assert_eq!(timed[1].itinerary.segments.len(), 1);
        assert_eq!(timed[1].itinerary.segments[0].line.id.as_str(), "L3");
        assert_eq!(timed[1].departure(), Some(t("08:02")));
    }

    #[tokio::test]
    async fn unreachable_destination_gives_no_itineraries() {
        let store = scenario_timetable();
        let handle = NetworkHandle::new();

        // Rides only go one way
        let timed = plan(&handle, &store, &RoutingConfig::default(), &request("P4", "P1", "08:00"))
            .await
            .unwrap();

        assert!(timed.is_empty());
    }

    #[tokio::test]
    async fn unknown_platform_is_rejected() {
        let store = scenario_timetable();
        let handle = NetworkHandle::new();

        let err = plan(&handle, &store, &RoutingConfig::default(), &request("P1", "P99", "08:00"))
            .await
            .unwrap_err();

        assert!(matches!(err, PlanError::UnknownPlatform(id) if id.as_str() == "P99"));
    }

    #[tokio::test]
    async fn network_failure_is_reported() {
        let store = FlakyStore::new(scenario_timetable(), 1);
        let handle = NetworkHandle::new();

        let err = plan(&handle, &store, &RoutingConfig::default(), &request("P1", "P4", "08:00"))
            .await
            .unwrap_err();

        assert!(matches!(err, PlanError::Network(NetworkError::Store(_))));
        assert!(!handle.is_built());
    }

    #[tokio::test]
    async fn uses_prebuilt_network() {
        let store = scenario_timetable();
        let mut network = build_network(&store, &RoutingConfig::default()).await.unwrap();
        network.add_hop(Hop::transfer(pid("P4"), pid("P1"), 30));
        let handle = NetworkHandle::with_network(network);

        let timed = plan(&handle, &store, &RoutingConfig::default(), &request("P4", "P2", "08:00"))
            .await
            .unwrap();

        // The walk to P1 is folded away, leaving line 1 to Bravo
        assert_eq!(timed.len(), 1);
        assert_eq!(timed[0].itinerary.segments.len(), 1);
        assert_eq!(timed[0].itinerary.segments[0].connecting_secs, None);
        assert_eq!(timed[0].departure(), Some(t("08:00")));
    }

    #[tokio::test]
    async fn defaults_to_now() {
        let store = scenario_timetable();
        let handle = NetworkHandle::new();

        let timed = plan(
            &handle,
            &store,
            &RoutingConfig::default(),
            &PlanRequest::new(pid("P3"), pid("P4")),
        )
        .await
        .unwrap();

        // Some train always applies, today or on the next service day
        assert_eq!(timed.len(), 1);
        assert!(timed[0].times[0].trip.is_some());
    }
}
