//! The read-only timetable store seen by the router.
//!
//! Each query has its own row type so that shape mismatches surface at the
//! store boundary rather than deep inside graph construction.

use std::future::Future;

use crate::domain::{Line, LineId, PlatformId, ServiceTime, StationId, TripId};

use super::error::StoreError;

/// A platform as described by the timetable, with its serving line.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformRow {
    pub id: PlatformId,
    pub name: String,
    pub parent_station: StationId,
    pub latitude: f64,
    pub longitude: f64,
    pub line: Line,
}

/// Two consecutive platforms on one trip, with their departure times.
#[derive(Debug, Clone, PartialEq)]
pub struct RideHopRow {
    pub from: PlatformRow,
    pub to: PlatformRow,
    /// Departure from `from`
    pub departure: ServiceTime,
    /// Departure from `to` on the same trip
    pub next_departure: ServiceTime,
}

/// An on-foot change between two platforms of the same station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRow {
    pub from: PlatformId,
    pub to: PlatformId,
    /// Walking time in seconds
    pub time_secs: u32,
}

/// Lookup for the next train linking two sets of platforms.
///
/// Origins and destinations are sets so that both directions of a
/// round-trip line can be considered at once.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DepartureQuery {
    pub origins: Vec<PlatformId>,
    pub destinations: Vec<PlatformId>,
    /// Earliest acceptable departure; `None` asks for the first trip of service.
    pub after: Option<ServiceTime>,
}

impl DepartureQuery {
    /// First trip departing at or after `after`.
    pub fn after(
        origins: Vec<PlatformId>,
        destinations: Vec<PlatformId>,
        after: ServiceTime,
    ) -> Self {
        Self {
            origins,
            destinations,
            after: Some(after),
        }
    }

    /// First trip of the service day, whatever the time.
    pub fn first_of_service(origins: Vec<PlatformId>, destinations: Vec<PlatformId>) -> Self {
        Self {
            origins,
            destinations,
            after: None,
        }
    }
}

/// A concrete train answering a [`DepartureQuery`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    pub trip: TripId,
    /// The origin platform actually served
    pub origin: PlatformId,
    /// The destination platform actually served
    pub destination: PlatformId,
    pub departure: ServiceTime,
    pub arrival: ServiceTime,
    /// Trip headsign, when the timetable has one
    pub direction: Option<String>,
    /// Last platform of the trip
    pub terminus: PlatformId,
    pub terminus_name: String,
}

impl Departure {
    /// The direction to show riders: headsign, else the terminus name.
    pub fn direction_label(&self) -> &str {
        self.direction
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(&self.terminus_name)
    }
}

/// Descriptive data for a single stop.
#[derive(Debug, Clone, PartialEq)]
pub struct StopInfo {
    pub id: PlatformId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub parent_station: Option<StationId>,
    pub lines: Vec<Line>,
}

/// Ordered station names along a line.
#[derive(Debug, Clone, PartialEq)]
pub struct LineStations {
    pub line: Line,
    pub text_color: String,
    pub stations: Vec<String>,
}

/// A stop name for map display, merged across the platforms sharing it.
///
/// Each list holds distinct values in first-seen order, so the lists need
/// not line up index by index.
#[derive(Debug, Clone, PartialEq)]
pub struct StopSummary {
    /// Lowest platform id carrying the name
    pub id: PlatformId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub route_names: Vec<String>,
    pub route_colors: Vec<String>,
    pub route_text_colors: Vec<String>,
}

/// A line's background colour, keyed by line id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteColor {
    pub id: LineId,
    pub color: String,
}

/// Read-only access to timetable data.
///
/// This abstraction allows the router to be tested with in-memory tables.
pub trait TimetableStore: Send + Sync {
    /// Every distinct pair of consecutive platforms served by some trip.
    fn ride_hops(&self) -> impl Future<Output = Result<Vec<RideHopRow>, StoreError>> + Send;

    /// Every transfer between two served platforms of the same station.
    fn transfers(&self) -> impl Future<Output = Result<Vec<TransferRow>, StoreError>> + Send;

    /// Earliest trip matching the query, or `None` when nothing runs.
    fn next_departure(
        &self,
        query: &DepartureQuery,
    ) -> impl Future<Output = Result<Option<Departure>, StoreError>> + Send;

    /// Look up a stop by id.
    fn stop(
        &self,
        id: &PlatformId,
    ) -> impl Future<Output = Result<Option<StopInfo>, StoreError>> + Send;

    /// Distinct stop names starting with `prefix`, case-insensitively, sorted.
    fn search_stop_names(
        &self,
        prefix: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send;

    /// Stations of a line, in calling order, by public line name.
    fn line_stations(
        &self,
        line_name: &str,
    ) -> impl Future<Output = Result<Option<LineStations>, StoreError>> + Send;

    /// Every served stop name with its coordinates and lines, sorted by name.
    fn stops(&self) -> impl Future<Output = Result<Vec<StopSummary>, StoreError>> + Send;

    /// Background colour of every line, sorted by id.
    fn route_colors(&self) -> impl Future<Output = Result<Vec<RouteColor>, StoreError>> + Send;
}
