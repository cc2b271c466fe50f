//! Small hand-built timetables shared by tests across the crate.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::domain::PlatformId;

use super::csv_timetable::{
    CsvTimetable, RouteRecord, StopRecord, StopTimeRecord, TimetableTables, TransferRecord,
    TripRecord,
};
use super::error::StoreError;
use super::store::{
    Departure, DepartureQuery, LineStations, RideHopRow, RouteColor, StopInfo, StopSummary,
    TimetableStore, TransferRow,
};

pub(crate) fn route(id: &str, name: &str, color: &str) -> RouteRecord {
    RouteRecord {
        route_id: id.into(),
        name: name.into(),
        kind: Some("metro".into()),
        background_color: Some(color.into()),
        text_color: Some("FFFFFF".into()),
    }
}

pub(crate) fn stop(id: &str, name: &str, station: &str, latitude: f64, longitude: f64) -> StopRecord {
    StopRecord {
        stop_id: id.into(),
        name: name.into(),
        latitude,
        longitude,
        parent_station: Some(station.into()),
    }
}

pub(crate) fn trip(route_id: &str, trip_id: &str, direction: &str) -> TripRecord {
    TripRecord {
        route_id: route_id.into(),
        service_id: Some("weekday".into()),
        trip_id: trip_id.into(),
        direction: Some(direction.into()),
    }
}

pub(crate) fn stop_time(trip_id: &str, time: &str, stop_id: &str, sequence: u32) -> StopTimeRecord {
    StopTimeRecord {
        trip_id: trip_id.into(),
        departure_time: Some(time.into()),
        stop_id: stop_id.into(),
        stop_sequence: sequence,
    }
}

pub(crate) fn transfer(from: &str, to: &str, time: u32) -> TransferRecord {
    TransferRecord {
        from_id: from.into(),
        to_id: to.into(),
        time,
    }
}

/// Two lines meeting at Bravo.
///
/// Line 1 rides P1 (Alpha) to P2 (Bravo) in 60 s. Line 2 rides P3 (Bravo)
/// to P4 (Charlie) in 120 s. P2 and P3 share station SB with a 90 s walk
/// in each direction. Line 2 runs from 05:30 until 23:55.
pub(crate) fn scenario_tables() -> TimetableTables {
    TimetableTables {
        routes: vec![route("L1", "1", "FFCD00"), route("L2", "2", "003CA6")],
        stops: vec![
            stop("P1", "Alpha", "SA", 48.8530, 2.3480),
            stop("P2", "Bravo", "SB", 48.8570, 2.3520),
            stop("P3", "Bravo", "SB", 48.8570, 2.3520),
            stop("P4", "Charlie", "SC", 48.8610, 2.3600),
        ],
        trips: vec![
            trip("L1", "T1", "Bravo"),
            trip("L1", "T1b", "Bravo"),
            trip("L2", "T2first", "Charlie"),
            trip("L2", "T2", "Charlie"),
            // No headsign: riders see the terminus name
            trip("L2", "T2b", ""),
            trip("L2", "T2last", "Charlie"),
        ],
        stop_times: vec![
            stop_time("T1", "08:00:00", "P1", 1),
            stop_time("T1", "08:01:00", "P2", 2),
            stop_time("T1b", "08:10:00", "P1", 1),
            stop_time("T1b", "08:11:00", "P2", 2),
            stop_time("T2first", "05:30:00", "P3", 1),
            stop_time("T2first", "05:32:00", "P4", 2),
            stop_time("T2", "08:05:00", "P3", 1),
            stop_time("T2", "08:07:00", "P4", 2),
            stop_time("T2b", "08:15:00", "P3", 1),
            stop_time("T2b", "08:17:00", "P4", 2),
            stop_time("T2last", "23:55:00", "P3", 1),
            stop_time("T2last", "23:57:00", "P4", 2),
        ],
        transfers: vec![transfer("P2", "P3", 90), transfer("P3", "P2", 90)],
    }
}

/// Store that fails transiently a set number of times, then answers from
/// an in-memory timetable.
pub(crate) struct FlakyStore {
    inner: CsvTimetable,
    remaining_failures: AtomicU32,
    /// Departure lookups attempted, failed ones included
    pub(crate) lookups: AtomicU32,
    /// Ride-hop scans attempted, failed ones included
    pub(crate) scans: AtomicU32,
}

impl FlakyStore {
    pub(crate) fn new(inner: CsvTimetable, failures: u32) -> Self {
        Self {
            inner,
            remaining_failures: AtomicU32::new(failures),
            lookups: AtomicU32::new(0),
            scans: AtomicU32::new(0),
        }
    }

    fn trip(&self) -> Result<(), StoreError> {
        let failed = self
            .remaining_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            Err(StoreError::Unavailable("connection reset".into()))
        } else {
            Ok(())
        }
    }
}

impl TimetableStore for FlakyStore {
    async fn ride_hops(&self) -> Result<Vec<RideHopRow>, StoreError> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        self.trip()?;
        self.inner.ride_hops().await
    }

    async fn transfers(&self) -> Result<Vec<TransferRow>, StoreError> {
        self.inner.transfers().await
    }

    async fn next_departure(&self, query: &DepartureQuery) -> Result<Option<Departure>, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.trip()?;
        self.inner.next_departure(query).await
    }

    async fn stop(&self, id: &PlatformId) -> Result<Option<StopInfo>, StoreError> {
        self.inner.stop(id).await
    }

    async fn search_stop_names(&self, prefix: &str, limit: usize) -> Result<Vec<String>, StoreError> {
        self.inner.search_stop_names(prefix, limit).await
    }

    async fn line_stations(&self, line_name: &str) -> Result<Option<LineStations>, StoreError> {
        self.inner.line_stations(line_name).await
    }

    async fn stops(&self) -> Result<Vec<StopSummary>, StoreError> {
        self.inner.stops().await
    }

    async fn route_colors(&self) -> Result<Vec<RouteColor>, StoreError> {
        self.inner.route_colors().await
    }
}

/// The scenario timetable, loaded.
pub(crate) fn scenario_timetable() -> CsvTimetable {
    CsvTimetable::from_tables(scenario_tables()).unwrap()
}
