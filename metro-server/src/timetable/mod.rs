//! Read-only access to timetable data.
//!
//! The router never mutates the timetable. It sees it through the
//! [`TimetableStore`] trait, whose default implementation loads CSV exports
//! into memory.

mod csv_timetable;
mod error;
mod store;

#[cfg(test)]
pub(crate) mod fixtures;

pub use csv_timetable::{
    CsvTimetable, ROUTES_FILE, RouteRecord, STOP_TIMES_FILE, STOPS_FILE, StopRecord,
    StopTimeRecord, TRANSFERS_FILE, TRIPS_FILE, TimetableTables, TransferRecord, TripRecord,
};
pub use error::StoreError;
pub use store::{
    Departure, DepartureQuery, LineStations, PlatformRow, RideHopRow, RouteColor, StopInfo,
    StopSummary, TimetableStore, TransferRow,
};
