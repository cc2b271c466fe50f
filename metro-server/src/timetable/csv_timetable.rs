//! Timetable store backed by CSV exports of the metro schedule.
//!
//! The directory holds one headered file per table, matching the import
//! schema: `routes.csv`, `trips.csv`, `stop_times.csv`, `stops.csv` and
//! `transfers.csv`. Everything is loaded and indexed once; queries are then
//! answered from memory.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs::File;
use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::domain::{InvalidId, Line, LineId, PlatformId, ServiceTime, StationId, TripId};

use super::error::StoreError;
use super::store::{
    Departure, DepartureQuery, LineStations, PlatformRow, RideHopRow, RouteColor, StopInfo,
    StopSummary, TimetableStore, TransferRow,
};

pub const ROUTES_FILE: &str = "routes.csv";
pub const TRIPS_FILE: &str = "trips.csv";
pub const STOP_TIMES_FILE: &str = "stop_times.csv";
pub const STOPS_FILE: &str = "stops.csv";
pub const TRANSFERS_FILE: &str = "transfers.csv";

/// A row of `routes.csv`.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteRecord {
    pub route_id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub background_color: Option<String>,
    #[serde(default)]
    pub text_color: Option<String>,
}

/// A row of `trips.csv`.
#[derive(Debug, Clone, Deserialize)]
pub struct TripRecord {
    pub route_id: String,
    #[serde(default)]
    pub service_id: Option<String>,
    pub trip_id: String,
    /// Headsign shown on the train
    #[serde(default)]
    pub direction: Option<String>,
}

/// A row of `stop_times.csv`.
#[derive(Debug, Clone, Deserialize)]
pub struct StopTimeRecord {
    pub trip_id: String,
    /// `HH:MM:SS`, hours may exceed 23; empty when the train does not stop
    #[serde(default)]
    pub departure_time: Option<String>,
    pub stop_id: String,
    pub stop_sequence: u32,
}

/// A row of `stops.csv`.
#[derive(Debug, Clone, Deserialize)]
pub struct StopRecord {
    pub stop_id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub parent_station: Option<String>,
}

/// A row of `transfers.csv`.
#[derive(Debug, Clone, Deserialize)]
pub struct TransferRecord {
    pub from_id: String,
    pub to_id: String,
    /// Walking time in seconds
    pub time: u32,
}

/// Raw timetable tables, before validation and indexing.
#[derive(Debug, Clone, Default)]
pub struct TimetableTables {
    pub routes: Vec<RouteRecord>,
    pub trips: Vec<TripRecord>,
    pub stop_times: Vec<StopTimeRecord>,
    pub stops: Vec<StopRecord>,
    pub transfers: Vec<TransferRecord>,
}

impl TimetableTables {
    /// Read all five tables from a directory.
    pub fn read_dir(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        Ok(Self {
            routes: read_table(dir, ROUTES_FILE, "routes")?,
            trips: read_table(dir, TRIPS_FILE, "trips")?,
            stop_times: read_table(dir, STOP_TIMES_FILE, "stop_times")?,
            stops: read_table(dir, STOPS_FILE, "stops")?,
            transfers: read_table(dir, TRANSFERS_FILE, "transfers")?,
        })
    }
}

/// Deserialize every row of one CSV table.
fn read_table<T: DeserializeOwned>(
    dir: &Path,
    file: &str,
    table: &'static str,
) -> Result<Vec<T>, StoreError> {
    let path = dir.join(file);
    let handle = File::open(&path).map_err(|source| StoreError::Io {
        path: path.clone(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(handle);

    reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|source| StoreError::Csv { table, source })
}

#[derive(Debug)]
struct StopEntry {
    name: String,
    latitude: f64,
    longitude: f64,
    parent_station: Option<StationId>,
    /// Parent station, or the stop itself when it has none
    station: StationId,
}

#[derive(Debug)]
struct LineEntry {
    line: Line,
    text_color: String,
}

#[derive(Debug)]
struct CallEntry {
    stop: PlatformId,
    departure: Option<ServiceTime>,
}

#[derive(Debug)]
struct TripEntry {
    id: TripId,
    line: Line,
    direction: Option<String>,
    calls: Vec<CallEntry>,
}

/// Position of one timed call, for the per-platform departure index.
#[derive(Debug, Clone, Copy)]
struct DepartureSlot {
    time: ServiceTime,
    trip: usize,
    call: usize,
}

/// In-memory timetable loaded from CSV tables.
#[derive(Debug)]
pub struct CsvTimetable {
    lines: HashMap<LineId, LineEntry>,
    stops: HashMap<PlatformId, StopEntry>,
    trips: Vec<TripEntry>,
    /// Timed calls per platform, sorted by time
    departures: HashMap<PlatformId, Vec<DepartureSlot>>,
    /// Lines serving each platform, in first-seen order
    stop_lines: HashMap<PlatformId, Vec<Line>>,
    transfers: Vec<TransferRow>,
}

impl CsvTimetable {
    /// Load and index the tables found in `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        let tables = TimetableTables::read_dir(dir)?;
        let timetable = Self::from_tables(tables)?;
        info!(
            dir = %dir.display(),
            lines = timetable.lines.len(),
            stops = timetable.stops.len(),
            trips = timetable.trips.len(),
            transfers = timetable.transfers.len(),
            "Loaded timetable"
        );
        Ok(timetable)
    }

    /// Validate raw tables and build the query indices.
    pub fn from_tables(tables: TimetableTables) -> Result<Self, StoreError> {
        let mut lines = HashMap::new();
        for (row, record) in tables.routes.into_iter().enumerate() {
            let id = checked(LineId::parse(&record.route_id), "routes", row, "route_id")?;
            let line = Line::new(
                id.clone(),
                record.name,
                record.background_color.unwrap_or_default(),
            );
            lines.insert(
                id,
                LineEntry {
                    line,
                    text_color: record.text_color.unwrap_or_default(),
                },
            );
        }

        let mut stops = HashMap::new();
        for (row, record) in tables.stops.into_iter().enumerate() {
            let id = checked(PlatformId::parse(&record.stop_id), "stops", row, "stop_id")?;
            let parent_station = record
                .parent_station
                .as_deref()
                .filter(|p| !p.is_empty())
                .map(|p| checked(StationId::parse(p), "stops", row, "parent_station"))
                .transpose()?;
            let station = match &parent_station {
                Some(parent) => parent.clone(),
                None => checked(StationId::parse(id.as_str()), "stops", row, "stop_id")?,
            };
            stops.insert(
                id,
                StopEntry {
                    name: record.name,
                    latitude: record.latitude,
                    longitude: record.longitude,
                    parent_station,
                    station,
                },
            );
        }

        let mut trip_index: HashMap<TripId, usize> = HashMap::new();
        let mut trips = Vec::with_capacity(tables.trips.len());
        for (row, record) in tables.trips.into_iter().enumerate() {
            let id = checked(TripId::parse(&record.trip_id), "trips", row, "trip_id")?;
            let line_id = checked(LineId::parse(&record.route_id), "trips", row, "route_id")?;
            let line = lines
                .get(&line_id)
                .map(|entry| entry.line.clone())
                .ok_or_else(|| StoreError::UnknownReference {
                    table: "trips",
                    row,
                    field: "route_id",
                    value: record.route_id.clone(),
                })?;
            trip_index.insert(id.clone(), trips.len());
            trips.push(TripEntry {
                id,
                line,
                direction: record.direction.filter(|d| !d.is_empty()),
                calls: Vec::new(),
            });
        }

        let mut sequenced: Vec<Vec<(u32, CallEntry)>> = trips.iter().map(|_| Vec::new()).collect();
        for (row, record) in tables.stop_times.into_iter().enumerate() {
            let trip_id = checked(TripId::parse(&record.trip_id), "stop_times", row, "trip_id")?;
            let trip = *trip_index
                .get(&trip_id)
                .ok_or_else(|| StoreError::UnknownReference {
                    table: "stop_times",
                    row,
                    field: "trip_id",
                    value: record.trip_id.clone(),
                })?;
            let stop = checked(PlatformId::parse(&record.stop_id), "stop_times", row, "stop_id")?;
            if !stops.contains_key(&stop) {
                return Err(StoreError::UnknownReference {
                    table: "stop_times",
                    row,
                    field: "stop_id",
                    value: record.stop_id,
                });
            }
            let departure = record
                .departure_time
                .as_deref()
                .filter(|t| !t.is_empty())
                .map(|t| {
                    ServiceTime::parse(t).map_err(|e| StoreError::InvalidField {
                        table: "stop_times",
                        row,
                        field: "departure_time",
                        reason: e.to_string(),
                    })
                })
                .transpose()?;
            sequenced[trip].push((record.stop_sequence, CallEntry { stop, departure }));
        }

        for (trip, mut calls) in trips.iter_mut().zip(sequenced) {
            calls.sort_by_key(|(sequence, _)| *sequence);
            trip.calls = calls.into_iter().map(|(_, call)| call).collect();
        }

        let mut departures: HashMap<PlatformId, Vec<DepartureSlot>> = HashMap::new();
        let mut stop_lines: HashMap<PlatformId, Vec<Line>> = HashMap::new();
        for (trip_idx, trip) in trips.iter().enumerate() {
            for (call_idx, call) in trip.calls.iter().enumerate() {
                let served_by = stop_lines.entry(call.stop.clone()).or_default();
                if !served_by.iter().any(|l| l.id == trip.line.id) {
                    served_by.push(trip.line.clone());
                }
                if let Some(time) = call.departure {
                    departures
                        .entry(call.stop.clone())
                        .or_default()
                        .push(DepartureSlot {
                            time,
                            trip: trip_idx,
                            call: call_idx,
                        });
                }
            }
        }
        for slots in departures.values_mut() {
            slots.sort_by_key(|slot| slot.time);
        }

        let mut transfers = Vec::new();
        let mut skipped = 0usize;
        for record in tables.transfers {
            let (Ok(from), Ok(to)) = (
                PlatformId::parse(&record.from_id),
                PlatformId::parse(&record.to_id),
            ) else {
                skipped += 1;
                continue;
            };
            let same_station = match (stops.get(&from), stops.get(&to)) {
                (Some(a), Some(b)) => a.parent_station.is_some() && a.station == b.station,
                _ => false,
            };
            let served = stop_lines.contains_key(&from) && stop_lines.contains_key(&to);
            if from == to || !same_station || !served {
                skipped += 1;
                continue;
            }
            transfers.push(TransferRow {
                from,
                to,
                time_secs: record.time,
            });
        }
        if skipped > 0 {
            debug!(skipped, "Ignored transfers outside a served station");
        }

        Ok(Self {
            lines,
            stops,
            trips,
            departures,
            stop_lines,
            transfers,
        })
    }

    /// Describe a platform as served by `line`.
    fn platform_row(&self, id: &PlatformId, line: &Line) -> Result<PlatformRow, StoreError> {
        let stop = self
            .stops
            .get(id)
            .ok_or_else(|| StoreError::UnknownReference {
                table: "stop_times",
                row: 0,
                field: "stop_id",
                value: id.to_string(),
            })?;
        Ok(PlatformRow {
            id: id.clone(),
            name: stop.name.clone(),
            parent_station: stop.station.clone(),
            latitude: stop.latitude,
            longitude: stop.longitude,
            line: line.clone(),
        })
    }

    /// Build the answer for a trip boarded at `call` that reaches a destination.
    fn departure_from(
        &self,
        slot: DepartureSlot,
        destinations: &[PlatformId],
    ) -> Option<Departure> {
        let trip = &self.trips[slot.trip];
        let origin = &trip.calls[slot.call];
        let (destination, arrival) = trip.calls[slot.call + 1..]
            .iter()
            .filter(|c| destinations.contains(&c.stop))
            .find_map(|c| c.departure.map(|t| (&c.stop, t)))?;
        let terminus = trip.calls.last()?;
        let terminus_name = self
            .stops
            .get(&terminus.stop)
            .map(|s| s.name.clone())
            .unwrap_or_default();

        Some(Departure {
            trip: trip.id.clone(),
            origin: origin.stop.clone(),
            destination: destination.clone(),
            departure: slot.time,
            arrival,
            direction: trip.direction.clone(),
            terminus: terminus.stop.clone(),
            terminus_name,
        })
    }
}

fn push_distinct(values: &mut Vec<String>, value: &str) {
    if !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}

/// Map an id parse failure onto a store validation error.
fn checked<T>(
    result: Result<T, InvalidId>,
    table: &'static str,
    row: usize,
    field: &'static str,
) -> Result<T, StoreError> {
    result.map_err(|e| StoreError::InvalidField {
        table,
        row,
        field,
        reason: e.to_string(),
    })
}

impl TimetableStore for CsvTimetable {
    async fn ride_hops(&self) -> Result<Vec<RideHopRow>, StoreError> {
        // Keep the earliest trip's times for each consecutive pair
        let mut earliest: HashMap<(&PlatformId, &PlatformId), (ServiceTime, ServiceTime, &Line)> =
            HashMap::new();

        for trip in &self.trips {
            for pair in trip.calls.windows(2) {
                let (Some(departure), Some(next_departure)) = (pair[0].departure, pair[1].departure)
                else {
                    continue;
                };
                earliest
                    .entry((&pair[0].stop, &pair[1].stop))
                    .and_modify(|entry| {
                        if departure < entry.0 {
                            *entry = (departure, next_departure, &trip.line);
                        }
                    })
                    .or_insert((departure, next_departure, &trip.line));
            }
        }

        let mut rows = earliest
            .into_iter()
            .map(|((from, to), (departure, next_departure, line))| -> Result<_, StoreError> {
                Ok(RideHopRow {
                    from: self.platform_row(from, line)?,
                    to: self.platform_row(to, line)?,
                    departure,
                    next_departure,
                })
            })
            .collect::<Result<Vec<RideHopRow>, _>>()?;

        rows.sort_by(|a, b| (&a.from.id, &a.to.id).cmp(&(&b.from.id, &b.to.id)));
        Ok(rows)
    }

    async fn transfers(&self) -> Result<Vec<TransferRow>, StoreError> {
        Ok(self.transfers.clone())
    }

    async fn next_departure(&self, query: &DepartureQuery) -> Result<Option<Departure>, StoreError> {
        let mut best: Option<Departure> = None;

        for origin in &query.origins {
            let Some(slots) = self.departures.get(origin) else {
                continue;
            };
            let start = match query.after {
                Some(after) => slots.partition_point(|slot| slot.time < after),
                None => 0,
            };

            for slot in &slots[start..] {
                if best.as_ref().is_some_and(|b| slot.time > b.departure) {
                    break;
                }
                let Some(candidate) = self.departure_from(*slot, &query.destinations) else {
                    continue;
                };
                let better = match &best {
                    None => true,
                    Some(current) => {
                        (candidate.departure, &candidate.direction, &candidate.trip)
                            < (current.departure, &current.direction, &current.trip)
                    }
                };
                if better {
                    best = Some(candidate);
                }
            }
        }

        Ok(best)
    }

    async fn stop(&self, id: &PlatformId) -> Result<Option<StopInfo>, StoreError> {
        Ok(self.stops.get(id).map(|stop| StopInfo {
            id: id.clone(),
            name: stop.name.clone(),
            latitude: stop.latitude,
            longitude: stop.longitude,
            parent_station: stop.parent_station.clone(),
            lines: self.stop_lines.get(id).cloned().unwrap_or_default(),
        }))
    }

    async fn search_stop_names(&self, prefix: &str, limit: usize) -> Result<Vec<String>, StoreError> {
        let prefix = prefix.trim().to_lowercase();
        if prefix.is_empty() {
            return Ok(Vec::new());
        }

        let names: BTreeSet<&str> = self
            .stops
            .values()
            .map(|stop| stop.name.as_str())
            .filter(|name| name.to_lowercase().starts_with(&prefix))
            .collect();

        Ok(names.into_iter().take(limit).map(str::to_string).collect())
    }

    async fn line_stations(&self, line_name: &str) -> Result<Option<LineStations>, StoreError> {
        let wanted = line_name.trim();
        let Some(entry) = self
            .lines
            .values()
            .filter(|entry| entry.line.name.eq_ignore_ascii_case(wanted))
            .min_by(|a, b| a.line.id.cmp(&b.line.id))
        else {
            return Ok(None);
        };

        // The longest trip covers every station, branches aside
        let longest = self
            .trips
            .iter()
            .filter(|trip| trip.line.id == entry.line.id)
            .fold(None::<&TripEntry>, |best, trip| match best {
                Some(b) if b.calls.len() >= trip.calls.len() => Some(b),
                _ => Some(trip),
            });
        let Some(trip) = longest else {
            return Ok(None);
        };

        let stations = trip
            .calls
            .iter()
            .filter_map(|call| self.stops.get(&call.stop))
            .map(|stop| stop.name.clone())
            .collect();

        Ok(Some(LineStations {
            line: entry.line.clone(),
            text_color: entry.text_color.clone(),
            stations,
        }))
    }

    async fn stops(&self) -> Result<Vec<StopSummary>, StoreError> {
        let mut served: Vec<(&PlatformId, &StopEntry, &[Line])> = self
            .stop_lines
            .iter()
            .filter_map(|(id, lines)| self.stops.get(id).map(|stop| (id, stop, lines.as_slice())))
            .filter(|(_, stop, _)| stop.latitude.is_finite() && stop.longitude.is_finite())
            .collect();
        served.sort_by(|a, b| a.0.cmp(b.0));

        let mut by_name: BTreeMap<&str, StopSummary> = BTreeMap::new();
        for (id, stop, lines) in served {
            let summary = by_name
                .entry(stop.name.as_str())
                .or_insert_with(|| StopSummary {
                    id: id.clone(),
                    name: stop.name.clone(),
                    latitude: stop.latitude,
                    longitude: stop.longitude,
                    route_names: Vec::new(),
                    route_colors: Vec::new(),
                    route_text_colors: Vec::new(),
                });
            for line in lines {
                let text_color = self
                    .lines
                    .get(&line.id)
                    .map(|entry| entry.text_color.as_str())
                    .unwrap_or_default();
                push_distinct(&mut summary.route_names, &line.name);
                push_distinct(&mut summary.route_colors, &line.color);
                push_distinct(&mut summary.route_text_colors, text_color);
            }
        }

        Ok(by_name.into_values().collect())
    }

    async fn route_colors(&self) -> Result<Vec<RouteColor>, StoreError> {
        let mut colors: Vec<RouteColor> = self
            .lines
            .values()
            .map(|entry| RouteColor {
                id: entry.line.id.clone(),
                color: entry.line.color.clone(),
            })
            .collect();
        colors.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(colors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timetable::fixtures::{
        route, scenario_tables, stop, stop_time, transfer, trip,
    };

    fn pid(s: &str) -> PlatformId {
        PlatformId::parse(s).unwrap()
    }

    fn t(s: &str) -> ServiceTime {
        ServiceTime::parse(s).unwrap()
    }

    fn scenario() -> CsvTimetable {
        CsvTimetable::from_tables(scenario_tables()).unwrap()
    }

    #[tokio::test]
    async fn ride_hops_pair_consecutive_calls() {
        let timetable = scenario();
        let hops = timetable.ride_hops().await.unwrap();

        let pairs: Vec<(&str, &str)> = hops
            .iter()
            .map(|h| (h.from.id.as_str(), h.to.id.as_str()))
            .collect();
        assert_eq!(pairs, vec![("P1", "P2"), ("P3", "P4")]);

        let first = &hops[0];
        assert_eq!(first.departure, t("08:00"));
        assert_eq!(first.next_departure, t("08:01"));
        assert_eq!(first.from.line.name, "1");
        assert_eq!(first.to.parent_station.as_str(), "SB");
    }

    #[tokio::test]
    async fn ride_hops_keep_earliest_trip() {
        let mut tables = scenario_tables();
        tables.trips.push(trip("L1", "T1-early", "Bravo"));
        tables.stop_times.push(stop_time("T1-early", "06:00:00", "P1", 1));
        tables.stop_times.push(stop_time("T1-early", "06:03:00", "P2", 2));

        let timetable = CsvTimetable::from_tables(tables).unwrap();
        let hops = timetable.ride_hops().await.unwrap();

        assert_eq!(hops[0].departure, t("06:00"));
        assert_eq!(hops[0].next_departure, t("06:03"));
    }

    #[tokio::test]
    async fn transfers_limited_to_shared_stations() {
        let mut tables = scenario_tables();
        // Different stations: dropped
        tables.transfers.push(transfer("P1", "P4", 300));
        // Unknown platform: dropped
        tables.transfers.push(transfer("P2", "BUS1", 60));

        let timetable = CsvTimetable::from_tables(tables).unwrap();
        let transfers = timetable.transfers().await.unwrap();

        assert_eq!(transfers.len(), 2);
        assert!(
            transfers
                .iter()
                .all(|t| (t.from.as_str(), t.to.as_str()) == ("P2", "P3")
                    || (t.from.as_str(), t.to.as_str()) == ("P3", "P2"))
        );
        assert!(transfers.iter().all(|t| t.time_secs == 90));
    }

    #[tokio::test]
    async fn next_departure_respects_minimum_time() {
        let timetable = scenario();
        let query = DepartureQuery::after(vec![pid("P3")], vec![pid("P4")], t("08:06"));
        let departure = timetable.next_departure(&query).await.unwrap().unwrap();

        assert_eq!(departure.trip.as_str(), "T2b");
        assert_eq!(departure.departure, t("08:15"));
        assert_eq!(departure.arrival, t("08:17"));
        assert_eq!(departure.destination, pid("P4"));
        assert_eq!(departure.direction_label(), "Charlie");
    }

    #[tokio::test]
    async fn next_departure_exact_time_is_included() {
        let timetable = scenario();
        let query = DepartureQuery::after(vec![pid("P3")], vec![pid("P4")], t("08:05"));
        let departure = timetable.next_departure(&query).await.unwrap().unwrap();
        assert_eq!(departure.departure, t("08:05"));
    }

    #[tokio::test]
    async fn next_departure_none_after_last_train() {
        let timetable = scenario();
        let query = DepartureQuery::after(vec![pid("P3")], vec![pid("P4")], t("23:58"));
        assert!(timetable.next_departure(&query).await.unwrap().is_none());

        let first = DepartureQuery::first_of_service(vec![pid("P3")], vec![pid("P4")]);
        let departure = timetable.next_departure(&first).await.unwrap().unwrap();
        assert_eq!(departure.departure, t("05:30"));
    }

    #[tokio::test]
    async fn next_departure_requires_destination_downstream() {
        let timetable = scenario();
        // P2 is only ever the last stop of its trips
        let query = DepartureQuery::after(vec![pid("P2")], vec![pid("P1")], t("00:00"));
        assert!(timetable.next_departure(&query).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn next_departure_accepts_either_direction() {
        let mut tables = scenario_tables();
        tables.routes.push(route("L7B", "7bis", "6ECA97"));
        tables.stops.push(stop("LA", "Louis Blanc", "SLB", 48.881, 2.364));
        tables.stops.push(stop("LA2", "Louis Blanc", "SLB", 48.881, 2.364));
        tables.stops.push(stop("JA", "Jaures", "SJA", 48.882, 2.370));
        tables.stops.push(stop("JA2", "Jaures", "SJA", 48.882, 2.370));
        // Clockwise reaches JA at 09:10, the other way reaches JA2 at 09:04
        tables.trips.push(trip("L7B", "CW", "Pre Saint-Gervais"));
        tables.stop_times.push(stop_time("CW", "09:08:00", "LA", 1));
        tables.stop_times.push(stop_time("CW", "09:10:00", "JA", 2));
        tables.trips.push(trip("L7B", "CCW", "Louis Blanc"));
        tables.stop_times.push(stop_time("CCW", "09:02:00", "LA2", 1));
        tables.stop_times.push(stop_time("CCW", "09:04:00", "JA2", 2));

        let timetable = CsvTimetable::from_tables(tables).unwrap();
        let query = DepartureQuery::after(
            vec![pid("LA"), pid("LA2")],
            vec![pid("JA"), pid("JA2")],
            t("09:00"),
        );
        let departure = timetable.next_departure(&query).await.unwrap().unwrap();

        assert_eq!(departure.trip.as_str(), "CCW");
        assert_eq!(departure.origin, pid("LA2"));
        assert_eq!(departure.destination, pid("JA2"));
        assert_eq!(departure.terminus, pid("JA2"));
    }

    #[tokio::test]
    async fn stop_lookup() {
        let timetable = scenario();
        let info = timetable.stop(&pid("P3")).await.unwrap().unwrap();
        assert_eq!(info.name, "Bravo");
        assert_eq!(info.parent_station.as_ref().map(|s| s.as_str()), Some("SB"));
        assert_eq!(info.lines.len(), 1);
        assert_eq!(info.lines[0].name, "2");

        assert!(timetable.stop(&pid("NOPE")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn search_names_by_prefix() {
        let timetable = scenario();

        let names = timetable.search_stop_names("br", 10).await.unwrap();
        assert_eq!(names, vec!["Bravo".to_string()]);

        let names = timetable.search_stop_names("", 10).await.unwrap();
        assert!(names.is_empty());

        let names = timetable.search_stop_names("a", 10).await.unwrap();
        assert_eq!(names, vec!["Alpha".to_string()]);
    }

    #[tokio::test]
    async fn search_names_respects_limit() {
        let timetable = scenario();
        let mut tables = scenario_tables();
        tables.stops.push(stop("X1", "Bastille", "SX", 48.85, 2.37));
        tables.stops.push(stop("X2", "Balard", "SY", 48.83, 2.27));
        let timetable_more = CsvTimetable::from_tables(tables).unwrap();

        let names = timetable_more.search_stop_names("ba", 1).await.unwrap();
        assert_eq!(names, vec!["Balard".to_string()]);
        assert!(timetable.search_stop_names("zz", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn line_stations_follow_longest_trip() {
        let timetable = scenario();
        let stations = timetable.line_stations("2").await.unwrap().unwrap();
        assert_eq!(stations.line.name, "2");
        assert_eq!(stations.stations, vec!["Bravo", "Charlie"]);

        assert!(timetable.line_stations("14").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn stops_grouped_by_name() {
        let mut tables = scenario_tables();
        tables.stops.push(stop("X1", "Depot", "SX", 48.80, 2.30));
        let timetable = CsvTimetable::from_tables(tables).unwrap();

        let stops = timetable.stops().await.unwrap();
        let names: Vec<&str> = stops.iter().map(|s| s.name.as_str()).collect();
        // Depot has no trips calling at it
        assert_eq!(names, vec!["Alpha", "Bravo", "Charlie"]);

        let bravo = &stops[1];
        assert_eq!(bravo.id, pid("P2"));
        assert_eq!(bravo.latitude, 48.8570);
        assert_eq!(bravo.route_names, vec!["1", "2"]);
        assert_eq!(bravo.route_colors, vec!["FFCD00", "003CA6"]);
        assert_eq!(bravo.route_text_colors, vec!["FFFFFF"]);

        assert_eq!(stops[2].route_names, vec!["2"]);
    }

    #[tokio::test]
    async fn route_colors_sorted_by_id() {
        let mut tables = scenario_tables();
        tables.routes.push(route("L14", "14", "62259D"));
        let timetable = CsvTimetable::from_tables(tables).unwrap();

        let colors = timetable.route_colors().await.unwrap();
        let pairs: Vec<(&str, &str)> = colors
            .iter()
            .map(|c| (c.id.as_str(), c.color.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![("L1", "FFCD00"), ("L14", "62259D"), ("L2", "003CA6")]
        );
    }

    #[test]
    fn unknown_route_is_rejected() {
        let mut tables = scenario_tables();
        tables.trips.push(trip("L99", "TX", "Nowhere"));

        let err = CsvTimetable::from_tables(tables).unwrap_err();
        assert!(matches!(
            err,
            StoreError::UnknownReference {
                field: "route_id",
                ..
            }
        ));
    }

    #[test]
    fn malformed_time_is_rejected() {
        let mut tables = scenario_tables();
        tables.stop_times.push(stop_time("T1", "8h00", "P1", 9));

        let err = CsvTimetable::from_tables(tables).unwrap_err();
        assert!(matches!(
            err,
            StoreError::InvalidField {
                field: "departure_time",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn open_reads_csv_directory() {
        let dir = tempfile::tempdir().unwrap();
        let write = |name: &str, body: &str| std::fs::write(dir.path().join(name), body).unwrap();

        write(
            ROUTES_FILE,
            "route_id,name,type,background_color,text_color\nL1,1,metro,FFCD00,000000\n",
        );
        write(
            TRIPS_FILE,
            "route_id,service_id,trip_id,direction,wheelchair_accessible,bikes_allowed\n\
             L1,S1,T1,Chateau de Vincennes,1,0\n",
        );
        write(
            STOP_TIMES_FILE,
            "trip_id,departure_time,stop_id,stop_sequence\n\
             T1,24:58:00,A,1\n\
             T1,25:00:30,B,2\n",
        );
        write(
            STOPS_FILE,
            "stop_id,name,latitude,longitude,zone_id,parent_station,wheelchair_accessible\n\
             A,Nation,48.8483,2.3959,1,SA,1\n\
             B,Porte de Vincennes,48.8470,2.4108,1,,1\n",
        );
        write(TRANSFERS_FILE, "from_id,to_id,time\n");

        let timetable = CsvTimetable::open(dir.path()).unwrap();
        let hops = timetable.ride_hops().await.unwrap();

        assert_eq!(hops.len(), 1);
        assert_eq!(hops[0].departure.to_string(), "24:58:00");
        assert_eq!(hops[0].next_departure.to_string(), "25:00:30");
        // No parent station: the stop is its own station
        assert_eq!(hops[0].to.parent_station.as_str(), "B");
    }

    #[test]
    fn open_missing_directory_fails() {
        let err = CsvTimetable::open("/nonexistent/metro/data").unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
        assert!(err.is_transient());
    }
}
