//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::Line;
use crate::network::{Hop, Network, Platform};
use crate::planner::{Segment, SegmentTimes, Stop, TimedItinerary};
use crate::timetable::{LineStations, RouteColor, StopInfo, StopSummary};

/// Query for the itinerary endpoint.
#[derive(Debug, Deserialize)]
pub struct ItineraryRequest {
    /// Origin platform id
    pub from: String,

    /// Destination platform id
    pub to: String,

    /// Desired departure, `HH:MM` or `HH:MM:SS` (defaults to now); hours
    /// before 04 count as after midnight
    pub departure: Option<String>,
}

/// Query for the network endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct NetworkRequest {
    /// Return the minimum spanning tree instead of the full graph
    #[serde(default)]
    pub mst: bool,
}

/// Query for stop name autocompletion.
#[derive(Debug, Deserialize)]
pub struct AutocompleteRequest {
    /// Name prefix; required and non-blank
    #[serde(default)]
    pub q: Option<String>,
}

/// Response for itinerary planning.
#[derive(Debug, Serialize)]
pub struct ItineraryResponse {
    /// Fastest first, then the fewest-changes alternative if any
    pub itineraries: Vec<ItineraryResult>,
}

/// One planned itinerary.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryResult {
    /// `duration` or `transfers`
    pub criterion: String,
    pub departure_time: Option<String>,
    pub arrival_time: Option<String>,
    /// Riding plus connecting time
    pub duration_secs: u32,
    pub distance_meters: f64,
    pub walking_secs: u32,
    pub transfer_count: usize,
    pub stop_count: usize,
    /// Grams of CO2e
    pub carbon_grams: f64,
    pub segments: Vec<SegmentResult>,
}

/// A ride on one line.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentResult {
    pub line: LineResult,
    pub direction: String,
    pub departure_time: String,
    pub arrival_time: String,
    /// Timetable trip, absent when no train serves the segment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trip_id: Option<String>,
    /// Ride time in whole minutes, rounded up
    pub ride_mins: u32,
    /// Absent on the first segment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connecting_secs: Option<u32>,
    pub stops: Vec<StopResult>,
}

/// A stop along a segment.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopResult {
    pub id: String,
    pub name: String,
    pub duration_secs: u32,
    pub distance_meters: f64,
}

/// Line identity and colour.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineResult {
    pub id: String,
    pub name: String,
    pub color: String,
}

/// Response for the network endpoint.
#[derive(Debug, Serialize)]
pub struct NetworkResponse {
    pub nodes: Vec<NodeResult>,
    pub edges: Vec<EdgeResult>,
    /// Whether every platform can be reached from the first one
    pub connected: bool,
}

/// A platform for network visualisation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeResult {
    pub id: String,
    pub name: String,
    pub station_id: String,
    pub line: LineResult,
    pub latitude: f64,
    pub longitude: f64,
}

/// A hop for network visualisation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeResult {
    pub from: String,
    pub to: String,
    pub duration_secs: u32,
    pub distance_meters: f64,
    pub is_transfer: bool,
}

/// Response for a single stop.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopInfoResponse {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub parent_station: Option<String>,
    pub lines: Vec<LineResult>,
}

/// Response for stop name autocompletion.
#[derive(Debug, Serialize)]
pub struct AutocompleteResponse {
    pub names: Vec<String>,
}

/// Response for a line's stations.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineStationsResponse {
    pub line: LineResult,
    pub text_color: String,
    pub stations: Vec<String>,
}

/// Response listing every served stop for the map.
#[derive(Debug, Serialize)]
pub struct StopsResponse {
    pub stops: Vec<StopSummaryResult>,
}

/// A stop name with the lines calling there.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopSummaryResult {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub route_names: Vec<String>,
    pub route_colors: Vec<String>,
    pub route_text_colors: Vec<String>,
}

/// A line id and its background colour.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteColorResult {
    pub route_id: String,
    pub background_color: String,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

// Conversion implementations

impl ItineraryResult {
    /// Create from a bound itinerary.
    pub fn from_timed(timed: &TimedItinerary) -> Self {
        let itinerary = &timed.itinerary;
        Self {
            criterion: itinerary.criterion.to_string(),
            departure_time: timed.departure().map(|t| t.to_string()),
            arrival_time: timed.arrival().map(|t| t.to_string()),
            duration_secs: itinerary.total_duration_secs(),
            distance_meters: itinerary.total_distance_meters(),
            walking_secs: itinerary.walking_secs(),
            transfer_count: itinerary.transfer_count(),
            stop_count: itinerary.stop_count(),
            carbon_grams: itinerary.carbon_grams,
            segments: timed
                .segments()
                .map(|(segment, times)| SegmentResult::from_segment(segment, times))
                .collect(),
        }
    }
}

impl SegmentResult {
    pub fn from_segment(segment: &Segment, times: &SegmentTimes) -> Self {
        Self {
            line: LineResult::from(&segment.line),
            direction: segment.direction.clone(),
            departure_time: times.departure.to_string(),
            arrival_time: times.arrival.to_string(),
            trip_id: times.trip.as_ref().map(|t| t.to_string()),
            ride_mins: segment.ride_minutes(),
            connecting_secs: segment.connecting_secs,
            stops: segment.stops.iter().map(StopResult::from).collect(),
        }
    }
}

impl From<&Stop> for StopResult {
    fn from(stop: &Stop) -> Self {
        Self {
            id: stop.id.to_string(),
            name: stop.name.clone(),
            duration_secs: stop.duration_secs,
            distance_meters: stop.distance_meters,
        }
    }
}

impl From<&Line> for LineResult {
    fn from(line: &Line) -> Self {
        Self {
            id: line.id.to_string(),
            name: line.name.clone(),
            color: line.color.clone(),
        }
    }
}

impl From<&Platform> for NodeResult {
    fn from(platform: &Platform) -> Self {
        Self {
            id: platform.id.to_string(),
            name: platform.name.clone(),
            station_id: platform.parent_station.to_string(),
            line: LineResult::from(&platform.line),
            latitude: platform.latitude,
            longitude: platform.longitude,
        }
    }
}

impl From<&Hop> for EdgeResult {
    fn from(hop: &Hop) -> Self {
        Self {
            from: hop.from.to_string(),
            to: hop.to.to_string(),
            duration_secs: hop.duration_secs,
            distance_meters: hop.distance_meters,
            is_transfer: hop.is_transfer,
        }
    }
}

impl NetworkResponse {
    /// Create from a network and its connectivity.
    pub fn from_network(network: &Network, connected: bool) -> Self {
        Self {
            nodes: network.nodes().map(NodeResult::from).collect(),
            edges: network.hops().map(EdgeResult::from).collect(),
            connected,
        }
    }
}

impl From<StopInfo> for StopInfoResponse {
    fn from(stop: StopInfo) -> Self {
        Self {
            id: stop.id.to_string(),
            name: stop.name,
            latitude: stop.latitude,
            longitude: stop.longitude,
            parent_station: stop.parent_station.map(|s| s.to_string()),
            lines: stop.lines.iter().map(LineResult::from).collect(),
        }
    }
}

impl From<LineStations> for LineStationsResponse {
    fn from(line: LineStations) -> Self {
        Self {
            line: LineResult::from(&line.line),
            text_color: line.text_color,
            stations: line.stations,
        }
    }
}

impl From<StopSummary> for StopSummaryResult {
    fn from(stop: StopSummary) -> Self {
        Self {
            id: stop.id.to_string(),
            name: stop.name,
            latitude: stop.latitude,
            longitude: stop.longitude,
            route_names: stop.route_names,
            route_colors: stop.route_colors,
            route_text_colors: stop.route_text_colors,
        }
    }
}

impl From<RouteColor> for RouteColorResult {
    fn from(route: RouteColor) -> Self {
        Self {
            route_id: route.id.to_string(),
            background_color: route.color,
        }
    }
}
