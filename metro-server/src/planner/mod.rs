//! Journey planner over the metro network.
//!
//! Planning runs in four steps. A Dijkstra search under the chosen
//! criterion finds a raw path of platforms. The path is cut into ride
//! segments at every transfer. Platform-change artefacts are cleaned away.
//! Finally each segment is bound to a real scheduled train.

mod config;
mod itinerary;
mod path;
mod plan;
mod schedule;
mod segment;

pub use config::{
    DEFAULT_CARBON_GRAMS_PER_KM, DEFAULT_TIE_BREAK_UNITS, DEFAULT_TRANSFER_PENALTY_SECS,
    PHANTOM_RIDE_ORIGIN, RoutingConfig,
};
pub use itinerary::{Itinerary, Segment, SegmentTimes, Stop, TimedItinerary};
pub use path::{COST_UNITS_PER_SECOND, Criterion, Path, PathStep, find_path};
pub use plan::{PlanError, PlanRequest, plan, route};
pub use schedule::bind_times;
pub use segment::segment;
