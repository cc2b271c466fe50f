//! Domain types for the metro router.
//!
//! This module contains the value types shared by the timetable store, the
//! network graph and the planner. All types enforce their invariants at
//! construction time, so code that receives them can trust their validity.

mod ids;
mod line;
mod time;

pub use ids::{InvalidId, LineId, PlatformId, StationId, TripId};
pub use line::Line;
pub use time::{
    SECONDS_PER_DAY, SERVICE_DAY_CUTOVER_HOUR, ServiceTime, TimeError, ceil_to_minute,
};
