//! Web layer for the metro router.
//!
//! Provides HTTP endpoints for planning itineraries and exploring the
//! network.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::{AppState, Timetable};
