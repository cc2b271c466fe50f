//! The in-memory metro network.
//!
//! Platforms and hops are materialised once from the timetable, then shared
//! read-only by every routing request.

mod builder;
mod connectivity;
mod error;
mod graph;
mod handle;
mod mst;

#[cfg(test)]
pub(crate) mod fixtures;

pub use builder::{build_network, great_circle_meters};
pub use connectivity::is_connected;
pub use error::NetworkError;
pub use graph::{Hop, Network, Platform};
pub use handle::NetworkHandle;
pub use mst::build_mst;
