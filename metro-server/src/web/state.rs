//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::CachedTimetable;
use crate::network::NetworkHandle;
use crate::planner::RoutingConfig;
use crate::timetable::CsvTimetable;

/// The timetable store used by the server.
pub type Timetable = CachedTimetable<CsvTimetable>;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Cached timetable
    pub store: Arc<Timetable>,

    /// Lazily built network and spanning tree
    pub network: Arc<NetworkHandle>,

    /// Routing configuration
    pub config: Arc<RoutingConfig>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(store: Timetable, network: NetworkHandle, config: RoutingConfig) -> Self {
        Self {
            store: Arc::new(store),
            network: Arc::new(network),
            config: Arc::new(config),
        }
    }
}
