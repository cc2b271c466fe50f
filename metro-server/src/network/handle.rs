//! Build-once access to the platform graph and its spanning tree.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::info;

use crate::planner::RoutingConfig;
use crate::timetable::TimetableStore;

use super::builder::build_network;
use super::error::NetworkError;
use super::graph::Network;
use super::mst::build_mst;

/// Lazily built, process-wide network state.
///
/// Constructed once at start-up and passed explicitly to request handlers.
/// The first caller builds; concurrent callers wait for the same build. A
/// failed build leaves the handle empty, so a later call tries again. Once
/// built, the graphs are never invalidated.
#[derive(Debug, Default)]
pub struct NetworkHandle {
    network: OnceCell<Arc<Network>>,
    mst: OnceCell<Arc<Network>>,
}

impl NetworkHandle {
    /// Create an empty handle; nothing is built until first use.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a handle around an already-built network.
    pub fn with_network(network: Network) -> Self {
        Self {
            network: OnceCell::new_with(Some(Arc::new(network))),
            mst: OnceCell::new(),
        }
    }

    /// The full platform graph, building it on first use.
    pub async fn network<S: TimetableStore>(
        &self,
        store: &S,
        config: &RoutingConfig,
    ) -> Result<Arc<Network>, NetworkError> {
        self.network
            .get_or_try_init(|| async { build_network(store, config).await.map(Arc::new) })
            .await
            .cloned()
    }

    /// The minimum spanning tree of the graph, building both on first use.
    pub async fn mst<S: TimetableStore>(
        &self,
        store: &S,
        config: &RoutingConfig,
    ) -> Result<Arc<Network>, NetworkError> {
        let network = self.network(store, config).await?;
        let tree = self
            .mst
            .get_or_init(|| async move {
                let tree = build_mst(&network);
                info!(
                    platforms = tree.node_count(),
                    hops = tree.edge_count(),
                    "Built minimum spanning tree"
                );
                Arc::new(tree)
            })
            .await;
        Ok(Arc::clone(tree))
    }

    /// Whether the full graph has been built.
    pub fn is_built(&self) -> bool {
        self.network.initialized()
    }
}
