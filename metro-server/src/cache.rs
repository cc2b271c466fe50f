//! Caching layer for timetable departure lookups.
//!
//! Itinerary requests for popular journeys ask the same departure questions
//! over and over. The timetable never changes during a run, so answers only
//! expire to bound memory.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::domain::PlatformId;
use crate::timetable::{
    Departure, DepartureQuery, LineStations, RideHopRow, RouteColor, StopInfo, StopSummary,
    StoreError, TimetableStore, TransferRow,
};

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl CacheConfig {
    /// Create a new configuration.
    pub fn new(ttl: Duration, max_capacity: u64) -> Self {
        Self { ttl, max_capacity }
    }

    /// Set the entry TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the maximum number of cached entries.
    pub fn with_max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = max_capacity;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(10 * 60),
            max_capacity: 10_000,
        }
    }
}

/// Timetable store with cached departure lookups.
///
/// Only `next_departure` is cached: the graph queries run once per process
/// and the stop lookups are already cheap.
pub struct CachedTimetable<S> {
    inner: S,
    departures: MokaCache<DepartureQuery, Arc<Option<Departure>>>,
}

impl<S: TimetableStore> CachedTimetable<S> {
    /// Wrap a store.
    pub fn new(inner: S, config: &CacheConfig) -> Self {
        let departures = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { inner, departures }
    }

    /// Access the underlying store for operations that bypass the cache.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Get cache statistics (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.departures.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.departures.invalidate_all();
    }
}

impl<S: TimetableStore> TimetableStore for CachedTimetable<S> {
    async fn ride_hops(&self) -> Result<Vec<RideHopRow>, StoreError> {
        self.inner.ride_hops().await
    }

    async fn transfers(&self) -> Result<Vec<TransferRow>, StoreError> {
        self.inner.transfers().await
    }

    async fn next_departure(&self, query: &DepartureQuery) -> Result<Option<Departure>, StoreError> {
        // Try cache first
        if let Some(cached) = self.departures.get(query).await {
            return Ok(cached.as_ref().clone());
        }

        let departure = self.inner.next_departure(query).await?;

        // Misses are cached too: "no train" is a stable answer
        self.departures
            .insert(query.clone(), Arc::new(departure.clone()))
            .await;

        Ok(departure)
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
