//! Routing configuration for the journey planner.

use std::collections::BTreeSet;
use std::time::Duration;

use crate::domain::PlatformId;

/// Extra cost, in seconds, charged per transfer when minimising changes.
///
/// Larger than any plausible single transfer walk, so one fewer change
/// always beats a faster route.
pub const DEFAULT_TRANSFER_PENALTY_SECS: u32 = 1000;

/// Tie-break cost per transfer when minimising duration, in cost units.
pub const DEFAULT_TIE_BREAK_UNITS: u64 = 1;

/// Timetable stop point that the data links straight to an unrelated
/// platform. No train ever makes that run, so it never originates a ride.
///
/// Deployments replace this with `METRO_EXCLUDED_PLATFORMS`.
pub const PHANTOM_RIDE_ORIGIN: &str = "IDFM:phantom";

/// Grams of CO2e per passenger-kilometre for metro travel.
pub const DEFAULT_CARBON_GRAMS_PER_KM: f64 = 4.4;

/// Configuration parameters for routing.
#[derive(Debug, Clone)]
pub struct RoutingConfig {
    /// Seconds added per transfer under the transfers criterion.
    pub transfer_penalty_secs: u32,

    /// Cost units added per transfer under the duration criterion.
    pub tie_break_units: u64,

    /// Platforms that never produce outgoing ride-hops.
    pub excluded_ride_origins: BTreeSet<PlatformId>,

    /// Carbon factor used for itinerary footprints.
    pub carbon_grams_per_km: f64,

    /// How many times a departure lookup is tried before giving up.
    /// Only transient store errors are retried.
    pub store_attempts: u32,

    /// Pause between departure lookup attempts (milliseconds).
    pub store_retry_delay_ms: u64,
}

impl RoutingConfig {
    /// Replace the set of excluded ride origins.
    pub fn with_excluded_ride_origins(
        mut self,
        origins: impl IntoIterator<Item = PlatformId>,
    ) -> Self {
        self.excluded_ride_origins = origins.into_iter().collect();
        self
    }

    /// Set the transfer penalty used by the transfers criterion.
    pub fn with_transfer_penalty_secs(mut self, secs: u32) -> Self {
        self.transfer_penalty_secs = secs;
        self
    }

    /// Set the number of departure lookup attempts (at least one).
    pub fn with_store_attempts(mut self, attempts: u32) -> Self {
        self.store_attempts = attempts.max(1);
        self
    }

    /// Whether `id` is barred from originating ride-hops.
    pub fn is_excluded_ride_origin(&self, id: &PlatformId) -> bool {
        self.excluded_ride_origins.contains(id)
    }

    /// Returns the retry pause as a Duration.
    pub fn store_retry_delay(&self) -> Duration {
        Duration::from_millis(self.store_retry_delay_ms)
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            transfer_penalty_secs: DEFAULT_TRANSFER_PENALTY_SECS,
            tie_break_units: DEFAULT_TIE_BREAK_UNITS,
            excluded_ride_origins: PlatformId::parse(PHANTOM_RIDE_ORIGIN)
                .into_iter()
                .collect(),
            carbon_grams_per_km: DEFAULT_CARBON_GRAMS_PER_KM,
            store_attempts: 3,
            store_retry_delay_ms: 50,
        }
    }
}
