use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use metro_server::cache::{CacheConfig, CachedTimetable};
use metro_server::domain::PlatformId;
use metro_server::network::{NetworkHandle, is_connected};
use metro_server::planner::RoutingConfig;
use metro_server::timetable::CsvTimetable;
use metro_server::web::{AppState, create_router};

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_LOG_FILTER: &str = "metro_server=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let data_dir = PathBuf::from(
        std::env::var("METRO_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string()),
    );
    let addr: SocketAddr = std::env::var("METRO_LISTEN_ADDR")
        .unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string())
        .parse()?;

    let mut config = RoutingConfig::default();
    if let Ok(list) = std::env::var("METRO_EXCLUDED_PLATFORMS") {
        let excluded = parse_platform_list(&list)?;
        info!(count = excluded.len(), "Using excluded ride origins from environment");
        config = config.with_excluded_ride_origins(excluded);
    }

    if let Some(penalty) = env_number("METRO_TRANSFER_PENALTY_SECS")? {
        config = config.with_transfer_penalty_secs(penalty);
    }

    let defaults = CacheConfig::default();
    let cache_config = CacheConfig::new(
        env_number("METRO_CACHE_TTL_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.ttl),
        env_number("METRO_CACHE_CAPACITY")?.unwrap_or(defaults.max_capacity),
    );

    // Load the timetable (fail fast if unavailable)
    let timetable = CsvTimetable::open(&data_dir)?;
    let store = CachedTimetable::new(timetable, &cache_config);

    let state = AppState::new(store, NetworkHandle::new(), config);

    // Build the network up front so the first request doesn't pay for it
    let network = state
        .network
        .network(state.store.as_ref(), &state.config)
        .await?;
    if !is_connected(&network) {
        warn!("Network is not connected; some platforms are unreachable");
    }

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, data_dir = %data_dir.display(), "Metro planner listening");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Parse a comma-separated platform list, ignoring blank entries.
fn parse_platform_list(list: &str) -> Result<Vec<PlatformId>, metro_server::domain::InvalidId> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PlatformId::parse)
        .collect()
}

/// Read an optional numeric setting, failing on values that do not parse.
fn env_number<T>(name: &str) -> Result<Option<T>, Box<dyn std::error::Error>>
where
    T: FromStr,
    T::Err: std::error::Error + 'static,
{
    match std::env::var(name) {
        Ok(raw) => Ok(Some(raw.trim().parse()?)),
        Err(_) => Ok(None),
    }
}
