use dashmap::DashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::config::ServerConfig;
use crate::store::Store;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Book/user document store (shared across requests)
    pub store: Arc<Store>,

    /// Rate limit tracking: user id -> (count, window_start)
    pub rate_limiter: Arc<DashMap<String, (u32, Instant)>>,
}

impl ServerState {
    /// Create new server state: ensures the image directory exists and
    /// opens the document store.
    pub fn new(config: ServerConfig) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&config.image_dir)?;
        let store = Store::open(&config.db_path)?;

        Ok(Self {
            config: Arc::new(config),
            store: Arc::new(store),
            rate_limiter: Arc::new(DashMap::new()),
        })
    }

    /// Fixed-window rate limit per authenticated user.
    pub fn check_rate_limit(&self, user_id: &str) -> bool {
        let now = Instant::now();
        let window = std::time::Duration::from_secs(60);
        let limit = self.config.rate_limit_per_minute;

        let mut entry = self
            .rate_limiter
            .entry(user_id.to_string())
            .or_insert((0, now));
        let (count, window_start) = entry.value_mut();

        // Reset if window has passed
        if now.duration_since(*window_start) > window {
            *count = 0;
            *window_start = now;
        }

        if *count >= limit {
            return false;
        }

        *count += 1;
        true
    }
}
