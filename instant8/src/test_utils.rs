//! Shared fixtures for unit and integration tests.
//!
//! Kept unconditionally public so integration tests under `tests/` can use
//! the same fixtures as `#[cfg(test)]` modules.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::{Config, DeploymentsConfig};
use crate::db::store::{MemoryStorage, Storage};
use crate::lifecycle::LifecycleScheduler;
use crate::{seed_defaults, AppState};

/// Provisioning delay used by tests that wait for the scheduler.
pub const TEST_PROVISIONING_DELAY: Duration = Duration::from_millis(50);

/// Config with a signing key and a short provisioning delay.
pub fn test_config() -> Config {
    Config {
        secret_key: Some("test-secret-key-for-sessions".to_string()),
        deployments: DeploymentsConfig {
            provisioning_delay: TEST_PROVISIONING_DELAY,
        },
        ..Config::default()
    }
}

/// App state backed by seeded in-memory storage.
pub async fn test_state() -> AppState {
    let config = test_config();
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    seed_defaults(storage.as_ref()).await.expect("seed test storage");

    let lifecycle = Arc::new(LifecycleScheduler::new(
        storage.clone(),
        config.deployments.provisioning_delay,
        CancellationToken::new(),
    ));

    AppState::builder().storage(storage).config(config).lifecycle(lifecycle).build()
}
