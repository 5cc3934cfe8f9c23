//! Shared fixtures for the server test modules.

use std::path::Path;
use std::sync::Arc;

use paddock_core::{AppConfig, Environment};

/// An [`AppConfig`] for tests that never touches the environment. The
/// database URL is a placeholder; tests get their pool from `sqlx::test`.
pub(crate) fn app_config(results_dir: &Path, scraper_cmd: &str) -> Arc<AppConfig> {
    Arc::new(AppConfig {
        database_url: "postgres://unused".to_string(),
        env: Environment::Test,
        bind_addr: "127.0.0.1:0".parse().expect("bind addr"),
        log_level: "info".to_string(),
        base_url: "http://127.0.0.1:3000".to_string(),
        calendar_path: "./config/calendar.yaml".into(),
        results_dir: results_dir.to_path_buf(),
        scraper_cmd: scraper_cmd.to_string(),
        scraper_timeout_secs: 5,
        db_max_connections: 5,
        db_min_connections: 1,
        db_acquire_timeout_secs: 5,
    })
}
