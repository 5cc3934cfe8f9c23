//! Offline unit tests for paddock-db pool configuration and row types.
//! These tests do not require a live database connection.

use paddock_db::{DriverRow, EventRow, PoolConfig, TeamRow};
use paddock_core::{AppConfig, Environment};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        base_url: "http://127.0.0.1:3000".to_string(),
        calendar_path: PathBuf::from("./config/calendar.yaml"),
        results_dir: PathBuf::from("./results"),
        scraper_cmd: "python3 scraper/main.py".to_string(),
        scraper_timeout_secs: 300,
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

/// Compile-time smoke test: confirm that [`EventRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn event_row_has_expected_fields() {
    use chrono::{NaiveDate, Utc};
    use serde_json::json;

    let row = EventRow {
        id: "gp-2025-sakhir".to_string(),
        name: "Bahrain Grand Prix".to_string(),
        circuit: "sakhir".to_string(),
        season: 2025,
        round: 4,
        date: NaiveDate::from_ymd_opt(2025, 4, 13).unwrap(),
        time_zone: "Asia/Bahrain".to_string(),
        sessions: json!([]),
        race_results: json!([]),
        finished: false,
        winner: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    assert_eq!(row.id, "gp-2025-sakhir");
    assert_eq!(row.season, 2025);
    assert_eq!(row.round, 4);
    assert!(!row.finished);
    assert!(row.winner.is_none());
}

/// Compile-time smoke test: confirm that [`DriverRow`] and [`TeamRow`] have
/// all expected fields with the correct types. No database required.
#[test]
fn standings_rows_have_expected_fields() {
    use chrono::Utc;

    let driver = DriverRow {
        id: "norris".to_string(),
        name: "Lando Norris".to_string(),
        team: "mclaren".to_string(),
        season_points: Some(25.0),
        total_points: 25.0,
        gp_entered: 1,
        podiums: 1,
        victories: 1,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    let team = TeamRow {
        id: "mclaren".to_string(),
        name: "McLaren".to_string(),
        points: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    assert_eq!(driver.team, team.id);
    assert_eq!(driver.season_points, Some(25.0));
    assert!(team.points.is_none());
}
