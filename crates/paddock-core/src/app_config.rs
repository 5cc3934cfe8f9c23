use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Public base URL of this service. Scheduled session jobs post their
    /// trigger requests back to it, so it must route to this process.
    pub base_url: String,
    pub calendar_path: PathBuf,
    /// Directory the scraper writes session artifacts into, laid out as
    /// `<results_dir>/<year>/<round>/<file>.json`.
    pub results_dir: PathBuf,
    /// Command line (program plus leading arguments) invoked to scrape one
    /// session category, e.g. `python3 scraper/main.py`.
    pub scraper_cmd: String,
    pub scraper_timeout_secs: u64,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("base_url", &self.base_url)
            .field("calendar_path", &self.calendar_path)
            .field("results_dir", &self.results_dir)
            .field("scraper_cmd", &self.scraper_cmd)
            .field("scraper_timeout_secs", &self.scraper_timeout_secs)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
