// Application configuration, loaded from environment variables and CLI flags.

use std::path::PathBuf;
use std::time::Duration;

use crate::connect::{PairSettings, DEFAULT_MAX_ATTEMPTS};

/// Local frontend dev servers allowed by default.
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:8080",
    "http://localhost:5174",
    "http://localhost:5173",
];

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Database URL (SQLite connection string).
    pub database_url: String,
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Origins allowed by CORS.
    pub allowed_origins: Vec<String>,
    /// Walk attempts before puzzle pair generation gives up.
    pub pair_max_attempts: u32,
    /// Deadline for one path or pair request.
    pub connect_timeout: Duration,
    /// Scraped `ufc.csv` to load before serving.
    pub import_csv: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:fighters.db?mode=rwc".to_string(),
            port: 3000,
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect(),
            pair_max_attempts: DEFAULT_MAX_ATTEMPTS,
            connect_timeout: Duration::from_millis(5000),
            import_csv: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables and CLI arguments.
    ///
    /// Environment variables:
    /// - `DATABASE_URL` - SQLite connection string (default: `sqlite:fighters.db?mode=rwc`)
    /// - `PORT` - HTTP server port (default: 3000)
    /// - `ALLOWED_ORIGINS` - comma-separated CORS origins
    /// - `PAIR_MAX_ATTEMPTS` - walk attempts per puzzle pair (default: 10)
    /// - `CONNECT_TIMEOUT_MS` - deadline for path/pair requests (default: 5000)
    ///
    /// CLI flags:
    /// - `--port <PORT>` - Override the port
    /// - `--database <URL>` - Override the database URL
    /// - `--import <FILE>` - Import a scraped `ufc.csv` before serving
    pub fn load() -> Self {
        let args: Vec<String> = std::env::args().collect();
        Self::from_sources(&args, |key| std::env::var(key).ok())
    }

    /// Build a config from CLI arguments and an environment lookup.
    pub fn from_sources<F>(args: &[String], env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let database_url = Self::parse_cli_value(args, "--database")
            .or_else(|| env("DATABASE_URL"))
            .unwrap_or(defaults.database_url);

        // Port: CLI flag --port takes precedence, then env var, then default
        let port = Self::parse_cli_value(args, "--port")
            .and_then(|v| v.parse().ok())
            .or_else(|| env("PORT").and_then(|v| v.parse().ok()))
            .unwrap_or(defaults.port);

        let allowed_origins = env("ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty())
            .unwrap_or(defaults.allowed_origins);

        let pair_max_attempts = env("PAIR_MAX_ATTEMPTS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.pair_max_attempts);

        let connect_timeout = env("CONNECT_TIMEOUT_MS")
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.connect_timeout);

        let import_csv = Self::parse_cli_value(args, "--import").map(PathBuf::from);

        Config {
            database_url,
            port,
            allowed_origins,
            pair_max_attempts,
            connect_timeout,
            import_csv,
        }
    }

    pub fn pair_settings(&self) -> PairSettings {
        PairSettings::with_max_attempts(self.pair_max_attempts)
    }

    /// Parse a CLI flag value like `--port 8080`.
    fn parse_cli_value(args: &[String], flag: &str) -> Option<String> {
        args.windows(2).find_map(|pair| {
            if pair[0] == flag {
                Some(pair[1].clone())
            } else {
                None
            }
        })
    }
}
