use clap::{Args, Parser, ValueEnum};

/// Tables created by the initial knowledge base migration.
pub const DEFAULT_TABLES: &[&str] = &["facts", "numerical_facts", "craap_scores", "profiles", "comments"];

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    #[command(flatten)]
    pub database: DatabaseConfig,

    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub health: HealthConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,
}

#[derive(Clone, Debug, Args)]
pub struct DatabaseConfig {
    /// Database connection URL
    #[arg(long = "database-url", env = "KBASE_DATABASE_URL")]
    pub url: String,

    /// Service role key, used as the connection password when set
    #[arg(long = "database-service-key", env = "KBASE_DATABASE_SERVICE_KEY", hide_env_values = true)]
    pub service_key: Option<String>,

    /// Maximum number of pooled connections
    #[arg(long = "db-max-connections", env = "KBASE_DB_MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,

    /// Seconds to wait for a pooled connection before giving up
    #[arg(long = "db-acquire-timeout-secs", env = "KBASE_DB_ACQUIRE_TIMEOUT_SECS", default_value_t = 5)]
    pub acquire_timeout_secs: u64,

    /// Seconds an idle connection is kept in the pool
    #[arg(long = "db-idle-timeout-secs", env = "KBASE_DB_IDLE_TIMEOUT_SECS", default_value_t = 300)]
    pub idle_timeout_secs: u64,
}

#[derive(Clone, Debug, Args)]
pub struct ServerConfig {
    /// Host to listen on
    #[arg(long, env = "KBASE_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "KBASE_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Seconds to wait for in-flight requests during shutdown
    #[arg(long, env = "KBASE_SHUTDOWN_TIMEOUT_SECS", default_value_t = 5)]
    pub shutdown_timeout_secs: u64,
}

#[derive(Clone, Debug, Args)]
pub struct HealthConfig {
    /// Comma-separated list of tables the schema probe expects to exist
    #[arg(
        long = "expected-tables",
        env = "KBASE_EXPECTED_TABLES",
        default_value = "facts,numerical_facts,craap_scores,profiles,comments",
        value_delimiter = ','
    )]
    pub expected_tables: Vec<String>,

    /// Table sampled by the connection probe
    #[arg(long = "connection-probe-table", env = "KBASE_CONNECTION_PROBE_TABLE", default_value = "facts")]
    pub connection_probe_table: String,

    /// Deadline for a whole health probe, in milliseconds
    #[arg(long = "health-timeout-ms", env = "KBASE_HEALTH_TIMEOUT_MS", default_value_t = 5000)]
    pub timeout_ms: u64,
}

impl HealthConfig {
    /// Expected tables with blank entries dropped, so `--expected-tables=` means none.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.expected_tables.iter().map(|t| t.trim()).filter(|t| !t.is_empty())
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            expected_tables: DEFAULT_TABLES.iter().map(ToString::to_string).collect(),
            connection_probe_table: "facts".to_string(),
            timeout_ms: 5000,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, Default, Args)]
pub struct TelemetryConfig {
    /// OTLP collector endpoint; traces and metrics are exported only when set
    #[arg(long, env = "KBASE_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,

    /// Log output format
    #[arg(long, env = "KBASE_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Config {
    #[must_use]
    pub fn load() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_minimal_args() {
        let config = Config::try_parse_from(["kbase-server", "--database-url", "postgres://localhost/kb"]).unwrap();

        assert_eq!(config.database.url, "postgres://localhost/kb");
        assert_eq!(config.database.service_key, None);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.health.expected_tables, DEFAULT_TABLES);
        assert_eq!(config.health.connection_probe_table, "facts");
        assert_eq!(config.telemetry.log_format, LogFormat::Text);
    }

    #[test]
    fn test_expected_tables_are_comma_separated() {
        let config = Config::try_parse_from([
            "kbase-server",
            "--database-url",
            "postgres://localhost/kb",
            "--expected-tables",
            "facts,profiles",
        ])
        .unwrap();

        assert_eq!(config.health.expected_tables, vec!["facts", "profiles"]);
    }

    #[test]
    fn test_blank_expected_tables_means_none() {
        let config = Config::try_parse_from([
            "kbase-server",
            "--database-url",
            "postgres://localhost/kb",
            "--expected-tables=",
        ])
        .unwrap();

        assert_eq!(config.health.table_names().collect::<Vec<_>>(), Vec::<&str>::new());
    }

    #[test]
    fn test_table_names_skip_blank_entries() {
        let config = HealthConfig {
            expected_tables: vec!["facts".to_string(), " ".to_string(), " profiles ".to_string(), String::new()],
            ..HealthConfig::default()
        };

        assert_eq!(config.table_names().collect::<Vec<_>>(), vec!["facts", "profiles"]);
    }
}
