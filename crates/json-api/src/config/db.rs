//! Database Config

use std::time::Duration;

use clap::Args;
use folio_app::database::DatabaseOptions;

/// Database settings.
#[derive(Debug, Args)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: String,

    /// Maximum pooled connections
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 10_u32)]
    pub database_max_connections: u32,

    /// Per-statement timeout in milliseconds, 0 disables it
    #[arg(long, env = "DATABASE_STATEMENT_TIMEOUT_MS", default_value_t = 10_000_u64)]
    pub database_statement_timeout_ms: u64,

    /// Apply pending migrations on startup
    #[arg(long, env = "DATABASE_RUN_MIGRATIONS", default_value_t = false)]
    pub run_migrations: bool,
}

impl DatabaseConfig {
    pub(crate) fn options(&self) -> DatabaseOptions {
        DatabaseOptions {
            max_connections: self.database_max_connections,
            statement_timeout: (self.database_statement_timeout_ms > 0)
                .then(|| Duration::from_millis(self.database_statement_timeout_ms)),
            ..DatabaseOptions::default()
        }
    }
}
