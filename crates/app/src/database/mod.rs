//! Database connection management

use std::time::Duration;

use sqlx::{
    PgPool, Postgres, Transaction, migrate::MigrateError, postgres::PgPoolOptions, query,
};

pub(crate) mod columns;

/// SQL used to bound every statement in a transaction.
pub const SET_STATEMENT_TIMEOUT_SQL: &str =
    "SELECT set_config('statement_timeout', $1, true)";

/// Pool settings.
#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    /// Maximum pooled connections.
    pub max_connections: u32,

    /// How long to wait for a free connection.
    pub acquire_timeout: Duration,

    /// Per-statement timeout applied to service transactions.
    pub statement_timeout: Option<Duration>,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout: Duration::from_secs(5),
            statement_timeout: Some(Duration::from_secs(10)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
    statement_timeout: Option<Duration>,
}

impl Db {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            statement_timeout: None,
        }
    }

    #[must_use]
    pub fn with_statement_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.statement_timeout = timeout;
        self
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Begin a transaction with the configured statement timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when starting the transaction or applying the timeout fails.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        if let Some(timeout) = self.statement_timeout {
            query(SET_STATEMENT_TIMEOUT_SQL)
                .bind(format!("{}ms", timeout.as_millis()))
                .execute(&mut *tx)
                .await?;
        }

        Ok(tx)
    }
}

/// Connect to `PostgreSQL`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPool::connect(database_url).await
}

/// Connect to `PostgreSQL` with explicit pool settings.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect_with(
    database_url: &str,
    options: &DatabaseOptions,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(options.max_connections)
        .acquire_timeout(options.acquire_timeout)
        .connect(database_url)
        .await
}

/// Apply pending migrations.
///
/// # Errors
///
/// Returns an error if a migration fails to apply.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}
