//! Per-test databases inside one shared `PostgreSQL` container.

use once_cell::sync::Lazy;
use sqlx::{Connection, PgConnection, PgPool, Postgres, Transaction};
use testcontainers::{ContainerAsync, ImageExt, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres as PostgresImage;
use tokio::sync::{OnceCell, mpsc};

const DB_USER: &str = "folio_test";
const DB_PASSWORD: &str = "folio_test_password";

/// Accepts `[A-Za-z_][A-Za-z0-9_$]{0,62}`; names are interpolated into DDL.
fn validate_database_name(name: &str) -> Result<(), String> {
    if name.is_empty() || name.len() > 63 {
        return Err("database name must be 1-63 characters long".to_string());
    }

    if !name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
        return Err("database name must start with a letter or underscore".to_string());
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
    {
        return Err("database name may only contain letters, digits, `_` and `$`".to_string());
    }

    Ok(())
}

async fn init_postgres_container() -> ContainerAsync<PostgresImage> {
    PostgresImage::default()
        .with_user(DB_USER)
        .with_password(DB_PASSWORD)
        .with_db_name("folio_test")
        .with_env_var("POSTGRES_INITDB_ARGS", "--auth-host=trust")
        .start()
        .await
        .expect("failed to start PostgreSQL container")
}

static POSTGRES_CONTAINER: Lazy<OnceCell<ContainerAsync<PostgresImage>>> = Lazy::new(OnceCell::new);

/// Names of databases waiting to be dropped.
static CLEANUP_SENDER: Lazy<OnceCell<mpsc::UnboundedSender<String>>> = Lazy::new(OnceCell::new);

async fn init_cleanup_task() -> mpsc::UnboundedSender<String> {
    let (sender, mut receiver) = mpsc::unbounded_channel::<String>();

    tokio::spawn(async move {
        while let Some(db_name) = receiver.recv().await {
            if let Err(error) = drop_database(&db_name).await {
                eprintln!("failed to drop test database '{db_name}': {error}");
            }
        }
    });

    sender
}

async fn server_url(database: &str) -> String {
    let container = POSTGRES_CONTAINER
        .get_or_init(init_postgres_container)
        .await;

    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("failed to get container port");

    let host =
        std::env::var("TESTCONTAINERS_HOST_OVERRIDE").unwrap_or_else(|_| "localhost".to_string());

    format!("postgresql://{DB_USER}:{DB_PASSWORD}@{host}:{port}/{database}")
}

async fn drop_database(db_name: &str) -> Result<(), sqlx::Error> {
    if POSTGRES_CONTAINER.get().is_none() || validate_database_name(db_name).is_err() {
        return Ok(());
    }

    let mut conn = PgConnection::connect(&server_url("postgres").await).await?;

    sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&mut conn)
        .await?;

    conn.close().await
}

/// A freshly migrated database, dropped in the background once the value
/// goes out of scope.
///
/// Services commit normally; isolation comes from every test owning its
/// own database rather than from rollback.
#[derive(Debug, Clone)]
pub struct TestDb {
    pub pool: PgPool,
    pub name: String,
}

impl Drop for TestDb {
    fn drop(&mut self) {
        if let Some(sender) = CLEANUP_SENDER.get() {
            let _ = sender.send(self.name.clone());
        }
    }
}

impl TestDb {
    pub async fn new() -> Self {
        let name = format!("folio_test_{}", uuid::Uuid::now_v7().simple());

        Self::new_with_db_name(&name).await
    }

    pub async fn new_with_db_name(db_name: &str) -> Self {
        CLEANUP_SENDER.get_or_init(init_cleanup_task).await;

        if let Err(error) = validate_database_name(db_name) {
            panic!("invalid database name '{db_name}': {error}");
        }

        let mut conn = PgConnection::connect(&server_url("postgres").await)
            .await
            .expect("failed to connect to postgres database");

        sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
            .execute(&mut conn)
            .await
            .expect("failed to create test database");

        conn.close()
            .await
            .expect("failed to close admin connection");

        let pool = PgPool::connect(&server_url(db_name).await)
            .await
            .expect("failed to connect to test database");

        crate::database::migrate(&pool)
            .await
            .expect("failed to run migrations");

        Self {
            pool,
            name: db_name.to_string(),
        }
    }

    /// Rolls back when dropped; for inspecting uncommitted repository state.
    pub async fn begin_test_transaction(&self) -> Transaction<'_, Postgres> {
        self.pool
            .begin()
            .await
            .expect("failed to start test transaction")
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_names_are_validated() {
        assert!(validate_database_name("folio_test_1").is_ok());
        assert!(validate_database_name("_leading").is_ok());
        assert!(validate_database_name("db$dollar").is_ok());

        assert!(validate_database_name("").is_err());
        assert!(validate_database_name(&"a".repeat(64)).is_err());
        assert!(validate_database_name("1starts_with_digit").is_err());
        assert!(validate_database_name("has-hyphen").is_err());
        assert!(validate_database_name("quote\"d").is_err());
    }

    #[tokio::test]
    async fn migrations_apply_to_a_fresh_database() {
        let test_db = TestDb::new().await;

        let tables: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM information_schema.tables \
             WHERE table_schema = 'public' AND table_name IN ('users', 'orders', 'payments', 'files')",
        )
        .fetch_one(test_db.pool())
        .await
        .expect("failed to count tables");

        assert_eq!(tables, 4);
    }

    #[tokio::test]
    async fn uncommitted_work_is_invisible_to_other_transactions() {
        let test_db = TestDb::new().await;

        let mut tx1 = test_db.begin_test_transaction().await;

        sqlx::query("CREATE TABLE scratch (id INTEGER)")
            .execute(&mut *tx1)
            .await
            .expect("failed to create table");

        let mut tx2 = test_db.begin_test_transaction().await;

        let result = sqlx::query("SELECT COUNT(*) FROM scratch")
            .fetch_one(&mut *tx2)
            .await;

        assert!(result.is_err());
    }
}
