//! App Context

use std::{path::PathBuf, sync::Arc};

use thiserror::Error;
use tracing::info;
use zeroize::Zeroizing;

use crate::{
    auth::{ApiTokenError, AuthService, PgAuthService, TokenHasher},
    database::{self, DatabaseOptions, Db},
    domain::{
        carts::{CartsService, PgCartsService},
        catalog::{CatalogService, PgCatalogService},
        coupons::{CouponsService, PgCouponsService},
        files::{FilesService, PgFilesService, blob::LocalBlobStore},
        orders::{CheckoutConfig, OrdersService, PgOrdersService},
        payments::{
            PaymentsService, PgPaymentsService,
            gateways::{GatewayError, GatewayRegistry, GatewaysConfig},
        },
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply migrations")]
    Migrate(#[source] sqlx::migrate::MigrateError),

    #[error("invalid token key")]
    TokenKey(#[source] ApiTokenError),

    #[error("failed to build payment gateways")]
    Gateway(#[source] GatewayError),
}

/// Everything needed to build an [`AppContext`].
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database: DatabaseOptions,
    pub run_migrations: bool,
    pub token_key: Zeroizing<Vec<u8>>,
    pub checkout: CheckoutConfig,
    pub gateways: GatewaysConfig,
    pub storage_root: PathBuf,
}

#[derive(Clone)]
pub struct AppContext {
    pub auth: Arc<dyn AuthService>,
    pub catalog: Arc<dyn CatalogService>,
    pub carts: Arc<dyn CartsService>,
    pub coupons: Arc<dyn CouponsService>,
    pub orders: Arc<dyn OrdersService>,
    pub payments: Arc<dyn PaymentsService>,
    pub files: Arc<dyn FilesService>,
}

impl AppContext {
    /// Connect to the database and wire every service.
    ///
    /// # Errors
    ///
    /// Returns an error when connecting, migrating, or building a
    /// configured gateway client fails.
    pub async fn from_config(config: AppConfig) -> Result<Self, AppInitError> {
        let pool = database::connect_with(&config.database_url, &config.database)
            .await
            .map_err(AppInitError::Database)?;

        if config.run_migrations {
            database::migrate(&pool)
                .await
                .map_err(AppInitError::Migrate)?;
        }

        let db = Db::new(pool).with_statement_timeout(config.database.statement_timeout);

        let hasher = TokenHasher::new(&config.token_key).map_err(AppInitError::TokenKey)?;
        let gateways =
            GatewayRegistry::from_config(config.gateways).map_err(AppInitError::Gateway)?;

        info!(gateways = ?gateways.configured(), "payment gateways ready");

        Ok(Self {
            auth: Arc::new(PgAuthService::new(db.clone(), hasher)),
            catalog: Arc::new(PgCatalogService::new(db.clone())),
            carts: Arc::new(PgCartsService::new(db.clone(), config.checkout.tax_rate)),
            coupons: Arc::new(PgCouponsService::new(db.clone())),
            orders: Arc::new(PgOrdersService::new(db.clone(), config.checkout)),
            payments: Arc::new(PgPaymentsService::new(db.clone(), gateways)),
            files: Arc::new(PgFilesService::new(
                db,
                Arc::new(LocalBlobStore::new(config.storage_root)),
            )),
        })
    }
}
