//! Server configuration module

use clap::Parser;
use folio_app::context::AppConfig;
use zeroize::Zeroizing;

use crate::config::{
    auth::AuthConfig,
    checkout::CheckoutSettings,
    db::DatabaseConfig,
    files::FilesConfig,
    gateways::GatewaysSettings,
    observability::{LoggingConfig, ObservabilityConfig},
    server::ServerRuntimeConfig,
};

pub(crate) mod auth;
pub(crate) mod checkout;
pub(crate) mod db;
pub(crate) mod files;
pub(crate) mod gateways;
pub(crate) mod observability;
pub(crate) mod server;

/// Folio JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "folio-json", about = "Folio JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Observability (traces/metrics) settings.
    #[command(flatten)]
    pub observability: ObservabilityConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// API token settings.
    #[command(flatten)]
    pub auth: AuthConfig,

    /// Order and checkout settings.
    #[command(flatten)]
    pub checkout: CheckoutSettings,

    /// Payment gateway credentials.
    #[command(flatten)]
    pub gateways: GatewaysSettings,

    /// Uploaded file storage.
    #[command(flatten)]
    pub files: FilesConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }

    /// Settings the app context is built from.
    #[must_use]
    pub fn app_config(&self) -> AppConfig {
        AppConfig {
            database_url: self.database.database_url.clone(),
            database: self.database.options(),
            run_migrations: self.database.run_migrations,
            token_key: Zeroizing::new(self.auth.token_hmac_key.as_bytes().to_vec()),
            checkout: self.checkout.checkout_config(),
            gateways: self.gateways.gateways_config(),
            storage_root: self.files.files_storage_root.clone(),
        }
    }
}
