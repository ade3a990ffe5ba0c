use clap::{Args, Parser, Subcommand};
use folio_app::{
    auth::{PgAuthService, TokenHasher},
    database::{self, Db},
};

mod coupon;
mod db;
mod token;
mod user;

#[derive(Debug, Parser)]
#[command(name = "folio-app", about = "Folio CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    User(user::UserCommand),
    Token(token::TokenCommand),
    Coupon(coupon::CouponCommand),
    Db(db::DbCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::User(command) => user::run(command).await,
            Commands::Token(command) => token::run(command).await,
            Commands::Coupon(command) => coupon::run(command).await,
            Commands::Db(command) => db::run(command).await,
        }
    }
}

#[derive(Debug, Args)]
pub(crate) struct DatabaseArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

impl DatabaseArgs {
    pub(crate) async fn connect(&self) -> Result<Db, String> {
        database::connect(&self.database_url)
            .await
            .map(Db::new)
            .map_err(|error| format!("failed to connect to database: {error}"))
    }
}

#[derive(Debug, Args)]
pub(crate) struct AuthArgs {
    #[command(flatten)]
    database: DatabaseArgs,

    /// Key for API token verifiers
    #[arg(long, env = "TOKEN_HMAC_KEY", hide_env_values = true)]
    token_hmac_key: String,
}

impl AuthArgs {
    pub(crate) fn database(&self) -> &DatabaseArgs {
        &self.database
    }

    pub(crate) fn hasher(&self) -> Result<TokenHasher, String> {
        TokenHasher::new(self.token_hmac_key.as_bytes())
            .map_err(|error| format!("invalid token key: {error}"))
    }

    pub(crate) async fn service(&self) -> Result<PgAuthService, String> {
        let hasher = self.hasher()?;

        Ok(PgAuthService::new(self.database.connect().await?, hasher))
    }
}
