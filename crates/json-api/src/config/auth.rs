//! Auth Config

use clap::Args;

/// API token settings.
#[derive(Args)]
pub struct AuthConfig {
    /// Key for API token verifiers
    #[arg(long, env = "TOKEN_HMAC_KEY", hide_env_values = true)]
    pub token_hmac_key: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig").finish_non_exhaustive()
    }
}
