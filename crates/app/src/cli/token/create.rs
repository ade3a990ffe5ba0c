use clap::Args;
use jiff::Timestamp;

use crate::cli::AuthArgs;

#[derive(Debug, Args)]
pub(crate) struct CreateTokenArgs {
    #[command(flatten)]
    auth: AuthArgs,

    /// Email of the user that should own the token
    #[arg(long)]
    email: String,

    /// Optional token expiration timestamp (RFC 3339)
    #[arg(long)]
    expires_at: Option<String>,
}

pub(crate) async fn run(args: CreateTokenArgs) -> Result<(), String> {
    let expires_at = parse_expires_at(args.expires_at.as_deref())?;

    if let Some(expires_at) = expires_at.as_ref()
        && *expires_at <= Timestamp::now()
    {
        return Err("expires-at must be in the future".to_string());
    }

    let service = args.auth.service().await?;

    let user = service
        .find_user_by_email(args.email.trim())
        .await
        .map_err(|error| format!("failed to look up user: {error}"))?
        .ok_or_else(|| format!("no user with email {}", args.email.trim()))?;

    let issued = service
        .issue_api_token(user.uuid, expires_at)
        .await
        .map_err(|error| format!("failed to create token: {error}"))?;

    println!("token_uuid: {}", issued.metadata.uuid);
    println!("user_uuid: {}", issued.metadata.user_uuid);
    println!("token_version: {}", issued.metadata.version.as_i16());
    println!("token_created_at: {}", issued.metadata.created_at);
    if let Some(expires_at) = issued.metadata.expires_at {
        println!("token_expires_at: {expires_at}");
    }
    println!("api_token: {}", issued.token);
    println!("store this token now; it is only shown once");

    Ok(())
}

fn parse_expires_at(raw: Option<&str>) -> Result<Option<Timestamp>, String> {
    raw.map(|value| {
        value
            .parse::<Timestamp>()
            .map_err(|error| format!("invalid expires-at timestamp: {error}"))
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_is_optional_rfc3339() {
        assert_eq!(parse_expires_at(None), Ok(None));
        assert!(matches!(parse_expires_at(Some("2030-01-01T00:00:00Z")), Ok(Some(_))));
        assert!(parse_expires_at(Some("next tuesday")).is_err());
    }
}
