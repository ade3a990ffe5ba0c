use clap::Args;
use folio_app::auth::{NewUser, Role, UserUuid};

use crate::cli::AuthArgs;

#[derive(Debug, Args)]
pub(crate) struct CreateUserArgs {
    #[command(flatten)]
    auth: AuthArgs,

    /// Login email, unique across users
    #[arg(long)]
    email: String,

    /// Display name
    #[arg(long)]
    name: String,

    /// customer, editor or admin
    #[arg(long, default_value = "customer")]
    role: Role,

    /// Skip issuing an API token for the new user
    #[arg(long)]
    no_token: bool,
}

pub(crate) async fn run(args: CreateUserArgs) -> Result<(), String> {
    let email = args.email.trim().to_lowercase();

    if email.is_empty() || !email.contains('@') {
        return Err("email must be an address".to_string());
    }

    if args.name.trim().is_empty() {
        return Err("name cannot be empty".to_string());
    }

    let service = args.auth.service().await?;

    let user = service
        .create_user(NewUser {
            uuid: UserUuid::new(),
            email,
            name: args.name.trim().to_string(),
            role: args.role,
        })
        .await
        .map_err(|error| format!("failed to create user: {error}"))?;

    println!("user_uuid: {}", user.uuid);
    println!("user_email: {}", user.email);
    println!("user_role: {}", user.role);

    if args.no_token {
        return Ok(());
    }

    let issued = service
        .issue_api_token(user.uuid, None)
        .await
        .map_err(|error| format!("failed to issue token: {error}"))?;

    println!("token_uuid: {}", issued.metadata.uuid);
    println!("api_token: {}", issued.token);
    println!("store this token now; it is only shown once");

    Ok(())
}
