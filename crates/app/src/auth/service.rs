//! Auth service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::{Span, debug, info};
use uuid::Uuid;

use crate::{
    auth::{
        Actor, ApiTokenVersion, AuthServiceError, IssuedApiToken, NewApiToken, NewUser,
        TokenHasher, UserRecord, UserUuid, build_verifier_input, format_api_token,
        generate_api_token_secret, parse_api_token, repository::PgAuthRepository,
    },
    database::Db,
};

#[derive(Debug, Clone)]
pub struct PgAuthService {
    db: Db,
    repository: PgAuthRepository,
    hasher: TokenHasher,
}

impl PgAuthService {
    #[must_use]
    pub fn new(db: Db, hasher: TokenHasher) -> Self {
        Self {
            db,
            repository: PgAuthRepository::new(),
            hasher,
        }
    }

    /// Create a user account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthServiceError::AlreadyExists`] when the email is taken.
    #[tracing::instrument(
        name = "auth.service.create_user",
        skip(self, user),
        fields(user_uuid = %user.uuid, role = %user.role),
        err
    )]
    pub async fn create_user(&self, user: NewUser) -> Result<UserRecord, AuthServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.repository.create_user(&mut tx, &user).await?;

        tx.commit().await?;

        info!(user_uuid = %record.uuid, "created user");

        Ok(record)
    }

    /// Look a user up by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserRecord>, AuthServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.repository.find_user_by_email(&mut tx, email).await?;

        tx.commit().await?;

        Ok(record)
    }

    /// Issue a new API token for the given user.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or hashing fails.
    #[tracing::instrument(
        name = "auth.service.issue_api_token",
        skip(self),
        fields(user_uuid = %user, token_uuid = tracing::field::Empty),
        err
    )]
    pub async fn issue_api_token(
        &self,
        user: UserUuid,
        expires_at: Option<Timestamp>,
    ) -> Result<IssuedApiToken, AuthServiceError> {
        let token_uuid = Uuid::now_v7();
        let version = ApiTokenVersion::V1;
        let secret = generate_api_token_secret();
        let token = format_api_token(token_uuid, version, &secret);

        Span::current().record("token_uuid", tracing::field::display(token_uuid));

        let verifier_input = build_verifier_input(&token_uuid, version, &user, &secret);
        let token_hash = self.hasher.hash(&verifier_input)?;

        let mut tx = self.db.begin().await?;

        self.repository.find_user(&mut tx, user).await?;

        let metadata = self
            .repository
            .create_api_token(
                &mut tx,
                &NewApiToken {
                    uuid: token_uuid,
                    user_uuid: user,
                    version,
                    token_hash,
                    expires_at,
                },
            )
            .await?;

        tx.commit().await?;

        info!(token_uuid = %metadata.uuid, "issued api token");

        Ok(IssuedApiToken { token, metadata })
    }

    /// Revoke a token by UUID. Returns `true` if the token was active.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn revoke_api_token(&self, token_uuid: Uuid) -> Result<bool, AuthServiceError> {
        let mut tx = self.db.begin().await?;

        let revoked = self.repository.revoke_api_token(&mut tx, token_uuid).await?;

        tx.commit().await?;

        Ok(revoked.is_some())
    }
}

#[async_trait]
impl AuthService for PgAuthService {
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<Actor, AuthServiceError> {
        let parsed_token =
            parse_api_token(bearer_token).map_err(|_invalid| AuthServiceError::NotFound)?;

        let mut tx = self.db.begin().await?;

        let token = self
            .repository
            .find_active_api_token_by_uuid(&mut tx, parsed_token.token_uuid, parsed_token.version)
            .await?
            .ok_or(AuthServiceError::NotFound)?;

        let verifier_input = build_verifier_input(
            &parsed_token.token_uuid,
            parsed_token.version,
            &token.user_uuid,
            &parsed_token.secret,
        );

        if !self.hasher.verify(&verifier_input, &token.token_hash)? {
            return Err(AuthServiceError::NotFound);
        }

        // Best-effort; a failed touch must not reject a valid token.
        if let Err(error) = self
            .repository
            .touch_api_token_last_used(&mut tx, parsed_token.token_uuid)
            .await
        {
            debug!(%error, "failed to record token use");
        }

        tx.commit().await?;

        Ok(Actor::new(token.user_uuid, token.role))
    }
}

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Resolve a bearer token to the acting user.
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<Actor, AuthServiceError>;
}
