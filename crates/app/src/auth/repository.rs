//! Auth repository.

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::{
    auth::{
        ActiveApiToken, ApiTokenMetadata, ApiTokenVersion, NewApiToken, NewUser, UserRecord,
        UserUuid,
    },
    database::columns::{
        try_get_optional_timestamp, try_get_parsed, try_get_timestamp, try_get_uuid,
    },
};

const CREATE_USER_SQL: &str = include_str!("sql/create_user.sql");
const FIND_USER_SQL: &str = include_str!("sql/find_user.sql");
const FIND_USER_BY_EMAIL_SQL: &str = include_str!("sql/find_user_by_email.sql");
const CREATE_API_TOKEN_SQL: &str = include_str!("sql/create_api_token.sql");
const FIND_ACTIVE_API_TOKEN_SQL: &str = include_str!("sql/find_active_api_token.sql");
const TOUCH_API_TOKEN_LAST_USED_SQL: &str = include_str!("sql/touch_api_token_last_used.sql");
const REVOKE_API_TOKEN_SQL: &str = include_str!("sql/revoke_api_token.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgAuthRepository;

impl PgAuthRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: &NewUser,
    ) -> Result<UserRecord, sqlx::Error> {
        query_as::<Postgres, UserRecord>(CREATE_USER_SQL)
            .bind(user.uuid.into_uuid())
            .bind(&user.email)
            .bind(&user.name)
            .bind(user.role.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<UserRecord, sqlx::Error> {
        query_as::<Postgres, UserRecord>(FIND_USER_SQL)
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_user_by_email(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        email: &str,
    ) -> Result<Option<UserRecord>, sqlx::Error> {
        query_as::<Postgres, UserRecord>(FIND_USER_BY_EMAIL_SQL)
            .bind(email)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn create_api_token(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        token: &NewApiToken,
    ) -> Result<ApiTokenMetadata, sqlx::Error> {
        query_as::<Postgres, ApiTokenMetadata>(CREATE_API_TOKEN_SQL)
            .bind(token.uuid)
            .bind(token.user_uuid.into_uuid())
            .bind(token.version.as_i16())
            .bind(&token.token_hash)
            .bind(token.expires_at.map(SqlxTimestamp::from))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_active_api_token_by_uuid(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        token_uuid: Uuid,
        version: ApiTokenVersion,
    ) -> Result<Option<ActiveApiToken>, sqlx::Error> {
        query_as::<Postgres, ActiveApiToken>(FIND_ACTIVE_API_TOKEN_SQL)
            .bind(token_uuid)
            .bind(version.as_i16())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn touch_api_token_last_used(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        token_uuid: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(TOUCH_API_TOKEN_LAST_USED_SQL)
            .bind(token_uuid)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn revoke_api_token(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        token_uuid: Uuid,
    ) -> Result<Option<Uuid>, sqlx::Error> {
        query_as::<Postgres, (Uuid,)>(REVOKE_API_TOKEN_SQL)
            .bind(token_uuid)
            .fetch_optional(&mut **tx)
            .await
            .map(|row| row.map(|(uuid,)| uuid))
    }
}

fn try_get_version(row: &PgRow) -> Result<ApiTokenVersion, sqlx::Error> {
    let version: i16 = row.try_get("version")?;

    ApiTokenVersion::try_from(version).map_err(|e| sqlx::Error::ColumnDecode {
        index: "version".to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, PgRow> for UserRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: try_get_uuid(row, "uuid")?,
            email: row.try_get("email")?,
            name: row.try_get("name")?,
            role: try_get_parsed(row, "role")?,
            created_at: try_get_timestamp(row, "created_at")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for ApiTokenMetadata {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: row.try_get("uuid")?,
            user_uuid: try_get_uuid(row, "user_uuid")?,
            version: try_get_version(row)?,
            created_at: try_get_timestamp(row, "created_at")?,
            expires_at: try_get_optional_timestamp(row, "expires_at")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for ActiveApiToken {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            user_uuid: try_get_uuid(row, "user_uuid")?,
            role: try_get_parsed(row, "role")?,
            version: try_get_version(row)?,
            token_hash: row.try_get("token_hash")?,
        })
    }
}
