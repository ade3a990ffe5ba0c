//! Carts Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::{
    auth::UserUuid,
    database::columns::{try_get_optional_uuid, try_get_timestamp, try_get_uuid},
    domain::carts::records::{CartOwner, CartRecord, CartUuid},
};

const FIND_CART_SQL: &str = include_str!("../sql/find_cart.sql");
const LOCK_CART_SQL: &str = include_str!("../sql/lock_cart.sql");
const CREATE_CART_SQL: &str = include_str!("../sql/create_cart.sql");
const TOUCH_CART_SQL: &str = include_str!("../sql/touch_cart.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartsRepository;

impl PgCartsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// The owner's cart, if one exists. With `lock` set the row is held
    /// `FOR UPDATE` until the transaction ends.
    pub(crate) async fn find_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: &CartOwner,
        lock: bool,
    ) -> Result<Option<CartRecord>, sqlx::Error> {
        let sql = if lock { LOCK_CART_SQL } else { FIND_CART_SQL };

        query_as::<Postgres, CartRecord>(sql)
            .bind(owner.user_uuid().map(UserUuid::into_uuid))
            .bind(owner.session_key())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Resolve the owner's cart, creating it when missing.
    ///
    /// A concurrent creator wins the unique constraint; the insert then
    /// returns nothing and the committed row is read back.
    pub(crate) async fn find_or_create_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: &CartOwner,
    ) -> Result<CartRecord, sqlx::Error> {
        if let Some(cart) = self.find_cart(tx, owner, false).await? {
            return Ok(cart);
        }

        let created = query_as::<Postgres, CartRecord>(CREATE_CART_SQL)
            .bind(CartUuid::new().into_uuid())
            .bind(owner.user_uuid().map(UserUuid::into_uuid))
            .bind(owner.session_key())
            .fetch_optional(&mut **tx)
            .await?;

        match created {
            Some(cart) => Ok(cart),
            None => self
                .find_cart(tx, owner, false)
                .await?
                .ok_or(sqlx::Error::RowNotFound),
        }
    }

    pub(crate) async fn touch_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<(), sqlx::Error> {
        query(TOUCH_CART_SQL)
            .bind(cart.into_uuid())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}

impl<'r> FromRow<'r, PgRow> for CartRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let user_uuid: Option<UserUuid> = try_get_optional_uuid(row, "user_uuid")?;
        let session_key: Option<String> = row.try_get("session_key")?;

        let owner = match (user_uuid, session_key) {
            (Some(user), _) => CartOwner::User(user),
            (None, Some(key)) => CartOwner::Session(key),
            (None, None) => {
                return Err(sqlx::Error::ColumnDecode {
                    index: "user_uuid".to_string(),
                    source: "cart has no owner".into(),
                });
            }
        };

        Ok(Self {
            uuid: try_get_uuid(row, "uuid")?,
            owner,
            created_at: try_get_timestamp(row, "created_at")?,
        })
    }
}
