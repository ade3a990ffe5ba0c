//! Order Events Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, types::Json};

use crate::{
    auth::UserUuid,
    database::columns::{try_get_optional_uuid, try_get_timestamp, try_get_uuid},
    domain::orders::records::{
        EventActor, OrderEvent, OrderEventRecord, OrderEventUuid, OrderUuid,
    },
};

const APPEND_ORDER_EVENT_SQL: &str = include_str!("../sql/append_order_event.sql");
const LIST_ORDER_EVENTS_SQL: &str = include_str!("../sql/list_order_events.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrderEventsRepository;

impl PgOrderEventsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn append(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        actor: EventActor,
        event: &OrderEvent,
    ) -> Result<(), sqlx::Error> {
        query(APPEND_ORDER_EVENT_SQL)
            .bind(OrderEventUuid::new().into_uuid())
            .bind(order.into_uuid())
            .bind(actor.user_uuid().map(UserUuid::into_uuid))
            .bind(actor.as_str())
            .bind(Json(event))
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Oldest first.
    pub(crate) async fn list_events(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Vec<OrderEventRecord>, sqlx::Error> {
        query_as::<Postgres, OrderEventRecord>(LIST_ORDER_EVENTS_SQL)
            .bind(order.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }
}

fn try_get_actor(row: &PgRow) -> Result<EventActor, sqlx::Error> {
    let kind: String = row.try_get("actor_kind")?;
    let user: Option<UserUuid> = try_get_optional_uuid(row, "actor_uuid")?;

    match (kind.as_str(), user) {
        ("user", Some(user)) => Ok(EventActor::User(user)),
        ("guest", _) => Ok(EventActor::Guest),
        // A deleted user leaves the event without an actor.
        ("user" | "system", _) => Ok(EventActor::System),
        (other, _) => Err(sqlx::Error::ColumnDecode {
            index: "actor_kind".to_string(),
            source: format!("unknown actor kind {other}").into(),
        }),
    }
}

impl<'r> FromRow<'r, PgRow> for OrderEventRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let event: Json<OrderEvent> = row.try_get("event")?;

        Ok(Self {
            uuid: try_get_uuid(row, "uuid")?,
            actor: try_get_actor(row)?,
            event: event.0,
            created_at: try_get_timestamp(row, "created_at")?,
        })
    }
}
