//! Orders service.

use async_trait::async_trait;
use folio::{CouponError, OrderStatus, PricingError, TaxRate, Totals, amounts};
use jiff::{SignedDuration, Timestamp};
use mockall::automock;
use sqlx::{
    Connection, Postgres, Transaction,
    error::{DatabaseError, ErrorKind},
};
use tracing::{Span, debug, info};

use crate::{
    auth::{Actor, Identity, PgAuthRepository, Role, UserUuid},
    database::Db,
    domain::{
        carts::{
            data::CartSummaryItem,
            records::CartOwner,
            repositories::{PgCartItemsRepository, PgCartsRepository},
        },
        coupons::{
            data::COUPON_CODE_MAX_LEN, repository::PgCouponsRepository, service::evaluate_code,
        },
        orders::{
            data::{
                CheckoutReceipt, CheckoutRequest, NOTE_MAX_LEN, NewOrder, OrderFilter, OrderPage,
                OrderStatistics, StatisticsRange, StatusChange, generate_order_number,
            },
            errors::OrdersServiceError,
            records::{EventActor, OrderDetails, OrderEvent, OrderRecord, OrderUuid},
            repositories::{
                OrderScope, PgOrderEventsRepository, PgOrderItemsRepository, PgOrdersRepository,
            },
        },
        payments::repository::PgPaymentsRepository,
    },
};

/// Attempts at drawing an unused order number.
const ORDER_NUMBER_ATTEMPTS: u32 = 5;

const ORDER_NUMBER_CONSTRAINT: &str = "orders_order_number_key";

/// Statuses an assigned editor may move an order into.
const EDITOR_STATUSES: [OrderStatus; 3] = [
    OrderStatus::InProgress,
    OrderStatus::Revisions,
    OrderStatus::Completed,
];

/// Checkout settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutConfig {
    /// ISO 4217 code stamped on new orders.
    pub currency: String,

    /// Flat rate charged on the discounted subtotal.
    pub tax_rate: TaxRate,

    /// First segment of generated order numbers.
    pub order_number_prefix: String,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            tax_rate: TaxRate::ZERO,
            order_number_prefix: "FO".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PgOrdersService {
    db: Db,
    config: CheckoutConfig,
    orders: PgOrdersRepository,
    items: PgOrderItemsRepository,
    events: PgOrderEventsRepository,
    carts: PgCartsRepository,
    cart_items: PgCartItemsRepository,
    coupons: PgCouponsRepository,
    payments: PgPaymentsRepository,
    users: PgAuthRepository,
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db, config: CheckoutConfig) -> Self {
        Self {
            db,
            config,
            orders: PgOrdersRepository::new(),
            items: PgOrderItemsRepository::new(),
            events: PgOrderEventsRepository::new(),
            carts: PgCartsRepository::new(),
            cart_items: PgCartItemsRepository::new(),
            coupons: PgCouponsRepository::new(),
            payments: PgPaymentsRepository::new(),
            users: PgAuthRepository::new(),
        }
    }

    /// Inserts the order under a fresh number, retrying in a savepoint when
    /// the number is already taken.
    async fn create_numbered_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        mut order: NewOrder,
        now: Timestamp,
    ) -> Result<OrderRecord, OrdersServiceError> {
        for attempt in 1..=ORDER_NUMBER_ATTEMPTS {
            order.order_number = generate_order_number(&self.config.order_number_prefix, now);

            let mut savepoint = Connection::begin(&mut **tx).await?;

            match self.orders.create_order(&mut savepoint, &order).await {
                Ok(record) => {
                    savepoint.commit().await?;

                    return Ok(record);
                }
                Err(error) if is_order_number_collision(&error) => {
                    savepoint.rollback().await?;

                    debug!(attempt, order_number = %order.order_number, "order number taken");
                }
                Err(error) => return Err(error.into()),
            }
        }

        Err(OrdersServiceError::OrderNumberExhausted)
    }

    /// Loads an order the caller may see. Hidden orders are not found.
    async fn visible_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        identity: &Identity,
        order: OrderUuid,
        lock: bool,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let record = self.orders.find_order(tx, order, lock).await?;

        if record.is_visible_to(identity) {
            Ok(record)
        } else {
            Err(OrdersServiceError::NotFound)
        }
    }
}

fn is_order_number_collision(error: &sqlx::Error) -> bool {
    error.as_database_error().is_some_and(|db_error| {
        DatabaseError::kind(db_error) == ErrorKind::UniqueViolation
            && db_error.constraint() == Some(ORDER_NUMBER_CONSTRAINT)
    })
}

fn require_admin(actor: &Actor) -> Result<(), OrdersServiceError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(OrdersServiceError::Unauthorized)
    }
}

fn validate_note(note: &str) -> Result<(), OrdersServiceError> {
    if note.trim().is_empty() || note.chars().count() > NOTE_MAX_LEN {
        Err(OrdersServiceError::InvalidData)
    } else {
        Ok(())
    }
}

fn scope_for(identity: &Identity) -> OrderScope {
    match identity {
        Identity::Guest(key) => OrderScope {
            session_key: Some(key.as_str().to_string()),
            ..OrderScope::default()
        },
        Identity::User(actor) => match actor.role {
            Role::Admin => OrderScope::default(),
            Role::Editor => OrderScope {
                editor: Some(actor.user),
                ..OrderScope::default()
            },
            Role::Customer => OrderScope {
                user: Some(actor.user),
                ..OrderScope::default()
            },
        },
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    #[tracing::instrument(
        name = "orders.service.checkout",
        skip(self, identity, request),
        fields(
            payment_method = %request.payment_method,
            cart_uuid = tracing::field::Empty,
            order_uuid = tracing::field::Empty
        ),
        err
    )]
    async fn checkout(
        &self,
        identity: &Identity,
        request: CheckoutRequest,
    ) -> Result<CheckoutReceipt, OrdersServiceError> {
        request.billing_details.validate()?;

        let coupon_code = request
            .coupon_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty());

        if coupon_code.is_some_and(|code| code.chars().count() > COUPON_CODE_MAX_LEN) {
            return Err(OrdersServiceError::InvalidData);
        }

        let owner = CartOwner::from(identity);
        let now = Timestamp::now();
        let span = Span::current();

        let mut tx = self.db.begin().await?;

        // The lock makes a concurrent checkout of the same cart wait, then
        // find it empty.
        let cart = self
            .carts
            .find_cart(&mut tx, &owner, true)
            .await?
            .ok_or(OrdersServiceError::EmptyCart)?;

        span.record("cart_uuid", tracing::field::display(cart.uuid));

        let lines = self.cart_items.list_lines(&mut tx, cart.uuid).await?;

        if lines.is_empty() {
            return Err(OrdersServiceError::EmptyCart);
        }

        if let Some(line) = lines.iter().find(|line| !line.is_available) {
            return Err(OrdersServiceError::VariantUnavailable(line.variant_uuid));
        }

        let items = lines
            .into_iter()
            .map(|line| CartSummaryItem::price(line, now))
            .collect::<Result<Vec<_>, _>>()?;

        let subtotal = amounts::checked_sum(items.iter().map(|item| item.subtotal))?;

        let coupon = match coupon_code {
            Some(code) => {
                let applied = evaluate_code::<OrdersServiceError>(
                    &self.coupons,
                    &mut tx,
                    code,
                    subtotal,
                    now,
                    true,
                )
                .await?;

                if !self.coupons.increment_usage(&mut tx, applied.uuid).await? {
                    return Err(CouponError::Exhausted.into());
                }

                Some(applied)
            }
            None => None,
        };

        let totals = Totals::compute(
            subtotal,
            coupon.as_ref().map_or(0, |applied| applied.discount),
            self.config.tax_rate,
        )?;

        let longest_turnaround = items
            .iter()
            .map(|item| item.turnaround_days)
            .max()
            .unwrap_or(0);

        let estimated_delivery_at = now
            .checked_add(SignedDuration::from_hours(
                i64::from(longest_turnaround) * 24,
            ))
            .map_err(|_overflow| PricingError::EstimateOutOfRange)?;

        let (user_uuid, guest_email, guest_session_key) = match identity {
            Identity::User(actor) => (Some(actor.user), None, None),
            Identity::Guest(key) => (
                None,
                Some(request.billing_details.email.clone()),
                Some(key.as_str().to_string()),
            ),
        };

        let order = self
            .create_numbered_order(
                &mut tx,
                NewOrder {
                    uuid: OrderUuid::new(),
                    order_number: String::new(),
                    user_uuid,
                    guest_email,
                    guest_session_key,
                    totals,
                    currency: self.config.currency.clone(),
                    coupon_uuid: coupon.as_ref().map(|applied| applied.uuid),
                    payment_method: request.payment_method,
                    billing_details: request.billing_details,
                    requirements: request.requirements,
                    estimated_delivery_at: Some(estimated_delivery_at),
                },
                now,
            )
            .await?;

        span.record("order_uuid", tracing::field::display(order.uuid));

        for item in &items {
            self.items.create_item(&mut tx, order.uuid, item).await?;
        }

        self.events
            .append(
                &mut tx,
                order.uuid,
                EventActor::from(identity),
                &OrderEvent::Created {
                    total_amount: order.total_amount,
                },
            )
            .await?;

        self.cart_items.clear_items(&mut tx, cart.uuid).await?;

        tx.commit().await?;

        info!(
            order_uuid = %order.uuid,
            order_number = %order.order_number,
            total_amount = order.total_amount,
            "created order"
        );

        Ok(CheckoutReceipt {
            order_uuid: order.uuid,
            order_number: order.order_number,
            total_amount: order.total_amount,
            currency: order.currency,
            payment_required: true,
        })
    }

    async fn get_order(
        &self,
        identity: &Identity,
        order: OrderUuid,
    ) -> Result<OrderDetails, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let order = self.visible_order(&mut tx, identity, order, false).await?;
        let items = self.items.list_items(&mut tx, order.uuid).await?;
        let events = self.events.list_events(&mut tx, order.uuid).await?;

        tx.commit().await?;

        Ok(OrderDetails {
            order,
            items,
            events,
        })
    }

    async fn list_orders(
        &self,
        identity: &Identity,
        filter: OrderFilter,
    ) -> Result<OrderPage, OrdersServiceError> {
        let scope = scope_for(identity);
        let (limit, offset) = filter.limit_offset();

        let mut tx = self.db.begin().await?;

        let orders = self
            .orders
            .list_orders(&mut tx, &scope, filter.status, limit, offset)
            .await?;

        let total = self.orders.count_orders(&mut tx, &scope, filter.status).await?;

        tx.commit().await?;

        Ok(OrderPage {
            orders,
            total,
            page: filter.page.max(1),
            per_page: u32::try_from(limit).unwrap_or(filter.per_page),
        })
    }

    #[tracing::instrument(
        name = "orders.service.update_status",
        skip(self, change),
        fields(user_uuid = %actor.user, order_uuid = %order, status = %change.status),
        err
    )]
    async fn update_status(
        &self,
        actor: Actor,
        order: OrderUuid,
        change: StatusChange,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let allowed = match actor.role {
            // Paid and refunded also move the governing payment, so they go
            // through reconciliation and `refund`.
            Role::Admin => !matches!(change.status, OrderStatus::Paid | OrderStatus::Refunded),
            Role::Editor => EDITOR_STATUSES.contains(&change.status),
            Role::Customer => false,
        };

        if !allowed {
            return Err(OrdersServiceError::Unauthorized);
        }

        if let Some(note) = &change.note {
            validate_note(note)?;
        }

        let mut tx = self.db.begin().await?;

        let current = self
            .visible_order(&mut tx, &Identity::User(actor), order, true)
            .await?;

        if actor.is_editor() && !current.is_assigned_to(&actor) {
            return Err(OrdersServiceError::NotFound);
        }

        let next = current.status.transition_to(change.status)?;

        let record = self.orders.update_status(&mut tx, order, next).await?;

        self.events
            .append(
                &mut tx,
                order,
                actor.into(),
                &OrderEvent::StatusChanged {
                    from: current.status,
                    to: next,
                    note: change.note,
                },
            )
            .await?;

        tx.commit().await?;

        info!(order_uuid = %order, from = %current.status, to = %next, "changed order status");

        Ok(record)
    }

    #[tracing::instrument(
        name = "orders.service.assign_editor",
        skip(self),
        fields(user_uuid = %actor.user, order_uuid = %order, editor_uuid = %editor),
        err
    )]
    async fn assign_editor(
        &self,
        actor: Actor,
        order: OrderUuid,
        editor: UserUuid,
    ) -> Result<OrderRecord, OrdersServiceError> {
        require_admin(&actor)?;

        let mut tx = self.db.begin().await?;

        self.orders.find_order(&mut tx, order, true).await?;

        let assignee = match self.users.find_user(&mut tx, editor).await {
            Ok(user) => user,
            Err(sqlx::Error::RowNotFound) => return Err(OrdersServiceError::InvalidEditor),
            Err(error) => return Err(error.into()),
        };

        if assignee.role != Role::Editor {
            return Err(OrdersServiceError::InvalidEditor);
        }

        let record = self.orders.assign_editor(&mut tx, order, editor).await?;

        self.events
            .append(
                &mut tx,
                order,
                actor.into(),
                &OrderEvent::EditorAssigned {
                    editor_uuid: editor,
                },
            )
            .await?;

        tx.commit().await?;

        info!(order_uuid = %order, editor_uuid = %editor, "assigned editor");

        Ok(record)
    }

    async fn add_note(
        &self,
        identity: &Identity,
        order: OrderUuid,
        message: String,
    ) -> Result<(), OrdersServiceError> {
        validate_note(&message)?;

        let mut tx = self.db.begin().await?;

        self.visible_order(&mut tx, identity, order, false).await?;

        self.events
            .append(
                &mut tx,
                order,
                EventActor::from(identity),
                &OrderEvent::Note { message },
            )
            .await?;

        tx.commit().await?;

        Ok(())
    }

    #[tracing::instrument(
        name = "orders.service.refund",
        skip(self),
        fields(user_uuid = %actor.user, order_uuid = %order, payment_uuid = tracing::field::Empty),
        err
    )]
    async fn refund(&self, actor: Actor, order: OrderUuid) -> Result<OrderRecord, OrdersServiceError> {
        require_admin(&actor)?;

        let mut tx = self.db.begin().await?;

        let current = self.orders.find_order(&mut tx, order, true).await?;

        let next = current.status.transition_to(OrderStatus::Refunded)?;

        let payment = self
            .payments
            .refund_completed_payment(&mut tx, order)
            .await?
            .ok_or(OrdersServiceError::NoCompletedPayment)?;

        Span::current().record("payment_uuid", tracing::field::display(payment));

        let record = self.orders.update_status(&mut tx, order, next).await?;

        self.events
            .append(
                &mut tx,
                order,
                actor.into(),
                &OrderEvent::Refunded {
                    payment_uuid: payment,
                },
            )
            .await?;

        tx.commit().await?;

        info!(order_uuid = %order, payment_uuid = %payment, "refunded order");

        Ok(record)
    }

    async fn statistics(
        &self,
        actor: Actor,
        range: StatisticsRange,
    ) -> Result<OrderStatistics, OrdersServiceError> {
        require_admin(&actor)?;

        let mut tx = self.db.begin().await?;

        let counts = self.orders.order_counts(&mut tx, range).await?;
        let breakdown = self.orders.status_breakdown(&mut tx, range).await?;

        tx.commit().await?;

        Ok(OrderStatistics::from_counts(counts, breakdown))
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Turns the caller's cart into an order, pricing everything server-side.
    ///
    /// The order, its items, the coupon usage and the emptied cart commit
    /// together or not at all.
    async fn checkout(
        &self,
        identity: &Identity,
        request: CheckoutRequest,
    ) -> Result<CheckoutReceipt, OrdersServiceError>;

    async fn get_order(
        &self,
        identity: &Identity,
        order: OrderUuid,
    ) -> Result<OrderDetails, OrdersServiceError>;

    /// Newest first. Customers and guests see their own orders, editors
    /// their assignments, admins everything.
    async fn list_orders(
        &self,
        identity: &Identity,
        filter: OrderFilter,
    ) -> Result<OrderPage, OrdersServiceError>;

    async fn update_status(
        &self,
        actor: Actor,
        order: OrderUuid,
        change: StatusChange,
    ) -> Result<OrderRecord, OrdersServiceError>;

    async fn assign_editor(
        &self,
        actor: Actor,
        order: OrderUuid,
        editor: UserUuid,
    ) -> Result<OrderRecord, OrdersServiceError>;

    async fn add_note(
        &self,
        identity: &Identity,
        order: OrderUuid,
        message: String,
    ) -> Result<(), OrdersServiceError>;

    /// Records an already-confirmed gateway refund.
    async fn refund(&self, actor: Actor, order: OrderUuid) -> Result<OrderRecord, OrdersServiceError>;

    async fn statistics(
        &self,
        actor: Actor,
        range: StatisticsRange,
    ) -> Result<OrderStatistics, OrdersServiceError>;
}
