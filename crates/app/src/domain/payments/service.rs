//! Payments service.

use std::sync::Arc;

use async_trait::async_trait;
use folio::OrderStatus;
use mockall::automock;
use tracing::{Span, info, warn};

use crate::{
    auth::Identity,
    database::Db,
    domain::{
        orders::{
            records::{EventActor, OrderEvent, OrderUuid},
            repositories::{PgOrderEventsRepository, PgOrdersRepository},
        },
        payments::{
            data::{
                GatewayEventKind, IgnoreReason, IntentOrder, NewPayment, PaymentIntent,
                PaymentStatusView, ReconcileOutcome, WebhookPayload,
            },
            errors::PaymentsServiceError,
            gateways::{GatewayRegistry, PaymentGateway},
            records::{Gateway, PaymentStatus, PaymentUuid},
            repository::PgPaymentsRepository,
        },
    },
};

#[derive(Debug, Clone)]
pub struct PgPaymentsService {
    db: Db,
    gateways: GatewayRegistry,
    payments: PgPaymentsRepository,
    orders: PgOrdersRepository,
    events: PgOrderEventsRepository,
}

impl PgPaymentsService {
    #[must_use]
    pub fn new(db: Db, gateways: GatewayRegistry) -> Self {
        Self {
            db,
            gateways,
            payments: PgPaymentsRepository::new(),
            orders: PgOrdersRepository::new(),
            events: PgOrderEventsRepository::new(),
        }
    }

    fn adapter(&self, gateway: Gateway) -> Result<Arc<dyn PaymentGateway>, PaymentsServiceError> {
        self.gateways
            .get(gateway)
            .ok_or(PaymentsServiceError::GatewayNotConfigured(gateway))
    }
}

#[async_trait]
impl PaymentsService for PgPaymentsService {
    #[tracing::instrument(
        name = "payments.service.create_intent",
        skip(self, identity),
        fields(gateway = %gateway, order_uuid = %order, payment_uuid = tracing::field::Empty),
        err
    )]
    async fn create_intent(
        &self,
        identity: &Identity,
        gateway: Gateway,
        order: OrderUuid,
    ) -> Result<PaymentIntent, PaymentsServiceError> {
        let adapter = self.adapter(gateway)?;

        let mut tx = self.db.begin().await?;

        let record = self.orders.find_order(&mut tx, order, false).await?;

        if !record.is_owned_by(identity) {
            return Err(PaymentsServiceError::NotFound);
        }

        if self.payments.has_completed_payment(&mut tx, order).await? {
            return Err(PaymentsServiceError::AlreadyPaid);
        }

        if record.status != OrderStatus::Created {
            return Err(PaymentsServiceError::InvalidState(record.status));
        }

        tx.commit().await?;

        // No transaction is held across the gateway call.
        let intent = adapter
            .create_intent(&IntentOrder {
                order_uuid: record.uuid,
                order_number: record.order_number.clone(),
                amount: record.total_amount,
                currency: record.currency.clone(),
                email: Some(record.billing_details.email.clone()),
            })
            .await?;

        let mut tx = self.db.begin().await?;

        let current = self.orders.find_order(&mut tx, order, true).await?;

        if current.status != OrderStatus::Created {
            return Err(PaymentsServiceError::InvalidState(current.status));
        }

        let payment = self
            .payments
            .create_payment(
                &mut tx,
                &NewPayment {
                    uuid: PaymentUuid::new(),
                    order_uuid: order,
                    gateway,
                    gateway_payment_id: intent.gateway_payment_id,
                    amount: current.total_amount,
                    currency: current.currency,
                    raw_response: Some(intent.raw),
                },
            )
            .await?;

        tx.commit().await?;

        Span::current().record("payment_uuid", tracing::field::display(payment.uuid));

        info!(
            payment_uuid = %payment.uuid,
            gateway_payment_id = %payment.gateway_payment_id,
            "created payment intent"
        );

        Ok(PaymentIntent {
            payment_uuid: payment.uuid,
            gateway,
            connection: intent.connection,
        })
    }

    #[tracing::instrument(
        name = "payments.service.reconcile",
        skip(self, payload),
        fields(
            gateway = %gateway,
            gateway_payment_id = tracing::field::Empty,
            outcome = tracing::field::Empty
        ),
        err
    )]
    async fn reconcile(
        &self,
        gateway: Gateway,
        payload: WebhookPayload,
    ) -> Result<ReconcileOutcome, PaymentsServiceError> {
        let adapter = self.adapter(gateway)?;
        let span = Span::current();

        let event = adapter.verify_and_parse(&payload).await?;

        let (target, failure_reason) = match &event.kind {
            GatewayEventKind::PaymentCompleted => (PaymentStatus::Completed, None),
            GatewayEventKind::PaymentFailed { reason } => {
                (PaymentStatus::Failed, reason.as_deref())
            }
            GatewayEventKind::Unknown { event_type } => {
                info!(%event_type, "ignored webhook event");

                let outcome = ReconcileOutcome::Ignored(IgnoreReason::UnknownEvent);
                span.record("outcome", outcome.as_str());

                return Ok(outcome);
            }
        };

        let Some(gateway_payment_id) = event.gateway_payment_id.as_deref() else {
            return Ok(ReconcileOutcome::Ignored(IgnoreReason::UnknownPayment));
        };

        span.record("gateway_payment_id", gateway_payment_id);

        let mut tx = self.db.begin().await?;

        let Some(payment) = self
            .payments
            .lock_by_gateway_id(&mut tx, gateway, gateway_payment_id)
            .await?
        else {
            info!("ignored webhook for unknown payment");

            let outcome = ReconcileOutcome::Ignored(IgnoreReason::UnknownPayment);
            span.record("outcome", outcome.as_str());

            return Ok(outcome);
        };

        if payment.status == target {
            let outcome = ReconcileOutcome::Duplicate {
                payment_uuid: payment.uuid,
            };
            span.record("outcome", outcome.as_str());

            return Ok(outcome);
        }

        // A settled payment never moves backwards.
        if matches!(
            payment.status,
            PaymentStatus::Completed | PaymentStatus::Refunded
        ) {
            info!(payment_uuid = %payment.uuid, status = %payment.status, "ignored stale webhook");

            let outcome = ReconcileOutcome::Ignored(IgnoreReason::Stale);
            span.record("outcome", outcome.as_str());

            return Ok(outcome);
        }

        self.payments
            .update_status(&mut tx, payment.uuid, target, failure_reason, &event.raw)
            .await?;

        let order = self.orders.find_order(&mut tx, payment.order_uuid, true).await?;

        if target == PaymentStatus::Completed {
            if order.status == OrderStatus::Created {
                let next = order.status.transition_to(OrderStatus::Paid)?;

                self.orders.update_status(&mut tx, order.uuid, next).await?;

                self.events
                    .append(
                        &mut tx,
                        order.uuid,
                        EventActor::System,
                        &OrderEvent::PaymentCompleted {
                            payment_uuid: payment.uuid,
                            gateway,
                        },
                    )
                    .await?;
            } else {
                warn!(
                    payment_uuid = %payment.uuid,
                    order_uuid = %order.uuid,
                    order_status = %order.status,
                    "payment completed for an order not awaiting payment; refund manually"
                );
            }
        } else {
            self.events
                .append(
                    &mut tx,
                    order.uuid,
                    EventActor::System,
                    &OrderEvent::PaymentFailed {
                        payment_uuid: payment.uuid,
                        reason: failure_reason.map(str::to_string),
                    },
                )
                .await?;
        }

        tx.commit().await?;

        let outcome = ReconcileOutcome::Applied {
            payment_uuid: payment.uuid,
        };

        span.record("outcome", outcome.as_str());

        info!(
            payment_uuid = %payment.uuid,
            order_uuid = %order.uuid,
            status = %target,
            "reconciled payment"
        );

        Ok(outcome)
    }

    async fn payment_status(
        &self,
        identity: &Identity,
        payment: PaymentUuid,
    ) -> Result<PaymentStatusView, PaymentsServiceError> {
        let mut tx = self.db.begin().await?;

        let payment = self.payments.find_payment(&mut tx, payment).await?;
        let order = self
            .orders
            .find_order(&mut tx, payment.order_uuid, false)
            .await?;

        tx.commit().await?;

        if !order.is_visible_to(identity) {
            return Err(PaymentsServiceError::NotFound);
        }

        Ok(PaymentStatusView {
            payment,
            order_number: order.order_number,
            order_status: order.status,
        })
    }
}

#[automock]
#[async_trait]
pub trait PaymentsService: Send + Sync {
    /// Opens a gateway payment for an unpaid order owned by the caller.
    async fn create_intent(
        &self,
        identity: &Identity,
        gateway: Gateway,
        order: OrderUuid,
    ) -> Result<PaymentIntent, PaymentsServiceError>;

    /// Applies a webhook. Safe to call any number of times for the same event.
    async fn reconcile(
        &self,
        gateway: Gateway,
        payload: WebhookPayload,
    ) -> Result<ReconcileOutcome, PaymentsServiceError>;

    async fn payment_status(
        &self,
        identity: &Identity,
        payment: PaymentUuid,
    ) -> Result<PaymentStatusView, PaymentsServiceError>;
}
