//! Order Records

use folio::OrderStatus;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    auth::{Actor, Identity, UserUuid},
    domain::{
        carts::records::CartItemMeta,
        catalog::records::VariantUuid,
        coupons::records::CouponUuid,
        orders::data::BillingDetails,
        payments::records::{Gateway, PaymentUuid},
    },
    uuids::TypedUuid,
};

/// Order UUID
pub type OrderUuid = TypedUuid<OrderRecord>;

/// Order Item UUID
pub type OrderItemUuid = TypedUuid<OrderItemRecord>;

/// Order Event UUID
pub type OrderEventUuid = TypedUuid<OrderEventRecord>;

/// Order Record
#[derive(Debug, Clone, Serialize)]
pub struct OrderRecord {
    pub uuid: OrderUuid,
    pub order_number: String,
    pub user_uuid: Option<UserUuid>,
    pub guest_email: Option<String>,

    #[serde(skip)]
    pub guest_session_key: Option<String>,

    pub status: OrderStatus,
    pub subtotal: u64,
    pub tax_amount: u64,
    pub discount_amount: u64,
    pub total_amount: u64,
    pub currency: String,
    pub coupon_uuid: Option<CouponUuid>,
    pub payment_method: Gateway,
    pub billing_details: BillingDetails,
    pub requirements: Option<Value>,
    pub assigned_editor_uuid: Option<UserUuid>,
    pub estimated_delivery_at: Option<Timestamp>,
    pub delivered_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl OrderRecord {
    /// Whether `identity` placed this order.
    #[must_use]
    pub fn is_owned_by(&self, identity: &Identity) -> bool {
        match identity {
            Identity::User(actor) => self.user_uuid == Some(actor.user),
            Identity::Guest(key) => self.guest_session_key.as_deref() == Some(key.as_str()),
        }
    }

    #[must_use]
    pub fn is_assigned_to(&self, actor: &Actor) -> bool {
        actor.is_editor() && self.assigned_editor_uuid == Some(actor.user)
    }

    /// Owner, admin or assigned editor.
    #[must_use]
    pub fn is_visible_to(&self, identity: &Identity) -> bool {
        if self.is_owned_by(identity) {
            return true;
        }

        match identity {
            Identity::User(actor) => actor.is_admin() || self.is_assigned_to(actor),
            Identity::Guest(_) => false,
        }
    }
}

/// A snapshotted order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItemRecord {
    pub uuid: OrderItemUuid,
    pub variant_uuid: VariantUuid,
    pub service_title: String,
    pub variant_title: String,
    pub quantity: u32,
    pub unit_price: u64,
    pub subtotal: u64,
    pub item_meta: CartItemMeta,
}

/// Who caused an order event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "user_uuid", rename_all = "snake_case")]
pub enum EventActor {
    User(UserUuid),
    Guest,
    System,
}

impl EventActor {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User(_) => "user",
            Self::Guest => "guest",
            Self::System => "system",
        }
    }

    #[must_use]
    pub const fn user_uuid(self) -> Option<UserUuid> {
        match self {
            Self::User(user) => Some(user),
            Self::Guest | Self::System => None,
        }
    }
}

impl From<&Identity> for EventActor {
    fn from(identity: &Identity) -> Self {
        match identity {
            Identity::User(actor) => Self::User(actor.user),
            Identity::Guest(_) => Self::Guest,
        }
    }
}

impl From<Actor> for EventActor {
    fn from(actor: Actor) -> Self {
        Self::User(actor.user)
    }
}

/// Something that happened to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderEvent {
    Created {
        total_amount: u64,
    },
    StatusChanged {
        from: OrderStatus,
        to: OrderStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
    EditorAssigned {
        editor_uuid: UserUuid,
    },
    Note {
        message: String,
    },
    PaymentCompleted {
        payment_uuid: PaymentUuid,
        gateway: Gateway,
    },
    PaymentFailed {
        payment_uuid: PaymentUuid,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    Refunded {
        payment_uuid: PaymentUuid,
    },
}

/// An entry in an order's append-only history.
#[derive(Debug, Clone, Serialize)]
pub struct OrderEventRecord {
    pub uuid: OrderEventUuid,
    pub actor: EventActor,
    pub event: OrderEvent,
    pub created_at: Timestamp,
}

/// An order with its lines and history.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetails {
    pub order: OrderRecord,
    pub items: Vec<OrderItemRecord>,
    pub events: Vec<OrderEventRecord>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use crate::auth::{Role, SessionKey};

    use super::*;

    fn order(user_uuid: Option<UserUuid>, session: Option<&str>) -> OrderRecord {
        OrderRecord {
            uuid: OrderUuid::new(),
            order_number: "FO-20260101-ABC123".to_string(),
            user_uuid,
            guest_email: session.map(|_| "guest@example.test".to_string()),
            guest_session_key: session.map(str::to_string),
            status: OrderStatus::Created,
            subtotal: 0,
            tax_amount: 0,
            discount_amount: 0,
            total_amount: 0,
            currency: "USD".to_string(),
            coupon_uuid: None,
            payment_method: Gateway::Stripe,
            billing_details: BillingDetails::default(),
            requirements: None,
            assigned_editor_uuid: None,
            estimated_delivery_at: None,
            delivered_at: None,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    #[test]
    fn visibility_follows_ownership_and_role() {
        let owner = Actor::new(UserUuid::new(), Role::Customer);
        let stranger = Actor::new(UserUuid::new(), Role::Customer);
        let admin = Actor::new(UserUuid::new(), Role::Admin);
        let editor = Actor::new(UserUuid::new(), Role::Editor);

        let mut order = order(Some(owner.user), None);

        assert!(order.is_visible_to(&owner.into()));
        assert!(order.is_visible_to(&admin.into()));
        assert!(!order.is_visible_to(&stranger.into()));
        assert!(!order.is_visible_to(&editor.into()));

        order.assigned_editor_uuid = Some(editor.user);

        assert!(order.is_visible_to(&editor.into()));
    }

    #[test]
    fn guests_see_orders_from_their_session() -> TestResult {
        let key = SessionKey::parse("guest-session-0001")?;
        let other = SessionKey::parse("guest-session-0002")?;

        let order = order(None, Some(key.as_str()));

        assert!(order.is_visible_to(&Identity::Guest(key)));
        assert!(!order.is_visible_to(&Identity::Guest(other)));

        Ok(())
    }

    #[test]
    fn events_serialize_with_type_tag() -> TestResult {
        let event = OrderEvent::StatusChanged {
            from: OrderStatus::Paid,
            to: OrderStatus::InProgress,
            note: None,
        };

        assert_eq!(
            serde_json::to_value(&event)?,
            json!({"type": "status_changed", "from": "paid", "to": "in_progress"})
        );

        Ok(())
    }
}
