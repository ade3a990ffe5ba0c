//! Test Helpers

use folio::{CouponKind, OrderStatus, UnitType};
use jiff::{SignedDuration, Timestamp};
use serde_json::json;
use testresult::TestResult;

use crate::{
    auth::{Actor, Identity, NewUser, Role, SessionKey, UserUuid},
    domain::{
        carts::{
            CartsService, CartsServiceError,
            data::{CartSummary, NewCartItem},
        },
        catalog::{
            CatalogService, CatalogServiceError,
            data::{NewService, NewVariant},
            records::{ServiceRecord, ServiceType, ServiceUuid, VariantRecord, VariantUuid},
        },
        coupons::{
            CouponsService, CouponsServiceError,
            data::NewCoupon,
            records::{CouponRecord, CouponUuid},
        },
        orders::{
            OrdersService, OrdersServiceError,
            data::{BillingDetails, CheckoutReceipt, CheckoutRequest},
            records::OrderUuid,
        },
        payments::records::Gateway,
    },
    test::TestContext,
};

pub(crate) async fn create_service(
    ctx: &TestContext,
    slug: &str,
) -> Result<ServiceRecord, CatalogServiceError> {
    ctx.catalog
        .create_service(
            ctx.admin,
            NewService {
                uuid: ServiceUuid::new(),
                slug: slug.to_string(),
                title: format!("Service {slug}"),
                description: String::new(),
                service_type: ServiceType::Editing,
                base_price: 0,
                features: json!([]),
                sort_order: 0,
                is_featured: false,
            },
        )
        .await
}

pub(crate) async fn create_variant(
    ctx: &TestContext,
    service: ServiceUuid,
    price: u64,
    unit_type: UnitType,
    min_quantity: u32,
    max_quantity: Option<u32>,
) -> Result<VariantRecord, CatalogServiceError> {
    ctx.catalog
        .create_variant(
            ctx.admin,
            service,
            NewVariant {
                uuid: VariantUuid::new(),
                title: format!("{unit_type} at {price}"),
                price,
                unit_type,
                turnaround_days: 7,
                min_quantity,
                max_quantity,
            },
        )
        .await
}

/// A fixed-price variant under its own new service.
pub(crate) async fn fixed_variant(
    ctx: &TestContext,
    price: u64,
) -> Result<VariantRecord, CatalogServiceError> {
    let slug = format!("service-{}", ServiceUuid::new());
    let service = create_service(ctx, &slug).await?;

    create_variant(ctx, service.uuid, price, UnitType::Fixed, 1, None).await
}

pub(crate) async fn add_to_cart(
    ctx: &TestContext,
    identity: &Identity,
    variant: VariantUuid,
    quantity: u32,
) -> Result<CartSummary, CartsServiceError> {
    ctx.carts
        .add_item(
            identity,
            NewCartItem {
                variant,
                quantity,
                meta: Default::default(),
            },
        )
        .await
}

pub(crate) fn billing_details() -> BillingDetails {
    BillingDetails {
        name: "Ada Lovelace".to_string(),
        email: "ada@example.test".to_string(),
        ..BillingDetails::default()
    }
}

pub(crate) async fn checkout(
    ctx: &TestContext,
    identity: &Identity,
    coupon_code: Option<&str>,
) -> Result<CheckoutReceipt, OrdersServiceError> {
    ctx.orders
        .checkout(
            identity,
            CheckoutRequest {
                billing_details: billing_details(),
                requirements: None,
                coupon_code: coupon_code.map(str::to_string),
                payment_method: Gateway::Stripe,
            },
        )
        .await
}

/// Checks out a single fixed-price line for `identity`.
pub(crate) async fn place_order(
    ctx: &TestContext,
    identity: &Identity,
    price: u64,
) -> TestResult<CheckoutReceipt> {
    let variant = fixed_variant(ctx, price).await?;

    add_to_cart(ctx, identity, variant.uuid, 1).await?;

    Ok(checkout(ctx, identity, None).await?)
}

/// Sets an order's status directly, skipping transition rules.
pub(crate) async fn force_status(
    ctx: &TestContext,
    order: OrderUuid,
    status: OrderStatus,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE orders SET status = $1, updated_at = now() WHERE uuid = $2")
        .bind(status.as_str())
        .bind(order.into_uuid())
        .execute(ctx.db.pool())
        .await?;

    Ok(())
}

pub(crate) fn guest_identity() -> Identity {
    Identity::Guest(SessionKey::parse("guest-session-0001").expect("valid session key"))
}

pub(crate) async fn create_percentage_coupon(
    ctx: &TestContext,
    code: &str,
    basis_points: u16,
) -> Result<CouponRecord, CouponsServiceError> {
    let now = Timestamp::now();

    ctx.coupons
        .create_coupon(
            ctx.admin,
            NewCoupon {
                uuid: CouponUuid::new(),
                code: code.to_string(),
                name: format!("{code} coupon"),
                kind: CouponKind::Percentage { basis_points },
                minimum_amount: None,
                maximum_discount: None,
                valid_from: now - SignedDuration::from_hours(1),
                valid_to: now + SignedDuration::from_hours(24 * 30),
                usage_limit: None,
                is_active: true,
            },
        )
        .await
}

/// Another user with `role`, beyond the three seeded ones.
pub(crate) async fn create_actor(ctx: &TestContext, role: Role) -> TestResult<Actor> {
    let uuid = UserUuid::new();

    let user = ctx
        .auth
        .create_user(NewUser {
            uuid,
            email: format!("{uuid}@example.test"),
            name: format!("Extra {role}"),
            role,
        })
        .await?;

    Ok(Actor::new(user.uuid, user.role))
}
