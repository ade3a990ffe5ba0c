//! Test helpers.

use std::sync::Arc;

use folio_app::{
    auth::{Actor, Identity, InvalidSessionKey, MockAuthService, Role, SessionKey, UserUuid},
    context::AppContext,
    domain::{
        carts::MockCartsService, catalog::MockCatalogService, coupons::MockCouponsService,
        files::MockFilesService, orders::MockOrdersService, payments::MockPaymentsService,
    },
};
use salvo::{affix_state::inject, prelude::*};
use uuid::Uuid;

use crate::state::State;

pub(crate) const CUSTOMER_UUID: UserUuid = UserUuid::from_uuid(Uuid::from_u128(1));
pub(crate) const EDITOR_UUID: UserUuid = UserUuid::from_uuid(Uuid::from_u128(2));
pub(crate) const ADMIN_UUID: UserUuid = UserUuid::from_uuid(Uuid::from_u128(3));
pub(crate) const GUEST_SESSION: &str = "guest-session-0001";

pub(crate) fn customer() -> Actor {
    Actor::new(CUSTOMER_UUID, Role::Customer)
}

pub(crate) fn editor() -> Actor {
    Actor::new(EDITOR_UUID, Role::Editor)
}

pub(crate) fn admin() -> Actor {
    Actor::new(ADMIN_UUID, Role::Admin)
}

pub(crate) fn guest() -> Result<Identity, InvalidSessionKey> {
    SessionKey::parse(GUEST_SESSION).map(Identity::Guest)
}

/// Service mocks; every expectation not set by a test fails when hit.
pub(crate) struct Mocks {
    pub(crate) auth: MockAuthService,
    pub(crate) catalog: MockCatalogService,
    pub(crate) carts: MockCartsService,
    pub(crate) coupons: MockCouponsService,
    pub(crate) orders: MockOrdersService,
    pub(crate) payments: MockPaymentsService,
    pub(crate) files: MockFilesService,
}

impl Default for Mocks {
    fn default() -> Self {
        Self {
            auth: strict_auth_mock(),
            catalog: strict_catalog_mock(),
            carts: strict_carts_mock(),
            coupons: strict_coupons_mock(),
            orders: strict_orders_mock(),
            payments: strict_payments_mock(),
            files: strict_files_mock(),
        }
    }
}

impl Mocks {
    pub(crate) fn into_state(self) -> Arc<State> {
        State::from_app_context(AppContext {
            auth: Arc::new(self.auth),
            catalog: Arc::new(self.catalog),
            carts: Arc::new(self.carts),
            coupons: Arc::new(self.coupons),
            orders: Arc::new(self.orders),
            payments: Arc::new(self.payments),
            files: Arc::new(self.files),
        })
    }
}

fn strict_auth_mock() -> MockAuthService {
    let mut auth = MockAuthService::new();

    auth.expect_authenticate_bearer().never();

    auth
}

fn strict_catalog_mock() -> MockCatalogService {
    let mut catalog = MockCatalogService::new();

    catalog.expect_list_services().never();
    catalog.expect_get_service().never();
    catalog.expect_create_service().never();
    catalog.expect_create_variant().never();
    catalog.expect_set_service_active().never();
    catalog.expect_update_service().never();
    catalog.expect_delete_service().never();
    catalog.expect_update_variant().never();
    catalog.expect_delete_variant().never();
    catalog.expect_quote_price().never();

    catalog
}

fn strict_carts_mock() -> MockCartsService {
    let mut carts = MockCartsService::new();

    carts.expect_get_summary().never();
    carts.expect_add_item().never();
    carts.expect_update_item().never();
    carts.expect_remove_item().never();
    carts.expect_clear().never();
    carts.expect_calculate_totals().never();

    carts
}

fn strict_coupons_mock() -> MockCouponsService {
    let mut coupons = MockCouponsService::new();

    coupons.expect_create_coupon().never();
    coupons.expect_list_coupons().never();
    coupons.expect_apply().never();

    coupons
}

fn strict_orders_mock() -> MockOrdersService {
    let mut orders = MockOrdersService::new();

    orders.expect_checkout().never();
    orders.expect_get_order().never();
    orders.expect_list_orders().never();
    orders.expect_update_status().never();
    orders.expect_assign_editor().never();
    orders.expect_add_note().never();
    orders.expect_refund().never();
    orders.expect_statistics().never();

    orders
}

fn strict_payments_mock() -> MockPaymentsService {
    let mut payments = MockPaymentsService::new();

    payments.expect_create_intent().never();
    payments.expect_reconcile().never();
    payments.expect_payment_status().never();

    payments
}

fn strict_files_mock() -> MockFilesService {
    let mut files = MockFilesService::new();

    files.expect_upload().never();
    files.expect_list_files().never();
    files.expect_get_file().never();
    files.expect_download().never();
    files.expect_delete_file().never();
    files.expect_set_visibility().never();
    files.expect_order_files().never();
    files.expect_storage_usage().never();

    files
}

pub(crate) fn state_with_auth(auth: MockAuthService) -> Arc<State> {
    Mocks {
        auth,
        ..Mocks::default()
    }
    .into_state()
}

/// A service for `route` with no caller identity.
pub(crate) fn public_service(mocks: Mocks, route: Router) -> Service {
    Service::new(Router::new().hoop(inject(mocks.into_state())).push(route))
}

/// A service for `route` called by `identity`.
pub(crate) fn service_as(mocks: Mocks, identity: Identity, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(mocks.into_state()))
            .hoop(inject(identity))
            .push(route),
    )
}
