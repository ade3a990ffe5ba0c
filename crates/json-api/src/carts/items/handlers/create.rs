//! Add Cart Item Handler

use std::sync::Arc;

use folio::TurnaroundTier;
use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use folio_app::domain::{
    carts::{data::NewCartItem, records::CartItemMeta},
    catalog::records::VariantUuid,
};

use crate::{
    carts::{errors::into_status_error, responses::CartResponse},
    extensions::*,
    state::State,
};

/// Add Cart Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AddCartItemRequest {
    pub variant_uuid: Uuid,
    pub quantity: u32,

    /// One of `standard`, `rush`, `express`
    #[serde(default)]
    pub turnaround: Option<String>,

    #[serde(default)]
    pub add_ons: Vec<String>,
}

impl AddCartItemRequest {
    fn into_new_item(self) -> Result<NewCartItem, StatusError> {
        Ok(NewCartItem {
            variant: VariantUuid::from_uuid(self.variant_uuid),
            quantity: self.quantity,
            meta: CartItemMeta {
                turnaround: self
                    .turnaround
                    .map(|tier| tier.parse::<TurnaroundTier>())
                    .transpose()
                    .or_422("unknown turnaround tier")?
                    .unwrap_or_default(),
                add_ons: self.add_ons,
            },
        })
    }
}

/// Add Cart Item Handler
///
/// Adding a variant already in the cart merges the quantities.
#[endpoint(
    tags("carts"),
    summary = "Add Cart Item",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Item added"),
        (status_code = StatusCode::NOT_FOUND, description = "Variant not found"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Quantity out of bounds or variant unavailable"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<AddCartItemRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.identity_or_401()?;
    let item = json.into_inner().into_new_item()?;

    let summary = state
        .app
        .carts
        .add_item(identity, item)
        .await
        .map_err(into_status_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(summary.into()))
}

#[cfg(test)]
mod tests {
    use folio::PricingError;
    use folio_app::{
        auth::Identity,
        domain::carts::{CartsServiceError, MockCartsService},
    };
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use crate::{
        carts::responses::fixtures::make_summary,
        test_helpers::{Mocks, guest, service_as},
    };

    use super::*;

    fn make_service(carts: MockCartsService, identity: Identity) -> Service {
        service_as(
            Mocks {
                carts,
                ..Mocks::default()
            },
            identity,
            Router::with_path("cart/items").post(handler),
        )
    }

    #[tokio::test]
    async fn test_guest_adds_item_with_options() -> TestResult {
        let variant = VariantUuid::new();
        let summary = make_summary(variant, 2);
        let identity = guest()?;
        let expected = identity.clone();

        let mut carts = MockCartsService::new();

        carts
            .expect_add_item()
            .once()
            .withf(move |identity, item| {
                *identity == expected
                    && *item
                        == NewCartItem {
                            variant,
                            quantity: 2,
                            meta: CartItemMeta {
                                turnaround: TurnaroundTier::Express,
                                add_ons: vec!["expedited_review".to_string()],
                            },
                        }
            })
            .return_once(move |_, _| Ok(summary));

        let mut res = TestClient::post("http://example.com/cart/items")
            .json(&json!({
                "variant_uuid": variant.into_uuid(),
                "quantity": 2,
                "turnaround": "express",
                "add_ons": ["expedited_review"],
            }))
            .send(&make_service(carts, identity))
            .await;

        let body: CartResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(body.item_count, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_quantity_above_maximum_returns_422() -> TestResult {
        let mut carts = MockCartsService::new();

        carts.expect_add_item().once().return_once(|_, _| {
            Err(CartsServiceError::Pricing(PricingError::AboveMaximum {
                quantity: 500,
                maximum: 100,
            }))
        });

        let res = TestClient::post("http://example.com/cart/items")
            .json(&json!({ "variant_uuid": VariantUuid::new().into_uuid(), "quantity": 500 }))
            .send(&make_service(carts, guest()?))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNPROCESSABLE_ENTITY));

        Ok(())
    }

    #[tokio::test]
    async fn test_unavailable_variant_returns_422() -> TestResult {
        let variant = VariantUuid::new();

        let mut carts = MockCartsService::new();

        carts
            .expect_add_item()
            .once()
            .return_once(move |_, _| Err(CartsServiceError::VariantUnavailable(variant)));

        let res = TestClient::post("http://example.com/cart/items")
            .json(&json!({ "variant_uuid": variant.into_uuid(), "quantity": 1 }))
            .send(&make_service(carts, guest()?))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNPROCESSABLE_ENTITY));

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_turnaround_returns_422() -> TestResult {
        let res = TestClient::post("http://example.com/cart/items")
            .json(&json!({
                "variant_uuid": VariantUuid::new().into_uuid(),
                "quantity": 1,
                "turnaround": "yesterday",
            }))
            .send(&make_service(MockCartsService::new(), guest()?))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNPROCESSABLE_ENTITY));

        Ok(())
    }
}
