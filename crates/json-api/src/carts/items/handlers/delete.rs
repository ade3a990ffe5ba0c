//! Remove Cart Item Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use folio_app::domain::catalog::records::VariantUuid;

use crate::{
    carts::{errors::into_status_error, responses::CartResponse},
    extensions::*,
    state::State,
};

/// Remove Cart Item Handler
///
/// Removing a variant that is not in the cart is not an error.
#[endpoint(
    tags("carts"),
    summary = "Remove Cart Item",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Remaining cart"),
    ),
)]
pub(crate) async fn handler(
    variant: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.identity_or_401()?;

    let summary = state
        .app
        .carts
        .remove_item(identity, VariantUuid::from_uuid(variant.into_inner()))
        .await
        .map_err(into_status_error)?;

    Ok(Json(summary.into()))
}

#[cfg(test)]
mod tests {
    use folio_app::{
        auth::Identity,
        domain::carts::{MockCartsService, data::CartSummary},
    };
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::test_helpers::{Mocks, customer, service_as};

    use super::*;

    #[tokio::test]
    async fn test_remove_item() -> TestResult {
        let variant = VariantUuid::new();

        let mut carts = MockCartsService::new();

        carts
            .expect_remove_item()
            .once()
            .withf(move |identity, v| *identity == Identity::User(customer()) && *v == variant)
            .return_once(|_, _| Ok(CartSummary::default()));

        let service = service_as(
            Mocks {
                carts,
                ..Mocks::default()
            },
            Identity::User(customer()),
            Router::with_path("cart/items/{variant}").delete(handler),
        );

        let mut res = TestClient::delete(format!("http://example.com/cart/items/{variant}"))
            .send(&service)
            .await;

        let body: CartResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.item_count, 0);

        Ok(())
    }
}
