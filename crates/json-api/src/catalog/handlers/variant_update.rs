//! Update Variant Handler

use std::sync::Arc;

use folio::UnitType;
use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use folio_app::domain::catalog::{data::VariantUpdate, records::VariantUuid};

use crate::{
    catalog::{errors::into_status_error, responses::VariantResponse},
    extensions::*,
    state::State,
};

/// Update Variant Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateVariantRequest {
    pub title: String,

    /// Unit price in minor units
    pub price: u64,

    /// One of `fixed`, `per_word`, `per_page`, `per_hour`
    pub unit_type: String,

    pub turnaround_days: u32,
    pub min_quantity: u32,
    pub max_quantity: Option<u32>,
    pub is_active: bool,
}

impl UpdateVariantRequest {
    fn into_update(self) -> Result<VariantUpdate, StatusError> {
        Ok(VariantUpdate {
            title: self.title,
            price: self.price,
            unit_type: self.unit_type.parse::<UnitType>().or_422("unknown unit type")?,
            turnaround_days: self.turnaround_days,
            min_quantity: self.min_quantity,
            max_quantity: self.max_quantity,
            is_active: self.is_active,
        })
    }
}

/// Update Variant Handler
///
/// Existing cart lines keep their quantities; new prices apply from the next
/// totals calculation.
#[endpoint(
    tags("catalog"),
    summary = "Update Variant",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Variant updated"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller is not an administrator"),
        (status_code = StatusCode::NOT_FOUND, description = "Variant not found"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Invalid variant"),
    ),
)]
pub(crate) async fn handler(
    variant: PathParam<Uuid>,
    json: JsonBody<UpdateVariantRequest>,
    depot: &mut Depot,
) -> Result<Json<VariantResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;
    let update = json.into_inner().into_update()?;

    let variant = state
        .app
        .catalog
        .update_variant(actor, VariantUuid::from_uuid(variant.into_inner()), update)
        .await
        .map_err(into_status_error)?;

    Ok(Json(variant.into()))
}

#[cfg(test)]
mod tests {
    use folio::PricingError;
    use folio_app::{
        auth::Identity,
        domain::catalog::{CatalogServiceError, MockCatalogService, records::ServiceUuid},
    };
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;

    use crate::{
        catalog::responses::fixtures::make_variant,
        test_helpers::{Mocks, admin, service_as},
    };

    use super::*;

    fn make_service_with(catalog: MockCatalogService) -> Service {
        service_as(
            Mocks {
                catalog,
                ..Mocks::default()
            },
            Identity::User(admin()),
            Router::with_path("admin/variants/{variant}").put(handler),
        )
    }

    fn body(unit_type: &str) -> Value {
        json!({
            "title": "Per word",
            "price": 3,
            "unit_type": unit_type,
            "turnaround_days": 5,
            "min_quantity": 500,
            "max_quantity": null,
            "is_active": true
        })
    }

    #[tokio::test]
    async fn test_update_variant() -> TestResult {
        let uuid = VariantUuid::new();
        let mut record = make_variant(uuid, ServiceUuid::new());
        record.price = 3;

        let mut catalog = MockCatalogService::new();

        catalog
            .expect_update_variant()
            .once()
            .withf(move |actor, v, update| {
                *actor == admin()
                    && *v == uuid
                    && update.price == 3
                    && update.unit_type == UnitType::PerWord
                    && update.max_quantity.is_none()
            })
            .return_once(move |_, _, _| Ok(record));

        let mut res = TestClient::put(format!("http://example.com/admin/variants/{uuid}"))
            .json(&body("per_word"))
            .send(&make_service_with(catalog))
            .await;

        let variant: VariantResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(variant.price, 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_unit_type_returns_422() -> TestResult {
        let uuid = VariantUuid::new();

        let res = TestClient::put(format!("http://example.com/admin/variants/{uuid}"))
            .json(&body("per_chapter"))
            .send(&make_service_with(MockCatalogService::new()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNPROCESSABLE_ENTITY));

        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_bounds_return_422() -> TestResult {
        let uuid = VariantUuid::new();

        let mut catalog = MockCatalogService::new();

        catalog.expect_update_variant().once().return_once(|_, _, _| {
            Err(CatalogServiceError::Pricing(PricingError::InvalidBounds {
                minimum: 500,
                maximum: 10,
            }))
        });

        let res = TestClient::put(format!("http://example.com/admin/variants/{uuid}"))
            .json(&body("per_word"))
            .send(&make_service_with(catalog))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNPROCESSABLE_ENTITY));

        Ok(())
    }
}
