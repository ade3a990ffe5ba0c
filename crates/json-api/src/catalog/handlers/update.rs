//! Update Service Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use folio_app::domain::catalog::{
    data::ServiceUpdate,
    records::{ServiceType, ServiceUuid},
};

use crate::{
    catalog::{errors::into_status_error, responses::ServiceResponse},
    extensions::*,
    state::State,
};

/// Update Service Request
///
/// Replaces every editable field.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateServiceRequest {
    pub slug: String,
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// One of `editing`, `formatting`, `design`, `illustration`
    pub service_type: String,

    pub base_price: u64,

    #[serde(default)]
    #[salvo(schema(value_type = Object))]
    pub features: Value,

    #[serde(default)]
    pub sort_order: i32,

    pub is_active: bool,
    pub is_featured: bool,
}

impl UpdateServiceRequest {
    fn into_update(self) -> Result<ServiceUpdate, StatusError> {
        Ok(ServiceUpdate {
            slug: self.slug,
            title: self.title,
            description: self.description,
            service_type: self
                .service_type
                .parse::<ServiceType>()
                .or_422("unknown service type")?,
            base_price: self.base_price,
            features: if self.features.is_null() {
                Value::Array(Vec::new())
            } else {
                self.features
            },
            sort_order: self.sort_order,
            is_active: self.is_active,
            is_featured: self.is_featured,
        })
    }
}

/// Update Service Handler
#[endpoint(
    tags("catalog"),
    summary = "Update Service",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Service updated"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller is not an administrator"),
        (status_code = StatusCode::NOT_FOUND, description = "Service not found"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Invalid or duplicate slug"),
    ),
)]
pub(crate) async fn handler(
    service: PathParam<Uuid>,
    json: JsonBody<UpdateServiceRequest>,
    depot: &mut Depot,
) -> Result<Json<ServiceResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;
    let update = json.into_inner().into_update()?;

    let service = state
        .app
        .catalog
        .update_service(actor, ServiceUuid::from_uuid(service.into_inner()), update)
        .await
        .map_err(into_status_error)?;

    Ok(Json(service.into()))
}

#[cfg(test)]
mod tests {
    use folio_app::{
        auth::Identity,
        domain::catalog::{CatalogServiceError, MockCatalogService},
    };
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use crate::{
        catalog::responses::fixtures::make_service,
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
            Router::with_path("admin/services/{service}").put(handler),
        )
    }

    fn body(service_type: &str) -> Value {
        json!({
            "slug": "structural-editing",
            "title": "Structural Editing",
            "service_type": service_type,
            "base_price": 12_000,
            "is_active": true,
            "is_featured": true
        })
    }

    #[tokio::test]
    async fn test_update_service() -> TestResult {
        let uuid = ServiceUuid::new();
        let record = make_service(uuid, "structural-editing");

        let mut catalog = MockCatalogService::new();

        catalog
            .expect_update_service()
            .once()
            .withf(move |actor, s, update| {
                *actor == admin()
                    && *s == uuid
                    && update.slug == "structural-editing"
                    && update.base_price == 12_000
                    && update.features == json!([])
                    && update.is_featured
            })
            .return_once(move |_, _, _| Ok(record));

        let mut res = TestClient::put(format!("http://example.com/admin/services/{uuid}"))
            .json(&body("editing"))
            .send(&make_service_with(catalog))
            .await;

        let service: ServiceResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(service.slug, "structural-editing");

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_type_returns_422() -> TestResult {
        let uuid = ServiceUuid::new();

        let res = TestClient::put(format!("http://example.com/admin/services/{uuid}"))
            .json(&body("translation"))
            .send(&make_service_with(MockCatalogService::new()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNPROCESSABLE_ENTITY));

        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_slug_returns_422() -> TestResult {
        let uuid = ServiceUuid::new();

        let mut catalog = MockCatalogService::new();

        catalog
            .expect_update_service()
            .once()
            .return_once(|_, _, _| Err(CatalogServiceError::AlreadyExists));

        let res = TestClient::put(format!("http://example.com/admin/services/{uuid}"))
            .json(&body("editing"))
            .send(&make_service_with(catalog))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNPROCESSABLE_ENTITY));

        Ok(())
    }
}
