//! Delete Variant Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use folio_app::domain::catalog::records::VariantUuid;

use crate::{
    catalog::{errors::into_status_error, responses::RemovalResponse},
    extensions::*,
    state::State,
};

/// Delete Variant Handler
#[endpoint(
    tags("catalog"),
    summary = "Delete Variant",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Variant deleted or retired"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller is not an administrator"),
        (status_code = StatusCode::NOT_FOUND, description = "Variant not found"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Variant has open orders"),
    ),
)]
pub(crate) async fn handler(
    variant: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<RemovalResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let removal = state
        .app
        .catalog
        .delete_variant(actor, VariantUuid::from_uuid(variant.into_inner()))
        .await
        .map_err(into_status_error)?;

    Ok(Json(removal.into()))
}

#[cfg(test)]
mod tests {
    use folio_app::{
        auth::Identity,
        domain::catalog::{CatalogServiceError, MockCatalogService, data::Removal},
    };
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::test_helpers::{Mocks, admin, service_as};

    use super::*;

    fn make_service_with(catalog: MockCatalogService) -> Service {
        service_as(
            Mocks {
                catalog,
                ..Mocks::default()
            },
            Identity::User(admin()),
            Router::with_path("admin/variants/{variant}").delete(handler),
        )
    }

    #[tokio::test]
    async fn test_unused_variant_is_deleted() -> TestResult {
        let uuid = VariantUuid::new();

        let mut catalog = MockCatalogService::new();

        catalog
            .expect_delete_variant()
            .once()
            .withf(move |actor, v| *actor == admin() && *v == uuid)
            .return_once(|_, _| Ok(Removal::Deleted));

        let mut res = TestClient::delete(format!("http://example.com/admin/variants/{uuid}"))
            .send(&make_service_with(catalog))
            .await;

        let body: RemovalResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.outcome, "deleted");

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_variant_returns_404() -> TestResult {
        let uuid = VariantUuid::new();

        let mut catalog = MockCatalogService::new();

        catalog
            .expect_delete_variant()
            .once()
            .return_once(|_, _| Err(CatalogServiceError::NotFound));

        let res = TestClient::delete(format!("http://example.com/admin/variants/{uuid}"))
            .send(&make_service_with(catalog))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
