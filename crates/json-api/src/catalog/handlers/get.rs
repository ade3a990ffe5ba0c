//! Get Service Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};

use crate::{
    catalog::{errors::into_status_error, responses::ServiceDetailsResponse},
    extensions::*,
    state::State,
};

/// Get Service Handler
///
/// An active service with its active variants.
#[endpoint(
    tags("catalog"),
    summary = "Get Service",
    responses(
        (status_code = StatusCode::OK, description = "Service and variants"),
        (status_code = StatusCode::NOT_FOUND, description = "Service not found"),
    ),
)]
pub(crate) async fn handler(
    slug: PathParam<String>,
    depot: &mut Depot,
) -> Result<Json<ServiceDetailsResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let details = state
        .app
        .catalog
        .get_service(&slug.into_inner())
        .await
        .map_err(into_status_error)?;

    Ok(Json(details.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use folio_app::domain::catalog::{
        CatalogServiceError, MockCatalogService,
        records::{ServiceDetails, ServiceUuid, VariantUuid},
    };

    use crate::{
        catalog::responses::fixtures::{make_service, make_variant},
        test_helpers::{Mocks, public_service},
    };

    use super::*;

    fn make_service_with(catalog: MockCatalogService) -> Service {
        public_service(
            Mocks {
                catalog,
                ..Mocks::default()
            },
            Router::with_path("services/{slug}").get(handler),
        )
    }

    #[tokio::test]
    async fn test_get_service_returns_variants() -> TestResult {
        let uuid = ServiceUuid::new();
        let variant = VariantUuid::new();

        let details = ServiceDetails {
            service: make_service(uuid, "copy-editing"),
            variants: vec![make_variant(variant, uuid)],
        };

        let mut catalog = MockCatalogService::new();

        catalog
            .expect_get_service()
            .once()
            .withf(|slug| slug == "copy-editing")
            .return_once(move |_| Ok(details));

        let mut res = TestClient::get("http://example.com/services/copy-editing")
            .send(&make_service_with(catalog))
            .await;

        let body: ServiceDetailsResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.service.uuid, uuid.into_uuid());
        assert_eq!(
            body.variants.first().map(|v| (v.uuid, v.unit_type.as_str())),
            Some((variant.into_uuid(), "per_word"))
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_service_returns_404() -> TestResult {
        let mut catalog = MockCatalogService::new();

        catalog
            .expect_get_service()
            .once()
            .return_once(|_| Err(CatalogServiceError::NotFound));

        let res = TestClient::get("http://example.com/services/nope")
            .send(&make_service_with(catalog))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
