//! List Services Handler

use std::sync::Arc;

use salvo::{oapi::extract::QueryParam, prelude::*};

use folio_app::domain::catalog::{data::ServiceFilter, records::ServiceType};

use crate::{
    catalog::{errors::into_status_error, responses::ServiceResponse},
    extensions::*,
    state::State,
};

/// List Services Handler
///
/// Active services ordered by sort order, then title.
#[endpoint(
    tags("catalog"),
    summary = "List Services",
    responses(
        (status_code = StatusCode::OK, description = "Services"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Unknown service type"),
    ),
)]
pub(crate) async fn handler(
    service_type: QueryParam<String, false>,
    featured: QueryParam<bool, false>,
    depot: &mut Depot,
) -> Result<Json<Vec<ServiceResponse>>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let filter = ServiceFilter {
        service_type: service_type
            .into_inner()
            .map(|value| value.parse::<ServiceType>())
            .transpose()
            .or_422("unknown service type")?,
        featured_only: featured.into_inner().unwrap_or(false),
    };

    let services = state
        .app
        .catalog
        .list_services(filter)
        .await
        .map_err(into_status_error)?;

    Ok(Json(services.into_iter().map(Into::into).collect()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use folio_app::domain::catalog::{MockCatalogService, records::ServiceUuid};

    use crate::{
        catalog::responses::fixtures::make_service,
        test_helpers::{Mocks, public_service},
    };

    use super::*;

    fn make_service_with(catalog: MockCatalogService) -> Service {
        public_service(
            Mocks {
                catalog,
                ..Mocks::default()
            },
            Router::with_path("services").get(handler),
        )
    }

    #[tokio::test]
    async fn test_list_services_forwards_filters() -> TestResult {
        let service = make_service(ServiceUuid::new(), "copy-editing");

        let mut catalog = MockCatalogService::new();

        catalog
            .expect_list_services()
            .once()
            .withf(|filter| {
                *filter
                    == ServiceFilter {
                        service_type: Some(ServiceType::Design),
                        featured_only: true,
                    }
            })
            .return_once(move |_| Ok(vec![service]));

        let mut res =
            TestClient::get("http://example.com/services?service_type=design&featured=true")
                .send(&make_service_with(catalog))
                .await;

        let body: Vec<ServiceResponse> = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.len(), 1);
        assert_eq!(body.first().map(|s| s.slug.as_str()), Some("copy-editing"));

        Ok(())
    }

    #[tokio::test]
    async fn test_list_services_without_filters() -> TestResult {
        let mut catalog = MockCatalogService::new();

        catalog
            .expect_list_services()
            .once()
            .withf(|filter| *filter == ServiceFilter::default())
            .return_once(|_| Ok(Vec::new()));

        let res = TestClient::get("http://example.com/services")
            .send(&make_service_with(catalog))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_service_type_returns_422() -> TestResult {
        let res = TestClient::get("http://example.com/services?service_type=poetry")
            .send(&make_service_with(MockCatalogService::new()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNPROCESSABLE_ENTITY));

        Ok(())
    }
}
