//! Create Service Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use folio_app::domain::catalog::{
    data::NewService,
    records::{ServiceType, ServiceUuid},
};

use crate::{
    catalog::{errors::into_status_error, responses::ServiceResponse},
    extensions::*,
    state::State,
};

/// Create Service Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateServiceRequest {
    /// Client-chosen UUID; generated when absent
    pub uuid: Option<Uuid>,

    pub slug: String,
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// One of `editing`, `formatting`, `design`, `illustration`
    pub service_type: String,

    #[serde(default)]
    pub base_price: u64,

    #[serde(default)]
    #[salvo(schema(value_type = Object))]
    pub features: Value,

    #[serde(default)]
    pub sort_order: i32,

    #[serde(default)]
    pub is_featured: bool,
}

impl CreateServiceRequest {
    fn into_new_service(self) -> Result<NewService, StatusError> {
        Ok(NewService {
            uuid: self.uuid.map_or_else(ServiceUuid::new, ServiceUuid::from_uuid),
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
            is_featured: self.is_featured,
        })
    }
}

/// Create Service Handler
#[endpoint(
    tags("catalog"),
    summary = "Create Service",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Service created"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller is not an administrator"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Invalid or duplicate service"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CreateServiceRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<ServiceResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;
    let service = json.into_inner().into_new_service()?;

    let service = state
        .app
        .catalog
        .create_service(actor, service)
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, format!("/services/{}", service.slug), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(service.into()))
}
