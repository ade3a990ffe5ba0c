//! Create Variant Handler

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

use folio_app::domain::catalog::{
    data::NewVariant,
    records::{ServiceUuid, VariantUuid},
};

use crate::{
    catalog::{errors::into_status_error, responses::VariantResponse},
    extensions::*,
    state::State,
};

/// Create Variant Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateVariantRequest {
    /// Client-chosen UUID; generated when absent
    pub uuid: Option<Uuid>,

    pub title: String,

    /// Unit price in minor units
    pub price: u64,

    /// One of `fixed`, `per_word`, `per_page`, `per_hour`
    pub unit_type: String,

    pub turnaround_days: u32,

    #[serde(default = "default_min_quantity")]
    pub min_quantity: u32,

    pub max_quantity: Option<u32>,
}

const fn default_min_quantity() -> u32 {
    1
}

impl CreateVariantRequest {
    fn into_new_variant(self) -> Result<NewVariant, StatusError> {
        Ok(NewVariant {
            uuid: self.uuid.map_or_else(VariantUuid::new, VariantUuid::from_uuid),
            title: self.title,
            price: self.price,
            unit_type: self.unit_type.parse::<UnitType>().or_422("unknown unit type")?,
            turnaround_days: self.turnaround_days,
            min_quantity: self.min_quantity,
            max_quantity: self.max_quantity,
        })
    }
}

/// Create Variant Handler
#[endpoint(
    tags("catalog"),
    summary = "Create Variant",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Variant created"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller is not an administrator"),
        (status_code = StatusCode::NOT_FOUND, description = "Service not found"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Invalid variant"),
    ),
)]
pub(crate) async fn handler(
    service: PathParam<Uuid>,
    json: JsonBody<CreateVariantRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<VariantResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;
    let variant = json.into_inner().into_new_variant()?;

    let variant = state
        .app
        .catalog
        .create_variant(actor, ServiceUuid::from_uuid(service.into_inner()), variant)
        .await
        .map_err(into_status_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(variant.into()))
}
