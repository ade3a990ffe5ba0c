//! Calculate Price Handler

use std::sync::Arc;

use folio::TurnaroundTier;
use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use folio_app::domain::catalog::{data::PriceRequest, records::VariantUuid};

use crate::{
    catalog::{errors::into_status_error, responses::PriceQuoteResponse},
    extensions::*,
    state::State,
};

/// Calculate Price Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CalculatePriceRequest {
    pub variant_uuid: Uuid,
    pub quantity: u32,

    /// One of `standard`, `rush`, `express`
    #[serde(default)]
    pub turnaround: Option<String>,

    /// Add-on keys; unknown keys are ignored
    #[serde(default)]
    pub add_ons: Vec<String>,
}

impl CalculatePriceRequest {
    fn into_price_request(self) -> Result<PriceRequest, StatusError> {
        Ok(PriceRequest {
            variant: VariantUuid::from_uuid(self.variant_uuid),
            quantity: self.quantity,
            tier: self
                .turnaround
                .map(|tier| tier.parse::<TurnaroundTier>())
                .transpose()
                .or_422("unknown turnaround tier")?
                .unwrap_or_default(),
            add_ons: self.add_ons,
        })
    }
}

/// Calculate Price Handler
///
/// Prices a variant without touching any cart.
#[endpoint(
    tags("catalog"),
    summary = "Calculate Price",
    responses(
        (status_code = StatusCode::OK, description = "Itemised quote"),
        (status_code = StatusCode::NOT_FOUND, description = "Variant not found"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Quantity out of bounds"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CalculatePriceRequest>,
    depot: &mut Depot,
) -> Result<Json<PriceQuoteResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner().into_price_request()?;

    let quote = state
        .app
        .catalog
        .quote_price(request)
        .await
        .map_err(into_status_error)?;

    Ok(Json(quote.into()))
}
