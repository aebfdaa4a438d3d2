//! Pricing catalog endpoint.

use axum::Json;
use tracing::instrument;

use crate::api::models::pricing::{pricing_tiers, PricingTier};

/// List the published pricing tiers
#[utoipa::path(
    get,
    path = "/pricing/tiers",
    tag = "pricing",
    responses(
        (status = 200, description = "Published subscription tiers", body = Vec<PricingTier>),
    )
)]
#[instrument(skip_all)]
pub async fn list_pricing_tiers() -> Json<Vec<PricingTier>> {
    Json(pricing_tiers())
}
