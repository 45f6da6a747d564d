use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{ScreenLocation, ScreenPricingOption};
use crate::state::AppState;

// GET /api/screen-locations
pub async fn get_locations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ScreenLocation>>, AppError> {
    let locations = {
        let db = state.db.lock().unwrap();
        queries::list_locations(&db, true)?
    };
    Ok(Json(locations))
}

// GET /api/screen-pricing-options
#[derive(Deserialize)]
pub struct PricingOptionsQuery {
    pub location_id: Option<String>,
}

pub async fn get_pricing_options(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PricingOptionsQuery>,
) -> Result<Json<Vec<ScreenPricingOption>>, AppError> {
    let options = {
        let db = state.db.lock().unwrap();
        queries::list_pricing_options(&db, query.location_id.as_deref())?
    };
    Ok(Json(options))
}
