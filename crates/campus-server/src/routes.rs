use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use campus_core::{
    BoundingBox, RegionAnalysis,
    green_zones::GreenZonePoint,
    metrics::{CarbonEstimate, RECOMMENDATIONS, SolarEstimate, carbon_estimates, solar_estimates},
    region::analyze,
    solar_model::SolarReading,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::{error::AppError, state::AppState};

#[derive(Serialize)]
pub struct SolarPrediction {
    pub dc_power: f64,
}

#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
    pub buildings: usize,
    pub green_zones: usize,
    pub model_loaded: bool,
}

pub async fn solar_handler(State(state): State<Arc<AppState>>) -> Json<Vec<SolarEstimate>> {
    Json(solar_estimates(&state.buildings))
}

pub async fn carbon_handler(State(state): State<Arc<AppState>>) -> Json<Vec<CarbonEstimate>> {
    Json(carbon_estimates(&state.buildings))
}

pub async fn recommendations_handler() -> Json<[&'static str; 4]> {
    Json(RECOMMENDATIONS)
}

pub async fn green_zones_handler(State(state): State<Arc<AppState>>) -> Json<Vec<GreenZonePoint>> {
    Json(state.green_zones.points().to_vec())
}

pub async fn analyze_region_handler(
    payload: Result<Json<BoundingBox>, JsonRejection>,
) -> Result<Json<RegionAnalysis>, AppError> {
    let Json(bbox) = payload?;
    debug!("Analyzing region {bbox:?}");

    let analysis = analyze(&bbox)?;
    info!(
        "Region scan: {} cells, dominant {:?}",
        analysis.grid_points.len(),
        analysis.dominant()
    );

    Ok(Json(analysis))
}

pub async fn predict_solar_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SolarReading>, JsonRejection>,
) -> Result<Json<SolarPrediction>, AppError> {
    let Json(reading) = payload?;
    let model = state.solar_model.as_ref().ok_or(AppError::ModelUnavailable)?;
    let dc_power = model.predict(&reading)?;

    Ok(Json(SolarPrediction { dc_power }))
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Health> {
    Json(Health {
        status: "ok",
        buildings: state.buildings.len(),
        green_zones: state.green_zones.len(),
        model_loaded: state.solar_model.is_some(),
    })
}
