use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use campus_core::{
    buildings::{Building, BuildingTable},
    forest::{Dataset, ForestParams, TreeParams},
    green_zones::{GreenZonePoint, GreenZoneTable},
    solar_model::SolarModel,
};
use campus_server::{config::Config, router, state::AppState};
use clap::Parser;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    _frontend: TempDir,
    app: Router,
}

fn config(frontend: &TempDir) -> Config {
    Config::parse_from([
        "campus-server",
        "--data-dir",
        "does-not-exist",
        "--frontend-dir",
        frontend.path().to_str().unwrap(),
        "--model-path",
        "does-not-exist/solar_model.json",
    ])
}

fn buildings(n: usize) -> BuildingTable {
    BuildingTable::new(
        (0..n)
            .map(|i| Building { name: format!("Block {}", i + 1) })
            .collect(),
    )
}

fn tiny_model() -> SolarModel {
    let mut data = Dataset::new(3);
    for i in 0..20 {
        let irr = i as f64 / 20.0;
        data.push(&[25.0, 30.0 + irr * 10.0, irr], irr * 1000.0).unwrap();
    }
    let params = ForestParams { n_trees: 5, seed: 42, tree: TreeParams::default() };
    SolarModel::train(&data, &params).unwrap()
}

fn test_app(n_buildings: usize, model: Option<SolarModel>) -> TestApp {
    let frontend = tempfile::tempdir().unwrap();
    std::fs::write(frontend.path().join("index.html"), "<h1>Campus</h1>").unwrap();

    let green_zones = GreenZoneTable::new(vec![
        GreenZonePoint { latitude: 23.07, longitude: 72.50, green_cluster: 0 },
        GreenZonePoint { latitude: 23.09, longitude: 72.52, green_cluster: 1 },
    ]);
    let state = AppState::new(config(&frontend), buildings(n_buildings), green_zones, model);

    TestApp { app: router(Arc::clone(&state)), _frontend: frontend }
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn post(app: &Router, uri: &str, body: String) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::post(uri)
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn solar_lists_first_eight_buildings() {
    let t = test_app(10, None);
    let (status, body) = get(&t.app, "/solar").await;

    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 8);
    assert_eq!(rows[0], json!({ "building": "Block 1", "predicted_energy_kwh": 90.59 }));
    assert_eq!(rows[1]["predicted_energy_kwh"], 79.47);
}

#[tokio::test]
async fn carbon_applies_emission_factor() {
    let t = test_app(2, None);
    let (status, body) = get(&t.app, "/carbon").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            { "building": "Block 1", "carbon_saved_kg": 59.43 },
            { "building": "Block 2", "carbon_saved_kg": 52.13 },
        ])
    );
}

#[tokio::test]
async fn empty_building_table_gives_empty_charts() {
    let t = test_app(0, None);
    assert_eq!(get(&t.app, "/solar").await.1, json!([]));
    assert_eq!(get(&t.app, "/carbon").await.1, json!([]));
}

#[tokio::test]
async fn recommendations_and_green_zones() {
    let t = test_app(1, None);

    let (status, recs) = get(&t.app, "/recommendations").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(recs.as_array().unwrap().len(), 4);

    let (status, zones) = get(&t.app, "/green-zones").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(zones[1], json!({ "latitude": 23.09, "longitude": 72.52, "green_cluster": 1 }));
}

#[tokio::test]
async fn analyze_region_returns_grid_and_summary() {
    let t = test_app(1, None);
    let body = json!({ "lat_min": 0.0, "lat_max": 6.0, "lon_min": 0.0, "lon_max": 6.0 }).to_string();
    let (status, result) = post(&t.app, "/analyze_region", body).await;

    assert_eq!(status, StatusCode::OK);
    let points = result["grid_points"].as_array().unwrap();
    assert_eq!(points.len(), 36);
    assert_eq!(points[0], json!({ "lat": 0.5, "lon": 0.5, "recommendation": "TREE" }));
    for p in points {
        let rec = p["recommendation"].as_str().unwrap();
        assert!(["SOLAR", "TREE", "BUILD"].contains(&rec), "{rec}");
    }
    assert_eq!(
        result["summary"],
        json!({
            "avg_solar": 101.2,
            "tree_count": 40,
            "build_score": 15.0,
            "main_rec": "🏗️ Suitable for Infrastructure/Building",
        })
    );
}

#[tokio::test]
async fn degenerate_region_reports_no_data() {
    let t = test_app(1, None);
    let body = json!({ "lat_min": 1.0, "lat_max": 1.0, "lon_min": 0.0, "lon_max": 6.0 }).to_string();
    let (status, result) = post(&t.app, "/analyze_region", body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["grid_points"], json!([]));
    assert_eq!(result["summary"]["main_rec"], "No data");
}

#[tokio::test]
async fn inverted_region_is_bad_request() {
    let t = test_app(1, None);
    let body = json!({ "lat_min": 6.0, "lat_max": 0.0, "lon_min": 0.0, "lon_max": 6.0 }).to_string();
    let (status, _) = post(&t.app, "/analyze_region", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_region_payload_is_bad_request() {
    let t = test_app(1, None);
    for body in ["{\"lat_min\": 1.0}", "not json", "{\"lat_min\": \"a\", \"lat_max\": 1, \"lon_min\": 0, \"lon_max\": 1}"] {
        let (status, _) = post(&t.app, "/analyze_region", body.to_string()).await;
        assert!(
            status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY,
            "{body}: {status}"
        );
    }
}

#[tokio::test]
async fn predict_without_model_is_unavailable() {
    let t = test_app(1, None);
    let body = json!({ "ambient_temperature": 25.0, "module_temperature": 35.0, "irradiation": 0.5 }).to_string();
    let (status, _) = post(&t.app, "/predict_solar", body).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn predict_with_model_returns_dc_power() {
    let t = test_app(1, Some(tiny_model()));
    let body = json!({ "ambient_temperature": 25.0, "module_temperature": 35.0, "irradiation": 0.5 }).to_string();
    let (status, result) = post(&t.app, "/predict_solar", body).await;

    assert_eq!(status, StatusCode::OK);
    let dc = result["dc_power"].as_f64().unwrap();
    assert!(dc > 200.0 && dc < 800.0, "dc_power={dc}");
}

#[tokio::test]
async fn health_reports_loaded_tables() {
    let t = test_app(3, None);
    let (status, body) = get(&t.app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "status": "ok", "buildings": 3, "green_zones": 2, "model_loaded": false })
    );
}

#[tokio::test]
async fn unknown_paths_fall_back_to_frontend() {
    let t = test_app(1, None);
    let response = t
        .app
        .clone()
        .oneshot(Request::get("/index.html").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"<h1>Campus</h1>");
}

#[test]
fn load_tolerates_missing_files() {
    let frontend = tempfile::tempdir().unwrap();
    let state = AppState::load(config(&frontend)).unwrap();
    assert!(state.buildings.is_empty());
    assert!(state.green_zones.is_empty());
    assert!(state.solar_model.is_none());
}
