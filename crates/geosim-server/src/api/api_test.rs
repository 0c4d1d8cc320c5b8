use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use super::*;
use axum::body::{to_bytes, Body};
use axum::http::Request;
use chrono::NaiveDate;
use geosim_core::{Environment, OrderRecord, SpatialPoint};
use tower::ServiceExt;

fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://unused".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        catalog_path: None,
        db_max_connections: 5,
        db_min_connections: 1,
        db_acquire_timeout_secs: 5,
        insert_chunk_size: 1000,
        query_row_limit: 1000,
        containment_margin_deg: 0.05,
        generator_order_count: 1000,
        generator_window_days: 30,
    }
}

fn test_app(pool: PgPool) -> Router {
    build_app(AppState {
        pool,
        config: Arc::new(test_config()),
        catalog: Arc::new(Catalog::bengaluru()),
    })
}

fn order(id: &str, store_id: &str, store: SpatialPoint, customer: SpatialPoint, value: f64) -> OrderRecord {
    OrderRecord {
        order_id: id.to_string(),
        customer,
        order_value: value,
        order_date: NaiveDate::from_ymd_opt(2026, 5, 2).unwrap(),
        store_id: store_id.to_string(),
        store,
        delivery_time_minutes: 30,
    }
}

/// Three orders: one at the Koramangala store, one ~7.8 km north of it
/// (inside the central coverage circle), one at Electronic City.
async fn seed_orders(pool: &PgPool) {
    let koramangala = SpatialPoint::new(12.9279, 77.6271);
    let electronic_city = SpatialPoint::new(12.8456, 77.6603);
    let orders = vec![
        order("ORD_000001", "STORE_001", koramangala, koramangala, 400.0),
        order(
            "ORD_000002",
            "STORE_001",
            koramangala,
            SpatialPoint::new(12.9979, 77.6271),
            650.0,
        ),
        order(
            "ORD_000003",
            "STORE_004",
            electronic_city,
            electronic_city,
            275.5,
        ),
    ];
    geosim_db::insert_orders(pool, &orders)
        .await
        .expect("seed orders");
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
        .await
        .expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
    (status, json)
}

#[test]
fn normalize_limit_applies_defaults_and_bounds() {
    assert_eq!(normalize_limit(None, 200, 1000), 200);
    assert_eq!(normalize_limit(Some(0), 200, 1000), 1);
    assert_eq!(normalize_limit(Some(5_000), 200, 1000), 1000);
    assert_eq!(normalize_limit(Some(25), 200, 1000), 25);
    assert_eq!(normalize_limit(None, 500, 100), 100);
}

#[test]
fn api_error_codes_map_to_statuses() {
    let cases = [
        ("validation_error", StatusCode::BAD_REQUEST),
        ("internal_error", StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (code, status) in cases {
        let response = ApiError::new("req-1", code, "message").into_response();
        assert_eq!(response.status(), status, "{code}");
    }
}

#[test]
fn engine_errors_become_validation_errors() {
    let err = map_engine_error(
        "req-2".to_string(),
        &EngineError::InvalidParameter {
            name: "radius_km",
            reason: "must be > 0".to_string(),
        },
    );
    assert_eq!(err.error.code, "validation_error");
    assert!(err.error.message.contains("radius_km"));
}

#[test]
fn api_error_serializes_envelope() {
    let json = serde_json::to_value(ApiError::validation("req-3", "bad margin")).expect("serialize");
    assert_eq!(json["error"]["code"], "validation_error");
    assert_eq!(json["error"]["message"], "bad margin");
    assert_eq!(json["meta"]["request_id"], "req-3");
}

#[sqlx::test(migrations = "../../migrations")]
async fn health_reports_ok_and_echoes_request_id(pool: PgPool) {
    let response = test_app(pool)
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .header(REQUEST_ID_HEADER, "req-health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok()),
        Some("req-health")
    );
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["meta"]["request_id"], "req-health");
}

#[sqlx::test(migrations = "../../migrations")]
async fn overview_on_empty_database(pool: PgPool) {
    let (status, json) = get_json(test_app(pool), "/api/v1/overview").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["order_count"], 0);
    assert_eq!(json["data"]["zone_count"], 0);
    assert!(json["data"]["avg_value"].is_null());
}

#[sqlx::test(migrations = "../../migrations")]
async fn stores_are_named_from_catalog(pool: PgPool) {
    seed_orders(&pool).await;

    let (status, json) = get_json(test_app(pool), "/api/v1/stores").await;

    assert_eq!(status, StatusCode::OK);
    let data = json["data"].as_array().expect("data array");
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["store_id"], "STORE_001");
    assert_eq!(data[0]["name"], "Koramangala");
    assert_eq!(data[0]["order_count"], 2);
    assert_eq!(data[1]["store_id"], "STORE_004");
}

#[sqlx::test(migrations = "../../migrations")]
async fn zones_fall_back_to_catalog_with_geometry(pool: PgPool) {
    let (status, json) = get_json(test_app(pool), "/api/v1/zones").await;

    assert_eq!(status, StatusCode::OK);
    let data = json["data"].as_array().expect("data array");
    assert_eq!(data.len(), 10);
    assert_eq!(data[0]["zone_id"], "ZONE_001");
    assert_eq!(data[0]["bounding_box"].as_array().map(Vec::len), Some(5));
    assert_eq!(data[0]["coverage_circle"].as_array().map(Vec::len), Some(64));
}

#[sqlx::test(migrations = "../../migrations")]
async fn zones_reject_non_positive_margin(pool: PgPool) {
    let (status, json) = get_json(test_app(pool), "/api/v1/zones?margin=0").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
}

#[sqlx::test(migrations = "../../migrations")]
async fn distance_analysis_filters_by_threshold(pool: PgPool) {
    seed_orders(&pool).await;

    let (status, json) = get_json(
        test_app(pool),
        "/api/v1/analysis/distance?stores=STORE_001&max_km=5",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["mode"], "distance");
    let records = json["data"]["records"].as_array().expect("records");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["order_id"], "ORD_000001");
    assert_eq!(records[0]["distance_km"].as_f64(), Some(0.0));
    assert_eq!(json["data"]["groups"][0]["group"], "STORE_001");
}

#[sqlx::test(migrations = "../../migrations")]
async fn distance_analysis_rejects_unknown_store(pool: PgPool) {
    let (status, json) =
        get_json(test_app(pool), "/api/v1/analysis/distance?stores=STORE_999").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"]["message"]
        .as_str()
        .is_some_and(|m| m.contains("STORE_999")));
}

#[sqlx::test(migrations = "../../migrations")]
async fn containment_analysis_assigns_zones(pool: PgPool) {
    seed_orders(&pool).await;

    let (status, json) = get_json(test_app(pool), "/api/v1/analysis/zones").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["mode"], "containment");
    let records = json["data"]["records"].as_array().expect("records");
    assert_eq!(records.len(), 3);
    let electronic_city = records
        .iter()
        .find(|r| r["order_id"] == "ORD_000003")
        .expect("order present");
    assert_eq!(electronic_city["zone_id"], "ZONE_005");
}

#[sqlx::test(migrations = "../../migrations")]
async fn containment_zone_order_decides_overlap(pool: PgPool) {
    // Koramangala lies in both the CBD and Koramangala boxes.
    seed_orders(&pool).await;
    let app = test_app(pool);

    let (status, json) = get_json(
        app.clone(),
        "/api/v1/analysis/zones?zones=ZONE_001,ZONE_002&matched_only=true",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let records = json["data"]["records"].as_array().expect("records");
    let koramangala = records
        .iter()
        .find(|r| r["order_id"] == "ORD_000001")
        .expect("order present");
    assert_eq!(koramangala["zone_id"], "ZONE_001");

    let (status, json) = get_json(
        app,
        "/api/v1/analysis/zones?zones=ZONE_002,ZONE_001&matched_only=true",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let records = json["data"]["records"].as_array().expect("records");
    let koramangala = records
        .iter()
        .find(|r| r["order_id"] == "ORD_000001")
        .expect("order present");
    assert_eq!(koramangala["zone_id"], "ZONE_002");
}

#[sqlx::test(migrations = "../../migrations")]
async fn containment_rejects_unknown_zone(pool: PgPool) {
    let (status, json) = get_json(test_app(pool), "/api/v1/analysis/zones?zones=ZONE_999").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"]["message"]
        .as_str()
        .is_some_and(|m| m.contains("ZONE_999")));
}

#[sqlx::test(migrations = "../../migrations")]
async fn coverage_analysis_reports_rate_within_window(pool: PgPool) {
    seed_orders(&pool).await;

    let (status, json) = get_json(
        test_app(pool),
        "/api/v1/analysis/coverage?center=central&radius_km=5",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let coverage = &json["data"]["coverage"];
    assert_eq!(coverage["total"], 2);
    assert_eq!(coverage["covered"], 1);
    assert_eq!(coverage["covered_rate"].as_f64(), Some(0.5));
    let records = json["data"]["records"].as_array().expect("records");
    assert_eq!(records[0]["order_id"], "ORD_000002");
    assert_eq!(records[0]["covered"], true);
}

#[sqlx::test(migrations = "../../migrations")]
async fn coverage_without_window_sees_every_order(pool: PgPool) {
    seed_orders(&pool).await;

    let (status, json) = get_json(
        test_app(pool),
        "/api/v1/analysis/coverage?lat=13.0&lon=77.6&radius_km=5&window_deg=0",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["coverage"]["total"], 3);
}

#[sqlx::test(migrations = "../../migrations")]
async fn coverage_rejects_bad_parameters(pool: PgPool) {
    let app = test_app(pool);

    let (status, json) =
        get_json(app.clone(), "/api/v1/analysis/coverage?radius_km=-1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");

    let (status, _) = get_json(app.clone(), "/api/v1/analysis/coverage?center=atlantis").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get_json(app, "/api/v1/analysis/coverage?lat=13.0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
