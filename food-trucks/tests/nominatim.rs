use std::collections::HashMap;
use std::time::Duration;

use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use food_trucks::{Coordinate, GeocodeError, Geocoder, NominatimClient};
use serde_json::json;

async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    format!("http://{addr}")
}

async fn search(Query(params): Query<HashMap<String, String>>, headers: HeaderMap) -> impl IntoResponse {
    assert_eq!(params.get("format").map(String::as_str), Some("jsonv2"));
    assert_eq!(params.get("limit").map(String::as_str), Some("1"));

    let agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if agent != "address_finder" {
        return (StatusCode::FORBIDDEN, Json(json!([])));
    }

    match params.get("q").map(String::as_str) {
        Some("90 BROADWAY, San Francisco, CA") => (
            StatusCode::OK,
            Json(json!([{
                "lat": "37.7992601",
                "lon": "-122.3996179",
                "display_name": "90, Broadway, Financial District, San Francisco"
            }])),
        ),
        Some("Garbled") => (StatusCode::OK, Json(json!([{ "lat": "north", "lon": "west" }]))),
        _ => (StatusCode::OK, Json(json!([]))),
    }
}

fn client(url: &str, timeout: Duration) -> NominatimClient {
    NominatimClient::new(url, "address_finder", timeout).unwrap()
}

#[tokio::test]
async fn resolves_known_address() {
    let url = spawn_server(Router::new().route("/search", get(search))).await;

    let coordinate = client(&url, Duration::from_secs(5))
        .geocode("90 BROADWAY, San Francisco, CA")
        .await
        .unwrap();

    assert_eq!(coordinate, Some(Coordinate::new(37.7992601, -122.3996179)));
}

#[tokio::test]
async fn unknown_address_is_none() {
    let url = spawn_server(Router::new().route("/search", get(search))).await;

    let coordinate = client(&format!("{url}/"), Duration::from_secs(5))
        .geocode("1 Nowhere Lane, Atlantis")
        .await
        .unwrap();

    assert!(coordinate.is_none());
}

#[tokio::test]
async fn unreadable_coordinate_is_a_decode_error() {
    let url = spawn_server(Router::new().route("/search", get(search))).await;

    let err = client(&url, Duration::from_secs(5))
        .geocode("Garbled")
        .await
        .unwrap_err();

    assert!(matches!(err, GeocodeError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let router = Router::new().route("/search", get(|| async { "<html>maintenance</html>" }));
    let url = spawn_server(router).await;

    let err = client(&url, Duration::from_secs(5))
        .geocode("90 BROADWAY, San Francisco, CA")
        .await
        .unwrap_err();

    assert!(matches!(err, GeocodeError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn error_status_is_reported() {
    let router = Router::new().route(
        "/search",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "overloaded") }),
    );
    let url = spawn_server(router).await;

    let err = client(&url, Duration::from_secs(5))
        .geocode("90 BROADWAY, San Francisco, CA")
        .await
        .unwrap_err();

    assert!(
        matches!(err, GeocodeError::Status(status) if status == StatusCode::SERVICE_UNAVAILABLE),
        "got {err:?}"
    );
}

#[tokio::test]
async fn slow_service_times_out() {
    let router = Router::new().route(
        "/search",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!([]))
        }),
    );
    let url = spawn_server(router).await;

    let err = client(&url, Duration::from_millis(100))
        .geocode("90 BROADWAY, San Francisco, CA")
        .await
        .unwrap_err();

    assert!(matches!(err, GeocodeError::Timeout(_)), "got {err:?}");
}
