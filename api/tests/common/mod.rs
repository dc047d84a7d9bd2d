use std::collections::HashMap;
use std::fs::File;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use api::AppState;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use food_trucks::seed::read_permits;
use food_trucks::{BoxFuture, Coordinate, FoodTrucks, GeocodeError, Geocoder};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

pub const BROADWAY_QUERY: &str = "90 BROADWAY, San Francisco, CA";

/// Geocoder answering from a fixed table, or failing every lookup.
pub enum StubGeocoder {
    Table(HashMap<String, Coordinate>),
    TimingOut,
}

impl StubGeocoder {
    pub fn broadway() -> Self {
        StubGeocoder::Table(HashMap::from([(
            BROADWAY_QUERY.to_string(),
            Coordinate::new(37.7992601, -122.3996179),
        )]))
    }
}

pub struct CountingGeocoder {
    pub inner: StubGeocoder,
    pub calls: AtomicUsize,
}

impl Geocoder for CountingGeocoder {
    fn geocode<'a>(
        &'a self,
        address: &'a str,
    ) -> BoxFuture<'a, Result<Option<Coordinate>, GeocodeError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        Box::pin(async move {
            match &self.inner {
                StubGeocoder::Table(table) => Ok(table.get(address).copied()),
                StubGeocoder::TimingOut => Err(GeocodeError::Timeout(Duration::from_secs(10))),
            }
        })
    }
}

pub struct TestApp {
    pub router: Router,
    pub geocoder: Arc<CountingGeocoder>,
}

impl TestApp {
    pub fn geocoder_calls(&self) -> usize {
        self.geocoder.calls.load(Ordering::SeqCst)
    }
}

/// App over an in-memory store, optionally seeded with the fixture permit export.
pub async fn build_test_app(seeded: bool, geocoder: StubGeocoder) -> TestApp {
    let db = food_trucks::open_in_memory().await.unwrap();

    if seeded {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../food-trucks/tests/fixtures/permits.csv");
        let food_trucks = read_permits(File::open(path).unwrap()).unwrap();
        let mut conn = db.acquire().await.unwrap();
        FoodTrucks::insert_bulk(conn.as_mut(), food_trucks).await.unwrap();
    }

    let geocoder = Arc::new(CountingGeocoder {
        inner: geocoder,
        calls: AtomicUsize::new(0),
    });

    let state = AppState {
        db,
        geocoder: geocoder.clone(),
    };

    TestApp {
        router: api::app(state),
        geocoder,
    }
}

pub async fn send(app: &TestApp, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);

    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .router
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, json)
}

pub async fn get(app: &TestApp, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

pub fn sample_payload(location_id: i64, applicant: &str) -> Value {
    serde_json::json!({
        "location_id": location_id,
        "applicant": applicant,
        "facility_type": "Truck",
        "cnn": 1234567,
        "location_description": "Sample location",
        "address": "123 Sample St",
        "blocklot": "1234",
        "block": "123",
        "lot": "456",
        "permit": "123456",
        "status": "approved",
        "food_items": "Sample Food Items",
        "x": 37.12345,
        "y": -122.54321,
        "latitude": 37.12345,
        "longitude": -122.54321,
        "schedule": "Mon-Fri",
        "dayshours": "9AM-5PM",
        "NOISent": "Yes",
        "approved": "Yes",
        "received": "Yes",
        "prior_permit": "No",
        "expiration_date": "2025-01-01",
        "location": "Sample location",
        "fire_prevention_districts": 1,
        "police_districts": 2,
        "supervisor_districts": 3,
        "zip_codes": 12345,
        "neighborhoods_old": 6789,
    })
}
