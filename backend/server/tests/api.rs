use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Json, Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::post,
};
use bank::{
    DatasetIndex,
    cars::{CarRecord, Dataset},
};
use parking_lot::Mutex;
use serde_json::{Value, json};
use server::{
    config::{Config, StoreKind},
    database::{MemoryStore, PredictionStore, StoreError},
    gateway::PredictionClient,
    models::PredictionRecord,
    router,
    routes::PERSISTENCE_WARNING,
    state::AppState,
};
use tokio::net::TcpListener;
use tower::ServiceExt;

struct FailingStore;

#[async_trait]
impl PredictionStore for FailingStore {
    async fn append(&self, _record: &PredictionRecord) -> Result<(), StoreError> {
        Err(StoreError::Unavailable)
    }
}

fn car(company: &str, name: &str, year: i32, fuel_type: &str) -> CarRecord {
    CarRecord {
        company: company.to_string(),
        name: name.to_string(),
        year,
        fuel_type: fuel_type.to_string(),
    }
}

fn dataset() -> Dataset {
    Dataset::new(vec![
        car("Maruti", "Swift", 2015, "Petrol"),
        car("Maruti", "Alto", 2018, "Petrol"),
        car("Land Rover", "Defender", 2019, "Diesel"),
    ])
}

fn state(index: DatasetIndex, model_url: &str, store: Arc<dyn PredictionStore>) -> Arc<AppState> {
    let config = Config {
        model_url: model_url.to_string(),
        store: StoreKind::Memory,
        ..Config::default()
    };

    Arc::new(AppState {
        gateway: PredictionClient::new(&config.model_url),
        config,
        dataset: Arc::new(index),
        store,
    })
}

/// Stub model service answering every prediction with `reply`, recording the payloads it saw.
async fn spawn_model_service(reply: Response) -> (String, Arc<Mutex<Vec<Value>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let reply = Arc::new(Mutex::new(Some(reply)));

    let recorder = seen.clone();
    let app = Router::new().route(
        "/predict",
        post(move |Json(payload): Json<Value>| {
            let recorder = recorder.clone();
            let reply = reply.clone();
            async move {
                recorder.lock().push(payload);
                reply
                    .lock()
                    .take()
                    .unwrap_or_else(|| StatusCode::GONE.into_response())
            }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{address}"), seen)
}

async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    format!("http://{address}")
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    read(response).await
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    read(response).await
}

async fn read(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    (status, serde_json::from_slice(&bytes).unwrap())
}

fn prediction_body() -> Value {
    json!({
        "company": "Maruti",
        "model": "Swift",
        "year": "2015",
        "fuelType": "Petrol",
        "kilometers": "45000",
    })
}

#[tokio::test]
async fn test_dropdowns_scenario() {
    let app = router(state(
        DatasetIndex::ready(dataset()),
        "http://127.0.0.1:1",
        Arc::new(MemoryStore::new()),
    ));

    let (status, companies) = get(app.clone(), "/api/companies").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(companies, json!(["Select Company", "Land Rover", "Maruti"]));

    let (_, models) = get(app.clone(), "/api/models/Maruti").await;
    assert_eq!(models, json!(["Alto", "Swift"]));

    let (_, models) = get(app.clone(), "/api/models/Land%20Rover").await;
    assert_eq!(models, json!(["Defender"]));

    let (status, models) = get(app.clone(), "/api/models/Tesla").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(models, json!([]));

    let (_, years) = get(app.clone(), "/api/years").await;
    assert_eq!(years, json!([2019, 2018, 2015]));

    let (_, fuel_types) = get(app, "/api/fuel-types").await;
    assert_eq!(fuel_types, json!(["Diesel", "Petrol"]));
}

#[tokio::test]
async fn test_dropdowns_before_load() {
    let app = router(state(
        DatasetIndex::new(),
        "http://127.0.0.1:1",
        Arc::new(MemoryStore::new()),
    ));

    for uri in [
        "/api/companies",
        "/api/models/Maruti",
        "/api/years",
        "/api/fuel-types",
    ] {
        let (status, body) = get(app.clone(), uri).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(body, json!({ "error": "Car data not available" }), "{uri}");
    }
}

#[tokio::test]
async fn test_companies_empty_dataset() {
    let app = router(state(
        DatasetIndex::ready(Dataset::default()),
        "http://127.0.0.1:1",
        Arc::new(MemoryStore::new()),
    ));

    let (status, body) = get(app, "/api/companies").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Car data not available");
}

#[tokio::test]
async fn test_predict_round_trip() {
    let (model_url, seen) = spawn_model_service(Json(json!(412345.67)).into_response()).await;
    let store = Arc::new(MemoryStore::new());
    let app = router(state(DatasetIndex::ready(dataset()), &model_url, store.clone()));

    let (status, body) = post_json(app, "/api/predict", prediction_body()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "predictedPrice": 412345.67 }));

    assert_eq!(
        seen.lock().clone(),
        vec![json!({
            "company": "Maruti",
            "car_models": "Swift",
            "year": 2015,
            "fuel_type": "Petrol",
            "kilo_driven": 45000,
        })]
    );

    let records = store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].predicted_price, 412345.67);
    assert_eq!(records[0].company, "Maruti");
    assert_eq!(records[0].model, "Swift");
    assert_eq!(records[0].year, 2015);
    assert_eq!(records[0].fuel_type, "Petrol");
    assert_eq!(records[0].kilometers, 45000);
}

#[tokio::test]
async fn test_predict_upstream_unreachable() {
    let store = Arc::new(MemoryStore::new());
    let app = router(state(
        DatasetIndex::ready(dataset()),
        &unreachable_url().await,
        store.clone(),
    ));

    let (status, body) = post_json(app, "/api/predict", prediction_body()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Error predicting price" }));
    assert!(store.records().is_empty());
}

#[tokio::test]
async fn test_predict_upstream_rejects() {
    let reply = (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "unknown model" })),
    )
        .into_response();
    let (model_url, _) = spawn_model_service(reply).await;
    let store = Arc::new(MemoryStore::new());
    let app = router(state(DatasetIndex::ready(dataset()), &model_url, store.clone()));

    let (status, body) = post_json(app, "/api/predict", prediction_body()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Error predicting price" }));
    assert!(store.records().is_empty());
}

#[tokio::test]
async fn test_predict_upstream_malformed() {
    let (model_url, _) = spawn_model_service(Json(json!({ "price": 1 })).into_response()).await;
    let store = Arc::new(MemoryStore::new());
    let app = router(state(DatasetIndex::ready(dataset()), &model_url, store.clone()));

    let (status, body) = post_json(app, "/api/predict", prediction_body()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Error predicting price");
    assert!(store.records().is_empty());
}

#[tokio::test]
async fn test_predict_store_failure_still_returns_price() {
    let (model_url, _) = spawn_model_service(Json(json!(99000.0)).into_response()).await;
    let app = router(state(
        DatasetIndex::ready(dataset()),
        &model_url,
        Arc::new(FailingStore),
    ));

    let (status, body) = post_json(app, "/api/predict", prediction_body()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "predictedPrice": 99000.0, "warning": PERSISTENCE_WARNING })
    );
}

#[tokio::test]
async fn test_predict_malformed_payload() {
    let (model_url, seen) = spawn_model_service(Json(json!(1.0)).into_response()).await;
    let store = Arc::new(MemoryStore::new());
    let app = router(state(DatasetIndex::ready(dataset()), &model_url, store.clone()));

    let mut body = prediction_body();
    body["model"] = json!("");

    let (status, response) = post_json(app, "/api/predict", body).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response, json!({ "error": "Malformed payload: model is required" }));
    assert!(seen.lock().is_empty());
    assert!(store.records().is_empty());
}
