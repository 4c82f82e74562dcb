/// HTTP API tests
///
/// Requests go through the full router (tracing and CORS layers included)
/// with the artifacts shipped in `artifacts/`.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use loan_fraud_predictor::{
    api::{build_router, AppState},
    config::{ArtifactsConfig, CoverageMode},
    ml::FraudPredictor,
};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt;

fn test_router() -> Router {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let config = ArtifactsConfig {
        model_path: root.join("artifacts/model.json"),
        feature_columns_path: root.join("artifacts/feature_columns.json"),
        categorical_coverage: CoverageMode::Strict,
    };
    let predictor = FraudPredictor::load(&config).unwrap();
    build_router(AppState::new(Arc::new(predictor)))
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let (status, body) = send(test_router(), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model"], "loan-fraud-logreg");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_predict_default_form() {
    let (status, body) = send(test_router(), post_json("/v1/predict", "{}".to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["verdict"], "legitimate");
    let probability = body["fraud_probability"].as_f64().unwrap();
    assert!((0.0..0.5).contains(&probability));
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Loan Looks Legitimate. Probability of Fraud: "));
    assert_eq!(body["derived"]["age_group"], "Mid-Age");
    assert_eq!(body["derived"]["high_intl_txn"], 0);
    assert!(body["request_id"].is_string());
}

#[tokio::test]
async fn test_predict_derives_features_from_form() {
    let form = json!({
        "loan_amount_requested": 100000.0,
        "monthly_income": 20000.0,
        "existing_emis_monthly": 5000.0,
        "interest_rate_offered": 15.0,
        "applicant_age": 28,
        "intl_txn_ratio": 0.5,
        "loan_type": "Personal Loan",
        "employment_status": "Self-Employed",
        "property_ownership_status": "Owned",
        "gender": "Female",
        "purpose_of_loan": "Vehicle"
    });

    let (status, body) = send(test_router(), post_json("/v1/predict", form.to_string())).await;

    assert_eq!(status, StatusCode::OK);
    let derived = &body["derived"];
    let close = |value: &Value, expected: f64| (value.as_f64().unwrap() - expected).abs() < 1e-9;
    assert!(close(&derived["loan_to_income_ratio"], 100000.0 / 20001.0));
    assert!(close(&derived["emi_to_income_ratio"], 5000.0 / 20001.0));
    assert!(close(&derived["interest_burden"], 15.0 * 100000.0 / 20001.0));
    assert_eq!(derived["high_intl_txn"], 1);
    assert_eq!(derived["age_group"], "Young");
}

#[tokio::test]
async fn test_predict_rejects_out_of_range_field() {
    let form = json!({ "intl_txn_ratio": 1.5 });

    let (status, body) = send(test_router(), post_json("/v1/predict", form.to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["status"], 400);
}

#[tokio::test]
async fn test_predict_rejects_unknown_category() {
    let form = json!({ "loan_type": "Mortgage Loan" });

    let (status, body) = send(test_router(), post_json("/v1/predict", form.to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "UNKNOWN_CATEGORY");
    assert_eq!(body["error"]["status"], 400);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Mortgage Loan"));
}

#[tokio::test]
async fn test_predict_rejects_malformed_json() {
    let (status, body) = send(
        test_router(),
        post_json("/v1/predict", "{\"loan_amount_requested\": ".to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_predict_rejects_wrongly_typed_field() {
    let form = json!({ "applicant_age": "thirty" });

    let (status, body) = send(test_router(), post_json("/v1/predict", form.to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_predict_requires_json_content_type() {
    let request = Request::builder()
        .method("POST")
        .uri("/v1/predict")
        .body(Body::from("{}"))
        .unwrap();

    let (status, body) = send(test_router(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_schema_endpoint() {
    let (status, body) = send(test_router(), get("/v1/schema")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model"]["name"], "loan-fraud-logreg");
    assert_eq!(body["model_type"], "logistic_regression");
    assert_eq!(body["n_features"], 38);
    assert_eq!(body["feature_names"].as_array().unwrap().len(), 38);
    assert_eq!(body["feature_names"][0], "loan_amount_requested");
    assert!(body["coverage"]["missing"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_options_endpoint() {
    let (status, body) = send(test_router(), get("/v1/options")).await;

    assert_eq!(status, StatusCode::OK);
    let attributes = body.as_array().unwrap();
    assert_eq!(attributes.len(), 6);
    assert_eq!(attributes[0]["attribute"], "loan_type");
    assert_eq!(
        attributes[0]["options"],
        json!(["Business Loan", "Car Loan", "Education Loan", "Personal Loan"])
    );
    assert_eq!(attributes[0]["feature_names"][1], "loan_type_Car Loan");
    assert_eq!(attributes[5]["attribute"], "age_group");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (status, _) = send(test_router(), get("/v1/unknown")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
