//! # API REST
//!
//! REST API implementation for the hospital patient service.
//!
//! Handles:
//! - HTTP endpoints with axum under `/api/v1`
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, API-key checks)
//!
//! Uses `api-shared` for request and response types and `hps-core` for everything else.

#![warn(rust_2018_idioms)]

mod handlers;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, patch},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::auth::{api_key_from_env_value, validate_api_key, API_KEY_HEADER};
use hps_core::PatientService;

/// Application state shared across REST API handlers.
#[derive(Clone)]
pub struct AppState {
    patient_service: PatientService,
    api_key: Option<Arc<str>>,
}

impl AppState {
    /// When `api_key` is `Some`, every `/api/v1` route requires a matching `x-api-key`
    /// header. Blank keys are treated as unset.
    pub fn new(patient_service: PatientService, api_key: Option<String>) -> Self {
        Self {
            patient_service,
            api_key: api_key_from_env_value(api_key).map(|k| Arc::from(k.as_str())),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::list_patients,
        handlers::create_patient,
        handlers::get_patient,
        handlers::update_patient,
        handlers::set_status,
        handlers::potential_duplicates,
    ),
    components(schemas(
        api_shared::HealthRes,
        api_shared::PatientSummary,
        api_shared::PatientSummaryPage,
        api_shared::PatientResponse,
        api_shared::PatientDetailsReq,
        api_shared::StatusReq,
    ))
)]
pub struct ApiDoc;

/// Build the REST router: `/health`, the `/api/v1/patients` resource, and Swagger UI.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/patients",
            get(handlers::list_patients).post(handlers::create_patient),
        )
        .route(
            "/patients/:id",
            get(handlers::get_patient).put(handlers::update_patient),
        )
        .route("/patients/:id/status", patch(handlers::set_status))
        .route(
            "/patients/:id/potential-duplicates",
            get(handlers::potential_duplicates),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/v1", api)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn require_api_key(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, (StatusCode, &'static str)> {
    if let Some(expected) = state.api_key.as_deref() {
        let provided = req
            .headers()
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok());
        if let Err(e) = validate_api_key(provided, expected) {
            tracing::warn!("Rejected {} {}: {}", req.method(), req.uri().path(), e);
            return Err((StatusCode::UNAUTHORIZED, "Unauthorized"));
        }
    }
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use http_body_util::BodyExt;
    use hps_core::InMemoryPatientStore;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app(api_key: Option<&str>) -> Router {
        let service = PatientService::new(Arc::new(InMemoryPatientStore::new()));
        router(AppState::new(service, api_key.map(String::from)))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };

        let res = app
            .clone()
            .oneshot(req.body(body).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn patient_json(first: &str, last: &str, dob: &str, phone: Option<&str>) -> Value {
        json!({
            "firstName": first,
            "lastName": last,
            "dateOfBirth": dob,
            "gender": "MALE",
            "phoneNumber": phone,
        })
    }

    async fn create(app: &Router, body: Value) -> Value {
        let (status, created) = send(app, Method::POST, "/api/v1/patients", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        created
    }

    #[tokio::test]
    async fn health_is_open() {
        let app = app(Some("secret"));
        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["message"], "HPS is alive");
    }

    #[tokio::test]
    async fn blank_api_key_leaves_routes_open() {
        let app = app(Some("   "));
        let (status, _) = send(&app, Method::GET, "/api/v1/patients", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn create_then_get_patient() {
        let app = app(None);
        let created = create(
            &app,
            patient_json("Jonathan", "Williams", "1985-06-15", Some("555-987-1111")),
        )
        .await;
        assert_eq!(created["status"], "ACTIVE");
        assert_eq!(created["duplicatePhoneWarning"], false);

        let id = created["patientId"].as_str().unwrap();
        let (status, fetched) = send(&app, Method::GET, &format!("/api/v1/patients/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["firstName"], "Jonathan");
        assert_eq!(fetched["phoneNumber"], "5559871111");
    }

    #[tokio::test]
    async fn create_rejects_invalid_details() {
        let app = app(None);
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/patients",
            Some(patient_json("Jonathan", "Williams", "2999-01-01", None)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn duplicate_phone_is_flagged_on_create() {
        let app = app(None);
        create(&app, patient_json("Jonathan", "Williams", "1985-06-15", Some("555-987-1111"))).await;
        let second = create(&app, patient_json("Dupe", "PhoneTest", "1990-01-01", Some("5559871111"))).await;
        assert_eq!(second["duplicatePhoneWarning"], true);
    }

    #[tokio::test]
    async fn unknown_and_malformed_ids() {
        let app = app(None);
        let (status, _) = send(
            &app,
            Method::GET,
            "/api/v1/patients/00000000000000000000000000000000/potential-duplicates",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::GET, "/api/v1/patients/not-an-id", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn potential_duplicates_report_confidence() {
        let app = app(None);
        let subject = create(&app, patient_json("Jonathan", "Williams", "1985-06-15", Some("555-987-1111"))).await;
        create(&app, patient_json("Dupe", "PhoneTest", "1990-01-01", Some("555-987-1111"))).await;
        create(&app, patient_json("Johnathan", "Wylliams", "1985-02-02", None)).await;
        create(&app, patient_json("Xavier", "Quintero", "1962-12-01", None)).await;

        let id = subject["patientId"].as_str().unwrap();
        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/api/v1/patients/{id}/potential-duplicates"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r["patientId"] != id));

        let confidence_of = |last: &str| {
            rows.iter()
                .find(|r| r["lastName"] == last)
                .map(|r| r["matchConfidence"].clone())
        };
        assert_eq!(confidence_of("PhoneTest"), Some(json!("HIGH")));
        assert_eq!(confidence_of("Wylliams"), Some(json!("MEDIUM")));
    }

    #[tokio::test]
    async fn deactivated_patient_drops_out_of_duplicates() {
        let app = app(None);
        let subject = create(&app, patient_json("Maria", "Garcia", "1970-02-01", None)).await;
        let twin = create(&app, patient_json("Maria", "Garcia", "1970-05-05", None)).await;
        let subject_id = subject["patientId"].as_str().unwrap();
        let twin_id = twin["patientId"].as_str().unwrap();

        let (status, body) = send(
            &app,
            Method::PATCH,
            &format!("/api/v1/patients/{twin_id}/status"),
            Some(json!({"status": "INACTIVE"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "INACTIVE");

        let (_, body) = send(
            &app,
            Method::GET,
            &format!("/api/v1/patients/{subject_id}/potential-duplicates"),
            None,
        )
        .await;
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn update_replaces_details() {
        let app = app(None);
        let created = create(&app, patient_json("Alice", "Smith", "1990-01-15", None)).await;
        let id = created["patientId"].as_str().unwrap();

        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/api/v1/patients/{id}"),
            Some(patient_json("Alicia", "Smith", "1990-01-15", Some("555-123-4567"))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["patientId"], id);
        assert_eq!(body["firstName"], "Alicia");
        assert_eq!(body["phoneNumber"], "5551234567");
    }

    #[tokio::test]
    async fn list_filters_and_sorts() {
        let app = app(None);
        create(&app, patient_json("Bob", "Jones", "1975-06-20", None)).await;
        create(&app, patient_json("Alice", "Adams", "1990-01-15", None)).await;

        let (status, body) = send(&app, Method::GET, "/api/v1/patients", None).await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<_> = body["content"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["lastName"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["Adams", "Jones"]);
        assert_eq!(body["totalElements"], 2);

        let (_, body) = send(&app, Method::GET, "/api/v1/patients?birthYearFrom=1980", None).await;
        assert_eq!(body["content"].as_array().unwrap().len(), 1);

        let (status, _) = send(&app, Method::GET, "/api/v1/patients?status=deleted", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn list_pages_and_filters_on_medical_fields() {
        let app = app(None);
        for last in ["Adams", "Baker", "Clark"] {
            create(&app, patient_json("Pat", last, "1980-01-01", None)).await;
        }
        let mut allergic = patient_json("Dana", "Evans", "1980-01-01", None);
        allergic["knownAllergies"] = json!("Penicillin");
        allergic["city"] = json!("Springfield");
        create(&app, allergic).await;

        let (status, body) = send(&app, Method::GET, "/api/v1/patients?page=1&size=2", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["number"], 1);
        assert_eq!(body["size"], 2);
        assert_eq!(body["totalElements"], 4);
        assert_eq!(body["totalPages"], 2);
        assert_eq!(body["content"][0]["lastName"], "Clark");

        let (_, body) = send(
            &app,
            Method::GET,
            "/api/v1/patients?hasAllergies=true&city=spring",
            None,
        )
        .await;
        assert_eq!(body["totalElements"], 1);
        assert_eq!(body["content"][0]["lastName"], "Evans");

        let (status, _) = send(&app, Method::GET, "/api/v1/patients?size=0", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_returns_mrn_and_extended_fields() {
        let app = app(None);
        let mut body = patient_json("Jonathan", "Williams", "1985-06-15", Some("555-987-1111"));
        body["emergencyContactName"] = json!("Mary Williams");
        body["emergencyContactPhone"] = json!("(555) 987-2222");
        body["bloodGroup"] = json!("O+");
        let created = create(&app, body).await;

        assert!(created["mrn"].as_str().unwrap().starts_with("MRN"));
        assert_eq!(created["emergencyContactPhone"], "5559872222");
        assert_eq!(created["bloodGroup"], "O+");
        assert_eq!(created["hasAllergies"], false);
        assert!(created["registeredAt"].is_string());

        let mut bad = patient_json("Jonathan", "Williams", "1985-06-15", None);
        bad["emergencyContactPhone"] = json!("no digits");
        let (status, _) = send(&app, Method::POST, "/api/v1/patients", Some(bad)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn api_key_is_enforced_when_configured() {
        let app = app(Some("secret"));
        let (status, _) = send(&app, Method::GET, "/api/v1/patients", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let req = Request::builder()
            .uri("/api/v1/patients")
            .header(API_KEY_HEADER, "wrong")
            .body(Body::empty())
            .unwrap();
        assert_eq!(
            app.clone().oneshot(req).await.unwrap().status(),
            StatusCode::UNAUTHORIZED
        );

        let req = Request::builder()
            .uri("/api/v1/patients")
            .header(API_KEY_HEADER, "secret")
            .body(Body::empty())
            .unwrap();
        assert_eq!(app.oneshot(req).await.unwrap().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let app = app(None);
        let (status, body) = send(&app, Method::GET, "/api-docs/openapi.json", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]
            .get("/api/v1/patients/{id}/potential-duplicates")
            .is_some());
    }
}
