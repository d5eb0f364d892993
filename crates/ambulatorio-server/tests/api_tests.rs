//! HTTP-level tests driving the router directly.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

use ambulatorio_core::auth::Claims;
use ambulatorio_core::{open_database_in_memory, Site, TokenKeys};
use ambulatorio_server::{app, AppState};

const SECRET: &[u8] = b"api-test-secret";

fn test_app() -> Router {
    let core = open_database_in_memory(TokenKeys::new(SECRET, 24)).unwrap();
    app(AppState::new(core), CorsLayer::permissive())
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn photo_upload(token: &str, fields: &[(&str, &str)]) -> Request<Body> {
    let boundary = "ambulatorio-boundary";
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                boundary, name, value
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"heel.png\"\r\nContent-Type: image/png\r\n\r\n",
            boundary
        )
        .as_bytes(),
    );
    body.extend_from_slice(&[0x89, b'P', b'N', b'G', 1, 2, 3]);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/api/photos")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn login(app: &Router, username: &str) -> String {
    let (status, body) = send(
        app,
        json_request(
            Method::POST,
            "/api/auth/login",
            None,
            json!({ "username": username, "password": "infermiere" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["access_token"].as_str().unwrap().to_string()
}

async fn create_patient(app: &Router, token: &str, site: &str, patient_type: &str) -> String {
    let (status, body) = send(
        app,
        json_request(
            Method::POST,
            "/api/patients",
            Some(token),
            json!({
                "first_name": "Giuseppe",
                "last_name": "Lombardo",
                "patient_type": patient_type,
                "site": site,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["id"].as_str().unwrap().to_string()
}

// =========================================================================
// Auth
// =========================================================================

#[tokio::test]
async fn test_root() {
    let app = test_app();
    let (status, body) = send(&app, get("/api", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Ambulatorio Infermieristico API");
}

#[tokio::test]
async fn test_login_response_shape() {
    let app = test_app();
    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/auth/login",
            None,
            json!({ "username": "G.Domenico", "password": "infermiere" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["user"]["id"], "g_domenico");
    assert_eq!(body["user"]["sites"], json!(["pta_centro"]));
}

#[tokio::test]
async fn test_login_rejects_bad_password() {
    let app = test_app();
    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/auth/login",
            None,
            json!({ "username": "Domenico", "password": "wrong" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = test_app();
    let (status, _) = send(&app, get("/api/auth/me", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = login(&app, "Antonella").await;
    let (status, body) = send(&app, get("/api/auth/me", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "Antonella");
}

#[tokio::test]
async fn test_expired_and_invalid_tokens_are_distinguished() {
    let app = test_app();
    let now = chrono::Utc::now().timestamp();
    let expired = TokenKeys::new(SECRET, 24)
        .sign(&Claims {
            sub: "Domenico".into(),
            sites: vec![Site::PtaCentro],
            iat: now - 90_000,
            exp: now - 3_600,
        })
        .unwrap();

    let (status, body) = send(&app, get("/api/auth/me", Some(&expired))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token expired");

    let (status, body) = send(&app, get("/api/auth/me", Some("garbage"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");
}

// =========================================================================
// Site access
// =========================================================================

#[tokio::test]
async fn test_other_site_is_forbidden() {
    let app = test_app();
    let token = login(&app, "Giovanna").await;

    for uri in [
        "/api/patients?site=villa_ginestre",
        "/api/appointments?site=villa_ginestre",
        "/api/wound-dressing-forms?patient_id=any&site=villa_ginestre",
        "/api/catheter-placement-forms?patient_id=any&site=villa_ginestre",
        "/api/catheter-monthly-logs?patient_id=any&site=villa_ginestre",
        "/api/photos?patient_id=any&site=villa_ginestre",
        "/api/documents?site=villa_ginestre",
        "/api/statistics?site=villa_ginestre&year=2026",
        "/api/statistics/compare?site=villa_ginestre&year1=2026&year2=2025",
    ] {
        let (status, body) = send(&app, get(uri, Some(&token))).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{}", uri);
        assert_eq!(body["status"], "error");
    }
}

#[tokio::test]
async fn test_other_site_records_are_forbidden() {
    let app = test_app();
    let both = login(&app, "Domenico").await;
    let centro = login(&app, "Giovanna").await;
    let patient_id = create_patient(&app, &both, "villa_ginestre", "PICC").await;

    let appointment = json!({
        "patient_id": patient_id,
        "site": "villa_ginestre",
        "date": "2026-03-02",
        "time": "10:00",
        "category": "PICC",
        "services": ["picc_medication"],
    });
    let placement = json!({
        "patient_id": patient_id,
        "site": "villa_ginestre",
        "placed_on": "2026-03-02",
        "catheter_type": "PICC",
        "insertion_site": "braccio destro",
    });
    let log = json!({
        "patient_id": patient_id,
        "site": "villa_ginestre",
        "month": "2026-03",
    });
    let photo_fields = [
        ("patient_id", patient_id.as_str()),
        ("site", "villa_ginestre"),
        ("category", "PICC"),
        ("date", "2026-03-02"),
    ];

    let mut ids = Vec::new();
    for (uri, body) in [
        ("/api/appointments", &appointment),
        ("/api/catheter-placement-forms", &placement),
        ("/api/catheter-monthly-logs", &log),
    ] {
        let (status, created) =
            send(&app, json_request(Method::POST, uri, Some(&both), body.clone())).await;
        assert_eq!(status, StatusCode::CREATED, "{}: {}", uri, created);
        ids.push(created["id"].as_str().unwrap().to_string());

        let (status, _) =
            send(&app, json_request(Method::POST, uri, Some(&centro), body.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "POST {}", uri);
    }
    let (status, receipt) = send(&app, photo_upload(&both, &photo_fields)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", receipt);
    let photo_id = receipt["id"].as_str().unwrap().to_string();
    let (status, _) = send(&app, photo_upload(&centro, &photo_fields)).await;
    assert_eq!(status, StatusCode::FORBIDDEN, "POST /api/photos");

    let appointment_uri = format!("/api/appointments/{}", ids[0]);
    let photo_uri = format!("/api/photos/{}", photo_id);
    for uri in [
        format!("/api/catheter-placement-forms/{}", ids[1]),
        format!("/api/catheter-monthly-logs/{}", ids[2]),
        photo_uri.clone(),
    ] {
        let (status, _) = send(&app, get(&uri, Some(&centro))).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "GET {}", uri);
    }

    let (status, _) = send(
        &app,
        json_request(Method::PUT, &appointment_uri, Some(&centro), json!({ "notes": "moved" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    for uri in [&appointment_uri, &photo_uri] {
        let (status, _) =
            send(&app, json_request(Method::DELETE, uri, Some(&centro), json!({}))).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "DELETE {}", uri);
        let (status, _) = send(&app, get(&photo_uri, Some(&both))).await;
        assert_eq!(status, StatusCode::OK);
    }

    // Wound forms are MED only, so they are exercised at the centre.
    let centro_patient = create_patient(&app, &both, "pta_centro", "MED").await;
    let (status, form) = send(
        &app,
        json_request(
            Method::POST,
            "/api/wound-dressing-forms",
            Some(&both),
            json!({
                "patient_id": centro_patient,
                "site": "pta_centro",
                "compiled_on": "2026-03-02",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", form);
    let villa_only = TokenKeys::new(SECRET, 24)
        .issue("Domenico", &[Site::VillaGinestre])
        .unwrap();
    let uri = format!("/api/wound-dressing-forms/{}", form["id"].as_str().unwrap());
    let (status, _) = send(&app, get(&uri, Some(&villa_only))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_patient_lifecycle() {
    let app = test_app();
    let both = login(&app, "Domenico").await;
    let centro = login(&app, "Oriana").await;

    let id = create_patient(&app, &both, "villa_ginestre", "PICC").await;
    let uri = format!("/api/patients/{}", id);

    let (status, _) = send(&app, get(&uri, Some(&centro))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        json_request(Method::PUT, &uri, Some(&both), json!({ "status": "suspended", "suspend_notes": "hospitalised" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "suspended");
    assert_eq!(body["last_name"], "Lombardo");

    let (status, _) = send(&app, json_request(Method::DELETE, &uri, Some(&both), Value::Null)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, get(&uri, Some(&both))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_restricted_site_rejects_med_patient() {
    let app = test_app();
    let token = login(&app, "Domenico").await;
    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            "/api/patients",
            Some(&token),
            json!({
                "first_name": "Anna",
                "last_name": "Greco",
                "patient_type": "MED",
                "site": "villa_ginestre",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =========================================================================
// Appointments & forms
// =========================================================================

#[tokio::test]
async fn test_slot_capacity() {
    let app = test_app();
    let token = login(&app, "Giovanna").await;
    let patient_id = create_patient(&app, &token, "pta_centro", "MED").await;

    let booking = json!({
        "patient_id": patient_id,
        "site": "pta_centro",
        "date": "2026-03-02",
        "time": "11:00",
        "category": "MED",
        "services": ["simple_dressing"],
    });

    for _ in 0..2 {
        let (status, _) = send(
            &app,
            json_request(Method::POST, "/api/appointments", Some(&token), booking.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/appointments", Some(&token), booking),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");

    let (status, body) = send(
        &app,
        get("/api/appointments?site=pta_centro&date=2026-03-02", Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[0]["patient_last_name"], "Lombardo");
}

#[tokio::test]
async fn test_monthly_log_is_unique_per_month() {
    let app = test_app();
    let token = login(&app, "Antonella").await;
    let patient_id = create_patient(&app, &token, "villa_ginestre", "PICC").await;

    let log = json!({
        "patient_id": patient_id,
        "site": "villa_ginestre",
        "month": "2026-06",
        "days": { "3": { "flush": true, "dressing_change": false } },
    });

    let (status, created) = send(
        &app,
        json_request(Method::POST, "/api/catheter-monthly-logs", Some(&token), log.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["days"]["3"]["flush"], true);

    let (status, _) = send(
        &app,
        json_request(Method::POST, "/api/catheter-monthly-logs", Some(&token), log),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!(
        "/api/catheter-monthly-logs?patient_id={}&site=villa_ginestre&month=2026-06",
        patient_id
    );
    let (status, body) = send(&app, get(&uri, Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_wound_form_defaults_dressing_text() {
    let app = test_app();
    let token = login(&app, "Giovanna").await;
    let patient_id = create_patient(&app, &token, "pta_centro", "MED").await;

    let (status, form) = send(
        &app,
        json_request(
            Method::POST,
            "/api/wound-dressing-forms",
            Some(&token),
            json!({
                "patient_id": patient_id,
                "site": "pta_centro",
                "compiled_on": "2026-02-10",
                "wound_bed": ["granulating"],
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(form["dressing"].as_str().unwrap().contains("Wound Hygiene"));

    let uri = format!("/api/wound-dressing-forms/{}", form["id"].as_str().unwrap());
    let (status, fetched) = send(&app, get(&uri, Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, form);
}

// =========================================================================
// Photos
// =========================================================================

#[tokio::test]
async fn test_photo_upload_round_trip() {
    let app = test_app();
    let token = login(&app, "Giovanna").await;
    let patient_id = create_patient(&app, &token, "pta_centro", "MED").await;

    let request = photo_upload(
        &token,
        &[
            ("patient_id", patient_id.as_str()),
            ("site", "pta_centro"),
            ("category", "MED"),
            ("date", "2026-02-10"),
            ("description", "heel ulcer"),
        ],
    );

    let (status, receipt) = send(&app, request).await;
    assert_eq!(status, StatusCode::CREATED, "{}", receipt);
    let photo_id = receipt["id"].as_str().unwrap();

    let (status, photo) = send(&app, get(&format!("/api/photos/{}", photo_id), Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(photo["content_type"], "image/png");
    assert_eq!(photo["image_data"], "iVBORwECAw==");
    assert_eq!(photo["sha256"], receipt["sha256"]);
}

// =========================================================================
// Statistics, documents, calendar
// =========================================================================

#[tokio::test]
async fn test_statistics_empty_and_restricted() {
    let app = test_app();
    let token = login(&app, "Domenico").await;

    let (status, body) = send(
        &app,
        get("/api/statistics?site=pta_centro&year=2026&month=12", Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["visits"], 0);
    assert_eq!(body["unique_patients"], 0);
    assert_eq!(body["services"], json!({}));

    let (status, _) = send(
        &app,
        get("/api/statistics?site=villa_ginestre&year=2026&category=MED", Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        get("/api/statistics?site=pta_centro&year=2026&month=13", Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_compare_with_itself_is_zero() {
    let app = test_app();
    let token = login(&app, "Giovanna").await;
    let patient_id = create_patient(&app, &token, "pta_centro", "MED").await;
    send(
        &app,
        json_request(
            Method::POST,
            "/api/appointments",
            Some(&token),
            json!({
                "patient_id": patient_id,
                "site": "pta_centro",
                "date": "2026-04-14",
                "time": "09:30",
                "category": "MED",
                "services": ["bandage"],
            }),
        ),
    )
    .await;

    let (status, body) = send(
        &app,
        get(
            "/api/statistics/compare?site=pta_centro&year1=2026&month1=4&month2=4",
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["period1"]["visits"], 1);
    assert_eq!(body["differences"]["visits"], 0);
    assert_eq!(body["differences"]["services"]["bandage"], 0);
}

#[tokio::test]
async fn test_documents_filtered_for_restricted_site() {
    let app = test_app();
    let token = login(&app, "Domenico").await;
    let (status, body) = send(&app, get("/api/documents?site=villa_ginestre", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    let docs = body.as_array().unwrap();
    assert_eq!(docs.len(), 6);
    assert!(docs.iter().all(|d| d["category"] == "PICC"));
}

#[tokio::test]
async fn test_calendar_is_public() {
    let app = test_app();

    let (status, slots) = send(&app, get("/api/calendar/slots", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(slots["morning"][0], "08:30");
    assert_eq!(slots["all"].as_array().unwrap().len(), 13);

    let (status, holidays) = send(&app, get("/api/calendar/holidays?year=2026", None)).await;
    assert_eq!(status, StatusCode::OK);
    let days = holidays.as_array().unwrap();
    assert_eq!(days.len(), 13);
    assert!(days.contains(&json!("2026-04-05")));
    assert!(days.contains(&json!("2026-04-06")));
}
