//! HTTP tests for the EVP API over the in-memory adapter

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use core_kernel::UserId;
use domain_evp::{InMemorySubmissionPort, ValidationService};
use interface_api::auth::create_token;
use interface_api::config::{ApiConfig, StorageBackend};
use interface_api::create_router;

const SECRET: &str = "api-test-secret";

fn app() -> Router {
    let config = ApiConfig {
        jwt_secret: SECRET.to_string(),
        storage: StorageBackend::Memory,
        ..ApiConfig::default()
    };
    let service = ValidationService::new(Arc::new(InMemorySubmissionPort::new()));
    create_router(service, config)
}

fn token(role: &str) -> String {
    create_token(&UserId::new().to_string(), vec![role.to_string()], SECRET, 3600).unwrap()
}

fn request(method: &str, uri: &str, role: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(role) = role {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token(role)));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Opens a submission with the given `(track_type, amount)` pairs, returns its id
async fn open(app: &Router, tracks: &[(&str, &str)]) -> String {
    let tracks: Vec<Value> = tracks
        .iter()
        .map(|(track_type, amount)| json!({ "track_type": track_type, "amount": amount }))
        .collect();
    let (status, body) = send(
        app,
        request(
            "POST",
            "/api/v1/submissions",
            Some("gestionnaire"),
            Some(json!({ "employee_ref": Uuid::now_v7(), "tracks": tracks })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_string()
}

async fn submit(app: &Router, id: &str, track_type: &str, amount: &str) -> (StatusCode, Value) {
    send(
        app,
        request(
            "POST",
            &format!("/api/v1/submissions/{id}/tracks/{track_type}/submit"),
            Some("gestionnaire"),
            Some(json!({ "amount": amount })),
        ),
    )
    .await
}

async fn decide(app: &Router, id: &str, track_type: &str, role: &str, body: Value) -> (StatusCode, Value) {
    send(
        app,
        request(
            "POST",
            &format!("/api/v1/submissions/{id}/tracks/{track_type}/decisions"),
            Some(role),
            Some(body),
        ),
    )
    .await
}

mod auth_tests {
    use super::*;

    #[tokio::test]
    async fn test_health_is_public() {
        let app = app();
        let (status, body) = send(&app, request("GET", "/health", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, body) = send(&app, request("GET", "/health/ready", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["storage"], "in-memory-submissions");
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let app = app();
        let (status, body) = send(&app, request("GET", "/api/v1/queue", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "unauthorized");
    }

    #[tokio::test]
    async fn test_token_without_evp_role_is_forbidden() {
        let app = app();
        let (status, body) = send(&app, request("GET", "/api/v1/queue", Some("auditor"), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "forbidden");
    }

    #[tokio::test]
    async fn test_token_signed_with_other_secret_is_unauthorized() {
        let app = app();
        let forged = create_token(&UserId::new().to_string(), vec!["rh".into()], "other", 3600).unwrap();
        let request = Request::get("/api/v1/queue")
            .header(header::AUTHORIZATION, format!("Bearer {forged}"))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

mod submission_tests {
    use super::*;

    #[tokio::test]
    async fn test_open_submission_creates_entered_tracks() {
        let app = app();
        let id = open(&app, &[("prime", "1500.00"), ("conge", "3")]).await;

        let (status, body) = send(
            &app,
            request("GET", &format!("/api/v1/submissions/{id}"), Some("gestionnaire"), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let tracks = body["tracks"].as_array().unwrap();
        assert_eq!(tracks.len(), 2);
        assert!(tracks.iter().all(|t| t["status"] == "entered" && t["version"] == 0));
    }

    #[tokio::test]
    async fn test_open_submission_requires_gestionnaire() {
        let app = app();
        let (status, _) = send(
            &app,
            request(
                "POST",
                "/api/v1/submissions",
                Some("rh"),
                Some(json!({
                    "employee_ref": Uuid::now_v7(),
                    "tracks": [{ "track_type": "prime", "amount": "10" }]
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_open_submission_without_tracks_is_rejected() {
        let app = app();
        let (status, body) = send(
            &app,
            request(
                "POST",
                "/api/v1/submissions",
                Some("gestionnaire"),
                Some(json!({ "employee_ref": Uuid::now_v7(), "tracks": [] })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_sub_cent_amounts_are_rejected() {
        let app = app();
        let (status, body) = send(
            &app,
            request(
                "POST",
                "/api/v1/submissions",
                Some("gestionnaire"),
                Some(json!({
                    "employee_ref": Uuid::now_v7(),
                    "tracks": [{ "track_type": "prime", "amount": "10.005" }]
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "validation_error");

        let id = open(&app, &[("prime", "10.01")]).await;
        let (status, _) = submit(&app, &id, "prime", "10.005").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, body) = submit(&app, &id, "prime", "10.01").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["amount"], "10.01");
    }

    #[tokio::test]
    async fn test_attach_sibling_then_duplicate_conflicts() {
        let app = app();
        let id = open(&app, &[("prime", "100")]).await;
        let uri = format!("/api/v1/submissions/{id}/tracks");

        let (status, body) = send(
            &app,
            request("POST", &uri, Some("gestionnaire"), Some(json!({ "track_type": "conge", "amount": "2" }))),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["track_type"], "conge");

        let (status, _) = send(
            &app,
            request("POST", &uri, Some("gestionnaire"), Some(json!({ "track_type": "conge", "amount": "2" }))),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_unknown_submission_is_not_found() {
        let app = app();
        let (status, body) = send(
            &app,
            request("GET", &format!("/api/v1/submissions/{}", Uuid::now_v7()), Some("rh"), None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn test_malformed_path_segments_are_bad_requests() {
        let app = app();
        let (status, _) = send(
            &app,
            request("GET", "/api/v1/submissions/not-a-uuid", Some("rh"), None),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let id = open(&app, &[("prime", "100")]).await;
        let (status, _) = submit(&app, &id, "bonus", "100").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

mod decision_tests {
    use super::*;

    #[tokio::test]
    async fn test_full_approval_then_export() {
        let app = app();
        let id = open(&app, &[("prime", "1500.00")]).await;

        let (status, body) = submit(&app, &id, "prime", "1500.00").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "submitted");

        let (status, body) = decide(&app, &id, "prime", "responsable_service", json!({ "action": "approve" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "approved_by_service");

        let (status, body) = decide(&app, &id, "prime", "responsable_division", json!({ "action": "approve" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "approved_by_division");
        assert_eq!(body["actions"], json!([]));

        let (status, body) = send(&app, request("GET", "/api/v1/exports/prime", Some("rh"), None)).await;
        assert_eq!(status, StatusCode::OK);
        let exported = body.as_array().unwrap();
        assert_eq!(exported.len(), 1);
        assert_eq!(exported[0]["submission_id"], id.as_str());

        let (status, body) = send(&app, request("GET", "/api/v1/exports/conge", Some("rh"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));

        let (status, history) = send(
            &app,
            request("GET", &format!("/api/v1/submissions/{id}/tracks/prime/history"), Some("rh"), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(history.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_service_rejection_requires_comment() {
        let app = app();
        let id = open(&app, &[("conge", "4")]).await;
        submit(&app, &id, "conge", "4").await;

        let (status, body) = decide(&app, &id, "conge", "responsable_service", json!({ "action": "reject" })).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "validation_error");

        let (status, body) = decide(
            &app,
            &id,
            "conge",
            "responsable_service",
            json!({ "action": "reject", "comment": "Dates overlap" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "rejected_by_service");
        assert_eq!(body["comment"], "Dates overlap");
    }

    #[tokio::test]
    async fn test_division_cannot_act_on_submitted_track() {
        let app = app();
        let id = open(&app, &[("prime", "50")]).await;
        submit(&app, &id, "prime", "50").await;

        let (status, _) = decide(&app, &id, "prime", "responsable_division", json!({ "action": "approve" })).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_pinned_stale_version_is_conflict() {
        let app = app();
        let id = open(&app, &[("prime", "50")]).await;
        let (_, track) = submit(&app, &id, "prime", "50").await;
        assert_eq!(track["version"], 1);

        let (status, body) = decide(
            &app,
            &id,
            "prime",
            "responsable_service",
            json!({ "action": "approve", "expected_version": 0 }),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "stale_state");

        let (status, _) = decide(
            &app,
            &id,
            "prime",
            "responsable_service",
            json!({ "action": "approve", "expected_version": 1 }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_terminal_track_refuses_further_decisions() {
        let app = app();
        let id = open(&app, &[("prime", "50")]).await;
        submit(&app, &id, "prime", "50").await;
        decide(&app, &id, "prime", "responsable_service", json!({ "action": "approve" })).await;
        decide(&app, &id, "prime", "responsable_division", json!({ "action": "approve" })).await;

        let (status, _) = decide(&app, &id, "prime", "responsable_division", json!({ "action": "approve" })).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}

mod queue_tests {
    use super::*;

    #[tokio::test]
    async fn test_queue_follows_track_owner() {
        let app = app();
        let id = open(&app, &[("prime", "10"), ("conge", "1")]).await;
        submit(&app, &id, "prime", "10").await;

        let (status, body) = send(&app, request("GET", "/api/v1/queue", Some("responsable_service"), None)).await;
        assert_eq!(status, StatusCode::OK);
        let views = body.as_array().unwrap();
        assert_eq!(views.len(), 1);
        let tracks = views[0]["tracks"].as_array().unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0]["track_type"], "prime");
        assert_eq!(tracks[0]["visibility"], "actionable");

        let (_, body) = send(&app, request("GET", "/api/v1/queue", Some("responsable_division"), None)).await;
        assert_eq!(body, json!([]));

        let (_, body) = send(&app, request("GET", "/api/v1/queue", Some("rh"), None)).await;
        let tracks = body[0]["tracks"].as_array().unwrap();
        assert_eq!(tracks.len(), 2);
        assert!(tracks.iter().all(|t| t["visibility"] == "read_only"));
    }

    #[tokio::test]
    async fn test_export_and_summary_are_rh_only() {
        let app = app();
        for role in ["gestionnaire", "responsable_service", "responsable_division"] {
            let (status, _) = send(&app, request("GET", "/api/v1/exports/prime", Some(role), None)).await;
            assert_eq!(status, StatusCode::FORBIDDEN, "{role}");
            let (status, _) = send(&app, request("GET", "/api/v1/reports/summary", Some(role), None)).await;
            assert_eq!(status, StatusCode::FORBIDDEN, "{role}");
        }

        let (status, body) = send(&app, request("GET", "/api/v1/reports/summary", Some("rh"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["prime"]["pending"], 0);
    }
}
