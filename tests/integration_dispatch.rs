mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{request, send, short_token_for, test_app, SUPERADMIN_ID};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_health_uses_envelope() {
    let app = test_app();

    let (status, body) = send(&app, request("GET", "/health", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "ok": true, "data": { "status": "ok" }, "errors": [], "message": "" })
    );
}

#[tokio::test]
async fn test_unknown_module_is_rejected() {
    let app = test_app();

    let (status, body) = send(&app, request("GET", "/api/nope/anything", None, None)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], false);
    assert_eq!(body["message"], "module nope not found");
    assert_eq!(body["data"], json!({}));
    assert_eq!(body["errors"], json!([]));
}

#[tokio::test]
async fn test_unknown_function_is_rejected() {
    let app = test_app();

    let (status, body) = send(&app, request("GET", "/api/identity/missing", None, None)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "unable to find function missing for verb get");
}

#[tokio::test]
async fn test_verb_without_exposed_functions_is_rejected() {
    let app = test_app();

    let (status, body) = send(&app, request("DELETE", "/api/identity/whoami", None, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "unsupported method DELETE");

    let (status, body) = send(&app, request("PATCH", "/api/identity/whoami", None, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "unsupported method PATCH");
}

#[tokio::test]
async fn test_function_exposed_under_other_verb_is_not_found() {
    let app = test_app();

    let (status, body) = send(
        &app,
        request("POST", "/api/identity/whoami", None, Some(json!({}))),
    )
    .await;

    // identity only exposes GET functions
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "unsupported method POST");
}

#[tokio::test]
async fn test_spoofed_token_field_does_not_replace_verified_claims() {
    let app = test_app();
    let token = short_token_for(SUPERADMIN_ID);

    let (status, body) = send(
        &app,
        request(
            "GET",
            "/api/identity/whoami?__token=spoofed",
            Some(&token),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["userId"], SUPERADMIN_ID);
}

#[tokio::test]
async fn test_malformed_body_is_ignored() {
    let app = test_app();
    let token = short_token_for(SUPERADMIN_ID);

    let request = Request::builder()
        .method("GET")
        .uri("/api/identity/whoami")
        .header("token", &token)
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["info"]["title"], "Rollcall API");
    assert!(body["paths"]["/api/{module}/{function}"].is_object());
}
