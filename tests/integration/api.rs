//! JSON routes that resolve before touching the database

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::Value;

use libris_server::models::Role;

use crate::common::*;

async fn json(response: axum::http::Response<Body>) -> Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = send(offline_app(), get("/api/v1/health")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_my_loans_requires_authentication() {
    let response = send(offline_app(), get("/api/v1/loans")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = json(response).await;
    assert_eq!(body["error"], "authentication");
}

#[tokio::test]
async fn test_malformed_bearer_header() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/books/1/borrow")
        .header(header::AUTHORIZATION, "Token abc")
        .body(Body::empty())
        .unwrap();
    let response = send(offline_app(), request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_book_ledger_requires_admin() {
    let request = Request::builder()
        .uri("/api/v1/books/1/loans")
        .header(header::AUTHORIZATION, format!("Bearer {}", token_for(Role::Faculty)))
        .body(Body::empty())
        .unwrap();
    let response = send(offline_app(), request).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = json(response).await;
    assert_eq!(body["error"], "authorization");
}

#[tokio::test]
async fn test_login_validates_payload() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"email":"not-an-email","password":"x"}"#))
        .unwrap();
    let response = send(offline_app(), request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json(response).await;
    assert_eq!(body["error"], "validation");
}

#[tokio::test]
async fn test_openapi_document() {
    let response = send(offline_app(), get("/api-docs/openapi.json")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json(response).await;
    assert_eq!(body["servers"][0]["url"], "/api/v1");
    assert!(body["paths"]["/books/{id}/borrow"].is_object());
    assert!(body["components"]["schemas"]["BookDetails"].is_object());
}
