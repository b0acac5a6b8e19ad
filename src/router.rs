//! Route table

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::{api, web, AppState};

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let pages = Router::new()
        .route("/", get(web::books::home))
        .route("/home", get(web::books::home))
        .route(
            "/register",
            get(web::auth::register_page).post(web::auth::register_submit),
        )
        .route(
            "/login",
            get(web::auth::login_page).post(web::auth::login_submit),
        )
        .route("/logout", get(web::auth::logout))
        .route(
            "/change_password",
            get(web::auth::change_password_page).post(web::auth::change_password_submit),
        )
        .route(
            "/add_book",
            get(web::books::add_book_page).post(web::books::add_book_submit),
        )
        .route(
            "/borrow_book",
            get(web::books::borrow_book_page).post(web::books::borrow_book_submit),
        )
        .route(
            "/return_book",
            get(web::books::return_book_page).post(web::books::return_book_submit),
        )
        .route("/loans", get(web::books::my_loans));

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication
        .route("/auth/login", post(api::auth::login))
        .route("/auth/me", get(api::auth::me))
        // Catalog and ledger
        .route("/books", get(api::books::list_books))
        .route("/books/:id", get(api::books::get_book))
        .route("/books/:id/borrow", post(api::books::borrow_book))
        .route("/books/:id/return", post(api::books::return_book))
        .route("/books/:id/loans", get(api::books::get_book_loans))
        .route("/loans", get(api::loans::get_my_loans));

    Router::new()
        .merge(pages)
        .nest("/api/v1", api_v1)
        .with_state(state)
        .merge(api::openapi::create_openapi_router())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}
