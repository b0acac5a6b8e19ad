//! Page flows that write to the database: add, borrow and return through
//! the HTML forms, checking the flash each step produces.
//!
//! Run with: DATABASE_URL=postgres://... cargo test -- --ignored

use axum::http::StatusCode;
use sqlx::PgPool;

use libris_server::{
    models::Role,
    router::create_router,
    web::flash::{FlashLevel, FlashMessage},
    AppState,
};

use crate::common::*;
use crate::ledger::{register, setup, unique};

async fn book_id_by_author(pool: &PgPool, author: &str) -> i32 {
    sqlx::query_scalar::<_, i32>(
        "SELECT b.id FROM books b JOIN authors a ON a.id = b.author_id WHERE a.name = $1",
    )
    .bind(author)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Add a book through the admin form and return its id
async fn add_book_via_form(state: &AppState, pool: &PgPool) -> i32 {
    let author = unique("Author");
    let body = format!(
        "title=Dune&author={}&category=Fiction&isbn=0441013597&publication_date=1965-08-01",
        author.replace(' ', "+")
    );
    let admin = token_for(Role::Admin);
    let response = send(
        create_router(state.clone()),
        post_form("/add_book", &body, Some(&admin)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/home"));
    assert_eq!(
        queued_flashes(&set_cookies(&response)),
        vec![FlashMessage::success("Book has been added!")]
    );

    book_id_by_author(pool, &author).await
}

#[tokio::test]
#[ignore]
async fn test_borrow_twice_shows_not_available() {
    let (state, pool) = setup().await;
    let book_id = add_book_via_form(&state, &pool).await;
    let reader = token_for_user(&register(&state, Role::Student).await);
    let body = format!("book_id={}", book_id);

    let response = send(
        create_router(state.clone()),
        post_form("/borrow_book", &body, Some(&reader)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/home"));
    assert_eq!(
        queued_flashes(&set_cookies(&response)),
        vec![FlashMessage::success("You have borrowed the book!")]
    );

    let response = send(
        create_router(state.clone()),
        post_form("/borrow_book", &body, Some(&reader)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_string(response).await;
    assert!(page.contains("Book is not available"));
    assert!(page.contains(FlashLevel::Danger.css_class()));
}

#[tokio::test]
#[ignore]
async fn test_borrow_unknown_book_shows_not_available() {
    let (state, _pool) = setup().await;
    let reader = token_for_user(&register(&state, Role::Faculty).await);
    let body = format!("book_id={}", i32::MAX);

    let response = send(create_router(state), post_form("/borrow_book", &body, Some(&reader))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("Book is not available"));
}

#[tokio::test]
#[ignore]
async fn test_return_requires_own_loan() {
    let (state, pool) = setup().await;
    let book_id = add_book_via_form(&state, &pool).await;
    let borrower = token_for_user(&register(&state, Role::Student).await);
    let other = token_for_user(&register(&state, Role::Faculty).await);
    let body = format!("book_id={}", book_id);

    // Nobody holds the book yet
    let response = send(
        create_router(state.clone()),
        post_form("/return_book", &body, Some(&borrower)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("You have not borrowed this book"));

    send(
        create_router(state.clone()),
        post_form("/borrow_book", &body, Some(&borrower)),
    )
    .await;

    let response = send(
        create_router(state.clone()),
        post_form("/return_book", &body, Some(&other)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("You have not borrowed this book"));

    let response = send(
        create_router(state.clone()),
        post_form("/return_book", &body, Some(&borrower)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/home"));
    assert_eq!(
        queued_flashes(&set_cookies(&response)),
        vec![FlashMessage::success("You have returned the book!")]
    );

    assert!(state.services.catalog.get_book(book_id).await.unwrap().availability);
}
