//! Borrow/return ledger and catalog upserts against a real database.
//!
//! Run with: DATABASE_URL=postgres://... cargo test -- --ignored

use chrono::{NaiveDate, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool};

use libris_server::{
    models::{user::Registration, NewBook, Role, User},
    AppError, AppState,
};

use crate::common::test_config;

pub async fn setup() -> (AppState, PgPool) {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for ledger tests");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("connect to test database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");
    (AppState::new(test_config(), pool.clone()), pool)
}

/// Suffix keeping names unique across runs
pub fn unique(prefix: &str) -> String {
    format!("{} {}", prefix, Utc::now().timestamp_nanos_opt().unwrap_or_default())
}

pub async fn register(state: &AppState, role: Role) -> User {
    let email = format!("{}@example.org", unique("reader").replace(' ', "."));
    state
        .services
        .users
        .register(Registration {
            name: "Ledger Reader".to_string(),
            email,
            password: "correct horse".to_string(),
            role,
        })
        .await
        .expect("register")
}

fn new_book(author: &str, category: &str) -> NewBook {
    NewBook {
        title: unique("Title"),
        author: author.to_string(),
        category: category.to_string(),
        isbn: "9780441013593".to_string(),
        publication_date: NaiveDate::from_ymd_opt(1965, 8, 1).unwrap(),
    }
}

async fn count(pool: &PgPool, sql: &str, bind: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(sql)
        .bind(bind)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
#[ignore]
async fn test_unseen_author_and_category_created_once() {
    let (state, pool) = setup().await;
    let author = unique("Author");
    let category = unique("Category");

    state.services.catalog.add_book(new_book(&author, &category)).await.unwrap();
    // Same names with stray whitespace resolve to the same rows
    state
        .services
        .catalog
        .add_book(new_book(&format!("  {}  ", author.replace(' ', "   ")), &category))
        .await
        .unwrap();

    assert_eq!(count(&pool, "SELECT COUNT(*) FROM authors WHERE name = $1", &author).await, 1);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM categories WHERE name = $1", &category).await, 1);
    assert_eq!(
        count(
            &pool,
            "SELECT COUNT(*) FROM books b JOIN authors a ON a.id = b.author_id WHERE a.name = $1",
            &author
        )
        .await,
        2
    );
}

#[tokio::test]
#[ignore]
async fn test_new_book_is_available() {
    let (state, _pool) = setup().await;
    let book = state
        .services
        .catalog
        .add_book(new_book(&unique("Author"), "Fiction"))
        .await
        .unwrap();

    assert!(book.availability);
    let details = state.services.catalog.get_book(book.id).await.unwrap();
    assert!(details.availability);
    assert_eq!(details.category, "Fiction");
}

#[tokio::test]
#[ignore]
async fn test_double_borrow_fails() {
    let (state, _pool) = setup().await;
    let first = register(&state, Role::Student).await;
    let second = register(&state, Role::Faculty).await;
    let book = state
        .services
        .catalog
        .add_book(new_book(&unique("Author"), "Fiction"))
        .await
        .unwrap();

    state.services.loans.borrow(first.id, book.id).await.unwrap();

    for user in [&first, &second] {
        match state.services.loans.borrow(user.id, book.id).await {
            Err(AppError::BookNotAvailable(id)) => assert_eq!(id, book.id),
            other => panic!("expected BookNotAvailable, got {:?}", other),
        }
    }
    assert_eq!(state.services.loans.get_book_loans(book.id).await.unwrap().len(), 1);
}

#[tokio::test]
#[ignore]
async fn test_borrow_missing_book_is_not_available() {
    let (state, _pool) = setup().await;
    let user = register(&state, Role::Student).await;

    assert!(matches!(
        state.services.loans.borrow(user.id, i32::MAX).await,
        Err(AppError::BookNotAvailable(_))
    ));
}

#[tokio::test]
#[ignore]
async fn test_return_without_open_loan_fails() {
    let (state, _pool) = setup().await;
    let borrower = register(&state, Role::Student).await;
    let other = register(&state, Role::Student).await;
    let book = state
        .services
        .catalog
        .add_book(new_book(&unique("Author"), "Fiction"))
        .await
        .unwrap();

    assert!(matches!(
        state.services.loans.return_book(borrower.id, book.id).await,
        Err(AppError::NoActiveLoan(_))
    ));

    state.services.loans.borrow(borrower.id, book.id).await.unwrap();
    assert!(matches!(
        state.services.loans.return_book(other.id, book.id).await,
        Err(AppError::NoActiveLoan(_))
    ));
}

#[tokio::test]
#[ignore]
async fn test_borrow_then_return_restores_availability() {
    let (state, pool) = setup().await;
    let user = register(&state, Role::Faculty).await;
    let book = state
        .services
        .catalog
        .add_book(new_book(&unique("Author"), "History"))
        .await
        .unwrap();

    let loan = state.services.loans.borrow(user.id, book.id).await.unwrap();
    assert!(loan.is_open());
    assert!(!state.services.catalog.get_book(book.id).await.unwrap().availability);

    let closed = state.services.loans.return_book(user.id, book.id).await.unwrap();
    assert_eq!(closed.id, loan.id);
    assert!(closed.return_date.unwrap() >= closed.borrow_date);
    assert!(state.services.catalog.get_book(book.id).await.unwrap().availability);

    let records = state.services.loans.get_book_loans(book.id).await.unwrap();
    assert_eq!(records.len(), 1);
    assert!(!records[0].is_open());

    let open: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM loan_records WHERE book_id = $1 AND return_date IS NULL",
    )
    .bind(book.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(open, 0);

    // Borrowable again after the return
    state.services.loans.borrow(user.id, book.id).await.unwrap();
    let history = state.services.loans.get_user_loans(user.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(history[0].return_date.is_none());
}

#[tokio::test]
#[ignore]
async fn test_duplicate_email_rejected() {
    let (state, _pool) = setup().await;
    let user = register(&state, Role::Student).await;

    let result = state
        .services
        .users
        .register(Registration {
            name: "Someone Else".to_string(),
            email: user.email.to_uppercase(),
            password: "pw".to_string(),
            role: Role::Student,
        })
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
#[ignore]
async fn test_authenticate() {
    let (state, _pool) = setup().await;
    let user = register(&state, Role::Student).await;

    let (token, found) = state
        .services
        .users
        .authenticate(&user.email, "correct horse")
        .await
        .unwrap();
    assert_eq!(found.id, user.id);
    assert!(!token.is_empty());

    assert!(matches!(
        state.services.users.authenticate(&user.email, "wrong").await,
        Err(AppError::Authentication(_))
    ));
    assert!(matches!(
        state.services.users.authenticate("nobody@example.org", "x").await,
        Err(AppError::Authentication(_))
    ));
}
