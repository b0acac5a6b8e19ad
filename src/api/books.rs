//! Catalog and borrow/return endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{BookDetails, Capability, LoanRecord},
    AppState,
};

use super::AuthenticatedUser;

/// List the catalog
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    responses(
        (status = 200, description = "All books", body = Vec<BookDetails>)
    )
)]
pub async fn list_books(State(state): State<AppState>) -> AppResult<Json<Vec<BookDetails>>> {
    let books = state.services.catalog.list_books().await?;
    Ok(Json(books))
}

/// Get one book
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = BookDetails),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BookDetails>> {
    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book))
}

/// Borrow a book
#[utoipa::path(
    post,
    path = "/books/{id}/borrow",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 201, description = "Loan opened", body = LoanRecord),
        (status = 401, description = "Not authenticated"),
        (status = 409, description = "Book missing or already on loan")
    )
)]
pub async fn borrow_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<(StatusCode, Json<LoanRecord>)> {
    claims.require(Capability::BorrowBooks)?;

    let loan = state.services.loans.borrow(claims.user_id, id).await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/books/{id}/return",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Loan closed", body = LoanRecord),
        (status = 401, description = "Not authenticated"),
        (status = 409, description = "Caller has no open loan on this book")
    )
)]
pub async fn return_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<LoanRecord>> {
    let loan = state.services.loans.return_book(claims.user_id, id).await?;
    Ok(Json(loan))
}

/// Ledger of one book (admin only)
#[utoipa::path(
    get,
    path = "/books/{id}/loans",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Loan records, oldest first", body = Vec<LoanRecord>),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book_loans(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<LoanRecord>>> {
    claims.require(Capability::ManageCatalog)?;

    state.services.catalog.get_book(id).await?;
    let loans = state.services.loans.get_book_loans(id).await?;
    Ok(Json(loans))
}
