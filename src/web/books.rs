//! Catalog, borrow and return pages

use axum::{extract::State, response::Response, Form};
use axum_extra::extract::cookie::CookieJar;
use validator::Validate;

use super::{
    flash::FlashMessage,
    forms::{field_errors, AddBookForm, BookIdForm, FieldErrors},
    page, redirect_with, views, CurrentUser, MaybeUser, PageResult,
};
use crate::{
    error::AppError,
    models::{Capability, UserClaims},
    AppState,
};

/// Send users lacking `capability` back home with the denial message
fn deny_unless(jar: CookieJar, claims: &UserClaims, capability: Capability) -> Result<CookieJar, Response> {
    match claims.require(capability) {
        Ok(()) => Ok(jar),
        Err(AppError::Authorization(msg)) => Err(redirect_with(jar, "/home", FlashMessage::danger(msg))),
        Err(other) => Err(redirect_with(jar, "/home", FlashMessage::danger(other.to_string()))),
    }
}

pub async fn home(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    jar: CookieJar,
) -> PageResult {
    let books = state.services.catalog.list_books().await?;
    let active = state.services.loans.count_active().await?;
    Ok(page(jar, "Catalog", user.as_ref(), vec![], views::home(&books, active)))
}

pub async fn add_book_page(CurrentUser(claims): CurrentUser, jar: CookieJar) -> Response {
    let jar = match deny_unless(jar, &claims, Capability::ManageCatalog) {
        Ok(jar) => jar,
        Err(response) => return response,
    };
    page(
        jar,
        "Add Book",
        Some(&claims),
        vec![],
        views::add_book(&AddBookForm::default(), &FieldErrors::new()),
    )
}

pub async fn add_book_submit(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    jar: CookieJar,
    Form(form): Form<AddBookForm>,
) -> PageResult {
    let jar = match deny_unless(jar, &claims, Capability::ManageCatalog) {
        Ok(jar) => jar,
        Err(response) => return Ok(response),
    };

    let book = match form.validate().ok().and_then(|_| form.to_new_book()) {
        Some(book) => book,
        None => {
            let errors = form.validate().err().map(|e| field_errors(&e)).unwrap_or_default();
            return Ok(page(jar, "Add Book", Some(&claims), vec![], views::add_book(&form, &errors)));
        }
    };

    match state.services.catalog.add_book(book).await {
        Ok(_) => Ok(redirect_with(jar, "/home", FlashMessage::success("Book has been added!"))),
        Err(AppError::Validation(msg)) => Ok(page(
            jar,
            "Add Book",
            Some(&claims),
            vec![FlashMessage::danger(msg)],
            views::add_book(&form, &FieldErrors::new()),
        )),
        Err(e) => Err(e.into()),
    }
}

pub async fn borrow_book_page(CurrentUser(claims): CurrentUser, jar: CookieJar) -> Response {
    let jar = match deny_unless(jar, &claims, Capability::BorrowBooks) {
        Ok(jar) => jar,
        Err(response) => return response,
    };
    page(
        jar,
        "Borrow Book",
        Some(&claims),
        vec![],
        views::book_id_form("/borrow_book", "Borrow Book", "", &FieldErrors::new()),
    )
}

pub async fn borrow_book_submit(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    jar: CookieJar,
    Form(form): Form<BookIdForm>,
) -> PageResult {
    let jar = match deny_unless(jar, &claims, Capability::BorrowBooks) {
        Ok(jar) => jar,
        Err(response) => return Ok(response),
    };

    let book_id = match form.validate().ok().and_then(|_| form.book_id()) {
        Some(id) => id,
        None => return Ok(book_id_page(jar, &claims, Transition::Borrow, &form, vec![])),
    };

    match state.services.loans.borrow(claims.user_id, book_id).await {
        Ok(_) => Ok(redirect_with(
            jar,
            "/home",
            FlashMessage::success("You have borrowed the book!"),
        )),
        Err(AppError::BookNotAvailable(_)) => Ok(book_id_page(
            jar,
            &claims,
            Transition::Borrow,
            &form,
            vec![FlashMessage::danger("Book is not available")],
        )),
        Err(e) => Err(e.into()),
    }
}

pub async fn return_book_page(CurrentUser(claims): CurrentUser, jar: CookieJar) -> Response {
    page(
        jar,
        "Return Book",
        Some(&claims),
        vec![],
        views::book_id_form("/return_book", "Return Book", "", &FieldErrors::new()),
    )
}

pub async fn return_book_submit(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    jar: CookieJar,
    Form(form): Form<BookIdForm>,
) -> PageResult {
    let book_id = match form.validate().ok().and_then(|_| form.book_id()) {
        Some(id) => id,
        None => return Ok(book_id_page(jar, &claims, Transition::Return, &form, vec![])),
    };

    match state.services.loans.return_book(claims.user_id, book_id).await {
        Ok(_) => Ok(redirect_with(
            jar,
            "/home",
            FlashMessage::success("You have returned the book!"),
        )),
        Err(AppError::NoActiveLoan(_)) => Ok(book_id_page(
            jar,
            &claims,
            Transition::Return,
            &form,
            vec![FlashMessage::danger("You have not borrowed this book")],
        )),
        Err(e) => Err(e.into()),
    }
}

pub async fn my_loans(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    jar: CookieJar,
) -> PageResult {
    let loans = state.services.loans.get_user_loans(claims.user_id).await?;
    Ok(page(jar, "My Loans", Some(&claims), vec![], views::loans(&loans)))
}

#[derive(Clone, Copy)]
enum Transition {
    Borrow,
    Return,
}

/// Re-render the borrow or return form with field errors and flashes
fn book_id_page(
    jar: CookieJar,
    claims: &UserClaims,
    transition: Transition,
    form: &BookIdForm,
    flashes: Vec<FlashMessage>,
) -> Response {
    let (title, action) = match transition {
        Transition::Borrow => ("Borrow Book", "/borrow_book"),
        Transition::Return => ("Return Book", "/return_book"),
    };
    let errors = form.validate().err().map(|e| field_errors(&e)).unwrap_or_default();
    page(
        jar,
        title,
        Some(claims),
        flashes,
        views::book_id_form(action, title, &form.book_id, &errors),
    )
}
