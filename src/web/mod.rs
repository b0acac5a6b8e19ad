//! HTML front end: session cookie, flash messages and page handlers

pub mod auth;
pub mod books;
pub mod flash;
pub mod forms;
pub mod views;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use maud::{html, Markup};

use crate::{config::AuthConfig, error::AppError, models::UserClaims, AppState};

use self::flash::FlashMessage;

pub const SESSION_COOKIE: &str = "session";

/// Build the session cookie holding a signed token
pub fn session_cookie(token: String, config: &AuthConfig) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(config.secure_cookies)
        .same_site(SameSite::Lax)
        .build()
}

/// Drop the session cookie
pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

/// Claims from a valid session cookie, if any
pub fn session_claims(jar: &CookieJar, state: &AppState) -> Option<UserClaims> {
    let cookie = jar.get(SESSION_COOKIE)?;
    match UserClaims::from_token(cookie.value(), &state.config.auth.session_secret) {
        Ok(claims) => Some(claims),
        Err(e) => {
            tracing::debug!("Ignoring invalid session cookie: {}", e);
            None
        }
    }
}

/// Extractor for a logged-in user; redirects to the login page otherwise
pub struct CurrentUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = LoginRequired;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        match session_claims(&jar, state) {
            Some(claims) => Ok(CurrentUser(claims)),
            None => Err(LoginRequired(jar)),
        }
    }
}

/// Extractor for pages open to everyone
pub struct MaybeUser(pub Option<UserClaims>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        Ok(MaybeUser(session_claims(&jar, state)))
    }
}

/// Rejection of [`CurrentUser`]
pub struct LoginRequired(CookieJar);

impl IntoResponse for LoginRequired {
    fn into_response(self) -> Response {
        let mut jar = self.0;
        if jar.get(SESSION_COOKIE).is_some() {
            jar = clear_session(jar);
        }
        let jar = flash::push(jar, FlashMessage::info("Please log in to access this page."));
        (jar, Redirect::to("/login")).into_response()
    }
}

/// Render a full page, draining queued flashes and appending `extra`
pub fn page(
    jar: CookieJar,
    title: &str,
    user: Option<&UserClaims>,
    extra: Vec<FlashMessage>,
    body: Markup,
) -> Response {
    let (jar, mut flashes) = flash::take(jar);
    flashes.extend(extra);
    (jar, views::layout(title, user, &flashes, body)).into_response()
}

/// Queue a flash and redirect
pub fn redirect_with(jar: CookieJar, to: &str, message: FlashMessage) -> Response {
    (flash::push(jar, message), Redirect::to(to)).into_response()
}

/// Unexpected failure while serving a page; rendered as HTML
pub struct PageError(AppError);

impl From<AppError> for PageError {
    fn from(err: AppError) -> Self {
        PageError(err)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Page handler failed: {}", self.0);
            "Something went wrong. Please try again later.".to_string()
        } else {
            self.0.to_string()
        };
        let body = views::layout(
            "Error",
            None,
            &[FlashMessage::danger(message)],
            html! { p { a href="/home" { "Back to the catalog" } } },
        );
        (status, body).into_response()
    }
}

pub type PageResult = Result<Response, PageError>;
