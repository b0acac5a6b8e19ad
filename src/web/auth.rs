//! Registration, login, logout and password pages

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use validator::Validate;

use super::{
    clear_session,
    flash::FlashMessage,
    forms::{field_errors, ChangePasswordForm, FieldErrors, LoginForm, RegisterForm},
    page, redirect_with, session_cookie, views, CurrentUser, MaybeUser, PageResult,
};
use crate::{error::AppError, AppState};

pub async fn register_page(MaybeUser(user): MaybeUser, jar: CookieJar) -> Response {
    if user.is_some() {
        return Redirect::to("/home").into_response();
    }
    page(
        jar,
        "Register",
        None,
        vec![],
        views::register(&RegisterForm::default(), &FieldErrors::new()),
    )
}

pub async fn register_submit(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> PageResult {
    if user.is_some() {
        return Ok(Redirect::to("/home").into_response());
    }

    if let Err(errors) = form.validate() {
        let errors = field_errors(&errors);
        return Ok(page(jar, "Register", None, vec![], views::register(&form, &errors)));
    }

    let registration = match form.to_registration() {
        Some(registration) => registration,
        None => return Err(AppError::Validation("Invalid role".to_string()).into()),
    };

    match state.services.users.register(registration).await {
        Ok(_) => Ok(redirect_with(
            jar,
            "/login",
            FlashMessage::success("Your account has been created! You are now able to log in"),
        )),
        Err(AppError::Conflict(msg)) => {
            let errors = FieldErrors::from([("email".to_string(), vec![msg])]);
            Ok(page(jar, "Register", None, vec![], views::register(&form, &errors)))
        }
        Err(AppError::Authorization(msg)) => {
            let errors = FieldErrors::from([("role".to_string(), vec![msg])]);
            Ok(page(jar, "Register", None, vec![], views::register(&form, &errors)))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn login_page(MaybeUser(user): MaybeUser, jar: CookieJar) -> Response {
    if user.is_some() {
        return Redirect::to("/home").into_response();
    }
    page(
        jar,
        "Login",
        None,
        vec![],
        views::login(&LoginForm::default(), &FieldErrors::new()),
    )
}

pub async fn login_submit(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> PageResult {
    if user.is_some() {
        return Ok(Redirect::to("/home").into_response());
    }

    if let Err(errors) = form.validate() {
        let errors = field_errors(&errors);
        return Ok(page(jar, "Login", None, vec![], views::login(&form, &errors)));
    }

    match state.services.users.authenticate(&form.email, &form.password).await {
        Ok((token, _user)) => {
            let jar = jar.add(session_cookie(token, &state.config.auth));
            Ok((jar, Redirect::to("/home")).into_response())
        }
        Err(AppError::Authentication(_)) => Ok(page(
            jar,
            "Login",
            None,
            vec![FlashMessage::danger(
                "Login Unsuccessful. Please check email and password",
            )],
            views::login(&form, &FieldErrors::new()),
        )),
        Err(e) => Err(e.into()),
    }
}

pub async fn logout(CurrentUser(claims): CurrentUser, jar: CookieJar) -> Response {
    tracing::info!("User id={} logged out", claims.user_id);
    (clear_session(jar), Redirect::to("/home")).into_response()
}

pub async fn change_password_page(CurrentUser(claims): CurrentUser, jar: CookieJar) -> Response {
    page(
        jar,
        "Change Password",
        Some(&claims),
        vec![],
        views::change_password(&FieldErrors::new()),
    )
}

pub async fn change_password_submit(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    jar: CookieJar,
    Form(form): Form<ChangePasswordForm>,
) -> PageResult {
    if let Err(errors) = form.validate() {
        let errors = field_errors(&errors);
        return Ok(page(
            jar,
            "Change Password",
            Some(&claims),
            vec![],
            views::change_password(&errors),
        ));
    }

    match state
        .services
        .users
        .change_password(claims.user_id, &form.current_password, &form.new_password)
        .await
    {
        Ok(()) => Ok(redirect_with(
            jar,
            "/home",
            FlashMessage::success("Your password has been updated"),
        )),
        Err(AppError::Authentication(msg)) => {
            let errors = FieldErrors::from([("current_password".to_string(), vec![msg])]);
            Ok(page(
                jar,
                "Change Password",
                Some(&claims),
                vec![],
                views::change_password(&errors),
            ))
        }
        Err(e) => Err(e.into()),
    }
}
