//! Loan history endpoint

use axum::{extract::State, Json};

use crate::{error::AppResult, models::LoanDetails, AppState};

use super::AuthenticatedUser;

/// Loan history of the caller, newest first
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's loans", body = Vec<LoanDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_my_loans(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = state.services.loans.get_user_loans(claims.user_id).await?;
    Ok(Json(loans))
}
