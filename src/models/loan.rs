//! Loan ledger records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// Loan record from database. Open while `return_date` is null.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LoanRecord {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub borrow_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
}

impl LoanRecord {
    pub fn is_open(&self) -> bool {
        self.return_date.is_none()
    }

    /// Close the loan at `at`. Fails if it was already returned.
    pub fn close(mut self, at: DateTime<Utc>) -> AppResult<Self> {
        if !self.is_open() {
            return Err(AppError::NoActiveLoan(self.book_id));
        }
        // Clock skew must not produce a return before the borrow
        self.return_date = Some(at.max(self.borrow_date));
        Ok(self)
    }
}

/// Loan with book title, for history pages
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LoanDetails {
    pub id: i32,
    pub book_id: i32,
    pub title: String,
    pub isbn: String,
    pub borrow_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
}
