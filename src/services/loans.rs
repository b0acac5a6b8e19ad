//! Loan management service

use crate::{
    error::AppResult,
    models::{LoanDetails, LoanRecord},
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Borrow a book. Fails with `BookNotAvailable` if the book is missing or lent.
    pub async fn borrow(&self, user_id: i32, book_id: i32) -> AppResult<LoanRecord> {
        let loan = self.repository.loans.borrow(user_id, book_id).await?;
        tracing::info!(
            "Loan id={} opened: user id={} borrowed book id={}",
            loan.id,
            user_id,
            book_id
        );
        Ok(loan)
    }

    /// Return a book. Fails with `NoActiveLoan` unless this user holds it.
    pub async fn return_book(&self, user_id: i32, book_id: i32) -> AppResult<LoanRecord> {
        let loan = self.repository.loans.return_book(user_id, book_id).await?;
        tracing::info!(
            "Loan id={} closed: user id={} returned book id={}",
            loan.id,
            user_id,
            book_id
        );
        Ok(loan)
    }

    /// Loan history for a user, newest first
    pub async fn get_user_loans(&self, user_id: i32) -> AppResult<Vec<LoanDetails>> {
        self.repository.loans.get_user_history(user_id).await
    }

    /// Ledger rows of one book
    pub async fn get_book_loans(&self, book_id: i32) -> AppResult<Vec<LoanRecord>> {
        self.repository.loans.get_book_records(book_id).await
    }

    /// Count active loans
    pub async fn count_active(&self) -> AppResult<i64> {
        self.repository.loans.count_active().await
    }
}
