//! Loans repository: the borrow/return transitions

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{Book, LoanDetails, LoanRecord},
};

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Lend a book to a user.
    ///
    /// The book row is locked for the duration of the transaction, so the
    /// availability flag and the new ledger row change together.
    pub async fn borrow(&self, user_id: i32, book_id: i32) -> AppResult<LoanRecord> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(book_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AppError::BookNotAvailable(book_id))?;

        book.ensure_available()?;

        let loan = sqlx::query_as::<_, LoanRecord>(
            r#"
            INSERT INTO loan_records (user_id, book_id, borrow_date, return_date)
            VALUES ($1, $2, $3, NULL)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            // Open-loan index: the flag was stale
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::BookNotAvailable(book_id)
            }
            other => AppError::Database(other),
        })?;

        sqlx::query("UPDATE books SET availability = FALSE WHERE id = $1")
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(loan)
    }

    /// Close the user's open loan on a book and put the book back on the shelf
    pub async fn return_book(&self, user_id: i32, book_id: i32) -> AppResult<LoanRecord> {
        let mut tx = self.pool.begin().await?;

        let open = sqlx::query_as::<_, LoanRecord>(
            r#"
            SELECT * FROM loan_records
            WHERE user_id = $1 AND book_id = $2 AND return_date IS NULL
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NoActiveLoan(book_id))?;

        let closed = open.close(Utc::now())?;

        let loan = sqlx::query_as::<_, LoanRecord>(
            "UPDATE loan_records SET return_date = $1 WHERE id = $2 RETURNING *",
        )
        .bind(closed.return_date)
        .bind(closed.id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE books SET availability = TRUE WHERE id = $1")
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(loan)
    }

    /// All loans of a user, newest first
    pub async fn get_user_history(&self, user_id: i32) -> AppResult<Vec<LoanDetails>> {
        let loans = sqlx::query_as::<_, LoanDetails>(
            r#"
            SELECT l.id, l.book_id, b.title, b.isbn, l.borrow_date, l.return_date
            FROM loan_records l
            JOIN books b ON b.id = l.book_id
            WHERE l.user_id = $1
            ORDER BY l.borrow_date DESC, l.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(loans)
    }

    /// All ledger rows for a book, oldest first
    pub async fn get_book_records(&self, book_id: i32) -> AppResult<Vec<LoanRecord>> {
        let loans = sqlx::query_as::<_, LoanRecord>(
            "SELECT * FROM loan_records WHERE book_id = $1 ORDER BY borrow_date, id",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(loans)
    }

    /// Count active loans
    pub async fn count_active(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM loan_records WHERE return_date IS NULL")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
