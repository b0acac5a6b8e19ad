//! Book model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// Book row from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author_id: i32,
    pub category_id: i32,
    pub isbn: String,
    pub publication_date: NaiveDate,
    /// Cached "no open loan exists" flag, only written by borrow/return
    pub availability: bool,
    pub created_at: DateTime<Utc>,
}

impl Book {
    /// Guard for the borrow transition
    pub fn ensure_available(&self) -> AppResult<()> {
        if self.availability {
            Ok(())
        } else {
            Err(AppError::BookNotAvailable(self.id))
        }
    }
}

/// Book joined with its author and category names, for listings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookDetails {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub category: String,
    pub isbn: String,
    pub publication_date: NaiveDate,
    pub availability: bool,
}

/// Catalog upsert input
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub category: String,
    pub isbn: String,
    pub publication_date: NaiveDate,
}
