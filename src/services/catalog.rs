//! Catalog management service

use unicode_normalization::UnicodeNormalization;

use crate::{
    error::{AppError, AppResult},
    models::{Book, BookDetails, NewBook},
    repository::Repository,
};

const TITLE_MAX: usize = 200;
const NAME_MAX: usize = 100;
const ISBN_MAX: usize = 13;

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List all books with author and category names
    pub async fn list_books(&self) -> AppResult<Vec<BookDetails>> {
        self.repository.books.list_details().await
    }

    /// Get one book with author and category names
    pub async fn get_book(&self, id: i32) -> AppResult<BookDetails> {
        self.repository.books.get_details(id).await
    }

    /// Add a book, creating its author and category if unseen.
    /// ISBNs are not deduplicated.
    pub async fn add_book(&self, book: NewBook) -> AppResult<Book> {
        let book = prepare_book(book)?;

        let created = self.repository.books.create(&book).await?;
        tracing::info!(
            "Catalog: added book id={} title={:?} author={:?} category={:?}",
            created.id,
            created.title,
            book.author,
            book.category
        );

        Ok(created)
    }
}

/// Trim and normalize a new book, then check it against the column widths
pub fn prepare_book(book: NewBook) -> AppResult<NewBook> {
    let book = NewBook {
        title: book.title.trim().to_string(),
        author: normalize_name(&book.author),
        category: normalize_name(&book.category),
        isbn: book.isbn.trim().to_string(),
        publication_date: book.publication_date,
    };

    if book.title.is_empty() || book.author.is_empty() || book.category.is_empty() {
        return Err(AppError::Validation(
            "Title, author and category are required".to_string(),
        ));
    }

    // Normalization can lengthen a name
    for (field, value, max) in [
        ("Title", &book.title, TITLE_MAX),
        ("Author", &book.author, NAME_MAX),
        ("Category", &book.category, NAME_MAX),
        ("ISBN", &book.isbn, ISBN_MAX),
    ] {
        if value.chars().count() > max {
            return Err(AppError::Validation(format!(
                "{} must be at most {} characters",
                field, max
            )));
        }
    }

    Ok(book)
}

/// Canonical form of an author or category name: NFC, trimmed, single spaces
pub fn normalize_name(name: &str) -> String {
    name.nfc()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
