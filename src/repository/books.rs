//! Catalog repository: books, authors and categories

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{Author, Book, BookDetails, Category, NewBook},
};

const DETAILS_SELECT: &str = r#"
    SELECT b.id, b.title, a.name AS author, c.name AS category,
           b.isbn, b.publication_date, b.availability
    FROM books b
    JOIN authors a ON a.id = b.author_id
    JOIN categories c ON c.id = b.category_id
"#;

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get one book with author and category names
    pub async fn get_details(&self, id: i32) -> AppResult<BookDetails> {
        sqlx::query_as::<_, BookDetails>(&format!("{} WHERE b.id = $1", DETAILS_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// List the whole catalog
    pub async fn list_details(&self) -> AppResult<Vec<BookDetails>> {
        let books = sqlx::query_as::<_, BookDetails>(&format!(
            "{} ORDER BY b.title, b.id",
            DETAILS_SELECT
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    /// Create a book, creating its author and category on first use.
    /// Names must already be normalized.
    pub async fn create(&self, book: &NewBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let author = find_or_create_author(&mut tx, &book.author).await?;
        let category = find_or_create_category(&mut tx, &book.category).await?;

        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author_id, category_id, isbn, publication_date, availability)
            VALUES ($1, $2, $3, $4, $5, TRUE)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(author.id)
        .bind(category.id)
        .bind(&book.isbn)
        .bind(book.publication_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(created)
    }
}

/// Find an author by exact name or insert it
pub async fn find_or_create_author(conn: &mut PgConnection, name: &str) -> AppResult<Author> {
    let inserted = sqlx::query_as::<_, Author>(
        "INSERT INTO authors (name) VALUES ($1) ON CONFLICT (name) DO NOTHING RETURNING id, name",
    )
    .bind(name)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(author) = inserted {
        tracing::debug!("Created author id={} name={}", author.id, author.name);
        return Ok(author);
    }

    let author = sqlx::query_as::<_, Author>("SELECT id, name FROM authors WHERE name = $1")
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;
    Ok(author)
}

/// Find a category by exact name or insert it
pub async fn find_or_create_category(conn: &mut PgConnection, name: &str) -> AppResult<Category> {
    let inserted = sqlx::query_as::<_, Category>(
        "INSERT INTO categories (name) VALUES ($1) ON CONFLICT (name) DO NOTHING RETURNING id, name",
    )
    .bind(name)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(category) = inserted {
        tracing::debug!("Created category id={} name={}", category.id, category.name);
        return Ok(category);
    }

    let category = sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE name = $1")
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;
    Ok(category)
}
