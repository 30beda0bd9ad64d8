//! Postgres books repository

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::BookRepository;
use crate::{
    error::{AppError, AppResult},
    models::book::{Book, NewBook},
};

#[derive(Clone)]
pub struct PgBooksRepository {
    pool: Pool<Postgres>,
}

impl PgBooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// The `books_isbn_key` constraint is the authoritative uniqueness guard:
/// a concurrent writer can pass the service pre-check and still lose here.
fn unique_isbn_violation(err: sqlx::Error, isbn: Option<&str>) -> AppError {
    let is_unique = err
        .as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false);
    if is_unique {
        return AppError::Conflict(format!(
            "ISBN already registered: {}",
            isbn.unwrap_or_default()
        ));
    }
    AppError::Database(err)
}

/// `%`, `_` and `\` are literal in a containment search
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl BookRepository for PgBooksRepository {
    async fn find_all(&self) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Book>> {
        let row = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_isbn(&self, isbn: &str) -> AppResult<Option<Book>> {
        let row = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE isbn = $1")
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_title_containing(&self, title: &str) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, Book>(
            "SELECT * FROM books WHERE title ILIKE $1 ESCAPE '\\' ORDER BY id",
        )
        .bind(like_pattern(title))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_by_author_containing(&self, author: &str) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, Book>(
            "SELECT * FROM books WHERE author ILIKE $1 ESCAPE '\\' ORDER BY id",
        )
        .bind(like_pattern(author))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn exists_by_id(&self, id: i64) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn insert(&self, book: NewBook) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, isbn, publication_year, available, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(book.publication_year)
        .bind(book.available)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_isbn_violation(e, book.isbn.as_deref()))
    }

    async fn update(&self, book: &Book) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = $1, author = $2, isbn = $3, publication_year = $4, available = $5,
                updated_at = GREATEST(NOW(), created_at)
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(book.publication_year)
        .bind(book.available)
        .bind(book.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| unique_isbn_violation(e, book.isbn.as_deref()))?
        .ok_or_else(|| AppError::NotFound(format!("Book not found with id: {}", book.id)))
    }

    async fn delete_by_id(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book not found with id: {}", id)));
        }
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
