//! Repository layer for catalog storage

pub mod books;
pub mod memory;

use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::book::{Book, NewBook},
};

pub use books::PgBooksRepository;
pub use memory::InMemoryBooksRepository;

/// Storage contract for books.
///
/// Backends must enforce ISBN uniqueness themselves and report a violation as
/// `AppError::Conflict`. No two calls are atomic as a group.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// All books, in id order
    async fn find_all(&self) -> AppResult<Vec<Book>>;

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Book>>;

    /// Exact ISBN match
    async fn find_by_isbn(&self, isbn: &str) -> AppResult<Option<Book>>;

    /// Case-insensitive substring match on title
    async fn find_by_title_containing(&self, title: &str) -> AppResult<Vec<Book>>;

    /// Case-insensitive substring match on author
    async fn find_by_author_containing(&self, author: &str) -> AppResult<Vec<Book>>;

    async fn exists_by_id(&self, id: i64) -> AppResult<bool>;

    /// Persist a new book; id and both timestamps are assigned here
    async fn insert(&self, book: NewBook) -> AppResult<Book>;

    /// Replace all mutable fields of an existing book and refresh `updated_at`
    async fn update(&self, book: &Book) -> AppResult<Book>;

    async fn delete_by_id(&self, id: i64) -> AppResult<()>;

    /// Backend liveness check
    async fn ping(&self) -> AppResult<()>;
}
