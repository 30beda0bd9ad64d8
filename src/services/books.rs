//! Book catalog service: validation and ISBN consistency

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{BookRequest, BookResponse, BookSearchQuery, NewBook},
    repository::BookRepository,
};

#[derive(Clone)]
pub struct BookService {
    repository: Arc<dyn BookRepository>,
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Book not found with id: {}", id))
}

fn to_responses(books: Vec<crate::models::Book>) -> Vec<BookResponse> {
    books.into_iter().map(BookResponse::from).collect()
}

impl BookService {
    pub fn new(repository: Arc<dyn BookRepository>) -> Self {
        Self { repository }
    }

    /// Fail with Conflict when `isbn` is already held by some book.
    ///
    /// Best effort only: two concurrent writers can both pass this check.
    /// The storage unique constraint is what actually keeps ISBNs unique;
    /// this lookup only yields a clearer error in the common case.
    async fn ensure_isbn_free(&self, isbn: &str) -> AppResult<()> {
        if self.repository.find_by_isbn(isbn).await?.is_some() {
            tracing::warn!(isbn, "ISBN already registered");
            return Err(AppError::Conflict(format!("ISBN already registered: {}", isbn)));
        }
        Ok(())
    }

    /// List every book
    pub async fn list_all(&self) -> AppResult<Vec<BookResponse>> {
        Ok(to_responses(self.repository.find_all().await?))
    }

    /// Get a book by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<BookResponse> {
        self.repository
            .find_by_id(id)
            .await?
            .map(BookResponse::from)
            .ok_or_else(|| not_found(id))
    }

    /// Create a book
    pub async fn create(&self, request: BookRequest) -> AppResult<BookResponse> {
        if let Some(ref isbn) = request.isbn {
            self.ensure_isbn_free(isbn).await?;
        }
        request.validate()?;

        let created = self.repository.insert(NewBook::from(request)).await?;
        tracing::info!(id = created.id, title = %created.title, "Book created");
        Ok(created.into())
    }

    /// Replace all mutable fields of an existing book
    pub async fn update(&self, id: i64, request: BookRequest) -> AppResult<BookResponse> {
        let mut book = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))?;

        // An unchanged ISBN is skipped, so a book never collides with itself
        if let Some(ref isbn) = request.isbn {
            if book.isbn.as_deref() != Some(isbn.as_str()) {
                self.ensure_isbn_free(isbn).await?;
            }
        }
        request.validate()?;

        book.replace_fields(NewBook::from(request));
        let updated = self.repository.update(&book).await?;
        tracing::info!(id, "Book updated");
        Ok(updated.into())
    }

    /// Delete a book
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        if !self.repository.exists_by_id(id).await? {
            return Err(not_found(id));
        }
        self.repository.delete_by_id(id).await?;
        tracing::info!(id, "Book deleted");
        Ok(())
    }

    /// Books whose title contains `title`, ignoring case.
    /// An empty filter matches every book.
    pub async fn search_by_title(&self, title: &str) -> AppResult<Vec<BookResponse>> {
        Ok(to_responses(
            self.repository.find_by_title_containing(title).await?,
        ))
    }

    /// Books whose author contains `author`, ignoring case
    pub async fn search_by_author(&self, author: &str) -> AppResult<Vec<BookResponse>> {
        Ok(to_responses(
            self.repository.find_by_author_containing(author).await?,
        ))
    }

    /// Search with query parameters: title first, then author, otherwise everything.
    /// Filters are passed through untouched; only absent or empty ones are skipped.
    pub async fn search(&self, query: &BookSearchQuery) -> AppResult<Vec<BookResponse>> {
        let non_empty = |v: &Option<String>| v.as_deref().filter(|s| !s.is_empty()).map(str::to_string);
        match (non_empty(&query.title), non_empty(&query.author)) {
            (Some(title), _) => self.search_by_title(&title).await,
            (None, Some(author)) => self.search_by_author(&author).await,
            (None, None) => self.list_all().await,
        }
    }

    /// Storage readiness
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}
