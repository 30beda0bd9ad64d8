//! In-memory books repository

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::BookRepository;
use crate::{
    error::{AppError, AppResult},
    models::book::{Book, NewBook},
};

#[derive(Debug, Default)]
struct Store {
    /// Last id handed out; ids of deleted books are never reissued
    last_id: i64,
    books: BTreeMap<i64, Book>,
}

impl Store {
    /// Some other book already holding `isbn`
    fn isbn_taken_by_other(&self, isbn: Option<&str>, id: Option<i64>) -> bool {
        let Some(isbn) = isbn else {
            return false;
        };
        self.books
            .values()
            .any(|b| b.isbn.as_deref() == Some(isbn) && Some(b.id) != id)
    }
}

/// Process-local storage. Uniqueness is checked and applied under one write lock.
#[derive(Debug, Default)]
pub struct InMemoryBooksRepository {
    store: RwLock<Store>,
}

impl InMemoryBooksRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn filter<F>(&self, predicate: F) -> Vec<Book>
    where
        F: Fn(&Book) -> bool,
    {
        let store = self.store.read().await;
        store.books.values().filter(|b| predicate(*b)).cloned().collect()
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[async_trait]
impl BookRepository for InMemoryBooksRepository {
    async fn find_all(&self) -> AppResult<Vec<Book>> {
        Ok(self.filter(|_| true).await)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Book>> {
        Ok(self.store.read().await.books.get(&id).cloned())
    }

    async fn find_by_isbn(&self, isbn: &str) -> AppResult<Option<Book>> {
        let store = self.store.read().await;
        Ok(store
            .books
            .values()
            .find(|b| b.isbn.as_deref() == Some(isbn))
            .cloned())
    }

    async fn find_by_title_containing(&self, title: &str) -> AppResult<Vec<Book>> {
        Ok(self.filter(|b| contains_ignore_case(&b.title, title)).await)
    }

    async fn find_by_author_containing(&self, author: &str) -> AppResult<Vec<Book>> {
        Ok(self.filter(|b| contains_ignore_case(&b.author, author)).await)
    }

    async fn exists_by_id(&self, id: i64) -> AppResult<bool> {
        Ok(self.store.read().await.books.contains_key(&id))
    }

    async fn insert(&self, book: NewBook) -> AppResult<Book> {
        let mut store = self.store.write().await;
        if store.isbn_taken_by_other(book.isbn.as_deref(), None) {
            return Err(AppError::Conflict(format!(
                "ISBN already registered: {}",
                book.isbn.unwrap_or_default()
            )));
        }

        store.last_id += 1;
        let now = Utc::now();
        let created = Book {
            id: store.last_id,
            title: book.title,
            author: book.author,
            isbn: book.isbn,
            publication_year: book.publication_year,
            available: book.available,
            created_at: now,
            updated_at: now,
        };
        store.books.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, book: &Book) -> AppResult<Book> {
        let mut store = self.store.write().await;
        if store.isbn_taken_by_other(book.isbn.as_deref(), Some(book.id)) {
            return Err(AppError::Conflict(format!(
                "ISBN already registered: {}",
                book.isbn.as_deref().unwrap_or_default()
            )));
        }

        let existing = store
            .books
            .get_mut(&book.id)
            .ok_or_else(|| AppError::NotFound(format!("Book not found with id: {}", book.id)))?;

        existing.title = book.title.clone();
        existing.author = book.author.clone();
        existing.isbn = book.isbn.clone();
        existing.publication_year = book.publication_year;
        existing.available = book.available;
        existing.updated_at = Utc::now().max(existing.created_at);
        Ok(existing.clone())
    }

    async fn delete_by_id(&self, id: i64) -> AppResult<()> {
        self.store
            .write()
            .await
            .books
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Book not found with id: {}", id)))
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
