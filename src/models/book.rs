//! Book model: persisted entity, wire DTOs and the mappings between them

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

/// Persisted book record
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Book {
    /// Assigned by storage on insert, never reused
    pub id: i64,
    pub title: String,
    pub author: String,
    /// Unique across the catalog when present
    pub isbn: Option<String>,
    pub publication_year: Option<i32>,
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Book not yet persisted (no id, no timestamps)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub publication_year: Option<i32>,
    pub available: bool,
}

impl Book {
    /// Replace every mutable field. `id` and timestamps are left to storage.
    pub fn replace_fields(&mut self, fields: NewBook) {
        self.title = fields.title;
        self.author = fields.author;
        self.isbn = fields.isbn;
        self.publication_year = fields.publication_year;
        self.available = fields.available;
    }
}

static ISBN_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9-]+$").expect("ISBN pattern is a valid regex"));

/// 13 digits and the four hyphens of the canonical ISBN-13 grouping
const ISBN_MAX_LEN: usize = 17;

/// Create / update book request
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookRequest {
    /// Title (1-200 characters)
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(
        custom(function = "title_present"),
        length(max = 200, message = "Title must be between 1 and 200 characters")
    )]
    pub title: String,
    /// Author (1-150 characters)
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(
        custom(function = "author_present"),
        length(max = 150, message = "Author must be between 1 and 150 characters")
    )]
    pub author: String,
    /// ISBN-10 or ISBN-13, hyphens allowed
    #[validate(custom(function = "valid_isbn"))]
    pub isbn: Option<String>,
    #[validate(range(
        min = 1000,
        max = 2100,
        message = "Publication year must be between 1000 and 2100"
    ))]
    pub publication_year: Option<i32>,
    /// Defaults to true
    pub available: Option<bool>,
}

/// A JSON `null` title or author is reported like a missing one
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn not_blank(value: &str, message: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some(message.into());
        return Err(err);
    }
    Ok(())
}

fn title_present(value: &str) -> Result<(), ValidationError> {
    not_blank(value, "Title is required")
}

fn author_present(value: &str) -> Result<(), ValidationError> {
    not_blank(value, "Author is required")
}

/// 10 or 13 digits, hyphens allowed, at most 17 characters.
/// No checksum verification.
fn valid_isbn(value: &str) -> Result<(), ValidationError> {
    let digits = value.chars().filter(char::is_ascii_digit).count();
    if value.len() <= ISBN_MAX_LEN
        && ISBN_CHARS.is_match(value)
        && (digits == 10 || digits == 13)
    {
        return Ok(());
    }
    let mut err = ValidationError::new("isbn");
    err.message = Some("Invalid ISBN".into());
    Err(err)
}

impl From<BookRequest> for NewBook {
    fn from(request: BookRequest) -> Self {
        Self {
            title: request.title,
            author: request.author,
            isbn: request.isbn,
            publication_year: request.publication_year,
            available: request.available.unwrap_or(true),
        }
    }
}

/// Book as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookResponse {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub publication_year: Option<i32>,
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
            isbn: book.isbn,
            publication_year: book.publication_year,
            available: book.available,
            created_at: book.created_at,
            updated_at: book.updated_at,
        }
    }
}

/// Search query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookSearchQuery {
    /// Case-insensitive substring of the title
    pub title: Option<String>,
    /// Case-insensitive substring of the author, used when no title is given
    pub author: Option<String>,
}
