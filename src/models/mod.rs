//! Data models for Libris

pub mod book;

pub use book::{Book, BookRequest, BookResponse, BookSearchQuery, NewBook};
