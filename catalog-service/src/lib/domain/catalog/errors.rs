use thiserror::Error;

use crate::catalog::models::AuthorId;
use crate::catalog::models::BookId;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BookTitleError {
    #[error("Title is required")]
    Empty,

    #[error("Title too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenreError {
    #[error("Genre must not be blank")]
    Empty,

    #[error("Genre too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CopiesError {
    #[error("Available copies cannot be negative, got {0}")]
    Negative(i32),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthorNameError {
    #[error("Author name is required")]
    Empty,

    #[error("Author name too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SearchTermError {
    #[error("Search term must not be empty")]
    Empty,
}

/// Top-level error type for all catalog operations
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("Invalid title: {0}")]
    InvalidTitle(#[from] BookTitleError),

    #[error("Invalid genre: {0}")]
    InvalidGenre(#[from] GenreError),

    #[error("Invalid copies: {0}")]
    InvalidCopies(#[from] CopiesError),

    #[error("Invalid author name: {0}")]
    InvalidAuthorName(#[from] AuthorNameError),

    #[error("Invalid search: {0}")]
    InvalidSearchTerm(#[from] SearchTermError),

    #[error("No fields to update")]
    EmptyUpdate,

    #[error("Book not found: {0}")]
    BookNotFound(BookId),

    #[error("Author does not exist: {0}")]
    UnknownAuthor(AuthorId),

    // Infrastructure errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}
