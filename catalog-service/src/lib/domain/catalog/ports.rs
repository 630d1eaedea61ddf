use async_trait::async_trait;

use crate::catalog::errors::CatalogError;
use crate::catalog::models::Author;
use crate::catalog::models::AuthorId;
use crate::catalog::models::Book;
use crate::catalog::models::BookId;
use crate::catalog::models::BookUpdate;
use crate::catalog::models::NewAuthor;
use crate::catalog::models::NewBook;
use crate::catalog::models::SearchTerm;

/// Port for catalog domain service operations.
#[async_trait]
pub trait CatalogServicePort: Send + Sync + 'static {
    async fn list_books(&self) -> Result<Vec<Book>, CatalogError>;

    /// # Errors
    /// * `BookNotFound` - No book with this id
    async fn get_book(&self, id: BookId) -> Result<Book, CatalogError>;

    /// # Errors
    /// * `UnknownAuthor` - `author_id` does not reference an author
    async fn add_book(&self, book: NewBook) -> Result<BookId, CatalogError>;

    /// # Errors
    /// * `EmptyUpdate` - No field was provided
    /// * `BookNotFound` - No book with this id
    /// * `UnknownAuthor` - New `author_id` does not reference an author
    async fn update_book(&self, id: BookId, update: BookUpdate) -> Result<(), CatalogError>;

    /// Remove a book. Removing a book that does not exist is not an error.
    async fn remove_book(&self, id: BookId) -> Result<(), CatalogError>;

    /// Books whose title or genre contains the term, ignoring case.
    async fn search_books(&self, term: &SearchTerm) -> Result<Vec<Book>, CatalogError>;

    async fn list_authors(&self) -> Result<Vec<Author>, CatalogError>;

    async fn add_author(&self, author: NewAuthor) -> Result<AuthorId, CatalogError>;
}

/// Persistence operations for books.
#[async_trait]
pub trait BookRepository: Send + Sync + 'static {
    /// All books ordered by id, author name joined in.
    async fn list_all(&self) -> Result<Vec<Book>, CatalogError>;

    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>, CatalogError>;

    /// Books whose title or genre contains the term, ignoring case, ordered by id.
    async fn search(&self, term: &SearchTerm) -> Result<Vec<Book>, CatalogError>;

    /// # Errors
    /// * `UnknownAuthor` - Foreign key to authors violated
    async fn create(&self, book: NewBook) -> Result<BookId, CatalogError>;

    /// # Errors
    /// * `BookNotFound` - No row was updated
    /// * `UnknownAuthor` - Foreign key to authors violated
    async fn update(&self, id: BookId, update: BookUpdate) -> Result<(), CatalogError>;

    /// # Returns
    /// Whether a row was removed
    async fn delete(&self, id: BookId) -> Result<bool, CatalogError>;
}

/// Persistence operations for authors.
#[async_trait]
pub trait AuthorRepository: Send + Sync + 'static {
    async fn list_all(&self) -> Result<Vec<Author>, CatalogError>;

    async fn create(&self, author: NewAuthor) -> Result<AuthorId, CatalogError>;
}
