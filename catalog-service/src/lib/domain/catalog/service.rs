use std::sync::Arc;

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
use crate::catalog::ports::AuthorRepository;
use crate::catalog::ports::BookRepository;
use crate::catalog::ports::CatalogServicePort;

/// Domain service implementation for catalog operations.
pub struct CatalogService<BR, AR>
where
    BR: BookRepository,
    AR: AuthorRepository,
{
    books: Arc<BR>,
    authors: Arc<AR>,
}

impl<BR, AR> CatalogService<BR, AR>
where
    BR: BookRepository,
    AR: AuthorRepository,
{
    pub fn new(books: Arc<BR>, authors: Arc<AR>) -> Self {
        Self { books, authors }
    }
}

#[async_trait]
impl<BR, AR> CatalogServicePort for CatalogService<BR, AR>
where
    BR: BookRepository,
    AR: AuthorRepository,
{
    async fn list_books(&self) -> Result<Vec<Book>, CatalogError> {
        self.books.list_all().await
    }

    async fn get_book(&self, id: BookId) -> Result<Book, CatalogError> {
        self.books
            .find_by_id(id)
            .await?
            .ok_or(CatalogError::BookNotFound(id))
    }

    async fn add_book(&self, book: NewBook) -> Result<BookId, CatalogError> {
        let id = self.books.create(book).await?;
        tracing::info!(book_id = %id, "Book added");
        Ok(id)
    }

    async fn update_book(&self, id: BookId, update: BookUpdate) -> Result<(), CatalogError> {
        if update.is_empty() {
            return Err(CatalogError::EmptyUpdate);
        }

        self.books.update(id, update).await?;
        tracing::info!(book_id = %id, "Book updated");
        Ok(())
    }

    async fn remove_book(&self, id: BookId) -> Result<(), CatalogError> {
        let removed = self.books.delete(id).await?;
        tracing::info!(book_id = %id, removed, "Book delete requested");
        Ok(())
    }

    async fn search_books(&self, term: &SearchTerm) -> Result<Vec<Book>, CatalogError> {
        self.books.search(term).await
    }

    async fn list_authors(&self) -> Result<Vec<Author>, CatalogError> {
        self.authors.list_all().await
    }

    async fn add_author(&self, author: NewAuthor) -> Result<AuthorId, CatalogError> {
        let id = self.authors.create(author).await?;
        tracing::info!(author_id = %id, "Author added");
        Ok(id)
    }
}
