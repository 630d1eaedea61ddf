//! In-memory repository implementations.
//!
//! Thread-safe via [`parking_lot::RwLock`]. Intended for tests and local development;
//! nothing is persisted. Uniqueness and foreign-key checks happen under a single write
//! guard, so they hold across concurrent writers the same way the database constraints do.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use chrono::Utc;
use parking_lot::RwLock;

use crate::account::errors::AccountError;
use crate::account::models::Credential;
use crate::account::models::Username;
use crate::account::ports::CredentialRepository;
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

#[derive(Default)]
pub struct InMemoryCredentialRepository {
    credentials: RwLock<BTreeMap<String, Credential>>,
}

impl InMemoryCredentialRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.credentials.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.read().is_empty()
    }
}

#[async_trait]
impl CredentialRepository for InMemoryCredentialRepository {
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<Credential>, AccountError> {
        Ok(self.credentials.read().get(username.as_str()).cloned())
    }

    async fn insert(&self, username: &Username, password_hash: &str) -> Result<(), AccountError> {
        let mut credentials = self.credentials.write();

        match credentials.entry(username.as_str().to_string()) {
            Entry::Occupied(_) => Err(AccountError::UsernameAlreadyExists(
                username.as_str().to_string(),
            )),
            Entry::Vacant(slot) => {
                slot.insert(Credential {
                    username: username.clone(),
                    password_hash: password_hash.to_string(),
                    created_at: Utc::now(),
                });
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone)]
struct BookRecord {
    title: String,
    author_id: AuthorId,
    genre: Option<String>,
    publish_year: Option<i32>,
    available_copies: i32,
    date_added: NaiveDate,
}

#[derive(Default)]
struct CatalogTables {
    authors: BTreeMap<AuthorId, Author>,
    books: BTreeMap<BookId, BookRecord>,
    last_author_id: i64,
    last_book_id: i64,
}

impl CatalogTables {
    /// Inner join of a book row with its author.
    fn joined(&self, id: BookId, record: &BookRecord) -> Option<Book> {
        let author = self.authors.get(&record.author_id)?;
        Some(Book {
            id,
            title: record.title.clone(),
            author_id: record.author_id,
            author: author.full_name(),
            genre: record.genre.clone(),
            publish_year: record.publish_year,
            available_copies: record.available_copies,
            date_added: record.date_added,
        })
    }

    fn books_where(&self, predicate: impl Fn(&BookRecord) -> bool) -> Vec<Book> {
        self.books
            .iter()
            .filter(|(_, record)| predicate(record))
            .filter_map(|(id, record)| self.joined(*id, record))
            .collect()
    }
}

/// Books and authors in one lock so the author reference is checked atomically.
#[derive(Default)]
pub struct InMemoryCatalogRepository {
    tables: RwLock<CatalogTables>,
}

impl InMemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookRepository for InMemoryCatalogRepository {
    async fn list_all(&self) -> Result<Vec<Book>, CatalogError> {
        Ok(self.tables.read().books_where(|_| true))
    }

    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>, CatalogError> {
        let tables = self.tables.read();
        Ok(tables
            .books
            .get(&id)
            .and_then(|record| tables.joined(id, record)))
    }

    async fn search(&self, term: &SearchTerm) -> Result<Vec<Book>, CatalogError> {
        Ok(self.tables.read().books_where(|record| {
            term.matches(&record.title)
                || record
                    .genre
                    .as_deref()
                    .is_some_and(|genre| term.matches(genre))
        }))
    }

    async fn create(&self, book: NewBook) -> Result<BookId, CatalogError> {
        let mut tables = self.tables.write();

        if !tables.authors.contains_key(&book.author_id) {
            return Err(CatalogError::UnknownAuthor(book.author_id));
        }

        tables.last_book_id += 1;
        let id = BookId(tables.last_book_id);
        tables.books.insert(
            id,
            BookRecord {
                title: book.title.as_str().to_string(),
                author_id: book.author_id,
                genre: book.genre.map(|genre| genre.as_str().to_string()),
                publish_year: book.publish_year,
                available_copies: book.available_copies.value(),
                date_added: Utc::now().date_naive(),
            },
        );

        Ok(id)
    }

    async fn update(&self, id: BookId, update: BookUpdate) -> Result<(), CatalogError> {
        let mut tables = self.tables.write();

        if let Some(author_id) = update.author_id {
            if !tables.authors.contains_key(&author_id) {
                return Err(CatalogError::UnknownAuthor(author_id));
            }
        }

        let record = tables
            .books
            .get_mut(&id)
            .ok_or(CatalogError::BookNotFound(id))?;

        if let Some(title) = update.title {
            record.title = title.as_str().to_string();
        }
        if let Some(author_id) = update.author_id {
            record.author_id = author_id;
        }
        if let Some(genre) = update.genre {
            record.genre = Some(genre.as_str().to_string());
        }
        if let Some(publish_year) = update.publish_year {
            record.publish_year = Some(publish_year);
        }
        if let Some(copies) = update.available_copies {
            record.available_copies = copies.value();
        }

        Ok(())
    }

    async fn delete(&self, id: BookId) -> Result<bool, CatalogError> {
        Ok(self.tables.write().books.remove(&id).is_some())
    }
}

#[async_trait]
impl AuthorRepository for InMemoryCatalogRepository {
    async fn list_all(&self) -> Result<Vec<Author>, CatalogError> {
        Ok(self.tables.read().authors.values().cloned().collect())
    }

    async fn create(&self, author: NewAuthor) -> Result<AuthorId, CatalogError> {
        let mut tables = self.tables.write();

        tables.last_author_id += 1;
        let id = AuthorId(tables.last_author_id);
        tables.authors.insert(
            id,
            Author {
                id,
                first_name: author.first_name.as_str().to_string(),
                last_name: author.last_name.as_str().to_string(),
            },
        );

        Ok(id)
    }
}
