use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::catalog::errors::CatalogError;
use crate::catalog::models::Author;
use crate::catalog::models::AuthorId;
use crate::catalog::models::Book;
use crate::catalog::models::BookId;
use crate::catalog::models::BookUpdate;
use crate::catalog::models::Genre;
use crate::catalog::models::NewAuthor;
use crate::catalog::models::NewBook;
use crate::catalog::models::SearchTerm;
use crate::catalog::ports::AuthorRepository;
use crate::catalog::ports::BookRepository;

const SELECT_BOOKS: &str = r#"
    SELECT b.book_id, b.title, b.author_id,
           a.first_name || ' ' || a.last_name AS author,
           b.genre, b.publish_year, b.available_copies, b.date_added
    FROM books b
    JOIN authors a ON a.author_id = b.author_id
"#;

pub struct PostgresBookRepository {
    pool: PgPool,
}

impl PostgresBookRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub struct PostgresAuthorRepository {
    pool: PgPool,
}

impl PostgresAuthorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookRow {
    book_id: i64,
    title: String,
    author_id: i64,
    author: String,
    genre: Option<String>,
    publish_year: Option<i32>,
    available_copies: i32,
    date_added: NaiveDate,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Book {
            id: BookId(row.book_id),
            title: row.title,
            author_id: AuthorId(row.author_id),
            author: row.author,
            genre: row.genre,
            publish_year: row.publish_year,
            available_copies: row.available_copies,
            date_added: row.date_added,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AuthorRow {
    author_id: i64,
    first_name: String,
    last_name: String,
}

impl From<AuthorRow> for Author {
    fn from(row: AuthorRow) -> Self {
        Author {
            id: AuthorId(row.author_id),
            first_name: row.first_name,
            last_name: row.last_name,
        }
    }
}

/// Build an ILIKE pattern matching `term` as a literal substring.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn map_write_error(e: sqlx::Error, author_id: Option<AuthorId>) -> CatalogError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_foreign_key_violation() {
            if let Some(author_id) = author_id {
                return CatalogError::UnknownAuthor(author_id);
            }
        }
    }
    CatalogError::DatabaseError(e.to_string())
}

#[async_trait]
impl BookRepository for PostgresBookRepository {
    async fn list_all(&self) -> Result<Vec<Book>, CatalogError> {
        let rows = sqlx::query_as::<_, BookRow>(&format!("{} ORDER BY b.book_id", SELECT_BOOKS))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>, CatalogError> {
        let row = sqlx::query_as::<_, BookRow>(&format!("{} WHERE b.book_id = $1", SELECT_BOOKS))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;

        Ok(row.map(Book::from))
    }

    async fn search(&self, term: &SearchTerm) -> Result<Vec<Book>, CatalogError> {
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            r#"{}
            WHERE b.title ILIKE $1 ESCAPE '\' OR b.genre ILIKE $1 ESCAPE '\'
            ORDER BY b.book_id"#,
            SELECT_BOOKS
        ))
        .bind(contains_pattern(term.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn create(&self, book: NewBook) -> Result<BookId, CatalogError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO books (title, author_id, genre, publish_year, available_copies)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING book_id
            "#,
        )
        .bind(book.title.as_str())
        .bind(book.author_id.0)
        .bind(book.genre.as_ref().map(Genre::as_str))
        .bind(book.publish_year)
        .bind(book.available_copies.value())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, Some(book.author_id)))?;

        Ok(BookId(id))
    }

    async fn update(&self, id: BookId, update: BookUpdate) -> Result<(), CatalogError> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET title = COALESCE($2, title),
                author_id = COALESCE($3, author_id),
                genre = COALESCE($4, genre),
                publish_year = COALESCE($5, publish_year),
                available_copies = COALESCE($6, available_copies)
            WHERE book_id = $1
            "#,
        )
        .bind(id.0)
        .bind(update.title.as_ref().map(|title| title.as_str()))
        .bind(update.author_id.map(|author_id| author_id.0))
        .bind(update.genre.as_ref().map(Genre::as_str))
        .bind(update.publish_year)
        .bind(update.available_copies.map(|copies| copies.value()))
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, update.author_id))?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::BookNotFound(id));
        }

        Ok(())
    }

    async fn delete(&self, id: BookId) -> Result<bool, CatalogError> {
        let result = sqlx::query(
            r#"
            DELETE FROM books
            WHERE book_id = $1
            "#,
        )
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl AuthorRepository for PostgresAuthorRepository {
    async fn list_all(&self) -> Result<Vec<Author>, CatalogError> {
        let rows = sqlx::query_as::<_, AuthorRow>(
            r#"
            SELECT author_id, first_name, last_name
            FROM authors
            ORDER BY author_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(Author::from).collect())
    }

    async fn create(&self, author: NewAuthor) -> Result<AuthorId, CatalogError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO authors (first_name, last_name)
            VALUES ($1, $2)
            RETURNING author_id
            "#,
        )
        .bind(author.first_name.as_str())
        .bind(author.last_name.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;

        Ok(AuthorId(id))
    }
}
