use std::fmt;

use chrono::NaiveDate;

use crate::catalog::errors::AuthorNameError;
use crate::catalog::errors::BookTitleError;
use crate::catalog::errors::CopiesError;
use crate::catalog::errors::GenreError;
use crate::catalog::errors::SearchTermError;

/// Book row as exposed by the catalog, with the author's name joined in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author_id: AuthorId,
    pub author: String,
    pub genre: Option<String>,
    pub publish_year: Option<i32>,
    pub available_copies: i32,
    pub date_added: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: AuthorId,
    pub first_name: String,
    pub last_name: String,
}

impl Author {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BookId(pub i64);

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AuthorId(pub i64);

impl fmt::Display for AuthorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Book title value type: non-blank, at most 255 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookTitle(String);

impl BookTitle {
    const MAX_LENGTH: usize = 255;

    pub fn new(title: String) -> Result<Self, BookTitleError> {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(BookTitleError::Empty);
        }
        let length = title.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(BookTitleError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }
        Ok(Self(title))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Book genre: non-blank, at most 100 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genre(String);

impl Genre {
    const MAX_LENGTH: usize = 100;

    pub fn new(genre: String) -> Result<Self, GenreError> {
        let genre = genre.trim().to_string();
        if genre.is_empty() {
            return Err(GenreError::Empty);
        }
        let length = genre.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(GenreError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }
        Ok(Self(genre))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Number of copies on the shelf; never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Copies(i32);

impl Copies {
    pub fn new(copies: i32) -> Result<Self, CopiesError> {
        if copies < 0 {
            return Err(CopiesError::Negative(copies));
        }
        Ok(Self(copies))
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

/// First or last name of an author: non-blank, at most 100 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorName(String);

impl AuthorName {
    const MAX_LENGTH: usize = 100;

    pub fn new(name: String) -> Result<Self, AuthorNameError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AuthorNameError::Empty);
        }
        let length = name.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(AuthorNameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Non-empty search term, matched case-insensitively as a literal substring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm(String);

impl SearchTerm {
    pub fn new(term: String) -> Result<Self, SearchTermError> {
        let term = term.trim().to_string();
        if term.is_empty() {
            return Err(SearchTermError::Empty);
        }
        Ok(Self(term))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when `text` contains the term, ignoring case.
    pub fn matches(&self, text: &str) -> bool {
        text.to_lowercase().contains(&self.0.to_lowercase())
    }
}

/// Command to add a book to the catalog.
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: BookTitle,
    pub author_id: AuthorId,
    pub genre: Option<Genre>,
    pub publish_year: Option<i32>,
    pub available_copies: Copies,
}

/// Partial update of a book. Only provided fields change.
#[derive(Debug, Clone, Default)]
pub struct BookUpdate {
    pub title: Option<BookTitle>,
    pub author_id: Option<AuthorId>,
    pub genre: Option<Genre>,
    pub publish_year: Option<i32>,
    pub available_copies: Option<Copies>,
}

impl BookUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author_id.is_none()
            && self.genre.is_none()
            && self.publish_year.is_none()
            && self.available_copies.is_none()
    }
}

/// Command to add an author.
#[derive(Debug, Clone)]
pub struct NewAuthor {
    pub first_name: AuthorName,
    pub last_name: AuthorName,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_title_trims_and_rejects_blank() {
        assert_eq!(
            BookTitle::new("  Dune ".to_string()).unwrap().as_str(),
            "Dune"
        );
        assert_eq!(BookTitle::new("   ".to_string()), Err(BookTitleError::Empty));
        assert!(matches!(
            BookTitle::new("x".repeat(256)),
            Err(BookTitleError::TooLong { max: 255, .. })
        ));
    }

    #[test]
    fn test_genre_length_limit() {
        assert_eq!(
            Genre::new(" Satire ".to_string()).unwrap().as_str(),
            "Satire"
        );
        assert_eq!(Genre::new(" ".to_string()), Err(GenreError::Empty));
        assert!(Genre::new("g".repeat(100)).is_ok());
        assert_eq!(
            Genre::new("g".repeat(101)),
            Err(GenreError::TooLong {
                max: 100,
                actual: 101
            })
        );
    }

    #[test]
    fn test_copies_non_negative() {
        assert_eq!(Copies::new(0).unwrap().value(), 0);
        assert_eq!(Copies::new(-1), Err(CopiesError::Negative(-1)));
    }

    #[test]
    fn test_search_term_matches_case_insensitively() {
        let term = SearchTerm::new(" fic ".to_string()).unwrap();
        assert_eq!(term.as_str(), "fic");
        assert!(term.matches("Science Fiction"));
        assert!(term.matches("FICTION"));
        assert!(!term.matches("Poetry"));
    }

    #[test]
    fn test_search_term_empty() {
        assert_eq!(SearchTerm::new(String::new()), Err(SearchTermError::Empty));
        assert_eq!(SearchTerm::new("  ".to_string()), Err(SearchTermError::Empty));
    }

    #[test]
    fn test_book_update_is_empty() {
        assert!(BookUpdate::default().is_empty());

        let update = BookUpdate {
            available_copies: Some(Copies::new(3).unwrap()),
            ..BookUpdate::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn test_author_full_name() {
        let author = Author {
            id: AuthorId(1),
            first_name: "Ursula".to_string(),
            last_name: "Le Guin".to_string(),
        };
        assert_eq!(author.full_name(), "Ursula Le Guin");
    }
}
