pub mod catalog;
pub mod credential;
pub mod memory;

pub use catalog::PostgresAuthorRepository;
pub use catalog::PostgresBookRepository;
pub use credential::PostgresCredentialRepository;
pub use memory::InMemoryCatalogRepository;
pub use memory::InMemoryCredentialRepository;
