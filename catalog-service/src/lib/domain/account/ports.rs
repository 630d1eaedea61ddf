use async_trait::async_trait;

use crate::account::errors::AccountError;
use crate::account::models::AccessToken;
use crate::account::models::Credential;
use crate::account::models::LoginCommand;
use crate::account::models::RegisterCommand;
use crate::account::models::Username;

/// Port for account operations.
#[async_trait]
pub trait AccountServicePort: Send + Sync + 'static {
    /// Register a new account.
    ///
    /// # Returns
    /// The registered username
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `Hashing` - Password could not be hashed
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, command: RegisterCommand) -> Result<Username, AccountError>;

    /// Verify credentials and issue an access token.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown username or wrong password (indistinguishable)
    /// * `TokenIssuance` - Token could not be signed
    /// * `DatabaseError` - Database operation failed
    async fn login(&self, command: LoginCommand) -> Result<AccessToken, AccountError>;
}

/// Persistence operations for credentials.
///
/// Implementations must enforce username uniqueness atomically: of two concurrent
/// inserts for the same username exactly one succeeds.
#[async_trait]
pub trait CredentialRepository: Send + Sync + 'static {
    /// Retrieve a credential by username.
    ///
    /// # Returns
    /// Optional credential (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_username(&self, username: &Username)
        -> Result<Option<Credential>, AccountError>;

    /// Persist a new credential.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken; nothing was written
    /// * `DatabaseError` - Database operation failed
    async fn insert(&self, username: &Username, password_hash: &str) -> Result<(), AccountError>;
}
