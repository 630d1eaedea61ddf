use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;

use crate::account::errors::AccountError;
use crate::account::models::AccessToken;
use crate::account::models::LoginCommand;
use crate::account::models::RegisterCommand;
use crate::account::models::Username;
use crate::account::ports::AccountServicePort;
use crate::account::ports::CredentialRepository;

/// Domain service implementation for account operations.
///
/// Argon2 work runs on the blocking thread pool so it never stalls request dispatch.
pub struct AccountService<CR>
where
    CR: CredentialRepository,
{
    repository: Arc<CR>,
    authenticator: Arc<Authenticator>,
}

impl<CR> AccountService<CR>
where
    CR: CredentialRepository,
{
    /// Create a new account service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Credential persistence implementation
    /// * `authenticator` - Password hashing and token issuance
    pub fn new(repository: Arc<CR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }
}

#[async_trait]
impl<CR> AccountServicePort for AccountService<CR>
where
    CR: CredentialRepository,
{
    async fn register(&self, command: RegisterCommand) -> Result<Username, AccountError> {
        let RegisterCommand { username, password } = command;

        let authenticator = Arc::clone(&self.authenticator);
        let password_hash =
            tokio::task::spawn_blocking(move || authenticator.hash_password(password.expose()))
                .await
                .map_err(|e| AccountError::Unknown(e.to_string()))?
                .map_err(|e| AccountError::Hashing(e.to_string()))?;

        self.repository.insert(&username, &password_hash).await?;

        tracing::info!(username = %username, "Account registered");

        Ok(username)
    }

    async fn login(&self, command: LoginCommand) -> Result<AccessToken, AccountError> {
        let LoginCommand { username, password } = command;

        let credential = self.repository.find_by_username(&username).await?;
        let known = credential.is_some();

        // A miss still pays for one Argon2 verification.
        let authenticator = Arc::clone(&self.authenticator);
        let subject = username.clone();
        let result = tokio::task::spawn_blocking(move || match credential {
            Some(credential) => authenticator.authenticate(
                password.expose(),
                &credential.password_hash,
                subject.as_str(),
            ),
            None => Err(authenticator.reject_unknown(password.expose())),
        })
        .await
        .map_err(|e| AccountError::Unknown(e.to_string()))?;

        match result {
            Ok(result) => {
                tracing::info!(username = %username, "Login succeeded");
                Ok(AccessToken {
                    username,
                    token: result.access_token,
                })
            }
            Err(AuthenticationError::InvalidCredentials) => {
                let reason = if known { "wrong_password" } else { "unknown_user" };
                tracing::info!(username = %username, reason, "Login rejected");
                Err(AccountError::InvalidCredentials)
            }
            Err(AuthenticationError::JwtError(e)) => Err(AccountError::TokenIssuance(e.to_string())),
        }
    }
}
