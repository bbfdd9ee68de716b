pub mod password;
pub mod token;

use std::sync::Arc;

use sqlx::PgPool;
use tracing::{info, warn};

use crate::{
    config::Config,
    db::{self, models::User, DbError},
};

use self::{
    password::PasswordHashing,
    token::{Claims, InvalidLifetime, TokenError, TokenSigner},
};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Username already registered")]
    UsernameTaken,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error(transparent)]
    TokenLifetime(#[from] InvalidLifetime),
    #[error(transparent)]
    Db(DbError),
}

impl From<DbError> for AuthError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::Conflict(_) => Self::UsernameTaken,
            other => Self::Db(other),
        }
    }
}

/// Registration, login and bearer-token validation.
///
/// Cheap to clone; the hashing parameters and signing key are shared.
#[derive(Debug, Clone)]
pub struct CredentialService {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    hashing: PasswordHashing,
    signer: TokenSigner,
}

impl CredentialService {
    pub fn new(hashing: PasswordHashing, signer: TokenSigner) -> Self {
        Self {
            inner: Arc::new(Inner { hashing, signer }),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, AuthError> {
        Ok(Self::new(
            PasswordHashing::new(config.password_hash)?,
            TokenSigner::new(&config.token_secret, config.token_ttl_secs)?,
        ))
    }

    /// Argon2 is deliberately slow, so hashing runs on the blocking pool.
    async fn hash_password(&self, password: String) -> Result<String, AuthError> {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || inner.hashing.hash(&password))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?
    }

    async fn verify_password(&self, password: String, stored_hash: String) -> Result<bool, AuthError> {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || inner.hashing.verify(&password, &stored_hash))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))
    }

    /// Creates a user. Uniqueness is enforced by the `users` table, not by a
    /// prior lookup.
    pub async fn register(&self, pool: &PgPool, username: &str, password: &str) -> Result<User, AuthError> {
        let hashed = self.hash_password(password.to_owned()).await?;
        let user = db::users::insert(pool, username, &hashed).await?;
        info!(user_id = user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Checks credentials and returns a freshly signed access token.
    pub async fn login(&self, pool: &PgPool, username: &str, password: &str) -> Result<String, AuthError> {
        let Some(user) = db::users::find_by_username(pool, username).await? else {
            warn!(username = %username, "Login failed: unknown user");
            return Err(AuthError::InvalidCredentials);
        };

        if !self
            .verify_password(password.to_owned(), user.hashed_password)
            .await?
        {
            warn!(username = %username, "Login failed: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(self.issue_token(&user.username))
    }

    pub fn issue_token(&self, subject: &str) -> String {
        self.inner.signer.issue(subject)
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.inner.signer.verify(token)
    }
}
