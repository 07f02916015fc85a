//! Error taxonomy for the core services.

pub type Result<T, E = EkaError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum EkaError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("token expired")]
    TokenExpired,
    #[error("token invalid")]
    TokenInvalid,
    #[error("user not found")]
    UserNotFound,
    #[error("{0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("{0} timed out")]
    Timeout(&'static str),
    #[error("store: {0}")]
    Store(#[from] sled::Error),
    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("password hash: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),
    #[error("token encoding: {0}")]
    Token(jsonwebtoken::errors::Error),
    #[error("background task: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl EkaError {
    /// Token and session failures. The HTTP boundary collapses all of these into one 401.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            EkaError::TokenExpired | EkaError::TokenInvalid | EkaError::UserNotFound
        )
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        EkaError::Validation(msg.into())
    }
}
