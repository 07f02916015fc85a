//! Credential store and session token issuer.
//!
//! Passwords are bcrypt-hashed on the blocking pool. Sessions are HS256 JWTs carrying
//! `sub` (user id), `iat` and `exp`; a token only authenticates while its signature
//! verifies, it is unexpired, and `sub` still resolves to a stored user.

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::GatewayConfig;
use crate::error::{EkaError, Result};
use crate::model::{User, DEFAULT_DEPARTMENT, DEFAULT_ROLE};
use crate::store::{self, Store};

const MIN_PASSWORD_LEN: usize = 6;
const MAX_NAME_LEN: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Sign-up payload. `department` and `role` fall back to `DEPT_TECHNOLOGY` / `user`.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: User,
}

pub struct AuthService {
    users: sled::Tree,
    users_by_email: sled::Tree,
    encoding: EncodingKey,
    decoding: DecodingKey,
    token_ttl: chrono::Duration,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(
        store: &Store,
        secret: &str,
        token_ttl: chrono::Duration,
        bcrypt_cost: u32,
    ) -> sled::Result<Self> {
        Ok(Self {
            users: store.tree(store::USERS)?,
            users_by_email: store.tree(store::USERS_BY_EMAIL)?,
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl,
            bcrypt_cost,
        })
    }

    pub fn from_config(store: &Store, config: &GatewayConfig) -> sled::Result<Self> {
        Self::new(store, &config.jwt_secret, config.token_ttl(), config.bcrypt_cost)
    }

    /// Create an account and issue its first session.
    pub async fn register(&self, registration: Registration) -> Result<Session> {
        let email = normalize_email(&registration.email);
        validate_email(&email)?;
        if registration.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(EkaError::validation(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        let name = registration.name.trim().to_string();
        if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
            return Err(EkaError::validation("name is required (max 100 characters)"));
        }
        let by_email = self.users_by_email.clone();
        let key = email.clone();
        if store::blocking(move || Ok(by_email.contains_key(key.as_bytes())?)).await? {
            return Err(EkaError::DuplicateEmail);
        }

        let cost = self.bcrypt_cost;
        let password = registration.password;
        let password_hash = store::blocking(move || Ok(bcrypt::hash(password, cost)?)).await?;

        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            email,
            password_hash,
            name,
            department: non_empty_or(registration.department, DEFAULT_DEPARTMENT),
            role: non_empty_or(registration.role, DEFAULT_ROLE),
            created_at: Utc::now(),
        };

        let users = self.users.clone();
        let by_email = self.users_by_email.clone();
        let doc = user.clone();
        store::blocking(move || {
            // The index claim is the uniqueness check; a concurrent sign-up loses here.
            if by_email
                .compare_and_swap(doc.email.as_bytes(), None as Option<&[u8]>, Some(doc.id.as_bytes()))?
                .is_err()
            {
                return Err(EkaError::DuplicateEmail);
            }
            if let Err(e) = users.insert(doc.id.as_bytes(), store::encode(&doc)?) {
                let _ = by_email.remove(doc.email.as_bytes());
                return Err(e.into());
            }
            Ok(())
        })
        .await?;

        tracing::info!(user_id = %user.id, department = %user.department, "user registered");
        let token = self.issue_token(&user.id)?;
        Ok(Session { token, user })
    }

    /// Unknown email and wrong password fail identically.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let email = normalize_email(email);
        let user = self.find_by_email(&email).await?;

        let cost = self.bcrypt_cost;
        let password = password.to_string();
        let stored = user.as_ref().map(|u| u.password_hash.clone());
        let verified = store::blocking(move || match stored {
            Some(hash) => Ok(bcrypt::verify(&password, &hash).unwrap_or(false)),
            None => {
                // Spend the same work as a real verify so timing does not reveal the email.
                let _ = bcrypt::hash(&password, cost);
                Ok(false)
            }
        })
        .await?;

        match user {
            Some(user) if verified => {
                tracing::info!(user_id = %user.id, "login succeeded");
                let token = self.issue_token(&user.id)?;
                Ok(Session { token, user })
            }
            _ => {
                tracing::warn!("login rejected");
                Err(EkaError::InvalidCredentials)
            }
        }
    }

    /// Resolve a bearer token to its user. Fails closed.
    pub async fn authenticate(&self, token: &str) -> Result<User> {
        let claims = self.verify_token(token)?;
        self.find_user(&claims.sub)
            .await?
            .ok_or(EkaError::UserNotFound)
    }

    pub fn issue_token(&self, user_id: &str) -> Result<String> {
        self.issue_token_at(user_id, Utc::now())
    }

    /// Sign a token as if issued at `issued_at`; expiry is `issued_at + ttl`.
    pub fn issue_token_at(&self, user_id: &str, issued_at: DateTime<Utc>) -> Result<String> {
        let claims = Claims {
            sub: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.token_ttl).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(EkaError::Token)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => EkaError::TokenExpired,
                _ => EkaError::TokenInvalid,
            })
    }

    pub async fn find_user(&self, id: &str) -> Result<Option<User>> {
        let users = self.users.clone();
        let id = id.to_string();
        store::blocking(move || match users.get(id.as_bytes())? {
            Some(v) => Ok(Some(store::decode(&v)?)),
            None => Ok(None),
        })
        .await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.clone();
        let by_email = self.users_by_email.clone();
        let email = normalize_email(email);
        store::blocking(move || {
            let Some(id) = by_email.get(email.as_bytes())? else {
                return Ok(None);
            };
            match users.get(&id)? {
                Some(v) => Ok(Some(store::decode(&v)?)),
                None => Ok(None),
            }
        })
        .await
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email(email: &str) -> Result<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(EkaError::validation("please provide a valid email"))
    }
}

fn non_empty_or(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape() {
        assert!(validate_email("test@go4garage.com").is_ok());
        assert!(validate_email("no-at-sign.com").is_err());
        assert!(validate_email("a@nodot").is_err());
        assert!(validate_email("@go4garage.com").is_err());
        assert_eq!(normalize_email("  Test@Go4Garage.COM "), "test@go4garage.com");
    }

    #[test]
    fn tampered_token_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(Some(dir.path())).unwrap();
        let auth = AuthService::new(&store, "secret-a", chrono::Duration::hours(24), 4).unwrap();
        let other = AuthService::new(&store, "secret-b", chrono::Duration::hours(24), 4).unwrap();

        let token = other.issue_token("u1").unwrap();
        assert!(matches!(auth.verify_token(&token), Err(EkaError::TokenInvalid)));
        assert!(matches!(auth.verify_token("not.a.jwt"), Err(EkaError::TokenInvalid)));

        let claims = auth.verify_token(&auth.issue_token("u1").unwrap()).unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }
}
