use crate::errors::ApiError;
use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Salted bcrypt hashing with a configurable work factor. The work runs on
/// tokio's blocking pool, not on an async worker.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub async fn hash(&self, plaintext: &str) -> Result<String, ApiError> {
        let (plaintext, cost) = (plaintext.to_owned(), self.cost);
        tokio::task::spawn_blocking(move || bcrypt::hash(plaintext, cost))
            .await
            .map_err(|e| ApiError::InternalError(format!("Password hashing task failed: {}", e)))?
            .map_err(|e| ApiError::InternalError(format!("Password hashing failed: {}", e)))
    }

    pub async fn verify(&self, plaintext: &str, digest: &str) -> Result<bool, ApiError> {
        let (plaintext, digest) = (plaintext.to_owned(), digest.to_owned());
        tokio::task::spawn_blocking(move || bcrypt::verify(plaintext, &digest))
            .await
            .map_err(|e| {
                ApiError::InternalError(format!("Password verification task failed: {}", e))
            })?
            .map_err(|e| ApiError::InternalError(format!("Password verification failed: {}", e)))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (session ID)
    pub exp: usize,
}

/// Sign a cookie value that names a server-side session.
pub fn create_token(
    session_id: &Uuid,
    expires_at: DateTime<Utc>,
    secret: &str,
) -> Result<String, ApiError> {
    let claims = Claims {
        sub: session_id.to_string(),
        exp: expires_at.timestamp().max(0) as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::InternalError(format!("Token Creation failed: {}", e)))
}

/// The session id inside a token, if the signature and expiry check out.
pub fn validate_token(token: &str, secret: &str) -> Option<Uuid> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .ok()?
    .claims;

    Uuid::parse_str(&claims.sub).ok()
}
