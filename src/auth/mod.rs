use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Signed token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "uid")]
    pub subject: String,
    pub admin: bool,
    /// Expiry, unix seconds
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
}

impl Claims {
    pub fn new(subject: String, admin: bool, expiry: DateTime<Utc>) -> Self {
        Self {
            subject,
            admin,
            exp: expiry.timestamp(),
            iat: Utc::now().timestamp(),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("JWT secret not configured")]
    MissingSecret,

    #[error("token subject must not be empty")]
    EmptySubject,

    #[error("JWT generation error: {0}")]
    Signing(String),

    #[error("token signature does not match")]
    InvalidSignature,

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token expired")]
    Expired,
}

/// Issues and verifies HS256 tokens with the process-wide secret.
///
/// Built once at startup and shared read-only between requests.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_minutes: i64,
}

impl TokenService {
    pub fn new(secret: &str, ttl_minutes: i64) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        // Expiry is checked by hand: the token is dead at `exp`, not after it,
        // and no leeway is granted.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_minutes,
        })
    }

    /// Issue a token with the configured lifetime
    pub fn issue(&self, subject: &str, admin: bool) -> Result<String, TokenError> {
        self.issue_for(subject, admin, self.ttl_minutes)
    }

    pub fn issue_for(&self, subject: &str, admin: bool, ttl_minutes: i64) -> Result<String, TokenError> {
        let expiry = Utc::now() + Duration::minutes(ttl_minutes);
        self.issue_until(subject, admin, expiry)
    }

    pub fn issue_until(&self, subject: &str, admin: bool, expiry: DateTime<Utc>) -> Result<String, TokenError> {
        if subject.is_empty() {
            return Err(TokenError::EmptySubject);
        }

        let claims = Claims::new(subject.to_string(), admin, expiry);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed(e.to_string()),
        })?;

        let claims = data.claims;
        if claims.subject.is_empty() {
            return Err(TokenError::Malformed("empty subject".to_string()));
        }
        if claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}
