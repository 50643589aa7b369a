use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Signing algorithm shared by issuer and verifier
pub const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: string-encoded user id
    pub sub: String,
    /// Absolute expiry, Unix seconds
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
}

impl Claims {
    /// Fails when `issued_at + ttl` leaves the representable date range
    pub fn new(subject: Uuid, issued_at: DateTime<Utc>, ttl: Duration) -> Result<Self, TokenError> {
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .ok_or_else(|| TokenError::Generation(format!("lifetime of {} seconds is out of range", ttl.num_seconds())))?;
        Ok(Self {
            sub: subject.to_string(),
            exp: expires_at.timestamp(),
            iat: issued_at.timestamp(),
        })
    }

    pub fn subject_id(&self) -> Result<Uuid, TokenError> {
        Uuid::parse_str(&self.sub).map_err(|_| TokenError::Invalid(format!("subject '{}' is not a user id", self.sub)))
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,

    #[error("Invalid token: {0}")]
    Invalid(String),

    #[error("JWT generation error: {0}")]
    Generation(String),
}

/// A freshly signed token and when it stops being valid
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    #[serde(skip)]
    pub ttl: Duration,
}

impl IssuedToken {
    pub fn expires_in_secs(&self) -> i64 {
        self.ttl.num_seconds()
    }
}

/// Builds signed, time-bound identity tokens
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    default_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, default_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn issue(&self, subject: Uuid, ttl: Duration) -> Result<IssuedToken, TokenError> {
        let now = Utc::now();
        let claims = Claims::new(subject, now, ttl)?;
        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or_else(|| TokenError::Generation(format!("expiry {} out of range", claims.exp)))?;

        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Generation(e.to_string()))?;

        Ok(IssuedToken { token, expires_at, ttl })
    }

    /// Issue with the configured lifetime
    pub fn issue_default(&self, subject: Uuid) -> Result<IssuedToken, TokenError> {
        self.issue(subject, self.default_ttl)
    }
}

/// Checks signature and expiry of inbound tokens
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Signature is checked before expiry, so an expired token with a bad
    /// signature reports `Invalid`.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })
    }
}
