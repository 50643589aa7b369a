use axum::http::{header, HeaderMap};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::auth::token::{TokenError, TokenVerifier};
use crate::config::CredentialCarrier;
use crate::database::{DatabaseError, User, UserStore};

/// Why a request could not be tied to a user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnauthenticatedReason {
    MissingCredential,
    MalformedOrForgedToken,
    ExpiredToken,
    UnknownSubject,
}

impl UnauthenticatedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnauthenticatedReason::MissingCredential => "no_credential",
            UnauthenticatedReason::MalformedOrForgedToken => "invalid",
            UnauthenticatedReason::ExpiredToken => "expired",
            UnauthenticatedReason::UnknownSubject => "unknown_subject",
        }
    }
}

impl fmt::Display for UnauthenticatedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<TokenError> for UnauthenticatedReason {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => UnauthenticatedReason::ExpiredToken,
            TokenError::Invalid(_) | TokenError::Generation(_) => UnauthenticatedReason::MalformedOrForgedToken,
        }
    }
}

/// Result of identity resolution, consumed once by the access gate
#[derive(Debug, Clone)]
pub enum Resolution {
    Authenticated(User),
    Unauthenticated(UnauthenticatedReason),
}

impl Resolution {
    pub fn user(&self) -> Option<&User> {
        match self {
            Resolution::Authenticated(user) => Some(user),
            Resolution::Unauthenticated(_) => None,
        }
    }

    pub fn reason(&self) -> Option<UnauthenticatedReason> {
        match self {
            Resolution::Authenticated(_) => None,
            Resolution::Unauthenticated(reason) => Some(*reason),
        }
    }
}

/// Turns the credential on an inbound request into a user or a reason.
///
/// Stateless apart from the store handle: every request is verified from
/// scratch, so a cookie that merely exists grants nothing.
pub struct IdentityResolver {
    verifier: TokenVerifier,
    users: Arc<dyn UserStore>,
    carrier: CredentialCarrier,
}

impl IdentityResolver {
    pub fn new(verifier: TokenVerifier, users: Arc<dyn UserStore>, carrier: CredentialCarrier) -> Self {
        Self { verifier, users, carrier }
    }

    /// Pull the raw token from wherever this deployment carries it
    pub fn extract_credential(&self, headers: &HeaderMap) -> Option<String> {
        match &self.carrier {
            CredentialCarrier::Cookie { name } => extract_cookie(headers, name),
            CredentialCarrier::Bearer => extract_bearer(headers),
        }
    }

    /// Store failures are the only error; every credential problem is a
    /// `Resolution::Unauthenticated`.
    pub async fn resolve(&self, headers: &HeaderMap) -> Result<Resolution, DatabaseError> {
        let Some(token) = self.extract_credential(headers) else {
            return Ok(Resolution::Unauthenticated(UnauthenticatedReason::MissingCredential));
        };

        let subject = match self.verifier.verify(&token).and_then(|claims| claims.subject_id()) {
            Ok(subject) => subject,
            Err(e) => {
                debug!("Token rejected: {}", e);
                return Ok(Resolution::Unauthenticated(e.into()));
            }
        };

        match self.users.find_by_id(subject).await? {
            Some(user) if user.is_active() => Ok(Resolution::Authenticated(user)),
            Some(user) => {
                debug!("Token subject {} is {}", user.id, user.status);
                Ok(Resolution::Unauthenticated(UnauthenticatedReason::UnknownSubject))
            }
            None => {
                debug!("Token subject {} not found", subject);
                Ok(Resolution::Unauthenticated(UnauthenticatedReason::UnknownSubject))
            }
        }
    }
}

/// Value of the named cookie across all `Cookie` headers
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

/// Token from `Authorization: Bearer <token>`
pub fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}
