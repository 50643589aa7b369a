use thiserror::Error;
use tracing::{info, warn};

use crate::auth::password::{self, Verification};
use crate::auth::phone::{is_valid_phone, normalize_phone};
use crate::database::{DatabaseError, User, UserStore};

/// Message shown for every credential failure so the form never reveals
/// whether the phone number exists.
pub const INVALID_CREDENTIALS: &str = "Invalid phone number or password";

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("{0}")]
    Validation(&'static str),

    #[error("{}", INVALID_CREDENTIALS)]
    InvalidCredentials,

    #[error(transparent)]
    Store(#[from] DatabaseError),
}

/// First problem with the submitted form, if any
pub fn validate_login_form(phone: &str, password: &str) -> Option<&'static str> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Some("Phone number is required");
    }
    if !is_valid_phone(phone) {
        return Some("Invalid Kenyan phone format (e.g. +2547XXXXXXXX or 07XXXXXXXX)");
    }
    if password.trim().is_empty() {
        return Some("Password is required");
    }
    None
}

/// Check phone + password against the store.
///
/// A password still stored as a legacy digest is re-hashed and written back;
/// failure to upgrade is logged and does not block the login.
pub async fn authenticate(users: &dyn UserStore, phone: &str, password: &str) -> Result<User, LoginError> {
    if let Some(message) = validate_login_form(phone, password) {
        return Err(LoginError::Validation(message));
    }

    let phone = normalize_phone(phone);
    let Some(user) = users.find_by_phone(&phone).await? else {
        password::verify_dummy(password);
        warn!(target: "audit", "Login failed for {}: no such user", phone);
        return Err(LoginError::InvalidCredentials);
    };

    let verification = password::verify_password(password, &user.password);
    if !verification.is_match() {
        warn!(target: "audit", "Login failed for {}: incorrect password", phone);
        return Err(LoginError::InvalidCredentials);
    }

    if !user.is_active() {
        warn!(target: "audit", "Login failed for {}: account {}", phone, user.status);
        return Err(LoginError::InvalidCredentials);
    }

    if verification == Verification::LegacyMatch {
        match password::hash_password(password) {
            Ok(hash) => match users.update_password(user.id, &hash, Some(user.id)).await {
                Ok(upgraded) => {
                    info!("Upgraded legacy password hash for user {}", upgraded.id);
                    return Ok(upgraded);
                }
                Err(e) => warn!("Could not upgrade password hash for user {}: {}", user.id, e),
            },
            Err(e) => warn!("Could not re-hash password for user {}: {}", user.id, e),
        }
    }

    info!(target: "audit", "Login succeeded for user {}", user.id);
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{MemoryUserStore, NewUser, UserStatus};

    async fn store_with(password_hash: String) -> (MemoryUserStore, User) {
        let store = MemoryUserStore::new();
        let user = store
            .create(NewUser {
                name: "Otieno".into(),
                phone: "254712345678".into(),
                password: password_hash,
                user_level_id: None,
                landlord_id: None,
                apartment_id: None,
                created_by: None,
            })
            .await
            .unwrap();
        (store, user)
    }

    #[test]
    fn validation_messages() {
        assert_eq!(validate_login_form("", "x"), Some("Phone number is required"));
        assert!(validate_login_form("12345", "x").unwrap().starts_with("Invalid Kenyan phone"));
        assert_eq!(validate_login_form("0712345678", "  "), Some("Password is required"));
        assert_eq!(validate_login_form("0712345678", "secret123"), None);
    }

    #[tokio::test]
    async fn local_phone_matches_normalized_record() {
        let (store, user) = store_with(password::hash_password("secret123").unwrap()).await;
        let found = authenticate(&store, "0712345678", "secret123").await.unwrap();
        assert_eq!(found.id, user.id);
    }

    #[tokio::test]
    async fn unknown_phone_and_wrong_password_look_the_same() {
        let (store, _) = store_with(password::hash_password("secret123").unwrap()).await;

        let unknown = authenticate(&store, "0799999999", "secret123").await.unwrap_err();
        let wrong = authenticate(&store, "0712345678", "nope").await.unwrap_err();

        assert_eq!(unknown.to_string(), INVALID_CREDENTIALS);
        assert_eq!(wrong.to_string(), INVALID_CREDENTIALS);
    }

    #[tokio::test]
    async fn inactive_account_cannot_log_in() {
        let (store, user) = store_with(password::hash_password("secret123").unwrap()).await;
        store.set_status(user.id, UserStatus::Inactive, None).await.unwrap();
        let err = authenticate(&store, "0712345678", "secret123").await.unwrap_err();
        assert!(matches!(err, LoginError::InvalidCredentials));
    }

    #[tokio::test]
    async fn legacy_digest_is_upgraded_on_login() {
        let (store, user) = store_with(password::legacy_digest("secret123")).await;

        let logged_in = authenticate(&store, "+254712345678", "secret123").await.unwrap();
        assert_eq!(logged_in.id, user.id);

        let stored = store.find_by_id(user.id).await.unwrap().unwrap();
        assert!(stored.password.starts_with("$argon2id$"));
        assert_eq!(password::verify_password("secret123", &stored.password), Verification::Match);
    }

    #[tokio::test]
    async fn invalid_form_never_hits_store() {
        let store = MemoryUserStore::new();
        let err = authenticate(&store, "", "").await.unwrap_err();
        assert!(matches!(err, LoginError::Validation("Phone number is required")));
    }
}
