//! Authentication: credential hashing, token issue/verify, and per-request
//! identity resolution.

pub mod login;
pub mod password;
pub mod phone;
pub mod resolver;
pub mod token;

pub use login::{authenticate, LoginError, INVALID_CREDENTIALS};
pub use password::{hash_password, verify_password, PasswordError, Verification};
pub use resolver::{IdentityResolver, Resolution, UnauthenticatedReason};
pub use token::{Claims, IssuedToken, TokenError, TokenIssuer, TokenVerifier};
