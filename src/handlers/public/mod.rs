// handlers/public/mod.rs - endpoints reachable without a credential

pub mod login;
pub mod session;
pub mod system;

pub use login::{login_form, login_submit, logout};
pub use session::api_login;
pub use system::{health, root};
