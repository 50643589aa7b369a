pub mod auth;
pub mod response;

pub use auth::{require_api_user, require_page_user, CurrentUser, GatePolicy};
pub use response::{ApiResponse, ApiResult};
