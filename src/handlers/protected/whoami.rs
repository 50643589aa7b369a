use crate::database::User;
use crate::middleware::{ApiResponse, CurrentUser};

/// GET /api/auth/whoami - the user the presented token resolves to
pub async fn whoami(CurrentUser(user): CurrentUser) -> ApiResponse<User> {
    ApiResponse::success(user)
}
