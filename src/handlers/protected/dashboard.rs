use axum::response::Html;

use crate::middleware::CurrentUser;
use crate::views;

/// GET /dashboard
pub async fn dashboard(CurrentUser(user): CurrentUser) -> Html<String> {
    Html(views::dashboard_page(&user))
}
