use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, Uri},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use crate::app::AppState;
use crate::auth::Resolution;
use crate::database::User;
use crate::error::ApiError;

/// The authenticated user for the current request.
///
/// Inserted by the access gate; handlers behind the gate take it as an
/// extractor instead of re-resolving the credential.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

/// How a route class reacts to an unauthenticated request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatePolicy {
    /// Interactive pages: send the browser to the login form
    Redirect,
    /// Programmatic endpoints: plain 401
    Reject,
}

/// Gate for server-rendered pages
pub async fn require_page_user(State(state): State<AppState>, request: Request, next: Next) -> Response {
    gate(GatePolicy::Redirect, state, request, next).await
}

/// Gate for `/api` routes
pub async fn require_api_user(State(state): State<AppState>, request: Request, next: Next) -> Response {
    gate(GatePolicy::Reject, state, request, next).await
}

async fn gate(policy: GatePolicy, state: AppState, mut request: Request, next: Next) -> Response {
    let resolution = match state.resolver.resolve(request.headers()).await {
        Ok(resolution) => resolution,
        Err(e) => return ApiError::from(e).into_response(),
    };

    match resolution {
        Resolution::Authenticated(user) => {
            request.extensions_mut().insert(CurrentUser(user));
            next.run(request).await
        }
        Resolution::Unauthenticated(reason) => {
            debug!("{} {} unauthenticated: {}", request.method(), request.uri().path(), reason);
            reject(policy, &state.config.security.login_path, request.uri())
        }
    }
}

fn reject(policy: GatePolicy, login_path: &str, uri: &Uri) -> Response {
    match policy {
        GatePolicy::Redirect => Redirect::to(&login_redirect_target(login_path, uri)).into_response(),
        GatePolicy::Reject => ApiError::unauthorized("Authentication required").into_response(),
    }
}

/// `/login?next=<original path and query>`
pub fn login_redirect_target(login_path: &str, uri: &Uri) -> String {
    let original = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    let encoded: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("next", original)
        .finish();
    format!("{}?{}", login_path, encoded)
}

/// Only same-origin absolute paths are honoured as post-login targets.
///
/// Browsers drop tabs and newlines while parsing `Location`, so any
/// whitespace or control character disqualifies the value outright.
pub fn safe_next<'a>(next: Option<&'a str>, fallback: &'a str) -> &'a str {
    match next {
        Some(path) if is_local_path(path) => path,
        _ => fallback,
    }
}

const LOCAL_ORIGIN: &str = "http://localhost/";

fn is_local_path(path: &str) -> bool {
    if !path.starts_with('/') || path.starts_with("//") || path.starts_with("/\\") {
        return false;
    }
    if path.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return false;
    }

    let Ok(base) = url::Url::parse(LOCAL_ORIGIN) else {
        return false;
    };
    matches!(base.join(path), Ok(resolved) if resolved.origin() == base.origin())
}
