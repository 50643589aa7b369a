// handlers/public/login.rs - interactive sign-in and sign-out

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::auth::{authenticate, IssuedToken, LoginError, Resolution};
use crate::config::SecurityConfig;
use crate::error::ApiError;
use crate::middleware::auth::safe_next;
use crate::views;

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub password: String,
    pub next: Option<String>,
}

/// GET /login
///
/// Already signed-in visitors skip the form and go straight to `next`.
pub async fn login_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<NextQuery>,
) -> Response {
    let next = query.next.as_deref().filter(|next| !next.is_empty());

    if let Ok(Resolution::Authenticated(_)) = state.resolver.resolve(&headers).await {
        return Redirect::to(safe_next(next, &state.config.security.landing_path)).into_response();
    }

    Html(views::login_page(None, "", next)).into_response()
}

/// POST /login
///
/// Success: 303 to the guarded `next` target with the session cookie set.
/// Validation problems re-render with 422, credential failures with 401.
pub async fn login_submit(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let next = form.next.as_deref().filter(|next| !next.is_empty());

    let user = match authenticate(state.users.as_ref(), &form.phone, &form.password).await {
        Ok(user) => user,
        Err(LoginError::Store(e)) => return ApiError::from(e).into_response(),
        Err(e) => {
            let status = match e {
                LoginError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::UNAUTHORIZED,
            };
            let page = views::login_page(Some(&e.to_string()), form.phone.trim(), next);
            return (status, Html(page)).into_response();
        }
    };

    let issued = match state.issuer.issue_default(user.id) {
        Ok(issued) => issued,
        Err(e) => return ApiError::from(e).into_response(),
    };

    let security = &state.config.security;
    let mut response = Redirect::to(safe_next(next, &security.landing_path)).into_response();
    if let Some(cookie) = session_cookie(security, &issued) {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().insert(header::SET_COOKIE, value);
            }
            Err(e) => {
                tracing::error!("Could not encode session cookie: {}", e);
                return ApiError::internal_server_error("Could not create session").into_response();
            }
        }
    }
    response
}

/// POST /logout - drop the cookie and return to the form
pub async fn logout(State(state): State<AppState>) -> Response {
    let security = &state.config.security;
    let mut response = Redirect::to(&security.login_path).into_response();
    if let Some(cookie) = cleared_cookie(security) {
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
    }
    response
}

/// `Set-Cookie` value for a freshly issued token; `None` for bearer deployments
pub fn session_cookie(security: &SecurityConfig, issued: &IssuedToken) -> Option<String> {
    let name = security.cookie_name()?;
    Some(cookie_attributes(
        format!("{}={}", name, issued.token),
        issued.expires_in_secs().max(0),
        security.cookie_secure,
    ))
}

pub fn cleared_cookie(security: &SecurityConfig) -> Option<String> {
    let name = security.cookie_name()?;
    Some(cookie_attributes(format!("{}=", name), 0, security.cookie_secure))
}

fn cookie_attributes(pair: String, max_age: i64, secure: bool) -> String {
    let mut cookie = format!("{}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}", pair, max_age);
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, CredentialCarrier, Environment};
    use chrono::{Duration, Utc};

    fn issued() -> IssuedToken {
        IssuedToken {
            token: "aaa.bbb.ccc".into(),
            expires_at: Utc::now() + Duration::minutes(15),
            ttl: Duration::minutes(15),
        }
    }

    #[test]
    fn cookie_carries_token_and_attributes() {
        let mut config = AppConfig::for_environment(Environment::Development, "s3cret");
        config.security.carrier = CredentialCarrier::Cookie { name: "access_token".into() };
        config.security.cookie_secure = false;

        let cookie = session_cookie(&config.security, &issued()).unwrap();
        assert_eq!(cookie, "access_token=aaa.bbb.ccc; HttpOnly; SameSite=Lax; Path=/; Max-Age=900");

        config.security.cookie_secure = true;
        assert!(session_cookie(&config.security, &issued()).unwrap().ends_with("; Secure"));
    }

    #[test]
    fn cleared_cookie_expires_immediately() {
        let config = AppConfig::for_environment(Environment::Development, "s3cret");
        let cookie = cleared_cookie(&config.security).unwrap();
        assert!(cookie.contains("=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn bearer_deployments_set_no_cookie() {
        let mut config = AppConfig::for_environment(Environment::Development, "s3cret");
        config.security.carrier = CredentialCarrier::Bearer;
        assert!(session_cookie(&config.security, &issued()).is_none());
        assert!(cleared_cookie(&config.security).is_none());
    }
}
