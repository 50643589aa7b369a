use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::auth::{IdentityResolver, TokenIssuer, TokenVerifier};
use crate::config::AppConfig;
use crate::database::UserStore;
use crate::handlers::{protected, public};
use crate::middleware::{require_api_user, require_page_user};

/// Shared, immutable per-process state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub issuer: Arc<TokenIssuer>,
    pub resolver: Arc<IdentityResolver>,
}

impl AppState {
    pub fn new(config: AppConfig, users: Arc<dyn UserStore>) -> Self {
        let security = &config.security;
        let issuer = TokenIssuer::new(&security.jwt_secret, security.token_ttl());
        let resolver = IdentityResolver::new(
            TokenVerifier::new(&security.jwt_secret),
            users.clone(),
            security.carrier.clone(),
        );

        Self {
            config: Arc::new(config),
            users,
            issuer: Arc::new(issuer),
            resolver: Arc::new(resolver),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        // Public
        .merge(public_routes())
        // Gated
        .merge(page_routes(state.clone()))
        .merge(api_routes(state.clone()))
        .with_state(state.clone());

    if let Some(cors) = cors_layer(&state.config) {
        app = app.layer(cors);
    }
    if state.config.api.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }
    app
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/login", get(public::login_form).post(public::login_submit))
        .route("/logout", post(public::logout))
        .route("/api/auth/login", post(public::api_login))
}

fn page_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(protected::dashboard))
        .route_layer(middleware::from_fn_with_state(state, require_page_user))
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/auth/whoami", get(protected::whoami))
        .route_layer(middleware::from_fn_with_state(state, require_api_user))
}

fn cors_layer(config: &AppConfig) -> Option<CorsLayer> {
    let security = &config.security;
    if !security.enable_cors {
        return None;
    }

    if security.cors_origins.iter().any(|origin| origin == "*") {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(Any),
    )
}
