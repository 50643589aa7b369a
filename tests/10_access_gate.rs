mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::Duration;
use tower::ServiceExt;
use uuid::Uuid;

use common::*;
use matrix_pms::config::CredentialCarrier;
use matrix_pms::database::{UserStatus, UserStore};

#[tokio::test]
async fn page_without_credential_redirects_to_login() {
    let app = spawn_app().await;

    let res = app.send(get("/dashboard")).await;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), Some("/login?next=%2Fdashboard"));
}

#[tokio::test]
async fn redirect_preserves_query_string() {
    let app = spawn_app().await;

    let res = app.send(get("/dashboard?tab=arrears")).await;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), Some("/login?next=%2Fdashboard%3Ftab%3Darrears"));
}

#[tokio::test]
async fn valid_cookie_reaches_the_page() {
    let app = spawn_app().await;
    let token = app.token_for(app.user.id, Duration::hours(1));

    let res = app.send(get_with_cookie("/dashboard", &format!("access_token={}", token))).await;

    assert_eq!(res.status(), StatusCode::OK);
    let body = body_string(res).await;
    assert!(body.contains("Jane Wambui"));
}

#[tokio::test]
async fn expired_token_redirects() {
    let app = spawn_app().await;
    let token = app.token_for(app.user.id, Duration::seconds(-1));

    let res = app.send(get_with_cookie("/dashboard", &format!("access_token={}", token))).await;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), Some("/login?next=%2Fdashboard"));
}

#[tokio::test]
async fn token_for_missing_subject_redirects() {
    let app = spawn_app().await;
    let token = app.token_for(Uuid::new_v4(), Duration::hours(1));

    let res = app.send(get_with_cookie("/dashboard", &format!("access_token={}", token))).await;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), Some("/login?next=%2Fdashboard"));
}

#[tokio::test]
async fn forged_and_garbage_tokens_redirect() {
    let app = spawn_app().await;
    let forged = matrix_pms::auth::TokenIssuer::new("not-the-server-secret", Duration::days(1))
        .issue_default(app.user.id)
        .unwrap()
        .token;

    for token in [forged.as_str(), "garbage", "a.b.c"] {
        let res = app.send(get_with_cookie("/dashboard", &format!("access_token={}", token))).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER, "token {:?}", token);
    }
}

#[tokio::test]
async fn deactivated_user_is_turned_away() {
    let app = spawn_app().await;
    let token = app.token_for(app.user.id, Duration::hours(1));
    app.store.set_status(app.user.id, UserStatus::Inactive, None).await.unwrap();

    let res = app.send(get_with_cookie("/dashboard", &format!("access_token={}", token))).await;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn api_without_credential_is_401_not_redirect() {
    let app = spawn_app().await;

    let res = app.send(get("/api/auth/whoami")).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(location(&res).is_none());
    let body = body_json(res).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn api_with_expired_token_is_401() {
    let app = spawn_app().await;
    let token = app.token_for(app.user.id, Duration::seconds(-1));

    let res = app.send(get_with_cookie("/api/auth/whoami", &format!("access_token={}", token))).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn store_outage_is_503_not_redirect() {
    let router = unavailable_router();
    let token = matrix_pms::auth::TokenIssuer::new(SECRET, Duration::days(1))
        .issue_default(Uuid::new_v4())
        .unwrap()
        .token;

    let res = router
        .oneshot(get_with_cookie("/dashboard", &format!("access_token={}", token)))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn bearer_deployment_reads_authorization_header_only() {
    let mut config = test_config();
    config.security.carrier = CredentialCarrier::Bearer;
    let app = spawn_app_with(config).await;
    let token = app.token_for(app.user.id, Duration::hours(1));

    let with_header = Request::builder()
        .uri("/api/auth/whoami")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let res = app.send(with_header).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.send(get_with_cookie("/api/auth/whoami", &format!("access_token={}", token))).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
