#![allow(unused_crate_dependencies)]
#![allow(clippy::tests_outside_test_module, reason = "integration tests live in tests/ dir")]
#![allow(clippy::unwrap_used, reason = "panics are the assertion mechanism in tests")]

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tdc_client::guard::{self, GuardDecision, GuardKind};
use tdc_client::{
    ClientConfig, ErrorKind, FileSessionPersistence, OptimisticList, SessionStore, TdcClient,
};
use tdc_types::{LoginRequest, Notification, RegisterRequest, VerifyOtpRequest};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn profile(is_admin: bool, email_verified: bool) -> serde_json::Value {
    json!({
        "id": 7,
        "email": "lead@thapar.edu",
        "team_name": "Skyhawks",
        "leader_name": "Asha",
        "is_admin": is_admin,
        "email_verified": email_verified,
    })
}

fn token_invalid() -> ResponseTemplate {
    ResponseTemplate::new(401).set_body_json(json!({
        "detail": "Given token not valid for any token type",
        "code": "token_not_valid",
    }))
}

fn credentials() -> LoginRequest {
    LoginRequest { email: "lead@thapar.edu".to_string(), password: "hunter22".to_string() }
}

async fn setup() -> (MockServer, TdcClient) {
    let server = MockServer::start().await;
    let config = ClientConfig::default().with_base_url(format!("{}/api/", server.uri()));
    let client = TdcClient::new(config, SessionStore::new()).unwrap();
    (server, client)
}

async fn mount_login(server: &MockServer, is_admin: bool, email_verified: bool) {
    Mock::given(method("POST"))
        .and(path("/api/users/login/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "refresh_token=r1; Path=/; HttpOnly")
                .set_body_json(json!({
                    "access": "old",
                    "user": profile(is_admin, email_verified),
                })),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_expired_token_is_refreshed_with_cookie_and_replayed() {
    let (server, client) = setup().await;
    mount_login(&server, false, true).await;

    Mock::given(method("GET"))
        .and(path("/api/users/details/"))
        .and(header("authorization", "Bearer old"))
        .respond_with(token_invalid())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/refresh/"))
        .and(header("cookie", "refresh_token=r1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access": "new", "user": profile(false, true) })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/details/"))
        .and(header("authorization", "Bearer new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile(false, true)))
        .expect(1)
        .mount(&server)
        .await;

    client.login(&credentials()).await.unwrap();
    let details = client.user_details().await.unwrap();

    assert_eq!(details.team_name, "Skyhawks");
    assert_eq!(client.session().access_token().as_deref(), Some("new"));
    assert_eq!(client.refresh_count(), 1);
}

#[tokio::test]
async fn test_concurrent_expiry_triggers_one_refresh() {
    let (server, client) = setup().await;
    mount_login(&server, false, true).await;

    Mock::given(method("GET"))
        .and(header("authorization", "Bearer old"))
        .respond_with(token_invalid())
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/refresh/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(150))
                .set_body_json(json!({ "access": "new", "user": profile(false, true) })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/details/"))
        .and(header("authorization", "Bearer new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile(false, true)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/notifications/"))
        .and(header("authorization", "Bearer new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    client.login(&credentials()).await.unwrap();
    let (details, notifications) =
        tokio::join!(client.user_details(), client.user_notifications());

    assert!(details.is_ok(), "details: {:?}", details.err());
    assert!(notifications.unwrap().is_empty());
    assert_eq!(client.refresh_count(), 1);
}

#[tokio::test]
async fn test_refresh_failure_expires_session() {
    let (server, client) = setup().await;
    mount_login(&server, false, true).await;

    Mock::given(method("GET"))
        .and(path("/api/tickets/view/"))
        .respond_with(token_invalid())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/refresh/"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "detail": "Refresh token expired" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    client.login(&credentials()).await.unwrap();
    let err = client.tickets().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::AuthExpired);
    assert!(client.session().snapshot().is_cleared());
    assert_eq!(
        guard::evaluate(GuardKind::User, &client.session().snapshot(), "/dashboard"),
        GuardDecision::RedirectToLogin { from: "/dashboard".to_string() }
    );
}

#[tokio::test]
async fn test_participant_is_turned_away_from_admin_dashboard() {
    let (server, client) = setup().await;
    mount_login(&server, false, true).await;

    let user = client.login(&credentials()).await.unwrap();
    assert!(!user.is_admin);
    assert_eq!(client.session().access_token().as_deref(), Some("old"));

    let decision = guard::enforce(GuardKind::Admin, client.session(), "/admin");

    assert_eq!(decision.redirect(), Some("/login"));
    assert!(client.session().snapshot().is_cleared());
}

#[tokio::test]
async fn test_admin_login_rejects_participant() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/admin/login/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access": "tok", "user": profile(false, true) })),
        )
        .mount(&server)
        .await;

    let err = client.admin_login(&credentials()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Authorization);
    assert!(!client.session().is_authenticated());
}

#[tokio::test]
async fn test_otp_verification_unlocks_dashboard() {
    let (server, client) = setup().await;
    mount_login(&server, false, false).await;

    Mock::given(method("POST"))
        .and(path("/api/users/otp/generate/"))
        .and(body_json(json!({ "email": "lead@thapar.edu" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "OTP sent" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/users/verify/email/"))
        .and(body_json(json!({ "email": "lead@thapar.edu", "otp": "123456" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "verified" })))
        .expect(1)
        .mount(&server)
        .await;

    client.login(&credentials()).await.unwrap();
    assert_eq!(
        guard::evaluate(GuardKind::User, &client.session().snapshot(), "/dashboard"),
        GuardDecision::RedirectToVerifyEmail
    );

    client.request_otp("lead@thapar.edu").await.unwrap();
    client
        .verify_email(&VerifyOtpRequest {
            email: "lead@thapar.edu".to_string(),
            otp: "123456".to_string(),
        })
        .await
        .unwrap();

    assert!(client.session().user().unwrap().email_verified);
    assert_eq!(
        guard::evaluate(GuardKind::User, &client.session().snapshot(), "/dashboard"),
        GuardDecision::Render
    );
}

#[tokio::test]
async fn test_invalid_form_never_reaches_server() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/users/register/"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let form = RegisterRequest {
        email: "not-an-email".to_string(),
        password: "short".to_string(),
        team_name: "Skyhawks".to_string(),
        leader_name: "Asha".to_string(),
        phone: None,
        institute: None,
        members: Vec::new(),
    };
    let err = client.register(&form).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    let fields = err.field_errors().unwrap();
    assert!(fields.contains_key("email"));
    assert!(fields.contains_key("password"));
}

#[tokio::test]
async fn test_server_field_errors_become_validation() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/users/login/"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "email": ["No account with this email."] })),
        )
        .mount(&server)
        .await;

    let err = client.login(&credentials()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.field_errors().unwrap()["email"], vec!["No account with this email."]);
}

#[tokio::test]
async fn test_rejected_delete_restores_notification() {
    let (server, client) = setup().await;
    mount_login(&server, true, true).await;
    Mock::given(method("DELETE"))
        .and(path("/api/admin/notifications/2/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    client.login(&credentials()).await.unwrap();
    let note = |id: i64| Notification {
        id,
        title: format!("Round {}", id),
        description: String::new(),
        created_at: chrono::Utc::now(),
    };
    let list = OptimisticList::from_items(vec![note(1), note(2), note(3)]);

    let err = client.retract_notification(&list, 2).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Rollback);
    assert_eq!(list.items().iter().map(|n| n.id).collect::<Vec<_>>(), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_logout_clears_persisted_session_even_on_server_error() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("session.json");
    let server = MockServer::start().await;
    mount_login(&server, false, true).await;
    Mock::given(method("POST"))
        .and(path("/api/users/logout/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let config = ClientConfig::default().with_base_url(format!("{}/api/", server.uri()));
    let session = SessionStore::with_persistence(Arc::new(FileSessionPersistence::new(&file)));
    let client = TdcClient::new(config, session).unwrap();

    client.login(&credentials()).await.unwrap();
    let restored = SessionStore::with_persistence(Arc::new(FileSessionPersistence::new(&file)));
    assert_eq!(restored.access_token().as_deref(), Some("old"));

    client.logout().await.unwrap();
    let restored = SessionStore::with_persistence(Arc::new(FileSessionPersistence::new(&file)));
    assert!(restored.snapshot().is_cleared());
}
