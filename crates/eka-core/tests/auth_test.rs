//! Integration test: credential store and session tokens against a real sled store.
//!
//! bcrypt cost is kept at the minimum (4) so the suite stays fast.

use chrono::{Duration, Utc};
use eka_core::{AuthService, EkaError, Registration, Store};

fn service(dir: &tempfile::TempDir) -> AuthService {
    let store = Store::open(Some(dir.path())).unwrap();
    AuthService::new(&store, "test-secret", Duration::hours(24), 4).unwrap()
}

fn registration(email: &str) -> Registration {
    Registration {
        email: email.to_string(),
        password: "test123".to_string(),
        name: "Test User".to_string(),
        department: Some("DEPT_TECHNOLOGY".to_string()),
        role: None,
    }
}

#[tokio::test]
async fn register_then_authenticate_returns_the_same_user() {
    let dir = tempfile::tempdir().unwrap();
    let auth = service(&dir);

    let session = auth.register(registration("Test@Go4Garage.com ")).await.unwrap();
    assert_eq!(session.user.email, "test@go4garage.com");
    assert_eq!(session.user.role, "user");
    assert_ne!(session.user.password_hash, "test123");

    let user = auth.authenticate(&session.token).await.unwrap();
    assert_eq!(user.id, session.user.id);
    assert_eq!(user.email, "test@go4garage.com");
}

#[tokio::test]
async fn second_registration_with_same_email_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let auth = service(&dir);

    auth.register(registration("dup@go4garage.com")).await.unwrap();
    let err = auth
        .register(registration("DUP@go4garage.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, EkaError::DuplicateEmail));
}

#[tokio::test]
async fn concurrent_registrations_claim_the_email_once() {
    let dir = tempfile::tempdir().unwrap();
    let auth = service(&dir);

    let mut other = registration("race@go4garage.com");
    other.password = "other-pass".into();
    let (a, b) = tokio::join!(
        auth.register(registration("race@go4garage.com")),
        auth.register(other),
    );
    let winners = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    let loser = if a.is_ok() { b } else { a };
    assert!(matches!(loser, Err(EkaError::DuplicateEmail)));

    let by_email = auth.find_by_email("race@go4garage.com").await.unwrap().unwrap();
    assert_eq!(by_email.email, "race@go4garage.com");
}

#[tokio::test]
async fn register_validates_input() {
    let dir = tempfile::tempdir().unwrap();
    let auth = service(&dir);

    let mut short = registration("a@go4garage.com");
    short.password = "12345".into();
    assert!(matches!(auth.register(short).await, Err(EkaError::Validation(_))));

    let mut nameless = registration("b@go4garage.com");
    nameless.name = "   ".into();
    assert!(matches!(auth.register(nameless).await, Err(EkaError::Validation(_))));

    assert!(matches!(
        auth.register(registration("not-an-email")).await,
        Err(EkaError::Validation(_))
    ));
}

#[tokio::test]
async fn login_accepts_the_right_password_only() {
    let dir = tempfile::tempdir().unwrap();
    let auth = service(&dir);
    let registered = auth.register(registration("login@go4garage.com")).await.unwrap();

    let session = auth.login("login@go4garage.com", "test123").await.unwrap();
    assert_eq!(session.user.id, registered.user.id);
    let user = auth.authenticate(&session.token).await.unwrap();
    assert_eq!(user.email, "login@go4garage.com");

    let wrong = auth.login("login@go4garage.com", "nope123").await.unwrap_err();
    let unknown = auth.login("ghost@go4garage.com", "test123").await.unwrap_err();
    assert!(matches!(wrong, EkaError::InvalidCredentials));
    assert!(matches!(unknown, EkaError::InvalidCredentials));
    assert_eq!(wrong.to_string(), unknown.to_string());
}

#[tokio::test]
async fn expired_token_is_rejected_despite_a_valid_signature() {
    let dir = tempfile::tempdir().unwrap();
    let auth = service(&dir);
    let session = auth.register(registration("old@go4garage.com")).await.unwrap();

    let stale = auth
        .issue_token_at(&session.user.id, Utc::now() - Duration::hours(25))
        .unwrap();
    let err = auth.authenticate(&stale).await.unwrap_err();
    assert!(matches!(err, EkaError::TokenExpired));
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn token_for_a_missing_user_fails_closed() {
    let dir = tempfile::tempdir().unwrap();
    let auth = service(&dir);

    let orphan = auth.issue_token("no-such-user").unwrap();
    let err = auth.authenticate(&orphan).await.unwrap_err();
    assert!(matches!(err, EkaError::UserNotFound));
    assert!(err.is_unauthorized());
}
