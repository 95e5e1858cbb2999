//! Integration tests for the identity service.

use microauth_auth::config::AuthConfig;
use microauth_auth::error::AuthError;
use microauth_auth::service::{IdentityService, SignupInput};
use microauth_auth::token;
use microauth_core::error::ErrorKind;
use microauth_db::repository::SurrealAccountRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

fn test_config() -> AuthConfig {
    AuthConfig {
        access_token_secret: "access-secret-for-tests".into(),
        refresh_token_secret: "refresh-secret-for-tests".into(),
        access_token_lifetime_secs: 3600,
        pepper: None,
        // Cheap parameters so the suite stays fast.
        argon2_memory_kib: 1024,
        argon2_iterations: 1,
        argon2_parallelism: 1,
    }
}

/// Spin up in-memory DB, run migrations, build the service.
async fn setup() -> IdentityService<SurrealAccountRepository<Db>> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    microauth_db::run_migrations(&db).await.unwrap();

    IdentityService::new(SurrealAccountRepository::new(db), test_config())
}

fn signup(email: &str, password: &str) -> SignupInput {
    SignupInput {
        first_name: "Grace".into(),
        last_name: "Hopper".into(),
        email: email.into(),
        password: password.into(),
    }
}

#[tokio::test]
async fn create_account_then_authenticate() {
    let service = setup().await;

    let account_id = service
        .create_account(signup("grace@example.com", "correct horse"))
        .await
        .unwrap();

    let pair = service
        .authenticate("grace@example.com", "correct horse")
        .await
        .unwrap();
    assert_eq!(pair.expires_in, 3600);

    let claims = service.verify_access_token(&pair.access_token).unwrap();
    assert_eq!(claims.account_id(), Some(account_id));
    assert_eq!(claims.email.as_deref(), Some("grace@example.com"));
    assert_eq!(claims.exp - claims.iat, 3600);

    let refresh_subject = token::decode_refresh_token(&pair.refresh_token, &test_config()).unwrap();
    assert_eq!(refresh_subject, account_id);
}

#[tokio::test]
async fn stored_hash_is_not_the_password() {
    let service = setup().await;
    service
        .create_account(signup("hash@example.com", "plaintext"))
        .await
        .unwrap();

    let account = service.find_account_by_email("hash@example.com").await.unwrap();
    assert_ne!(account.password_hash, "plaintext");
    assert!(account.password_hash.starts_with("$argon2id$"));
}

#[tokio::test]
async fn duplicate_signup_fails() {
    let service = setup().await;
    service
        .create_account(signup("dup@example.com", "pw-one"))
        .await
        .unwrap();

    let err = service
        .create_account(signup("dup@example.com", "pw-two"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::AccountCreationFailed(_)), "{err:?}");
    assert_eq!(err.kind(), ErrorKind::ValidationConflict);

    // The original credential still works.
    service.authenticate("dup@example.com", "pw-one").await.unwrap();
}

#[tokio::test]
async fn wrong_password_is_invalid_credential() {
    let service = setup().await;
    service
        .create_account(signup("wrong@example.com", "right"))
        .await
        .unwrap();

    let err = service
        .authenticate("wrong@example.com", "wrong")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredential), "{err:?}");
    assert_eq!(err.kind(), ErrorKind::ValidationConflict);
}

#[tokio::test]
async fn unknown_email_is_account_not_found() {
    let service = setup().await;

    let err = service
        .authenticate("nobody@example.com", "whatever")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::AccountNotFound), "{err:?}");
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn refresh_reissues_access_without_email() {
    let service = setup().await;
    let account_id = service
        .create_account(signup("refresh@example.com", "pw"))
        .await
        .unwrap();
    let pair = service.authenticate("refresh@example.com", "pw").await.unwrap();

    let refreshed = service
        .refresh_access_token(pair.refresh_token.clone())
        .await
        .unwrap();
    assert_eq!(refreshed.refresh_token, pair.refresh_token);

    let claims = service.verify_access_token(&refreshed.access_token).unwrap();
    assert_eq!(claims.account_id(), Some(account_id));
    assert!(claims.email.is_none());
}

#[tokio::test]
async fn refresh_rejects_tampered_and_cross_type_tokens() {
    let service = setup().await;
    service
        .create_account(signup("tamper@example.com", "pw"))
        .await
        .unwrap();
    let pair = service.authenticate("tamper@example.com", "pw").await.unwrap();

    let mut tampered = pair.refresh_token.clone();
    tampered.push('x');
    let err = service.refresh_access_token(tampered).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidRefreshToken), "{err:?}");

    // An access token is signed with the other secret.
    let err = service
        .refresh_access_token(pair.access_token.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidRefreshToken), "{err:?}");

    let err = service.verify_access_token(&pair.refresh_token).unwrap_err();
    assert!(matches!(err, AuthError::InvalidAccessToken), "{err:?}");
}

#[tokio::test]
async fn refresh_does_not_consult_the_store() {
    let service = setup().await;

    // A well-signed token for an account that was never stored still
    // refreshes: validation is purely cryptographic.
    let ghost = Uuid::new_v4();
    let refresh = token::issue_refresh_token(ghost, chrono::Local::now(), &test_config()).unwrap();
    let pair = service.refresh_access_token(refresh).await.unwrap();
    let claims = service.verify_access_token(&pair.access_token).unwrap();
    assert_eq!(claims.account_id(), Some(ghost));
}
