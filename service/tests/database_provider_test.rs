//! Integration tests for the database provider
//!
//! Run with: cargo test -- --ignored

mod common;

use realm_auth::config::SchemaConfig;
use realm_auth::repositories::{DatabaseProvider, RoleStore, UserStore};
use realm_auth::services::{AuthService, DEFAULT_STORE_TIMEOUT};
use realm_auth::{AuthError, Credentials, StoreError};
use std::sync::Arc;
use uuid::Uuid;

fn service(db: &common::TestDb, case_sensitive: bool) -> AuthService {
    let provider = Arc::new(
        DatabaseProvider::new(db.pool.clone(), &SchemaConfig::default(), case_sensitive).unwrap(),
    );
    AuthService::new(provider.clone(), provider, db.verifier.clone(), DEFAULT_STORE_TIMEOUT)
        .unwrap()
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_login_scenario() {
    let db = common::TestDb::new().await;
    let (bob_id, bob) = db.create_user("bob", "please").await;
    db.grant_role(bob_id, "overlord").await;
    let service = service(&db, true);

    let err = service
        .authenticate(&Credentials::new(format!("max_{}", Uuid::new_v4()), "foo"), "users")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::NotFound { .. }));

    let err = service
        .authenticate(&Credentials::new(bob.as_str(), "foo"), "users")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::CredentialMismatch));

    let authenticated = service
        .authenticate(&Credentials::new(bob.as_str(), "please"), "users")
        .await
        .unwrap();
    assert_eq!(authenticated.user.id, bob_id);

    let roles = service.roles_for(&authenticated.user).await.unwrap();
    assert_eq!(roles.join(","), "overlord");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_exact_match_by_default() {
    let db = common::TestDb::new().await;
    let (_, bob) = db.create_user("Bob", "please").await;

    let exact = service(&db, true);
    assert!(exact
        .authenticate(&Credentials::new(bob.to_uppercase(), "please"), "users")
        .await
        .is_err());

    let relaxed = service(&db, false);
    assert!(relaxed
        .authenticate(&Credentials::new(bob.to_uppercase(), "please"), "users")
        .await
        .is_ok());
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_roles_sorted_and_idempotent() {
    let db = common::TestDb::new().await;
    let (id, name) = db.create_user("carol", "pw").await;
    db.grant_role(id, "zeta").await;
    db.grant_role(id, "alpha").await;
    db.grant_role(id, "alpha").await;

    let provider = DatabaseProvider::new(db.pool.clone(), &SchemaConfig::default(), true).unwrap();
    let user = provider.find_by_username(&name).await.unwrap().unwrap();

    let first = provider.roles_for(&user).await.unwrap();
    let second = provider.roles_for(&user).await.unwrap();
    assert_eq!(first.join(" "), "alpha zeta");
    assert_eq!(first, second);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_user_without_roles_has_empty_set() {
    let db = common::TestDb::new().await;
    let (_, name) = db.create_user("dave", "pw").await;

    let provider = DatabaseProvider::new(db.pool.clone(), &SchemaConfig::default(), true).unwrap();
    let user = provider.find_by_username(&name).await.unwrap().unwrap();
    assert!(provider.roles_for(&user).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_orphaned_role_assignment_is_corrupt_data() {
    let db = common::TestDb::new().await;
    sqlx::query("CREATE TABLE IF NOT EXISTS loose_user_roles (user_id UUID NOT NULL, role_id UUID NOT NULL)")
        .execute(&db.pool)
        .await
        .unwrap();
    let (id, name) = db.create_user("erin", "pw").await;
    sqlx::query("INSERT INTO loose_user_roles (user_id, role_id) VALUES ($1, $2)")
        .bind(id)
        .bind(Uuid::new_v4())
        .execute(&db.pool)
        .await
        .unwrap();

    let schema = SchemaConfig {
        user_role_table: "loose_user_roles".to_string(),
        ..SchemaConfig::default()
    };
    let provider = DatabaseProvider::new(db.pool.clone(), &schema, true).unwrap();
    let user = provider.find_by_username(&name).await.unwrap().unwrap();

    let err = provider.roles_for(&user).await.unwrap_err();
    assert!(matches!(err, StoreError::CorruptData(_)));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_legacy_hash_in_database() {
    let db = common::TestDb::new().await;
    let name = format!("legacy_{}", Uuid::new_v4().simple());
    db.insert_user(&name, "{SSHA}lNsIaqhowShwLWYvEJPjKGO7vg0figNc")
        .await;
    let service = service(&db, true);

    let authenticated = service
        .authenticate(&Credentials::new(name.as_str(), "please"), "users")
        .await
        .unwrap();
    assert!(service.verifier().needs_rehash(&authenticated.user.password_hash));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_registry_over_database() {
    use realm_auth::config::AuthConfig;
    use realm_auth::state::RealmRegistry;

    let db = common::TestDb::new().await;
    let (id, name) = db.create_user("frank", "hunter2").await;
    db.grant_role(id, "auditor").await;

    let mut config = AuthConfig::default();
    config.password.argon2_memory_kib = 1024;
    config.password.argon2_iterations = 1;
    let registry = RealmRegistry::with_pool(&config, Some(db.pool.clone())).unwrap();

    assert!(registry.health_check().await.is_ok());
    let outcome = registry
        .authenticate_outcome(None, &Credentials::new(name.as_str(), "hunter2"))
        .await;
    assert!(outcome.success);
    assert_eq!(outcome.realm, "users");
}
