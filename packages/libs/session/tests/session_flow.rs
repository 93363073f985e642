//! 로그인 후보 → 세션 토큰 → 갱신/claim 변경 전체 흐름

use std::sync::Arc;
use std::time::Duration;

use stk_session::config::StoreConfig;
use stk_session::id::IdStrategy;
use stk_session::{
    await_refresh, ClaimValue, Error, RsaKeyPair, SessionConfig, SessionManager, SqliteStore,
};

const PRIVATE_PEM: &str = include_str!("fixtures/test_private.pem");
const PUBLIC_PEM: &str = include_str!("fixtures/test_public.pem");

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("stk_session=debug")
        .with_test_writer()
        .try_init();
}

async fn manager() -> SessionManager {
    init_tracing();

    let config = SessionConfig {
        debug: true,
        issuer: "stk-auth".to_string(),
        extension_minutes: 20,
        role_delimiter: ":".to_string(),
        id_strategy: IdStrategy::Ulid,
    };
    let store_config = StoreConfig {
        database_url: "sqlite::memory:".to_string(),
        namespace: "accounts".to_string(),
        login_kind: "login_candidate".to_string(),
        pool_size: 1,
    };

    let keys = RsaKeyPair::from_pem(PRIVATE_PEM.as_bytes(), PUBLIC_PEM.as_bytes()).unwrap();
    let store = SqliteStore::connect(&store_config, IdStrategy::Ulid)
        .await
        .unwrap();

    SessionManager::new(config, Arc::new(keys))
        .unwrap()
        .with_store(Arc::new(store))
}

#[tokio::test]
async fn test_candidate_to_session_scenario() {
    let manager = manager().await;

    let login_id = manager
        .save_login_candidate("u1", "a@b.com", "app1:app2")
        .await
        .unwrap();

    let candidate = manager.get_login_candidate(&login_id).await.unwrap();
    assert!(!candidate.activated);
    assert_eq!(candidate.session_id, login_id);

    let token = manager.activate_session(&login_id).await.unwrap();

    assert!(manager.is_session_valid(&token).await.unwrap());
    assert!(manager.check_user_role(&token, "app1").unwrap());
    assert!(manager.check_user_role(&token, "app2").unwrap());
    assert!(!manager.check_user_role(&token, "app3").unwrap());

    let candidate = manager.get_login_candidate(&login_id).await.unwrap();
    assert!(candidate.activated);
    assert!(candidate.activated_at.is_some());
}

#[tokio::test]
async fn test_app_claims_survive_refresh() {
    let manager = manager().await;
    let login_id = manager
        .save_login_candidate("u1", "a@b.com", "app1")
        .await
        .unwrap();
    let token = manager.activate_session(&login_id).await.unwrap();

    let token = manager.set_app_claim(&token, "app1", "editor").unwrap();
    let token = manager.set_app_claim(&token, "quota", 50i64).unwrap();

    let refreshed = await_refresh(
        manager.refresh_session(&token),
        &token,
        Duration::from_secs(5),
    )
    .await;

    assert_eq!(
        manager.get_jwt_claim_element(&refreshed, "app1").unwrap(),
        ClaimValue::from("editor")
    );
    assert_eq!(
        manager
            .get_jwt_claim_element(&refreshed, "quota")
            .unwrap()
            .as_i64(),
        Some(50)
    );
    assert!(manager.is_session_valid(&refreshed).await.unwrap());
}

#[tokio::test]
async fn test_concurrent_activation_single_winner() {
    let manager = manager().await;
    let login_id = manager
        .save_login_candidate("u1", "a@b.com", "app1")
        .await
        .unwrap();

    let (a, b) = tokio::join!(
        manager.activate_session(&login_id),
        manager.activate_session(&login_id)
    );

    let results = [a, b];
    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(Error::CandidateAlreadyActivated { .. }))));
}

#[tokio::test]
async fn test_refresh_rejects_foreign_token() {
    let manager = manager().await;
    let token = manager.new_session("u1", "a@b.com", "app1").unwrap();
    let forged = format!("{}x", token);

    let result = manager.refresh_session(&forged).await.unwrap();
    assert!(result.is_err());

    // 실패하면 기존 토큰 유지
    let kept = await_refresh(
        manager.refresh_session(&forged),
        &forged,
        Duration::from_secs(5),
    )
    .await;
    assert_eq!(kept, forged);
}

#[tokio::test]
async fn test_direct_session_unknown_to_store() {
    let manager = manager().await;
    let token = manager.new_session("u1", "a@b.com", "app1").unwrap();

    let err = manager.is_session_valid(&token).await.unwrap_err();
    assert!(matches!(err, Error::CandidateNotFound { .. }));
}
