//! 로그인 후보 저장소 추상화
//!
//! 저장소는 키 발급(create), 조회(get), 트랜잭션 upsert(put)와
//! 조건부 활성화(activate)만 제공하면 됩니다.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::id::{IdGenerator, IdStrategy};

use super::entity::LoginCandidate;

/// 로그인 후보 저장소
#[async_trait]
pub trait LoginCandidateStore: Send + Sync {
    /// 새 키 발급 (레코드는 아직 쓰지 않음)
    async fn create(&self) -> Result<String>;

    /// 키로 조회. 없으면 `CandidateNotFound`
    async fn get(&self, id: &str) -> Result<LoginCandidate>;

    /// 단일 레코드 트랜잭션 upsert
    async fn put(&self, candidate: &LoginCandidate) -> Result<()>;

    /// 아직 활성화되지 않은 경우에만 활성화
    ///
    /// 이번 호출이 상태를 바꿨으면 `true`, 이미 활성화되어 있었으면 `false`.
    async fn activate(&self, id: &str, at: DateTime<Utc>) -> Result<bool>;

    /// 키가 없으면 발급해서 채운 뒤 저장하고, 키를 반환
    async fn save(&self, candidate: &mut LoginCandidate) -> Result<String> {
        if candidate.session_id.is_empty() {
            candidate.session_id = self.create().await?;
        }
        self.put(candidate).await?;
        Ok(candidate.session_id.clone())
    }
}

/// 메모리 저장소
///
/// 테스트나 단일 프로세스 임베딩용입니다.
#[derive(Debug, Default)]
pub struct MemoryStore {
    id_strategy: IdStrategy,
    records: RwLock<HashMap<String, LoginCandidate>>,
}

impl MemoryStore {
    pub fn new(id_strategy: IdStrategy) -> Self {
        Self {
            id_strategy,
            records: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> Error {
    Error::store("memory store lock poisoned")
}

#[async_trait]
impl LoginCandidateStore for MemoryStore {
    async fn create(&self) -> Result<String> {
        Ok(IdGenerator::generate(self.id_strategy))
    }

    async fn get(&self, id: &str) -> Result<LoginCandidate> {
        let records = self.records.read().map_err(poisoned)?;
        records
            .get(id)
            .cloned()
            .ok_or_else(|| Error::CandidateNotFound { id: id.to_string() })
    }

    async fn put(&self, candidate: &LoginCandidate) -> Result<()> {
        if candidate.session_id.is_empty() {
            return Err(Error::InvalidCandidateId { id: String::new() });
        }

        let mut records = self.records.write().map_err(poisoned)?;
        let mut record = candidate.clone();
        // 생성 시각은 최초 저장 값을 유지
        if let Some(existing) = records.get(&candidate.session_id) {
            record.created_at = existing.created_at;
        }
        records.insert(record.session_id.clone(), record);
        Ok(())
    }

    async fn activate(&self, id: &str, at: DateTime<Utc>) -> Result<bool> {
        let mut records = self.records.write().map_err(poisoned)?;
        let record = records
            .get_mut(id)
            .ok_or_else(|| Error::CandidateNotFound { id: id.to_string() })?;

        if record.activated {
            return Ok(false);
        }
        record.activate(at);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_save_assigns_key() {
        let store = MemoryStore::new(IdStrategy::Ulid);
        let mut lc = LoginCandidate::new("u1", "a@b.com", "app1", Utc::now());

        let id = store.save(&mut lc).await.unwrap();
        assert_eq!(id.len(), 26);
        assert_eq!(lc.session_id, id);

        let loaded = store.get(&id).await.unwrap();
        assert_eq!(loaded, lc);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_resave_keeps_key_and_created_at() {
        let store = MemoryStore::default();
        let created = Utc::now() - Duration::minutes(1);
        let mut lc = LoginCandidate::new("u1", "a@b.com", "app1", created);
        let id = store.save(&mut lc).await.unwrap();

        lc.email = "new@b.com".to_string();
        lc.created_at = Utc::now();
        let again = store.save(&mut lc).await.unwrap();
        assert_eq!(again, id);
        assert_eq!(store.len(), 1);

        let loaded = store.get(&id).await.unwrap();
        assert_eq!(loaded.email, "new@b.com");
        assert_eq!(loaded.created_at, created);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let store = MemoryStore::default();
        let err = store.get("missing").await.unwrap_err();
        assert!(matches!(err, Error::CandidateNotFound { .. }));
    }

    #[tokio::test]
    async fn test_activate_only_once() {
        let store = MemoryStore::default();
        let mut lc = LoginCandidate::new("u1", "a@b.com", "app1", Utc::now());
        let id = store.save(&mut lc).await.unwrap();

        let at = Utc::now();
        assert!(store.activate(&id, at).await.unwrap());
        assert!(!store.activate(&id, Utc::now()).await.unwrap());

        let loaded = store.get(&id).await.unwrap();
        assert!(loaded.activated);
        assert_eq!(loaded.activated_at, Some(at));
    }
}
