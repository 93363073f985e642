//! SQLite 로그인 후보 저장소
//!
//! 테이블 이름은 설정의 엔티티 종류(kind)를, `namespace` 컬럼은 네임스페이스를
//! 그대로 사용합니다. 쓰기는 모두 단일 레코드 트랜잭션 안에서 수행됩니다.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use crate::config::{is_identifier, StoreConfig};
use crate::error::{Error, Result};
use crate::id::{IdGenerator, IdStrategy};

use super::entity::LoginCandidate;
use super::store::LoginCandidateStore;

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    namespace: String,
    table: String,
    id_strategy: IdStrategy,
}

impl SqliteStore {
    /// 설정대로 풀을 열고 테이블을 준비
    ///
    /// 인메모리 URL(`sqlite::memory:`)은 커넥션마다 별도 DB가 열리므로
    /// `pool_size`가 1이어야 합니다.
    pub async fn connect(config: &StoreConfig, id_strategy: IdStrategy) -> Result<Self> {
        config.validate()?;

        let pool = SqlitePoolOptions::new()
            .max_connections(config.pool_size)
            .connect(&config.database_url)
            .await?;

        Self::from_pool(pool, &config.namespace, &config.login_kind, id_strategy).await
    }

    /// 이미 열린 풀 사용
    pub async fn from_pool(
        pool: SqlitePool,
        namespace: &str,
        kind: &str,
        id_strategy: IdStrategy,
    ) -> Result<Self> {
        if !is_identifier(kind) {
            return Err(Error::Config {
                key: crate::config::ENV_LOGIN_KIND.to_string(),
                message: format!("'{}' is not a valid entity kind", kind),
            });
        }

        let store = Self {
            pool,
            namespace: namespace.to_string(),
            table: kind.to_string(),
            id_strategy,
        };
        store.init().await?;
        Ok(store)
    }

    async fn init(&self) -> Result<()> {
        let ddl = format!(
            r#"CREATE TABLE IF NOT EXISTS {} (
                namespace TEXT NOT NULL,
                id TEXT NOT NULL,
                user_account_id TEXT NOT NULL,
                email TEXT NOT NULL,
                role_token TEXT NOT NULL,
                activated INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                activated_at TEXT,
                PRIMARY KEY (namespace, id)
            );"#,
            self.table
        );
        sqlx::query(&ddl).execute(&self.pool).await?;

        tracing::debug!(table = %self.table, namespace = %self.namespace, "login candidate table ready");
        Ok(())
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::store(format!("invalid timestamp '{}': {}", raw, e)))
}

fn row_to_candidate(row: &SqliteRow) -> Result<LoginCandidate> {
    let created_at: String = row.try_get("created_at")?;
    let activated_at: Option<String> = row.try_get("activated_at")?;

    Ok(LoginCandidate {
        session_id: row.try_get("id")?,
        user_account_id: row.try_get("user_account_id")?,
        email: row.try_get("email")?,
        role_token: row.try_get("role_token")?,
        activated: row.try_get("activated")?,
        created_at: parse_time(&created_at)?,
        activated_at: activated_at.as_deref().map(parse_time).transpose()?,
    })
}

#[async_trait]
impl LoginCandidateStore for SqliteStore {
    async fn create(&self) -> Result<String> {
        Ok(IdGenerator::generate(self.id_strategy))
    }

    async fn get(&self, id: &str) -> Result<LoginCandidate> {
        let sql = format!(
            r#"SELECT id, user_account_id, email, role_token, activated, created_at, activated_at
               FROM {} WHERE namespace = ?1 AND id = ?2"#,
            self.table
        );

        let row = sqlx::query(&sql)
            .bind(&self.namespace)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => row_to_candidate(&row),
            None => Err(Error::CandidateNotFound { id: id.to_string() }),
        }
    }

    async fn put(&self, candidate: &LoginCandidate) -> Result<()> {
        if candidate.session_id.is_empty() {
            return Err(Error::InvalidCandidateId { id: String::new() });
        }

        // created_at은 최초 insert 값 유지
        let sql = format!(
            r#"INSERT INTO {} (namespace, id, user_account_id, email, role_token, activated, created_at, activated_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
               ON CONFLICT(namespace, id) DO UPDATE SET
                   user_account_id = excluded.user_account_id,
                   email = excluded.email,
                   role_token = excluded.role_token,
                   activated = excluded.activated,
                   activated_at = excluded.activated_at"#,
            self.table
        );

        let mut tx = self.pool.begin().await?;
        sqlx::query(&sql)
            .bind(&self.namespace)
            .bind(&candidate.session_id)
            .bind(&candidate.user_account_id)
            .bind(&candidate.email)
            .bind(&candidate.role_token)
            .bind(candidate.activated)
            .bind(candidate.created_at.to_rfc3339())
            .bind(candidate.activated_at.map(|t| t.to_rfc3339()))
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(())
    }

    async fn activate(&self, id: &str, at: DateTime<Utc>) -> Result<bool> {
        let sql = format!(
            r#"UPDATE {} SET activated = 1, activated_at = ?1
               WHERE namespace = ?2 AND id = ?3 AND activated = 0"#,
            self.table
        );

        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(&sql)
            .bind(at.to_rfc3339())
            .bind(&self.namespace)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(result.rows_affected() == 1)
    }
}
