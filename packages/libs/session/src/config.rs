//! 세션 설정
//!
//! 모든 값은 필수이며, 누락되거나 해석할 수 없으면 `Error::Config`를 반환합니다.
//! 호출 측은 이 에러를 복구 불가능한 시작 실패로 취급해야 합니다.

use std::env;

use chrono::Duration;

use crate::error::{Error, Result};
use crate::id::IdStrategy;

pub const ENV_DEBUG: &str = "LB_DEBUGON";
pub const ENV_ISSUER: &str = "JWT_ISSUER";
pub const ENV_EXTENSION_MIN: &str = "JWT_EXTMIN";
pub const ENV_ROLE_DELIMITER: &str = "JWT_APPROLEDELIM";
pub const ENV_ID_STRATEGY: &str = "SESS_ID_STRATEGY";

/// 만료 연장 폭 상한 (366일)
pub const MAX_EXTENSION_MINUTES: i64 = 366 * 24 * 60;

pub const ENV_DB_URL: &str = "SESS_DB_URL";
pub const ENV_NAMESPACE: &str = "SESS_NAMESPACE";
pub const ENV_LOGIN_KIND: &str = "SESS_LOGIN_KIND";
pub const ENV_CLIENT_POOL: &str = "SESS_CLIENT_POOL";

/// 세션 매니저 설정
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// 상세 로깅 (연산 시작/종료 이벤트)
    pub debug: bool,

    /// JWT `iss`에 기록되는 발급자
    pub issuer: String,

    /// 발급/갱신 시 만료까지의 시간 (분)
    pub extension_minutes: i64,

    /// role token 구분자
    pub role_delimiter: String,

    /// 직접 발급 세션의 ID 생성 전략
    pub id_strategy: IdStrategy,
}

impl SessionConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 임의의 key → value 조회 함수에서 설정 로드
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let debug = parse_bool(ENV_DEBUG, &required(&lookup, ENV_DEBUG)?)?;
        let issuer = required(&lookup, ENV_ISSUER)?;

        let raw_extension = required(&lookup, ENV_EXTENSION_MIN)?;
        let extension_minutes: i64 = raw_extension.parse().map_err(|_| Error::Config {
            key: ENV_EXTENSION_MIN.to_string(),
            message: format!("'{}' is not a number of minutes", raw_extension),
        })?;

        let role_delimiter = required(&lookup, ENV_ROLE_DELIMITER)?;

        let id_strategy = match lookup(ENV_ID_STRATEGY) {
            Some(value) if !value.trim().is_empty() => value.trim().parse()?,
            _ => IdStrategy::default(),
        };

        let config = Self {
            debug,
            issuer,
            extension_minutes,
            role_delimiter,
            id_strategy,
        };
        config.validate()?;
        Ok(config)
    }

    /// 값 범위 검증
    pub fn validate(&self) -> Result<()> {
        if self.issuer.trim().is_empty() {
            return Err(config_error(ENV_ISSUER, "issuer must not be empty"));
        }
        if self.extension_minutes <= 0 {
            return Err(config_error(
                ENV_EXTENSION_MIN,
                "extension must be a positive number of minutes",
            ));
        }
        if self.extension_minutes > MAX_EXTENSION_MINUTES {
            return Err(config_error(
                ENV_EXTENSION_MIN,
                &format!("extension must not exceed {} minutes", MAX_EXTENSION_MINUTES),
            ));
        }
        if self.role_delimiter.is_empty() {
            return Err(config_error(ENV_ROLE_DELIMITER, "delimiter must not be empty"));
        }
        Ok(())
    }

    /// 만료 연장 폭
    pub fn extension(&self) -> Result<Duration> {
        Duration::try_minutes(self.extension_minutes)
            .ok_or_else(|| config_error(ENV_EXTENSION_MIN, "extension is out of range"))
    }
}

/// 로그인 후보 저장소 설정
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// DB 접속 URL (예: `sqlite://sessions.db`)
    pub database_url: String,

    /// 레코드 네임스페이스
    pub namespace: String,

    /// 로그인 후보 엔티티 종류 (테이블 이름)
    pub login_kind: String,

    /// 커넥션 풀 크기
    pub pool_size: u32,
}

impl StoreConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 임의의 key → value 조회 함수에서 설정 로드
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_pool = required(&lookup, ENV_CLIENT_POOL)?;
        let pool_size: u32 = raw_pool.parse().map_err(|_| Error::Config {
            key: ENV_CLIENT_POOL.to_string(),
            message: format!("'{}' is not a pool size", raw_pool),
        })?;

        let config = Self {
            database_url: required(&lookup, ENV_DB_URL)?,
            namespace: required(&lookup, ENV_NAMESPACE)?,
            login_kind: required(&lookup, ENV_LOGIN_KIND)?,
            pool_size,
        };
        config.validate()?;
        Ok(config)
    }

    /// 값 범위 검증
    pub fn validate(&self) -> Result<()> {
        if self.pool_size == 0 {
            return Err(config_error(ENV_CLIENT_POOL, "pool size must be at least 1"));
        }
        if !is_identifier(&self.login_kind) {
            return Err(config_error(
                ENV_LOGIN_KIND,
                "kind must contain only ASCII letters, digits and '_'",
            ));
        }
        if self.namespace.trim().is_empty() {
            return Err(config_error(ENV_NAMESPACE, "namespace must not be empty"));
        }
        // 인메모리 DB는 커넥션마다 따로 생기므로 풀 하나로만 공유된다
        if self.is_in_memory() && self.pool_size > 1 {
            return Err(config_error(
                ENV_CLIENT_POOL,
                "in-memory database requires a pool size of 1",
            ));
        }
        Ok(())
    }

    /// SQLite 인메모리 DB URL 여부
    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(config_error(key, "variable is not set")),
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" => Ok(true),
        "0" | "f" | "false" => Ok(false),
        _ => Err(config_error(key, &format!("'{}' is not a boolean", raw))),
    }
}

/// SQL 식별자로 안전한지 확인 (테이블 이름에 그대로 사용됨)
pub(crate) fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn config_error(key: &str, message: &str) -> Error {
    Error::Config {
        key: key.to_string(),
        message: message.to_string(),
    }
}
