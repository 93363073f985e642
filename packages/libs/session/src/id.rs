//! 세션 ID 생성 전략
//!
//! 로그인 후보 키와 직접 발급되는 세션의 `jti` 값을 생성합니다.
//!
//! # 지원되는 전략
//!
//! - `ulid`: ULID (기본값, 시간순 정렬 가능)
//! - `uuid_v4`: UUID v4 (랜덤)
//! - `uuid_v7`: UUID v7 (시간순 정렬 가능)

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// ID 생성 전략
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// ULID (기본값) - 시간순 정렬 가능한 26자 문자열
    #[default]
    Ulid,

    /// UUID v4 - 완전 랜덤
    UuidV4,

    /// UUID v7 - 시간 기반, 정렬 가능
    UuidV7,
}

impl IdStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdStrategy::Ulid => "ulid",
            IdStrategy::UuidV4 => "uuid_v4",
            IdStrategy::UuidV7 => "uuid_v7",
        }
    }

    /// 이 전략으로 생성된 ID인지 형식만 확인
    pub fn is_well_formed(&self, id: &str) -> bool {
        match self {
            IdStrategy::Ulid => ulid::Ulid::from_string(id).is_ok(),
            IdStrategy::UuidV4 | IdStrategy::UuidV7 => uuid::Uuid::parse_str(id).is_ok(),
        }
    }
}

impl FromStr for IdStrategy {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "ulid" => Ok(IdStrategy::Ulid),
            "uuid_v4" => Ok(IdStrategy::UuidV4),
            "uuid_v7" => Ok(IdStrategy::UuidV7),
            other => Err(Error::Config {
                key: "SESS_ID_STRATEGY".to_string(),
                message: format!("unsupported id strategy '{}'", other),
            }),
        }
    }
}

/// ID 생성기
pub struct IdGenerator;

impl IdGenerator {
    /// 전략에 따라 ID 생성
    pub fn generate(strategy: IdStrategy) -> String {
        match strategy {
            IdStrategy::Ulid => ulid::Ulid::new().to_string(),
            IdStrategy::UuidV4 => uuid::Uuid::new_v4().to_string(),
            IdStrategy::UuidV7 => uuid::Uuid::now_v7().to_string(),
        }
    }
}
