//! 세션 토큰 Claims
//!
//! 서명된 세션 토큰의 페이로드 구조입니다. 고정 필드(`jti`, `aid`, `eml`, `rle`)와
//! 시간 claim(`iss`, `iat`, `nbf`, `exp`)은 다른 서비스가 의존하는 계약이므로
//! 필드 이름을 바꾸면 안 됩니다. 앱별 claim은 최상위 키로 함께 직렬화됩니다.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const CLAIM_SESSION_ID: &str = "jti";
pub const CLAIM_ACCOUNT_ID: &str = "aid";
pub const CLAIM_EMAIL: &str = "eml";
pub const CLAIM_ROLE: &str = "rle";
pub const CLAIM_ISSUER: &str = "iss";
pub const CLAIM_ISSUED_AT: &str = "iat";
pub const CLAIM_NOT_BEFORE: &str = "nbf";
pub const CLAIM_EXPIRY: &str = "exp";

/// 앱 claim으로 덮어쓸 수 없는 이름
pub const RESERVED_CLAIMS: [&str; 8] = [
    CLAIM_SESSION_ID,
    CLAIM_ACCOUNT_ID,
    CLAIM_EMAIL,
    CLAIM_ROLE,
    CLAIM_ISSUER,
    CLAIM_ISSUED_AT,
    CLAIM_NOT_BEFORE,
    CLAIM_EXPIRY,
];

/// Claim 값
///
/// 토큰에 실을 수 있는 값의 종류를 문자열/정수/실수/불리언으로 제한합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClaimValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ClaimValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ClaimValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ClaimValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ClaimValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for ClaimValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClaimValue::Bool(b) => write!(f, "{}", b),
            ClaimValue::Int(n) => write!(f, "{}", n),
            ClaimValue::Float(x) => write!(f, "{}", x),
            ClaimValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for ClaimValue {
    fn from(value: &str) -> Self {
        ClaimValue::Text(value.to_string())
    }
}

impl From<String> for ClaimValue {
    fn from(value: String) -> Self {
        ClaimValue::Text(value)
    }
}

impl From<i64> for ClaimValue {
    fn from(value: i64) -> Self {
        ClaimValue::Int(value)
    }
}

impl From<f64> for ClaimValue {
    fn from(value: f64) -> Self {
        ClaimValue::Float(value)
    }
}

impl From<bool> for ClaimValue {
    fn from(value: bool) -> Self {
        ClaimValue::Bool(value)
    }
}

/// 세션 신원 정보
///
/// 토큰이 발급될 때 고정되고, 이후 refresh/claim 변경에도 그대로 유지됩니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub session_id: String,
    pub account_id: String,
    pub email: String,
    pub role_token: String,
}

/// 세션 토큰 Claims (JWT 페이로드)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimSet {
    /// 세션 ID
    #[serde(rename = "jti")]
    pub session_id: String,

    /// 계정 ID
    #[serde(rename = "aid")]
    pub account_id: String,

    /// 이메일 (정보용)
    #[serde(rename = "eml")]
    pub email: String,

    /// 구분자로 연결된 role 목록
    #[serde(rename = "rle")]
    pub role_token: String,

    /// 발급자
    pub iss: String,

    /// 발급 시각 (Unix 초)
    pub iat: i64,

    /// 유효 시작 시각 (Unix 초)
    pub nbf: i64,

    /// 만료 시각 (Unix 초)
    pub exp: i64,

    /// 앱별 claim
    #[serde(flatten)]
    app_claims: BTreeMap<String, ClaimValue>,
}

impl ClaimSet {
    /// 새 claims 생성
    ///
    /// 시간 claim은 서명 직전에 `stamp`로 채워집니다.
    pub fn new(identity: SessionIdentity) -> Self {
        Self {
            session_id: identity.session_id,
            account_id: identity.account_id,
            email: identity.email,
            role_token: identity.role_token,
            iss: String::new(),
            iat: 0,
            nbf: 0,
            exp: 0,
            app_claims: BTreeMap::new(),
        }
    }

    /// 발급자와 시간 claim을 `now` 기준으로 다시 계산
    ///
    /// 만료는 `now + extension`이며, 이전 만료 시각에 더하지 않습니다.
    /// 다만 시간 claim은 초 단위이므로 같은 초 안에 다시 서명하면 만료가
    /// 그대로일 수 있습니다. 이때는 이전 만료보다 1초 뒤로 잡아 재발급된
    /// 토큰의 만료가 항상 더 늦도록 합니다.
    ///
    /// # 에러
    /// - `now + extension`이 표현 범위를 넘으면 `Config`
    pub fn stamp(&mut self, issuer: &str, now: DateTime<Utc>, extension: Duration) -> Result<()> {
        let expires = now
            .checked_add_signed(extension)
            .ok_or_else(|| Error::Config {
                key: crate::config::ENV_EXTENSION_MIN.to_string(),
                message: format!("expiry overflows with extension {}", extension),
            })?
            .timestamp();

        self.iss = issuer.to_string();
        self.iat = now.timestamp();
        self.nbf = now.timestamp();
        self.exp = if expires > self.exp {
            expires
        } else {
            self.exp.saturating_add(1)
        };
        Ok(())
    }

    pub fn identity(&self) -> SessionIdentity {
        SessionIdentity {
            session_id: self.session_id.clone(),
            account_id: self.account_id.clone(),
            email: self.email.clone(),
            role_token: self.role_token.clone(),
        }
    }

    /// 만료 시각
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    pub fn app_claims(&self) -> &BTreeMap<String, ClaimValue> {
        &self.app_claims
    }

    pub fn app_claim(&self, name: &str) -> Option<&ClaimValue> {
        self.app_claims.get(name)
    }

    /// 앱 claim 추가 또는 덮어쓰기
    pub fn set_app_claim(&mut self, name: &str, value: ClaimValue) -> Result<()> {
        validate_claim_name(name)?;
        if let ClaimValue::Float(x) = &value {
            if !x.is_finite() {
                return Err(Error::InvalidClaimValue {
                    name: name.to_string(),
                    reason: "number must be finite".to_string(),
                });
            }
        }
        self.app_claims.insert(name.to_string(), value);
        Ok(())
    }

    /// 앱 claim 제거 (없으면 아무 일도 하지 않음)
    pub fn remove_app_claim(&mut self, name: &str) -> Result<Option<ClaimValue>> {
        validate_claim_name(name)?;
        Ok(self.app_claims.remove(name))
    }

    /// 고정 필드 또는 앱 claim 조회
    pub fn get(&self, name: &str) -> Option<ClaimValue> {
        match name {
            CLAIM_SESSION_ID => Some(ClaimValue::from(self.session_id.as_str())),
            CLAIM_ACCOUNT_ID => Some(ClaimValue::from(self.account_id.as_str())),
            CLAIM_EMAIL => Some(ClaimValue::from(self.email.as_str())),
            CLAIM_ROLE => Some(ClaimValue::from(self.role_token.as_str())),
            CLAIM_ISSUER => Some(ClaimValue::from(self.iss.as_str())),
            CLAIM_ISSUED_AT => Some(ClaimValue::Int(self.iat)),
            CLAIM_NOT_BEFORE => Some(ClaimValue::Int(self.nbf)),
            CLAIM_EXPIRY => Some(ClaimValue::Int(self.exp)),
            _ => self.app_claims.get(name).cloned(),
        }
    }

    /// role token을 구분자로 나눈 목록
    pub fn roles<'a>(&'a self, delimiter: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.role_token.split(delimiter)
    }

    /// 특정 role 보유 확인
    ///
    /// 구분된 항목 중 하나와 정확히 같아야 하며, 부분 일치는 허용하지 않습니다.
    pub fn has_role(&self, role: &str, delimiter: &str) -> bool {
        self.roles(delimiter).any(|r| r == role)
    }
}

fn validate_claim_name(name: &str) -> Result<()> {
    if RESERVED_CLAIMS.contains(&name) {
        return Err(Error::ReservedClaim {
            name: name.to_string(),
        });
    }
    if name.is_empty() || name.trim() != name || name.chars().any(char::is_control) {
        return Err(Error::InvalidClaimName {
            name: name.to_string(),
        });
    }
    Ok(())
}
