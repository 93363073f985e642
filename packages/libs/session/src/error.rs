//! 공통 에러 타입
//!
//! 세션 토큰 발급/검증, 로그인 후보 저장소에서 발생하는 에러를 정의합니다.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// stk-session 공통 에러
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────────
    // Token Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("invalid signature: {reason}")]
    InvalidSignature { reason: String },

    #[error("session is no longer valid, please login: {reason}")]
    InvalidSession { reason: String },

    #[error("the claim element does not exist: {name}")]
    ClaimNotFound { name: String },

    #[error("claim '{name}' is reserved and cannot be modified")]
    ReservedClaim { name: String },

    #[error("invalid claim name: '{name}'")]
    InvalidClaimName { name: String },

    #[error("invalid value for claim '{name}': {reason}")]
    InvalidClaimValue { name: String, reason: String },

    // ─────────────────────────────────────────────────────────────────────────────
    // Login Candidate Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("the login candidate does not exist: {id}")]
    CandidateNotFound { id: String },

    #[error("the login candidate has expired: {id}")]
    CandidateExpired { id: String },

    #[error("the login candidate has already been activated: {id}")]
    CandidateAlreadyActivated { id: String },

    #[error("invalid login candidate id: '{id}'")]
    InvalidCandidateId { id: String },

    // ─────────────────────────────────────────────────────────────────────────────
    // Collaborator Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("keypair unavailable: {reason}")]
    KeyUnavailable { reason: String },

    #[error("login candidate store unavailable: {reason}")]
    StoreUnavailable { reason: String },

    #[error("session refresh task failed: {reason}")]
    RefreshFailed { reason: String },

    // ─────────────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("could not parse environment variable {key}: {message}")]
    Config { key: String, message: String },

    // ─────────────────────────────────────────────────────────────────────────────
    // Serialization Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// HTTP 상태 코드로 변환
    pub fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            Error::ReservedClaim { .. }
            | Error::InvalidClaimName { .. }
            | Error::InvalidClaimValue { .. }
            | Error::InvalidCandidateId { .. }
            | Error::Json(_) => 400,

            // 401 Unauthorized
            Error::InvalidSignature { .. }
            | Error::InvalidSession { .. }
            | Error::CandidateExpired { .. } => 401,

            // 404 Not Found
            Error::ClaimNotFound { .. } | Error::CandidateNotFound { .. } => 404,

            // 409 Conflict
            Error::CandidateAlreadyActivated { .. } => 409,

            // 503 Service Unavailable
            Error::KeyUnavailable { .. } | Error::StoreUnavailable { .. } => 503,

            // 500 Internal Server Error
            Error::Config { .. } | Error::RefreshFailed { .. } => 500,
        }
    }

    /// 에러 코드 (클라이언트용)
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidSignature { .. } => "INVALID_SIGNATURE",
            Error::InvalidSession { .. } => "INVALID_SESSION",
            Error::ClaimNotFound { .. } => "CLAIM_NOT_FOUND",
            Error::ReservedClaim { .. } => "RESERVED_CLAIM",
            Error::InvalidClaimName { .. } => "INVALID_CLAIM_NAME",
            Error::InvalidClaimValue { .. } => "INVALID_CLAIM_VALUE",
            Error::CandidateNotFound { .. } => "CANDIDATE_NOT_FOUND",
            Error::CandidateExpired { .. } => "CANDIDATE_EXPIRED",
            Error::CandidateAlreadyActivated { .. } => "CANDIDATE_ALREADY_ACTIVATED",
            Error::InvalidCandidateId { .. } => "INVALID_CANDIDATE_ID",
            Error::KeyUnavailable { .. } => "KEY_UNAVAILABLE",
            Error::StoreUnavailable { .. } => "STORE_UNAVAILABLE",
            Error::RefreshFailed { .. } => "REFRESH_FAILED",
            Error::Config { .. } => "CONFIG_ERROR",
            Error::Json(_) => "JSON_ERROR",
        }
    }

    pub(crate) fn store(err: impl std::fmt::Display) -> Self {
        Error::StoreUnavailable {
            reason: err.to_string(),
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::store(err)
    }
}
