//! 세션 토큰 타입 및 서명/검증 로직
//!
//! # 토큰 구조
//!
//! - **헤더**: RS256
//! - **고정 claim**: `jti`(세션), `aid`(계정), `eml`(이메일), `rle`(role token)
//! - **시간 claim**: `iss`, `iat`, `nbf`, `exp` (발급/갱신 시마다 재계산)
//! - **앱 claim**: 발급 후 추가/삭제 가능한 최상위 키

mod claims;
mod codec;
mod keys;

pub use claims::{
    ClaimSet, ClaimValue, SessionIdentity, CLAIM_ACCOUNT_ID, CLAIM_EMAIL, CLAIM_EXPIRY,
    CLAIM_ISSUED_AT, CLAIM_ISSUER, CLAIM_NOT_BEFORE, CLAIM_ROLE, CLAIM_SESSION_ID,
    RESERVED_CLAIMS,
};
pub use codec::TokenCodec;
pub use keys::{KeyProvider, RsaKeyPair};
