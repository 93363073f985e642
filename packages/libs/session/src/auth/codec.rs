//! 세션 토큰 서명 및 검증
//!
//! `header.payload.signature` 형식의 JWS(RS256)를 다룹니다. 검증은 서명과
//! 시간 claim(`exp`/`nbf`)까지만 확인하며, role이나 활성화 여부 같은
//! 비즈니스 규칙은 호출 측에서 적용합니다.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, decode_header, encode, Algorithm, Header, Validation};

use crate::error::{Error, Result};

use super::claims::{ClaimSet, CLAIM_EXPIRY, CLAIM_ISSUER, CLAIM_NOT_BEFORE};
use super::keys::KeyProvider;

/// 허용되는 서명 알고리즘 (RSA 계열)
const RSA_ALGORITHMS: [Algorithm; 3] = [Algorithm::RS256, Algorithm::RS384, Algorithm::RS512];

/// 토큰 서명/검증기
#[derive(Clone)]
pub struct TokenCodec {
    issuer: String,
    extension: Duration,
    keys: Arc<dyn KeyProvider>,
}

impl TokenCodec {
    /// 새 코덱 생성
    pub fn new(issuer: impl Into<String>, extension: Duration, keys: Arc<dyn KeyProvider>) -> Self {
        Self {
            issuer: issuer.into(),
            extension,
            keys,
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn extension(&self) -> Duration {
        self.extension
    }

    /// 현재 시각 기준으로 시간 claim을 채우고 서명
    pub fn sign(&self, claims: ClaimSet) -> Result<String> {
        self.sign_at(claims, Utc::now())
    }

    /// `now` 기준으로 시간 claim을 채우고 서명
    pub fn sign_at(&self, mut claims: ClaimSet, now: DateTime<Utc>) -> Result<String> {
        claims.stamp(&self.issuer, now, self.extension)?;

        let key = self.keys.private_key()?;
        encode(&Header::new(Algorithm::RS256), &claims, key).map_err(|e| Error::KeyUnavailable {
            reason: format!("signing failed: {}", e),
        })
    }

    /// 토큰 파싱 및 검증
    ///
    /// # 에러
    /// - 헤더의 알고리즘이 RSA 계열이 아니면 `InvalidSignature`
    /// - 형식, 서명, `exp`/`nbf` 검증에 실패하면 `InvalidSession`
    pub fn verify(&self, token: &str) -> Result<ClaimSet> {
        let header = decode_header(token).map_err(|e| Error::InvalidSession {
            reason: e.to_string(),
        })?;

        // algorithm confusion 방지: 공개키를 HMAC 시크릿으로 쓰게 두지 않는다
        if !RSA_ALGORITHMS.contains(&header.alg) {
            return Err(Error::InvalidSignature {
                reason: format!("unexpected signing method: {:?}", header.alg),
            });
        }

        let key = self.keys.public_key()?;

        let mut validation = Validation::new(header.alg);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&[CLAIM_EXPIRY, CLAIM_NOT_BEFORE, CLAIM_ISSUER]);

        let data = decode::<ClaimSet>(token, key, &validation).map_err(|e| Error::InvalidSession {
            reason: e.to_string(),
        })?;

        Ok(data.claims)
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("issuer", &self.issuer)
            .field("extension", &self.extension)
            .finish_non_exhaustive()
    }
}
