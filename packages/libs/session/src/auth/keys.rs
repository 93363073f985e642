//! 서명 키 제공자
//!
//! 키 생성/보관은 외부 책임입니다. 이 크레이트는 서명용 개인키와
//! 검증용 공개키를 꺼내 쓰기만 합니다.

use jsonwebtoken::{DecodingKey, EncodingKey};

use crate::error::{Error, Result};

/// RSA 키쌍 제공자
pub trait KeyProvider: Send + Sync {
    /// 서명용 개인키
    fn private_key(&self) -> Result<&EncodingKey>;

    /// 검증용 공개키
    fn public_key(&self) -> Result<&DecodingKey>;
}

/// PEM에서 읽어 들인 RSA 키쌍
#[derive(Clone)]
pub struct RsaKeyPair {
    private: EncodingKey,
    public: DecodingKey,
}

impl RsaKeyPair {
    /// PEM(PKCS#1 또는 PKCS#8) 키 쌍 로드
    pub fn from_pem(private_pem: &[u8], public_pem: &[u8]) -> Result<Self> {
        let private = EncodingKey::from_rsa_pem(private_pem).map_err(|e| Error::KeyUnavailable {
            reason: format!("private key: {}", e),
        })?;
        let public = DecodingKey::from_rsa_pem(public_pem).map_err(|e| Error::KeyUnavailable {
            reason: format!("public key: {}", e),
        })?;

        Ok(Self { private, public })
    }
}

impl KeyProvider for RsaKeyPair {
    fn private_key(&self) -> Result<&EncodingKey> {
        Ok(&self.private)
    }

    fn public_key(&self) -> Result<&DecodingKey> {
        Ok(&self.public)
    }
}

impl std::fmt::Debug for RsaKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RsaKeyPair { .. }")
    }
}
