//! 세션 매니저
//!
//! 로그인 후보를 활성화해 세션 토큰을 발급하고, 토큰 검증/role 확인/
//! 갱신/앱 claim 변경을 제공합니다.
//!
//! 매니저는 발급한 토큰을 보관하지 않습니다. 유효성은 매번 토큰의 서명과
//! 시간 claim에서 다시 계산하며, 저장소가 연결된 경우에만 로그인 후보의
//! 활성화 여부를 추가로 확인합니다.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::auth::{ClaimSet, ClaimValue, KeyProvider, SessionIdentity, TokenCodec};
use crate::candidate::{LoginCandidate, LoginCandidateStore};
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::id::IdGenerator;
use crate::refresh::{self, RefreshReceiver};

/// 세션 매니저
///
/// 설정은 생성 시 고정되며, 여러 호출자가 동시에 사용해도 안전합니다.
#[derive(Clone)]
pub struct SessionManager {
    config: Arc<SessionConfig>,
    codec: TokenCodec,
    store: Option<Arc<dyn LoginCandidateStore>>,
}

impl SessionManager {
    /// 직접 발급용 매니저 생성
    pub fn new(config: SessionConfig, keys: Arc<dyn KeyProvider>) -> Result<Self> {
        config.validate()?;

        let codec = TokenCodec::new(config.issuer.clone(), config.extension()?, keys);
        let manager = Self {
            config: Arc::new(config),
            codec,
            store: None,
        };
        manager.trace("new", "end");
        Ok(manager)
    }

    /// 로그인 후보 저장소 연결
    pub fn with_store(mut self, store: Arc<dyn LoginCandidateStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    fn store(&self) -> Result<&Arc<dyn LoginCandidateStore>> {
        self.store.as_ref().ok_or_else(|| Error::StoreUnavailable {
            reason: "no login candidate store configured".to_string(),
        })
    }

    fn trace(&self, operation: &'static str, stage: &'static str) {
        if self.config.debug {
            debug!(operation, stage, "session manager");
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Issuance
    // ─────────────────────────────────────────────────────────────────────────────

    /// 새 세션 ID로 토큰을 바로 발급
    pub fn new_session(&self, account_id: &str, email: &str, role_token: &str) -> Result<String> {
        self.trace("new_session", "start");

        let identity = SessionIdentity {
            session_id: IdGenerator::generate(self.config.id_strategy),
            account_id: account_id.to_string(),
            email: email.to_string(),
            role_token: role_token.to_string(),
        };
        let session_id = identity.session_id.clone();
        let token = self.codec.sign(ClaimSet::new(identity))?;

        info!(session = %session_id, account = %account_id, "session issued");
        self.trace("new_session", "end");
        Ok(token)
    }

    /// 로그인 후보 저장 (활성화 전 상태)
    ///
    /// 생성된 후보 ID를 반환합니다.
    pub async fn save_login_candidate(
        &self,
        account_id: &str,
        email: &str,
        role_token: &str,
    ) -> Result<String> {
        self.trace("save_login_candidate", "start");

        let mut candidate = LoginCandidate::new(account_id, email, role_token, Utc::now());
        let id = self.store()?.save(&mut candidate).await?;

        self.trace("save_login_candidate", "end");
        Ok(id)
    }

    /// 로그인 후보 조회
    pub async fn get_login_candidate(&self, login_id: &str) -> Result<LoginCandidate> {
        self.trace("get_login_candidate", "start");
        let candidate = self.store()?.get(login_id).await?;
        self.trace("get_login_candidate", "end");
        Ok(candidate)
    }

    /// 로그인 후보를 활성화하고 세션 토큰 발급
    ///
    /// # 에러
    /// - `CandidateNotFound`: 후보 없음
    /// - `CandidateAlreadyActivated`: 이미 활성화됨 (동시 활성화에서 진 경우 포함)
    /// - `CandidateExpired`: 생성 후 5분 초과
    pub async fn activate_session(&self, login_id: &str) -> Result<String> {
        self.trace("activate_session", "start");
        let store = self.store()?;
        let now = Utc::now();

        let candidate = store.get(login_id).await?;
        if candidate.activated {
            return Err(Error::CandidateAlreadyActivated {
                id: login_id.to_string(),
            });
        }
        if candidate.is_expired_at(now) {
            return Err(Error::CandidateExpired {
                id: login_id.to_string(),
            });
        }

        // 서명이 실패하면 후보는 활성화되지 않은 채로 남는다
        let token = self.codec.sign_at(ClaimSet::new(candidate.identity()), now)?;

        if !store.activate(login_id, now).await? {
            return Err(Error::CandidateAlreadyActivated {
                id: login_id.to_string(),
            });
        }

        info!(session = %login_id, account = %candidate.user_account_id, "login candidate activated");
        self.trace("activate_session", "end");
        Ok(token)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Validation
    // ─────────────────────────────────────────────────────────────────────────────

    /// 토큰의 role token에 `role_name`이 정확히 포함되어 있는지 확인
    pub fn check_user_role(&self, token: &str, role_name: &str) -> Result<bool> {
        self.trace("check_user_role", "start");
        let claims = self.codec.verify(token)?;
        let allowed = claims.has_role(role_name, &self.config.role_delimiter);
        self.trace("check_user_role", "end");
        Ok(allowed)
    }

    /// 검증된 토큰의 전체 claims
    pub fn get_jwt_claim(&self, token: &str) -> Result<ClaimSet> {
        self.trace("get_jwt_claim", "start");
        let claims = self.codec.verify(token)?;
        self.trace("get_jwt_claim", "end");
        Ok(claims)
    }

    /// 검증된 토큰의 claim 하나
    pub fn get_jwt_claim_element(&self, token: &str, name: &str) -> Result<ClaimValue> {
        self.trace("get_jwt_claim_element", "start");
        let claims = self.codec.verify(token)?;
        let value = claims.get(name).ok_or_else(|| Error::ClaimNotFound {
            name: name.to_string(),
        })?;
        self.trace("get_jwt_claim_element", "end");
        Ok(value)
    }

    /// 세션 유효성 확인
    ///
    /// 저장소가 연결되어 있으면 `jti`에 해당하는 로그인 후보가 활성화된
    /// 경우에만 유효합니다.
    pub async fn is_session_valid(&self, token: &str) -> Result<bool> {
        self.trace("is_session_valid", "start");
        let claims = self.codec.verify(token)?;

        let valid = match &self.store {
            Some(store) => store.get(&claims.session_id).await?.activated,
            None => true,
        };

        self.trace("is_session_valid", "end");
        Ok(valid)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Renewal & App Claims
    // ─────────────────────────────────────────────────────────────────────────────

    /// 만료를 연장한 새 토큰을 백그라운드에서 발급
    ///
    /// 결과 채널에는 새 토큰 또는 에러가 정확히 한 번 전달됩니다.
    /// tokio 런타임 안에서 호출해야 합니다.
    pub fn refresh_session(&self, token: &str) -> RefreshReceiver {
        self.trace("refresh_session", "start");

        let codec = self.codec.clone();
        let token = token.to_string();
        let tail = token_tail(&token);
        let rx = refresh::spawn_refresh(tail, move || {
            let claims = codec.verify(&token)?;
            codec.sign(claims)
        });

        self.trace("refresh_session", "end");
        rx
    }

    /// 앱 claim 추가/갱신 후 재서명 (만료도 함께 연장됨)
    pub fn set_app_claim(
        &self,
        token: &str,
        app_name: &str,
        value: impl Into<ClaimValue>,
    ) -> Result<String> {
        self.trace("set_app_claim", "start");
        let mut claims = self.codec.verify(token)?;
        claims.set_app_claim(app_name, value.into())?;
        let token = self.codec.sign(claims)?;
        self.trace("set_app_claim", "end");
        Ok(token)
    }

    /// 앱 claim 삭제 후 재서명 (없는 claim이어도 에러 아님)
    pub fn delete_app_claim(&self, token: &str, app_name: &str) -> Result<String> {
        self.trace("delete_app_claim", "start");
        let mut claims = self.codec.verify(token)?;
        claims.remove_app_claim(app_name)?;
        let token = self.codec.sign(claims)?;
        self.trace("delete_app_claim", "end");
        Ok(token)
    }
}

/// 로그용 토큰 꼬리 (서명 끝 8자)
fn token_tail(token: &str) -> String {
    token
        .get(token.len().saturating_sub(8)..)
        .unwrap_or_default()
        .to_string()
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("config", &self.config)
            .field("codec", &self.codec)
            .field("store", &self.store.is_some())
            .finish()
    }
}
