//! 로그인 후보 엔티티

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::SessionIdentity;

/// 로그인 후보가 세션으로 활성화될 수 있는 시간 (초)
pub const ACTIVATION_WINDOW_SECS: i64 = 5 * 60;

/// 로그인 후보
///
/// 인증 성공 직후 생성되어, 세션 토큰이 처음 발급될 때 한 번 활성화됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginCandidate {
    /// 저장소 키 (첫 저장 전에는 빈 문자열)
    #[serde(rename = "sessionid")]
    pub session_id: String,

    #[serde(rename = "useraccountid")]
    pub user_account_id: String,

    pub email: String,

    #[serde(rename = "roletoken")]
    pub role_token: String,

    pub activated: bool,

    /// 생성 시각 (이후 변경되지 않음)
    #[serde(rename = "createddate")]
    pub created_at: DateTime<Utc>,

    /// 활성화 시각
    #[serde(rename = "activateddate", default, skip_serializing_if = "Option::is_none")]
    pub activated_at: Option<DateTime<Utc>>,
}

impl LoginCandidate {
    /// 새 후보 생성 (아직 키가 없음)
    pub fn new(
        user_account_id: impl Into<String>,
        email: impl Into<String>,
        role_token: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id: String::new(),
            user_account_id: user_account_id.into(),
            email: email.into(),
            role_token: role_token.into(),
            activated: false,
            created_at: now,
            activated_at: None,
        }
    }

    pub fn activation_window() -> Duration {
        Duration::seconds(ACTIVATION_WINDOW_SECS)
    }

    /// `now` 시점에 활성화 가능한 시간이 지났는지 확인
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at > Self::activation_window()
    }

    /// 활성화 처리
    pub fn activate(&mut self, now: DateTime<Utc>) {
        self.activated = true;
        self.activated_at = Some(now);
    }

    /// 세션 claims에 들어갈 신원 정보
    pub fn identity(&self) -> SessionIdentity {
        SessionIdentity {
            session_id: self.session_id.clone(),
            account_id: self.user_account_id.clone(),
            email: self.email.clone(),
            role_token: self.role_token.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_window() {
        let created = Utc::now();
        let lc = LoginCandidate::new("u1", "a@b.com", "app1:app2", created);

        assert!(!lc.is_expired_at(created));
        assert!(!lc.is_expired_at(created + Duration::seconds(4 * 60 + 59)));
        assert!(!lc.is_expired_at(created + Duration::minutes(5)));
        assert!(lc.is_expired_at(created + Duration::seconds(5 * 60 + 1)));
    }

    #[test]
    fn test_activate() {
        let now = Utc::now();
        let mut lc = LoginCandidate::new("u1", "a@b.com", "app1", now);
        assert!(!lc.activated);
        assert!(lc.activated_at.is_none());

        lc.activate(now);
        assert!(lc.activated);
        assert_eq!(lc.activated_at, Some(now));
        assert_eq!(lc.created_at, now);
    }

    #[test]
    fn test_json_shape() {
        let lc = LoginCandidate::new("u1", "a@b.com", "app1", Utc::now());
        let json = serde_json::to_value(&lc).unwrap();

        assert_eq!(json["useraccountid"], "u1");
        assert_eq!(json["roletoken"], "app1");
        assert_eq!(json["activated"], false);
        assert!(json.get("activateddate").is_none());
    }
}
