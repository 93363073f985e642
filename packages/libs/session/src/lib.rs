//! stk-session: Santokit 세션 토큰 라이브러리
//!
//! 서명된 세션 토큰의 발급, 검증, 갱신, 앱 claim 변경과
//! 로그인 후보 활성화 흐름을 제공합니다.
//!
//! # 모듈 구조
//!
//! - `auth`: claims 구조, 키 제공자, 토큰 서명/검증
//! - `candidate`: 로그인 후보 엔티티와 저장소
//! - `manager`: 세션 매니저
//! - `refresh`: 비동기 갱신 결과 채널
//! - `config`: 환경변수 기반 설정
//! - `error`: 공통 에러 타입
//! - `id`: 세션 ID 생성 전략

pub mod auth;
pub mod candidate;
pub mod config;
pub mod error;
pub mod id;
pub mod manager;
pub mod refresh;

pub use auth::{ClaimSet, ClaimValue, KeyProvider, RsaKeyPair, SessionIdentity, TokenCodec};
pub use candidate::{LoginCandidate, LoginCandidateStore, MemoryStore, SqliteStore};
pub use config::{SessionConfig, StoreConfig};
pub use error::{Error, Result};
pub use manager::SessionManager;
pub use refresh::{await_refresh, drain, RefreshReceiver};
