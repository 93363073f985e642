//! 로그인 후보
//!
//! 인증 성공과 세션 토큰 발급 사이를 잇는 1회용 레코드입니다.
//!
//! # 상태
//!
//! - **created**: 저장 직후 (`activated = false`)
//! - **activated**: 생성 후 5분 이내에 한 번 활성화됨 (종료 상태)
//! - **expired**: 5분이 지난 뒤 활성화를 시도함 (활성화 실패, 레코드는 그대로)

mod entity;
mod sqlite;
mod store;

pub use entity::{LoginCandidate, ACTIVATION_WINDOW_SECS};
pub use sqlite::SqliteStore;
pub use store::{LoginCandidateStore, MemoryStore};
