//! 비동기 세션 갱신
//!
//! 갱신은 백그라운드 작업 하나로 실행되고, 결과(새 토큰 또는 에러)는
//! 값 하나짜리 채널로 전달됩니다. 작업이 끝나면 채널은 닫힙니다.
//! RSA 검증/서명은 CPU 작업이므로 blocking 스레드 풀에서 실행합니다.
//!
//! 취소는 협조적입니다. 작업은 결과를 보내기 직전에 한 번만 수신 측이
//! 남아 있는지 확인하며, 계산 도중에 중단되지는 않습니다. 수신 측을
//! drop하면(예: 데드라인 초과) 결과는 버려집니다.

use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// 갱신 결과 수신 채널
pub type RefreshReceiver = oneshot::Receiver<Result<String>>;

/// 갱신 작업을 백그라운드에서 실행하고 결과 채널을 즉시 반환
///
/// tokio 런타임 안에서 호출해야 합니다.
pub(crate) fn spawn_refresh<F>(token_tail: String, work: F) -> RefreshReceiver
where
    F: FnOnce() -> Result<String> + Send + 'static,
{
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let result = tokio::task::spawn_blocking(work)
            .await
            .unwrap_or_else(|e| {
                Err(Error::RefreshFailed {
                    reason: e.to_string(),
                })
            });
        if let Err(e) = &result {
            warn!(token_tail = %token_tail, code = e.code(), error = %e, "session refresh failed");
        }
        deliver(tx, result);
    });

    rx
}

/// 수신 측이 남아 있을 때만 결과 전달
///
/// 전달했으면 `true`.
fn deliver(tx: oneshot::Sender<Result<String>>, result: Result<String>) -> bool {
    if tx.is_closed() {
        debug!("refresh receiver dropped, discarding result");
        return false;
    }
    tx.send(result).is_ok()
}

/// 갱신 결과를 데드라인까지 기다림
///
/// 새 토큰을 받으면 그 토큰을, 에러/데드라인 초과/채널 종료 시에는
/// 현재 토큰을 그대로 반환합니다. 에러는 갱신 작업이 이미 기록했습니다.
pub async fn await_refresh(receiver: RefreshReceiver, current: &str, deadline: Duration) -> String {
    match tokio::time::timeout(deadline, receiver).await {
        Ok(Ok(Ok(token))) => token,
        Ok(Ok(Err(_))) => current.to_string(),
        Ok(Err(_)) => {
            debug!("refresh channel closed without a result");
            current.to_string()
        }
        Err(_) => {
            debug!(deadline_ms = deadline.as_millis() as u64, "refresh deadline elapsed");
            current.to_string()
        }
    }
}

/// 채널이 닫힐 때까지 소비
pub async fn drain(receiver: RefreshReceiver) {
    let _ = receiver.await;
}
