//! 라이프사이클 관리.
//!
//! 종료 시그널 대기 및 종료 신호 전파.

use tokio::sync::watch;
use tracing::{error, info};

/// 라이프사이클 관리자
pub struct LifecycleManager {
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl LifecycleManager {
    /// 새 라이프사이클 관리자 생성
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            shutdown_tx: tx,
            shutdown_rx: rx,
        }
    }

    /// 종료 수신기 복제
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.shutdown_rx.clone()
    }

    /// 종료 신호 발송
    pub fn shutdown(&self) {
        info!("종료 신호 발송");
        let _ = self.shutdown_tx.send(true);
    }

    /// OS 시그널 대기 (SIGINT, SIGTERM) 후 종료 신호 발송
    pub async fn wait_for_signal(&self) {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            match (
                signal(SignalKind::interrupt()),
                signal(SignalKind::terminate()),
            ) {
                (Ok(mut sigint), Ok(mut sigterm)) => {
                    tokio::select! {
                        _ = sigint.recv() => info!("SIGINT 수신"),
                        _ = sigterm.recv() => info!("SIGTERM 수신"),
                    }
                }
                (Err(e), _) | (_, Err(e)) => {
                    error!("시그널 핸들러 등록 실패, Ctrl+C만 대기: {e}");
                    wait_ctrl_c().await;
                }
            }
        }

        #[cfg(not(unix))]
        wait_ctrl_c().await;

        self.shutdown();
    }
}

async fn wait_ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Ctrl+C 수신"),
        Err(e) => error!("Ctrl+C 핸들러 등록 실패: {e}"),
    }
}

impl Default for LifecycleManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_creation() {
        let lm = LifecycleManager::new();
        let rx = lm.subscribe();
        assert!(!*rx.borrow());
    }

    #[tokio::test]
    async fn shutdown_reaches_subscribers() {
        let lm = LifecycleManager::new();
        let mut rx = lm.subscribe();
        lm.shutdown();
        rx.changed().await.unwrap();
        assert!(*rx.borrow());
    }
}
