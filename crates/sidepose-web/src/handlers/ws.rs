//! `GET /ws` — 주석 프레임 스트림.
//!
//! 연결마다 블로킹 캡처 스레드가 새 프레임 소스를 열고, 프레임을 읽어
//! 주석/인코딩한 뒤 채널로 넘긴다. 비동기 쪽은 받은 JPEG를 바이너리 메시지로 전송한다.
//! 연결이 끊기면 채널이 닫히고 캡처 스레드는 소스를 해제한 뒤 종료한다.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use sidepose_core::models::side_selection::SideSelection;
use sidepose_core::ports::frame_source::FrameSource;
use sidepose_vision::processor::{AnnotatedFrame, FrameAnnotator};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};

use crate::AppState;

/// 캡처 스레드 → 전송 루프 채널 용량 (느린 클라이언트면 캡처가 대기)
const FRAME_CHANNEL_CAPACITY: usize = 1;

/// WebSocket 업그레이드
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| stream_frames(socket, state))
}

/// 연결 하나의 스트리밍 루프
async fn stream_frames(socket: WebSocket, state: AppState) {
    info!("WebSocket 연결됨");

    let (mut ws_tx, mut ws_rx) = socket.split();
    let (frame_tx, mut frame_rx) = mpsc::channel::<AnnotatedFrame>(FRAME_CHANNEL_CAPACITY);

    let source = state.sources.create();
    let annotator = state.annotator.clone();
    let side = state.side.clone();
    let capture =
        tokio::task::spawn_blocking(move || capture_loop(source, annotator, side, frame_tx));

    let mut shutdown_rx = state.shutdown.clone();

    loop {
        tokio::select! {
            frame = frame_rx.recv() => {
                // 캡처 종료 (장치 열기/읽기 실패)
                let Some(frame) = frame else { break };
                if let Err(e) = ws_tx.send(Message::Binary(frame.jpeg.into())).await {
                    info!("WebSocket 연결 끊김: {e}");
                    break;
                }
                // 다른 작업에 양보
                tokio::task::yield_now().await;
            }
            incoming = ws_rx.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => {
                        info!("WebSocket 연결 끊김");
                        break;
                    }
                    Some(Err(e)) => {
                        info!("WebSocket 연결 끊김: {e}");
                        break;
                    }
                    // 클라이언트 메시지는 사용하지 않음
                    Some(Ok(_)) => {}
                }
            }
            _ = wait_for_shutdown(&mut shutdown_rx) => {
                info!("종료 신호 — WebSocket 스트림 중단");
                break;
            }
        }
    }

    // 수신 측을 닫아 캡처 스레드를 멈춘다
    drop(frame_rx);
    let _ = ws_tx.close().await;

    match capture.await {
        Ok(sent) => debug!("캡처 스레드 종료 ({sent}개)"),
        Err(e) => error!("캡처 스레드 비정상 종료: {e}"),
    }
}

/// 종료 신호 대기 (송신 측이 없으면 영원히 대기)
async fn wait_for_shutdown(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// 블로킹 캡처 루프. 전송 성공한 프레임 수를 돌려준다.
///
/// 어떤 경로로 끝나든 소스는 해제된다.
fn capture_loop(
    mut source: Box<dyn FrameSource>,
    annotator: Arc<FrameAnnotator>,
    side: SideSelection,
    frame_tx: mpsc::Sender<AnnotatedFrame>,
) -> usize {
    if let Err(e) = source.open() {
        error!("비디오 장치를 열 수 없음 ({}): {e}", source.describe());
        source.release();
        return 0;
    }
    info!("프레임 소스 열림: {}", source.describe());

    let mut sent = 0;
    while !frame_tx.is_closed() {
        let frame = match source.read_frame() {
            Ok(frame) => frame,
            Err(e) => {
                error!("프레임 읽기 실패: {e}");
                break;
            }
        };

        let annotated = match annotator.annotate(frame, side.side()) {
            Ok(annotated) => annotated,
            Err(e) => {
                error!("프레임 처리 실패: {e}");
                break;
            }
        };

        if frame_tx.blocking_send(annotated).is_err() {
            break;
        }
        sent += 1;
    }

    source.release();
    info!("프레임 소스 해제: {} (전송 {sent}개)", source.describe());
    sent
}
