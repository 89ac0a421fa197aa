//! # sidepose-web
//!
//! 로컬 웹 서버.
//! Axum 기반 뷰어 페이지 + WebSocket JPEG 프레임 스트림 + 측면 선택 API.
//!
//! ## 기능
//! - 뷰어 페이지 서빙 (`/`, `/static/*`)
//! - 주석 프레임 스트림 (`/ws`)
//! - 측면 선택 (`POST /set_side/{side}`, `GET /side`)

pub mod embedded;
pub mod error;
pub mod handlers;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use sidepose_core::config::WebConfig;
use sidepose_core::models::side_selection::SideSelection;
use sidepose_core::ports::frame_source::FrameSourceFactory;
use sidepose_vision::processor::FrameAnnotator;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

pub use handlers::side::SideResponse;

/// 포트 바인드 최대 시도 횟수
const MAX_PORT_ATTEMPTS: u16 = 10;

/// 웹 서버 애플리케이션 상태
#[derive(Clone)]
pub struct AppState {
    /// 현재 측면 선택 (모든 연결 공유)
    pub side: SideSelection,
    /// 연결마다 새 프레임 소스를 만드는 팩토리
    pub sources: Arc<dyn FrameSourceFactory>,
    /// 프레임 주석기 (검출기 공유)
    pub annotator: Arc<FrameAnnotator>,
    /// 종료 신호 (스트림 루프 중단용)
    pub shutdown: watch::Receiver<bool>,
}

impl AppState {
    pub fn new(
        side: SideSelection,
        sources: Arc<dyn FrameSourceFactory>,
        annotator: Arc<FrameAnnotator>,
    ) -> Self {
        // 송신 측 없는 채널 — 종료 신호는 `with_shutdown`으로 연결
        let (_, shutdown) = watch::channel(false);
        Self {
            side,
            sources,
            annotator,
            shutdown,
        }
    }

    /// 종료 신호 수신 채널 설정
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = shutdown;
        self
    }
}

/// 라우터 구성 (CORS + 요청 추적 레이어 포함)
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 로컬 웹 서버
pub struct WebServer {
    config: WebConfig,
    state: AppState,
}

impl WebServer {
    /// 새 웹 서버 생성
    pub fn new(config: WebConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// 서버 실행
    ///
    /// 설정 포트에서 시작하여, 포트가 이미 사용 중이면 다음 포트를 시도합니다.
    /// 최대 10개 포트를 시도한 후 실패하면 에러를 반환합니다.
    ///
    /// # Arguments
    /// * `shutdown_rx` - 종료 신호 수신 채널
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) -> Result<(), std::io::Error> {
        let host = if self.config.allow_external {
            "0.0.0.0"
        } else {
            "127.0.0.1"
        };

        let app = build_router(self.state.with_shutdown(shutdown_rx.clone()));

        let base_port = self.config.port;
        let mut last_error = None;

        for attempt in 0..MAX_PORT_ATTEMPTS {
            // 포트 오버플로우 체크
            let Some(port) = base_port.checked_add(attempt) else {
                break;
            };

            let addr: SocketAddr = match format!("{}:{}", host, port).parse() {
                Ok(a) => a,
                Err(e) => {
                    error!("잘못된 주소 {}:{} — {}", host, port, e);
                    continue;
                }
            };

            match TcpListener::bind(addr).await {
                Ok(listener) => {
                    if attempt > 0 {
                        warn!("포트 {} 사용 불가, 대체 포트 {} 사용", base_port, port);
                    }
                    info!("웹 서버 시작: http://{}", addr);

                    axum::serve(listener, app)
                        .with_graceful_shutdown(async move {
                            loop {
                                if *shutdown_rx.borrow() {
                                    info!("웹 서버 종료 신호 수신");
                                    break;
                                }
                                if shutdown_rx.changed().await.is_err() {
                                    break;
                                }
                            }
                        })
                        .await?;

                    info!("웹 서버 종료");
                    return Ok(());
                }
                Err(e) => {
                    if e.kind() == std::io::ErrorKind::AddrInUse {
                        warn!("포트 {} 이미 사용 중, 다음 포트 시도...", port);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::AddrInUse,
                format!(
                    "포트 {}-{} 모두 사용 불가",
                    base_port,
                    base_port.saturating_add(MAX_PORT_ATTEMPTS - 1)
                ),
            )
        }))
    }

    /// 서버 URL 반환
    pub fn url(&self) -> String {
        format!("http://localhost:{}", self.config.port)
    }
}
