//! 라우트 정의.

use axum::routing::{get, post};
use axum::Router;

use crate::embedded;
use crate::handlers;
use crate::AppState;

/// 전체 라우트
pub fn routes() -> Router<AppState> {
    Router::new()
        // 뷰어 페이지
        .route("/", get(embedded::serve_index))
        .route("/static/{*path}", get(embedded::serve_static))
        // 프레임 스트림
        .route("/ws", get(handlers::ws::ws_handler))
        // 측면 선택
        .route("/set_side/{side}", post(handlers::side::set_side))
        .route("/side", get(handlers::side::get_side))
}
