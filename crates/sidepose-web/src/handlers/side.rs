//! 측면 선택 API.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::AppState;

/// 측면 응답
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SideResponse {
    /// 저장된 측면 라벨 (받은 값 그대로)
    pub side: String,
}

/// `POST /set_side/{side}`
///
/// 라벨을 검증하지 않고 그대로 저장한다. 인식되지 않는 값은 주석 없음으로 처리된다.
pub async fn set_side(
    State(state): State<AppState>,
    Path(side): Path<String>,
) -> Json<SideResponse> {
    info!("측면 수신: {side}");
    let stored = state.side.set(side);
    info!("측면 설정됨: {stored} ({:?})", state.side.side());
    Json(SideResponse { side: stored })
}

/// `GET /side` — 현재 측면 라벨 조회
pub async fn get_side(State(state): State<AppState>) -> Json<SideResponse> {
    Json(SideResponse {
        side: state.side.label(),
    })
}
