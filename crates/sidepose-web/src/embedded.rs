//! 정적 파일 임베드 및 서빙.
//!
//! rust-embed로 `static/` 디렉토리(뷰어 페이지)를 바이너리에 포함한다.

use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use rust_embed::Embed;

use crate::error::ApiError;

/// 뷰어 페이지 임베드
#[derive(Embed)]
#[folder = "static"]
#[include = "*.html"]
#[include = "js/*.js"]
#[include = "css/*.css"]
struct Assets;

/// 인덱스 파일 이름
const INDEX_FILE: &str = "index.html";

/// `GET /` — 뷰어 페이지
pub async fn serve_index() -> Result<Response, ApiError> {
    asset_response(INDEX_FILE)
}

/// `GET /static/{*path}` — 스크립트, 스타일시트
pub async fn serve_static(Path(path): Path<String>) -> Result<Response, ApiError> {
    asset_response(path.trim_start_matches('/'))
}

fn asset_response(path: &str) -> Result<Response, ApiError> {
    let content = Assets::get(path).ok_or_else(|| ApiError::NotFound(path.to_string()))?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();

    let cache_control = if path.ends_with(".html") {
        "no-cache"
    } else {
        "public, max-age=3600"
    };

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime.as_ref()),
            (header::CACHE_CONTROL, cache_control),
        ],
        content.data.into_owned(),
    )
        .into_response())
}
