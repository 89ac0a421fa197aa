//! 포즈 검출기 포트 — 외부 포즈 추정 엔진 래핑.
//!
//! 구현: `sidepose-vision::detector` (ONNX Runtime, NoOp)

use image::RgbImage;

use crate::error::CoreError;
use crate::models::pose::PoseLandmarks;

/// 포즈 검출기
pub trait PoseDetector: Send {
    /// RGB 프레임에서 포즈 검출.
    ///
    /// 사람이 없으면 `Ok(None)`.
    fn detect(&mut self, frame: &RgbImage) -> Result<Option<PoseLandmarks>, CoreError>;

    /// 검출기 이름 (로그용)
    fn name(&self) -> &str;
}
