//! 애플리케이션 설정 구조체.
//!
//! 웹 서버, 카메라 소스, 포즈 검출기, 주석 스타일, 스트림 인코딩 설정을 정의한다.
//! [`crate::config_manager::ConfigManager`]가 JSON 파일에서 로드한다.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::CoreError;

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 웹 서버 설정
    #[serde(default)]
    pub web: WebConfig,
    /// 카메라(프레임 소스) 설정
    #[serde(default)]
    pub camera: CameraConfig,
    /// 포즈 검출기 설정
    #[serde(default)]
    pub detector: DetectorConfig,
    /// 선/점 주석 스타일
    #[serde(default)]
    pub overlay: OverlayConfig,
    /// 스트림 설정
    #[serde(default)]
    pub stream: StreamConfig,
}

// ============================================================
// 웹 서버 설정
// ============================================================

/// 웹 서버 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    /// 웹 서버 포트 (기본: 8000)
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// 외부 접근 허용 여부 (false: 127.0.0.1 only)
    #[serde(default)]
    pub allow_external: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: default_web_port(),
            allow_external: false,
        }
    }
}

// ============================================================
// 카메라 설정
// ============================================================

/// 프레임 소스 종류
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// 웹캠 장치
    #[default]
    Device,
    /// 정지 이미지 파일 또는 이미지 디렉토리 반복 재생
    Image,
}

/// 카메라 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    #[serde(default)]
    pub source: SourceKind,
    /// 장치 인덱스 (기본: 0)
    #[serde(default)]
    pub device_index: i32,
    /// `source = image`일 때 사용할 파일/디렉토리
    #[serde(default)]
    pub image_path: Option<PathBuf>,
    /// 좌우 반전 (셀카 뷰)
    #[serde(default = "default_true")]
    pub mirror: bool,
    /// 요청 캡처 폭 (장치가 무시할 수 있음)
    #[serde(default)]
    pub width: Option<u32>,
    /// 요청 캡처 높이
    #[serde(default)]
    pub height: Option<u32>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::Device,
            device_index: 0,
            image_path: None,
            mirror: true,
            width: None,
            height: None,
        }
    }
}

// ============================================================
// 포즈 검출기 설정
// ============================================================

/// 검출기 백엔드
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorBackend {
    /// 검출 안 함 — 원본 프레임만 전송
    #[default]
    None,
    /// ONNX Runtime (BlazePose 랜드마크 모델)
    Onnx,
}

/// 포즈 검출기 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    #[serde(default)]
    pub backend: DetectorBackend,
    /// ONNX 모델 경로
    #[serde(default)]
    pub model_path: Option<PathBuf>,
    /// 모델 입력 해상도 (정사각형, 기본: 256)
    #[serde(default = "default_input_size")]
    pub input_size: u32,
    /// 포즈 존재 점수 임계값 (기본: 0.5)
    #[serde(default = "default_min_detection_confidence")]
    pub min_detection_confidence: f32,
    /// 입력 텐서 이름
    #[serde(default = "default_input_name")]
    pub input_name: String,
    /// 랜드마크 출력 텐서 이름 (39 × 5 floats)
    #[serde(default = "default_landmarks_output")]
    pub landmarks_output: String,
    /// 포즈 존재 점수 출력 텐서 이름
    #[serde(default = "default_presence_output")]
    pub presence_output: String,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            backend: DetectorBackend::None,
            model_path: None,
            input_size: default_input_size(),
            min_detection_confidence: default_min_detection_confidence(),
            input_name: default_input_name(),
            landmarks_output: default_landmarks_output(),
            presence_output: default_presence_output(),
        }
    }
}

// ============================================================
// 주석 스타일 설정
// ============================================================

/// 선 두께 / 점 반지름 상한 (px)
pub const MAX_OVERLAY_SIZE: u32 = 64;

/// 선/점 주석 스타일 (RGB)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// 선 색상 (기본: 초록)
    #[serde(default = "default_line_color")]
    pub line_color: [u8; 3],
    /// 선 두께 (px)
    #[serde(default = "default_line_thickness")]
    pub line_thickness: u32,
    /// 점 색상 (기본: 파랑)
    #[serde(default = "default_point_color")]
    pub point_color: [u8; 3],
    /// 점 반지름 (px)
    #[serde(default = "default_point_radius")]
    pub point_radius: u32,
    /// 이 값을 초과하는 가시성만 그린다
    #[serde(default)]
    pub visibility_threshold: f32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            line_color: default_line_color(),
            line_thickness: default_line_thickness(),
            point_color: default_point_color(),
            point_radius: default_point_radius(),
            visibility_threshold: 0.0,
        }
    }
}

// ============================================================
// 스트림 설정
// ============================================================

/// 스트림 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// JPEG 품질 (1~100, 기본: 95)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    /// 시작 시 선택된 측면 라벨 (기본: 빈 문자열 = 선택 없음)
    #[serde(default)]
    pub initial_side: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: default_jpeg_quality(),
            initial_side: String::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_web_port() -> u16 {
    8000
}

fn default_input_size() -> u32 {
    256
}

fn default_min_detection_confidence() -> f32 {
    0.5
}

fn default_input_name() -> String {
    "input_1".to_string()
}

fn default_landmarks_output() -> String {
    "Identity".to_string()
}

fn default_presence_output() -> String {
    "Identity_1".to_string()
}

fn default_line_color() -> [u8; 3] {
    [0, 255, 0]
}

fn default_line_thickness() -> u32 {
    2
}

fn default_point_color() -> [u8; 3] {
    [0, 0, 255]
}

fn default_point_radius() -> u32 {
    3
}

fn default_jpeg_quality() -> u8 {
    95
}

impl AppConfig {
    /// 기본 설정
    pub fn default_config() -> Self {
        Self::default()
    }

    /// 설정값 검증
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.web.port == 0 {
            return Err(invalid("web.port", "0은 사용할 수 없음"));
        }
        if !(1..=100).contains(&self.stream.jpeg_quality) {
            return Err(invalid("stream.jpeg_quality", "1~100 범위여야 함"));
        }
        if self.detector.input_size == 0 {
            return Err(invalid("detector.input_size", "0보다 커야 함"));
        }
        if !(0.0..=1.0).contains(&self.detector.min_detection_confidence) {
            return Err(invalid(
                "detector.min_detection_confidence",
                "0.0~1.0 범위여야 함",
            ));
        }
        if self.detector.backend == DetectorBackend::Onnx && self.detector.model_path.is_none() {
            return Err(invalid("detector.model_path", "onnx 백엔드에는 모델 경로 필요"));
        }
        if !(1..=MAX_OVERLAY_SIZE).contains(&self.overlay.line_thickness) {
            return Err(invalid("overlay.line_thickness", "1~64 범위여야 함"));
        }
        if !(1..=MAX_OVERLAY_SIZE).contains(&self.overlay.point_radius) {
            return Err(invalid("overlay.point_radius", "1~64 범위여야 함"));
        }
        if self.camera.source == SourceKind::Image && self.camera.image_path.is_none() {
            return Err(invalid("camera.image_path", "image 소스에는 경로 필요"));
        }
        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> CoreError {
    CoreError::Validation {
        field: field.to_string(),
        message: message.to_string(),
    }
}
