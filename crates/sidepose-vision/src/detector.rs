//! 포즈 검출기 어댑터.
//!
//! 실제 추론은 외부 엔진에 위임한다.
//! - [`NoOpPoseDetector`] — 검출 없음 (원본 프레임만 전송)
//! - [`OnnxPoseDetector`] — ONNX Runtime + BlazePose 랜드마크 모델 (`onnx` feature)

use sidepose_core::config::{DetectorBackend, DetectorConfig};
use sidepose_core::error::CoreError;
use sidepose_core::models::pose::{Landmark, PoseLandmarks, LANDMARK_COUNT};
use sidepose_core::ports::pose_detector::PoseDetector;
use tracing::info;

/// BlazePose 랜드마크 출력의 랜드마크당 값 개수 (x, y, z, visibility, presence)
pub const BLAZEPOSE_STRIDE: usize = 5;

/// 검출하지 않는 검출기
#[derive(Debug, Default)]
pub struct NoOpPoseDetector;

impl PoseDetector for NoOpPoseDetector {
    fn detect(&mut self, _frame: &image::RgbImage) -> Result<Option<PoseLandmarks>, CoreError> {
        Ok(None)
    }

    fn name(&self) -> &str {
        "noop"
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// BlazePose 랜드마크 텐서 디코딩.
///
/// `raw`는 `N × 5` (입력 해상도 기준 픽셀 x, y, z, visibility 로짓, presence 로짓).
/// 앞의 33개만 사용하고 x/y는 `input_size`로 나눠 정규화한다.
pub fn decode_blazepose(raw: &[f32], input_size: u32) -> Result<PoseLandmarks, CoreError> {
    let needed = LANDMARK_COUNT * BLAZEPOSE_STRIDE;
    if raw.len() < needed {
        return Err(CoreError::Detection(format!(
            "랜드마크 출력 크기 부족: {} < {}",
            raw.len(),
            needed
        )));
    }

    let scale = input_size.max(1) as f32;
    let landmarks = raw
        .chunks_exact(BLAZEPOSE_STRIDE)
        .take(LANDMARK_COUNT)
        .map(|v| Landmark {
            x: v[0] / scale,
            y: v[1] / scale,
            z: v[2] / scale,
            visibility: sigmoid(v[3]),
        })
        .collect();

    Ok(PoseLandmarks::new(landmarks))
}

#[cfg(feature = "onnx")]
pub use onnx::OnnxPoseDetector;

#[cfg(feature = "onnx")]
mod onnx {
    use super::*;
    use image::imageops::{self, FilterType};
    use image::RgbImage;
    use ndarray::Array4;
    use ort::session::builder::GraphOptimizationLevel;
    use ort::session::Session;
    use ort::value::Tensor;
    use std::path::Path;
    use tracing::trace;

    fn ort_err(e: ort::Error) -> CoreError {
        CoreError::Detection(e.to_string())
    }

    /// ONNX Runtime BlazePose 랜드마크 검출기
    ///
    /// 프레임 전체를 `input_size²`로 리사이즈해 추론한다 (ROI 추적 없음).
    pub struct OnnxPoseDetector {
        session: Session,
        input_size: u32,
        min_confidence: f32,
        input_name: String,
        landmarks_output: String,
        presence_output: String,
    }

    impl OnnxPoseDetector {
        pub fn new(model_path: &Path, config: &DetectorConfig) -> Result<Self, CoreError> {
            let session = Session::builder()
                .map_err(ort_err)?
                .with_optimization_level(GraphOptimizationLevel::Level3)
                .map_err(ort_err)?
                .commit_from_file(model_path)
                .map_err(|e| {
                    CoreError::Config(format!("모델 로드 실패 {}: {e}", model_path.display()))
                })?;

            info!("ONNX 포즈 모델 로드: {}", model_path.display());

            Ok(Self {
                session,
                input_size: config.input_size,
                min_confidence: config.min_detection_confidence,
                input_name: config.input_name.clone(),
                landmarks_output: config.landmarks_output.clone(),
                presence_output: config.presence_output.clone(),
            })
        }

        fn to_input(&self, frame: &RgbImage) -> Array4<f32> {
            let size = self.input_size;
            let resized = imageops::resize(frame, size, size, FilterType::Triangle);
            Array4::from_shape_fn((1, size as usize, size as usize, 3), |(_, y, x, c)| {
                resized.get_pixel(x as u32, y as u32)[c] as f32 / 255.0
            })
        }
    }

    impl PoseDetector for OnnxPoseDetector {
        fn detect(&mut self, frame: &RgbImage) -> Result<Option<PoseLandmarks>, CoreError> {
            let input = Tensor::from_array(self.to_input(frame)).map_err(ort_err)?;
            let outputs = self
                .session
                .run(ort::inputs![self.input_name.as_str() => input])
                .map_err(ort_err)?;

            let presence: ndarray::ArrayViewD<f32> = outputs[self.presence_output.as_str()]
                .try_extract_array()
                .map_err(ort_err)?;
            let score = presence.iter().copied().next().unwrap_or(0.0);
            if score < self.min_confidence {
                trace!("포즈 없음 (점수 {score:.2})");
                return Ok(None);
            }

            let raw: ndarray::ArrayViewD<f32> = outputs[self.landmarks_output.as_str()]
                .try_extract_array()
                .map_err(ort_err)?;
            let raw: Vec<f32> = raw.iter().copied().collect();

            decode_blazepose(&raw, self.input_size).map(Some)
        }

        fn name(&self) -> &str {
            "onnx-blazepose"
        }
    }
}

/// 설정에 따라 검출기 생성
pub fn create_detector(config: &DetectorConfig) -> Result<Box<dyn PoseDetector>, CoreError> {
    match config.backend {
        DetectorBackend::None => {
            info!("포즈 검출기 없음 — 주석 없이 스트리밍");
            Ok(Box::new(NoOpPoseDetector))
        }
        DetectorBackend::Onnx => create_onnx(config),
    }
}

#[cfg(feature = "onnx")]
fn create_onnx(config: &DetectorConfig) -> Result<Box<dyn PoseDetector>, CoreError> {
    let path = config
        .model_path
        .as_deref()
        .ok_or_else(|| CoreError::Config("onnx 백엔드에는 model_path 필요".to_string()))?;
    Ok(Box::new(OnnxPoseDetector::new(path, config)?))
}

#[cfg(not(feature = "onnx"))]
fn create_onnx(_config: &DetectorConfig) -> Result<Box<dyn PoseDetector>, CoreError> {
    Err(CoreError::Config(
        "onnx 백엔드 지원 없이 빌드됨 (--features onnx)".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sidepose_core::models::pose::BodyLandmark;

    #[test]
    fn noop_never_detects() {
        let mut detector = NoOpPoseDetector;
        let frame = image::RgbImage::new(4, 4);
        assert!(detector.detect(&frame).unwrap().is_none());
        assert_eq!(detector.name(), "noop");
    }

    #[test]
    fn decode_normalizes_and_applies_sigmoid() {
        // 39 × 5 (보조 랜드마크 6개 포함)
        let mut raw = vec![0.0_f32; 39 * BLAZEPOSE_STRIDE];
        let base = BodyLandmark::LeftHip.index() * BLAZEPOSE_STRIDE;
        raw[base] = 128.0;
        raw[base + 1] = 64.0;
        raw[base + 3] = 10.0;

        let pose = decode_blazepose(&raw, 256).unwrap();
        assert_eq!(pose.landmarks.len(), LANDMARK_COUNT);

        let hip = pose.get(BodyLandmark::LeftHip.index()).unwrap();
        assert!((hip.x - 0.5).abs() < 1e-6);
        assert!((hip.y - 0.25).abs() < 1e-6);
        assert!(hip.visibility > 0.99);

        // 로짓 0 → 0.5
        let nose = pose.get(0).unwrap();
        assert!((nose.visibility - 0.5).abs() < 1e-6);
    }

    #[test]
    fn decode_rejects_short_output() {
        let raw = vec![0.0_f32; 10];
        assert!(matches!(
            decode_blazepose(&raw, 256),
            Err(CoreError::Detection(_))
        ));
    }

    #[test]
    fn none_backend_creates_noop() {
        let detector = create_detector(&DetectorConfig::default()).unwrap();
        assert_eq!(detector.name(), "noop");
    }

    #[cfg(not(feature = "onnx"))]
    #[test]
    fn onnx_backend_without_feature_is_config_error() {
        let config = DetectorConfig {
            backend: DetectorBackend::Onnx,
            model_path: Some("pose.onnx".into()),
            ..DetectorConfig::default()
        };
        assert!(matches!(create_detector(&config), Err(CoreError::Config(_))));
    }
}
