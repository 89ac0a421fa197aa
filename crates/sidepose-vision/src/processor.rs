//! 프레임 주석 파이프라인.
//!
//! 좌우 반전 → (측면 선택 시) 포즈 검출 → 랜드마크 주석 → JPEG 인코딩.
//! 검출기는 모든 연결이 공유하므로 뮤텍스로 직렬화한다.

use image::RgbImage;
use parking_lot::Mutex;
use sidepose_core::config::AppConfig;
use sidepose_core::error::CoreError;
use sidepose_core::models::pose::Side;
use sidepose_core::ports::pose_detector::PoseDetector;
use tracing::{debug, warn};

use crate::encoder::{self, DEFAULT_JPEG_QUALITY};
use crate::overlay::{self, OverlayStyle};

/// 인코딩된 주석 프레임
#[derive(Debug, Clone)]
pub struct AnnotatedFrame {
    /// JPEG 바이트
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// 포즈가 검출되었는지
    pub landmarks_found: bool,
    /// 주석 대상 랜드마크 수 (측면 미선택/미검출 시 0)
    pub points_drawn: usize,
}

/// 프레임 주석기
pub struct FrameAnnotator {
    detector: Mutex<Box<dyn PoseDetector>>,
    style: OverlayStyle,
    mirror: bool,
    jpeg_quality: u8,
}

impl FrameAnnotator {
    pub fn new(detector: Box<dyn PoseDetector>) -> Self {
        Self {
            detector: Mutex::new(detector),
            style: OverlayStyle::default(),
            mirror: true,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    /// 설정 기반 생성
    pub fn from_config(detector: Box<dyn PoseDetector>, config: &AppConfig) -> Self {
        Self::new(detector)
            .with_style(OverlayStyle::from(&config.overlay))
            .with_mirror(config.camera.mirror)
            .with_jpeg_quality(config.stream.jpeg_quality)
    }

    pub fn with_style(mut self, style: OverlayStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_mirror(mut self, mirror: bool) -> Self {
        self.mirror = mirror;
        self
    }

    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    /// 검출기 이름
    pub fn detector_name(&self) -> String {
        self.detector.lock().name().to_string()
    }

    /// 프레임 하나 처리 (블로킹 — 추론 포함)
    ///
    /// 검출 실패는 경고 로그만 남기고 주석 없이 인코딩한다.
    pub fn annotate(&self, mut frame: RgbImage, side: Side) -> Result<AnnotatedFrame, CoreError> {
        if self.mirror {
            encoder::mirror_horizontal(&mut frame);
        }

        let mut landmarks_found = false;
        let mut points_drawn = 0;

        if side != Side::None {
            let detected = self.detector.lock().detect(&frame);
            match detected {
                Ok(Some(pose)) => {
                    landmarks_found = true;
                    points_drawn = overlay::annotate_side(&mut frame, &pose, side, &self.style);
                }
                Ok(None) => debug!("포즈 미검출"),
                Err(e) => warn!("포즈 검출 실패 (주석 생략): {e}"),
            }
        }

        let (width, height) = frame.dimensions();
        let jpeg = encoder::encode_jpeg(&frame, self.jpeg_quality)?;

        Ok(AnnotatedFrame {
            jpeg,
            width,
            height,
            landmarks_found,
            points_drawn,
        })
    }
}
