//! 프레임 소스 구현.
//!
//! - [`OpenCvCamera`] — OpenCV `VideoCapture` 웹캠 (`camera` feature)
//! - [`StillImageSource`] — 이미지 파일/디렉토리 반복 재생 (카메라 없는 환경, 테스트)
//! - [`UnavailableCamera`] — `camera` feature 없이 장치 소스가 설정된 경우

use image::RgbImage;
use sidepose_core::config::{CameraConfig, SourceKind};
use sidepose_core::error::CoreError;
use sidepose_core::ports::frame_source::{FrameSource, FrameSourceFactory};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// 정지 이미지 소스의 기본 프레임 간격 (~30fps)
pub const STILL_FRAME_INTERVAL: Duration = Duration::from_millis(33);

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

// ============================================================
// 정지 이미지 소스
// ============================================================

/// 이미지 파일 하나 또는 디렉토리 내 이미지들을 이름 순으로 반복 재생
pub struct StillImageSource {
    path: PathBuf,
    frames: Vec<RgbImage>,
    cursor: usize,
    frame_interval: Duration,
    opened: bool,
}

impl StillImageSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            frames: Vec::new(),
            cursor: 0,
            frame_interval: STILL_FRAME_INTERVAL,
            opened: false,
        }
    }

    /// 프레임 간격 설정 (`Duration::ZERO`면 대기 없음)
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    fn load_frames(path: &Path) -> Result<Vec<RgbImage>, CoreError> {
        let files = if path.is_dir() {
            let mut files: Vec<PathBuf> = std::fs::read_dir(path)
                .map_err(|e| CoreError::DeviceOpen(format!("{}: {e}", path.display())))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| is_image_file(p))
                .collect();
            files.sort();
            files
        } else if path.is_file() {
            vec![path.to_path_buf()]
        } else {
            return Err(CoreError::DeviceOpen(format!(
                "이미지 경로 없음: {}",
                path.display()
            )));
        };

        let mut frames = Vec::with_capacity(files.len());
        for file in &files {
            match image::open(file) {
                Ok(img) => frames.push(img.to_rgb8()),
                Err(e) => debug!("이미지 건너뜀 {}: {e}", file.display()),
            }
        }

        if frames.is_empty() {
            return Err(CoreError::DeviceOpen(format!(
                "디코딩 가능한 이미지 없음: {}",
                path.display()
            )));
        }
        Ok(frames)
    }
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

impl FrameSource for StillImageSource {
    fn open(&mut self) -> Result<(), CoreError> {
        self.frames = Self::load_frames(&self.path)?;
        self.cursor = 0;
        self.opened = true;
        info!(
            "이미지 소스 열림: {} ({}장)",
            self.path.display(),
            self.frames.len()
        );
        Ok(())
    }

    fn read_frame(&mut self) -> Result<RgbImage, CoreError> {
        if !self.opened || self.frames.is_empty() {
            return Err(CoreError::FrameRead("이미지 소스가 열려 있지 않음".to_string()));
        }
        if !self.frame_interval.is_zero() {
            std::thread::sleep(self.frame_interval);
        }
        let frame = self.frames[self.cursor].clone();
        self.cursor = (self.cursor + 1) % self.frames.len();
        Ok(frame)
    }

    fn release(&mut self) {
        if self.opened {
            debug!("이미지 소스 해제: {}", self.path.display());
        }
        self.frames.clear();
        self.opened = false;
    }

    fn is_opened(&self) -> bool {
        self.opened
    }

    fn describe(&self) -> String {
        format!("image:{}", self.path.display())
    }
}

// ============================================================
// OpenCV 웹캠
// ============================================================

#[cfg(feature = "camera")]
pub use opencv_camera::OpenCvCamera;

#[cfg(feature = "camera")]
mod opencv_camera {
    use super::*;
    use opencv::core::Mat;
    use opencv::imgproc;
    use opencv::prelude::*;
    use opencv::videoio::{self, VideoCapture};

    /// OpenCV `VideoCapture` 기반 웹캠
    pub struct OpenCvCamera {
        index: i32,
        width: Option<u32>,
        height: Option<u32>,
        capture: Option<VideoCapture>,
    }

    impl OpenCvCamera {
        pub fn new(index: i32) -> Self {
            Self {
                index,
                width: None,
                height: None,
                capture: None,
            }
        }

        /// 요청 해상도 (장치가 지원하지 않으면 무시됨)
        pub fn with_resolution(mut self, width: Option<u32>, height: Option<u32>) -> Self {
            self.width = width;
            self.height = height;
            self
        }
    }

    fn open_err(e: opencv::Error) -> CoreError {
        CoreError::DeviceOpen(e.to_string())
    }

    fn read_err(e: opencv::Error) -> CoreError {
        CoreError::FrameRead(e.to_string())
    }

    impl FrameSource for OpenCvCamera {
        fn open(&mut self) -> Result<(), CoreError> {
            let mut cap = VideoCapture::new(self.index, videoio::CAP_ANY).map_err(open_err)?;
            if !cap.is_opened().map_err(open_err)? {
                return Err(CoreError::DeviceOpen(format!("camera#{}", self.index)));
            }
            if let Some(w) = self.width {
                cap.set(videoio::CAP_PROP_FRAME_WIDTH, w as f64)
                    .map_err(open_err)?;
            }
            if let Some(h) = self.height {
                cap.set(videoio::CAP_PROP_FRAME_HEIGHT, h as f64)
                    .map_err(open_err)?;
            }
            // 지연 최소화
            let _ = cap.set(videoio::CAP_PROP_BUFFERSIZE, 1.0);
            info!("카메라 열림: camera#{}", self.index);
            self.capture = Some(cap);
            Ok(())
        }

        fn read_frame(&mut self) -> Result<RgbImage, CoreError> {
            let cap = self
                .capture
                .as_mut()
                .ok_or_else(|| CoreError::FrameRead("카메라가 열려 있지 않음".to_string()))?;

            let mut bgr = Mat::default();
            let ok = cap.read(&mut bgr).map_err(read_err)?;
            if !ok || bgr.empty() {
                return Err(CoreError::FrameRead("빈 프레임".to_string()));
            }

            let mut rgb = Mat::default();
            imgproc::cvt_color_def(&bgr, &mut rgb, imgproc::COLOR_BGR2RGB).map_err(read_err)?;

            let (w, h) = (rgb.cols() as u32, rgb.rows() as u32);
            let data = rgb.data_bytes().map_err(read_err)?.to_vec();
            RgbImage::from_raw(w, h, data)
                .ok_or_else(|| CoreError::FrameRead(format!("프레임 버퍼 크기 불일치 {w}x{h}")))
        }

        fn release(&mut self) {
            if let Some(mut cap) = self.capture.take() {
                if let Err(e) = cap.release() {
                    tracing::warn!("카메라 해제 실패: {e}");
                }
                info!("카메라 해제: camera#{}", self.index);
            }
        }

        fn is_opened(&self) -> bool {
            self.capture.is_some()
        }

        fn describe(&self) -> String {
            format!("camera#{}", self.index)
        }
    }

    impl Drop for OpenCvCamera {
        fn drop(&mut self) {
            self.release();
        }
    }
}

// ============================================================
// 카메라 미지원 빌드
// ============================================================

/// `camera` feature 없이 빌드된 경우의 장치 소스 — 열기는 항상 실패
pub struct UnavailableCamera {
    index: i32,
}

impl UnavailableCamera {
    pub fn new(index: i32) -> Self {
        Self { index }
    }
}

impl FrameSource for UnavailableCamera {
    fn open(&mut self) -> Result<(), CoreError> {
        Err(CoreError::DeviceOpen(format!(
            "camera#{}: 카메라 지원 없이 빌드됨 (--features camera)",
            self.index
        )))
    }

    fn read_frame(&mut self) -> Result<RgbImage, CoreError> {
        Err(CoreError::FrameRead("카메라가 열려 있지 않음".to_string()))
    }

    fn release(&mut self) {}

    fn is_opened(&self) -> bool {
        false
    }

    fn describe(&self) -> String {
        format!("camera#{} (unavailable)", self.index)
    }
}

// ============================================================
// 팩토리
// ============================================================

/// 설정 기반 프레임 소스 팩토리 — WebSocket 연결마다 새 소스 생성
#[derive(Debug, Clone)]
pub struct SourceFactory {
    config: CameraConfig,
}

impl SourceFactory {
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

impl FrameSourceFactory for SourceFactory {
    fn create(&self) -> Box<dyn FrameSource> {
        match self.config.source {
            SourceKind::Image => {
                let path = self.config.image_path.clone().unwrap_or_default();
                Box::new(StillImageSource::new(path))
            }
            SourceKind::Device => device_source(&self.config),
        }
    }
}

#[cfg(feature = "camera")]
fn device_source(config: &CameraConfig) -> Box<dyn FrameSource> {
    Box::new(
        OpenCvCamera::new(config.device_index).with_resolution(config.width, config.height),
    )
}

#[cfg(not(feature = "camera"))]
fn device_source(config: &CameraConfig) -> Box<dyn FrameSource> {
    Box::new(UnavailableCamera::new(config.device_index))
}
