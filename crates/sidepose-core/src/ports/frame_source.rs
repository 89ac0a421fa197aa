//! 프레임 소스 포트 — 카메라 장치 또는 대체 소스.
//!
//! 구현: `sidepose-vision::capture` (OpenCV 카메라, 정지 이미지)

use image::RgbImage;

use crate::error::CoreError;

/// 프레임 소스 — open → read → release 라이프사이클
pub trait FrameSource: Send {
    /// 장치 열기. 실패 시 `CoreError::DeviceOpen`.
    fn open(&mut self) -> Result<(), CoreError>;

    /// 다음 프레임 읽기 (RGB). 실패 시 `CoreError::FrameRead`.
    fn read_frame(&mut self) -> Result<RgbImage, CoreError>;

    /// 장치 해제. 여러 번 호출해도 안전해야 한다.
    fn release(&mut self);

    /// 현재 열려 있는지
    fn is_opened(&self) -> bool;

    /// 로그용 설명 (예: "camera#0", "image:/tmp/a.jpg")
    fn describe(&self) -> String;
}

/// 연결마다 새 프레임 소스를 만드는 팩토리
pub trait FrameSourceFactory: Send + Sync {
    fn create(&self) -> Box<dyn FrameSource>;
}
