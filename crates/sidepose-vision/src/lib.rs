//! # sidepose-vision
//!
//! 비전 처리 크레이트.
//! 카메라(또는 정지 이미지) 프레임 소스, 외부 포즈 추정 엔진 어댑터,
//! 선택된 측면의 랜드마크 선/점 주석, JPEG 인코딩을 담당한다.

pub mod capture;
pub mod detector;
pub mod encoder;
pub mod overlay;
pub mod processor;
