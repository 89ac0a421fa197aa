//! 포트 인터페이스 (trait).
//!
//! Hexagonal Architecture의 포트 레이어.
//! `sidepose-vision`이 이 trait들을 구현하며,
//! `sidepose-app`에서 `Arc<dyn T>` / `Box<dyn T>`로 와이어링한다.
//!
//! 카메라 읽기와 추론은 블로킹 호출이므로 동기 trait으로 정의하고,
//! 호출 측(웹 핸들러)이 블로킹 스레드에서 실행한다.

pub mod frame_source;
pub mod pose_detector;
