//! # sidepose-core
//!
//! SIDEPOSE 도메인 모델, 포트(trait) 정의, 에러 타입.
//! 비전/웹/앱 크레이트가 공유하는 핵심 타입과 인터페이스를 제공한다.
//!
//! ## 구조
//!
//! - [`models`] — 포즈 랜드마크, 신체 측면(Side) 선택
//! - [`ports`] — 카메라 소스, 포즈 검출기 포트 인터페이스
//! - [`error`] — 핵심 에러 타입 (thiserror)
//! - [`config`] — 애플리케이션 설정 구조체
//! - [`config_manager`] — 설정 파일 관리 (로드/저장)

pub mod config;
pub mod config_manager;
pub mod error;
pub mod models;
pub mod ports;
