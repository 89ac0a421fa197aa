//! SIDEPOSE 도메인 모델.
//!
//! 포즈 랜드마크와 주석 대상 신체 측면(Side)을 정의한다.

pub mod pose;
pub mod side_selection;
