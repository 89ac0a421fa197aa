//! SIDEPOSE 핵심 에러 타입.
//!
//! 어댑터 crate는 자체 에러 타입에서 `From<CoreError>`로 래핑한다.

use thiserror::Error;

/// 코어 레이어 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 필드 유효성 검증 실패
    #[error("유효성 검증 실패 — {field}: {message}")]
    Validation {
        /// 검증 실패한 필드명
        field: String,
        /// 실패 사유
        message: String,
    },

    /// 비디오 장치(또는 대체 소스) 열기 실패
    #[error("비디오 장치를 열 수 없음: {0}")]
    DeviceOpen(String),

    /// 프레임 읽기 실패
    #[error("프레임 읽기 실패: {0}")]
    FrameRead(String),

    /// 포즈 검출 실패 (외부 추론 엔진 에러)
    #[error("포즈 검출 에러: {0}")]
    Detection(String),

    /// 이미지 인코딩 실패
    #[error("인코딩 에러: {0}")]
    Encoding(String),

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),
}
