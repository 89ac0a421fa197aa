//! 포즈 랜드마크 모델.
//!
//! MediaPipe/BlazePose 33개 키포인트 인덱스 체계를 따른다.

/// BlazePose 랜드마크 인덱스 (33개)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BodyLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

/// 포즈 모델이 출력하는 랜드마크 수
pub const LANDMARK_COUNT: usize = 33;

impl BodyLandmark {
    /// 랜드마크 목록 내 위치
    pub fn index(self) -> usize {
        self as usize
    }
}

/// 단일 랜드마크 — 정규화 좌표 + 가시성
///
/// `x`, `y`는 프레임 폭/높이 기준 0.0~1.0 (프레임 밖이면 범위를 벗어날 수 있음).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    /// 엉덩이 중심 기준 상대 깊이 (그리기에는 사용하지 않음)
    pub z: f32,
    pub visibility: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, visibility: f32) -> Self {
        Self {
            x,
            y,
            z: 0.0,
            visibility,
        }
    }

    /// 가시성이 임계값을 초과하는지 (경계값은 보이지 않는 것으로 취급)
    pub fn is_visible(&self, threshold: f32) -> bool {
        self.visibility > threshold
    }
}

/// 한 프레임에서 검출된 포즈
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoseLandmarks {
    pub landmarks: Vec<Landmark>,
}

impl PoseLandmarks {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    /// 인덱스로 랜드마크 조회 (범위 밖이면 `None`)
    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.landmarks.get(index)
    }
}

/// 주석을 그릴 신체 측면
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    /// 선택 없음 — 아무것도 그리지 않음
    #[default]
    None,
}

const LEFT_CHAIN: [BodyLandmark; 5] = [
    BodyLandmark::LeftEar,
    BodyLandmark::LeftShoulder,
    BodyLandmark::LeftHip,
    BodyLandmark::LeftKnee,
    BodyLandmark::LeftAnkle,
];

const RIGHT_CHAIN: [BodyLandmark; 5] = [
    BodyLandmark::RightEar,
    BodyLandmark::RightShoulder,
    BodyLandmark::RightHip,
    BodyLandmark::RightKnee,
    BodyLandmark::RightAnkle,
];

impl Side {
    /// 라벨 문자열 해석. `"left"`/`"right"`만 인식하며 그 외는 모두 `None`.
    ///
    /// 대소문자를 구분한다 (`"Left"`는 `None`).
    pub fn from_label(label: &str) -> Self {
        match label {
            "left" => Side::Left,
            "right" => Side::Right,
            _ => Side::None,
        }
    }

    /// 귀 → 어깨 → 엉덩이 → 무릎 → 발목 순서의 랜드마크 체인
    pub fn chain(self) -> &'static [BodyLandmark] {
        match self {
            Side::Left => &LEFT_CHAIN,
            Side::Right => &RIGHT_CHAIN,
            Side::None => &[],
        }
    }

    /// 체인을 랜드마크 인덱스로 변환
    pub fn point_indices(self) -> Vec<usize> {
        self.chain().iter().map(|lm| lm.index()).collect()
    }
}
