//! 랜드마크 주석 그리기.
//!
//! 선택된 측면의 다섯 랜드마크(귀 → 어깨 → 엉덩이 → 무릎 → 발목)를
//! 정규화 좌표에서 픽셀 좌표로 변환해 연결선과 점을 그린다.
//! 가시성이 임계값 이하인 랜드마크는 건너뛴다.

use image::{Rgb, RgbImage};
use sidepose_core::config::OverlayConfig;
use sidepose_core::models::pose::{Landmark, PoseLandmarks, Side};

/// 선/점 스타일
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    pub line_color: Rgb<u8>,
    pub line_thickness: u32,
    pub point_color: Rgb<u8>,
    pub point_radius: u32,
    pub visibility_threshold: f32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self::from(&OverlayConfig::default())
    }
}

impl From<&OverlayConfig> for OverlayStyle {
    fn from(config: &OverlayConfig) -> Self {
        Self {
            line_color: Rgb(config.line_color),
            line_thickness: config.line_thickness,
            point_color: Rgb(config.point_color),
            point_radius: config.point_radius,
            visibility_threshold: config.visibility_threshold,
        }
    }
}

/// 정규화 좌표 → 픽셀 좌표 (0 방향 절삭)
pub fn to_pixel(landmark: &Landmark, width: u32, height: u32) -> (i32, i32) {
    (
        (landmark.x * width as f32) as i32,
        (landmark.y * height as f32) as i32,
    )
}

/// 보이는 랜드마크만 반환 (목록에 없는 인덱스는 보이지 않는 것으로 취급)
fn visible<'a>(pose: &'a PoseLandmarks, index: usize, threshold: f32) -> Option<&'a Landmark> {
    pose.get(index).filter(|lm| lm.is_visible(threshold))
}

/// 연속한 점 쌍마다 연결선 그리기. 두 점 모두 보여야 그린다.
///
/// 그린 선 개수 반환.
pub fn draw_lines(
    frame: &mut RgbImage,
    pose: &PoseLandmarks,
    points: &[usize],
    style: &OverlayStyle,
) -> usize {
    let (w, h) = frame.dimensions();
    let mut drawn = 0;

    for pair in points.windows(2) {
        let (Some(a), Some(b)) = (
            visible(pose, pair[0], style.visibility_threshold),
            visible(pose, pair[1], style.visibility_threshold),
        ) else {
            continue;
        };
        let start = to_pixel(a, w, h);
        let end = to_pixel(b, w, h);
        draw_line(frame, start, end, style.line_thickness, style.line_color);
        drawn += 1;
    }

    drawn
}

/// 보이는 점마다 채워진 원 그리기. 그린 점 개수 반환.
pub fn draw_points(
    frame: &mut RgbImage,
    pose: &PoseLandmarks,
    points: &[usize],
    style: &OverlayStyle,
) -> usize {
    let (w, h) = frame.dimensions();
    let mut drawn = 0;

    for &index in points {
        if let Some(lm) = visible(pose, index, style.visibility_threshold) {
            let center = to_pixel(lm, w, h);
            fill_circle(frame, center, style.point_radius, style.point_color);
            drawn += 1;
        }
    }

    drawn
}

/// 측면 선택에 따라 선 → 점 순서로 주석.
///
/// 대상 랜드마크 수를 반환한다 (`Side::None`이면 0, 아무것도 그리지 않음).
pub fn annotate_side(
    frame: &mut RgbImage,
    pose: &PoseLandmarks,
    side: Side,
    style: &OverlayStyle,
) -> usize {
    let points = side.point_indices();
    draw_lines(frame, pose, &points, style);
    draw_points(frame, pose, &points, style);
    points.len()
}

/// 브러시/반지름 상한 (가로 + 세로)
fn max_extent(frame: &RgbImage) -> i64 {
    frame.width() as i64 + frame.height() as i64
}

/// `[lo, hi]`를 `[min, max]`와 교차
fn clamp_span(lo: i64, hi: i64, min: i64, max: i64) -> std::ops::RangeInclusive<i64> {
    lo.max(min)..=hi.min(max)
}

/// 채워진 원 (프레임 밖은 잘림)
pub fn fill_circle(frame: &mut RgbImage, center: (i32, i32), radius: u32, color: Rgb<u8>) {
    let (cx, cy) = (center.0 as i64, center.1 as i64);
    let r = (radius as i64).min(max_extent(frame));
    let r2 = r.saturating_mul(r);
    let (w, h) = (frame.width() as i64, frame.height() as i64);

    for y in clamp_span(cy - r, cy + r, 0, h - 1) {
        for x in clamp_span(cx - r, cx + r, 0, w - 1) {
            let (dx, dy) = (x - cx, y - cy);
            if dx * dx + dy * dy <= r2 {
                frame.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

/// 두께 있는 선분 (정사각 브러시 + Bresenham, 프레임 밖은 잘림)
pub fn draw_line(
    frame: &mut RgbImage,
    start: (i32, i32),
    end: (i32, i32),
    thickness: u32,
    color: Rgb<u8>,
) {
    let t = (thickness.max(1) as i64).min(max_extent(frame));
    // 브러시 범위: t=1 → [0,0], t=2 → [-1,0], t=3 → [-1,1]
    let lo = -(t / 2);
    let hi = (t - 1) / 2;

    let margin = t as f64;
    let bounds = (
        -margin,
        -margin,
        frame.width() as f64 + margin,
        frame.height() as f64 + margin,
    );
    let Some(((x0, y0), (x1, y1))) = clip_segment(start, end, bounds) else {
        return;
    };

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);

    let (w, h) = (frame.width() as i64, frame.height() as i64);

    loop {
        for py in clamp_span(y + lo, y + hi, 0, h - 1) {
            for px in clamp_span(x + lo, x + hi, 0, w - 1) {
                frame.put_pixel(px as u32, py as u32, color);
            }
        }
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Liang–Barsky 선분 클리핑. 영역과 겹치지 않으면 `None`.
fn clip_segment(
    start: (i32, i32),
    end: (i32, i32),
    (xmin, ymin, xmax, ymax): (f64, f64, f64, f64),
) -> Option<((i64, i64), (i64, i64))> {
    let (x0, y0) = (start.0 as f64, start.1 as f64);
    let (x1, y1) = (end.0 as f64, end.1 as f64);
    let (dx, dy) = (x1 - x0, y1 - y0);

    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;

    for (p, q) in [
        (-dx, x0 - xmin),
        (dx, xmax - x0),
        (-dy, y0 - ymin),
        (dy, ymax - y0),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    let a = ((x0 + t0 * dx).round() as i64, (y0 + t0 * dy).round() as i64);
    let b = ((x0 + t1 * dx).round() as i64, (y0 + t1 * dy).round() as i64);
    Some((a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sidepose_core::models::pose::{BodyLandmark, LANDMARK_COUNT};

    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

    fn blank(w: u32, h: u32) -> RgbImage {
        RgbImage::from_pixel(w, h, BLACK)
    }

    /// 모든 랜드마크가 보이지 않는 포즈에 일부만 설정
    fn pose_with(points: &[(BodyLandmark, f32, f32, f32)]) -> PoseLandmarks {
        let mut landmarks = vec![Landmark::default(); LANDMARK_COUNT];
        for &(lm, x, y, vis) in points {
            landmarks[lm.index()] = Landmark::new(x, y, vis);
        }
        PoseLandmarks::new(landmarks)
    }

    fn left_column_pose() -> PoseLandmarks {
        pose_with(&[
            (BodyLandmark::LeftEar, 0.5, 0.1, 0.9),
            (BodyLandmark::LeftShoulder, 0.5, 0.3, 0.9),
            (BodyLandmark::LeftHip, 0.5, 0.5, 0.9),
            (BodyLandmark::LeftKnee, 0.5, 0.7, 0.9),
            (BodyLandmark::LeftAnkle, 0.5, 0.9, 0.9),
        ])
    }

    fn count_color(frame: &RgbImage, color: Rgb<u8>) -> usize {
        frame.pixels().filter(|p| **p == color).count()
    }

    #[test]
    fn pixel_projection_truncates() {
        let lm = Landmark::new(0.999, 0.5, 1.0);
        assert_eq!(to_pixel(&lm, 100, 50), (99, 25));
        let neg = Landmark::new(-0.015, 0.0, 1.0);
        // 0 방향 절삭: -1.5 → -1
        assert_eq!(to_pixel(&neg, 100, 50), (-1, 0));
    }

    #[test]
    fn annotate_left_draws_lines_and_points() {
        let mut frame = blank(100, 100);
        let style = OverlayStyle::default();
        let pose = left_column_pose();

        let considered = annotate_side(&mut frame, &pose, Side::Left, &style);
        assert_eq!(considered, 5);

        // 어깨-엉덩이 중간 (x=50, y=40)은 선 색상
        assert_eq!(*frame.get_pixel(50, 40), style.line_color);
        // 엉덩이 중심은 점이 선 위에 덮임
        assert_eq!(*frame.get_pixel(50, 50), style.point_color);
        // 선에서 떨어진 곳은 그대로
        assert_eq!(*frame.get_pixel(10, 40), BLACK);
    }

    #[test]
    fn right_side_ignores_left_landmarks() {
        let mut frame = blank(100, 100);
        let considered =
            annotate_side(&mut frame, &left_column_pose(), Side::Right, &OverlayStyle::default());
        assert_eq!(considered, 5);
        assert_eq!(count_color(&frame, BLACK), 100 * 100);
    }

    #[test]
    fn none_side_draws_nothing() {
        let mut frame = blank(64, 64);
        let considered =
            annotate_side(&mut frame, &left_column_pose(), Side::None, &OverlayStyle::default());
        assert_eq!(considered, 0);
        assert_eq!(count_color(&frame, BLACK), 64 * 64);
    }

    #[test]
    fn invisible_endpoint_skips_adjacent_lines_only() {
        let mut frame = blank(100, 100);
        let style = OverlayStyle::default();
        let mut pose = left_column_pose();
        pose.landmarks[BodyLandmark::LeftHip.index()].visibility = 0.0;

        let points = Side::Left.point_indices();
        assert_eq!(draw_lines(&mut frame, &pose, &points, &style), 2);
        assert_eq!(draw_points(&mut frame, &pose, &points, &style), 4);

        // 어깨-엉덩이 구간은 비어 있음
        assert_eq!(*frame.get_pixel(50, 40), BLACK);
        // 귀-어깨 구간은 그려짐
        assert_eq!(*frame.get_pixel(50, 20), style.line_color);
    }

    #[test]
    fn missing_landmarks_do_not_panic() {
        let mut frame = blank(32, 32);
        let pose = PoseLandmarks::new(vec![Landmark::new(0.5, 0.5, 1.0); 10]);
        let style = OverlayStyle::default();
        let points = Side::Left.point_indices();
        assert_eq!(draw_lines(&mut frame, &pose, &points, &style), 0);
        // 인덱스 7(LeftEar)만 범위 안
        assert_eq!(draw_points(&mut frame, &pose, &points, &style), 1);
    }

    #[test]
    fn out_of_frame_points_are_clipped() {
        let mut frame = blank(20, 20);
        let pose = pose_with(&[
            (BodyLandmark::RightEar, -3.0, 0.5, 1.0),
            (BodyLandmark::RightShoulder, 4.0, 0.5, 1.0),
        ]);
        let style = OverlayStyle::default();
        annotate_side(&mut frame, &pose, Side::Right, &style);
        // 프레임을 가로지르는 수평선
        assert_eq!(*frame.get_pixel(0, 10), style.line_color);
        assert_eq!(*frame.get_pixel(19, 10), style.line_color);
    }

    #[test]
    fn line_thickness_two_covers_two_rows() {
        let mut frame = blank(30, 30);
        let green = Rgb([0, 255, 0]);
        draw_line(&mut frame, (5, 15), (25, 15), 2, green);
        assert_eq!(*frame.get_pixel(10, 15), green);
        assert_eq!(*frame.get_pixel(10, 14), green);
        assert_eq!(*frame.get_pixel(10, 16), BLACK);
        assert_eq!(*frame.get_pixel(10, 13), BLACK);
    }

    #[test]
    fn filled_circle_radius_three() {
        let mut frame = blank(20, 20);
        let blue = Rgb([0, 0, 255]);
        fill_circle(&mut frame, (10, 10), 3, blue);
        assert_eq!(*frame.get_pixel(10, 10), blue);
        assert_eq!(*frame.get_pixel(13, 10), blue);
        assert_eq!(*frame.get_pixel(10, 7), blue);
        assert_eq!(*frame.get_pixel(13, 13), BLACK);
        assert_eq!(*frame.get_pixel(14, 10), BLACK);
    }

    #[test]
    fn style_follows_config() {
        let config = OverlayConfig {
            line_color: [255, 255, 0],
            line_thickness: 5,
            point_color: [255, 0, 0],
            point_radius: 6,
            visibility_threshold: 0.5,
        };
        let style = OverlayStyle::from(&config);
        assert_eq!(style.line_color, Rgb([255, 255, 0]));
        assert_eq!(style.point_radius, 6);

        // 임계값 0.5 이하 가시성은 그리지 않음
        let mut frame = blank(50, 50);
        let pose = pose_with(&[(BodyLandmark::LeftEar, 0.5, 0.5, 0.5)]);
        assert_eq!(
            draw_points(&mut frame, &pose, &Side::Left.point_indices(), &style),
            0
        );
    }

    #[test]
    fn oversized_brush_and_radius_stay_bounded() {
        let color = Rgb([0, 255, 0]);

        let mut frame = blank(8, 8);
        fill_circle(&mut frame, (4, 4), u32::MAX, color);
        assert_eq!(count_color(&frame, color), 64);

        let mut frame = blank(8, 8);
        draw_line(&mut frame, (0, 4), (7, 4), u32::MAX, color);
        assert_eq!(count_color(&frame, color), 64);

        let style = OverlayStyle {
            line_thickness: u32::MAX,
            point_radius: u32::MAX,
            ..OverlayStyle::default()
        };
        let mut frame = blank(16, 16);
        assert_eq!(annotate_side(&mut frame, &left_column_pose(), Side::Left, &style), 5);
    }
}
