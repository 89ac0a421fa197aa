//! JPEG 인코더 + 프레임 전처리.

use image::codecs::jpeg::JpegEncoder;
use image::{imageops, RgbImage};
use sidepose_core::error::CoreError;
use tracing::trace;

/// 기본 JPEG 품질 (OpenCV imencode 기본값과 동일)
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// RGB 프레임을 JPEG 바이트로 인코딩
pub fn encode_jpeg(frame: &RgbImage, quality: u8) -> Result<Vec<u8>, CoreError> {
    let (w, h) = frame.dimensions();
    let mut buf = Vec::with_capacity(capacity_hint(w, h));

    JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100))
        .encode_image(frame)
        .map_err(|e| CoreError::Encoding(format!("JPEG 인코딩 실패: {e}")))?;

    trace!("JPEG 인코딩: {}x{} → {} bytes (품질 {})", w, h, buf.len(), quality);
    Ok(buf)
}

/// 출력 버퍼 예상 크기 (픽셀 수의 1/8)
fn capacity_hint(width: u32, height: u32) -> usize {
    width as usize * height as usize / 8
}

/// 좌우 반전 (셀카 뷰)
pub fn mirror_horizontal(frame: &mut RgbImage) {
    imageops::flip_horizontal_in_place(frame);
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn encodes_valid_jpeg() {
        let frame = RgbImage::from_pixel(64, 48, Rgb([10, 200, 30]));
        let bytes = encode_jpeg(&frame, DEFAULT_JPEG_QUALITY).unwrap();

        // SOI 마커
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 48));
    }

    #[test]
    fn lower_quality_is_smaller() {
        let frame = RgbImage::from_fn(128, 128, |x, y| {
            Rgb([(x * 2) as u8, (y * 2) as u8, ((x ^ y) * 3) as u8])
        });
        let high = encode_jpeg(&frame, 95).unwrap();
        let low = encode_jpeg(&frame, 20).unwrap();
        assert!(low.len() < high.len());
    }

    #[test]
    fn out_of_range_quality_is_clamped() {
        let frame = RgbImage::new(8, 8);
        assert!(encode_jpeg(&frame, 0).is_ok());
    }

    #[test]
    fn capacity_hint_does_not_overflow() {
        assert_eq!(capacity_hint(640, 480), 38_400);
        // u32 곱셈이면 넘치는 크기
        assert_eq!(capacity_hint(100_000, 100_000), 1_250_000_000);
    }

    #[test]
    fn mirror_swaps_columns() {
        let mut frame = RgbImage::new(3, 1);
        frame.put_pixel(0, 0, Rgb([255, 0, 0]));
        mirror_horizontal(&mut frame);
        assert_eq!(*frame.get_pixel(2, 0), Rgb([255, 0, 0]));
        assert_eq!(*frame.get_pixel(0, 0), Rgb([0, 0, 0]));
    }
}
