use crate::bitmap::BitmapImage;
use crate::constants::{FRAME_HEADER_BITS, FRAME_LENGTH_MASK};

/// 图像最多能承载的比特数：每个可用像素字节 1 bit。
pub fn capacity_bits(image: &BitmapImage) -> u64 {
    image.eligible_len()
}

/// 扣除帧头部后最多能隐藏的主体字节数，最小为 0，
/// 且不超过帧头部长度字段能表示的上限。
pub fn max_payload_bytes(image: &BitmapImage) -> u64 {
    max_payload_for_bits(capacity_bits(image))
}

pub(crate) fn max_payload_for_bits(bits: u64) -> u64 {
    (bits.saturating_sub(FRAME_HEADER_BITS) / 8).min(u64::from(FRAME_LENGTH_MASK))
}

/// 隐藏 `body_len` 字节主体所需占用的可用字节数。
pub fn required_bits(body_len: u64) -> u64 {
    FRAME_HEADER_BITS + body_len * 8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::fixtures::synthetic_bmp;

    #[test]
    fn hundred_square_24_bit_image() {
        let image = BitmapImage::parse(&synthetic_bmp(100, 100, 24)).unwrap();
        assert_eq!(capacity_bits(&image), 30_000);
        assert_eq!(max_payload_bytes(&image), 3746);
    }

    #[test]
    fn padding_does_not_count() {
        // 3 * 3 = 9 字节每行，stride 为 12
        let image = BitmapImage::parse(&synthetic_bmp(3, 2, 24)).unwrap();
        assert_eq!(capacity_bits(&image), 18);
    }

    #[test]
    fn tiny_images_floor_at_zero() {
        let image = BitmapImage::parse(&synthetic_bmp(2, 2, 24)).unwrap();
        assert_eq!(capacity_bits(&image), 12);
        assert_eq!(max_payload_bytes(&image), 0);

        // 恰好放下头部，没有多余空间
        assert_eq!(max_payload_for_bits(32), 0);
        assert_eq!(max_payload_for_bits(39), 0);
        assert_eq!(max_payload_for_bits(40), 1);
    }

    #[test]
    fn clamped_to_length_field() {
        assert_eq!(max_payload_for_bits(u64::MAX), u64::from(FRAME_LENGTH_MASK));
    }

    #[test]
    fn required_bits_counts_header() {
        assert_eq!(required_bits(0), 32);
        assert_eq!(required_bits(10), 112);
    }
}
