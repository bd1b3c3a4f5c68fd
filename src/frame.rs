//! # 载荷成帧模块
//!
//! 帧由一个 32 位、最高位优先的头部和主体组成：
//!
//! ```text
//! bit 31      扩展帧标志
//! bit 0..=30  主体长度 (字节)
//! ```
//!
//! 长度写在最前面，解码时先读出头部，就能恰好在载荷边界停下，
//! 而不必扫描整张图像或依赖可能与真实数据冲突的结束标记。
//!
//! 扩展帧的主体以 `版本 | 标志 | 标签长度 | 标签` 开头，其后才是内容，
//! 内容可以是经过 [`huffman`](crate::huffman) 压缩的。

use crate::capacity::required_bits;
use crate::constants::{
    EXTENDED_FLAG, EXTENSION_PREAMBLE_SIZE, EXTENSION_VERSION, FLAG_COMPRESSED, FRAME_HEADER_BITS,
    FRAME_LENGTH_MASK, MAX_TAG_LEN,
};
use crate::error::{CorruptFrame, DecodeError, EncodeError};
use crate::huffman;
use crate::steganography::LsbReader;

/// 从隐写图像中还原出的载荷。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Payload {
    pub data: Vec<u8>,
    /// 扩展帧携带的类型标签，通常是原文件的扩展名。
    pub tag: Option<String>,
    pub compressed: bool,
}

/// 待嵌入的帧。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    extended: bool,
    body: Vec<u8>,
}

impl Frame {
    /// 基础帧：主体就是秘密数据本身。
    pub fn plain(secret: &[u8]) -> Self {
        Self {
            extended: false,
            body: secret.to_vec(),
        }
    }

    /// 扩展帧。`content` 是已经 (按需) 压缩过的数据。
    ///
    /// # Errors
    ///
    /// 标签超过 255 字节时返回 [`EncodeError::TagTooLong`]。
    pub fn extended(
        content: &[u8],
        tag: Option<&str>,
        compressed: bool,
    ) -> Result<Self, EncodeError> {
        let tag = tag.unwrap_or_default().as_bytes();
        if tag.len() > MAX_TAG_LEN {
            return Err(EncodeError::TagTooLong(tag.len()));
        }

        let flags = if compressed { FLAG_COMPRESSED } else { 0 };
        let mut body = Vec::with_capacity(EXTENSION_PREAMBLE_SIZE + tag.len() + content.len());
        body.extend_from_slice(&[EXTENSION_VERSION, flags, tag.len() as u8]);
        body.extend_from_slice(tag);
        body.extend_from_slice(content);

        Ok(Self {
            extended: true,
            body,
        })
    }

    pub fn is_extended(&self) -> bool {
        self.extended
    }

    pub fn body_len(&self) -> u64 {
        self.body.len() as u64
    }

    /// 帧序列化后占用的比特数：`FRAME_HEADER_BITS + body_len * 8`。
    pub fn bit_len(&self) -> u64 {
        required_bits(self.body_len())
    }

    /// 调用者需事先确认 `body_len()` 不超过 `FRAME_LENGTH_MASK`。
    pub fn header(&self) -> u32 {
        let len = (self.body.len() as u32) & FRAME_LENGTH_MASK;
        if self.extended { len | EXTENDED_FLAG } else { len }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(4 + self.body.len());
        bytes.extend_from_slice(&self.header().to_be_bytes());
        bytes.extend_from_slice(&self.body);
        bytes
    }
}

/// 从比特流中解析出一帧。
///
/// # Errors
///
/// * 可用比特不足以容纳头部时返回 [`DecodeError::TruncatedFrame`]。
/// * 声明的长度超过剩余容量，或扩展帧格式不合法时返回 [`DecodeError::CorruptFrame`]。
pub fn unframe<'a, I>(reader: &mut LsbReader<I>) -> Result<Payload, DecodeError>
where
    I: Iterator<Item = &'a u8>,
{
    let available_bits = reader.remaining_bits();
    let header = reader.read_u32().ok_or(DecodeError::TruncatedFrame {
        needed_bits: FRAME_HEADER_BITS,
        available_bits,
    })?;

    let declared = u64::from(header & FRAME_LENGTH_MASK);
    let available = reader.remaining_bits() / 8;
    if declared > available {
        return Err(CorruptFrame::LengthExceedsCapacity {
            declared,
            available,
        }
        .into());
    }

    let body = reader
        .read_bytes(declared as usize)
        .ok_or(DecodeError::TruncatedFrame {
            needed_bits: required_bits(declared),
            available_bits,
        })?;

    if header & EXTENDED_FLAG == 0 {
        return Ok(Payload {
            data: body,
            ..Payload::default()
        });
    }
    parse_extension(&body).map_err(DecodeError::from)
}

fn parse_extension(body: &[u8]) -> Result<Payload, CorruptFrame> {
    let [version, flags, tag_len, rest @ ..] = body else {
        return Err(CorruptFrame::TruncatedExtension);
    };
    if *version != EXTENSION_VERSION {
        return Err(CorruptFrame::UnsupportedVersion(*version));
    }
    if flags & !FLAG_COMPRESSED != 0 {
        return Err(CorruptFrame::ReservedFlags(*flags));
    }

    let tag_len = usize::from(*tag_len);
    if rest.len() < tag_len {
        return Err(CorruptFrame::TruncatedExtension);
    }
    let (tag, content) = rest.split_at(tag_len);
    let tag = match tag {
        [] => None,
        bytes => Some(
            std::str::from_utf8(bytes)
                .map_err(|_| CorruptFrame::InvalidTag)?
                .to_owned(),
        ),
    };

    let compressed = flags & FLAG_COMPRESSED != 0;
    let data = if compressed {
        huffman::unpack(content)?
    } else {
        content.to_vec()
    };

    Ok(Payload {
        data,
        tag,
        compressed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steganography::embed;

    fn carrier_with(frame: &[u8], capacity: usize) -> Vec<u8> {
        let mut pixels = vec![0x80u8; capacity];
        embed(frame, pixels.iter_mut()).unwrap();
        pixels
    }

    fn unframe_from(pixels: &[u8]) -> Result<Payload, DecodeError> {
        let mut reader = LsbReader::new(pixels.iter(), pixels.len() as u64);
        unframe(&mut reader)
    }

    #[test]
    fn plain_header_is_big_endian_length() {
        let frame = Frame::plain(b"HELLOWORLD");
        assert_eq!(frame.header(), 10);
        assert_eq!(frame.bit_len(), 32 + 80);
        assert_eq!(&frame.to_bytes()[..4], &[0, 0, 0, 10]);
    }

    #[test]
    fn plain_frame_round_trips() {
        let frame = Frame::plain(b"HELLOWORLD");
        let pixels = carrier_with(&frame.to_bytes(), 200);

        let payload = unframe_from(&pixels).unwrap();
        assert_eq!(payload.data, b"HELLOWORLD");
        assert_eq!(payload.tag, None);
        assert!(!payload.compressed);
    }

    #[test]
    fn zero_length_is_a_valid_empty_payload() {
        let pixels = carrier_with(&Frame::plain(b"").to_bytes(), 32);
        assert_eq!(unframe_from(&pixels).unwrap().data, Vec::<u8>::new());
    }

    #[test]
    fn short_carrier_is_truncated() {
        let pixels = [0u8; 31];
        assert_eq!(
            unframe_from(&pixels),
            Err(DecodeError::TruncatedFrame {
                needed_bits: 32,
                available_bits: 31
            })
        );
    }

    #[test]
    fn oversized_length_is_corrupt() {
        // 载体只剩 1 字节，却声明了 2 字节的主体
        let pixels = carrier_with(&[0, 0, 0, 2], 40);
        assert_eq!(
            unframe_from(&pixels),
            Err(DecodeError::CorruptFrame(CorruptFrame::LengthExceedsCapacity {
                declared: 2,
                available: 1
            }))
        );
    }

    #[test]
    fn extended_frame_carries_tag_and_compression() {
        let secret = b"tagged and squeezed, squeezed and tagged".repeat(4);
        let frame = Frame::extended(&huffman::pack(&secret), Some("txt"), true).unwrap();
        assert!(frame.is_extended());
        assert_eq!(frame.header() & EXTENDED_FLAG, EXTENDED_FLAG);

        let pixels = carrier_with(&frame.to_bytes(), frame.bit_len() as usize);
        let payload = unframe_from(&pixels).unwrap();
        assert_eq!(payload.data, secret);
        assert_eq!(payload.tag.as_deref(), Some("txt"));
        assert!(payload.compressed);
    }

    #[test]
    fn extended_frame_without_tag() {
        let frame = Frame::extended(b"raw", None, false).unwrap();
        let pixels = carrier_with(&frame.to_bytes(), 128);
        let payload = unframe_from(&pixels).unwrap();
        assert_eq!(payload.data, b"raw");
        assert_eq!(payload.tag, None);
    }

    #[test]
    fn rejects_overlong_tag() {
        let tag = "x".repeat(256);
        assert_eq!(
            Frame::extended(b"", Some(&tag), false),
            Err(EncodeError::TagTooLong(256))
        );
    }

    #[test]
    fn rejects_malformed_extensions() {
        assert_eq!(parse_extension(&[1, 0]), Err(CorruptFrame::TruncatedExtension));
        assert_eq!(parse_extension(&[9, 0, 0]), Err(CorruptFrame::UnsupportedVersion(9)));
        assert_eq!(parse_extension(&[1, 0x82, 0]), Err(CorruptFrame::ReservedFlags(0x82)));
        assert_eq!(parse_extension(&[1, 0, 4, b'a']), Err(CorruptFrame::TruncatedExtension));
        assert_eq!(parse_extension(&[1, 0, 1, 0xFF]), Err(CorruptFrame::InvalidTag));
    }
}
