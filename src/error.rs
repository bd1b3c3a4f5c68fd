//! # 错误类型模块
//!
//! 编解码核心的所有失败都以类型化的错误返回给调用者。
//! 核心本身不记录日志、不重试，如何呈现给用户由宿主决定。

use crate::steganography::CarrierExhausted;
use thiserror::Error;

/// 输入字节不是可解析的未压缩 BMP 容器。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("missing BMP signature: expected 'BM'")]
    MissingSignature,

    #[error("truncated header: need {need} bytes, have {have}")]
    TruncatedHeader { need: usize, have: usize },

    #[error("unsupported DIB header size: {0}")]
    UnsupportedHeader(u32),

    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("invalid number of color planes: {0}")]
    InvalidPlanes(u16),

    #[error("unsupported bit depth: {0} bits per pixel")]
    UnsupportedBitDepth(u16),

    #[error("unsupported compression method: {0}")]
    UnsupportedCompression(u32),

    #[error("pixel data offset {offset} points inside the {header_end}-byte header")]
    InvalidPixelOffset { offset: usize, header_end: usize },

    #[error("pixel data out of bounds: offset {offset} + {size} bytes exceeds file length {have}")]
    PixelDataOutOfBounds { offset: usize, size: usize, have: usize },
}

/// 帧内容与可用容量或扩展帧格式不一致。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorruptFrame {
    #[error("declared payload of {declared} bytes exceeds remaining capacity of {available} bytes")]
    LengthExceedsCapacity { declared: u64, available: u64 },

    #[error("unsupported frame extension version: {0}")]
    UnsupportedVersion(u8),

    #[error("reserved frame flags set: {0:#04x}")]
    ReservedFlags(u8),

    #[error("frame extension is shorter than its preamble")]
    TruncatedExtension,

    #[error("type tag is not valid UTF-8")]
    InvalidTag,

    #[error("compressed payload is corrupt: {0}")]
    Compression(&'static str),
}

/// `encode` 的失败原因。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error(transparent)]
    Format(#[from] FormatError),

    /// 两个字段的单位都是帧主体的字节数：`required` 是待写入的主体长度，
    /// `max` 是该载体图像最多能容纳的主体字节数。
    #[error("not enough capacity: frame body needs {required} bytes, the image holds at most {max}")]
    Capacity { required: u64, max: u64 },

    /// 载体的可用字节连帧头部都放不下，与秘密数据的大小无关。
    #[error("cover too small: the frame header needs {needed_bits} bits, the image provides {available_bits}")]
    HeaderDoesNotFit { needed_bits: u64, available_bits: u64 },

    #[error(transparent)]
    CarrierExhausted(#[from] CarrierExhausted),

    #[error("type tag is {0} bytes long, at most 255 are allowed")]
    TagTooLong(usize),
}

/// `decode` 的失败原因。
///
/// 长度为 0 的载荷是合法的，会作为空字节序列成功返回，而不是错误。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("truncated frame: need {needed_bits} bits, image provides {available_bits}")]
    TruncatedFrame { needed_bits: u64, available_bits: u64 },

    #[error("corrupt frame: {0}")]
    CorruptFrame(#[from] CorruptFrame),
}
