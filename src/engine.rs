//! # 隐写引擎
//!
//! 串联位图解析、容量检查、成帧与 LSB 嵌入。所有操作都是纯函数：
//! 不做 I/O，不持有全局状态，每次调用只修改自己的像素缓冲区副本，
//! 因此可以在多个线程中对不同的缓冲区并发调用。

use crate::bitmap::BitmapImage;
use crate::capacity::{capacity_bits, max_payload_bytes};
use crate::constants::{FRAME_HEADER_BITS, FRAME_LENGTH_MASK};
use crate::error::{DecodeError, EncodeError, FormatError};
use crate::frame::{unframe, Frame, Payload};
use crate::huffman;
use crate::steganography::{embed, LsbReader};

/// 编码选项。默认值写出基础帧 (仅长度前缀 + 原始数据)。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// 写入扩展帧的类型标签，例如原文件的扩展名。空字符串等同于没有标签。
    pub tag: Option<String>,
    /// 嵌入前先用 Huffman 编码压缩秘密数据。
    pub compress: bool,
}

impl EncodeOptions {
    pub fn is_baseline(&self) -> bool {
        self.tag().is_none() && !self.compress
    }

    fn tag(&self) -> Option<&str> {
        self.tag.as_deref().filter(|tag| !tag.is_empty())
    }
}

/// 载体图像的几何信息与容量。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverInfo {
    pub width: u32,
    pub height: u32,
    pub bits_per_pixel: u16,
    pub stride: usize,
    pub capacity_bits: u64,
    pub max_payload_bytes: u64,
}

/// 解析载体并报告它能容纳多少数据。
pub fn inspect(cover: &[u8]) -> Result<CoverInfo, FormatError> {
    let image = BitmapImage::parse(cover)?;
    Ok(CoverInfo {
        width: image.width(),
        height: image.height(),
        bits_per_pixel: image.bits_per_pixel(),
        stride: image.stride(),
        capacity_bits: capacity_bits(&image),
        max_payload_bytes: max_payload_bytes(&image),
    })
}

/// 将 `secret` 以基础帧隐藏进 `cover`，返回完整的隐写图像。
///
/// # Errors
///
/// * `cover` 不是受支持的未压缩位图时返回 [`EncodeError::Format`]。
/// * `secret` 超过载体容量时返回 [`EncodeError::Capacity`]，此时不会产生任何输出。
/// * 载体连 32 位帧头部都放不下时返回 [`EncodeError::HeaderDoesNotFit`]。
pub fn encode(cover: &[u8], secret: &[u8]) -> Result<Vec<u8>, EncodeError> {
    encode_with(cover, secret, &EncodeOptions::default())
}

/// 与 [`encode`] 相同，但可以附加类型标签或启用压缩。
pub fn encode_with(
    cover: &[u8],
    secret: &[u8],
    options: &EncodeOptions,
) -> Result<Vec<u8>, EncodeError> {
    let mut image = BitmapImage::parse(cover)?;
    embed_into(&mut image, secret, options)?;
    Ok(image.into_bytes())
}

/// 在已经解析好的 [`BitmapImage`] 上原地嵌入，只改写像素最低位。
///
/// 容量在任何修改之前检查，失败时 `image` 保持原样。返回实际占用的可用字节数。
pub fn embed_into(
    image: &mut BitmapImage,
    secret: &[u8],
    options: &EncodeOptions,
) -> Result<u64, EncodeError> {
    let available_bits = capacity_bits(image);
    if available_bits < FRAME_HEADER_BITS {
        return Err(EncodeError::HeaderDoesNotFit {
            needed_bits: FRAME_HEADER_BITS,
            available_bits,
        });
    }

    let max = max_payload_bytes(image);
    let frame = build_frame(secret, options)?;
    if frame.body_len() > max || frame.bit_len() > available_bits {
        return Err(EncodeError::Capacity {
            required: frame.body_len(),
            max,
        });
    }

    Ok(embed(&frame.to_bytes(), image.eligible_bytes_mut())?)
}

fn build_frame(secret: &[u8], options: &EncodeOptions) -> Result<Frame, EncodeError> {
    let secret_len = secret.len() as u64;
    if secret_len > u64::from(FRAME_LENGTH_MASK) {
        return Err(EncodeError::Capacity {
            required: secret_len,
            max: u64::from(FRAME_LENGTH_MASK),
        });
    }

    if options.is_baseline() {
        Ok(Frame::plain(secret))
    } else if options.compress {
        Frame::extended(&huffman::pack(secret), options.tag(), true)
    } else {
        Frame::extended(secret, options.tag(), false)
    }
}

/// 从隐写图像中恢复秘密数据。
///
/// 长度为 0 的载荷返回空向量。对从未编码过的图像解码，通常会因为声明的长度
/// 超过容量而失败；但若其像素最低位恰好组成一个足够小的长度，
/// 则会“成功”返回无意义的数据，这种歧义是该格式固有的。
///
/// # Errors
///
/// * 输入不是受支持的未压缩位图时返回 [`DecodeError::Format`]。
/// * 帧头部无法读出时返回 [`DecodeError::TruncatedFrame`]。
/// * 声明的长度与可用容量不一致时返回 [`DecodeError::CorruptFrame`]。
pub fn decode(stego: &[u8]) -> Result<Vec<u8>, DecodeError> {
    decode_payload(stego).map(|payload| payload.data)
}

/// 与 [`decode`] 相同，但同时返回扩展帧中的类型标签与压缩标志。
pub fn decode_payload(stego: &[u8]) -> Result<Payload, DecodeError> {
    let image = BitmapImage::parse(stego)?;
    let mut reader = LsbReader::new(image.eligible_bytes(), capacity_bits(&image));
    unframe(&mut reader)
}
