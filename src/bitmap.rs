//! # 位图访问模块
//!
//! 解析并校验未压缩的 BMP 容器，暴露像素数据区与几何信息，
//! 并能将修改过的像素重新序列化为与原文件头完全一致的位图。
//!
//! 像素数据按文件中的存储顺序保留 (通常自下而上)，从不重新解释为自上而下。

use crate::constants::{
    BI_BITFIELDS, BI_RGB, BMP_SIGNATURE, DIB_HEADER_OFFSET, DIB_WIDTH_FIELD, FILE_HEADER_SIZE,
    PIXEL_OFFSET_FIELD, SUPPORTED_BIT_DEPTHS, SUPPORTED_DIB_SIZES,
};
use crate::error::FormatError;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, Cursor};
use std::ops::Range;

/// 已解析的未压缩位图。
///
/// 整个文件的字节被原样保存，只有像素数据区可以被修改，
/// 因此 [`BitmapImage::into_bytes`] 的输出在像素区之外与输入逐字节相同。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitmapImage {
    data: Vec<u8>,
    width: u32,
    height: u32,
    top_down: bool,
    bits_per_pixel: u16,
    stride: usize,
    pixel_offset: usize,
}

impl BitmapImage {
    /// 从借用的字节解析位图。输入会被复制，调用者的缓冲区不会被修改。
    pub fn parse(bytes: &[u8]) -> Result<Self, FormatError> {
        Self::from_vec(bytes.to_vec())
    }

    /// 解析并接管一个已拥有的缓冲区。
    ///
    /// # Errors
    ///
    /// 以下情况返回 [`FormatError`]：
    /// * 缺少 `BM` 签名，或头部被截断。
    /// * 信息头版本、位深度或压缩方式不受支持 (调色板图像与 RLE/JPEG/PNG 压缩均被拒绝)。
    /// * 声明的尺寸与实际缓冲区长度不一致。
    pub fn from_vec(data: Vec<u8>) -> Result<Self, FormatError> {
        if data.len() < BMP_SIGNATURE.len() || data[..2] != BMP_SIGNATURE {
            return Err(FormatError::MissingSignature);
        }

        // bfOffBits 与信息头大小相邻存放
        let mut cursor = Cursor::new(data.as_slice());
        cursor.set_position(PIXEL_OFFSET_FIELD as u64);
        let file_header_end = DIB_HEADER_OFFSET + 4;
        let pixel_offset = cursor
            .read_u32::<LittleEndian>()
            .map_err(truncated(file_header_end, data.len()))? as usize;
        let dib_size = cursor
            .read_u32::<LittleEndian>()
            .map_err(truncated(file_header_end, data.len()))?;
        if !SUPPORTED_DIB_SIZES.contains(&dib_size) {
            return Err(FormatError::UnsupportedHeader(dib_size));
        }

        let header_end = FILE_HEADER_SIZE + dib_size as usize;
        if data.len() < header_end {
            return Err(FormatError::TruncatedHeader {
                need: header_end,
                have: data.len(),
            });
        }

        // 以下字段按 BITMAPINFOHEADER 的顺序依次读取
        cursor.set_position(DIB_WIDTH_FIELD as u64);
        let header_field = truncated(header_end, data.len());
        let raw_width = cursor.read_i32::<LittleEndian>().map_err(header_field)?;
        let raw_height = cursor.read_i32::<LittleEndian>().map_err(header_field)?;
        if raw_width <= 0 || raw_height == 0 || raw_height == i32::MIN {
            return Err(FormatError::InvalidDimensions {
                width: raw_width,
                height: raw_height,
            });
        }

        let planes = cursor.read_u16::<LittleEndian>().map_err(header_field)?;
        if planes != 1 {
            return Err(FormatError::InvalidPlanes(planes));
        }

        let bits_per_pixel = cursor.read_u16::<LittleEndian>().map_err(header_field)?;
        if !SUPPORTED_BIT_DEPTHS.contains(&bits_per_pixel) {
            return Err(FormatError::UnsupportedBitDepth(bits_per_pixel));
        }

        let compression = cursor.read_u32::<LittleEndian>().map_err(header_field)?;
        let uncompressed = compression == BI_RGB
            || (compression == BI_BITFIELDS && matches!(bits_per_pixel, 16 | 32));
        if !uncompressed {
            return Err(FormatError::UnsupportedCompression(compression));
        }

        if pixel_offset < header_end {
            return Err(FormatError::InvalidPixelOffset {
                offset: pixel_offset,
                header_end,
            });
        }

        let width = raw_width as u32;
        let height = raw_height.unsigned_abs();
        let row_bytes = width as u64 * u64::from(bits_per_pixel / 8);
        let stride = row_bytes.div_ceil(4) * 4;

        let out_of_bounds = |size: usize| FormatError::PixelDataOutOfBounds {
            offset: pixel_offset,
            size,
            have: data.len(),
        };
        let size = stride
            .checked_mul(u64::from(height))
            .and_then(|size| usize::try_from(size).ok())
            .ok_or_else(|| out_of_bounds(usize::MAX))?;
        match pixel_offset.checked_add(size) {
            Some(end) if end <= data.len() => {}
            _ => return Err(out_of_bounds(size)),
        }

        Ok(Self {
            width,
            height,
            top_down: raw_height < 0,
            bits_per_pixel,
            stride: stride as usize,
            pixel_offset,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// 负高度的位图按自上而下存储行。
    pub fn is_top_down(&self) -> bool {
        self.top_down
    }

    pub fn bits_per_pixel(&self) -> u16 {
        self.bits_per_pixel
    }

    pub fn bytes_per_pixel(&self) -> usize {
        usize::from(self.bits_per_pixel / 8)
    }

    /// 每行的存储字节数，包含对齐到 4 字节边界的填充。
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// 每行中真正属于像素的字节数 (不含填充)。
    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.bytes_per_pixel()
    }

    pub fn pixel_offset(&self) -> usize {
        self.pixel_offset
    }

    fn pixel_range(&self) -> Range<usize> {
        self.pixel_offset..self.pixel_offset + self.stride * self.height as usize
    }

    /// 像素数据区，长度恰好为 `stride * height`。
    pub fn pixel_data(&self) -> &[u8] {
        &self.data[self.pixel_range()]
    }

    pub fn pixel_data_mut(&mut self) -> &mut [u8] {
        let range = self.pixel_range();
        &mut self.data[range]
    }

    /// 可用字节的数量，即每个可承载 1 bit 的像素字节数。
    pub fn eligible_len(&self) -> u64 {
        self.row_bytes() as u64 * u64::from(self.height)
    }

    /// 按存储顺序遍历可用字节：逐行，行内逐字节，跳过每行末尾的填充字节。
    pub fn eligible_bytes(&self) -> impl Iterator<Item = &u8> + '_ {
        let row_bytes = self.row_bytes();
        self.pixel_data()
            .chunks_exact(self.stride)
            .flat_map(move |row| row[..row_bytes].iter())
    }

    pub fn eligible_bytes_mut(&mut self) -> impl Iterator<Item = &mut u8> + '_ {
        let row_bytes = self.row_bytes();
        let stride = self.stride;
        self.pixel_data_mut()
            .chunks_exact_mut(stride)
            .flat_map(move |row| row[..row_bytes].iter_mut())
    }

    /// 重新序列化：原始头部、元数据与像素区之后的任何尾随字节都保持不变。
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// 头部在读到某个字段之前就结束了。
fn truncated(need: usize, have: usize) -> impl Fn(io::Error) -> FormatError + Copy {
    move |_| FormatError::TruncatedHeader { need, have }
}
