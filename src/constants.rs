/// BMP 文件头 (BITMAPFILEHEADER) 的大小 (字节)。
pub const FILE_HEADER_SIZE: usize = 14;

/// 文件签名 `BM`。
pub const BMP_SIGNATURE: [u8; 2] = *b"BM";

/// 文件头中像素数据偏移量字段 (`bfOffBits`) 的位置。
pub const PIXEL_OFFSET_FIELD: usize = 10;

/// 信息头 (DIB header) 的起始位置，其前 4 字节是信息头自身的大小。
pub const DIB_HEADER_OFFSET: usize = FILE_HEADER_SIZE;

/// 信息头中宽度字段的位置。其后依次是高度 (i32)、平面数 (u16)、位深度 (u16) 与压缩方式 (u32)。
pub const DIB_WIDTH_FIELD: usize = DIB_HEADER_OFFSET + 4;

/// 可接受的信息头大小：BITMAPINFOHEADER、V2、V3、V4、V5。
pub const SUPPORTED_DIB_SIZES: [u32; 5] = [40, 52, 56, 108, 124];

/// 未压缩 (BI_RGB)。
pub const BI_RGB: u32 = 0;

/// 位域 (BI_BITFIELDS)：像素仍以未压缩形式存储，只是通道掩码写在头部。
pub const BI_BITFIELDS: u32 = 3;

/// 支持的位深度。更低的位深度使用调色板，不予接受。
pub const SUPPORTED_BIT_DEPTHS: [u16; 3] = [16, 24, 32];

/// 帧头部的位数。
/// 长度前缀是一个大端序 `u32`，每个可用像素字节承载 1 bit，
/// 因此需要 32 个像素字节来隐藏它。
pub const FRAME_HEADER_BITS: u64 = 32;

/// 帧头部最高位：置位表示扩展帧。
pub const EXTENDED_FLAG: u32 = 1 << 31;

/// 帧头部中表示主体长度的位。
pub const FRAME_LENGTH_MASK: u32 = !EXTENDED_FLAG;

/// 当前扩展帧格式的版本号。
pub const EXTENSION_VERSION: u8 = 1;

/// 扩展帧标志位：内容经过 Huffman 压缩。
pub const FLAG_COMPRESSED: u8 = 0x01;

/// 扩展帧前导部分 (版本、标志、标签长度) 的字节数。
pub const EXTENSION_PREAMBLE_SIZE: usize = 3;

/// 类型标签的最大字节数 (标签长度以单个字节存储)。
pub const MAX_TAG_LEN: usize = u8::MAX as usize;
