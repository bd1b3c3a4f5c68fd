//! # bmp_hide 库
//!
//! 本库包含 BMP 隐写工具的核心逻辑：把任意文件的字节隐藏在未压缩位图的
//! 像素最低位中，并能原样恢复。
//!
//! 编解码核心 ([`encode`] / [`decode`]) 是纯函数，不触碰文件系统；
//! `cli` 与 `handler` 模块是命令行宿主。

// 声明库包含的所有模块。

pub mod bitmap;
pub mod capacity;
pub mod cli;
pub mod constants;
pub mod engine;
pub mod error;
pub mod frame;
pub mod handler;
pub mod huffman;
pub mod sniff;
pub mod steganography;

pub use engine::{decode, decode_payload, encode, encode_with, inspect, CoverInfo, EncodeOptions};
pub use error::{CorruptFrame, DecodeError, EncodeError, FormatError};
pub use frame::Payload;
