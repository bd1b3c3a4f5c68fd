//! # LSB 嵌入与提取
//!
//! 比特流中的第 `i` 位总是映射到第 `i` 个可用像素字节的最低位，
//! 字节内按最高位优先的顺序展开。没有随机化，也没有密钥置换。

use thiserror::Error;

/// 可用像素字节在比特流写完之前就用尽了。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("the steganographic region extends beyond the image data boundary after {written} bits")]
pub struct CarrierExhausted {
    pub written: u64,
}

/// 将比特逐个写入载体字节的最低位，其余 7 位保持不变。
pub struct LsbWriter<I> {
    carrier: I,
    written: u64,
}

impl<'a, I> LsbWriter<I>
where
    I: Iterator<Item = &'a mut u8>,
{
    pub fn new(carrier: I) -> Self {
        Self { carrier, written: 0 }
    }

    pub fn write_bit(&mut self, bit: u8) -> Result<(), CarrierExhausted> {
        let byte = self.carrier.next().ok_or(CarrierExhausted {
            written: self.written,
        })?;
        *byte = (*byte & 0xFE) | (bit & 1);
        self.written += 1;
        Ok(())
    }

    /// 按最高位优先写入每个字节。
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), CarrierExhausted> {
        bytes.iter().try_for_each(|&value| {
            (0..8)
                .rev()
                .try_for_each(|shift| self.write_bit(value >> shift))
        })
    }

    pub fn bits_written(&self) -> u64 {
        self.written
    }
}

/// 从载体字节的最低位依次读回比特流。
///
/// 读取器知道剩余多少个可用字节，从不越过缓冲区末尾。
pub struct LsbReader<I> {
    carrier: I,
    remaining: u64,
}

impl<'a, I> LsbReader<I>
where
    I: Iterator<Item = &'a u8>,
{
    /// `available_bits` 必须等于 `carrier` 能产出的字节数。
    pub fn new(carrier: I, available_bits: u64) -> Self {
        Self {
            carrier,
            remaining: available_bits,
        }
    }

    pub fn remaining_bits(&self) -> u64 {
        self.remaining
    }

    pub fn read_bit(&mut self) -> Option<u8> {
        let byte = self.carrier.next()?;
        self.remaining = self.remaining.saturating_sub(1);
        Some(byte & 1)
    }

    /// 读取一个最高位优先的 `u32`。
    pub fn read_u32(&mut self) -> Option<u32> {
        (0..32).try_fold(0u32, |acc, _| Some((acc << 1) | u32::from(self.read_bit()?)))
    }

    pub fn read_byte(&mut self) -> Option<u8> {
        (0..8).try_fold(0u8, |acc, _| Some((acc << 1) | self.read_bit()?))
    }

    pub fn read_bytes(&mut self, len: usize) -> Option<Vec<u8>> {
        (0..len).map(|_| self.read_byte()).collect()
    }
}

/// 把整个帧写入载体，返回占用的可用字节数。
pub fn embed<'a, I>(frame: &[u8], carrier: I) -> Result<u64, CarrierExhausted>
where
    I: Iterator<Item = &'a mut u8>,
{
    let mut writer = LsbWriter::new(carrier);
    writer.write_bytes(frame)?;
    Ok(writer.bits_written())
}
