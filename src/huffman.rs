//! # Huffman 载荷压缩
//!
//! 可选的压缩层：在嵌入之前压缩秘密数据，以便在同一张载体图像中放下更大的文件。
//!
//! 打包格式：
//!
//! ```text
//! u32 BE   原始长度 N
//! u16 BE   符号数 S (0..=256)
//! S x      (u8 符号, u32 BE 频率)
//! ...      编码比特，最高位优先，末尾补零到字节边界
//! ```
//!
//! 解码端只依据频率表重建编码树，因此建树过程必须是确定的：
//! 最小堆按 `(频率, 序号)` 排序，叶子的序号是符号值，内部节点的序号从 256 开始递增。

use crate::error::CorruptFrame;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

const TABLE_HEADER_SIZE: usize = 6;
const TABLE_ENTRY_SIZE: usize = 5;

#[derive(Debug, Clone, Copy)]
enum Node {
    Leaf(u8),
    Internal { zero: usize, one: usize },
}

struct CodeTree {
    nodes: Vec<Node>,
    root: usize,
}

impl CodeTree {
    fn build(table: &[(u8, u32)]) -> Option<Self> {
        let mut nodes = Vec::with_capacity(table.len() * 2);
        let mut heap = BinaryHeap::with_capacity(table.len());

        for &(symbol, freq) in table {
            heap.push(Reverse((u64::from(freq), u32::from(symbol), nodes.len())));
            nodes.push(Node::Leaf(symbol));
        }

        let mut ordinal = 256u32;
        while heap.len() > 1 {
            let (Some(Reverse((f0, _, zero))), Some(Reverse((f1, _, one)))) =
                (heap.pop(), heap.pop())
            else {
                break;
            };
            heap.push(Reverse((f0 + f1, ordinal, nodes.len())));
            nodes.push(Node::Internal { zero, one });
            ordinal += 1;
        }

        let Reverse((_, _, root)) = heap.pop()?;
        Some(Self { nodes, root })
    }

    /// 每个符号的编码 (比特序列)。只有一个符号时，它的编码是单个 `0`。
    fn codes(&self) -> Vec<Vec<u8>> {
        let mut codes = vec![Vec::new(); 256];
        let mut stack = vec![(self.root, Vec::new())];

        while let Some((index, path)) = stack.pop() {
            match self.nodes[index] {
                Node::Leaf(symbol) => {
                    codes[usize::from(symbol)] = if path.is_empty() { vec![0] } else { path };
                }
                Node::Internal { zero, one } => {
                    let mut left = path.clone();
                    left.push(0);
                    let mut right = path;
                    right.push(1);
                    stack.push((zero, left));
                    stack.push((one, right));
                }
            }
        }
        codes
    }
}

#[derive(Default)]
struct BitPacker {
    out: Vec<u8>,
    current: u8,
    filled: u8,
}

impl BitPacker {
    fn push(&mut self, bit: u8) {
        self.current = (self.current << 1) | (bit & 1);
        self.filled += 1;
        if self.filled == 8 {
            self.out.push(self.current);
            self.current = 0;
            self.filled = 0;
        }
    }

    fn finish(mut self) -> Vec<u8> {
        if self.filled > 0 {
            self.out.push(self.current << (8 - self.filled));
        }
        self.out
    }
}

/// 压缩 `data`。调用者需保证 `data.len()` 不超过 `u32::MAX`。
pub fn pack(data: &[u8]) -> Vec<u8> {
    let mut freq = [0u32; 256];
    data.iter().for_each(|&b| freq[usize::from(b)] += 1);

    let table: Vec<(u8, u32)> = (0..=u8::MAX)
        .zip(freq)
        .filter(|&(_, f)| f > 0)
        .collect();

    let mut packed = Vec::with_capacity(TABLE_HEADER_SIZE + table.len() * TABLE_ENTRY_SIZE);
    packed.extend_from_slice(&(data.len() as u32).to_be_bytes());
    packed.extend_from_slice(&(table.len() as u16).to_be_bytes());
    for &(symbol, f) in &table {
        packed.push(symbol);
        packed.extend_from_slice(&f.to_be_bytes());
    }

    let Some(tree) = CodeTree::build(&table) else {
        return packed;
    };
    let codes = tree.codes();

    let mut bits = BitPacker::default();
    for &b in data {
        codes[usize::from(b)].iter().for_each(|&bit| bits.push(bit));
    }
    packed.extend(bits.finish());
    packed
}

/// 还原 [`pack`] 的输出。
///
/// # Errors
///
/// 频率表被截断、符号重复或频率为 0、频率之和与原始长度不符，
/// 或者编码比特提前结束时，返回 [`CorruptFrame::Compression`]。
pub fn unpack(packed: &[u8]) -> Result<Vec<u8>, CorruptFrame> {
    if packed.len() < TABLE_HEADER_SIZE {
        return Err(CorruptFrame::Compression("missing table header"));
    }
    let original_len = u32::from_be_bytes([packed[0], packed[1], packed[2], packed[3]]);
    let symbols = usize::from(u16::from_be_bytes([packed[4], packed[5]]));
    if symbols > 256 {
        return Err(CorruptFrame::Compression("too many symbols"));
    }

    let table_end = TABLE_HEADER_SIZE + symbols * TABLE_ENTRY_SIZE;
    if packed.len() < table_end {
        return Err(CorruptFrame::Compression("truncated frequency table"));
    }

    let mut seen = [false; 256];
    let mut total = 0u64;
    let mut table = Vec::with_capacity(symbols);
    for entry in packed[TABLE_HEADER_SIZE..table_end].chunks_exact(TABLE_ENTRY_SIZE) {
        let symbol = entry[0];
        let f = u32::from_be_bytes([entry[1], entry[2], entry[3], entry[4]]);
        if f == 0 || std::mem::replace(&mut seen[usize::from(symbol)], true) {
            return Err(CorruptFrame::Compression("invalid frequency table entry"));
        }
        total += u64::from(f);
        table.push((symbol, f));
    }
    if total != u64::from(original_len) {
        return Err(CorruptFrame::Compression("frequencies do not match length"));
    }

    let code_bytes = &packed[table_end..];
    let Some(tree) = CodeTree::build(&table) else {
        return Ok(Vec::new());
    };
    // 每个符号至少占 1 bit
    if total > code_bytes.len() as u64 * 8 {
        return Err(CorruptFrame::Compression("bitstream ended early"));
    }

    let mut bits = code_bytes
        .iter()
        .flat_map(|&byte| (0..8).rev().map(move |shift| (byte >> shift) & 1));
    let mut next_bit = || bits.next().ok_or(CorruptFrame::Compression("bitstream ended early"));

    let mut out = Vec::with_capacity(original_len as usize);
    while out.len() < original_len as usize {
        let mut index = tree.root;
        if let Node::Leaf(symbol) = tree.nodes[index] {
            next_bit()?;
            out.push(symbol);
            continue;
        }
        loop {
            match tree.nodes[index] {
                Node::Leaf(symbol) => {
                    out.push(symbol);
                    break;
                }
                Node::Internal { zero, one } => {
                    index = if next_bit()? == 0 { zero } else { one };
                }
            }
        }
    }
    Ok(out)
}
