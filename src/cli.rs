//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 所有用户通过命令行与程序交互的入口点都在此模块中定义。

use clap::Parser;
use std::path::PathBuf;

/// 一款基于 LSB (最低有效位) 隐写术的命令行工具，用于在未压缩的 BMP 图像中隐藏或恢复任意文件。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "一款基于 LSB (最低有效位) 隐写术的命令行工具，用于在未压缩的 BMP 图像中隐藏或恢复任意文件。\n每个像素字节的最低位承载 1 bit，图像的尺寸与文件头保持不变。"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令：hide (隐藏)、recover (恢复) 和 capacity (容量)。
#[derive(Parser, Debug)]
pub enum Commands {
    /// 在未压缩的 BMP 图像中隐藏任意文件。
    Hide(HideArgs),

    /// 从经过隐写的图像中恢复隐藏的文件。
    Recover(RecoverArgs),

    /// 显示 BMP 图像的几何信息以及最多能隐藏多少字节。
    Capacity(CapacityArgs),
}

/// 'hide' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct HideArgs {
    /// 用作载体的 BMP 图像路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 要隐藏的文件路径 (任意类型)。
    #[arg(short, long)]
    pub secret: PathBuf,

    /// 结果图像的输出路径。默认为载体旁边的 `doctored_<文件名>`。
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// 嵌入前使用 Huffman 编码压缩数据。
    #[arg(short, long)]
    pub compress: bool,

    /// 写入图像的类型标签。默认使用秘密文件的扩展名。
    #[arg(long, conflicts_with = "no_tag")]
    pub tag: Option<String>,

    /// 不写入类型标签。
    #[arg(long)]
    pub no_tag: bool,

    /// 输出文件已存在时强制覆盖。
    #[arg(short, long)]
    pub force: bool,
}

/// 'recover' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct RecoverArgs {
    /// 已隐藏数据的图像路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 恢复文件的输出路径。默认为图像旁边的 `recovered_<文件名>.<扩展名>`。
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 输出文件已存在时强制覆盖。
    #[arg(short, long)]
    pub force: bool,
}

/// 'capacity' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct CapacityArgs {
    /// 要检查的 BMP 图像路径。
    #[arg(short, long)]
    pub image: PathBuf,
}
