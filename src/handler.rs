//! # 命令处理逻辑模块
//!
//! 包含处理 `hide`、`recover` 和 `capacity` 子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O、调用核心隐写算法以及向用户报告结果。

use crate::cli::{CapacityArgs, HideArgs, RecoverArgs};
use crate::engine::{decode_payload, encode_with, inspect, EncodeOptions};
use crate::error::EncodeError;
use crate::sniff::{guess_extension, mime_type};
use anyhow::{Context, Result};
use colored::Colorize;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// 处理 'Hide' 命令的执行逻辑。
///
/// 负责读取载体图像和秘密文件、检查隐写空间是否足够、调用隐写引擎嵌入数据，
/// 最后将结果写入目标图像文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径与编码选项的 `HideArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 目标文件已存在且未指定 `--force`。
/// * 无法读取输入的图像或秘密文件。
/// * 图像不是受支持的未压缩 BMP，或没有足够的空间来隐藏文件。
/// * 无法写入到目标图像文件。
pub fn handle_hide(args: HideArgs) -> Result<()> {
    let dest = args
        .dest
        .clone()
        .unwrap_or_else(|| default_hide_path(&args.image));
    ensure_can_write(&dest, args.force)?;

    let picture = fs::read(&args.image).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let secret = fs::read(&args.secret).with_context(|| {
        format!(
            "Unable to read secret file: {}",
            args.secret.to_string_lossy().red().bold()
        )
    })?;

    let cover = inspect(&picture).with_context(|| {
        format!(
            "'{}' is not a supported uncompressed BMP image.",
            args.image.to_string_lossy().red().bold()
        )
    })?;
    debug!(
        "cover {}x{} at {} bpp, stride {}, {} eligible bytes",
        cover.width, cover.height, cover.bits_per_pixel, cover.stride, cover.capacity_bits
    );

    let tag = if args.no_tag {
        None
    } else {
        args.tag.clone().or_else(|| {
            args.secret
                .extension()
                .map(|ext| ext.to_string_lossy().into_owned())
        })
    };
    let options = EncodeOptions {
        tag,
        compress: args.compress,
    };
    info!(
        "hiding {} bytes (tag: {:?}, compress: {})",
        secret.len(),
        options.tag,
        options.compress
    );

    let stego = encode_with(&picture, &secret, &options).map_err(|err| match err {
        EncodeError::Capacity { required, max } => anyhow::anyhow!(
            "Not enough space in the image to hide the file. \nRequired: {}, Available: {}",
            required.to_string().red().bold(),
            max.to_string().green().bold()
        ),
        EncodeError::HeaderDoesNotFit {
            needed_bits,
            available_bits,
        } => anyhow::anyhow!(
            "Not enough space in the image to hide the file. \nThe image offers {} bits, the header alone needs {}",
            available_bits.to_string().red().bold(),
            needed_bits.to_string().green().bold()
        ),
        other => anyhow::Error::new(other).context("Failed to hide the file in the image."),
    })?;

    fs::write(&dest, stego).with_context(|| {
        format!(
            "Unable to write to target image file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The file has been successfully hidden and saved: {}",
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Recover' 命令的执行逻辑。
///
/// 负责读取经过隐写的图像文件、调用隐写引擎恢复数据，
/// 根据类型标签 (或内容签名) 决定输出文件的扩展名，最后写入目标文件。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取输入的图像文件。
/// * 图像中没有可识别的隐藏数据，或数据已损坏。
/// * 输出文件已存在且未指定 `--force`，或无法写入。
pub fn handle_recover(args: RecoverArgs) -> Result<()> {
    let picture = fs::read(&args.image).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let payload = decode_payload(&picture).with_context(|| {
        format!(
            "Failed to recover hidden data from '{}'. \nThe image may not contain a hidden file or is corrupted.",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let extension = payload
        .tag
        .as_deref()
        .filter(|tag| is_safe_extension(tag))
        .unwrap_or_else(|| guess_extension(&payload.data))
        .to_owned();
    debug!(
        "recovered {} bytes (tag: {:?}, compressed: {}, type: {})",
        payload.data.len(),
        payload.tag,
        payload.compressed,
        mime_type(&extension)
    );

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_recover_path(&args.image, &extension));
    ensure_can_write(&output, args.force)?;

    if payload.data.is_empty() {
        warn!("the hidden payload is empty");
        println!("{}", "The image carries an empty hidden file.".yellow());
    }

    let size = payload.data.len();
    fs::write(&output, payload.data).with_context(|| {
        format!(
            "Unable to write to target file: {}",
            output.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The file ({} bytes, {}) has been successfully recovered and saved: {}",
        size.to_string().green(),
        mime_type(&extension),
        output.to_string_lossy().green().bold()
    );
    Ok(())
}

/// 处理 'Capacity' 命令：打印载体图像的几何信息与可隐藏的最大字节数。
pub fn handle_capacity(args: CapacityArgs) -> Result<()> {
    let picture = fs::read(&args.image).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let cover = inspect(&picture).with_context(|| {
        format!(
            "'{}' is not a supported uncompressed BMP image.",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "{}x{} pixels, {} bits per pixel, {} bytes per row",
        cover.width, cover.height, cover.bits_per_pixel, cover.stride
    );
    println!(
        "Capacity: {} bits, up to {} bytes of hidden data",
        cover.capacity_bits.to_string().green().bold(),
        cover.max_payload_bytes.to_string().green().bold()
    );
    Ok(())
}

fn ensure_can_write(path: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !path.exists(),
        "Output file already exists: {}. \nUse --force to overwrite it.",
        path.to_string_lossy().red().bold()
    );
    Ok(())
}

/// 默认的隐写图像路径：与载体同目录的 `doctored_<载体文件名>`。
pub fn default_hide_path(image: &Path) -> PathBuf {
    let name = image
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image.bmp".to_owned());
    image.with_file_name(format!("doctored_{name}"))
}

/// 默认的恢复文件路径：与图像同目录的 `recovered_<图像主文件名>.<扩展名>`。
pub fn default_recover_path(image: &Path, extension: &str) -> PathBuf {
    let stem = image
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_owned());
    image.with_file_name(format!("recovered_{stem}.{extension}"))
}

/// 标签来自图像本身，只接受短小的字母数字扩展名，避免拼出意外的路径。
fn is_safe_extension(tag: &str) -> bool {
    !tag.is_empty() && tag.len() <= 16 && tag.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths_sit_next_to_the_input() {
        let dir = Path::new("/tmp/work");
        assert_eq!(
            default_hide_path(&dir.join("cover.bmp")),
            dir.join("doctored_cover.bmp")
        );
        assert_eq!(
            default_recover_path(&dir.join("doctored_cover.bmp"), "pdf"),
            dir.join("recovered_doctored_cover.pdf")
        );
    }

    #[test]
    fn unsafe_tags_are_ignored() {
        assert!(is_safe_extension("png"));
        assert!(!is_safe_extension("../../etc/passwd"));
        assert!(!is_safe_extension(""));
        assert!(!is_safe_extension("a.b"));
    }
}
