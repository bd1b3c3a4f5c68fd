//! # 文件类型猜测
//!
//! 当隐写图像没有携带类型标签时，根据恢复数据开头的签名字节猜测扩展名。
//! 这只影响输出文件的命名，不属于编解码契约。

const SIGNATURES: &[(&[u8], &str)] = &[
    (b"\x89PNG", "png"),
    (b"\xFF\xD8\xFF", "jpg"),
    (b"GIF8", "gif"),
    (b"BM", "bmp"),
    (b"%PDF", "pdf"),
    (b"PK\x03\x04", "zip"),
    (b"<!DOCTYPE html", "html"),
    (b"<html", "html"),
    (b"<?xml", "xml"),
    (b"{\n", "json"),
    (b"{\"", "json"),
    (b"#", "txt"),
    (b"//", "txt"),
];

/// 猜测扩展名 (不含点号)。无法识别时返回 `bin`。
pub fn guess_extension(data: &[u8]) -> &'static str {
    if let Some(&(_, ext)) = SIGNATURES.iter().find(|(magic, _)| data.starts_with(magic)) {
        return ext;
    }
    if !data.is_empty() && data.iter().all(|&b| matches!(b, 9 | 10 | 13 | 32..=126)) {
        return "txt";
    }
    "bin"
}

pub fn mime_type(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "html" | "htm" => "text/html",
        "xml" => "application/xml",
        "json" => "application/json",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_signatures() {
        assert_eq!(guess_extension(b"\x89PNG\r\n\x1a\n"), "png");
        assert_eq!(guess_extension(b"\xFF\xD8\xFF\xE0"), "jpg");
        assert_eq!(guess_extension(b"%PDF-1.7"), "pdf");
        assert_eq!(guess_extension(b"PK\x03\x04rest"), "zip");
        assert_eq!(guess_extension(b"<?xml version"), "xml");
        assert_eq!(guess_extension(b"{\"a\": 1}"), "json");
    }

    #[test]
    fn printable_ascii_is_text() {
        assert_eq!(guess_extension(b"plain words\r\n\tindented"), "txt");
        assert_eq!(guess_extension(&[0x00, 0x9F, 0x42]), "bin");
        assert_eq!(guess_extension(b""), "bin");
    }

    #[test]
    fn mime_types() {
        assert_eq!(mime_type("PNG"), "image/png");
        assert_eq!(mime_type("txt"), "text/plain");
        assert_eq!(mime_type("weird"), "application/octet-stream");
    }
}
