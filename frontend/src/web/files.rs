//! 浏览器 `File` 读取
//!
//! 文件选择框与拖拽区得到的 `web_sys::File` 在这里转成 `FilePayload`，
//! 之后由 `FetchTransport` 重新组装为 `FormData`。

use wasm_bindgen_futures::JsFuture;
use web_sys::File;

use crate::api::FilePayload;
use crate::error::{ApiError, ApiResult};

/// 读取文件全部内容
pub async fn read_file(file: &File) -> ApiResult<FilePayload> {
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| ApiError::network(format!("{:?}", e)).in_op_with("file.read", file.name()))?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();

    Ok(FilePayload {
        file_name: file.name(),
        mime_type: file.type_(),
        bytes,
    })
}

/// 人类可读的文件大小
pub fn format_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let size = bytes as f64;
    if size >= MB {
        format!("{:.1} МБ", size / MB)
    } else if size >= KB {
        format!("{:.0} КБ", size / KB)
    } else {
        format!("{} Б", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::format_size;

    #[test]
    fn sizes_use_binary_units() {
        assert_eq!(format_size(512), "512 Б");
        assert_eq!(format_size(2048), "2 КБ");
        assert_eq!(format_size(3 * 1024 * 1024 / 2), "1.5 МБ");
    }
}
