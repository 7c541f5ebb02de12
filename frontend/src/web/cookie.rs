//! Cookie 读写
//!
//! 仅用于检测与清除会话 Cookie；HttpOnly 的 Cookie 对脚本不可见，
//! 此时 `get` 返回 `None`。

use wasm_bindgen::JsCast;
use web_sys::HtmlDocument;

fn html_document() -> Option<HtmlDocument> {
    web_sys::window()?
        .document()?
        .dyn_into::<HtmlDocument>()
        .ok()
}

/// 读取 Cookie 值
pub fn get(name: &str) -> Option<String> {
    let header = html_document()?.cookie().ok()?;
    find_cookie(&header, name)
}

/// 删除 Cookie (设置过期)
pub fn remove(name: &str) {
    if let Some(doc) = html_document() {
        let expired = format!("{}=; Max-Age=0; path=/", name);
        let _ = doc.set_cookie(&expired);
    }
}

/// 从 `document.cookie` 格式的字符串中查找指定 Cookie
pub(crate) fn find_cookie(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::find_cookie;

    #[test]
    fn finds_cookie_among_others() {
        let header = "theme=dark; authToken=abc.def; lang=ru";
        assert_eq!(find_cookie(header, "authToken").as_deref(), Some("abc.def"));
        assert_eq!(find_cookie(header, "missing"), None);
    }

    #[test]
    fn empty_value_counts_as_absent() {
        assert_eq!(find_cookie("authToken=", "authToken"), None);
        assert_eq!(find_cookie("", "authToken"), None);
    }

    #[test]
    fn does_not_match_name_prefixes() {
        assert_eq!(find_cookie("authTokenOld=1", "authToken"), None);
    }
}
