//! 运行时配置
//!
//! 后端地址在编译期通过环境变量 `SERVER_BASE_URL` 注入
//! (例如 `SERVER_BASE_URL=https://club.example trunk build`)，
//! 未设置时使用本地开发地址。

use bookclub_shared::API_PREFIX;
use std::time::Duration;

pub const DEFAULT_SERVER_BASE_URL: &str = "http://localhost:8080";

/// Items per page in the storefront catalog.
pub const CATALOG_PAGE_SIZE: usize = 12;
/// Rows per page in admin tables.
pub const ADMIN_PAGE_SIZE: usize = 10;

pub const TOAST_DURATION: Duration = Duration::from_secs(3);
pub const SLIDER_INTERVAL: Duration = Duration::from_secs(5);

/// Books shown on the home page below the slider.
pub const FEATURED_BOOKS: usize = 8;
/// Upcoming events shown on the home page.
pub const UPCOMING_EVENTS: usize = 3;

pub fn server_base_url() -> &'static str {
    resolve_base_url(option_env!("SERVER_BASE_URL"))
}

fn resolve_base_url(configured: Option<&'static str>) -> &'static str {
    configured
        .map(|url| url.trim().trim_end_matches('/'))
        .filter(|url| !url.is_empty())
        .unwrap_or(DEFAULT_SERVER_BASE_URL)
}

/// `{server}/api/rest`
pub fn api_base_url() -> String {
    format!("{}{}", server_base_url(), API_PREFIX)
}

/// Resolves an image or file reference returned by the backend.
///
/// Absolute URLs pass through; relative paths are served by the backend origin.
pub fn asset_url(reference: &str) -> String {
    join_asset(server_base_url(), reference)
}

fn join_asset(base: &str, reference: &str) -> String {
    if reference.starts_with("http://")
        || reference.starts_with("https://")
        || reference.starts_with("data:")
    {
        reference.to_string()
    } else if reference.starts_with('/') {
        format!("{}{}", base, reference)
    } else {
        format!("{}/{}", base, reference)
    }
}

/// Placeholder cover for items without an image.
pub const PLACEHOLDER_COVER: &str = "/assets/placeholder-cover.svg";

pub fn cover_or_placeholder(reference: Option<&str>) -> String {
    match reference.filter(|r| !r.trim().is_empty()) {
        Some(r) => asset_url(r),
        None => PLACEHOLDER_COVER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_falls_back_to_default() {
        assert_eq!(resolve_base_url(None), DEFAULT_SERVER_BASE_URL);
        assert_eq!(resolve_base_url(Some("  ")), DEFAULT_SERVER_BASE_URL);
        assert_eq!(
            resolve_base_url(Some("https://club.example/")),
            "https://club.example"
        );
    }

    #[test]
    fn asset_references_are_joined_to_origin() {
        let base = "http://localhost:8080";
        assert_eq!(
            join_asset(base, "/uploads/cover.png"),
            "http://localhost:8080/uploads/cover.png"
        );
        assert_eq!(
            join_asset(base, "uploads/cover.png"),
            "http://localhost:8080/uploads/cover.png"
        );
        assert_eq!(
            join_asset(base, "https://cdn.example/c.png"),
            "https://cdn.example/c.png"
        );
    }

    #[test]
    fn missing_cover_uses_placeholder() {
        assert_eq!(cover_or_placeholder(None), PLACEHOLDER_COVER);
        assert_eq!(cover_or_placeholder(Some(" ")), PLACEHOLDER_COVER);
    }
}
