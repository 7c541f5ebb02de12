use bookclub_shared::protocol::HttpMethod;
use serde::de::DeserializeOwned;

use crate::error::{ApiError, ApiResult};

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::collections::{HashMap, VecDeque};

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

/// A binary part of a multipart upload.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePayload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PartContent {
    /// Sent as a blob with `application/json` content type.
    Json(String),
    File(FilePayload),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultipartPart {
    pub name: String,
    pub content: PartContent,
}

impl MultipartPart {
    pub fn json(name: &str, json: String) -> Self {
        Self {
            name: name.to_string(),
            content: PartContent::Json(json),
        }
    }

    pub fn file(name: &str, file: FilePayload) -> Self {
        Self {
            name: name.to_string(),
            content: PartContent::File(file),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(String),
    Multipart(Vec<MultipartPart>),
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Path relative to the API base, including any query string.
    pub path: String,
    pub body: RequestBody,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: RequestBody::Empty,
        }
    }

    pub fn with_json(mut self, json: String) -> Self {
        self.body = RequestBody::Json(json);
        self
    }

    pub fn with_parts(mut self, parts: Vec<MultipartPart>) -> Self {
        self.body = RequestBody::Multipart(parts);
        self
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parses the body; an empty body (204) reads as JSON `null` so `()` responses succeed.
    pub fn json<T: DeserializeOwned>(&self) -> ApiResult<T> {
        let body = if self.body.trim().is_empty() {
            "null"
        } else {
            self.body.as_str()
        };
        serde_json::from_str(body).map_err(ApiError::from)
    }
}

/// 发送请求的传输层
///
/// 浏览器中为 `FetchTransport`，测试中为 `MockTransport`。
#[async_trait::async_trait(?Send)]
pub trait Transport {
    async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse>;
}

// =========================================================
// 测试工具: MockTransport
// =========================================================

#[cfg(test)]
pub struct MockTransport {
    // (Method, Path) -> 依次返回的 (Status, Body)；最后一个响应会被重复使用
    responses: RefCell<HashMap<(HttpMethod, String), VecDeque<(u16, String)>>>,
    /// 记录发出的请求
    pub requests: RefCell<Vec<HttpRequest>>,
}

#[cfg(test)]
impl MockTransport {
    pub fn new() -> Self {
        Self {
            responses: RefCell::new(HashMap::new()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn mock(&self, method: HttpMethod, path: &str, status: u16, body: serde_json::Value) {
        let body = if body.is_null() {
            String::new()
        } else {
            body.to_string()
        };
        self.responses
            .borrow_mut()
            .entry((method, path.to_string()))
            .or_default()
            .push_back((status, body));
    }

    /// `(METHOD, path)` of every request sent so far.
    pub fn calls(&self) -> Vec<(HttpMethod, String)> {
        self.requests
            .borrow()
            .iter()
            .map(|r| (r.method, r.path.clone()))
            .collect()
    }
}

#[cfg(test)]
#[async_trait::async_trait(?Send)]
impl Transport for MockTransport {
    async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse> {
        let key = (req.method, req.path.clone());
        self.requests.borrow_mut().push(req);

        let mut responses = self.responses.borrow_mut();
        let (status, body) = match responses.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or((404, String::new())),
            Some(queue) => queue.front().cloned().unwrap_or((404, String::new())),
            None => (404, r#"{"message":"Not Found"}"#.to_string()),
        };
        Ok(HttpResponse { status, body })
    }
}
