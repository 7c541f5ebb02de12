use std::fmt;

use bookclub_shared::protocol::ErrorBody;

// =========================================================
// 错误类型枚举
// =========================================================

/// 错误类型枚举
/// 由 HTTP 状态码或传输层故障决定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// 401: 未登录或会话过期
    Unauthenticated,
    /// 403: 权限不足
    Forbidden,
    /// 404: 资源未找到
    NotFound,
    /// 400 / 422: 请求校验失败
    InvalidInput,
    /// 409: 资源冲突 (如重复报名)
    Conflict,
    /// 其他非 2xx 响应
    Server,
    /// fetch 本身失败 (断网、CORS)
    Network,
    /// JSON 序列化或解析失败
    Serialization,
}

impl ApiErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => ApiErrorKind::Unauthenticated,
            403 => ApiErrorKind::Forbidden,
            404 => ApiErrorKind::NotFound,
            400 | 422 => ApiErrorKind::InvalidInput,
            409 => ApiErrorKind::Conflict,
            _ => ApiErrorKind::Server,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiErrorKind::Unauthenticated => "UNAUTHENTICATED",
            ApiErrorKind::Forbidden => "FORBIDDEN",
            ApiErrorKind::NotFound => "NOT_FOUND",
            ApiErrorKind::InvalidInput => "INVALID_INPUT",
            ApiErrorKind::Conflict => "CONFLICT",
            ApiErrorKind::Server => "SERVER_ERROR",
            ApiErrorKind::Network => "NETWORK_ERROR",
            ApiErrorKind::Serialization => "JSON_PARSE_ERROR",
        }
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.error_code())
    }
}

// =========================================================
// 错误上下文追踪
// =========================================================

/// 结构化的错误追踪片段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorSpan {
    /// 操作名称，如 "api.send", "cart.reload"
    pub operation: String,
    /// 额外的细节信息，如请求路径
    pub detail: Option<String>,
}

/// 追踪栈，按发生顺序记录
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace(Vec<ErrorSpan>);

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return Ok(());
        }
        write!(f, " | trace: ")?;
        for (i, span) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{}", span.operation)?;
            if let Some(detail) = &span.detail {
                write!(f, "({})", detail)?;
            }
        }
        Ok(())
    }
}

// =========================================================
// 核心错误类型
// =========================================================

/// 所有 API 调用的统一错误
///
/// - kind: 错误语义
/// - status: HTTP 状态码 (传输失败时为空)
/// - message: 诊断信息，写入控制台
/// - server_message: 后端返回的可展示信息 (`message` / `error` 字段)
/// - trace: 操作追踪栈
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("[{kind}] {message}{trace}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub status: Option<u16>,
    pub message: String,
    pub server_message: Option<String>,
    trace: Trace,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
            server_message: None,
            trace: Trace::default(),
        }
    }

    // --- Convenience constructors ---

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Unauthenticated, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Network, message)
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Serialization, message)
    }

    /// Builds an error from a non-2xx response, keeping the backend's message if it sent one.
    pub fn from_response(status: u16, body: &str) -> Self {
        let server_message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(ErrorBody::into_message);
        let message = match &server_message {
            Some(msg) => format!("HTTP {}: {}", status, msg),
            None => format!("HTTP {}", status),
        };
        Self {
            kind: ApiErrorKind::from_status(status),
            status: Some(status),
            message,
            server_message,
            trace: Trace::default(),
        }
    }

    // --- Context builders ---

    pub fn in_op(mut self, operation: impl Into<String>) -> Self {
        self.trace.0.push(ErrorSpan {
            operation: operation.into(),
            detail: None,
        });
        self
    }

    pub fn in_op_with(mut self, operation: impl Into<String>, detail: impl Into<String>) -> Self {
        self.trace.0.push(ErrorSpan {
            operation: operation.into(),
            detail: Some(detail.into()),
        });
        self
    }

    // --- Accessors ---

    pub fn is_unauthenticated(&self) -> bool {
        self.kind == ApiErrorKind::Unauthenticated
    }

    pub fn spans(&self) -> &[ErrorSpan] {
        &self.trace.0
    }

    /// Text for a toast: the backend's own message when present, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        if let Some(msg) = &self.server_message {
            return msg.clone();
        }
        match self.kind {
            ApiErrorKind::Unauthenticated => "Необходимо войти в аккаунт".to_string(),
            ApiErrorKind::Forbidden => "Недостаточно прав для этого действия".to_string(),
            ApiErrorKind::Network => "Сервер недоступен, попробуйте позже".to_string(),
            _ => fallback.to_string(),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::serialization(e.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_kinds() {
        assert_eq!(ApiErrorKind::from_status(401), ApiErrorKind::Unauthenticated);
        assert_eq!(ApiErrorKind::from_status(403), ApiErrorKind::Forbidden);
        assert_eq!(ApiErrorKind::from_status(422), ApiErrorKind::InvalidInput);
        assert_eq!(ApiErrorKind::from_status(409), ApiErrorKind::Conflict);
        assert_eq!(ApiErrorKind::from_status(502), ApiErrorKind::Server);
    }

    #[test]
    fn response_error_keeps_backend_message() {
        let err = ApiError::from_response(400, r#"{"message":"Книга закончилась"}"#);
        assert_eq!(err.kind, ApiErrorKind::InvalidInput);
        assert_eq!(err.status, Some(400));
        assert_eq!(err.user_message("Ошибка"), "Книга закончилась");
    }

    #[test]
    fn response_error_without_body_uses_fallback() {
        let err = ApiError::from_response(500, "<html>oops</html>");
        assert_eq!(err.server_message, None);
        assert_eq!(err.user_message("Не удалось сохранить"), "Не удалось сохранить");

        let err = ApiError::from_response(401, "");
        assert_eq!(err.user_message("x"), "Необходимо войти в аккаунт");
    }

    #[test]
    fn display_includes_trace() {
        let err = ApiError::network("connection refused")
            .in_op_with("api.send", "/books")
            .in_op("catalog.load");
        assert_eq!(
            err.to_string(),
            "[NETWORK_ERROR] connection refused | trace: api.send(/books) -> catalog.load"
        );
        assert_eq!(err.spans().len(), 2);
    }
}
