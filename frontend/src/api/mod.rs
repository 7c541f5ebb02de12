//! 后端 REST API 访问层
//!
//! - `transport`: 请求/响应模型与 `Transport` 抽象
//! - `client`: 每个后端端点一个方法的 `ApiClient`

mod client;
pub mod transport;

pub use client::ApiClient;
pub use transport::FilePayload;

use crate::config;
use crate::web::FetchTransport;

/// 浏览器中使用的客户端类型
pub type Api = ApiClient<FetchTransport>;

/// 创建指向配置后端的客户端
///
/// 认证信息由 Cookie 携带，客户端本身无状态，可以随用随建。
pub fn client() -> Api {
    ApiClient::new(FetchTransport::new(config::api_base_url()))
}
