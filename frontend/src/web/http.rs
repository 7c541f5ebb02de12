//! HTTP 请求封装模块
//!
//! 基于 `gloo-net` 的 `Transport` 实现：所有请求携带 Cookie
//! (`credentials: include`)，并在控制台记录方法、路径、状态码与耗时。

use bookclub_shared::protocol::HttpMethod;
use gloo_net::http::{Request, RequestBuilder};
use wasm_bindgen::JsValue;
use web_sys::{Blob, BlobPropertyBag, FormData, RequestCredentials};

use crate::api::transport::{
    HttpRequest, HttpResponse, MultipartPart, PartContent, RequestBody, Transport,
};
use crate::error::{ApiError, ApiResult};

/// 浏览器 fetch 传输层
#[derive(Clone, Debug, PartialEq)]
pub struct FetchTransport {
    base_url: String,
}

impl FetchTransport {
    pub fn new(base_url: String) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self { base_url }
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn builder(&self, method: HttpMethod, url: &str) -> RequestBuilder {
        let builder = match method {
            HttpMethod::Get => Request::get(url),
            HttpMethod::Post => Request::post(url),
            HttpMethod::Put => Request::put(url),
            HttpMethod::Delete => Request::delete(url),
            HttpMethod::Patch => Request::patch(url),
        };
        builder.credentials(RequestCredentials::Include)
    }
}

#[async_trait::async_trait(?Send)]
impl Transport for FetchTransport {
    async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse> {
        let url = self.url(&req.path);
        let builder = self.builder(req.method, &url);

        let request = match req.body {
            RequestBody::Empty => builder.build(),
            RequestBody::Json(json) => builder
                .header("Content-Type", "application/json")
                .body(json),
            // Content-Type 由浏览器根据 FormData 生成 (含 boundary)
            RequestBody::Multipart(parts) => builder.body(form_data(&parts)?),
        }
        .map_err(|e| ApiError::network(e.to_string()).in_op_with("http.build", req.path.clone()))?;

        let started = js_sys::Date::now();
        let response = request.send().await.map_err(|e| {
            log_error!("[api] {} {} network error: {}", req.method.as_str(), req.path, e);
            ApiError::network(e.to_string()).in_op_with("http.fetch", req.path.clone())
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::network(e.to_string()).in_op_with("http.read", req.path.clone()))?;

        log_info!(
            "[api] {} {} -> {} ({} ms)",
            req.method.as_str(),
            req.path,
            status,
            (js_sys::Date::now() - started) as i64
        );

        Ok(HttpResponse { status, body })
    }
}

/// 将 multipart 片段组装为浏览器 `FormData`
fn form_data(parts: &[MultipartPart]) -> ApiResult<FormData> {
    let js_err = |op: &'static str| {
        move |e: JsValue| ApiError::network(format!("{:?}", e)).in_op(op)
    };

    let form = FormData::new().map_err(js_err("form.new"))?;
    for part in parts {
        match &part.content {
            PartContent::Json(json) => {
                let blob = blob(
                    &js_sys::Array::of1(&JsValue::from_str(json)),
                    "application/json",
                    false,
                )
                .map_err(js_err("form.json"))?;
                form.append_with_blob(&part.name, &blob)
                    .map_err(js_err("form.append"))?;
            }
            PartContent::File(file) => {
                let bytes = js_sys::Uint8Array::from(file.bytes.as_slice());
                let blob = blob(&js_sys::Array::of1(&bytes), &file.mime_type, true)
                    .map_err(js_err("form.file"))?;
                form.append_with_blob_and_filename(&part.name, &blob, &file.file_name)
                    .map_err(js_err("form.append"))?;
            }
        }
    }
    Ok(form)
}

fn blob(parts: &js_sys::Array, mime_type: &str, binary: bool) -> Result<Blob, JsValue> {
    let options = BlobPropertyBag::new();
    options.set_type(mime_type);
    if binary {
        Blob::new_with_u8_array_sequence_and_options(parts, &options)
    } else {
        Blob::new_with_str_sequence_and_options(parts, &options)
    }
}
