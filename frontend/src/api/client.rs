use bookclub_shared::protocol::*;
use bookclub_shared::{
    AuditEntry, AuthResponse, Book, BookForm, BookId, Cart, Event, EventApplication, EventForm,
    EventId, Order, OrderId, OrderStatus, Product, ProductForm, ProductId, Role, SliderBook, User,
    UserId,
};
use serde::de::DeserializeOwned;

use super::transport::{FilePayload, HttpRequest, HttpResponse, MultipartPart, Transport};
use crate::error::{ApiError, ApiResult};

/// 后端 REST API 网关
///
/// 每个公开方法对应一个后端端点，统一返回 `ApiResult`。
#[derive(Clone, Debug)]
pub struct ApiClient<T> {
    transport: T,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    #[cfg(test)]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// 发送强类型请求并获取解析后的响应
    pub async fn call<R: ApiRequest>(&self, req: &R) -> ApiResult<R::Response> {
        let path = req.path();
        let body = req
            .body()
            .map_err(|e| ApiError::from(e).in_op_with("api.serialize", path.clone()))?;

        let mut request = HttpRequest::new(R::METHOD, path.clone());
        if let Some(json) = body {
            request = request.with_json(json);
        }
        self.dispatch(request).await
    }

    async fn dispatch<U: DeserializeOwned>(&self, request: HttpRequest) -> ApiResult<U> {
        let method = request.method;
        let path = request.path.clone();
        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| e.in_op_with("api.send", path.clone()))?;
        decode(method, &path, response)
    }

    async fn upload<U: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: String,
        parts: Vec<MultipartPart>,
    ) -> ApiResult<U> {
        self.dispatch(HttpRequest::new(method, path).with_parts(parts))
            .await
    }

    // =========================================================
    // Auth & Profile
    // =========================================================

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<AuthResponse> {
        self.call(&LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        })
        .await
    }

    pub async fn logout(&self) -> ApiResult<()> {
        self.call(&LogoutRequest).await
    }

    pub async fn register(&self, req: &RegisterRequest) -> ApiResult<User> {
        self.call(req).await
    }

    pub async fn fetch_profile(&self) -> ApiResult<User> {
        self.call(&GetProfileRequest).await
    }

    pub async fn update_profile(&self, req: &UpdateProfileRequest) -> ApiResult<User> {
        self.call(req).await
    }

    // =========================================================
    // Cart
    // =========================================================

    pub async fn fetch_cart(&self, user_id: UserId) -> ApiResult<Cart> {
        self.call(&GetCartRequest { user_id }).await
    }

    pub async fn add_to_cart(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> ApiResult<()> {
        self.call(&AddCartItemRequest {
            user_id,
            product_id,
            quantity,
        })
        .await
    }

    pub async fn remove_from_cart(&self, user_id: UserId, product_id: ProductId) -> ApiResult<()> {
        self.call(&RemoveCartItemRequest {
            user_id,
            product_id,
        })
        .await
    }

    pub async fn clear_cart(&self, user_id: UserId) -> ApiResult<()> {
        self.call(&ClearCartRequest { user_id }).await
    }

    // =========================================================
    // Orders
    // =========================================================

    pub async fn create_order(&self, req: &CreateOrderRequest) -> ApiResult<Order> {
        self.call(req).await
    }

    pub async fn my_orders(&self) -> ApiResult<Vec<Order>> {
        self.call(&MyOrdersRequest).await
    }

    pub async fn all_orders(&self) -> ApiResult<Vec<Order>> {
        self.call(&AllOrdersRequest).await
    }

    pub async fn update_order_status(&self, id: OrderId, status: OrderStatus) -> ApiResult<Order> {
        self.call(&UpdateOrderStatusRequest { id, status }).await
    }

    // =========================================================
    // Event applications
    // =========================================================

    pub async fn apply_to_event(
        &self,
        event_id: EventId,
        comment: Option<String>,
    ) -> ApiResult<EventApplication> {
        let comment = comment.filter(|c| !c.trim().is_empty());
        self.call(&ApplyToEventRequest { event_id, comment }).await
    }

    pub async fn my_applications(&self) -> ApiResult<Vec<EventApplication>> {
        self.call(&MyApplicationsRequest).await
    }

    pub async fn event_applications(&self, event_id: EventId) -> ApiResult<Vec<EventApplication>> {
        self.call(&EventApplicationsRequest { event_id }).await
    }

    pub async fn cancel_application(&self, id: i64) -> ApiResult<EventApplication> {
        self.application_action(id, ApplicationAction::Cancel).await
    }

    pub async fn approve_application(&self, id: i64) -> ApiResult<EventApplication> {
        self.application_action(id, ApplicationAction::Approve).await
    }

    pub async fn reject_application(&self, id: i64) -> ApiResult<EventApplication> {
        self.application_action(id, ApplicationAction::Reject).await
    }

    async fn application_action(
        &self,
        id: i64,
        action: ApplicationAction,
    ) -> ApiResult<EventApplication> {
        self.call(&ApplicationActionRequest { id, action }).await
    }

    // =========================================================
    // Books (multipart: `book` JSON part + `cover` / `file`)
    // =========================================================

    pub async fn list_books(&self) -> ApiResult<Vec<Book>> {
        self.call(&ListBooksRequest).await
    }

    pub async fn get_book(&self, id: BookId) -> ApiResult<Book> {
        self.call(&GetBookRequest { id }).await
    }

    pub async fn create_book(
        &self,
        form: &BookForm,
        cover: Option<FilePayload>,
        file: Option<FilePayload>,
    ) -> ApiResult<Book> {
        let parts = book_parts(form, cover, file)?;
        self.upload(HttpMethod::Post, "/books".to_string(), parts)
            .await
    }

    pub async fn update_book(
        &self,
        id: BookId,
        form: &BookForm,
        cover: Option<FilePayload>,
        file: Option<FilePayload>,
    ) -> ApiResult<Book> {
        let parts = book_parts(form, cover, file)?;
        self.upload(HttpMethod::Put, format!("/books/{}", id), parts)
            .await
    }

    pub async fn delete_book(&self, id: BookId) -> ApiResult<()> {
        self.call(&DeleteBookRequest { id }).await
    }

    // =========================================================
    // Products (multipart: `product` JSON part + `image`)
    // =========================================================

    pub async fn list_products(&self) -> ApiResult<Vec<Product>> {
        self.call(&ListProductsRequest).await
    }

    pub async fn get_product(&self, id: ProductId) -> ApiResult<Product> {
        self.call(&GetProductRequest { id }).await
    }

    pub async fn create_product(
        &self,
        form: &ProductForm,
        image: Option<FilePayload>,
    ) -> ApiResult<Product> {
        let parts = product_parts(form, image)?;
        self.upload(HttpMethod::Post, "/products".to_string(), parts)
            .await
    }

    pub async fn update_product(
        &self,
        id: ProductId,
        form: &ProductForm,
        image: Option<FilePayload>,
    ) -> ApiResult<Product> {
        let parts = product_parts(form, image)?;
        self.upload(HttpMethod::Put, format!("/products/{}", id), parts)
            .await
    }

    pub async fn delete_product(&self, id: ProductId) -> ApiResult<()> {
        self.call(&DeleteProductRequest { id }).await
    }

    // =========================================================
    // Events
    // =========================================================

    pub async fn list_events(&self) -> ApiResult<Vec<Event>> {
        self.call(&ListEventsRequest).await
    }

    pub async fn get_event(&self, id: EventId) -> ApiResult<Event> {
        self.call(&GetEventRequest { id }).await
    }

    pub async fn create_event(&self, form: &EventForm) -> ApiResult<Event> {
        self.call(form).await
    }

    pub async fn update_event(&self, id: EventId, form: EventForm) -> ApiResult<Event> {
        self.call(&UpdateEventRequest { id, form }).await
    }

    pub async fn delete_event(&self, id: EventId) -> ApiResult<()> {
        self.call(&DeleteEventRequest { id }).await
    }

    // =========================================================
    // Slider
    // =========================================================

    pub async fn slider_books(&self) -> ApiResult<Vec<SliderBook>> {
        self.call(&SliderBooksRequest).await
    }

    pub async fn admin_slider_books(&self) -> ApiResult<Vec<SliderBook>> {
        self.call(&AdminSliderBooksRequest).await
    }

    pub async fn add_slider_book(&self, book_id: BookId) -> ApiResult<()> {
        self.call(&AddSliderBookRequest { book_id }).await
    }

    pub async fn remove_slider_book(&self, book_id: BookId) -> ApiResult<()> {
        self.call(&RemoveSliderBookRequest { book_id }).await
    }

    // =========================================================
    // Users & Audit
    // =========================================================

    pub async fn list_users(&self) -> ApiResult<Vec<User>> {
        self.call(&ListUsersRequest).await
    }

    pub async fn update_user_role(&self, id: UserId, role: Role) -> ApiResult<User> {
        self.call(&UpdateUserRoleRequest { id, role }).await
    }

    pub async fn delete_user(&self, id: UserId) -> ApiResult<()> {
        self.call(&DeleteUserRequest { id }).await
    }

    pub async fn audit_log(&self) -> ApiResult<Vec<AuditEntry>> {
        self.call(&AuditLogRequest).await
    }
}

/// 检查状态码并解析响应体
fn decode<U: DeserializeOwned>(method: HttpMethod, path: &str, response: HttpResponse) -> ApiResult<U> {
    if !response.is_success() {
        let err = ApiError::from_response(response.status, &response.body);
        match response.status {
            401 => log_warn!("[api] {} {}: unauthenticated", method.as_str(), path),
            403 => log_warn!("[api] {} {}: forbidden", method.as_str(), path),
            _ => log_error!("[api] {} {} failed: {}", method.as_str(), path, err),
        }
        return Err(err.in_op_with("api.status", path.to_string()));
    }
    response
        .json()
        .map_err(|e| e.in_op_with("api.decode", path.to_string()))
}

fn book_parts(
    form: &BookForm,
    cover: Option<FilePayload>,
    file: Option<FilePayload>,
) -> ApiResult<Vec<MultipartPart>> {
    let mut parts = vec![MultipartPart::json("book", serde_json::to_string(form)?)];
    if let Some(cover) = cover {
        parts.push(MultipartPart::file("cover", cover));
    }
    if let Some(file) = file {
        parts.push(MultipartPart::file("file", file));
    }
    Ok(parts)
}

fn product_parts(form: &ProductForm, image: Option<FilePayload>) -> ApiResult<Vec<MultipartPart>> {
    let mut parts = vec![MultipartPart::json("product", serde_json::to_string(form)?)];
    if let Some(image) = image {
        parts.push(MultipartPart::file("image", image));
    }
    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transport::{MockTransport, PartContent, RequestBody};
    use crate::error::ApiErrorKind;
    use serde_json::json;

    fn client() -> ApiClient<MockTransport> {
        ApiClient::new(MockTransport::new())
    }

    #[tokio::test]
    async fn login_posts_credentials_and_parses_response() {
        let api = client();
        api.transport().mock(
            HttpMethod::Post,
            "/auth/login",
            200,
            json!({"userId": 12, "role": "ADMIN"}),
        );

        let auth = api.login(" admin@club.ru ", "pw").await.unwrap();
        assert_eq!(auth.user_id, 12);
        assert_eq!(auth.role, Role::Admin);

        let requests = api.transport().requests.borrow();
        assert_eq!(
            requests[0].body,
            RequestBody::Json(r#"{"email":"admin@club.ru","password":"pw"}"#.to_string())
        );
    }

    #[tokio::test]
    async fn empty_success_body_reads_as_unit() {
        let api = client();
        api.transport()
            .mock(HttpMethod::Delete, "/books/4", 204, serde_json::Value::Null);
        api.delete_book(4).await.unwrap();
    }

    #[tokio::test]
    async fn unauthorized_response_becomes_unauthenticated_error() {
        let api = client();
        api.transport().mock(
            HttpMethod::Get,
            "/users/profile",
            401,
            json!({"message": "Token expired"}),
        );

        let err = api.fetch_profile().await.unwrap_err();
        assert!(err.is_unauthenticated());
        assert_eq!(err.server_message.as_deref(), Some("Token expired"));
        assert_eq!(err.spans()[0].operation, "api.status");
    }

    #[tokio::test]
    async fn malformed_body_is_a_serialization_error() {
        let api = client();
        api.transport()
            .mock(HttpMethod::Get, "/books", 200, json!({"not": "a list"}));
        let err = api.list_books().await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Serialization);
    }

    #[tokio::test]
    async fn create_book_sends_json_part_and_files() {
        let api = client();
        api.transport().mock(
            HttpMethod::Post,
            "/books",
            201,
            json!({"id": 1, "title": "Дюна", "author": "Герберт", "price": 700.0}),
        );

        let form = BookForm {
            title: "Дюна".into(),
            author: "Герберт".into(),
            price: 700.0,
            ..Default::default()
        };
        let cover = FilePayload {
            file_name: "dune.png".into(),
            mime_type: "image/png".into(),
            bytes: vec![1, 2, 3],
        };
        let book = api.create_book(&form, Some(cover.clone()), None).await.unwrap();
        assert_eq!(book.id, 1);

        let requests = api.transport().requests.borrow();
        let RequestBody::Multipart(parts) = &requests[0].body else {
            panic!("expected multipart body");
        };
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].name, "book");
        assert!(matches!(&parts[0].content, PartContent::Json(j) if j.contains("\"title\":\"Дюна\"")));
        assert_eq!(parts[1], MultipartPart::file("cover", cover));
    }

    #[tokio::test]
    async fn blank_application_comment_is_dropped() {
        let api = client();
        api.transport().mock(
            HttpMethod::Post,
            "/event-applications/events/3",
            200,
            json!({
                "id": 8, "eventId": 3, "userId": 1, "status": "PENDING",
                "createdAt": "2024-05-01T10:00:00"
            }),
        );
        api.apply_to_event(3, Some("   ".into())).await.unwrap();

        let requests = api.transport().requests.borrow();
        assert_eq!(
            requests[0].body,
            RequestBody::Json(r#"{"comment":null}"#.to_string())
        );
    }
}
