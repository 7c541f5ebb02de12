use crate::{
    ApplicationId, AuditEntry, AuthResponse, Book, BookId, Cart, Event, EventApplication, EventForm,
    EventId, Order, OrderId, OrderStatus, Product, ProductId, Role, SliderBook, User, UserId,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
///
/// Paths are relative to [`crate::API_PREFIX`] and may embed ids, so they are
/// produced per request instead of being a constant.
pub trait ApiRequest {
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The HTTP method.
    const METHOD: HttpMethod;
    /// The URL path (relative to the API prefix).
    fn path(&self) -> String;
    /// JSON body, if the endpoint takes one.
    fn body(&self) -> serde_json::Result<Option<String>> {
        Ok(None)
    }
}

fn json_body<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Option<String>> {
    serde_json::to_string(value).map(Some)
}

/// Implements `ApiRequest` for a request whose whole value is the JSON body.
macro_rules! json_request {
    ($ty:ty => $resp:ty, $method:ident, $path:expr) => {
        impl ApiRequest for $ty {
            type Response = $resp;
            const METHOD: HttpMethod = HttpMethod::$method;
            fn path(&self) -> String {
                $path.to_string()
            }
            fn body(&self) -> serde_json::Result<Option<String>> {
                json_body(self)
            }
        }
    };
}

/// Implements `ApiRequest` for a bodiless request with a fixed path.
macro_rules! fixed_request {
    ($ty:ident => $resp:ty, $method:ident, $path:expr) => {
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $ty;

        impl ApiRequest for $ty {
            type Response = $resp;
            const METHOD: HttpMethod = HttpMethod::$method;
            fn path(&self) -> String {
                $path.to_string()
            }
        }
    };
}

// =========================================================
// Auth & Profile
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

json_request!(LoginRequest => AuthResponse, Post, "/auth/login");

fixed_request!(LogoutRequest => (), Post, "/auth/logout");

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Option<NaiveDate>,
}

json_request!(RegisterRequest => User, Post, "/auth/register");

fixed_request!(GetProfileRequest => User, Get, "/users/profile");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: String,
    pub last_name: String,
    pub address: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub avatar_url: Option<String>,
}

impl From<&User> for UpdateProfileRequest {
    fn from(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            address: user.address.clone(),
            birth_date: user.birth_date,
            avatar_url: user.avatar_url.clone(),
        }
    }
}

json_request!(UpdateProfileRequest => User, Put, "/users/profile");

// =========================================================
// Cart
// =========================================================

#[derive(Debug, Clone, Copy)]
pub struct GetCartRequest {
    pub user_id: UserId,
}

impl ApiRequest for GetCartRequest {
    type Response = Cart;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!("/carts/{}", self.user_id)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AddCartItemRequest {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: u32,
}

impl ApiRequest for AddCartItemRequest {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        format!(
            "/carts/{}/products/{}?quantity={}",
            self.user_id, self.product_id, self.quantity
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RemoveCartItemRequest {
    pub user_id: UserId,
    pub product_id: ProductId,
}

impl ApiRequest for RemoveCartItemRequest {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Delete;
    fn path(&self) -> String {
        format!("/carts/{}/products/{}", self.user_id, self.product_id)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ClearCartRequest {
    pub user_id: UserId,
}

impl ApiRequest for ClearCartRequest {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Delete;
    fn path(&self) -> String {
        format!("/carts/{}", self.user_id)
    }
}

// =========================================================
// Orders
// =========================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

json_request!(CreateOrderRequest => Order, Post, "/orders/create");

fixed_request!(MyOrdersRequest => Vec<Order>, Get, "/orders/my");
fixed_request!(AllOrdersRequest => Vec<Order>, Get, "/orders");

#[derive(Debug, Clone, Copy)]
pub struct UpdateOrderStatusRequest {
    pub id: OrderId,
    pub status: OrderStatus,
}

#[derive(Serialize)]
struct StatusBody {
    status: OrderStatus,
}

impl ApiRequest for UpdateOrderStatusRequest {
    type Response = Order;
    const METHOD: HttpMethod = HttpMethod::Put;
    fn path(&self) -> String {
        format!("/orders/{}/status", self.id)
    }
    fn body(&self) -> serde_json::Result<Option<String>> {
        json_body(&StatusBody {
            status: self.status,
        })
    }
}

// =========================================================
// Event applications
// =========================================================

#[derive(Debug, Clone)]
pub struct ApplyToEventRequest {
    pub event_id: EventId,
    pub comment: Option<String>,
}

#[derive(Serialize)]
struct CommentBody<'a> {
    comment: Option<&'a str>,
}

impl ApiRequest for ApplyToEventRequest {
    type Response = EventApplication;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        format!("/event-applications/events/{}", self.event_id)
    }
    fn body(&self) -> serde_json::Result<Option<String>> {
        json_body(&CommentBody {
            comment: self.comment.as_deref(),
        })
    }
}

fixed_request!(MyApplicationsRequest => Vec<EventApplication>, Get, "/event-applications/my");

#[derive(Debug, Clone, Copy)]
pub struct EventApplicationsRequest {
    pub event_id: EventId,
}

impl ApiRequest for EventApplicationsRequest {
    type Response = Vec<EventApplication>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!("/event-applications/events/{}", self.event_id)
    }
}

/// Review action on a single application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationAction {
    Cancel,
    Approve,
    Reject,
}

impl ApplicationAction {
    fn segment(&self) -> &'static str {
        match self {
            ApplicationAction::Cancel => "cancel",
            ApplicationAction::Approve => "approve",
            ApplicationAction::Reject => "reject",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ApplicationActionRequest {
    pub id: ApplicationId,
    pub action: ApplicationAction,
}

impl ApiRequest for ApplicationActionRequest {
    type Response = EventApplication;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        format!("/event-applications/{}/{}", self.id, self.action.segment())
    }
}

// =========================================================
// Catalog (JSON parts; multipart uploads are assembled by the client)
// =========================================================

fixed_request!(ListBooksRequest => Vec<Book>, Get, "/books");
fixed_request!(ListProductsRequest => Vec<Product>, Get, "/products");
fixed_request!(ListEventsRequest => Vec<Event>, Get, "/events");

/// GET or DELETE of a single resource identified by `collection/{id}`.
macro_rules! item_request {
    ($ty:ident => $resp:ty, $method:ident, $collection:expr) => {
        #[derive(Debug, Clone, Copy)]
        pub struct $ty {
            pub id: i64,
        }

        impl ApiRequest for $ty {
            type Response = $resp;
            const METHOD: HttpMethod = HttpMethod::$method;
            fn path(&self) -> String {
                format!("{}/{}", $collection, self.id)
            }
        }
    };
}

item_request!(GetBookRequest => Book, Get, "/books");
item_request!(DeleteBookRequest => (), Delete, "/books");
item_request!(GetProductRequest => Product, Get, "/products");
item_request!(DeleteProductRequest => (), Delete, "/products");
item_request!(GetEventRequest => Event, Get, "/events");
item_request!(DeleteEventRequest => (), Delete, "/events");
item_request!(DeleteUserRequest => (), Delete, "/users");

json_request!(EventForm => Event, Post, "/events");

#[derive(Debug, Clone)]
pub struct UpdateEventRequest {
    pub id: EventId,
    pub form: EventForm,
}

impl ApiRequest for UpdateEventRequest {
    type Response = Event;
    const METHOD: HttpMethod = HttpMethod::Put;
    fn path(&self) -> String {
        format!("/events/{}", self.id)
    }
    fn body(&self) -> serde_json::Result<Option<String>> {
        json_body(&self.form)
    }
}

// =========================================================
// Slider
// =========================================================

fixed_request!(SliderBooksRequest => Vec<SliderBook>, Get, "/slider/books");
fixed_request!(AdminSliderBooksRequest => Vec<SliderBook>, Get, "/slider/admin/books");

#[derive(Debug, Clone, Copy)]
pub struct AddSliderBookRequest {
    pub book_id: BookId,
}

impl ApiRequest for AddSliderBookRequest {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        format!("/slider/admin/books/{}", self.book_id)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RemoveSliderBookRequest {
    pub book_id: BookId,
}

impl ApiRequest for RemoveSliderBookRequest {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Delete;
    fn path(&self) -> String {
        format!("/slider/admin/books/{}", self.book_id)
    }
}

// =========================================================
// Users & Audit
// =========================================================

fixed_request!(ListUsersRequest => Vec<User>, Get, "/users");
fixed_request!(AuditLogRequest => Vec<AuditEntry>, Get, "/audit");

#[derive(Debug, Clone, Copy)]
pub struct UpdateUserRoleRequest {
    pub id: UserId,
    pub role: Role,
}

#[derive(Serialize)]
struct RoleBody {
    role: Role,
}

impl ApiRequest for UpdateUserRoleRequest {
    type Response = User;
    const METHOD: HttpMethod = HttpMethod::Put;
    fn path(&self) -> String {
        format!("/users/{}/role", self.id)
    }
    fn body(&self) -> serde_json::Result<Option<String>> {
        json_body(&RoleBody { role: self.role })
    }
}

/// Error body the backend sends with non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.message
            .or(self.error)
            .filter(|m| !m.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cart_paths_embed_ids() {
        let add = AddCartItemRequest {
            user_id: 3,
            product_id: 42,
            quantity: 2,
        };
        assert_eq!(add.path(), "/carts/3/products/42?quantity=2");
        assert_eq!(AddCartItemRequest::METHOD, HttpMethod::Post);

        let remove = RemoveCartItemRequest {
            user_id: 3,
            product_id: 42,
        };
        assert_eq!(remove.path(), "/carts/3/products/42");
        assert_eq!(remove.body().unwrap(), None);
    }

    #[test]
    fn login_serializes_itself_as_body() {
        let req = LoginRequest {
            email: "a@b.c".into(),
            password: "secret".into(),
        };
        let body = req.body().unwrap().unwrap();
        assert_eq!(body, r#"{"email":"a@b.c","password":"secret"}"#);
    }

    #[test]
    fn order_status_update_sends_status_code() {
        let req = UpdateOrderStatusRequest {
            id: 9,
            status: OrderStatus::Shipped,
        };
        assert_eq!(req.path(), "/orders/9/status");
        assert_eq!(req.body().unwrap().unwrap(), r#"{"status":"SHIPPED"}"#);
    }

    #[test]
    fn application_actions_map_to_segments() {
        let req = ApplicationActionRequest {
            id: 5,
            action: ApplicationAction::Approve,
        };
        assert_eq!(req.path(), "/event-applications/5/approve");
    }

    #[test]
    fn error_body_prefers_message_over_error() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"message":"Нет на складе","error":"Bad Request"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Нет на складе"));

        let blank: ErrorBody = serde_json::from_str(r#"{"message":"  "}"#).unwrap();
        assert_eq!(blank.into_message(), None);
    }
}
