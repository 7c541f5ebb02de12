use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod date;
pub mod protocol;

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const API_PREFIX: &str = "/api/rest";
pub const AUTH_COOKIE: &str = "authToken";

pub const STORAGE_ROLE_KEY: &str = "userRole";
pub const STORAGE_USER_ID_KEY: &str = "userId";
pub const STORAGE_CART_PREFIX: &str = "cartItems_";
pub const STORAGE_CART_GUEST: &str = "guest";

pub type UserId = i64;
pub type BookId = i64;
pub type ProductId = i64;
pub type OrderId = i64;
pub type EventId = i64;
pub type ApplicationId = i64;

// =========================================================
// 用户与角色 (Users & Roles)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Organizer,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::User, Role::Organizer, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Organizer => "ORGANIZER",
            Role::Admin => "ADMIN",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "Пользователь",
            Role::Organizer => "Организатор",
            Role::Admin => "Администратор",
        }
    }

    /// Organizers and admins can manage events and review applications.
    pub fn can_manage_events(&self) -> bool {
        matches!(self, Role::Organizer | Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {}", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // 兼容 Spring Security 风格的 "ROLE_ADMIN"
        let s = s.trim();
        let s = s.strip_prefix("ROLE_").unwrap_or(s);
        match s.to_ascii_uppercase().as_str() {
            "USER" => Ok(Role::User),
            "ORGANIZER" => Ok(Role::Organizer),
            "ADMIN" => Ok(Role::Admin),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub role: Role,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            name.to_string()
        }
    }
}

/// Returned by `/auth/login`; the session token itself travels as a cookie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user_id: UserId,
    pub role: Role,
    #[serde(default)]
    pub email: Option<String>,
}

// =========================================================
// 目录 (Catalog)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub stock: i32,
}

/// Payload of the `book` JSON part in multipart create/update requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookForm {
    pub title: String,
    pub author: String,
    pub description: String,
    pub price: f64,
    pub genres: Vec<String>,
    pub stock: i32,
}

impl From<&Book> for BookForm {
    fn from(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            description: book.description.clone(),
            price: book.price,
            genres: book.genres.clone(),
            stock: book.stock,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub stock: i32,
}

/// Payload of the `product` JSON part in multipart create/update requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub stock: i32,
}

impl From<&Product> for ProductForm {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            category: product.category.clone(),
            stock: product.stock,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliderBook {
    pub id: i64,
    pub book_id: BookId,
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub position: i32,
}

// =========================================================
// 购物车与订单 (Cart & Orders)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub title: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub price: f64,
    pub quantity: u32,
}

impl CartItem {
    pub fn subtotal(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// Statuses an admin may assign.
    pub const ASSIGNABLE: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Ожидает обработки",
            OrderStatus::Processing => "В обработке",
            OrderStatus::Shipped => "Отправлен",
            OrderStatus::Delivered => "Доставлен",
            OrderStatus::Cancelled => "Отменён",
            OrderStatus::Unknown => "Неизвестно",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Unknown => "UNKNOWN",
        }
    }

    /// daisyUI badge class for the status.
    pub fn badge_class(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "badge badge-warning",
            OrderStatus::Processing => "badge badge-info",
            OrderStatus::Shipped => "badge badge-primary",
            OrderStatus::Delivered => "badge badge-success",
            OrderStatus::Cancelled => "badge badge-error",
            OrderStatus::Unknown => "badge badge-ghost",
        }
    }

    pub fn from_code(code: &str) -> Self {
        Self::ASSIGNABLE
            .into_iter()
            .find(|s| s.as_str() == code)
            .unwrap_or(OrderStatus::Unknown)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub title: String,
    pub price: f64,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub total_price: f64,
    pub status: OrderStatus,
    #[serde(default)]
    pub address: String,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub user_email: Option<String>,
}

// =========================================================
// 活动与报名 (Events & Applications)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub starts_at: NaiveDateTime,
    #[serde(default)]
    pub capacity: u32,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub organizer_id: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventForm {
    pub title: String,
    pub description: String,
    pub location: String,
    pub starts_at: NaiveDateTime,
    pub capacity: u32,
    pub image_url: Option<String>,
}

impl From<&Event> for EventForm {
    fn from(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            description: event.description.clone(),
            location: event.location.clone(),
            starts_at: event.starts_at,
            capacity: event.capacity,
            image_url: event.image_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl ApplicationStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "На рассмотрении",
            ApplicationStatus::Approved => "Одобрена",
            ApplicationStatus::Rejected => "Отклонена",
            ApplicationStatus::Cancelled => "Отменена",
            ApplicationStatus::Unknown => "Неизвестно",
        }
    }

    pub fn badge_class(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "badge badge-warning",
            ApplicationStatus::Approved => "badge badge-success",
            ApplicationStatus::Rejected => "badge badge-error",
            ApplicationStatus::Cancelled | ApplicationStatus::Unknown => "badge badge-ghost",
        }
    }

    /// Only pending applications can still be cancelled, approved or rejected.
    pub fn is_open(&self) -> bool {
        matches!(self, ApplicationStatus::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventApplication {
    pub id: ApplicationId,
    pub event_id: EventId,
    #[serde(default)]
    pub event_title: String,
    pub user_id: UserId,
    #[serde(default)]
    pub user_name: String,
    pub status: ApplicationStatus,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub comment: Option<String>,
}

// =========================================================
// 审计日志 (Audit)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: i64,
    pub actor: String,
    pub action: String,
    pub entity: String,
    #[serde(default)]
    pub entity_id: Option<i64>,
    pub timestamp: NaiveDateTime,
    #[serde(default)]
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_plain_and_prefixed_names() {
        assert_eq!("ADMIN".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("ROLE_ORGANIZER".parse::<Role>(), Ok(Role::Organizer));
        assert_eq!("user".parse::<Role>(), Ok(Role::User));
        assert!("null".parse::<Role>().is_err());
    }

    #[test]
    fn unknown_order_status_does_not_fail_payload() {
        let json = r#"{
            "id": 7,
            "totalPrice": 1200.0,
            "status": "RETURNED",
            "createdAt": "2024-03-01T12:30:00"
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.status, OrderStatus::Unknown);
        assert!(order.items.is_empty());
        assert_eq!(order.status.label(), "Неизвестно");
    }

    #[test]
    fn cart_item_subtotal() {
        let item = CartItem {
            product_id: 1,
            title: "Мастер и Маргарита".into(),
            image_url: None,
            price: 500.0,
            quantity: 2,
        };
        assert_eq!(item.subtotal(), 1000.0);
    }

    #[test]
    fn full_name_falls_back_to_email() {
        let user: User = serde_json::from_str(
            r#"{"id": 1, "email": "reader@club.ru", "role": "USER"}"#,
        )
        .unwrap();
        assert_eq!(user.full_name(), "reader@club.ru");
        assert_eq!(user.birth_date, None);
    }

    #[test]
    fn order_status_round_trips_through_code() {
        for status in OrderStatus::ASSIGNABLE {
            assert_eq!(OrderStatus::from_code(status.as_str()), status);
        }
        assert_eq!(OrderStatus::from_code("LOST"), OrderStatus::Unknown);
    }
}
