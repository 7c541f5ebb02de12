//! 路由定义模块 - 领域模型
//!
//! 这是纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由、访问规则与守卫。

use bookclub_shared::{BookId, Role};
use std::fmt::Display;

/// 后台管理分区
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminSection {
    Books,
    Products,
    Users,
    Orders,
    Events,
    Slider,
    Audit,
}

impl AdminSection {
    pub const ALL: [AdminSection; 7] = [
        AdminSection::Books,
        AdminSection::Products,
        AdminSection::Users,
        AdminSection::Orders,
        AdminSection::Events,
        AdminSection::Slider,
        AdminSection::Audit,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            AdminSection::Books => "books",
            AdminSection::Products => "products",
            AdminSection::Users => "users",
            AdminSection::Orders => "orders",
            AdminSection::Events => "events",
            AdminSection::Slider => "slider",
            AdminSection::Audit => "audit",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            AdminSection::Books => "Книги",
            AdminSection::Products => "Товары",
            AdminSection::Users => "Пользователи",
            AdminSection::Orders => "Заказы",
            AdminSection::Events => "Мероприятия",
            AdminSection::Slider => "Слайдер",
            AdminSection::Audit => "Журнал действий",
        }
    }

    fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.slug() == slug)
    }

    /// 组织者只能管理活动，其余分区仅管理员可见
    pub fn allows(&self, role: Role) -> bool {
        match self {
            AdminSection::Events => role.can_manage_events(),
            _ => role == Role::Admin,
        }
    }

    /// 该角色进入 `/admin` 时的默认分区
    pub fn default_for(role: Role) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.allows(role))
    }
}

/// 路由守卫使用的访问状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Access {
    pub is_authenticated: bool,
    pub role: Option<Role>,
    /// 会话仍在从 Cookie 恢复中，此时不做重定向
    pub pending: bool,
}

/// 应用路由枚举
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppRoute {
    #[default]
    Home,
    Catalog,
    BookDetail(BookId),
    Shop,
    Events,
    Cart,
    Profile,
    Login,
    Register,
    /// `None` 表示 `/admin`，按角色选择默认分区
    Admin(Option<AdminSection>),
    NotFound,
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Self::Home,
            ["catalog"] => Self::Catalog,
            ["books", id] => id.parse().map(Self::BookDetail).unwrap_or(Self::NotFound),
            ["shop"] => Self::Shop,
            ["events"] => Self::Events,
            ["cart"] => Self::Cart,
            ["profile"] => Self::Profile,
            ["login"] => Self::Login,
            ["register"] => Self::Register,
            ["admin"] => Self::Admin(None),
            ["admin", slug] => AdminSection::from_slug(slug)
                .map(|s| Self::Admin(Some(s)))
                .unwrap_or(Self::NotFound),
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Catalog => "/catalog".to_string(),
            Self::BookDetail(id) => format!("/books/{}", id),
            Self::Shop => "/shop".to_string(),
            Self::Events => "/events".to_string(),
            Self::Cart => "/cart".to_string(),
            Self::Profile => "/profile".to_string(),
            Self::Login => "/login".to_string(),
            Self::Register => "/register".to_string(),
            Self::Admin(None) => "/admin".to_string(),
            Self::Admin(Some(section)) => format!("/admin/{}", section.slug()),
            Self::NotFound => "/404".to_string(),
        }
    }

    /// 定义该路由是否需要认证
    pub fn requires_auth(&self) -> bool {
        matches!(self, Self::Cart | Self::Profile | Self::Admin(_))
    }

    /// 定义已认证用户是否应该离开此路由（如登录页）
    pub fn should_redirect_when_authenticated(&self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }

    /// 获取认证失败时的重定向目标
    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }

    /// 获取认证成功时的重定向目标（从登录页）
    pub fn auth_success_redirect() -> Self {
        Self::Home
    }

    /// **核心守卫逻辑**
    ///
    /// 返回 `Some(target)` 表示需要重定向到 `target`，`None` 表示放行。
    pub fn guard(&self, access: Access) -> Option<AppRoute> {
        if access.pending {
            return None;
        }

        if self.requires_auth() && !access.is_authenticated {
            return Some(Self::auth_failure_redirect());
        }

        if self.should_redirect_when_authenticated() && access.is_authenticated {
            return Some(Self::auth_success_redirect());
        }

        if let Self::Admin(section) = self {
            let Some(role) = access.role else {
                return Some(Self::Home);
            };
            return match section {
                Some(s) if s.allows(role) => None,
                Some(_) => Some(Self::Home),
                None => Some(
                    AdminSection::default_for(role)
                        .map(|s| Self::Admin(Some(s)))
                        .unwrap_or(Self::Home),
                ),
            };
        }

        None
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_in(role: Role) -> Access {
        Access {
            is_authenticated: true,
            role: Some(role),
            pending: false,
        }
    }

    #[test]
    fn parses_paths_and_ignores_query_and_trailing_slash() {
        assert_eq!(AppRoute::from_path("/"), AppRoute::Home);
        assert_eq!(AppRoute::from_path("/catalog/"), AppRoute::Catalog);
        assert_eq!(AppRoute::from_path("/books/15?tab=reviews"), AppRoute::BookDetail(15));
        assert_eq!(AppRoute::from_path("/books/abc"), AppRoute::NotFound);
        assert_eq!(
            AppRoute::from_path("/admin/slider"),
            AppRoute::Admin(Some(AdminSection::Slider))
        );
        assert_eq!(AppRoute::from_path("/admin/unknown"), AppRoute::NotFound);
    }

    #[test]
    fn paths_round_trip() {
        let routes = [
            AppRoute::Home,
            AppRoute::Catalog,
            AppRoute::BookDetail(3),
            AppRoute::Shop,
            AppRoute::Events,
            AppRoute::Cart,
            AppRoute::Profile,
            AppRoute::Login,
            AppRoute::Register,
            AppRoute::Admin(None),
            AppRoute::Admin(Some(AdminSection::Audit)),
        ];
        for route in routes {
            assert_eq!(AppRoute::from_path(&route.to_path()), route);
        }
    }

    #[test]
    fn anonymous_users_are_sent_to_login() {
        let anon = Access::default();
        assert_eq!(AppRoute::Cart.guard(anon), Some(AppRoute::Login));
        assert_eq!(AppRoute::Admin(None).guard(anon), Some(AppRoute::Login));
        assert_eq!(AppRoute::Catalog.guard(anon), None);
    }

    #[test]
    fn pending_session_is_not_redirected() {
        let pending = Access {
            pending: true,
            ..Access::default()
        };
        assert_eq!(AppRoute::Profile.guard(pending), None);
    }

    #[test]
    fn signed_in_users_leave_login_page() {
        assert_eq!(
            AppRoute::Login.guard(signed_in(Role::User)),
            Some(AppRoute::Home)
        );
        assert_eq!(
            AppRoute::Register.guard(signed_in(Role::User)),
            Some(AppRoute::Home)
        );
    }

    #[test]
    fn admin_sections_follow_roles() {
        let books = AppRoute::Admin(Some(AdminSection::Books));
        let events = AppRoute::Admin(Some(AdminSection::Events));

        assert_eq!(books.guard(signed_in(Role::Admin)), None);
        assert_eq!(books.guard(signed_in(Role::Organizer)), Some(AppRoute::Home));
        assert_eq!(events.guard(signed_in(Role::Organizer)), None);
        assert_eq!(events.guard(signed_in(Role::User)), Some(AppRoute::Home));
    }

    #[test]
    fn bare_admin_path_redirects_to_first_allowed_section() {
        assert_eq!(
            AppRoute::Admin(None).guard(signed_in(Role::Admin)),
            Some(AppRoute::Admin(Some(AdminSection::Books)))
        );
        assert_eq!(
            AppRoute::Admin(None).guard(signed_in(Role::Organizer)),
            Some(AppRoute::Admin(Some(AdminSection::Events)))
        );
        assert_eq!(
            AppRoute::Admin(None).guard(signed_in(Role::User)),
            Some(AppRoute::Home)
        );
    }
}
