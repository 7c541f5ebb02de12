//! 读书俱乐部前端应用
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `web::route`: 路由定义（领域模型）
//! - `web::router`: 路由服务（核心引擎）
//! - `api`: 后端 REST 接口
//! - `store`: 与浏览器无关的会话 / 购物车逻辑
//! - `auth` / `cart`: 全局响应式状态
//! - `components`: UI 组件层

#[macro_use]
mod log;

mod api;
mod auth;
mod cart;
mod config;
mod error;
mod store;
mod table;

mod components {
    pub mod admin;
    pub mod book_detail;
    pub mod cart_page;
    pub mod catalog;
    pub mod events;
    pub mod file_drop;
    pub mod home;
    pub mod icons;
    pub mod layout;
    pub mod login;
    pub mod modal;
    pub mod profile;
    pub mod register;
    pub mod shop;
    pub mod table_ui;
    pub mod toast;
}

use crate::auth::{AuthContext, init_auth};
use crate::cart::CartContext;
use crate::components::admin::AdminPage;
use crate::components::book_detail::BookDetailPage;
use crate::components::cart_page::CartPage;
use crate::components::catalog::CatalogPage;
use crate::components::events::EventsPage;
use crate::components::home::HomePage;
use crate::components::layout::{Layout, NotFoundPage, Spinner};
use crate::components::login::LoginPage;
use crate::components::profile::ProfilePage;
use crate::components::register::RegisterPage;
use crate::components::shop::ShopPage;
use crate::components::toast::ToastContext;
use crate::store::CartOwner;

use leptos::prelude::*;
use leptos::task::spawn_local;

// 浏览器 API 封装模块
// 其余模块只通过这里访问 window / document / storage，
// 因此 `store` 与 `api` 可以在原生目标上测试。
pub(crate) mod web {
    pub mod clock;
    pub mod cookie;
    pub mod files;
    mod http;
    pub mod route;
    pub mod router;
    mod storage;

    pub use http::FetchTransport;
    #[cfg(test)]
    pub use storage::MemoryStorage;
    pub use storage::{KeyValueStore, LocalStorage};
}

use web::route::AppRoute;
use web::router::{Router, RouterOutlet};

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的页面，所有页面共用 `Layout`。
fn route_matcher(route: AppRoute) -> AnyView {
    let page = match route {
        AppRoute::Home => view! { <HomePage /> }.into_any(),
        AppRoute::Catalog => view! { <CatalogPage /> }.into_any(),
        AppRoute::BookDetail(id) => view! { <BookDetailPage id=id /> }.into_any(),
        AppRoute::Shop => view! { <ShopPage /> }.into_any(),
        AppRoute::Events => view! { <EventsPage /> }.into_any(),
        AppRoute::Cart => view! { <CartPage /> }.into_any(),
        AppRoute::Profile => view! { <ProfilePage /> }.into_any(),
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Register => view! { <RegisterPage /> }.into_any(),
        AppRoute::Admin(Some(section)) => view! { <AdminPage section=section /> }.into_any(),
        // 守卫会重定向到默认分区；会话恢复期间先显示加载状态
        AppRoute::Admin(None) => view! { <Spinner /> }.into_any(),
        AppRoute::NotFound => view! { <NotFoundPage /> }.into_any(),
    };
    view! { <Layout>{page}</Layout> }.into_any()
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 创建全局上下文
    let auth_ctx = AuthContext::new();
    provide_context(auth_ctx);
    provide_context(ToastContext::new());
    let cart_ctx = CartContext::new(auth_ctx);
    provide_context(cart_ctx);

    // 2. 本地无会话时尝试用 Cookie 恢复
    init_auth(&auth_ctx);

    // 3. 登录 / 登出时切换购物车归属
    let session = auth_ctx.session_signal();
    let owner = Memo::new(move |_| session.get().cart_owner());
    Effect::new(move |_| match owner.get() {
        CartOwner::User(_) => spawn_local(async move {
            if let Err(e) = cart_ctx.reload().await {
                auth_ctx.handle_error(&e);
                log_warn!("[cart] initial load failed: {}", e);
            }
        }),
        CartOwner::Guest => cart_ctx.reset(CartOwner::Guest),
    });

    // 4. 注入访问信息实现守卫
    let access = auth_ctx.access_signal();

    view! {
        <Router access=access>
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
}
