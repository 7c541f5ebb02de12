//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API，所有对 window.history 的操作都集中在此模块。
//! 导航流程: 解析 -> 守卫 (`AppRoute::guard`) -> 写入 History -> 更新信号。

use leptos::prelude::*;
use wasm_bindgen::prelude::*;

use super::route::{Access, AppRoute};

/// 获取当前浏览器路径
fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

fn write_history(path: &str, push: bool) {
    let Some(history) = web_sys::window().and_then(|w| w.history().ok()) else {
        return;
    };
    let result = if push {
        history.push_state_with_url(&JsValue::NULL, "", Some(path))
    } else {
        history.replace_state_with_url(&JsValue::NULL, "", Some(path))
    };
    if let Err(e) = result {
        log_warn!("[router] history update failed for {}: {:?}", path, e);
    }
}

fn scroll_to_top() {
    if let Some(window) = web_sys::window() {
        window.scroll_to_with_x_and_y(0.0, 0.0);
    }
}

/// 路由器服务
///
/// 通过注入的 `access` 信号与认证系统解耦。
#[derive(Clone, Copy)]
pub struct RouterService {
    current_route: ReadSignal<AppRoute>,
    set_route: WriteSignal<AppRoute>,
    access: Signal<Access>,
}

impl RouterService {
    fn new(access: Signal<Access>) -> Self {
        let (current_route, set_route) = signal(AppRoute::from_path(&current_path()));
        Self {
            current_route,
            set_route,
            access,
        }
    }

    pub fn current_route(&self) -> ReadSignal<AppRoute> {
        self.current_route
    }

    /// 导航到 URL path
    pub fn navigate(&self, path: &str) {
        self.navigate_to(AppRoute::from_path(path));
    }

    pub fn navigate_to(&self, target: AppRoute) {
        self.apply(target, true);
        scroll_to_top();
    }

    /// 执行守卫并写入 History；守卫的重定向总是使用 replaceState
    fn apply(&self, target: AppRoute, push: bool) {
        match target.guard(self.access.get_untracked()) {
            Some(redirect) => {
                log_info!("[router] {} -> redirect {}", target, redirect);
                write_history(&redirect.to_path(), false);
                self.set_route.set(redirect);
            }
            None => {
                write_history(&target.to_path(), push);
                self.set_route.set(target);
            }
        }
    }

    /// 初始化浏览器后退/前进按钮监听
    fn init_popstate_listener(&self) {
        let router = *self;
        let closure = Closure::<dyn Fn()>::new(move || {
            router.apply(AppRoute::from_path(&current_path()), false);
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 监听器与页面同生命周期
        closure.forget();
    }

    /// 访问状态变化 (登录、登出、会话恢复完成) 时重新执行守卫
    fn setup_access_redirect(&self) {
        let router = *self;
        Effect::new(move |_| {
            let access = router.access.get();
            let route = router.current_route.get_untracked();
            if let Some(redirect) = route.guard(access) {
                log_info!("[router] access changed, {} -> {}", route, redirect);
                write_history(&redirect.to_path(), false);
                router.set_route.set(redirect);
            }
        });
    }
}

fn provide_router(access: Signal<Access>) -> RouterService {
    let router = RouterService::new(access);
    router.init_popstate_listener();
    router.setup_access_redirect();
    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

/// 导航函数（返回一个可调用的闭包）
pub fn use_navigate() -> impl Fn(AppRoute) + Clone + Send + Sync + 'static {
    let router = use_router();
    move |to: AppRoute| router.navigate_to(to)
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件
#[component]
pub fn Router(
    /// 访问状态信号
    access: Signal<Access>,
    children: Children,
) -> impl IntoView {
    provide_router(access);
    children()
}

/// 路由出口组件
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(AppRoute) -> AnyView,
) -> impl IntoView {
    let router = use_router();
    move || matcher(router.current_route().get())
}

/// 站内链接：拦截点击并通过 History API 导航
#[component]
pub fn Link(
    to: AppRoute,
    #[prop(optional)] class: &'static str,
    children: Children,
) -> impl IntoView {
    let router = use_router();
    let href = to.to_path();

    let on_click = move |ev: web_sys::MouseEvent| {
        // 保留 Ctrl/Cmd 点击在新标签页打开的行为
        if ev.ctrl_key() || ev.meta_key() || ev.shift_key() {
            return;
        }
        ev.prevent_default();
        router.navigate_to(to.clone());
    };

    view! {
        <a href=href class=class on:click=on_click>
            {children()}
        </a>
    }
}
