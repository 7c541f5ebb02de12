//! 认证模块
//!
//! 管理用户会话，与路由系统解耦。
//! 路由服务通过注入的 `Access` 信号来检查访问权限。

use bookclub_shared::{AUTH_COOKIE, AuthResponse, Role, UserId};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api;
use crate::error::{ApiError, ApiResult};
use crate::store::Session;
use crate::web::route::Access;
use crate::web::{LocalStorage, cookie};

/// 认证状态
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AuthState {
    pub session: Session,
    /// 正在用 Cookie 向后端恢复会话
    pub is_loading: bool,
}

/// 认证上下文
#[derive(Clone, Copy)]
pub struct AuthContext {
    pub state: RwSignal<AuthState>,
}

impl AuthContext {
    /// 创建认证上下文，并从 LocalStorage 恢复上次的会话
    pub fn new() -> Self {
        let session = Session::restore(&LocalStorage);
        Self {
            state: RwSignal::new(AuthState {
                session,
                is_loading: false,
            }),
        }
    }

    pub fn session(&self) -> Session {
        self.state.get().session
    }

    pub fn session_untracked(&self) -> Session {
        self.state.get_untracked().session
    }

    pub fn session_signal(&self) -> Signal<Session> {
        let state = self.state;
        Signal::derive(move || state.get().session)
    }

    /// 获取访问状态信号（用于路由服务注入）
    pub fn access_signal(&self) -> Signal<Access> {
        let state = self.state;
        Signal::derive(move || {
            let AuthState {
                session,
                is_loading,
            } = state.get();
            Access {
                is_authenticated: session.is_authorized,
                role: session.role,
                pending: is_loading,
            }
        })
    }

    pub fn set_authorized(&self, is_authorized: bool, role: Option<Role>, user_id: Option<UserId>) {
        self.state.update(|s| {
            s.session
                .set_authorized(&LocalStorage, is_authorized, role, user_id)
        });
    }

    /// 清除本地会话与 Cookie；页面跳转由路由服务的守卫完成
    pub fn logout(&self) {
        self.state.update(|s| {
            s.session.logout(&LocalStorage);
            s.is_loading = false;
        });
        cookie::remove(AUTH_COOKIE);
    }

    /// 会话过期时登出；返回错误是否已被处理
    pub fn handle_error(&self, err: &ApiError) -> bool {
        if err.is_unauthenticated() && self.session_untracked().is_authorized {
            log_warn!("[auth] session expired: {}", err);
            self.logout();
            return true;
        }
        false
    }
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::new()
    }
}

/// 从 Context 获取认证上下文
pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}

/// 初始化认证状态
///
/// 本地没有会话但浏览器仍持有 `authToken` Cookie 时，用个人资料接口恢复会话。
pub fn init_auth(ctx: &AuthContext) {
    if ctx.session_untracked().is_authorized || cookie::get(AUTH_COOKIE).is_none() {
        return;
    }

    let ctx = *ctx;
    ctx.state.update(|s| s.is_loading = true);
    spawn_local(async move {
        match api::client().fetch_profile().await {
            Ok(user) => {
                log_info!("[auth] session restored from cookie for user {}", user.id);
                ctx.set_authorized(true, Some(user.role), Some(user.id));
            }
            Err(e) if e.is_unauthenticated() => ctx.logout(),
            Err(e) => log_warn!("[auth] could not restore session: {}", e),
        }
        ctx.state.update(|s| s.is_loading = false);
    });
}

/// 登录：后端设置 Cookie，客户端记录角色与用户 ID
pub async fn login(ctx: &AuthContext, email: &str, password: &str) -> ApiResult<AuthResponse> {
    let auth = api::client().login(email, password).await?;
    ctx.set_authorized(true, Some(auth.role), Some(auth.user_id));
    log_info!("[auth] signed in as {} ({})", auth.user_id, auth.role);
    Ok(auth)
}

/// 注销：通知后端失效 Cookie，无论结果如何都清除本地会话
pub async fn sign_out(ctx: &AuthContext) {
    if let Err(e) = api::client().logout().await {
        log_warn!("[auth] logout request failed: {}", e);
    }
    ctx.logout();
}
