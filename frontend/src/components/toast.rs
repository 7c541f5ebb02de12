//! 全局通知 (toast)
//!
//! 每条通知在 `TOAST_DURATION` 后自动消失，也可以手动关闭。

use gloo_timers::callback::Timeout;
use leptos::prelude::*;

use crate::components::icons::XIcon;
use crate::config::TOAST_DURATION;
use crate::error::ApiError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

impl ToastKind {
    fn alert_class(self) -> &'static str {
        match self {
            ToastKind::Success => "alert alert-success shadow-lg",
            ToastKind::Error => "alert alert-error shadow-lg",
            ToastKind::Info => "alert alert-info shadow-lg",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    id: u64,
    kind: ToastKind,
    message: String,
}

#[derive(Clone, Copy)]
pub struct ToastContext {
    toasts: RwSignal<Vec<Toast>>,
    next_id: StoredValue<u64>,
}

impl ToastContext {
    pub fn new() -> Self {
        Self {
            toasts: RwSignal::new(Vec::new()),
            next_id: StoredValue::new(0),
        }
    }

    pub fn push(&self, kind: ToastKind, message: impl Into<String>) {
        let mut id = 0;
        self.next_id.update_value(|n| {
            *n += 1;
            id = *n;
        });
        self.toasts.update(|list| {
            list.push(Toast {
                id,
                kind,
                message: message.into(),
            })
        });

        let ctx = *self;
        Timeout::new(TOAST_DURATION.as_millis() as u32, move || ctx.dismiss(id)).forget();
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(ToastKind::Success, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(ToastKind::Info, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(ToastKind::Error, message);
    }

    /// 记录完整错误，向用户展示后端信息或 `fallback`
    pub fn api_error(&self, err: &ApiError, fallback: &str) {
        log_error!("{}", err);
        self.error(err.user_message(fallback));
    }

    pub fn dismiss(&self, id: u64) {
        // 信号可能已随页面一起销毁
        let _ = self.toasts.try_update(|list| list.retain(|t| t.id != id));
    }
}

impl Default for ToastContext {
    fn default() -> Self {
        Self::new()
    }
}

pub fn use_toast() -> ToastContext {
    use_context::<ToastContext>().expect("ToastContext should be provided")
}

/// 通知容器，放在布局根部
#[component]
pub fn ToastHost() -> impl IntoView {
    let ctx = use_toast();

    view! {
        <div class="toast toast-top toast-end z-50">
            <For
                each=move || ctx.toasts.get()
                key=|t| t.id
                children=move |toast| {
                    let id = toast.id;
                    view! {
                        <div role="alert" class=toast.kind.alert_class()>
                            <span>{toast.message}</span>
                            <button class="btn btn-ghost btn-xs btn-circle" on:click=move |_| ctx.dismiss(id)>
                                <XIcon attr:class="h-3 w-3" />
                            </button>
                        </div>
                    }
                }
            />
        </div>
    }
}
