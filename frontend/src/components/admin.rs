//! 后台管理
//!
//! 每个分区是一个独立的管理页，共用 `table` 的搜索 / 排序 / 分页工具
//! 和 `forms` 中的表单状态。组织者只能看到"活动"分区。

mod audit;
mod books;
mod events;
mod forms;
mod orders;
mod products;
mod slider;
mod users;

use leptos::prelude::*;

use crate::auth::{AuthContext, use_auth};
use crate::components::icons::ShieldCheck;
use crate::components::toast::{ToastContext, use_toast};
use crate::error::ApiError;
use crate::web::route::{AdminSection, AppRoute};
use crate::web::router::Link;

/// 管理页的操作反馈：会话过期时登出，并弹出提示
#[derive(Clone, Copy)]
struct Notifier {
    auth: AuthContext,
    toast: ToastContext,
}

impl Notifier {
    fn new() -> Self {
        Self {
            auth: use_auth(),
            toast: use_toast(),
        }
    }

    fn done(&self, message: &str) {
        self.toast.success(message);
    }

    fn failed(&self, err: &ApiError, fallback: &str) {
        self.auth.handle_error(err);
        self.toast.api_error(err, fallback);
    }

    fn invalid(&self, message: &str) {
        self.toast.error(message);
    }
}

/// 带标签的单行输入框
#[component]
fn TextField(
    #[prop(into)] label: String,
    value: RwSignal<String>,
    #[prop(optional)] kind: Option<&'static str>,
    #[prop(optional)] placeholder: Option<&'static str>,
) -> impl IntoView {
    view! {
        <label class="form-control w-full">
            <span class="label-text mb-1">{label}</span>
            <input
                type=kind.unwrap_or("text")
                class="input input-bordered w-full"
                placeholder=placeholder.unwrap_or_default()
                prop:value=move || value.get()
                on:input=move |ev| value.set(event_target_value(&ev))
            />
        </label>
    }
}

#[component]
fn TextArea(#[prop(into)] label: String, value: RwSignal<String>) -> impl IntoView {
    view! {
        <label class="form-control w-full">
            <span class="label-text mb-1">{label}</span>
            <textarea
                class="textarea textarea-bordered w-full"
                rows="4"
                prop:value=move || value.get()
                on:input=move |ev| value.set(event_target_value(&ev))
            ></textarea>
        </label>
    }
}

#[component]
pub fn AdminPage(section: AdminSection) -> impl IntoView {
    let auth = use_auth();
    let sections = move || {
        let role = auth.session().role;
        AdminSection::ALL
            .into_iter()
            .filter(|s| role.is_some_and(|r| s.allows(r)))
            .collect::<Vec<_>>()
    };

    let content = match section {
        AdminSection::Books => view! { <books::BooksManager /> }.into_any(),
        AdminSection::Products => view! { <products::ProductsManager /> }.into_any(),
        AdminSection::Users => view! { <users::UsersManager /> }.into_any(),
        AdminSection::Orders => view! { <orders::OrdersManager /> }.into_any(),
        AdminSection::Events => view! { <events::EventsManager /> }.into_any(),
        AdminSection::Slider => view! { <slider::SliderManager /> }.into_any(),
        AdminSection::Audit => view! { <audit::AuditLog /> }.into_any(),
    };

    view! {
        <div class="flex flex-col lg:flex-row gap-6">
            <aside class="lg:w-56 shrink-0">
                <div class="flex items-center gap-2 font-semibold mb-3 px-2">
                    <ShieldCheck attr:class="h-5 w-5 text-primary" />
                    "Администрирование"
                </div>
                <ul class="menu bg-base-100 rounded-box shadow">
                    {move || sections()
                        .into_iter()
                        .map(|s| {
                            let class = if s == section { "active" } else { "" };
                            view! {
                                <li>
                                    <Link to=AppRoute::Admin(Some(s)) class=class>{s.title()}</Link>
                                </li>
                            }
                        })
                        .collect_view()}
                </ul>
            </aside>
            <section class="flex-1 min-w-0">
                <h1 class="text-2xl font-bold mb-4">{section.title()}</h1>
                {content}
            </section>
        </div>
    }
}
