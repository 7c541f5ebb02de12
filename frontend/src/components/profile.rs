//! 个人中心：资料、订单与活动报名三个标签页

mod applications_tab;
mod orders_tab;
mod profile_tab;

use leptos::prelude::*;

use applications_tab::ApplicationsTab;
use orders_tab::OrdersTab;
use profile_tab::ProfileTab;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Profile,
    Orders,
    Applications,
}

impl Tab {
    const ALL: [Tab; 3] = [Tab::Profile, Tab::Orders, Tab::Applications];

    fn title(&self) -> &'static str {
        match self {
            Tab::Profile => "Профиль",
            Tab::Orders => "Мои заказы",
            Tab::Applications => "Мои заявки",
        }
    }
}

#[component]
pub fn ProfilePage() -> impl IntoView {
    let (tab, set_tab) = signal(Tab::Profile);

    view! {
        <h1 class="text-3xl font-bold mb-6">"Личный кабинет"</h1>
        <div role="tablist" class="tabs tabs-bordered mb-6">
            {Tab::ALL
                .into_iter()
                .map(|t| view! {
                    <a
                        role="tab"
                        class=move || if tab.get() == t { "tab tab-active" } else { "tab" }
                        on:click=move |_| set_tab.set(t)
                    >
                        {t.title()}
                    </a>
                })
                .collect_view()}
        </div>
        {move || match tab.get() {
            Tab::Profile => view! { <ProfileTab /> }.into_any(),
            Tab::Orders => view! { <OrdersTab /> }.into_any(),
            Tab::Applications => view! { <ApplicationsTab /> }.into_any(),
        }}
    }
}
