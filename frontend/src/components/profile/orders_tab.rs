use bookclub_shared::Order;
use bookclub_shared::date::{format_datetime, format_price};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api;
use crate::auth::use_auth;
use crate::components::layout::Spinner;
use crate::components::toast::use_toast;

#[component]
pub fn OrdersTab() -> impl IntoView {
    let auth = use_auth();
    let toast = use_toast();
    let (orders, set_orders) = signal(Vec::<Order>::new());
    let (loading, set_loading) = signal(true);

    spawn_local(async move {
        match api::client().my_orders().await {
            Ok(mut list) => {
                // 最新的在前
                list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                set_orders.set(list);
            }
            Err(e) => {
                auth.handle_error(&e);
                toast.api_error(&e, "Не удалось загрузить заказы");
            }
        }
        set_loading.set(false);
    });

    view! {
        <Show when=move || !loading.get() fallback=|| view! { <Spinner /> }>
            <Show
                when=move || orders.with(|o| !o.is_empty())
                fallback=|| view! { <p class="py-12 text-center text-base-content/60">"Вы ещё ничего не заказывали"</p> }
            >
                <div class="space-y-4">
                    <For
                        each=move || orders.get()
                        key=|o| (o.id, o.status)
                        children=|order| view! {
                            <div class="card bg-base-100 shadow">
                                <div class="card-body">
                                    <div class="flex flex-wrap items-center justify-between gap-2">
                                        <h3 class="font-semibold">{format!("Заказ №{}", order.id)}</h3>
                                        <span class=order.status.badge_class()>{order.status.label()}</span>
                                    </div>
                                    <p class="text-sm text-base-content/60">
                                        {format_datetime(order.created_at)} " · " {order.address.clone()}
                                    </p>
                                    <ul class="text-sm mt-2">
                                        {order.items.iter().map(|item| view! {
                                            <li class="flex justify-between">
                                                <span>{format!("{} × {}", item.title, item.quantity)}</span>
                                                <span>{format_price(item.price * f64::from(item.quantity))}</span>
                                            </li>
                                        }).collect_view()}
                                    </ul>
                                    <div class="text-right font-bold mt-2">
                                        {format!("Итого: {}", format_price(order.total_price))}
                                    </div>
                                </div>
                            </div>
                        }
                    />
                </div>
            </Show>
        </Show>
    }
}
