use bookclub_shared::date::{format_datetime, format_price};
use bookclub_shared::{Order, OrderId, OrderStatus};
use leptos::prelude::*;
use leptos::task::spawn_local;

use super::Notifier;
use crate::api;
use crate::components::icons::RefreshCw;
use crate::components::layout::Spinner;
use crate::components::table_ui::{Pager, SearchBox, SortHeader, TableControls};
use crate::config::ADMIN_PAGE_SIZE;
use crate::table::{OrderSort, SoftDeleteSet, SortConfig};

/// 按状态筛选；`None` 表示全部
fn with_status(orders: &[Order], status: Option<OrderStatus>) -> Vec<Order> {
    orders
        .iter()
        .filter(|o| status.is_none_or(|s| o.status == s))
        .cloned()
        .collect()
}

#[component]
pub fn OrdersManager() -> impl IntoView {
    let notify = Notifier::new();
    let (orders, set_orders) = signal(Vec::<Order>::new());
    let (loading, set_loading) = signal(true);
    let status_filter = RwSignal::new(Option::<OrderStatus>::None);
    let table = TableControls::new(SortConfig::desc(OrderSort::CreatedAt));

    let load = move || {
        set_loading.set(true);
        spawn_local(async move {
            match api::client().all_orders().await {
                Ok(list) => set_orders.set(list),
                Err(e) => notify.failed(&e, "Не удалось загрузить заказы"),
            }
            set_loading.set(false);
        });
    };
    load();

    let current = Memo::new(move |_| {
        let query = table.snapshot();
        let status = status_filter.get();
        orders.with(|all| query.apply(&with_status(all, status), &SoftDeleteSet::new(), ADMIN_PAGE_SIZE))
    });

    let change_status = move |id: OrderId, code: String| {
        let status = OrderStatus::from_code(&code);
        if status == OrderStatus::Unknown {
            return;
        }
        spawn_local(async move {
            match api::client().update_order_status(id, status).await {
                Ok(updated) => {
                    set_orders.update(|list| {
                        if let Some(o) = list.iter_mut().find(|o| o.id == id) {
                            *o = updated;
                        }
                    });
                    notify.done(&format!("Заказ №{}: {}", id, status.label()));
                }
                Err(e) => notify.failed(&e, "Не удалось изменить статус заказа"),
            }
        });
    };

    view! {
        <div class="flex flex-wrap items-center gap-4 mb-4">
            <SearchBox query=table.query page=table.page placeholder="Номер, email или адрес" />
            <select
                class="select select-bordered select-sm"
                on:change=move |ev| {
                    let code = event_target_value(&ev);
                    status_filter.set((!code.is_empty()).then(|| OrderStatus::from_code(&code)));
                    table.page.set(1);
                }
            >
                <option value="">"Все статусы"</option>
                {OrderStatus::ASSIGNABLE
                    .into_iter()
                    .map(|s| view! { <option value=s.as_str()>{s.label()}</option> })
                    .collect_view()}
            </select>
            <button class="btn btn-ghost btn-sm" on:click=move |_| load()>
                <RefreshCw attr:class="h-4 w-4" />
            </button>
        </div>

        <Show when=move || !loading.get() fallback=|| view! { <Spinner /> }>
            <div class="overflow-x-auto bg-base-100 rounded-box shadow">
                <table class="table table-zebra">
                    <thead>
                        <tr>
                            <SortHeader label="№" column=OrderSort::Id sort=table.sort />
                            <SortHeader label="Дата" column=OrderSort::CreatedAt sort=table.sort />
                            <th>"Покупатель"</th>
                            <th>"Состав"</th>
                            <SortHeader label="Сумма" column=OrderSort::Total sort=table.sort />
                            <SortHeader label="Статус" column=OrderSort::Status sort=table.sort />
                        </tr>
                    </thead>
                    <tbody>
                        <For
                            each=move || current.with(|p| p.items.clone())
                            key=|o| (o.id, o.status)
                            children=move |order| {
                                let id = order.id;
                                let items = order
                                    .items
                                    .iter()
                                    .map(|i| format!("{} × {}", i.title, i.quantity))
                                    .collect::<Vec<_>>()
                                    .join(", ");
                                view! {
                                    <tr>
                                        <td>{id}</td>
                                        <td class="whitespace-nowrap">{format_datetime(order.created_at)}</td>
                                        <td>
                                            <div>{order.user_email.clone().unwrap_or_default()}</div>
                                            <div class="text-xs opacity-60">{order.address.clone()}</div>
                                        </td>
                                        <td class="text-sm max-w-xs">{items}</td>
                                        <td class="whitespace-nowrap">{format_price(order.total_price)}</td>
                                        <td>
                                            <select
                                                class="select select-bordered select-xs"
                                                on:change=move |ev| change_status(id, event_target_value(&ev))
                                            >
                                                {OrderStatus::ASSIGNABLE
                                                    .into_iter()
                                                    .map(|s| view! {
                                                        <option value=s.as_str() selected=s == order.status>{s.label()}</option>
                                                    })
                                                    .collect_view()}
                                            </select>
                                        </td>
                                    </tr>
                                }
                            }
                        />
                    </tbody>
                </table>
            </div>
            <Pager current=current page=table.page />
        </Show>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn order(id: i64, status: OrderStatus) -> Order {
        Order {
            id,
            items: vec![],
            total_price: 100.0,
            status,
            address: String::new(),
            created_at: NaiveDate::from_ymd_opt(2025, 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .unwrap(),
            user_id: None,
            user_email: None,
        }
    }

    #[test]
    fn status_filter() {
        let orders = vec![
            order(1, OrderStatus::Pending),
            order(2, OrderStatus::Shipped),
            order(3, OrderStatus::Pending),
        ];
        assert_eq!(with_status(&orders, None).len(), 3);
        let pending = with_status(&orders, Some(OrderStatus::Pending));
        assert_eq!(pending.iter().map(|o| o.id).collect::<Vec<_>>(), vec![1, 3]);
    }
}
