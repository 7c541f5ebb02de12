use bookclub_shared::AuditEntry;
use bookclub_shared::date::format_datetime;
use leptos::prelude::*;
use leptos::task::spawn_local;

use super::Notifier;
use crate::api;
use crate::components::icons::RefreshCw;
use crate::components::layout::Spinner;
use crate::components::table_ui::{Pager, SearchBox, SortHeader, TableControls};
use crate::config::ADMIN_PAGE_SIZE;
use crate::table::{AuditSort, SoftDeleteSet, SortConfig};

/// 只读的操作日志
#[component]
pub fn AuditLog() -> impl IntoView {
    let notify = Notifier::new();
    let (entries, set_entries) = signal(Vec::<AuditEntry>::new());
    let (loading, set_loading) = signal(true);
    let table = TableControls::new(SortConfig::desc(AuditSort::Timestamp));

    let load = move || {
        set_loading.set(true);
        spawn_local(async move {
            match api::client().audit_log().await {
                Ok(list) => set_entries.set(list),
                Err(e) => notify.failed(&e, "Не удалось загрузить журнал"),
            }
            set_loading.set(false);
        });
    };
    load();

    let current = Memo::new(move |_| {
        let query = table.snapshot();
        entries.with(|all| query.apply(all, &SoftDeleteSet::new(), ADMIN_PAGE_SIZE))
    });

    view! {
        <div class="flex items-center gap-4 mb-4">
            <SearchBox query=table.query page=table.page placeholder="Пользователь, действие или объект" />
            <button class="btn btn-ghost btn-sm" on:click=move |_| load()>
                <RefreshCw attr:class="h-4 w-4" />
            </button>
        </div>
        <Show when=move || !loading.get() fallback=|| view! { <Spinner /> }>
            <div class="overflow-x-auto bg-base-100 rounded-box shadow">
                <table class="table table-sm table-zebra">
                    <thead>
                        <tr>
                            <SortHeader label="Время" column=AuditSort::Timestamp sort=table.sort />
                            <SortHeader label="Пользователь" column=AuditSort::Actor sort=table.sort />
                            <SortHeader label="Действие" column=AuditSort::Action sort=table.sort />
                            <th>"Объект"</th>
                            <th>"Детали"</th>
                        </tr>
                    </thead>
                    <tbody>
                        <For
                            each=move || current.with(|p| p.items.clone())
                            key=|e| e.id
                            children=|entry| {
                                let target = match entry.entity_id {
                                    Some(id) => format!("{} #{}", entry.entity, id),
                                    None => entry.entity.clone(),
                                };
                                view! {
                                    <tr>
                                        <td class="whitespace-nowrap">{format_datetime(entry.timestamp)}</td>
                                        <td>{entry.actor}</td>
                                        <td><span class="badge badge-outline">{entry.action}</span></td>
                                        <td>{target}</td>
                                        <td class="text-xs opacity-70">{entry.details.unwrap_or_default()}</td>
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
