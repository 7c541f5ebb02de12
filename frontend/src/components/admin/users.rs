use bookclub_shared::{Role, User, UserId};
use leptos::prelude::*;
use leptos::task::spawn_local;

use super::Notifier;
use crate::api;
use crate::auth::use_auth;
use crate::components::icons::*;
use crate::components::layout::Spinner;
use crate::components::modal::confirm;
use crate::components::table_ui::{HiddenBar, Pager, SearchBox, SortHeader, TableControls};
use crate::config::ADMIN_PAGE_SIZE;
use crate::table::{SortConfig, UserSort};

#[component]
pub fn UsersManager() -> impl IntoView {
    let notify = Notifier::new();
    let auth = use_auth();
    let (users, set_users) = signal(Vec::<User>::new());
    let (loading, set_loading) = signal(true);
    let table = TableControls::new(SortConfig::asc(UserSort::Name));

    spawn_local(async move {
        match api::client().list_users().await {
            Ok(list) => set_users.set(list),
            Err(e) => notify.failed(&e, "Не удалось загрузить пользователей"),
        }
        set_loading.set(false);
    });

    let current = Memo::new(move |_| {
        let query = table.snapshot();
        table
            .hidden
            .with(|hidden| users.with(|all| query.apply(all, hidden, ADMIN_PAGE_SIZE)))
    });

    let change_role = move |id: UserId, raw: String| {
        let Ok(role) = raw.parse::<Role>() else {
            log_warn!("[admin] ignoring unknown role option {:?}", raw);
            return;
        };
        spawn_local(async move {
            match api::client().update_user_role(id, role).await {
                Ok(updated) => {
                    set_users.update(|list| {
                        if let Some(u) = list.iter_mut().find(|u| u.id == id) {
                            *u = updated;
                        }
                    });
                    notify.done("Роль изменена");
                }
                Err(e) => notify.failed(&e, "Не удалось изменить роль"),
            }
        });
    };

    let delete = move |id: UserId, email: String| {
        if !confirm(&format!("Удалить пользователя {}?", email)) {
            return;
        }
        spawn_local(async move {
            match api::client().delete_user(id).await {
                Ok(()) => {
                    set_users.update(|list| list.retain(|u| u.id != id));
                    notify.done("Пользователь удалён");
                }
                Err(e) => notify.failed(&e, "Не удалось удалить пользователя"),
            }
        });
    };

    view! {
        <div class="mb-4">
            <SearchBox query=table.query page=table.page placeholder="Имя или email" />
        </div>
        <HiddenBar hidden=table.hidden />

        <Show when=move || !loading.get() fallback=|| view! { <Spinner /> }>
            <div class="overflow-x-auto bg-base-100 rounded-box shadow">
                <table class="table table-zebra">
                    <thead>
                        <tr>
                            <SortHeader label="Имя" column=UserSort::Name sort=table.sort />
                            <SortHeader label="Email" column=UserSort::Email sort=table.sort />
                            <SortHeader label="Роль" column=UserSort::Role sort=table.sort />
                            <th></th>
                        </tr>
                    </thead>
                    <tbody>
                        <For
                            each=move || current.with(|p| p.items.clone())
                            key=|u| (u.id, u.role)
                            children=move |user| {
                                let id = user.id;
                                let email = user.email.clone();
                                // 不能修改或删除自己
                                let is_self = auth.session_untracked().user_id == Some(id);
                                view! {
                                    <tr>
                                        <td class="font-medium">{user.full_name()}</td>
                                        <td>{user.email.clone()}</td>
                                        <td>
                                            <select
                                                class="select select-bordered select-sm"
                                                disabled=is_self
                                                on:change=move |ev| change_role(id, event_target_value(&ev))
                                            >
                                                {Role::ALL
                                                    .into_iter()
                                                    .map(|r| view! {
                                                        <option value=r.as_str() selected=r == user.role>{r.label()}</option>
                                                    })
                                                    .collect_view()}
                                            </select>
                                        </td>
                                        <td class="whitespace-nowrap text-right">
                                            <button class="btn btn-ghost btn-xs" on:click=move |_| table.hide(id)>
                                                <EyeOff attr:class="h-4 w-4" />
                                            </button>
                                            <button
                                                class="btn btn-ghost btn-xs text-error"
                                                disabled=is_self
                                                on:click=move |_| delete(id, email.clone())
                                            >
                                                <Trash2 attr:class="h-4 w-4" />
                                            </button>
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
