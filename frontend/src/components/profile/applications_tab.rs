use bookclub_shared::EventApplication;
use bookclub_shared::date::format_datetime;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api;
use crate::auth::use_auth;
use crate::components::layout::Spinner;
use crate::components::modal::confirm;
use crate::components::toast::use_toast;

#[component]
pub fn ApplicationsTab() -> impl IntoView {
    let auth = use_auth();
    let toast = use_toast();
    let (applications, set_applications) = signal(Vec::<EventApplication>::new());
    let (loading, set_loading) = signal(true);

    let load = move || {
        spawn_local(async move {
            match api::client().my_applications().await {
                Ok(mut list) => {
                    list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                    set_applications.set(list);
                }
                Err(e) => {
                    auth.handle_error(&e);
                    toast.api_error(&e, "Не удалось загрузить заявки");
                }
            }
            set_loading.set(false);
        });
    };
    load();

    let cancel = move |app_id: i64| {
        if !confirm("Отменить заявку?") {
            return;
        }
        spawn_local(async move {
            match api::client().cancel_application(app_id).await {
                Ok(_) => {
                    toast.success("Заявка отменена");
                    load();
                }
                Err(e) => {
                    auth.handle_error(&e);
                    toast.api_error(&e, "Не удалось отменить заявку");
                }
            }
        });
    };

    view! {
        <Show when=move || !loading.get() fallback=|| view! { <Spinner /> }>
            <Show
                when=move || applications.with(|a| !a.is_empty())
                fallback=|| view! { <p class="py-12 text-center text-base-content/60">"Заявок пока нет"</p> }
            >
                <div class="overflow-x-auto">
                    <table class="table">
                        <thead>
                            <tr>
                                <th>"Мероприятие"</th>
                                <th>"Подана"</th>
                                <th>"Статус"</th>
                                <th></th>
                            </tr>
                        </thead>
                        <tbody>
                            <For
                                each=move || applications.get()
                                key=|a| (a.id, a.status)
                                children=move |app| {
                                    let id = app.id;
                                    let status = app.status;
                                    view! {
                                        <tr>
                                            <td>{app.event_title.clone()}</td>
                                            <td>{format_datetime(app.created_at)}</td>
                                            <td><span class=status.badge_class()>{status.label()}</span></td>
                                            <td class="text-right">
                                                <Show when=move || status.is_open()>
                                                    <button class="btn btn-ghost btn-xs text-error" on:click=move |_| cancel(id)>
                                                        "Отменить"
                                                    </button>
                                                </Show>
                                            </td>
                                        </tr>
                                    }
                                }
                            />
                        </tbody>
                    </table>
                </div>
            </Show>
        </Show>
    }
}
