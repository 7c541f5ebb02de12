//! 活动管理与报名审核
//!
//! 组织者和管理员都可以进入。审核只对仍在"待处理"状态的报名开放。

use bookclub_shared::date::format_datetime;
use bookclub_shared::{ApplicationStatus, Event, EventApplication, EventId};
use leptos::prelude::*;
use leptos::task::spawn_local;

use super::forms::EventFormState;
use super::{Notifier, TextArea, TextField};
use crate::api;
use crate::components::icons::*;
use crate::components::layout::Spinner;
use crate::components::modal::{Modal, confirm};
use crate::components::table_ui::{HiddenBar, Pager, SearchBox, SortHeader, TableControls};
use crate::config::ADMIN_PAGE_SIZE;
use crate::table::{ApplicationSort, EventSort, SortConfig, filter_and_sort};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Review {
    Approve,
    Reject,
}

#[component]
fn ApplicationsReview(event: ReadSignal<Option<Event>>, open: RwSignal<bool>) -> impl IntoView {
    let notify = Notifier::new();
    let (applications, set_applications) = signal(Vec::<EventApplication>::new());
    let (loading, set_loading) = signal(false);

    let load = move |event_id: EventId| {
        set_loading.set(true);
        spawn_local(async move {
            match api::client().event_applications(event_id).await {
                Ok(list) => set_applications.set(filter_and_sort(
                    &list,
                    "",
                    Some(SortConfig::asc(ApplicationSort::CreatedAt)),
                )),
                Err(e) => notify.failed(&e, "Не удалось загрузить заявки"),
            }
            set_loading.set(false);
        });
    };

    Effect::new(move |_| {
        if open.get() {
            if let Some(id) = event.with(|e| e.as_ref().map(|e| e.id)) {
                set_applications.set(Vec::new());
                load(id);
            }
        }
    });

    let review = move |app_id: i64, action: Review| {
        spawn_local(async move {
            let client = api::client();
            let result = match action {
                Review::Approve => client.approve_application(app_id).await,
                Review::Reject => client.reject_application(app_id).await,
            };
            match result {
                Ok(updated) => {
                    set_applications.update(|list| {
                        if let Some(a) = list.iter_mut().find(|a| a.id == app_id) {
                            *a = updated;
                        }
                    });
                    notify.done(match action {
                        Review::Approve => "Заявка одобрена",
                        Review::Reject => "Заявка отклонена",
                    });
                }
                Err(e) => notify.failed(&e, "Не удалось обработать заявку"),
            }
        });
    };

    let approved = move || {
        applications.with(|list| {
            list.iter()
                .filter(|a| a.status == ApplicationStatus::Approved)
                .count()
        })
    };
    let capacity = move || event.with(|e| e.as_ref().map(|e| e.capacity).unwrap_or(0));

    view! {
        <Modal
            open=open
            wide=true
            title=Signal::derive(move || event.with(|e| e.as_ref().map(|e| format!("Заявки: {}", e.title)).unwrap_or_default()))
        >
            <p class="text-sm mb-3">{move || format!("Одобрено {} из {} мест", approved(), capacity())}</p>
            <Show when=move || !loading.get() fallback=|| view! { <Spinner /> }>
                <Show
                    when=move || applications.with(|a| !a.is_empty())
                    fallback=|| view! { <p class="py-6 text-center opacity-60">"Заявок нет"</p> }
                >
                    <table class="table table-sm">
                        <thead>
                            <tr>
                                <th>"Участник"</th>
                                <th>"Подана"</th>
                                <th>"Комментарий"</th>
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
                                            <td>{app.user_name.clone()}</td>
                                            <td class="whitespace-nowrap">{format_datetime(app.created_at)}</td>
                                            <td class="text-sm">{app.comment.clone().unwrap_or_default()}</td>
                                            <td><span class=status.badge_class()>{status.label()}</span></td>
                                            <td class="whitespace-nowrap text-right">
                                                <Show when=move || status.is_open()>
                                                    <button class="btn btn-success btn-xs" on:click=move |_| review(id, Review::Approve)>
                                                        <Check attr:class="h-3 w-3" />
                                                    </button>
                                                    <button class="btn btn-error btn-xs ml-1" on:click=move |_| review(id, Review::Reject)>
                                                        <XIcon attr:class="h-3 w-3" />
                                                    </button>
                                                </Show>
                                            </td>
                                        </tr>
                                    }
                                }
                            />
                        </tbody>
                    </table>
                </Show>
            </Show>
        </Modal>
    }
}

#[component]
pub fn EventsManager() -> impl IntoView {
    let notify = Notifier::new();
    let (events, set_events) = signal(Vec::<Event>::new());
    let (loading, set_loading) = signal(true);
    let table = TableControls::new(SortConfig::desc(EventSort::StartsAt));

    let form = EventFormState::new();
    let editing = RwSignal::new(Option::<EventId>::None);
    let modal_open = RwSignal::new(false);
    let (saving, set_saving) = signal(false);

    let review_open = RwSignal::new(false);
    let (reviewed, set_reviewed) = signal(Option::<Event>::None);

    let load = move || {
        spawn_local(async move {
            match api::client().list_events().await {
                Ok(list) => set_events.set(list),
                Err(e) => notify.failed(&e, "Не удалось загрузить мероприятия"),
            }
            set_loading.set(false);
        });
    };
    load();

    let current = Memo::new(move |_| {
        let query = table.snapshot();
        table
            .hidden
            .with(|hidden| events.with(|all| query.apply(all, hidden, ADMIN_PAGE_SIZE)))
    });

    let open_create = move |_| {
        form.reset();
        editing.set(None);
        modal_open.set(true);
    };
    // 编辑前重新读取，避免用列表中的旧数据覆盖别人的修改
    let open_edit = move |event: &Event| {
        let id = event.id;
        form.fill(event);
        editing.set(Some(id));
        modal_open.set(true);
        spawn_local(async move {
            match api::client().get_event(id).await {
                Ok(fresh) if editing.get_untracked() == Some(id) => form.fill(&fresh),
                Ok(_) => {}
                Err(e) => log_warn!("[admin] could not refresh event {}: {}", id, e),
            }
        });
    };
    let open_review = move |event: Event| {
        set_reviewed.set(Some(event));
        review_open.set(true);
    };

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let payload = match form.to_form() {
            Ok(payload) => payload,
            Err(msg) => return notify.invalid(msg),
        };
        let target = editing.get_untracked();

        set_saving.set(true);
        spawn_local(async move {
            let client = api::client();
            let result = match target {
                Some(id) => client.update_event(id, payload).await,
                None => client.create_event(&payload).await,
            };
            match result {
                Ok(_) => {
                    notify.done("Мероприятие сохранено");
                    modal_open.set(false);
                    load();
                }
                Err(e) => notify.failed(&e, "Не удалось сохранить мероприятие"),
            }
            set_saving.set(false);
        });
    };

    let delete = move |id: EventId, title: String| {
        if !confirm(&format!("Удалить мероприятие «{}»? Заявки участников тоже будут удалены.", title)) {
            return;
        }
        spawn_local(async move {
            match api::client().delete_event(id).await {
                Ok(()) => {
                    set_events.update(|list| list.retain(|e| e.id != id));
                    notify.done("Мероприятие удалено");
                }
                Err(e) => notify.failed(&e, "Не удалось удалить мероприятие"),
            }
        });
    };

    view! {
        <div class="flex flex-wrap items-center justify-between gap-4 mb-4">
            <SearchBox query=table.query page=table.page placeholder="Название или место" />
            <button class="btn btn-primary btn-sm" on:click=open_create>
                <Plus attr:class="h-4 w-4" />
                "Новое мероприятие"
            </button>
        </div>
        <HiddenBar hidden=table.hidden />

        <Show when=move || !loading.get() fallback=|| view! { <Spinner /> }>
            <div class="overflow-x-auto bg-base-100 rounded-box shadow">
                <table class="table table-zebra">
                    <thead>
                        <tr>
                            <SortHeader label="Название" column=EventSort::Title sort=table.sort />
                            <SortHeader label="Начало" column=EventSort::StartsAt sort=table.sort />
                            <th>"Место"</th>
                            <SortHeader label="Мест" column=EventSort::Capacity sort=table.sort />
                            <th></th>
                        </tr>
                    </thead>
                    <tbody>
                        <For
                            each=move || current.with(|p| p.items.clone())
                            key=|e| (e.id, e.title.clone(), e.starts_at)
                            children=move |event| {
                                let id = event.id;
                                let title = event.title.clone();
                                let for_edit = event.clone();
                                let for_review = event.clone();
                                view! {
                                    <tr>
                                        <td class="font-medium">{event.title.clone()}</td>
                                        <td class="whitespace-nowrap">{format_datetime(event.starts_at)}</td>
                                        <td>{event.location.clone()}</td>
                                        <td>{event.capacity}</td>
                                        <td class="whitespace-nowrap text-right">
                                            <button class="btn btn-ghost btn-xs" title="Заявки" on:click=move |_| open_review(for_review.clone())>
                                                <UserIcon attr:class="h-4 w-4" />
                                            </button>
                                            <button class="btn btn-ghost btn-xs" on:click=move |_| open_edit(&for_edit)>
                                                <Pencil attr:class="h-4 w-4" />
                                            </button>
                                            <button class="btn btn-ghost btn-xs" on:click=move |_| table.hide(id)>
                                                <EyeOff attr:class="h-4 w-4" />
                                            </button>
                                            <button class="btn btn-ghost btn-xs text-error" on:click=move |_| delete(id, title.clone())>
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

        <Modal
            open=modal_open
            title=Signal::derive(move || if editing.get().is_some() { "Редактирование мероприятия".to_string() } else { "Новое мероприятие".to_string() })
        >
            <form class="grid gap-4" on:submit=on_submit>
                <TextField label="Название" value=form.title />
                <TextField label="Место проведения" value=form.location />
                <div class="grid grid-cols-2 gap-4">
                    <TextField label="Начало" value=form.starts_at kind="datetime-local" />
                    <TextField label="Количество мест" value=form.capacity kind="number" />
                </div>
                <TextField label="Ссылка на изображение" value=form.image_url kind="url" />
                <TextArea label="Описание" value=form.description />
                <div class="modal-action">
                    <button type="button" class="btn" on:click=move |_| modal_open.set(false)>"Отмена"</button>
                    <button type="submit" class="btn btn-primary" disabled=move || saving.get()>"Сохранить"</button>
                </div>
            </form>
        </Modal>

        <ApplicationsReview event=reviewed open=review_open />
    }
}
