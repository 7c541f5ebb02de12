use std::collections::HashMap;

use bookclub_shared::date::format_datetime;
use bookclub_shared::{ApplicationStatus, Event, EventApplication, EventId};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api;
use crate::auth::use_auth;
use crate::components::icons::*;
use crate::components::layout::Spinner;
use crate::components::modal::Modal;
use crate::components::toast::use_toast;
use crate::config::cover_or_placeholder;
use crate::web::clock;
use crate::web::route::AppRoute;
use crate::web::router::Link;

/// 每个活动上用户最近一次报名的状态
fn latest_status(applications: &[EventApplication]) -> HashMap<EventId, ApplicationStatus> {
    let mut latest: HashMap<EventId, &EventApplication> = HashMap::new();
    for app in applications {
        latest
            .entry(app.event_id)
            .and_modify(|seen| {
                if app.created_at > seen.created_at {
                    *seen = app;
                }
            })
            .or_insert(app);
    }
    latest
        .into_iter()
        .map(|(id, app)| (id, app.status))
        .collect()
}

/// 已取消或被拒绝后可以重新报名
fn can_apply(status: Option<ApplicationStatus>) -> bool {
    !matches!(
        status,
        Some(ApplicationStatus::Pending | ApplicationStatus::Approved)
    )
}

#[component]
pub fn EventsPage() -> impl IntoView {
    let auth = use_auth();
    let toast = use_toast();

    let (events, set_events) = signal(Vec::<Event>::new());
    let (statuses, set_statuses) = signal(HashMap::<EventId, ApplicationStatus>::new());
    let (loading, set_loading) = signal(true);

    let apply_open = RwSignal::new(false);
    let (target, set_target) = signal(Option::<Event>::None);
    let (comment, set_comment) = signal(String::new());
    let (submitting, set_submitting) = signal(false);

    spawn_local(async move {
        match api::client().list_events().await {
            Ok(mut list) => {
                list.sort_by_key(|e| e.starts_at);
                set_events.set(list);
            }
            Err(e) => toast.api_error(&e, "Не удалось загрузить мероприятия"),
        }
        set_loading.set(false);
    });

    let load_applications = move || {
        if !auth.session_untracked().is_authorized {
            return;
        }
        spawn_local(async move {
            match api::client().my_applications().await {
                Ok(apps) => set_statuses.set(latest_status(&apps)),
                Err(e) => {
                    auth.handle_error(&e);
                    log_warn!("[events] applications unavailable: {}", e);
                }
            }
        });
    };
    load_applications();

    let open_apply = move |event: Event| {
        set_comment.set(String::new());
        set_target.set(Some(event));
        apply_open.set(true);
    };

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let Some(event) = target.get() else {
            return;
        };
        set_submitting.set(true);
        spawn_local(async move {
            match api::client().apply_to_event(event.id, Some(comment.get_untracked())).await {
                Ok(_) => {
                    toast.success(format!("Заявка на «{}» отправлена", event.title));
                    apply_open.set(false);
                    load_applications();
                }
                Err(e) => {
                    auth.handle_error(&e);
                    toast.api_error(&e, "Не удалось отправить заявку");
                }
            }
            set_submitting.set(false);
        });
    };

    let now = clock::now();

    view! {
        <h1 class="text-3xl font-bold mb-6">"Мероприятия клуба"</h1>
        <Show when=move || !loading.get() fallback=|| view! { <Spinner /> }>
            <Show
                when=move || events.with(|e| !e.is_empty())
                fallback=|| view! { <p class="text-center py-12 text-base-content/60">"Запланированных встреч нет"</p> }
            >
                <div class="grid md:grid-cols-2 lg:grid-cols-3 gap-6">
                    <For
                        each=move || events.get()
                        key=|e| e.id
                        children=move |event| {
                            let id = event.id;
                            let is_past = event.starts_at < now;
                            let status = move || statuses.with(|s| s.get(&id).copied());
                            let for_dialog = event.clone();
                            view! {
                                <div class="card bg-base-100 shadow">
                                    <figure class="h-40 bg-base-200">
                                        <img class="w-full object-cover" src=cover_or_placeholder(event.image_url.as_deref()) alt=event.title.clone() />
                                    </figure>
                                    <div class="card-body">
                                        <h2 class="card-title">{event.title.clone()}</h2>
                                        <p class="flex items-center gap-2 text-sm">
                                            <Calendar attr:class="h-4 w-4" />
                                            {format_datetime(event.starts_at)}
                                        </p>
                                        <p class="flex items-center gap-2 text-sm">
                                            <MapPin attr:class="h-4 w-4" />
                                            {event.location.clone()}
                                        </p>
                                        <p class="text-sm text-base-content/70 whitespace-pre-line">{event.description.clone()}</p>
                                        <p class="text-xs text-base-content/50">{format!("Мест: {}", event.capacity)}</p>
                                        <div class="card-actions justify-end items-center mt-2">
                                            {move || status().map(|s| view! { <span class=s.badge_class()>{s.label()}</span> })}
                                            <Show
                                                when=move || auth.session().is_authorized
                                                fallback=|| view! {
                                                    <Link to=AppRoute::Login class="btn btn-sm btn-outline">"Войдите, чтобы участвовать"</Link>
                                                }
                                            >
                                                {
                                                    let for_dialog = for_dialog.clone();
                                                    view! {
                                                        <button
                                                            class="btn btn-primary btn-sm"
                                                            disabled=move || is_past || !can_apply(status())
                                                            on:click=move |_| open_apply(for_dialog.clone())
                                                        >
                                                            {if is_past { "Встреча прошла" } else { "Записаться" }}
                                                        </button>
                                                    }
                                                }
                                            </Show>
                                        </div>
                                    </div>
                                </div>
                            }
                        }
                    />
                </div>
            </Show>
        </Show>

        <Modal open=apply_open title=Signal::derive(move || target.with(|t| t.as_ref().map(|e| format!("Заявка: {}", e.title)).unwrap_or_default()))>
            <form class="space-y-4" on:submit=on_submit>
                <label class="form-control">
                    <span class="label-text">"Комментарий для организатора (необязательно)"</span>
                    <textarea
                        class="textarea textarea-bordered"
                        prop:value=comment
                        on:input=move |ev| set_comment.set(event_target_value(&ev))
                    ></textarea>
                </label>
                <div class="modal-action">
                    <button type="button" class="btn" on:click=move |_| apply_open.set(false)>"Отмена"</button>
                    <button type="submit" class="btn btn-primary" disabled=move || submitting.get()>"Отправить"</button>
                </div>
            </form>
        </Modal>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn application(id: i64, event_id: i64, day: u32, status: ApplicationStatus) -> EventApplication {
        EventApplication {
            id,
            event_id,
            event_title: String::new(),
            user_id: 1,
            user_name: String::new(),
            status,
            created_at: NaiveDate::from_ymd_opt(2025, 4, day)
                .and_then(|d| d.and_hms_opt(12, 0, 0))
                .unwrap(),
            comment: None,
        }
    }

    #[test]
    fn newest_application_wins() {
        let apps = vec![
            application(1, 10, 1, ApplicationStatus::Cancelled),
            application(2, 10, 5, ApplicationStatus::Pending),
            application(3, 11, 2, ApplicationStatus::Rejected),
        ];
        let latest = latest_status(&apps);
        assert_eq!(latest.get(&10), Some(&ApplicationStatus::Pending));
        assert_eq!(latest.get(&11), Some(&ApplicationStatus::Rejected));
    }

    #[test]
    fn reapplying_after_cancel_or_reject() {
        assert!(can_apply(None));
        assert!(can_apply(Some(ApplicationStatus::Cancelled)));
        assert!(can_apply(Some(ApplicationStatus::Rejected)));
        assert!(!can_apply(Some(ApplicationStatus::Pending)));
        assert!(!can_apply(Some(ApplicationStatus::Approved)));
    }
}
