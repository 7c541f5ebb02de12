use bookclub_shared::User;
use bookclub_shared::date::{format_date, parse_date_input, to_date_input};
use bookclub_shared::protocol::UpdateProfileRequest;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api;
use crate::auth::use_auth;
use crate::components::icons::UserIcon;
use crate::components::layout::Spinner;
use crate::components::toast::use_toast;
use crate::config::asset_url;

/// 资料表单状态
#[derive(Clone, Copy)]
struct ProfileForm {
    first_name: RwSignal<String>,
    last_name: RwSignal<String>,
    address: RwSignal<String>,
    birth_date: RwSignal<String>,
    avatar_url: RwSignal<String>,
}

impl ProfileForm {
    fn new() -> Self {
        Self {
            first_name: RwSignal::new(String::new()),
            last_name: RwSignal::new(String::new()),
            address: RwSignal::new(String::new()),
            birth_date: RwSignal::new(String::new()),
            avatar_url: RwSignal::new(String::new()),
        }
    }

    fn fill(&self, user: &User) {
        let req = UpdateProfileRequest::from(user);
        self.first_name.set(req.first_name);
        self.last_name.set(req.last_name);
        self.address.set(req.address.unwrap_or_default());
        self.birth_date
            .set(req.birth_date.map(to_date_input).unwrap_or_default());
        self.avatar_url.set(req.avatar_url.unwrap_or_default());
    }

    fn to_request(&self) -> Result<UpdateProfileRequest, &'static str> {
        build_request(
            &self.first_name.get(),
            &self.last_name.get(),
            &self.address.get(),
            &self.birth_date.get(),
            &self.avatar_url.get(),
        )
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn build_request(
    first_name: &str,
    last_name: &str,
    address: &str,
    birth_date: &str,
    avatar_url: &str,
) -> Result<UpdateProfileRequest, &'static str> {
    if first_name.trim().is_empty() || last_name.trim().is_empty() {
        return Err("Имя и фамилия обязательны");
    }
    let birth_date = match birth_date.trim() {
        "" => None,
        raw => Some(parse_date_input(raw).ok_or("Некорректная дата рождения")?),
    };
    Ok(UpdateProfileRequest {
        first_name: first_name.trim().to_string(),
        last_name: last_name.trim().to_string(),
        address: non_empty(address),
        birth_date,
        avatar_url: non_empty(avatar_url),
    })
}

#[component]
pub fn ProfileTab() -> impl IntoView {
    let auth = use_auth();
    let toast = use_toast();
    let form = ProfileForm::new();
    let (user, set_user) = signal(Option::<User>::None);
    let (loading, set_loading) = signal(true);
    let (saving, set_saving) = signal(false);

    spawn_local(async move {
        match api::client().fetch_profile().await {
            Ok(profile) => {
                form.fill(&profile);
                set_user.set(Some(profile));
            }
            Err(e) => {
                auth.handle_error(&e);
                toast.api_error(&e, "Не удалось загрузить профиль");
            }
        }
        set_loading.set(false);
    });

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let req = match form.to_request() {
            Ok(req) => req,
            Err(msg) => {
                toast.error(msg);
                return;
            }
        };
        set_saving.set(true);
        spawn_local(async move {
            match api::client().update_profile(&req).await {
                Ok(updated) => {
                    form.fill(&updated);
                    set_user.set(Some(updated));
                    toast.success("Профиль сохранён");
                }
                Err(e) => {
                    auth.handle_error(&e);
                    toast.api_error(&e, "Не удалось сохранить профиль");
                }
            }
            set_saving.set(false);
        });
    };

    let text_input = move |label: &'static str, kind: &'static str, value: RwSignal<String>| {
        view! {
            <label class="form-control">
                <span class="label-text mb-1">{label}</span>
                <input
                    type=kind
                    class="input input-bordered"
                    prop:value=move || value.get()
                    on:input=move |ev| value.set(event_target_value(&ev))
                />
            </label>
        }
    };

    view! {
        <Show when=move || !loading.get() fallback=|| view! { <Spinner /> }>
            <div class="grid md:grid-cols-3 gap-8">
                <div class="card bg-base-100 shadow">
                    <div class="card-body items-center text-center">
                        {move || match form.avatar_url.get() {
                            url if url.trim().is_empty() => view! {
                                <div class="p-6 rounded-full bg-base-200"><UserIcon attr:class="h-12 w-12" /></div>
                            }.into_any(),
                            url => view! { <img class="w-24 h-24 rounded-full object-cover" src=asset_url(&url) alt="avatar" /> }.into_any(),
                        }}
                        {move || user.get().map(|u| view! {
                            <h2 class="card-title">{u.full_name()}</h2>
                            <p class="text-sm text-base-content/70">{u.email.clone()}</p>
                            <span class="badge badge-outline">{u.role.label()}</span>
                            {u.birth_date.map(|d| view! {
                                <p class="text-xs text-base-content/60">{format!("Дата рождения: {}", format_date(d))}</p>
                            })}
                        })}
                    </div>
                </div>

                <form class="card bg-base-100 shadow md:col-span-2" on:submit=on_submit>
                    <div class="card-body grid gap-4">
                        <div class="grid grid-cols-2 gap-4">
                            {text_input("Имя", "text", form.first_name)}
                            {text_input("Фамилия", "text", form.last_name)}
                        </div>
                        {text_input("Адрес доставки", "text", form.address)}
                        {text_input("Дата рождения", "date", form.birth_date)}
                        {text_input("Ссылка на аватар", "url", form.avatar_url)}
                        <div class="card-actions justify-end">
                            <button class="btn btn-primary" disabled=move || saving.get()>"Сохранить"</button>
                        </div>
                    </div>
                </form>
            </div>
        </Show>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn blank_optional_fields_become_none() {
        let req = build_request(" Анна ", "Иванова", "  ", "", "").unwrap();
        assert_eq!(req.first_name, "Анна");
        assert_eq!(req.address, None);
        assert_eq!(req.birth_date, None);
        assert_eq!(req.avatar_url, None);
    }

    #[test]
    fn parses_birth_date() {
        let req = build_request("Анна", "Иванова", "Москва", "2001-02-03", "").unwrap();
        assert_eq!(req.birth_date, NaiveDate::from_ymd_opt(2001, 2, 3));
        assert_eq!(req.address.as_deref(), Some("Москва"));
    }

    #[test]
    fn rejects_missing_names_and_bad_dates() {
        assert!(build_request("", "Иванова", "", "", "").is_err());
        assert_eq!(
            build_request("Анна", "Иванова", "", "03.02.2001", "").unwrap_err(),
            "Некорректная дата рождения"
        );
    }
}
