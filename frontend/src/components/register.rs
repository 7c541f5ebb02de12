use bookclub_shared::date::parse_date_input;
use bookclub_shared::protocol::RegisterRequest;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api;
use crate::auth::{login, use_auth};
use crate::components::toast::use_toast;
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_navigate};

const MIN_PASSWORD_LEN: usize = 6;

/// 注册表单的原始输入
#[derive(Debug, Clone, Default)]
struct RegisterInput {
    email: String,
    password: String,
    confirm: String,
    first_name: String,
    last_name: String,
    birth_date: String,
}

impl RegisterInput {
    fn validate(self) -> Result<RegisterRequest, &'static str> {
        let email = self.email.trim().to_string();
        if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
            return Err("Введите корректный email");
        }
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err("Укажите имя и фамилию");
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err("Пароль должен содержать не менее 6 символов");
        }
        if self.password != self.confirm {
            return Err("Пароли не совпадают");
        }
        let birth_date = match self.birth_date.trim() {
            "" => None,
            raw => Some(parse_date_input(raw).ok_or("Некорректная дата рождения")?),
        };

        Ok(RegisterRequest {
            email,
            password: self.password,
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            birth_date,
        })
    }
}

#[component]
pub fn RegisterPage() -> impl IntoView {
    let auth = use_auth();
    let toast = use_toast();
    let navigate = StoredValue::new(use_navigate());

    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let confirm = RwSignal::new(String::new());
    let first_name = RwSignal::new(String::new());
    let last_name = RwSignal::new(String::new());
    let birth_date = RwSignal::new(String::new());
    let (error_msg, set_error_msg) = signal(Option::<String>::None);
    let (submitting, set_submitting) = signal(false);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let input = RegisterInput {
            email: email.get(),
            password: password.get(),
            confirm: confirm.get(),
            first_name: first_name.get(),
            last_name: last_name.get(),
            birth_date: birth_date.get(),
        };
        let req = match input.validate() {
            Ok(req) => req,
            Err(msg) => {
                set_error_msg.set(Some(msg.to_string()));
                return;
            }
        };

        set_error_msg.set(None);
        set_submitting.set(true);
        spawn_local(async move {
            match api::client().register(&req).await {
                Ok(user) => {
                    log_info!("[register] created user {}", user.id);
                    toast.success("Аккаунт создан");
                    if let Err(e) = login(&auth, &req.email, &req.password).await {
                        log_warn!("[register] auto sign-in failed: {}", e);
                        navigate.with_value(|nav| nav(AppRoute::Login));
                    }
                }
                Err(e) => {
                    log_warn!("[register] {}", e);
                    set_error_msg.set(Some(e.user_message("Не удалось зарегистрироваться")));
                }
            }
            set_submitting.set(false);
        });
    };

    let field = move |id: &'static str, label: &'static str, kind: &'static str, value: RwSignal<String>| {
        view! {
            <div class="form-control">
                <label for=id class="label">
                    <span class="label-text">{label}</span>
                </label>
                <input
                    id=id
                    type=kind
                    class="input input-bordered"
                    prop:value=move || value.get()
                    on:input=move |ev| value.set(event_target_value(&ev))
                />
            </div>
        }
    };

    view! {
        <div class="flex justify-center">
            <div class="card w-full max-w-lg shadow-2xl bg-base-100">
                <form class="card-body" on:submit=on_submit>
                    <h1 class="text-2xl font-bold text-center mb-2">"Регистрация"</h1>
                    <Show when=move || error_msg.get().is_some()>
                        <div role="alert" class="alert alert-error text-sm py-2">
                            <span>{move || error_msg.get().unwrap_or_default()}</span>
                        </div>
                    </Show>
                    <div class="grid grid-cols-2 gap-4">
                        {field("first_name", "Имя", "text", first_name)}
                        {field("last_name", "Фамилия", "text", last_name)}
                    </div>
                    {field("email", "Email", "email", email)}
                    {field("birth_date", "Дата рождения", "date", birth_date)}
                    <div class="grid grid-cols-2 gap-4">
                        {field("password", "Пароль", "password", password)}
                        {field("confirm", "Повторите пароль", "password", confirm)}
                    </div>
                    <button class="btn btn-primary mt-4" disabled=move || submitting.get()>
                        "Создать аккаунт"
                    </button>
                    <p class="text-sm text-center mt-2">
                        "Уже есть аккаунт? "
                        <Link to=AppRoute::Login class="link link-primary">"Войти"</Link>
                    </p>
                </form>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn valid() -> RegisterInput {
        RegisterInput {
            email: " reader@club.ru ".to_string(),
            password: "secret1".to_string(),
            confirm: "secret1".to_string(),
            first_name: "Анна".to_string(),
            last_name: "Иванова".to_string(),
            birth_date: "1990-04-12".to_string(),
        }
    }

    #[test]
    fn valid_input_builds_request() {
        let req = valid().validate().unwrap();
        assert_eq!(req.email, "reader@club.ru");
        assert_eq!(req.birth_date, NaiveDate::from_ymd_opt(1990, 4, 12));
    }

    #[test]
    fn birth_date_is_optional() {
        let input = RegisterInput {
            birth_date: String::new(),
            ..valid()
        };
        assert_eq!(input.validate().unwrap().birth_date, None);
    }

    #[test]
    fn rejects_bad_input() {
        let mismatched = RegisterInput {
            confirm: "other".to_string(),
            ..valid()
        };
        assert_eq!(mismatched.validate().unwrap_err(), "Пароли не совпадают");

        let short = RegisterInput {
            password: "12345".to_string(),
            confirm: "12345".to_string(),
            ..valid()
        };
        assert!(short.validate().is_err());

        let no_at = RegisterInput {
            email: "reader.club.ru".to_string(),
            ..valid()
        };
        assert_eq!(no_at.validate().unwrap_err(), "Введите корректный email");
    }
}
