use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::{login, use_auth};
use crate::components::icons::BookOpen;
use crate::error::ApiErrorKind;
use crate::web::route::AppRoute;
use crate::web::router::Link;

#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = use_auth();

    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let (email, password) = (email.get(), password.get());
        if email.trim().is_empty() || password.is_empty() {
            set_error_msg.set(Some("Заполните все поля".to_string()));
            return;
        }

        set_is_submitting.set(true);
        set_error_msg.set(None);

        spawn_local(async move {
            // 成功后由路由守卫离开登录页
            if let Err(e) = login(&auth, &email, &password).await {
                log_warn!("[login] {}", e);
                let msg = match e.kind {
                    ApiErrorKind::Unauthenticated | ApiErrorKind::InvalidInput
                        if e.server_message.is_none() =>
                    {
                        "Неверный email или пароль".to_string()
                    }
                    _ => e.user_message("Не удалось войти, попробуйте позже"),
                };
                set_error_msg.set(Some(msg));
            }
            set_is_submitting.set(false);
        });
    };

    view! {
        <div class="hero min-h-[70vh]">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-4">
                    <div class="flex flex-col items-center gap-2">
                        <div class="p-3 bg-primary/10 rounded-2xl text-primary">
                            <BookOpen attr:class="h-8 w-8" />
                        </div>
                        <h1 class="text-3xl font-bold">"Вход в клуб"</h1>
                        <p class="text-base-content/70">"Войдите, чтобы делать заказы и записываться на встречи"</p>
                    </div>
                </div>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <Show when=move || error_msg.get().is_some()>
                            <div role="alert" class="alert alert-error text-sm py-2">
                                <span>{move || error_msg.get().unwrap_or_default()}</span>
                            </div>
                        </Show>

                        <div class="form-control">
                            <label for="email" class="label">
                                <span class="label-text">"Email"</span>
                            </label>
                            <input
                                id="email"
                                type="email"
                                autocomplete="username"
                                placeholder="reader@example.com"
                                class="input input-bordered"
                                prop:value=email
                                on:input=move |ev| set_email.set(event_target_value(&ev))
                                required
                            />
                        </div>
                        <div class="form-control">
                            <label for="password" class="label">
                                <span class="label-text">"Пароль"</span>
                            </label>
                            <input
                                id="password"
                                type="password"
                                autocomplete="current-password"
                                class="input input-bordered"
                                prop:value=password
                                on:input=move |ev| set_password.set(event_target_value(&ev))
                                required
                            />
                        </div>
                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                <Show when=move || is_submitting.get()>
                                    <span class="loading loading-spinner"></span>
                                </Show>
                                "Войти"
                            </button>
                        </div>
                        <p class="text-sm text-center mt-2">
                            "Нет аккаунта? "
                            <Link to=AppRoute::Register class="link link-primary">"Зарегистрируйтесь"</Link>
                        </p>
                    </form>
                </div>
            </div>
        </div>
    }
}
