use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::{sign_out, use_auth};
use crate::cart::use_cart;
use crate::components::icons::*;
use crate::components::toast::ToastHost;
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};

/// 顶部导航链接，当前页面高亮
#[component]
fn NavLink(to: AppRoute, children: Children) -> impl IntoView {
    let router = use_router();
    let href = to.to_path();
    let target = to.clone();
    let class = move || {
        if router.current_route().get() == target {
            "btn btn-ghost btn-sm btn-active"
        } else {
            "btn btn-ghost btn-sm"
        }
    };

    view! {
        <a
            href=href
            class=class
            on:click=move |ev: web_sys::MouseEvent| {
                ev.prevent_default();
                router.navigate_to(to.clone());
            }
        >
            {children()}
        </a>
    }
}

#[component]
pub fn Header() -> impl IntoView {
    let auth = use_auth();
    let cart = use_cart();
    let item_count = cart.item_count();

    let on_logout = move |_| {
        spawn_local(async move { sign_out(&auth).await });
    };

    view! {
        <header class="navbar bg-base-100 shadow-md sticky top-0 z-40">
            <div class="flex-1 gap-2">
                <Link to=AppRoute::Home class="btn btn-ghost text-xl gap-2">
                    <BookOpen attr:class="h-6 w-6 text-primary" />
                    "Книжный клуб"
                </Link>
                <nav class="hidden md:flex gap-1">
                    <NavLink to=AppRoute::Catalog>"Каталог"</NavLink>
                    <NavLink to=AppRoute::Shop>"Мерч"</NavLink>
                    <NavLink to=AppRoute::Events>"Мероприятия"</NavLink>
                </nav>
            </div>
            <div class="flex-none gap-2">
                <Show
                    when=move || auth.session().is_authorized
                    fallback=|| view! {
                        <Link to=AppRoute::Login class="btn btn-ghost btn-sm">"Войти"</Link>
                        <Link to=AppRoute::Register class="btn btn-primary btn-sm">"Регистрация"</Link>
                    }
                >
                    <Link to=AppRoute::Cart class="btn btn-ghost btn-circle">
                        <div class="indicator">
                            <ShoppingCart attr:class="h-5 w-5" />
                            <Show when=move || { item_count.get() > 0 }>
                                <span class="badge badge-sm badge-primary indicator-item">
                                    {move || item_count.get()}
                                </span>
                            </Show>
                        </div>
                    </Link>
                    <div class="dropdown dropdown-end">
                        <div tabindex="0" role="button" class="btn btn-ghost btn-circle">
                            <UserIcon attr:class="h-5 w-5" />
                        </div>
                        <ul tabindex="0" class="dropdown-content z-[1] menu p-2 shadow bg-base-100 rounded-box w-56">
                            <li>
                                <Link to=AppRoute::Profile>"Профиль"</Link>
                            </li>
                            <Show when=move || auth.session().can_manage_events()>
                                <li>
                                    <Link to=AppRoute::Admin(None)>
                                        <ShieldCheck attr:class="h-4 w-4" />
                                        "Админ-панель"
                                    </Link>
                                </li>
                            </Show>
                            <li>
                                <a on:click=on_logout class="text-error">
                                    <LogOut attr:class="h-4 w-4" />
                                    "Выйти"
                                </a>
                            </li>
                        </ul>
                    </div>
                </Show>
            </div>
        </header>
    }
}

#[component]
pub fn Footer() -> impl IntoView {
    view! {
        <footer class="footer footer-center p-6 bg-base-300 text-base-content/70">
            <aside>
                <p>"Книжный клуб: читаем, обсуждаем, встречаемся."</p>
            </aside>
        </footer>
    }
}

/// 页面骨架：导航、内容区、页脚与通知
#[component]
pub fn Layout(children: Children) -> impl IntoView {
    view! {
        <div class="min-h-screen flex flex-col bg-base-200">
            <Header />
            <main class="flex-1 w-full max-w-7xl mx-auto p-4 md:p-8">{children()}</main>
            <Footer />
            <ToastHost />
        </div>
    }
}

/// 加载中的占位
#[component]
pub fn Spinner() -> impl IntoView {
    view! {
        <div class="flex justify-center py-12">
            <span class="loading loading-spinner loading-lg text-primary"></span>
        </div>
    }
}

#[component]
pub fn NotFoundPage() -> impl IntoView {
    view! {
        <div class="text-center py-24">
            <h1 class="text-6xl font-bold text-error">"404"</h1>
            <p class="text-xl mt-4">"Страница не найдена"</p>
            <Link to=AppRoute::Home class="btn btn-primary mt-6">"На главную"</Link>
        </div>
    }
}
