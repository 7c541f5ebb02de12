//! 购物车与下单
//!
//! 购物车的增删由 `CartContext` 完成，这里只负责展示、数量调整和结账表单。

use bookclub_shared::date::format_price;
use bookclub_shared::protocol::CreateOrderRequest;
use bookclub_shared::{CartItem, ProductId};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api;
use crate::auth::use_auth;
use crate::cart::use_cart;
use crate::components::icons::*;
use crate::components::layout::Spinner;
use crate::components::toast::use_toast;
use crate::config::cover_or_placeholder;
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_navigate};

/// "加入购物车" 按钮的处理函数；未登录时提示并跳转到登录页
pub fn use_add_to_cart() -> impl Fn(ProductId) + Copy + Send + Sync + 'static {
    let auth = use_auth();
    let cart = use_cart();
    let toast = use_toast();
    let navigate = use_navigate();
    let navigate = StoredValue::new(navigate);

    move |product_id: ProductId| {
        if !auth.session_untracked().is_authorized {
            toast.info("Войдите, чтобы добавить товар в корзину");
            navigate.with_value(|nav| nav(AppRoute::Login));
            return;
        }
        spawn_local(async move {
            match cart.add_item(product_id, 1).await {
                Ok(()) => toast.success("Добавлено в корзину"),
                Err(e) => {
                    auth.handle_error(&e);
                    toast.api_error(&e, "Не удалось добавить в корзину");
                }
            }
        });
    }
}

#[component]
fn CartRow(item: CartItem) -> impl IntoView {
    let cart = use_cart();
    let auth = use_auth();
    let toast = use_toast();
    let product_id = item.product_id;
    let quantity = item.quantity;

    let change = move |next: u32| {
        spawn_local(async move {
            let result = if next == 0 {
                cart.remove_item(product_id).await
            } else {
                cart.set_quantity(product_id, next).await
            };
            if let Err(e) = result {
                auth.handle_error(&e);
                toast.api_error(&e, "Не удалось изменить корзину");
            }
        });
    };

    view! {
        <tr>
            <td>
                <div class="flex items-center gap-3">
                    <div class="avatar">
                        <div class="mask mask-squircle h-14 w-14">
                            <img src=cover_or_placeholder(item.image_url.as_deref()) alt=item.title.clone() />
                        </div>
                    </div>
                    <span class="font-semibold">{item.title.clone()}</span>
                </div>
            </td>
            <td>{format_price(item.price)}</td>
            <td>
                <div class="join">
                    <button
                        class="btn btn-sm join-item"
                        disabled=move || cart.is_busy().get()
                        on:click=move |_| change(quantity.saturating_sub(1))
                    >
                        <Minus attr:class="h-3 w-3" />
                    </button>
                    <span class="btn btn-sm join-item no-animation">{quantity}</span>
                    <button
                        class="btn btn-sm join-item"
                        disabled=move || cart.is_busy().get()
                        on:click=move |_| change(quantity + 1)
                    >
                        <Plus attr:class="h-3 w-3" />
                    </button>
                </div>
            </td>
            <td class="font-semibold">{format_price(item.subtotal())}</td>
            <td>
                <button class="btn btn-ghost btn-sm text-error" on:click=move |_| change(0)>
                    <Trash2 attr:class="h-4 w-4" />
                </button>
            </td>
        </tr>
    }
}

#[component]
pub fn CartPage() -> impl IntoView {
    let cart = use_cart();
    let auth = use_auth();
    let toast = use_toast();
    let navigate = StoredValue::new(use_navigate());

    let (loading, set_loading) = signal(true);
    let (address, set_address) = signal(String::new());
    let (comment, set_comment) = signal(String::new());
    let (submitting, set_submitting) = signal(false);

    // 进入页面时与服务器同步
    spawn_local(async move {
        if let Err(e) = cart.reload().await {
            auth.handle_error(&e);
            toast.api_error(&e, "Не удалось загрузить корзину");
        }
        set_loading.set(false);
    });

    // 默认使用资料中的地址
    spawn_local(async move {
        if let Ok(user) = api::client().fetch_profile().await {
            if let Some(addr) = user.address.filter(|a| !a.trim().is_empty()) {
                set_address.update(|current| {
                    if current.is_empty() {
                        *current = addr;
                    }
                });
            }
        }
    });

    let total = cart.total_price();
    let count = cart.item_count();

    let on_checkout = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let addr = address.get().trim().to_string();
        if addr.is_empty() {
            toast.error("Укажите адрес доставки");
            return;
        }
        let comment = Some(comment.get().trim().to_string()).filter(|c| !c.is_empty());

        set_submitting.set(true);
        spawn_local(async move {
            let req = CreateOrderRequest {
                address: addr,
                comment,
            };
            match api::client().create_order(&req).await {
                Ok(order) => {
                    log_info!("[cart] order #{} created", order.id);
                    if let Err(e) = cart.clear().await {
                        toast.api_error(&e, "Заказ оформлен, но корзину не удалось очистить");
                    } else {
                        toast.success(format!("Заказ №{} оформлен", order.id));
                    }
                    navigate.with_value(|nav| nav(AppRoute::Profile));
                }
                Err(e) => {
                    auth.handle_error(&e);
                    toast.api_error(&e, "Не удалось оформить заказ");
                }
            }
            set_submitting.set(false);
        });
    };

    view! {
        <h1 class="text-3xl font-bold mb-6">"Корзина"</h1>
        <Show when=move || (!loading.get() || count.get() > 0) fallback=|| view! { <Spinner /> }>
            <Show
                when=move || (count.get() > 0)
                fallback=|| view! {
                    <div class="card bg-base-100 shadow">
                        <div class="card-body items-center text-center">
                            <ShoppingCart attr:class="h-12 w-12 opacity-30" />
                            <p class="text-lg">"Корзина пуста"</p>
                            <Link to=AppRoute::Catalog class="btn btn-primary">"Перейти в каталог"</Link>
                        </div>
                    </div>
                }
            >
                <div class="grid lg:grid-cols-3 gap-6">
                    <div class="lg:col-span-2 card bg-base-100 shadow overflow-x-auto">
                        <table class="table">
                            <thead>
                                <tr>
                                    <th>"Товар"</th>
                                    <th>"Цена"</th>
                                    <th>"Количество"</th>
                                    <th>"Сумма"</th>
                                    <th></th>
                                </tr>
                            </thead>
                            <tbody>
                                <For
                                    each=move || cart.state.get().items
                                    key=|item| (item.product_id, item.quantity)
                                    children=|item| view! { <CartRow item=item /> }
                                />
                            </tbody>
                        </table>
                    </div>

                    <form class="card bg-base-100 shadow" on:submit=on_checkout>
                        <div class="card-body space-y-2">
                            <h2 class="card-title">"Оформление заказа"</h2>
                            <div class="flex justify-between">
                                <span>"Товаров"</span>
                                <span>{move || count.get()}</span>
                            </div>
                            <div class="flex justify-between text-lg font-bold">
                                <span>"Итого"</span>
                                <span>{move || format_price(total.get())}</span>
                            </div>
                            <label class="form-control">
                                <span class="label-text">"Адрес доставки"</span>
                                <textarea
                                    class="textarea textarea-bordered"
                                    required
                                    prop:value=address
                                    on:input=move |ev| set_address.set(event_target_value(&ev))
                                ></textarea>
                            </label>
                            <label class="form-control">
                                <span class="label-text">"Комментарий"</span>
                                <input
                                    type="text"
                                    class="input input-bordered"
                                    prop:value=comment
                                    on:input=move |ev| set_comment.set(event_target_value(&ev))
                                />
                            </label>
                            <button class="btn btn-primary w-full" type="submit" disabled=move || submitting.get() || cart.is_busy().get()>
                                <Show when=move || submitting.get()>
                                    <span class="loading loading-spinner"></span>
                                </Show>
                                "Оформить заказ"
                            </button>
                        </div>
                    </form>
                </div>
            </Show>
        </Show>
    }
}
