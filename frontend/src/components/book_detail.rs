use bookclub_shared::date::format_price;
use bookclub_shared::{Book, BookId};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api;
use crate::cart::use_cart;
use crate::components::cart_page::use_add_to_cart;
use crate::components::icons::*;
use crate::components::layout::Spinner;
use crate::config::{asset_url, cover_or_placeholder};
use crate::error::ApiErrorKind;
use crate::web::route::AppRoute;
use crate::web::router::Link;

#[component]
pub fn BookDetailPage(id: BookId) -> impl IntoView {
    let add_to_cart = use_add_to_cart();
    let cart = use_cart();
    let in_cart = move || cart.state.with(|c| c.quantity_of(id));
    let (book, set_book) = signal(Option::<Book>::None);
    let (error, set_error) = signal(Option::<String>::None);

    spawn_local(async move {
        match api::client().get_book(id).await {
            Ok(b) => set_book.set(Some(b)),
            Err(e) => {
                log_error!("{}", e);
                let msg = if e.kind == ApiErrorKind::NotFound {
                    "Книга не найдена".to_string()
                } else {
                    e.user_message("Не удалось загрузить книгу")
                };
                set_error.set(Some(msg));
            }
        }
    });

    let details = move || {
        book.get().map(|b| {
            let in_stock = b.stock > 0;
            let download = b.file_url.clone().filter(|u| !u.trim().is_empty());
            view! {
                <div class="card lg:card-side bg-base-100 shadow-xl">
                    <figure class="lg:w-1/3 bg-base-200">
                        <img class="object-cover w-full" src=cover_or_placeholder(b.cover_url.as_deref()) alt=b.title.clone() />
                    </figure>
                    <div class="card-body lg:w-2/3">
                        <h1 class="card-title text-3xl">{b.title.clone()}</h1>
                        <p class="text-lg text-base-content/70">{b.author.clone()}</p>
                        <div class="flex flex-wrap gap-2">
                            {b.genres
                                .iter()
                                .map(|g| view! { <span class="badge badge-secondary badge-outline">{g.clone()}</span> })
                                .collect_view()}
                        </div>
                        <p class="whitespace-pre-line mt-4">{b.description.clone()}</p>
                        <div class="flex items-center gap-4 mt-4">
                            <span class="text-2xl font-bold">{format_price(b.price)}</span>
                            <span class=if in_stock { "badge badge-success" } else { "badge badge-ghost" }>
                                {if in_stock { format!("В наличии: {}", b.stock) } else { "Нет в наличии".to_string() }}
                            </span>
                        </div>
                        <div class="card-actions mt-4">
                            <button class="btn btn-primary gap-2" disabled=!in_stock on:click=move |_| add_to_cart(id)>
                                <ShoppingCart attr:class="h-4 w-4" />
                                "В корзину"
                            </button>
                            <Show when=move || { in_cart() > 0 }>
                                <span class="text-sm text-base-content/70">{move || format!("В корзине: {}", in_cart())}</span>
                            </Show>
                            {download.map(|url| view! {
                                <a class="btn btn-outline gap-2" href=asset_url(&url) target="_blank" rel="noopener">
                                    <BookOpen attr:class="h-4 w-4" />
                                    "Читать фрагмент"
                                </a>
                            })}
                        </div>
                    </div>
                </div>
            }
        })
    };

    view! {
        <div class="mb-4">
            <Link to=AppRoute::Catalog class="btn btn-ghost btn-sm gap-1">
                <ChevronLeft attr:class="h-4 w-4" />
                "Назад в каталог"
            </Link>
        </div>
        {move || match (error.get(), book.with(Option::is_some)) {
            (Some(msg), _) => view! { <div role="alert" class="alert alert-error">{msg}</div> }.into_any(),
            (None, false) => view! { <Spinner /> }.into_any(),
            (None, true) => details().into_any(),
        }}
    }
}
