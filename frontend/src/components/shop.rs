use bookclub_shared::Product;
use bookclub_shared::date::format_price;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api;
use crate::components::cart_page::use_add_to_cart;
use crate::components::icons::ShoppingCart;
use crate::components::layout::Spinner;
use crate::components::toast::use_toast;
use crate::config::cover_or_placeholder;
use crate::table::{ProductSort, SortConfig, filter_and_sort};

/// 商品按分类分组，分类名排序，无分类的归入"Разное"
fn group_by_category(products: &[Product]) -> Vec<(String, Vec<Product>)> {
    let mut groups: Vec<(String, Vec<Product>)> = Vec::new();
    for p in products {
        let category = match p.category.trim() {
            "" => "Разное".to_string(),
            c => c.to_string(),
        };
        match groups.iter_mut().find(|(name, _)| *name == category) {
            Some((_, items)) => items.push(p.clone()),
            None => groups.push((category, vec![p.clone()])),
        }
    }
    groups.sort_by(|a, b| a.0.cmp(&b.0));
    groups
}

#[component]
fn ProductCard(product: Product) -> impl IntoView {
    let add_to_cart = use_add_to_cart();
    let id = product.id;
    let in_stock = product.stock > 0;

    view! {
        <div class="card bg-base-100 shadow">
            <figure class="h-48 bg-base-200">
                <img class="h-full object-cover" src=cover_or_placeholder(product.image_url.as_deref()) alt=product.name.clone() />
            </figure>
            <div class="card-body p-4">
                <h3 class="card-title text-base">{product.name.clone()}</h3>
                <p class="text-sm text-base-content/70 line-clamp-3">{product.description.clone()}</p>
                <div class="card-actions items-center justify-between mt-2">
                    <span class="text-lg font-bold">{format_price(product.price)}</span>
                    <button class="btn btn-primary btn-sm" disabled=!in_stock on:click=move |_| add_to_cart(id)>
                        <ShoppingCart attr:class="h-4 w-4" />
                        {if in_stock { "В корзину" } else { "Нет в наличии" }}
                    </button>
                </div>
            </div>
        </div>
    }
}

/// 周边商品页
#[component]
pub fn ShopPage() -> impl IntoView {
    let toast = use_toast();
    let (products, set_products) = signal(Vec::<Product>::new());
    let (loading, set_loading) = signal(true);

    spawn_local(async move {
        match api::client().list_products().await {
            Ok(list) => set_products.set(list),
            Err(e) => toast.api_error(&e, "Не удалось загрузить товары"),
        }
        set_loading.set(false);
    });

    let groups = Memo::new(move |_| {
        products.with(|all| {
            let sorted = filter_and_sort(all, "", Some(SortConfig::asc(ProductSort::Name)));
            group_by_category(&sorted)
        })
    });

    view! {
        <h1 class="text-3xl font-bold mb-6">"Мерч клуба"</h1>
        <Show when=move || !loading.get() fallback=|| view! { <Spinner /> }>
            <Show
                when=move || groups.with(|g| !g.is_empty())
                fallback=|| view! { <p class="text-center py-12 text-base-content/60">"Товаров пока нет"</p> }
            >
                <For
                    each=move || groups.get()
                    key=|(name, items)| (name.clone(), items.len())
                    children=|(name, items)| view! {
                        <section class="mb-10">
                            <h2 class="text-xl font-semibold mb-4">{name}</h2>
                            <div class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-4 gap-6">
                                {items.into_iter().map(|p| view! { <ProductCard product=p /> }).collect_view()}
                            </div>
                        </section>
                    }
                />
            </Show>
        </Show>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i64, category: &str) -> Product {
        Product {
            id,
            name: format!("p{}", id),
            description: String::new(),
            price: 10.0,
            category: category.to_string(),
            image_url: None,
            stock: 1,
        }
    }

    #[test]
    fn groups_keep_order_within_category() {
        let products = vec![
            product(1, "Кружки"),
            product(2, ""),
            product(3, "Кружки"),
            product(4, "Блокноты"),
        ];
        let groups = group_by_category(&products);
        let names: Vec<&str> = groups.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Блокноты", "Кружки", "Разное"]);
        assert_eq!(
            groups[1].1.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![1, 3]
        );
    }
}
