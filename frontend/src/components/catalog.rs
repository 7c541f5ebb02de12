use bookclub_shared::Book;
use bookclub_shared::date::format_price;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api;
use crate::components::cart_page::use_add_to_cart;
use crate::components::icons::ShoppingCart;
use crate::components::layout::Spinner;
use crate::components::table_ui::{Pager, SearchBox};
use crate::components::toast::use_toast;
use crate::config::{CATALOG_PAGE_SIZE, cover_or_placeholder};
use crate::table::{BookSort, SortConfig, filter_and_sort, paginate};
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};

/// 目录排序选项：(值, 标签, 排序列, 是否降序)
const SORT_OPTIONS: [(&str, &str, BookSort, bool); 5] = [
    ("title", "По названию", BookSort::Title, false),
    ("author", "По автору", BookSort::Author, false),
    ("price-asc", "Сначала дешевле", BookSort::Price, false),
    ("price-desc", "Сначала дороже", BookSort::Price, true),
    ("stock", "По наличию", BookSort::Stock, true),
];

fn sort_for(value: &str) -> Option<SortConfig<BookSort>> {
    SORT_OPTIONS
        .iter()
        .find(|(v, ..)| *v == value)
        .map(|(_, _, key, desc)| {
            if *desc {
                SortConfig::desc(*key)
            } else {
                SortConfig::asc(*key)
            }
        })
}

/// 所有书目中出现过的体裁，去重排序
fn collect_genres(books: &[Book]) -> Vec<String> {
    let mut genres: Vec<String> = books
        .iter()
        .flat_map(|b| b.genres.iter().map(|g| g.trim().to_string()))
        .filter(|g| !g.is_empty())
        .collect();
    genres.sort();
    genres.dedup();
    genres
}

#[component]
pub fn BookCard(book: Book) -> impl IntoView {
    let router = use_router();
    let add_to_cart = use_add_to_cart();
    let id = book.id;
    let in_stock = book.stock > 0;

    view! {
        <div class="card bg-base-100 shadow hover:shadow-xl transition-shadow">
            <figure
                class="cursor-pointer h-64 bg-base-200"
                on:click=move |_| router.navigate_to(AppRoute::BookDetail(id))
            >
                <img class="h-full object-cover" src=cover_or_placeholder(book.cover_url.as_deref()) alt=book.title.clone() />
            </figure>
            <div class="card-body p-4">
                <h3 class="card-title text-base">{book.title.clone()}</h3>
                <p class="text-sm text-base-content/70">{book.author.clone()}</p>
                <div class="flex flex-wrap gap-1">
                    {book
                        .genres
                        .iter()
                        .map(|g| view! { <span class="badge badge-outline badge-sm">{g.clone()}</span> })
                        .collect_view()}
                </div>
                <div class="card-actions items-center justify-between mt-2">
                    <span class="text-lg font-bold">{format_price(book.price)}</span>
                    <button
                        class="btn btn-primary btn-sm"
                        disabled=!in_stock
                        on:click=move |_| add_to_cart(id)
                    >
                        <ShoppingCart attr:class="h-4 w-4" />
                        {if in_stock { "В корзину" } else { "Нет в наличии" }}
                    </button>
                </div>
            </div>
        </div>
    }
}

#[component]
pub fn CatalogPage() -> impl IntoView {
    let toast = use_toast();

    let (books, set_books) = signal(Vec::<Book>::new());
    let (loading, set_loading) = signal(true);
    let query = RwSignal::new(String::new());
    let (genre, set_genre) = signal(String::new());
    let (sort, set_sort) = signal("title".to_string());
    let page = RwSignal::new(1usize);

    spawn_local(async move {
        match api::client().list_books().await {
            Ok(list) => set_books.set(list),
            Err(e) => toast.api_error(&e, "Не удалось загрузить каталог"),
        }
        set_loading.set(false);
    });

    let genres = Memo::new(move |_| books.with(|b| collect_genres(b)));

    let visible = Memo::new(move |_| {
        let genre = genre.get();
        books.with(|all| {
            let by_genre: Vec<Book> = all
                .iter()
                .filter(|b| genre.is_empty() || b.genres.iter().any(|g| g.trim() == genre))
                .cloned()
                .collect();
            filter_and_sort(&by_genre, &query.get(), sort_for(&sort.get()))
        })
    });

    let current = Memo::new(move |_| visible.with(|rows| paginate(rows, page.get(), CATALOG_PAGE_SIZE)));

    view! {
        <h1 class="text-3xl font-bold mb-6">"Каталог"</h1>

        <div class="flex flex-col md:flex-row gap-3 mb-6">
            <div class="flex-1">
                <SearchBox query=query page=page placeholder="Название, автор или жанр" />
            </div>
            <select
                class="select select-bordered"
                on:change=move |ev| {
                    set_genre.set(event_target_value(&ev));
                    page.set(1);
                }
            >
                <option value="">"Все жанры"</option>
                <For
                    each=move || genres.get()
                    key=|g| g.clone()
                    children=move |g| {
                        let selected = g.clone();
                        let value = g.clone();
                        view! {
                            <option value=value selected=move || genre.get() == selected>{g}</option>
                        }
                    }
                />
            </select>
            <select class="select select-bordered" on:change=move |ev| set_sort.set(event_target_value(&ev))>
                {SORT_OPTIONS
                    .iter()
                    .map(|(value, label, ..)| view! { <option value=*value>{*label}</option> })
                    .collect_view()}
            </select>
        </div>

        <Show when=move || !loading.get() fallback=|| view! { <Spinner /> }>
            <Show
                when=move || current.with(|p| p.total_items > 0)
                fallback=|| view! { <p class="text-center py-12 text-base-content/60">"Ничего не найдено"</p> }
            >
                <div class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-4 gap-6">
                    <For
                        each=move || current.get().items
                        key=|b| b.id
                        children=|book| view! { <BookCard book=book /> }
                    />
                </div>
                <Pager current=current page=page />
            </Show>
        </Show>

        <p class="text-sm text-base-content/50 mt-6">
            "Ищете сувениры? Загляните в "
            <Link to=AppRoute::Shop class="link link-primary">"магазин мерча"</Link>
            "."
        </p>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(id: i64, genres: &[&str]) -> Book {
        Book {
            id,
            title: format!("Книга {}", id),
            author: "Автор".to_string(),
            description: String::new(),
            price: 100.0,
            genres: genres.iter().map(|g| g.to_string()).collect(),
            cover_url: None,
            file_url: None,
            stock: 1,
        }
    }

    #[test]
    fn genres_are_unique_and_sorted() {
        let books = vec![
            book(1, &["Роман", " Классика "]),
            book(2, &["Классика", ""]),
            book(3, &[]),
        ];
        assert_eq!(collect_genres(&books), vec!["Классика", "Роман"]);
    }

    #[test]
    fn sort_options_resolve() {
        assert_eq!(sort_for("price-desc"), Some(SortConfig::desc(BookSort::Price)));
        assert_eq!(sort_for("title"), Some(SortConfig::asc(BookSort::Title)));
        assert_eq!(sort_for("unknown"), None);
    }
}
