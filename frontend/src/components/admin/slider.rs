use bookclub_shared::{Book, BookId, SliderBook};
use leptos::prelude::*;
use leptos::task::spawn_local;

use super::Notifier;
use crate::api;
use crate::components::icons::*;
use crate::components::layout::Spinner;
use crate::components::table_ui::{Pager, SearchBox, TableControls};
use crate::config::{ADMIN_PAGE_SIZE, cover_or_placeholder};
use crate::table::{BookSort, SoftDeleteSet, SortConfig};

/// 还没有放进轮播的书
fn available_books(books: &[Book], slides: &[SliderBook]) -> Vec<Book> {
    books
        .iter()
        .filter(|b| !slides.iter().any(|s| s.book_id == b.id))
        .cloned()
        .collect()
}

#[component]
pub fn SliderManager() -> impl IntoView {
    let notify = Notifier::new();
    let (slides, set_slides) = signal(Vec::<SliderBook>::new());
    let (books, set_books) = signal(Vec::<Book>::new());
    let (loading, set_loading) = signal(true);
    let table = TableControls::new(SortConfig::asc(BookSort::Title));

    let load_slides = move || {
        spawn_local(async move {
            match api::client().admin_slider_books().await {
                Ok(mut list) => {
                    list.sort_by_key(|s| s.position);
                    set_slides.set(list);
                }
                Err(e) => notify.failed(&e, "Не удалось загрузить слайдер"),
            }
            set_loading.set(false);
        });
    };
    load_slides();
    spawn_local(async move {
        match api::client().list_books().await {
            Ok(list) => set_books.set(list),
            Err(e) => notify.failed(&e, "Не удалось загрузить книги"),
        }
    });

    let candidates = Memo::new(move |_| {
        let query = table.snapshot();
        let pool = books.with(|b| slides.with(|s| available_books(b, s)));
        query.apply(&pool, &SoftDeleteSet::new(), ADMIN_PAGE_SIZE)
    });

    let add = move |book_id: BookId| {
        spawn_local(async move {
            match api::client().add_slider_book(book_id).await {
                Ok(()) => {
                    notify.done("Книга добавлена в слайдер");
                    load_slides();
                }
                Err(e) => notify.failed(&e, "Не удалось добавить книгу в слайдер"),
            }
        });
    };
    let remove = move |book_id: BookId| {
        spawn_local(async move {
            match api::client().remove_slider_book(book_id).await {
                Ok(()) => {
                    set_slides.update(|list| list.retain(|s| s.book_id != book_id));
                    notify.done("Книга убрана из слайдера");
                }
                Err(e) => notify.failed(&e, "Не удалось убрать книгу из слайдера"),
            }
        });
    };

    view! {
        <Show when=move || !loading.get() fallback=|| view! { <Spinner /> }>
            <div class="grid xl:grid-cols-2 gap-6">
                <div class="card bg-base-100 shadow">
                    <div class="card-body">
                        <h2 class="card-title">"Сейчас на главной"</h2>
                        <Show
                            when=move || slides.with(|s| !s.is_empty())
                            fallback=|| view! { <p class="opacity-60">"Слайдер пуст, на главной показываются заглушки"</p> }
                        >
                            <ul class="space-y-2">
                                <For
                                    each=move || slides.get()
                                    key=|s| s.id
                                    children=move |slide| {
                                        let book_id = slide.book_id;
                                        view! {
                                            <li class="flex items-center gap-3">
                                                <img class="h-12 w-9 object-cover rounded" src=cover_or_placeholder(slide.cover_url.as_deref()) alt="" />
                                                <div class="flex-1">
                                                    <div class="font-medium">{slide.title.clone()}</div>
                                                    <div class="text-xs opacity-60">{slide.author.clone()}</div>
                                                </div>
                                                <button class="btn btn-ghost btn-xs text-error" on:click=move |_| remove(book_id)>
                                                    <XIcon attr:class="h-4 w-4" />
                                                </button>
                                            </li>
                                        }
                                    }
                                />
                            </ul>
                        </Show>
                    </div>
                </div>

                <div class="card bg-base-100 shadow">
                    <div class="card-body">
                        <h2 class="card-title">"Добавить книгу"</h2>
                        <SearchBox query=table.query page=table.page placeholder="Поиск по каталогу" />
                        <ul class="space-y-2 mt-2">
                            <For
                                each=move || candidates.with(|p| p.items.clone())
                                key=|b| b.id
                                children=move |book| {
                                    let id = book.id;
                                    view! {
                                        <li class="flex items-center gap-3">
                                            <div class="flex-1">
                                                <div class="font-medium">{book.title.clone()}</div>
                                                <div class="text-xs opacity-60">{book.author.clone()}</div>
                                            </div>
                                            <button class="btn btn-primary btn-xs" on:click=move |_| add(id)>
                                                <Plus attr:class="h-4 w-4" />
                                            </button>
                                        </li>
                                    }
                                }
                            />
                        </ul>
                        <Pager current=candidates page=table.page />
                    </div>
                </div>
            </div>
        </Show>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(id: i64) -> Book {
        Book {
            id,
            title: format!("Книга {}", id),
            author: String::new(),
            description: String::new(),
            price: 0.0,
            genres: vec![],
            cover_url: None,
            file_url: None,
            stock: 0,
        }
    }

    #[test]
    fn slider_books_are_not_offered_again() {
        let slides = vec![SliderBook {
            id: 10,
            book_id: 2,
            title: "Книга 2".to_string(),
            author: String::new(),
            cover_url: None,
            position: 0,
        }];
        let offered = available_books(&[book(1), book(2), book(3)], &slides);
        assert_eq!(offered.iter().map(|b| b.id).collect::<Vec<_>>(), vec![1, 3]);
    }
}
