//! 首页：轮播、推荐书目与近期活动
//!
//! 轮播数据取自 `/slider/books`；后端没有数据或请求失败时显示三本占位书。

use bookclub_shared::date::format_datetime;
use bookclub_shared::{Book, Event, SliderBook};
use chrono::NaiveDateTime;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api;
use crate::components::catalog::BookCard;
use crate::components::icons::*;
use crate::config::{FEATURED_BOOKS, SLIDER_INTERVAL, UPCOMING_EVENTS, cover_or_placeholder};
use crate::error::ApiResult;
use crate::web::clock;
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};

fn placeholder_slides() -> Vec<SliderBook> {
    [
        ("Книга месяца", "Скоро объявим"),
        ("Новинки клуба", "Следите за обновлениями"),
        ("Выбор читателей", "Голосование открыто"),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (title, author))| SliderBook {
        id: -(i as i64) - 1,
        book_id: 0,
        title: title.to_string(),
        author: author.to_string(),
        cover_url: None,
        position: i as i32,
    })
    .collect()
}

/// 按位置排序；为空或失败时退回占位
fn slides_or_placeholder(result: ApiResult<Vec<SliderBook>>) -> Vec<SliderBook> {
    match result {
        Ok(mut slides) if !slides.is_empty() => {
            slides.sort_by_key(|s| s.position);
            slides
        }
        Ok(_) => placeholder_slides(),
        Err(e) => {
            log_warn!("[home] slider unavailable, using placeholders: {}", e);
            placeholder_slides()
        }
    }
}

/// 尚未开始的活动，按开始时间排序
fn upcoming(events: Vec<Event>, now: NaiveDateTime, limit: usize) -> Vec<Event> {
    let mut events: Vec<Event> = events.into_iter().filter(|e| e.starts_at >= now).collect();
    events.sort_by_key(|e| e.starts_at);
    events.truncate(limit);
    events
}

#[component]
fn Slider() -> impl IntoView {
    let router = use_router();
    let (slides, set_slides) = signal(Vec::<SliderBook>::new());
    let (index, set_index) = signal(0usize);

    spawn_local(async move {
        let result = api::client().slider_books().await;
        set_slides.set(slides_or_placeholder(result));
    });

    let len = move || slides.with(Vec::len).max(1);
    let next = move || set_index.update(|i| *i = (*i + 1) % len());
    let prev = move || set_index.update(|i| *i = (*i + len() - 1) % len());

    if let Ok(handle) = set_interval_with_handle(next, SLIDER_INTERVAL) {
        on_cleanup(move || handle.clear());
    }

    let current = move || slides.with(|s| s.get(index.get() % len()).cloned());

    view! {
        <div class="relative rounded-box overflow-hidden bg-gradient-to-r from-primary/20 to-secondary/20 mb-10">
            {move || current().map(|slide| {
                let book_id = slide.book_id;
                view! {
                    <div class="flex flex-col md:flex-row items-center gap-8 p-8 min-h-72">
                        <img class="h-56 rounded shadow-lg" src=cover_or_placeholder(slide.cover_url.as_deref()) alt=slide.title.clone() />
                        <div>
                            <h2 class="text-3xl font-bold">{slide.title.clone()}</h2>
                            <p class="text-lg mt-2 text-base-content/70">{slide.author.clone()}</p>
                            <Show when=move || { book_id > 0 }>
                                <button
                                    class="btn btn-primary mt-6"
                                    on:click=move |_| router.navigate_to(AppRoute::BookDetail(book_id))
                                >
                                    "Подробнее"
                                </button>
                            </Show>
                        </div>
                    </div>
                }
            })}
            <button class="btn btn-circle btn-sm absolute left-2 top-1/2" on:click=move |_| prev()>
                <ChevronLeft attr:class="h-4 w-4" />
            </button>
            <button class="btn btn-circle btn-sm absolute right-2 top-1/2" on:click=move |_| next()>
                <ChevronRight attr:class="h-4 w-4" />
            </button>
            <div class="absolute bottom-3 w-full flex justify-center gap-2">
                {move || (0..slides.with(Vec::len)).map(|i| view! {
                    <button
                        class=move || if index.get() % len() == i { "w-3 h-3 rounded-full bg-primary" } else { "w-3 h-3 rounded-full bg-base-300" }
                        on:click=move |_| set_index.set(i)
                    ></button>
                }).collect_view()}
            </div>
        </div>
    }
}

#[component]
pub fn HomePage() -> impl IntoView {
    let (books, set_books) = signal(Vec::<Book>::new());
    let (events, set_events) = signal(Vec::<Event>::new());

    spawn_local(async move {
        match api::client().list_books().await {
            Ok(mut list) => {
                list.truncate(FEATURED_BOOKS);
                set_books.set(list);
            }
            Err(e) => log_warn!("[home] featured books unavailable: {}", e),
        }
    });
    spawn_local(async move {
        match api::client().list_events().await {
            Ok(list) => set_events.set(upcoming(list, clock::now(), UPCOMING_EVENTS)),
            Err(e) => log_warn!("[home] events unavailable: {}", e),
        }
    });

    view! {
        <Slider />

        <section class="mb-10">
            <div class="flex items-center justify-between mb-4">
                <h2 class="text-2xl font-bold">"Популярные книги"</h2>
                <Link to=AppRoute::Catalog class="btn btn-ghost btn-sm">"Весь каталог"</Link>
            </div>
            <div class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-4 gap-6">
                <For each=move || books.get() key=|b| b.id children=|book| view! { <BookCard book=book /> } />
            </div>
        </section>

        <Show when=move || events.with(|e| !e.is_empty())>
            <section>
                <div class="flex items-center justify-between mb-4">
                    <h2 class="text-2xl font-bold">"Ближайшие встречи"</h2>
                    <Link to=AppRoute::Events class="btn btn-ghost btn-sm">"Все мероприятия"</Link>
                </div>
                <div class="grid md:grid-cols-3 gap-6">
                    <For
                        each=move || events.get()
                        key=|e| e.id
                        children=|event| view! {
                            <div class="card bg-base-100 shadow">
                                <div class="card-body">
                                    <h3 class="card-title">{event.title}</h3>
                                    <p class="flex items-center gap-2 text-sm">
                                        <Calendar attr:class="h-4 w-4" />
                                        {format_datetime(event.starts_at)}
                                    </p>
                                    <p class="flex items-center gap-2 text-sm">
                                        <MapPin attr:class="h-4 w-4" />
                                        {event.location}
                                    </p>
                                </div>
                            </div>
                        }
                    />
                </div>
            </section>
        </Show>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use chrono::NaiveDate;

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, day)
            .and_then(|d| d.and_hms_opt(19, 0, 0))
            .unwrap()
    }

    fn event(id: i64, day: u32) -> Event {
        Event {
            id,
            title: format!("Встреча {}", id),
            description: String::new(),
            location: "Библиотека".to_string(),
            starts_at: at(day),
            capacity: 20,
            image_url: None,
            organizer_id: None,
        }
    }

    #[test]
    fn slider_falls_back_to_three_placeholders() {
        assert_eq!(slides_or_placeholder(Ok(vec![])).len(), 3);
        assert_eq!(
            slides_or_placeholder(Err(ApiError::network("offline"))).len(),
            3
        );
    }

    #[test]
    fn slider_orders_by_position() {
        let mut slides = placeholder_slides();
        slides.reverse();
        let ordered = slides_or_placeholder(Ok(slides));
        assert_eq!(
            ordered.iter().map(|s| s.position).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn upcoming_skips_past_events() {
        let events = vec![event(1, 3), event(2, 20), event(3, 12), event(4, 25)];
        let next = upcoming(events, at(10), 2);
        assert_eq!(next.iter().map(|e| e.id).collect::<Vec<_>>(), vec![3, 2]);
    }
}
