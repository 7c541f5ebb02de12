use bookclub_shared::date::format_price;
use bookclub_shared::{Book, BookId};
use leptos::prelude::*;
use leptos::task::spawn_local;

use super::forms::BookFormState;
use super::{Notifier, TextArea, TextField};
use crate::api;
use crate::components::file_drop::FileDrop;
use crate::components::icons::*;
use crate::components::layout::Spinner;
use crate::components::modal::{Modal, confirm};
use crate::components::table_ui::{HiddenBar, Pager, SearchBox, SortHeader, TableControls};
use crate::config::{ADMIN_PAGE_SIZE, cover_or_placeholder};
use crate::table::{BookSort, SortConfig};

#[component]
pub fn BooksManager() -> impl IntoView {
    let notify = Notifier::new();
    let (books, set_books) = signal(Vec::<Book>::new());
    let (loading, set_loading) = signal(true);
    let table = TableControls::new(SortConfig::asc(BookSort::Title));

    let form = BookFormState::new();
    let editing = RwSignal::new(Option::<BookId>::None);
    let modal_open = RwSignal::new(false);
    let (saving, set_saving) = signal(false);

    let load = move || {
        spawn_local(async move {
            match api::client().list_books().await {
                Ok(list) => set_books.set(list),
                Err(e) => notify.failed(&e, "Не удалось загрузить книги"),
            }
            set_loading.set(false);
        });
    };
    load();

    let current = Memo::new(move |_| {
        let query = table.snapshot();
        table
            .hidden
            .with(|hidden| books.with(|all| query.apply(all, hidden, ADMIN_PAGE_SIZE)))
    });

    let open_create = move |_| {
        form.reset();
        editing.set(None);
        modal_open.set(true);
    };
    let open_edit = move |book: &Book| {
        form.fill(book);
        editing.set(Some(book.id));
        modal_open.set(true);
    };

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let payload = match form.to_form() {
            Ok(payload) => payload,
            Err(msg) => return notify.invalid(msg),
        };
        let (cover, file) = (form.cover.get_untracked(), form.file.get_untracked());
        let target = editing.get_untracked();

        set_saving.set(true);
        spawn_local(async move {
            let client = api::client();
            let result = match target {
                Some(id) => client.update_book(id, &payload, cover, file).await,
                None => client.create_book(&payload, cover, file).await,
            };
            match result {
                Ok(saved) => {
                    log_info!("[admin] saved book {}", saved.id);
                    notify.done(if target.is_some() { "Книга обновлена" } else { "Книга добавлена" });
                    modal_open.set(false);
                    load();
                }
                Err(e) => notify.failed(&e, "Не удалось сохранить книгу"),
            }
            set_saving.set(false);
        });
    };

    let delete = move |id: BookId, title: String| {
        if !confirm(&format!("Удалить книгу «{}» без возможности восстановления?", title)) {
            return;
        }
        spawn_local(async move {
            match api::client().delete_book(id).await {
                Ok(()) => {
                    set_books.update(|list| list.retain(|b| b.id != id));
                    notify.done("Книга удалена");
                }
                Err(e) => notify.failed(&e, "Не удалось удалить книгу"),
            }
        });
    };

    view! {
        <div class="flex flex-wrap items-center justify-between gap-4 mb-4">
            <SearchBox query=table.query page=table.page placeholder="Название, автор или жанр" />
            <button class="btn btn-primary btn-sm" on:click=open_create>
                <Plus attr:class="h-4 w-4" />
                "Добавить книгу"
            </button>
        </div>
        <HiddenBar hidden=table.hidden />

        <Show when=move || !loading.get() fallback=|| view! { <Spinner /> }>
            <div class="overflow-x-auto bg-base-100 rounded-box shadow">
                <table class="table table-zebra">
                    <thead>
                        <tr>
                            <th></th>
                            <SortHeader label="Название" column=BookSort::Title sort=table.sort />
                            <SortHeader label="Автор" column=BookSort::Author sort=table.sort />
                            <SortHeader label="Цена" column=BookSort::Price sort=table.sort />
                            <SortHeader label="Остаток" column=BookSort::Stock sort=table.sort />
                            <th></th>
                        </tr>
                    </thead>
                    <tbody>
                        <For
                            each=move || current.with(|p| p.items.clone())
                            key=|b| (b.id, b.title.clone(), b.stock)
                            children=move |book| {
                                let id = book.id;
                                let title = book.title.clone();
                                let for_edit = book.clone();
                                view! {
                                    <tr>
                                        <td>
                                            <img class="h-12 w-9 object-cover rounded" src=cover_or_placeholder(book.cover_url.as_deref()) alt="" />
                                        </td>
                                        <td>
                                            <div class="font-medium">{book.title.clone()}</div>
                                            <div class="text-xs opacity-60">{book.genres.join(", ")}</div>
                                        </td>
                                        <td>{book.author.clone()}</td>
                                        <td>{format_price(book.price)}</td>
                                        <td>{book.stock}</td>
                                        <td class="whitespace-nowrap text-right">
                                            <button class="btn btn-ghost btn-xs" title="Изменить" on:click=move |_| open_edit(&for_edit)>
                                                <Pencil attr:class="h-4 w-4" />
                                            </button>
                                            <button class="btn btn-ghost btn-xs" title="Скрыть из списка" on:click=move |_| table.hide(id)>
                                                <EyeOff attr:class="h-4 w-4" />
                                            </button>
                                            <button class="btn btn-ghost btn-xs text-error" title="Удалить" on:click=move |_| delete(id, title.clone())>
                                                <Trash2 attr:class="h-4 w-4" />
                                            </button>
                                        </td>
                                    </tr>
                                }
                            }
                        />
                    </tbody>
                </table>
            </div>
            <Pager current=current page=table.page />
        </Show>

        <Modal
            open=modal_open
            wide=true
            title=Signal::derive(move || if editing.get().is_some() { "Редактирование книги".to_string() } else { "Новая книга".to_string() })
        >
            <form class="grid gap-4" on:submit=on_submit>
                <div class="grid md:grid-cols-2 gap-4">
                    <TextField label="Название" value=form.title />
                    <TextField label="Автор" value=form.author />
                    <TextField label="Цена, ₽" value=form.price kind="text" placeholder="499,90" />
                    <TextField label="Остаток" value=form.stock kind="number" />
                </div>
                <TextField label="Жанры через запятую" value=form.genres placeholder="Роман, Классика" />
                <TextArea label="Описание" value=form.description />
                <div class="grid md:grid-cols-2 gap-4">
                    <FileDrop label="Обложка" accept="image/*" selected=form.cover />
                    <FileDrop label="Файл книги" accept=".pdf,.epub,.fb2" selected=form.file />
                </div>
                <Show when=move || editing.get().is_some()>
                    <p class="text-xs opacity-60">"Если файлы не выбраны, останутся текущие."</p>
                </Show>
                <div class="modal-action">
                    <button type="button" class="btn" on:click=move |_| modal_open.set(false)>"Отмена"</button>
                    <button type="submit" class="btn btn-primary" disabled=move || saving.get()>"Сохранить"</button>
                </div>
            </form>
        </Modal>
    }
}
