use bookclub_shared::date::format_price;
use bookclub_shared::{Product, ProductId};
use leptos::prelude::*;
use leptos::task::spawn_local;

use super::forms::ProductFormState;
use super::{Notifier, TextArea, TextField};
use crate::api;
use crate::components::file_drop::FileDrop;
use crate::components::icons::*;
use crate::components::layout::Spinner;
use crate::components::modal::{Modal, confirm};
use crate::components::table_ui::{HiddenBar, Pager, SearchBox, SortHeader, TableControls};
use crate::config::{ADMIN_PAGE_SIZE, cover_or_placeholder};
use crate::table::{ProductSort, SortConfig};

#[component]
pub fn ProductsManager() -> impl IntoView {
    let notify = Notifier::new();
    let (products, set_products) = signal(Vec::<Product>::new());
    let (loading, set_loading) = signal(true);
    let table = TableControls::new(SortConfig::asc(ProductSort::Name));

    let form = ProductFormState::new();
    let editing = RwSignal::new(Option::<ProductId>::None);
    let modal_open = RwSignal::new(false);
    let (saving, set_saving) = signal(false);

    let load = move || {
        spawn_local(async move {
            match api::client().list_products().await {
                Ok(list) => set_products.set(list),
                Err(e) => notify.failed(&e, "Не удалось загрузить товары"),
            }
            set_loading.set(false);
        });
    };
    load();

    let current = Memo::new(move |_| {
        let query = table.snapshot();
        table
            .hidden
            .with(|hidden| products.with(|all| query.apply(all, hidden, ADMIN_PAGE_SIZE)))
    });

    let open_create = move |_| {
        form.reset();
        editing.set(None);
        modal_open.set(true);
    };
    // 编辑前重新读取，避免用列表中的旧数据覆盖别人的修改
    let open_edit = move |product: &Product| {
        let id = product.id;
        form.fill(product);
        editing.set(Some(id));
        modal_open.set(true);
        spawn_local(async move {
            match api::client().get_product(id).await {
                Ok(fresh) if editing.get_untracked() == Some(id) => form.fill(&fresh),
                Ok(_) => {}
                Err(e) => log_warn!("[admin] could not refresh product {}: {}", id, e),
            }
        });
    };

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let payload = match form.to_form() {
            Ok(payload) => payload,
            Err(msg) => return notify.invalid(msg),
        };
        let image = form.image.get_untracked();
        let target = editing.get_untracked();

        set_saving.set(true);
        spawn_local(async move {
            let client = api::client();
            let result = match target {
                Some(id) => client.update_product(id, &payload, image).await,
                None => client.create_product(&payload, image).await,
            };
            match result {
                Ok(_) => {
                    notify.done("Товар сохранён");
                    modal_open.set(false);
                    load();
                }
                Err(e) => notify.failed(&e, "Не удалось сохранить товар"),
            }
            set_saving.set(false);
        });
    };

    let delete = move |id: ProductId, name: String| {
        if !confirm(&format!("Удалить товар «{}»?", name)) {
            return;
        }
        spawn_local(async move {
            match api::client().delete_product(id).await {
                Ok(()) => {
                    set_products.update(|list| list.retain(|p| p.id != id));
                    notify.done("Товар удалён");
                }
                Err(e) => notify.failed(&e, "Не удалось удалить товар"),
            }
        });
    };

    view! {
        <div class="flex flex-wrap items-center justify-between gap-4 mb-4">
            <SearchBox query=table.query page=table.page placeholder="Название или категория" />
            <button class="btn btn-primary btn-sm" on:click=open_create>
                <Plus attr:class="h-4 w-4" />
                "Добавить товар"
            </button>
        </div>
        <HiddenBar hidden=table.hidden />

        <Show when=move || !loading.get() fallback=|| view! { <Spinner /> }>
            <div class="overflow-x-auto bg-base-100 rounded-box shadow">
                <table class="table table-zebra">
                    <thead>
                        <tr>
                            <th></th>
                            <SortHeader label="Название" column=ProductSort::Name sort=table.sort />
                            <SortHeader label="Категория" column=ProductSort::Category sort=table.sort />
                            <SortHeader label="Цена" column=ProductSort::Price sort=table.sort />
                            <SortHeader label="Остаток" column=ProductSort::Stock sort=table.sort />
                            <th></th>
                        </tr>
                    </thead>
                    <tbody>
                        <For
                            each=move || current.with(|p| p.items.clone())
                            key=|p| (p.id, p.name.clone(), p.stock)
                            children=move |product| {
                                let id = product.id;
                                let name = product.name.clone();
                                let for_edit = product.clone();
                                view! {
                                    <tr>
                                        <td>
                                            <img class="h-10 w-10 object-cover rounded" src=cover_or_placeholder(product.image_url.as_deref()) alt="" />
                                        </td>
                                        <td class="font-medium">{product.name.clone()}</td>
                                        <td>{product.category.clone()}</td>
                                        <td>{format_price(product.price)}</td>
                                        <td>
                                            <span class=if product.stock == 0 { "text-error font-semibold" } else { "" }>{product.stock}</span>
                                        </td>
                                        <td class="whitespace-nowrap text-right">
                                            <button class="btn btn-ghost btn-xs" on:click=move |_| open_edit(&for_edit)>
                                                <Pencil attr:class="h-4 w-4" />
                                            </button>
                                            <button class="btn btn-ghost btn-xs" on:click=move |_| table.hide(id)>
                                                <EyeOff attr:class="h-4 w-4" />
                                            </button>
                                            <button class="btn btn-ghost btn-xs text-error" on:click=move |_| delete(id, name.clone())>
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
            title=Signal::derive(move || if editing.get().is_some() { "Редактирование товара".to_string() } else { "Новый товар".to_string() })
        >
            <form class="grid gap-4" on:submit=on_submit>
                <TextField label="Название" value=form.name />
                <TextField label="Категория" value=form.category placeholder="Кружки, блокноты, сумки..." />
                <div class="grid grid-cols-2 gap-4">
                    <TextField label="Цена, ₽" value=form.price />
                    <TextField label="Остаток" value=form.stock kind="number" />
                </div>
                <TextArea label="Описание" value=form.description />
                <FileDrop label="Изображение" accept="image/*" selected=form.image />
                <div class="modal-action">
                    <button type="button" class="btn" on:click=move |_| modal_open.set(false)>"Отмена"</button>
                    <button type="submit" class="btn btn-primary" disabled=move || saving.get()>"Сохранить"</button>
                </div>
            </form>
        </Modal>
    }
}
