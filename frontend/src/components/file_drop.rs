//! 文件选择 / 拖拽区
//!
//! 选中的文件立即读入内存，以 `FilePayload` 交给父组件。

use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::JsCast;
use web_sys::{DragEvent, File, HtmlInputElement};

use crate::api::FilePayload;
use crate::components::icons::{Upload, XIcon};
use crate::components::toast::use_toast;
use crate::web::files::{format_size, read_file};

#[component]
pub fn FileDrop(
    #[prop(into)] label: String,
    /// `accept` 属性，例如 `image/*`
    #[prop(into)]
    accept: String,
    selected: RwSignal<Option<FilePayload>>,
) -> impl IntoView {
    let toast = use_toast();
    let (dragging, set_dragging) = signal(false);

    let load = move |file: File| {
        spawn_local(async move {
            match read_file(&file).await {
                Ok(payload) => selected.set(Some(payload)),
                Err(e) => toast.api_error(&e, "Не удалось прочитать файл"),
            }
        });
    };

    let on_change = move |ev: web_sys::Event| {
        let file = ev
            .target()
            .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
            .and_then(|input| input.files())
            .and_then(|files| files.get(0));
        if let Some(file) = file {
            load(file);
        }
    };

    let on_drop = move |ev: DragEvent| {
        ev.prevent_default();
        set_dragging.set(false);
        let file = ev
            .data_transfer()
            .and_then(|dt| dt.files())
            .and_then(|files| files.get(0));
        if let Some(file) = file {
            load(file);
        }
    };

    let summary = move || {
        selected.with(|f| {
            f.as_ref()
                .map(|f| format!("{} ({})", f.file_name, format_size(f.bytes.len())))
        })
    };

    view! {
        <div class="form-control">
            <span class="label-text mb-1">{label}</span>
            <label
                class=move || {
                    if dragging.get() {
                        "flex items-center gap-3 border-2 border-dashed border-primary rounded-box p-4 cursor-pointer bg-primary/5"
                    } else {
                        "flex items-center gap-3 border-2 border-dashed border-base-300 rounded-box p-4 cursor-pointer"
                    }
                }
                on:dragover=move |ev: DragEvent| {
                    ev.prevent_default();
                    set_dragging.set(true);
                }
                on:dragleave=move |_| set_dragging.set(false)
                on:drop=on_drop
            >
                <Upload attr:class="h-5 w-5 opacity-60" />
                <span class="text-sm flex-1">
                    {move || summary().unwrap_or_else(|| "Перетащите файл или нажмите для выбора".to_string())}
                </span>
                <input type="file" class="hidden" accept=accept on:change=on_change />
            </label>
            <Show when=move || selected.with(Option::is_some)>
                <button
                    type="button"
                    class="btn btn-ghost btn-xs self-start mt-1 gap-1"
                    on:click=move |_| selected.set(None)
                >
                    <XIcon attr:class="h-3 w-3" />
                    "Убрать файл"
                </button>
            </Show>
        </div>
    }
}
