use leptos::prelude::*;

/// 基于原生 `<dialog>` 的模态框，由 `open` 信号控制
#[component]
pub fn Modal(
    open: RwSignal<bool>,
    #[prop(into)] title: Signal<String>,
    #[prop(optional)] wide: bool,
    children: Children,
) -> impl IntoView {
    let dialog_ref = NodeRef::<leptos::html::Dialog>::new();

    Effect::new(move |_| {
        let Some(dialog) = dialog_ref.get() else {
            return;
        };
        if open.get() {
            if !dialog.open() {
                if let Err(e) = dialog.show_modal() {
                    log_warn!("[modal] show_modal failed: {:?}", e);
                }
            }
        } else if dialog.open() {
            dialog.close();
        }
    });

    let box_class = if wide {
        "modal-box w-11/12 max-w-3xl"
    } else {
        "modal-box"
    };

    view! {
        <dialog class="modal" node_ref=dialog_ref on:close=move |_| open.set(false)>
            <div class=box_class>
                <h3 class="font-bold text-lg mb-4">{move || title.get()}</h3>
                {children()}
            </div>
            <form method="dialog" class="modal-backdrop">
                <button>"Закрыть"</button>
            </form>
        </dialog>
    }
}

/// 浏览器原生确认框；不可用时视为取消
pub fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}
