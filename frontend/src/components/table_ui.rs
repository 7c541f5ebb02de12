//! `table` 工具的界面部件：搜索框、可排序表头、分页器

use leptos::prelude::*;

use crate::components::icons::{ChevronLeft, ChevronRight, Eye, Search};
use crate::table::{Page, SoftDeleteSet, SortConfig, TableQuery};

/// 管理表格的交互状态
pub struct TableControls<K: Send + Sync + 'static> {
    pub query: RwSignal<String>,
    pub page: RwSignal<usize>,
    pub sort: RwSignal<SortConfig<K>>,
    pub hidden: RwSignal<SoftDeleteSet>,
}

impl<K: Send + Sync + 'static> Clone for TableControls<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K: Send + Sync + 'static> Copy for TableControls<K> {}

impl<K: Copy + PartialEq + Send + Sync + 'static> TableControls<K> {
    pub fn new(sort: SortConfig<K>) -> Self {
        Self {
            query: RwSignal::new(String::new()),
            page: RwSignal::new(1),
            sort: RwSignal::new(sort),
            hidden: RwSignal::new(SoftDeleteSet::new()),
        }
    }

    /// 当前查询（会建立响应式依赖）
    pub fn snapshot(&self) -> TableQuery<K> {
        TableQuery {
            search: self.query.get(),
            sort: Some(self.sort.get()),
            page: self.page.get(),
        }
    }

    pub fn hide(&self, id: i64) {
        self.hidden.update(|h| h.hide(id));
    }
}

#[component]
pub fn SearchBox(
    query: RwSignal<String>,
    /// 输入变化时回到第一页
    page: RwSignal<usize>,
    #[prop(into)] placeholder: String,
) -> impl IntoView {
    view! {
        <label class="input input-bordered input-sm flex items-center gap-2 w-full md:w-72">
            <Search attr:class="h-4 w-4 opacity-60" />
            <input
                type="search"
                class="grow"
                placeholder=placeholder
                prop:value=move || query.get()
                on:input=move |ev| {
                    query.set(event_target_value(&ev));
                    page.set(1);
                }
            />
        </label>
    }
}

/// 点击切换排序的表头单元格
#[component]
pub fn SortHeader<K>(
    #[prop(into)] label: String,
    column: K,
    sort: RwSignal<SortConfig<K>>,
) -> impl IntoView
where
    K: Copy + PartialEq + Send + Sync + 'static,
{
    let arrow = move || {
        sort.with(|s| s.direction_of(column))
            .map(|d| d.arrow())
            .unwrap_or("")
    };

    view! {
        <th class="cursor-pointer select-none" on:click=move |_| sort.update(|s| *s = s.toggled(column))>
            {label} " " <span class="text-xs opacity-60">{arrow}</span>
        </th>
    }
}

/// 分页器；`page` 为请求的页码，显示的是夹紧后的 `current.page`
#[component]
pub fn Pager<T>(current: Memo<Page<T>>, page: RwSignal<usize>) -> impl IntoView
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    view! {
        <Show when=move || current.with(|p| p.total_pages > 1)>
            <div class="flex items-center justify-between mt-4 gap-4">
                <span class="text-sm text-base-content/60">
                    {move || current.with(|p| format!("Всего: {}", p.total_items))}
                </span>
                <div class="join">
                    <button
                        class="join-item btn btn-sm"
                        disabled=move || !current.with(|p| p.has_prev())
                        on:click=move |_| page.set(current.with_untracked(|p| p.page.saturating_sub(1).max(1)))
                    >
                        <ChevronLeft attr:class="h-4 w-4" />
                    </button>
                    <span class="join-item btn btn-sm no-animation">
                        {move || current.with(|p| format!("{} / {}", p.page, p.total_pages))}
                    </span>
                    <button
                        class="join-item btn btn-sm"
                        disabled=move || !current.with(|p| p.has_next())
                        on:click=move |_| page.set(current.with_untracked(|p| p.page + 1))
                    >
                        <ChevronRight attr:class="h-4 w-4" />
                    </button>
                </div>
            </div>
        </Show>
    }
}

/// 隐藏行计数与"全部显示"
#[component]
pub fn HiddenBar(hidden: RwSignal<SoftDeleteSet>) -> impl IntoView {
    view! {
        <Show when=move || hidden.with(|h| !h.is_empty())>
            <div class="alert alert-info py-2 mb-4 text-sm">
                <span>
                    {move || format!("Скрыто в списке: {} (только до перезагрузки страницы)", hidden.with(SoftDeleteSet::len))}
                </span>
                <button class="btn btn-ghost btn-xs" on:click=move |_| hidden.update(SoftDeleteSet::restore_all)>
                    <Eye attr:class="h-4 w-4" />
                    "Показать все"
                </button>
            </div>
        </Show>
    }
}
