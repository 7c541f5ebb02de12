//! 表格工具：搜索、排序、分页与"隐藏"行
//!
//! 目录页与所有后台管理页共用这一套纯函数。
//! 所有函数只读取输入切片，返回新的集合。

use std::cmp::Ordering;
use std::collections::HashSet;

use bookclub_shared::{AuditEntry, Book, Event, EventApplication, Order, Product, User};
use chrono::NaiveDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Asc => "▲",
            SortDirection::Desc => "▼",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortConfig<K> {
    pub key: K,
    pub direction: SortDirection,
}

impl<K: Copy + PartialEq> SortConfig<K> {
    pub fn asc(key: K) -> Self {
        Self {
            key,
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(key: K) -> Self {
        Self {
            key,
            direction: SortDirection::Desc,
        }
    }

    /// 点击表头：同一列切换方向，新列从升序开始
    pub fn toggled(self, key: K) -> Self {
        if self.key == key {
            Self {
                key,
                direction: self.direction.flipped(),
            }
        } else {
            Self::asc(key)
        }
    }

    /// 该列当前的方向，非排序列返回 `None`
    pub fn direction_of(&self, key: K) -> Option<SortDirection> {
        (self.key == key).then_some(self.direction)
    }
}

/// 可比较的单元格值
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
    /// 空值总是排在最后
    Empty,
}

impl SortValue {
    pub fn text(s: &str) -> Self {
        SortValue::Text(s.to_lowercase())
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            (SortValue::Number(a), SortValue::Number(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (SortValue::DateTime(a), SortValue::DateTime(b)) => a.cmp(b),
            (SortValue::Empty, SortValue::Empty) => Ordering::Equal,
            (SortValue::Empty, _) => Ordering::Greater,
            (_, SortValue::Empty) => Ordering::Less,
            _ => Ordering::Equal,
        }
    }
}

impl From<Option<&str>> for SortValue {
    fn from(value: Option<&str>) -> Self {
        match value {
            Some(s) if !s.trim().is_empty() => SortValue::text(s),
            _ => SortValue::Empty,
        }
    }
}

/// 可在表格中搜索与排序的行
pub trait Searchable {
    type SortKey: Copy + PartialEq;

    /// 用于隐藏与列表 key 的行标识
    fn row_id(&self) -> i64;

    /// 参与全文搜索的字段
    fn search_fields(&self) -> Vec<String>;

    fn sort_value(&self, key: Self::SortKey) -> SortValue;

    /// 大小写不敏感的子串匹配；空查询匹配所有行
    fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        needle.is_empty()
            || self
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// 过滤并排序，返回新向量；排序稳定，不修改 `items`
pub fn filter_and_sort<T: Searchable + Clone>(
    items: &[T],
    query: &str,
    sort: Option<SortConfig<T::SortKey>>,
) -> Vec<T> {
    let mut rows: Vec<T> = items.iter().filter(|i| i.matches(query)).cloned().collect();
    if let Some(sort) = sort {
        rows.sort_by(|a, b| {
            let (va, vb) = (a.sort_value(sort.key), b.sort_value(sort.key));
            match (sort.direction, &va, &vb) {
                // 降序时空值仍然在最后
                (_, SortValue::Empty, _) | (_, _, SortValue::Empty) => va.compare(&vb),
                (SortDirection::Asc, _, _) => va.compare(&vb),
                (SortDirection::Desc, _, _) => vb.compare(&va),
            }
        });
    }
    rows
}

/// 一页数据
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 从 1 开始，已夹到有效范围内
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T> Page<T> {
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// 分页；页码越界时夹到最后一页，空集合也有一页
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);
    let start = (page - 1) * page_size;

    Page {
        items: items.iter().skip(start).take(page_size).cloned().collect(),
        page,
        total_pages,
        total_items,
    }
}

/// 仅在界面上隐藏的行
///
/// 不会发送到后端，刷新页面后所有行重新可见。真正的删除是单独的操作。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoftDeleteSet {
    hidden: HashSet<i64>,
}

impl SoftDeleteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hide(&mut self, id: i64) {
        self.hidden.insert(id);
    }

    pub fn restore(&mut self, id: i64) {
        self.hidden.remove(&id);
    }

    pub fn restore_all(&mut self) {
        self.hidden.clear();
    }

    pub fn is_hidden(&self, id: i64) -> bool {
        self.hidden.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.hidden.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hidden.is_empty()
    }

    pub fn visible<T: Searchable + Clone>(&self, items: &[T]) -> Vec<T> {
        items
            .iter()
            .filter(|i| !self.is_hidden(i.row_id()))
            .cloned()
            .collect()
    }
}

/// 一张表的完整查询：搜索词、排序与页码
#[derive(Debug, Clone, PartialEq)]
pub struct TableQuery<K> {
    pub search: String,
    pub sort: Option<SortConfig<K>>,
    pub page: usize,
}

impl<K: Copy + PartialEq> TableQuery<K> {
    pub fn new(sort: Option<SortConfig<K>>) -> Self {
        Self {
            search: String::new(),
            sort,
            page: 1,
        }
    }

    /// 隐藏行 -> 过滤排序 -> 分页
    pub fn apply<T>(&self, items: &[T], hidden: &SoftDeleteSet, page_size: usize) -> Page<T>
    where
        T: Searchable<SortKey = K> + Clone,
    {
        let visible = hidden.visible(items);
        let rows = filter_and_sort(&visible, &self.search, self.sort);
        paginate(&rows, self.page, page_size)
    }
}

// =========================================================
// 各实体的排序列
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookSort {
    Title,
    Author,
    Price,
    Stock,
}

impl Searchable for Book {
    type SortKey = BookSort;

    fn row_id(&self) -> i64 {
        self.id
    }

    fn search_fields(&self) -> Vec<String> {
        let mut fields = vec![self.title.clone(), self.author.clone()];
        fields.extend(self.genres.iter().cloned());
        fields
    }

    fn sort_value(&self, key: BookSort) -> SortValue {
        match key {
            BookSort::Title => SortValue::text(&self.title),
            BookSort::Author => SortValue::text(&self.author),
            BookSort::Price => SortValue::Number(self.price),
            BookSort::Stock => SortValue::Number(f64::from(self.stock)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSort {
    Name,
    Category,
    Price,
    Stock,
}

impl Searchable for Product {
    type SortKey = ProductSort;

    fn row_id(&self) -> i64 {
        self.id
    }

    fn search_fields(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.category.clone(),
            self.description.clone(),
        ]
    }

    fn sort_value(&self, key: ProductSort) -> SortValue {
        match key {
            ProductSort::Name => SortValue::text(&self.name),
            ProductSort::Category => SortValue::from(Some(self.category.as_str())),
            ProductSort::Price => SortValue::Number(self.price),
            ProductSort::Stock => SortValue::Number(f64::from(self.stock)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserSort {
    Name,
    Email,
    Role,
}

impl Searchable for User {
    type SortKey = UserSort;

    fn row_id(&self) -> i64 {
        self.id
    }

    fn search_fields(&self) -> Vec<String> {
        vec![
            self.full_name(),
            self.email.clone(),
            self.role.label().to_string(),
        ]
    }

    fn sort_value(&self, key: UserSort) -> SortValue {
        match key {
            UserSort::Name => SortValue::text(&self.full_name()),
            UserSort::Email => SortValue::text(&self.email),
            UserSort::Role => SortValue::text(self.role.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSort {
    Id,
    CreatedAt,
    Total,
    Status,
}

impl Searchable for Order {
    type SortKey = OrderSort;

    fn row_id(&self) -> i64 {
        self.id
    }

    fn search_fields(&self) -> Vec<String> {
        let mut fields = vec![
            self.id.to_string(),
            self.address.clone(),
            self.status.label().to_string(),
        ];
        fields.extend(self.user_email.clone());
        fields
    }

    fn sort_value(&self, key: OrderSort) -> SortValue {
        match key {
            OrderSort::Id => SortValue::Number(self.id as f64),
            OrderSort::CreatedAt => SortValue::DateTime(self.created_at),
            OrderSort::Total => SortValue::Number(self.total_price),
            OrderSort::Status => SortValue::text(self.status.label()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSort {
    Title,
    StartsAt,
    Capacity,
}

impl Searchable for Event {
    type SortKey = EventSort;

    fn row_id(&self) -> i64 {
        self.id
    }

    fn search_fields(&self) -> Vec<String> {
        vec![self.title.clone(), self.location.clone()]
    }

    fn sort_value(&self, key: EventSort) -> SortValue {
        match key {
            EventSort::Title => SortValue::text(&self.title),
            EventSort::StartsAt => SortValue::DateTime(self.starts_at),
            EventSort::Capacity => SortValue::Number(f64::from(self.capacity)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationSort {
    User,
    CreatedAt,
    Status,
}

impl Searchable for EventApplication {
    type SortKey = ApplicationSort;

    fn row_id(&self) -> i64 {
        self.id
    }

    fn search_fields(&self) -> Vec<String> {
        let mut fields = vec![
            self.user_name.clone(),
            self.event_title.clone(),
            self.status.label().to_string(),
        ];
        fields.extend(self.comment.clone());
        fields
    }

    fn sort_value(&self, key: ApplicationSort) -> SortValue {
        match key {
            ApplicationSort::User => SortValue::from(Some(self.user_name.as_str())),
            ApplicationSort::CreatedAt => SortValue::DateTime(self.created_at),
            ApplicationSort::Status => SortValue::text(self.status.label()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditSort {
    Timestamp,
    Actor,
    Action,
}

impl Searchable for AuditEntry {
    type SortKey = AuditSort;

    fn row_id(&self) -> i64 {
        self.id
    }

    fn search_fields(&self) -> Vec<String> {
        let mut fields = vec![
            self.actor.clone(),
            self.action.clone(),
            self.entity.clone(),
        ];
        fields.extend(self.details.clone());
        fields
    }

    fn sort_value(&self, key: AuditSort) -> SortValue {
        match key {
            AuditSort::Timestamp => SortValue::DateTime(self.timestamp),
            AuditSort::Actor => SortValue::text(&self.actor),
            AuditSort::Action => SortValue::text(&self.action),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(id: i64, title: &str, author: &str, price: f64) -> Book {
        Book {
            id,
            title: title.to_string(),
            author: author.to_string(),
            description: String::new(),
            price,
            genres: vec!["Роман".to_string()],
            cover_url: None,
            file_url: None,
            stock: 1,
        }
    }

    fn shelf() -> Vec<Book> {
        vec![
            book(1, "Мастер и Маргарита", "Булгаков", 650.0),
            book(2, "Анна Каренина", "Толстой", 480.0),
            book(3, "Белая гвардия", "Булгаков", 520.0),
        ]
    }

    #[test]
    fn search_is_case_insensitive_over_fields() {
        let books = shelf();
        let found = filter_and_sort(&books, "  булгаков ", None);
        assert_eq!(found.iter().map(|b| b.id).collect::<Vec<_>>(), vec![1, 3]);

        let found = filter_and_sort(&books, "роман", None);
        assert_eq!(found.len(), 3);
        assert!(filter_and_sort(&books, "Пушкин", None).is_empty());
    }

    #[test]
    fn sorting_does_not_touch_source() {
        let books = shelf();
        let before = books.clone();

        let by_price = filter_and_sort(&books, "", Some(SortConfig::asc(BookSort::Price)));
        assert_eq!(by_price.iter().map(|b| b.id).collect::<Vec<_>>(), vec![2, 3, 1]);

        let by_title = filter_and_sort(&books, "", Some(SortConfig::desc(BookSort::Title)));
        assert_eq!(by_title.iter().map(|b| b.id).collect::<Vec<_>>(), vec![1, 3, 2]);

        assert_eq!(books, before);
    }

    #[test]
    fn same_input_gives_same_output() {
        let books = shelf();
        let sort = Some(SortConfig::asc(BookSort::Author));
        assert_eq!(
            filter_and_sort(&books, "а", sort),
            filter_and_sort(&books, "а", sort)
        );
    }

    #[test]
    fn empty_values_stay_last_in_both_directions() {
        let mut products: Vec<Product> = ["Кружки", "", "Блокноты"]
            .iter()
            .enumerate()
            .map(|(i, category)| Product {
                id: i as i64,
                name: format!("p{}", i),
                description: String::new(),
                price: 100.0,
                category: category.to_string(),
                image_url: None,
                stock: 0,
            })
            .collect();
        products.reverse();

        let asc = filter_and_sort(&products, "", Some(SortConfig::asc(ProductSort::Category)));
        assert_eq!(asc.last().map(|p| p.id), Some(1));
        let desc = filter_and_sort(&products, "", Some(SortConfig::desc(ProductSort::Category)));
        assert_eq!(desc.first().map(|p| p.id), Some(0));
        assert_eq!(desc.last().map(|p| p.id), Some(1));
    }

    #[test]
    fn toggling_sort_header() {
        let sort = SortConfig::asc(BookSort::Title);
        let sort = sort.toggled(BookSort::Title);
        assert_eq!(sort.direction, SortDirection::Desc);
        let sort = sort.toggled(BookSort::Price);
        assert_eq!(sort, SortConfig::asc(BookSort::Price));
        assert_eq!(sort.direction_of(BookSort::Title), None);
    }

    #[test]
    fn pagination_clamps_page() {
        let items: Vec<i32> = (1..=25).collect();

        let page = paginate(&items, 3, 10);
        assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_prev());
        assert!(!page.has_next());

        let page = paginate(&items, 9, 10);
        assert_eq!(page.page, 3);

        let empty = paginate::<i32>(&[], 0, 10);
        assert_eq!(empty.page, 1);
        assert_eq!(empty.total_pages, 1);
        assert!(empty.items.is_empty());
    }

    #[test]
    fn hidden_rows_come_back_with_a_fresh_set() {
        let books = shelf();
        let mut hidden = SoftDeleteSet::new();
        hidden.hide(2);
        assert_eq!(hidden.visible(&books).len(), 2);
        assert!(hidden.is_hidden(2));

        // 刷新页面等同于新的集合
        let fresh = SoftDeleteSet::new();
        assert_eq!(fresh.visible(&books).len(), 3);

        hidden.restore(2);
        assert!(hidden.is_empty());
    }

    #[test]
    fn table_query_hides_then_pages() {
        let books = shelf();
        let mut hidden = SoftDeleteSet::new();
        hidden.hide(2);
        let query = TableQuery {
            search: String::new(),
            sort: Some(SortConfig::desc(BookSort::Price)),
            page: 1,
        };
        let page = query.apply(&books, &hidden, 1);
        assert_eq!(page.total_items, 2);
        assert_eq!(page.items[0].id, 1);
        assert_eq!(books.len(), 3);

        // 新的 SoftDeleteSet 相当于刷新页面
        let fresh = TableQuery::<BookSort>::new(None).apply(&books, &SoftDeleteSet::new(), 10);
        assert_eq!(fresh.total_items, 3);
    }
}
