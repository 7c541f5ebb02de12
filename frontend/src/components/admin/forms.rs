//! 后台表单状态
//!
//! 与首页的表单一样，把零散的 signal 收拢成 `Copy` 结构体：
//! - `fill` 从已有实体填充（编辑）
//! - `reset` 清空（新建）
//! - `to_form` 校验并转换成请求体
//!
//! 校验本身是纯函数，便于测试。

use bookclub_shared::date::{parse_datetime_input, to_datetime_input};
use bookclub_shared::{Book, BookForm, Event, EventForm, Product, ProductForm};
use leptos::prelude::*;

use crate::api::FilePayload;

pub type FormResult<T> = Result<T, &'static str>;

/// 价格允许逗号作小数点
pub fn parse_price(raw: &str) -> FormResult<f64> {
    let value: f64 = raw
        .trim()
        .replace(',', ".")
        .parse()
        .map_err(|_| "Цена должна быть числом")?;
    if !value.is_finite() || value < 0.0 {
        return Err("Цена не может быть отрицательной");
    }
    Ok(value)
}

/// 空输入视为 0
pub fn parse_stock(raw: &str) -> FormResult<i32> {
    match raw.trim() {
        "" => Ok(0),
        s => match s.parse::<i32>() {
            Ok(n) if n >= 0 => Ok(n),
            _ => Err("Остаток должен быть неотрицательным целым числом"),
        },
    }
}

/// 逗号分隔，去空白与重复
pub fn parse_genres(raw: &str) -> Vec<String> {
    let mut genres: Vec<String> = Vec::new();
    for g in raw.split(',').map(str::trim).filter(|g| !g.is_empty()) {
        if !genres.iter().any(|seen| seen.eq_ignore_ascii_case(g)) {
            genres.push(g.to_string());
        }
    }
    genres
}

fn required(value: &str, message: &'static str) -> FormResult<String> {
    match value.trim() {
        "" => Err(message),
        v => Ok(v.to_string()),
    }
}

// =========================================================
// 书籍
// =========================================================

#[derive(Clone, Copy)]
pub struct BookFormState {
    pub title: RwSignal<String>,
    pub author: RwSignal<String>,
    pub description: RwSignal<String>,
    pub price: RwSignal<String>,
    pub genres: RwSignal<String>,
    pub stock: RwSignal<String>,
    pub cover: RwSignal<Option<FilePayload>>,
    pub file: RwSignal<Option<FilePayload>>,
}

impl BookFormState {
    pub fn new() -> Self {
        Self {
            title: RwSignal::new(String::new()),
            author: RwSignal::new(String::new()),
            description: RwSignal::new(String::new()),
            price: RwSignal::new(String::new()),
            genres: RwSignal::new(String::new()),
            stock: RwSignal::new(String::new()),
            cover: RwSignal::new(None),
            file: RwSignal::new(None),
        }
    }

    pub fn reset(&self) {
        self.title.set(String::new());
        self.author.set(String::new());
        self.description.set(String::new());
        self.price.set(String::new());
        self.genres.set(String::new());
        self.stock.set(String::new());
        self.cover.set(None);
        self.file.set(None);
    }

    pub fn fill(&self, book: &Book) {
        self.title.set(book.title.clone());
        self.author.set(book.author.clone());
        self.description.set(book.description.clone());
        self.price.set(book.price.to_string());
        self.genres.set(book.genres.join(", "));
        self.stock.set(book.stock.to_string());
        self.cover.set(None);
        self.file.set(None);
    }

    pub fn to_form(&self) -> FormResult<BookForm> {
        Ok(BookForm {
            title: required(&self.title.get(), "Укажите название")?,
            author: required(&self.author.get(), "Укажите автора")?,
            description: self.description.get().trim().to_string(),
            price: parse_price(&self.price.get())?,
            genres: parse_genres(&self.genres.get()),
            stock: parse_stock(&self.stock.get())?,
        })
    }
}

// =========================================================
// 商品
// =========================================================

#[derive(Clone, Copy)]
pub struct ProductFormState {
    pub name: RwSignal<String>,
    pub description: RwSignal<String>,
    pub price: RwSignal<String>,
    pub category: RwSignal<String>,
    pub stock: RwSignal<String>,
    pub image: RwSignal<Option<FilePayload>>,
}

impl ProductFormState {
    pub fn new() -> Self {
        Self {
            name: RwSignal::new(String::new()),
            description: RwSignal::new(String::new()),
            price: RwSignal::new(String::new()),
            category: RwSignal::new(String::new()),
            stock: RwSignal::new(String::new()),
            image: RwSignal::new(None),
        }
    }

    pub fn reset(&self) {
        self.name.set(String::new());
        self.description.set(String::new());
        self.price.set(String::new());
        self.category.set(String::new());
        self.stock.set(String::new());
        self.image.set(None);
    }

    pub fn fill(&self, product: &Product) {
        let form = ProductForm::from(product);
        self.name.set(form.name);
        self.description.set(form.description);
        self.price.set(form.price.to_string());
        self.category.set(form.category);
        self.stock.set(form.stock.to_string());
        self.image.set(None);
    }

    pub fn to_form(&self) -> FormResult<ProductForm> {
        Ok(ProductForm {
            name: required(&self.name.get(), "Укажите название")?,
            description: self.description.get().trim().to_string(),
            price: parse_price(&self.price.get())?,
            category: self.category.get().trim().to_string(),
            stock: parse_stock(&self.stock.get())?,
        })
    }
}

// =========================================================
// 活动
// =========================================================

#[derive(Clone, Copy)]
pub struct EventFormState {
    pub title: RwSignal<String>,
    pub description: RwSignal<String>,
    pub location: RwSignal<String>,
    pub starts_at: RwSignal<String>,
    pub capacity: RwSignal<String>,
    pub image_url: RwSignal<String>,
}

impl EventFormState {
    pub fn new() -> Self {
        Self {
            title: RwSignal::new(String::new()),
            description: RwSignal::new(String::new()),
            location: RwSignal::new(String::new()),
            starts_at: RwSignal::new(String::new()),
            capacity: RwSignal::new(String::new()),
            image_url: RwSignal::new(String::new()),
        }
    }

    pub fn reset(&self) {
        self.title.set(String::new());
        self.description.set(String::new());
        self.location.set(String::new());
        self.starts_at.set(String::new());
        self.capacity.set(String::new());
        self.image_url.set(String::new());
    }

    pub fn fill(&self, event: &Event) {
        let form = EventForm::from(event);
        self.title.set(form.title);
        self.description.set(form.description);
        self.location.set(form.location);
        self.starts_at.set(to_datetime_input(form.starts_at));
        self.capacity.set(form.capacity.to_string());
        self.image_url.set(form.image_url.unwrap_or_default());
    }

    pub fn to_form(&self) -> FormResult<EventForm> {
        build_event_form(
            &self.title.get(),
            &self.description.get(),
            &self.location.get(),
            &self.starts_at.get(),
            &self.capacity.get(),
            &self.image_url.get(),
        )
    }
}

pub fn build_event_form(
    title: &str,
    description: &str,
    location: &str,
    starts_at: &str,
    capacity: &str,
    image_url: &str,
) -> FormResult<EventForm> {
    let starts_at = parse_datetime_input(starts_at).ok_or("Укажите дату и время начала")?;
    let capacity = match capacity.trim().parse::<u32>() {
        Ok(n) if n > 0 => n,
        _ => return Err("Количество мест должно быть больше нуля"),
    };
    let image_url = image_url.trim();

    Ok(EventForm {
        title: required(title, "Укажите название")?,
        description: description.trim().to_string(),
        location: required(location, "Укажите место проведения")?,
        starts_at,
        capacity,
        image_url: (!image_url.is_empty()).then(|| image_url.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn price_accepts_comma_and_rejects_negatives() {
        assert_eq!(parse_price("499,90"), Ok(499.9));
        assert_eq!(parse_price(" 500 "), Ok(500.0));
        assert!(parse_price("-1").is_err());
        assert!(parse_price("дорого").is_err());
        assert!(parse_price("").is_err());
    }

    #[test]
    fn stock_defaults_to_zero() {
        assert_eq!(parse_stock(""), Ok(0));
        assert_eq!(parse_stock("12"), Ok(12));
        assert!(parse_stock("-3").is_err());
        assert!(parse_stock("1.5").is_err());
    }

    #[test]
    fn genres_are_trimmed_and_deduplicated() {
        assert_eq!(
            parse_genres(" Роман, Классика ,,Роман, "),
            vec!["Роман".to_string(), "Классика".to_string()]
        );
        assert!(parse_genres("  ").is_empty());
    }

    #[test]
    fn event_form_validation() {
        let form = build_event_form(
            "Обсуждение «Идиота»",
            "",
            "Библиотека №3",
            "2025-06-01T18:30",
            "25",
            " ",
        )
        .unwrap();
        assert_eq!(
            form.starts_at,
            NaiveDate::from_ymd_opt(2025, 6, 1)
                .and_then(|d| d.and_hms_opt(18, 30, 0))
                .unwrap()
        );
        assert_eq!(form.capacity, 25);
        assert_eq!(form.image_url, None);

        assert!(build_event_form("x", "", "y", "", "10", "").is_err());
        assert_eq!(
            build_event_form("x", "", "y", "2025-06-01T18:30", "0", ""),
            Err("Количество мест должно быть больше нуля")
        );
        assert_eq!(
            build_event_form("x", "", " ", "2025-06-01T18:30", "5", ""),
            Err("Укажите место проведения")
        );
    }
}
