//! 日期格式化模块
//!
//! 后端以 ISO 8601 传输日期 (`2024-03-01`, `2024-03-01T18:30:00`)，
//! 界面使用 `dd.mm.yyyy` 格式显示；HTML `<input type="date">` 和
//! `<input type="datetime-local">` 使用各自的固定格式。

use chrono::{NaiveDate, NaiveDateTime};

const DISPLAY_DATE: &str = "%d.%m.%Y";
const DISPLAY_DATETIME: &str = "%d.%m.%Y %H:%M";
const INPUT_DATE: &str = "%Y-%m-%d";
const INPUT_DATETIME: &str = "%Y-%m-%dT%H:%M";

/// `01.03.2024`
pub fn format_date(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE).to_string()
}

/// `01.03.2024 18:30`
pub fn format_datetime(dt: NaiveDateTime) -> String {
    dt.format(DISPLAY_DATETIME).to_string()
}

/// Value for `<input type="date">`.
pub fn to_date_input(date: NaiveDate) -> String {
    date.format(INPUT_DATE).to_string()
}

/// Parses the value of `<input type="date">`; empty input yields `None`.
pub fn parse_date_input(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(value, INPUT_DATE).ok()
}

/// Value for `<input type="datetime-local">`.
pub fn to_datetime_input(dt: NaiveDateTime) -> String {
    dt.format(INPUT_DATETIME).to_string()
}

/// Parses `<input type="datetime-local">`, which may or may not carry seconds.
pub fn parse_datetime_input(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, INPUT_DATETIME)
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

/// Formats a price in roubles: `1 250 ₽`, keeping kopecks only when present.
pub fn format_price(amount: f64) -> String {
    let kopecks = (amount * 100.0).round() as i64;
    let (sign, kopecks) = if kopecks < 0 { ("-", -kopecks) } else { ("", kopecks) };
    let rubles = (kopecks / 100).to_string();

    let mut grouped = String::with_capacity(rubles.len() + rubles.len() / 3);
    for (i, ch) in rubles.chars().enumerate() {
        if i > 0 && (rubles.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }

    match kopecks % 100 {
        0 => format!("{sign}{grouped} ₽"),
        rest => format!("{sign}{grouped},{rest:02} ₽"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_for_display() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(18, 30, 0)
            .unwrap();
        assert_eq!(format_date(dt.date()), "01.03.2024");
        assert_eq!(format_datetime(dt), "01.03.2024 18:30");
    }

    #[test]
    fn date_input_round_trip_and_empty() {
        let date = NaiveDate::from_ymd_opt(1990, 12, 31).unwrap();
        assert_eq!(parse_date_input(&to_date_input(date)), Some(date));
        assert_eq!(parse_date_input("  "), None);
        assert_eq!(parse_date_input("31.12.1990"), None);
    }

    #[test]
    fn datetime_input_accepts_optional_seconds() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 20)
            .unwrap()
            .and_hms_opt(19, 0, 0)
            .unwrap();
        assert_eq!(parse_datetime_input("2024-05-20T19:00"), Some(expected));
        assert_eq!(parse_datetime_input("2024-05-20T19:00:00"), Some(expected));
    }

    #[test]
    fn prices_are_grouped_by_thousands() {
        assert_eq!(format_price(1000.0), "1 000 ₽");
        assert_eq!(format_price(500.0), "500 ₽");
        assert_eq!(format_price(1234567.5), "1 234 567,50 ₽");
        assert_eq!(format_price(0.0), "0 ₽");
    }
}
