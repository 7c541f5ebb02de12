use chrono::{DateTime, Duration, NaiveDateTime};

/// 浏览器本地时间 (后端的时间字段不带时区)
pub fn now() -> NaiveDateTime {
    let utc = DateTime::from_timestamp_millis(js_sys::Date::now() as i64)
        .map(|d| d.naive_utc())
        .unwrap_or_default();
    // getTimezoneOffset = UTC - local，单位分钟
    let offset = js_sys::Date::new_0().get_timezone_offset() as i64;
    utc - Duration::minutes(offset)
}
