use chrono::{Local, NaiveDate, NaiveDateTime};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const STAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub fn today() -> NaiveDate {
    now().date()
}

pub fn date_text(d: NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

pub fn stamp_text(t: NaiveDateTime) -> String {
    t.format(STAMP_FORMAT).to_string()
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}
