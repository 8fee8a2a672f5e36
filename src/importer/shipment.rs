//! 出荷ラベルの抽出
//!
//! 先頭行のテキストから「№ <番号> от <日付>」を探す。
//! 見つからなければ現在時刻から合成する。

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

/// 先頭行テキストから出荷ラベルを作る
pub fn shipment_label(first_row_text: &str, now: NaiveDateTime) -> String {
    lazy_static::lazy_static! {
        static ref SHIPMENT_RE: Regex = Regex::new(r"№\s*([\w.-]+)\s+от\s+([\d.]+)").unwrap();
    }

    let today = now.format("%d-%m-%Y").to_string();

    if let Some(caps) = SHIPMENT_RE.captures(first_row_text) {
        let number = &caps[1];
        let date = NaiveDate::parse_from_str(&caps[2], "%d.%m.%Y")
            .map(|d| d.format("%d-%m-%Y").to_string())
            .unwrap_or(today);
        return format!("Отгрузка №{} от {}", number, date);
    }

    format!("Отгрузка №SHIP_{} от {}", now.format("%Y%m%d_%H%M"), today)
}
