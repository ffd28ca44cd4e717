//! 时间工具函数
//!
//! 分析接口只接受 `YYYY-MM-DD` 日期，ledger 中的日期列按 SQLite `date()` 比较。

use chrono::NaiveDate;

/// 分析日期格式
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 解析日期字符串 (YYYY-MM-DD)，严格要求两位月/日
pub fn parse_date(date: &str) -> Option<NaiveDate> {
    let date = date.trim();
    if date.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(date, DATE_FORMAT).ok()
}
