/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// 今天的本地日期
pub fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}
