use crate::auth::JwtConfig;
use rust_decimal::Decimal;
use std::time::Duration;

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./work_dir | 工作目录 (购物车存储, 日志) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_JSON | false | JSON 日志 (生产环境默认 true) |
/// | DATABASE_URL | sqlite:{WORK_DIR}/healmeal.db | 行存储后端 |
/// | RECIPE_API_URL | https://api.spoonacular.com | 菜谱 API |
/// | RECIPE_API_KEY | (空) | 为空时跳过 API |
/// | RECIPE_API_TIMEOUT_MS | 10000 | 菜谱 API 请求超时 |
/// | RECOMMENDATION_LIMIT | 6 | 每次推荐数量 |
/// | DELIVERY_FEE | 5.99 | 配送费 |
/// | DELIVERY_ESTIMATE_MINUTES | 30 | 预计送达 |
/// | DELIVERY_DWELL_MS | 5000,10000,2000,13000 | 各阶段停留时间 |
/// | PAYMENT_DELAY_MS | 2000 | 模拟支付延迟 |
///
/// JWT 相关变量见 [`JwtConfig`]。
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录
    pub work_dir: String,
    pub http_port: u16,
    /// development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_json: bool,
    pub database_url: String,
    pub jwt: JwtConfig,

    // === 推荐 ===
    pub recipe_api_url: String,
    pub recipe_api_key: Option<String>,
    pub recipe_api_timeout_ms: u64,
    pub recommendation_limit: u32,

    // === 订单 ===
    pub delivery_fee: Decimal,
    pub delivery_estimate_minutes: i64,
    /// confirmed, preparing, ready, out_for_delivery 的停留时间
    pub delivery_dwell_ms: [u64; 4],
    pub payment_delay_ms: u64,
}

/// Stage dwell times in milliseconds
pub const DEFAULT_DWELL_MS: [u64; 4] = [5_000, 10_000, 2_000, 13_000];

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./work_dir".into());
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| format!("sqlite:{work_dir}/healmeal.db"));

        Self {
            http_port: env_parse("HTTP_PORT", 3000),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: env_parse("LOG_JSON", environment == "production"),
            database_url,
            jwt: JwtConfig::default(),

            recipe_api_url: std::env::var("RECIPE_API_URL")
                .unwrap_or_else(|_| "https://api.spoonacular.com".into()),
            recipe_api_key: std::env::var("RECIPE_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            recipe_api_timeout_ms: env_parse("RECIPE_API_TIMEOUT_MS", 10_000),
            recommendation_limit: env_parse("RECOMMENDATION_LIMIT", 6),

            delivery_fee: env_parse("DELIVERY_FEE", Decimal::new(599, 2)),
            delivery_estimate_minutes: env_parse("DELIVERY_ESTIMATE_MINUTES", 30),
            delivery_dwell_ms: std::env::var("DELIVERY_DWELL_MS")
                .ok()
                .and_then(|v| parse_dwell(&v))
                .unwrap_or(DEFAULT_DWELL_MS),
            payment_delay_ms: env_parse("PAYMENT_DELAY_MS", 2_000),

            work_dir,
            environment,
        }
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn log_dir(&self) -> String {
        format!("{}/logs", self.work_dir)
    }

    pub fn cart_db_path(&self) -> String {
        format!("{}/cart.redb", self.work_dir)
    }

    pub fn dwell_durations(&self) -> [Duration; 4] {
        self.delivery_dwell_ms.map(Duration::from_millis)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// "5000,10000,2000,13000" → [5000, 10000, 2000, 13000]
fn parse_dwell(raw: &str) -> Option<[u64; 4]> {
    let parsed: Vec<u64> = raw
        .split(',')
        .map(|p| p.trim().parse().ok())
        .collect::<Option<_>>()?;
    parsed.try_into().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dwell() {
        assert_eq!(parse_dwell("1, 2,3 ,4"), Some([1, 2, 3, 4]));
        assert_eq!(parse_dwell("1,2,3"), None);
        assert_eq!(parse_dwell("1,2,x,4"), None);
    }
}
