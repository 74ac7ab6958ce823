//! HealMeal Server - 面向慢性病人群的膳食推荐与配送服务
//!
//! # 架构概述
//!
//! - **目录与推荐** (`catalog`): 静态目录 + 外部菜谱 API, 按健康状况和过敏原过滤
//! - **购物车** (`cart`): 内存购物车, redb 快照
//! - **订单** (`orders`): 下单、配送状态机、送达回填
//! - **饮食记录** (`tracker`): 每用户每日的饮食日志与营养汇总
//! - **档案** (`profile`) 与 **支付** (`payment`)
//! - **HTTP API** (`api`): axum 路由, JWT Bearer 认证
//!
//! # 模块结构
//!
//! ```text
//! meal-server/src/
//! ├── core/          # 配置、状态、服务器、后台任务
//! ├── auth/          # JWT 认证
//! ├── api/           # HTTP 路由和处理器
//! ├── catalog/       # 餐品目录、过滤、菜谱 API
//! ├── cart/          # 购物车 + redb
//! ├── orders/        # 订单生命周期
//! ├── tracker/       # 饮食记录
//! ├── profile/       # 健康档案
//! ├── payment/       # 模拟支付
//! ├── db/            # SQLite 行存储
//! └── utils/         # 错误、日志
//! ```

pub mod api;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod core;
pub mod db;
pub mod orders;
pub mod payment;
pub mod profile;
pub mod tracker;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use cart::CartManager;
pub use catalog::CatalogService;
pub use core::{Config, Server, ServerState};
pub use orders::OrderManager;
pub use tracker::MealTracker;
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

/// dotenv + 日志初始化
///
/// 生产环境或 `LOG_JSON=true` 时输出 JSON; 日志文件写入 `{WORK_DIR}/logs`。
pub fn setup_environment(config: &Config) -> anyhow::Result<()> {
    std::fs::create_dir_all(config.log_dir())?;
    init_logger_with_file(&config.log_level, config.log_json, Some(&config.log_dir()))?;
    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    __  __           __ __  ___           __
   / / / /__  ____ _/ //  |/  /__  ____ _/ /
  / /_/ / _ \/ __ `/ // /|_/ / _ \/ __ `/ /
 / __  /  __/ /_/ / // /  / /  __/ /_/ / /
/_/ /_/\___/\__,_/_//_/  /_/\___/\__,_/_/
    "#
    );
}
