use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::cart::{CartManager, CartStore};
use crate::catalog::data::api_restaurants;
use crate::catalog::{CatalogService, RecipeApiClient, RecipeSource};
use crate::core::Config;
use crate::core::error::{Result, ServerError};
use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::db::DbService;
use crate::orders::{OrderManager, OrderSettings};
use crate::payment::PaymentSimulator;
use crate::profile::ProfileService;
use crate::tracker::MealTracker;

/// 服务器状态 - 持有所有服务的单例引用
///
/// 所有服务内部都是 Arc, clone 只是浅拷贝。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | pool | SqlitePool | 行存储 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | catalog | CatalogService | 餐品目录与推荐 |
/// | profiles | ProfileService | 健康档案 |
/// | cart | CartManager | 购物车 (redb 快照) |
/// | tracker | MealTracker | 饮食记录 |
/// | orders | OrderManager | 下单与配送模拟 |
/// | payments | PaymentSimulator | 模拟支付 |
/// | tasks | BackgroundTasks | 后台任务 |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
    pub catalog: CatalogService,
    pub profiles: ProfileService,
    pub cart: CartManager,
    pub tracker: MealTracker,
    pub orders: OrderManager,
    pub payments: PaymentSimulator,
    pub tasks: BackgroundTasks,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 1. 工作目录
    /// 2. SQLite (含迁移)
    /// 3. redb 购物车快照
    /// 4. 菜谱 API 客户端
    pub async fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir).map_err(ServerError::WorkDir)?;

        let db = DbService::new(&config.database_url)
            .await
            .map_err(|e| ServerError::Database(e.to_string()))?;
        let cart_store = CartStore::open(config.cart_db_path())?;

        let recipes: Arc<dyn RecipeSource> = Arc::new(RecipeApiClient::new(
            config.recipe_api_url.clone(),
            config.recipe_api_key.clone(),
            Duration::from_millis(config.recipe_api_timeout_ms),
            api_restaurants(),
        )?);
        if config.recipe_api_key.is_none() {
            tracing::warn!("RECIPE_API_KEY not set, recommendations use the static catalog");
        }

        let state = Self::with_services(config.clone(), db.pool, cart_store, recipes);
        state.cart.restore()?;
        Ok(state)
    }

    /// 组装服务 (测试中使用内存数据库和桩菜谱源)
    pub fn with_services(
        config: Config,
        pool: SqlitePool,
        cart_store: CartStore,
        recipes: Arc<dyn RecipeSource>,
    ) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let tasks = BackgroundTasks::new();

        let catalog = CatalogService::new(pool.clone(), recipes, config.recommendation_limit);
        let profiles = ProfileService::new(pool.clone());
        let cart = CartManager::new(cart_store);
        let tracker = MealTracker::new(pool.clone(), catalog.clone());
        let orders = OrderManager::new(
            pool.clone(),
            cart.clone(),
            catalog.clone(),
            tracker.clone(),
            tasks.clone(),
            OrderSettings {
                delivery_fee: config.delivery_fee,
                estimate_minutes: config.delivery_estimate_minutes,
                dwell: config.dwell_durations(),
            },
        );
        let payments = PaymentSimulator::new(Duration::from_millis(config.payment_delay_ms));

        Self {
            config,
            pool,
            jwt_service,
            catalog,
            profiles,
            cart,
            tracker,
            orders,
            payments,
            tasks,
        }
    }

    /// 启动后台任务
    ///
    /// 配送模拟由 OrderManager 在下单时注册, 这里只有日志清理。
    pub fn start_background_tasks(&self) {
        let log_dir = PathBuf::from(self.config.log_dir());
        let shutdown = self.tasks.shutdown_token();
        self.tasks.spawn(
            "log_cleanup",
            TaskKind::Periodic,
            crate::utils::logger::periodic_cleanup(log_dir, shutdown),
        );
    }

    /// 获取 JWT 服务
    pub fn jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// 用户登出: 停止配送模拟并释放内存中的会话数据
    pub fn unload_user(&self, user_id: &str) {
        self.orders.unload(user_id);
        self.tracker.unload(user_id);
        self.cart.unload(user_id);
        tracing::debug!(user_id = %user_id, "User session data unloaded");
    }

    pub async fn shutdown(&self) {
        self.tasks.shutdown().await;
        self.pool.close().await;
    }
}
