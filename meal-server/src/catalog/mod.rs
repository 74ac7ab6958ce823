//! 餐品目录
//!
//! - [`data`] - 静态餐品与餐厅
//! - [`filter`] - 按健康档案过滤
//! - [`recipe_api`] / [`mapper`] - 外部菜谱 API
//! - [`service`] - 推荐流程与餐品查找

pub mod data;
pub mod filter;
pub mod mapper;
pub mod recipe_api;
pub mod service;

pub use filter::{MealTypeFilter, filter_meals};
pub use recipe_api::{RecipeApiClient, RecipeApiError, RecipeQuery, RecipeSource};
pub use service::{CatalogService, Recommendation, RecommendationOrigin};
