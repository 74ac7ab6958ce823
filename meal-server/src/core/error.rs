use thiserror::Error;

/// 启动与运行期错误 (请求级错误使用 [`crate::utils::AppError`])
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("工作目录不可用: {0}")]
    WorkDir(#[source] std::io::Error),

    #[error("数据库初始化失败: {0}")]
    Database(String),

    #[error("购物车存储初始化失败: {0}")]
    CartStore(#[from] crate::cart::StorageError),

    #[error("购物车恢复失败: {0}")]
    CartRestore(#[from] crate::cart::CartError),

    #[error("菜谱 API 客户端初始化失败: {0}")]
    RecipeApi(#[from] crate::catalog::RecipeApiError),

    #[error("HTTP 服务错误: {0}")]
    Http(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
