//! 后台任务管理
//!
//! 统一管理所有后台任务的注册、启动和关闭。
//!
//! # 任务类型
//!
//! - [`TaskKind::Delivery`] - 单个订单的配送模拟（到达 delivered 后正常结束）
//! - [`TaskKind::Periodic`] - 定时任务（日志清理）
//!
//! The registry is cheap to clone, so services can register tasks while the
//! server is running.

use futures::FutureExt;
use parking_lot::Mutex;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// 任务类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Finishes on its own
    Delivery,
    /// 定时任务
    Periodic,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Delivery => write!(f, "Delivery"),
            TaskKind::Periodic => write!(f, "Periodic"),
        }
    }
}

/// 已注册的后台任务
struct RegisteredTask {
    name: String,
    kind: TaskKind,
    handle: JoinHandle<()>,
}

/// 后台任务管理器
///
/// ```ignore
/// let tasks = BackgroundTasks::new();
/// let token = tasks.child_token();
/// tasks.spawn(format!("delivery:{id}"), TaskKind::Delivery, async move {
///     simulation.run(&observer, token).await;
/// });
///
/// // Graceful shutdown
/// tasks.shutdown().await;
/// ```
#[derive(Clone)]
pub struct BackgroundTasks {
    tasks: Arc<Mutex<Vec<RegisteredTask>>>,
    /// 全局取消令牌
    shutdown: CancellationToken,
}

impl fmt::Debug for BackgroundTasks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackgroundTasks")
            .field("tasks", &self.tasks.lock().len())
            .field("cancelled", &self.shutdown.is_cancelled())
            .finish()
    }
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self {
            tasks: Arc::new(Mutex::new(Vec::new())),
            shutdown: CancellationToken::new(),
        }
    }

    /// 获取取消令牌（用于任务内部监听 shutdown 信号）
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Token cancelled on shutdown or individually
    pub fn child_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }

    /// 注册并启动一个后台任务
    ///
    /// 任务会被包装以捕获 panic。Periodic 任务正常退出也会记录警告。
    pub fn spawn<F>(&self, name: impl Into<String>, kind: TaskKind, future: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        let task_name = name.clone();
        let shutdown = self.shutdown.clone();
        let wrapped_future = async move {
            let result: Result<(), Box<dyn std::any::Any + Send>> =
                AssertUnwindSafe(future).catch_unwind().await;
            match result {
                Ok(()) => {
                    if kind == TaskKind::Periodic && !shutdown.is_cancelled() {
                        tracing::warn!(task = %task_name, kind = %kind, "Background task completed unexpectedly");
                    }
                }
                Err(panic_info) => {
                    let panic_msg: String = if let Some(s) = panic_info.downcast_ref::<&str>() {
                        (*s).to_string()
                    } else if let Some(s) = panic_info.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "Unknown panic".to_string()
                    };
                    tracing::error!(
                        task = %task_name,
                        kind = %kind,
                        panic = %panic_msg,
                        "Background task panicked! This is a bug that should be reported."
                    );
                }
            }
        };

        let handle = tokio::spawn(wrapped_future);
        tracing::debug!(task = %name, kind = %kind, "Registered background task");

        let mut tasks = self.tasks.lock();
        // 清理已结束的配送任务
        tasks.retain(|t| !(t.kind == TaskKind::Delivery && t.handle.is_finished()));
        tasks.push(RegisteredTask { name, kind, handle });
    }

    /// Tasks still running
    pub fn running(&self) -> usize {
        self.tasks
            .lock()
            .iter()
            .filter(|t| !t.handle.is_finished())
            .count()
    }

    /// 检查定时任务健康状态，返回异常终止的数量
    pub fn check_health(&self) -> usize {
        let tasks = self.tasks.lock();
        let failed: Vec<&RegisteredTask> = tasks
            .iter()
            .filter(|t| t.kind == TaskKind::Periodic && t.handle.is_finished())
            .collect();
        for task in &failed {
            tracing::error!(
                task = %task.name,
                kind = %task.kind,
                "Background task unexpectedly finished! This may indicate a panic or error."
            );
        }
        failed.len()
    }

    /// Graceful shutdown - 取消所有任务并等待完成
    pub async fn shutdown(&self) {
        let tasks: Vec<RegisteredTask> = std::mem::take(&mut *self.tasks.lock());
        tracing::info!("Shutting down {} background tasks...", tasks.len());

        self.shutdown.cancel();

        for task in tasks {
            match task.handle.await {
                Ok(()) => {
                    tracing::debug!(task = %task.name, "Task completed");
                }
                Err(e) if e.is_cancelled() => {
                    tracing::debug!(task = %task.name, "Task cancelled");
                }
                Err(e) => {
                    tracing::error!(task = %task.name, error = ?e, "Task panicked");
                }
            }
        }

        tracing::info!("All background tasks stopped");
    }
}

impl Default for BackgroundTasks {
    fn default() -> Self {
        Self::new()
    }
}
