//! Logging Infrastructure
//!
//! - 控制台: 开发环境 pretty, 生产环境 JSON
//! - `logs/app`: 应用日志, 按天滚动, 14 天后清理
//! - `logs/audit`: 下单/支付等业务审计 (target = "audit"), 永久保留
//! - `logs/security`: 认证失败等安全事件 (target = "security"), 永久保留

use std::fs;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, filter, fmt};

const APP_LOG_PREFIX: &str = "app";
const RETENTION_DAYS: u64 = 14;

type Base = Layered<EnvFilter, Registry>;
type BoxedLayer = Box<dyn Layer<Base> + Send + Sync>;

/// Delete `app.YYYY-MM-DD` files older than the retention window
pub fn cleanup_old_logs(log_dir: &Path) -> anyhow::Result<()> {
    let app_log_dir = log_dir.join("app");
    if !app_log_dir.exists() {
        return Ok(());
    }

    let cutoff = chrono::Local::now().date_naive() - chrono::Days::new(RETENTION_DAYS);

    for entry in fs::read_dir(app_log_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(date_part) = name
            .strip_prefix(APP_LOG_PREFIX)
            .and_then(|d| d.strip_prefix('.'))
            && let Ok(date) = chrono::NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            && date < cutoff
        {
            fs::remove_file(&path)?;
            tracing::info!(file = %name, "Deleted old log file");
        }
    }

    Ok(())
}

/// Initialize the logging system
///
/// `RUST_LOG` takes precedence over `level` when set.
///
/// ```no_run
/// // development, console only
/// meal_server::init_logger_with_file("debug", false, None)?;
///
/// // production, console + files
/// meal_server::init_logger_with_file("info", true, Some("./work_dir/logs"))?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&str>,
) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let mut layers: Vec<BoxedLayer> = Vec::new();

    let console = if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };
    layers.push(console);

    if let Some(dir) = log_dir {
        let log_dir = Path::new(dir);
        let app_dir = log_dir.join("app");
        let audit_dir = log_dir.join("audit");
        let security_dir = log_dir.join("security");
        for d in [&app_dir, &audit_dir, &security_dir] {
            fs::create_dir_all(d)?;
        }

        layers.push(file_layer(&app_dir, APP_LOG_PREFIX, json_format, |target| {
            target != "audit" && target != "security"
        }));
        layers.push(file_layer(&audit_dir, "audit", json_format, |target| {
            target == "audit"
        }));
        layers.push(file_layer(&security_dir, "security", json_format, |target| {
            target == "security"
        }));
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()?;

    Ok(())
}

/// Console only
pub fn init_logger(level: &str, json_format: bool) -> anyhow::Result<()> {
    init_logger_with_file(level, json_format, None)
}

fn file_layer(dir: &Path, prefix: &str, json: bool, keep: fn(&str) -> bool) -> BoxedLayer {
    let appender = RollingFileAppender::new(Rotation::DAILY, dir, prefix);
    let target_filter = filter::filter_fn(move |meta| keep(meta.target()));

    if json {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_writer(std::sync::Mutex::new(appender))
            .with_filter(target_filter)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(appender))
            .with_filter(target_filter)
            .boxed()
    }
}

/// Runs every hour until `shutdown` fires
pub async fn periodic_cleanup(log_dir: PathBuf, shutdown: CancellationToken) {
    use tokio::time::{Duration, sleep};

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => return,
            _ = sleep(Duration::from_secs(3600)) => {}
        }

        if let Err(e) = cleanup_old_logs(&log_dir) {
            tracing::error!(error = %e, "Failed to cleanup old logs");
        }
    }
}

/// Audit log helper - 记录关键业务操作 (下单, 支付)
///
/// ```ignore
/// audit_log!(user_id, "checkout", format!("order:{}", order.id));
/// ```
#[macro_export]
macro_rules! audit_log {
    ($user_id:expr, $action:expr, $resource:expr) => {
        tracing::info!(
            target: "audit",
            user_id = %$user_id,
            action = $action,
            resource = %$resource,
            "AUDIT"
        );
    };
    ($user_id:expr, $action:expr, $resource:expr, $details:expr) => {
        tracing::info!(
            target: "audit",
            user_id = %$user_id,
            action = $action,
            resource = %$resource,
            details = %$details,
            "AUDIT"
        );
    };
}

/// Security log helper - 记录安全事件
///
/// ```ignore
/// security_log!(WARN, "auth_failed", uri = %parts.uri, error = %e);
/// ```
#[macro_export]
macro_rules! security_log {
    (WARN, $event:expr, $($arg:tt)*) => {
        tracing::warn!(target: "security", event = $event, $($arg)*)
    };
    (INFO, $event:expr, $($arg:tt)*) => {
        tracing::info!(target: "security", event = $event, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_removes_only_expired_app_logs() {
        let dir = tempfile::tempdir().unwrap();
        let app_dir = dir.path().join("app");
        fs::create_dir_all(&app_dir).unwrap();

        let old = chrono::Local::now().date_naive() - chrono::Days::new(30);
        let recent = chrono::Local::now().date_naive();
        let old_file = app_dir.join(format!("app.{}", old.format("%Y-%m-%d")));
        let recent_file = app_dir.join(format!("app.{}", recent.format("%Y-%m-%d")));
        let other_file = app_dir.join("notes.txt");
        for f in [&old_file, &recent_file, &other_file] {
            fs::write(f, b"x").unwrap();
        }

        cleanup_old_logs(dir.path()).unwrap();

        assert!(!old_file.exists());
        assert!(recent_file.exists());
        assert!(other_file.exists());
    }

    #[test]
    fn test_cleanup_without_app_dir_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        assert!(cleanup_old_logs(dir.path()).is_ok());
    }
}
