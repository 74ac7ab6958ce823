use anyhow::Context;
use meal_server::{Config, Server, ServerState, print_banner, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. .env 必须在读取配置之前加载
    dotenv::dotenv().ok();
    let config = Config::from_env();

    // 2. 日志
    setup_environment(&config)?;
    print_banner();
    tracing::info!(
        environment = %config.environment,
        work_dir = %config.work_dir,
        "🥗 HealMeal server starting..."
    );

    // 3. 初始化服务器状态
    let state = ServerState::initialize(&config)
        .await
        .context("failed to initialize server state")?;

    // 4. 启动 HTTP 服务器 (阻塞直到 Ctrl+C)
    Server::new(config, state)
        .run()
        .await
        .context("server terminated with an error")?;

    Ok(())
}
