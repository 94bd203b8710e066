//! # Locator-Forge 服务入口
//!
//! Locator-Forge gRPC 服务器的入口点：加载页面并为其中的候选元素生成定位器。
//!
//! ## 主要功能
//! - 初始化并配置 gRPC 服务器与 HTTP 健康检查
//! - 惰性启动（或连接）Chrome，所有请求共享同一渲染会话
//! - 提供定位器流式提取与验收标准查询
//! - 实现优雅关闭和会话清理
//!
//! ## 架构
//! 服务由以下核心组件构成：
//! - **CDP 层**: 与 Chrome/Chromium 浏览器的 WebSocket 通信
//! - **会话管理**: 共享渲染会话与每请求独占页面
//! - **提取层**: 导航、元素收集、属性读取与定位器生成
//! - **服务层**: gRPC 服务与健康检查
//!
//! ## 环境变量
//! - `LOCATOR_CONFIG`: TOML 配置文件路径（设置后忽略其余 `LOCATOR_*` 变量）
//! - `LOCATOR_HOST` / `LOCATOR_PORT`: gRPC 监听地址（默认: 0.0.0.0:50051）
//! - `PORT` / `LOCATOR_HEALTH_PORT`: 健康检查端口（默认: 10000）
//! - `LOCATOR_CDP_ENDPOINT`: 已有的 DevTools 端点；未设置时在本地启动 Chrome
//! - `JIRA_URL` / `JIRA_EMAIL` / `JIRA_TOKEN` / `AC_FIELD`: 验收标准查询

use locator_forge::{
    cdp::launcher_from_config,
    config::Config,
    extract::{ExtractorSettings, LocatorExtractor},
    services::{health, HealthStatus, LocatorGrpcService},
    session::{SessionManager, SessionManagerImpl},
    tracker::JiraClient,
};
use std::sync::Arc;
use tonic::transport::Server;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = match std::env::var("LOCATOR_CONFIG") {
        Ok(path) => Config::from_file(&path)?,
        Err(_) => Config::from_env()?,
    };

    // Initialize tracing - RUST_LOG wins over the configured level
    let log_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|v| v.parse::<Level>().ok())
        .or_else(|| config.log_level.parse::<Level>().ok())
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Locator-Forge Server v{}", locator_forge::VERSION);
    info!(
        "Configuration loaded: host={}, port={}, health_port={}",
        config.host, config.port, config.health_port
    );

    // Rendering session is started by the first request
    let launcher = launcher_from_config(&config);
    let session_manager: Arc<dyn SessionManager> = Arc::new(SessionManagerImpl::new(launcher));
    info!("Session manager initialized");

    let extractor = Arc::new(LocatorExtractor::new(
        session_manager.clone(),
        ExtractorSettings::from_config(&config)?,
    ));

    let tracker = JiraClient::from_config(&config.tracker)?.map(Arc::new);
    if tracker.is_none() {
        info!("No issue tracker configured; GetAcceptanceCriteria is disabled");
    }

    let locator_service = LocatorGrpcService::new(extractor, tracker).into_server();
    info!("gRPC services initialized");

    // Create gRPC server address
    let addr = format!("{}:{}", config.host, config.port);
    let addr = addr.parse::<std::net::SocketAddr>()?;

    // Health endpoint
    let health_addr = format!("{}:{}", config.host, config.health_port);
    let health_listener = tokio::net::TcpListener::bind(&health_addr).await?;
    let (health_stop_tx, health_stop_rx) = tokio::sync::oneshot::channel::<()>();
    let health_task = tokio::spawn(health::serve(
        health_listener,
        HealthStatus::new(&addr.to_string()),
        async move {
            health_stop_rx.await.ok();
        },
    ));
    info!("Health endpoint listening on {}", health_addr);

    // Setup graceful shutdown
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    // Spawn signal handler
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(mut sigterm), Ok(mut sigint)) => {
                    tokio::select! {
                        _ = sigterm.recv() => {
                            info!("Received SIGTERM signal");
                        }
                        _ = sigint.recv() => {
                            info!("Received SIGINT signal");
                        }
                    }
                }
                _ => {
                    error!("Failed to install signal handlers; falling back to Ctrl+C");
                    let _ = tokio::signal::ctrl_c().await;
                }
            }
        }

        #[cfg(windows)]
        {
            let _ = tokio::signal::ctrl_c().await;
            info!("Received Ctrl+C signal");
        }

        let _ = shutdown_tx.send(());
    });

    info!("Starting gRPC server on {}", addr);

    // Start gRPC server
    let server = Server::builder()
        .add_service(locator_service)
        .serve_with_shutdown(addr, async {
            shutdown_rx.await.ok();
            info!("Shutdown signal received, stopping server...");
        });

    // Wait for server to complete
    server.await?;

    let _ = health_stop_tx.send(());
    match health_task.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("Health endpoint failed: {}", e),
        Err(e) => error!("Health endpoint task failed: {}", e),
    }

    // Close the rendering session
    info!("Closing rendering session...");
    if let Err(e) = session_manager.shutdown().await {
        error!("Failed to close rendering session: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}
