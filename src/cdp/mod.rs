//! # Chrome DevTools Protocol (CDP) 层
//!
//! 提供 Chrome/Chromium 浏览器的 WebSocket 通信接口，是定位器提取引擎与渲染引擎之间的唯一通道。
//!
//! ## 主要功能
//! - **浏览器启动**: 本地启动无头 Chrome（禁用沙箱），或连接已有的 DevTools 端点
//! - **WebSocket 连接管理**: 每个目标一个连接，响应按 ID 分发，事件广播给订阅者
//! - **隔离上下文**: 每个请求使用独立的 browser context（Cookie/存储互不共享）
//! - **远程对象**: 查询元素句柄、在元素上执行函数、批量释放对象组
//!
//! ## 模块结构
//! - `traits`: CDP 操作的核心 trait 定义
//! - `types`: CDP 协议相关的数据类型
//! - `connection`: WebSocket 连接实现
//! - `client`: 页面级 CDP 客户端实现
//! - `browser`: 浏览器级别的操作
//! - `launcher`: Chrome 进程启动与远程端点连接
//! - `mock`: 用于测试的 Mock 实现
//!
//! ## 使用示例
//! ```rust,no_run
//! use locator_forge::cdp::{BrowserLauncher, RemoteLauncher};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let browser = RemoteLauncher::new("ws://localhost:9222").launch().await?;
//! let context = browser.create_browser_context().await?;
//! let target = browser.create_target("about:blank", Some(&context)).await?;
//! let client = browser.create_client(&target).await?;
//! client.navigate("https://example.com").await?;
//! # Ok(())
//! # }
//! ```

pub mod traits;
pub mod types;
pub mod connection;
pub mod client;
pub mod browser;
pub mod launcher;
pub mod mock;

pub use traits::{
    CdpConnection, CdpClient, CdpBrowser, CdpEvent, CdpResponse, CdpError,
    NavigationResult, EvaluationResult, BrowserVersion,
};

// Re-export implementation structs
pub use connection::CdpWebSocketConnection;
pub use client::CdpClientImpl;
pub use browser::CdpBrowserImpl;
pub use launcher::{BrowserLauncher, ChromeLauncher, RemoteLauncher, LaunchOptions, launcher_from_config};

// Re-export mock for development/testing
pub use mock::{MockCdpConnection, MockCdpBrowser};
