//! # 会话管理层
//!
//! 管理共享渲染会话与每个请求独占页面的生命周期。
//!
//! ## 主要功能
//! - **会话单例**: 首次请求时惰性启动渲染引擎，并发的首次请求共享同一次启动
//! - **失败重试**: 启动失败不会缓存，下一个请求会重新尝试；连接断开的会话会被替换
//! - **页面隔离**: 每个请求打开独立页面（独立 browser context），结束时无条件关闭
//! - **请求路由**: 按资源类型放行或中止页面的子请求
//!
//! ## 核心概念
//! - **RenderingSession**: 与渲染引擎的唯一长连接，被所有请求共享
//! - **PageContext**: 单个请求独占的页面
//! - **ElementHandle**: 页面内元素的不透明引用，页面关闭后失效
//!
//! ## 模块结构
//! - `traits`: 会话管理的核心 trait 定义
//! - `manager`: 会话管理器实现
//! - `browser`: 渲染会话实现
//! - `page`: 页面上下文实现
//! - `routing`: 子请求路由策略
//! - `mock`: 用于测试的 Mock 实现
//!
//! ## 使用示例
//! ```rust,no_run
//! use locator_forge::session::{NavigationOptions, PageOptions, SessionManager};
//! use std::sync::Arc;
//!
//! # async fn example(manager: Arc<dyn SessionManager>) -> Result<(), Box<dyn std::error::Error>> {
//! let page = manager.open_page(PageOptions::default()).await?;
//! let result = page.navigate("https://example.com", NavigationOptions::default()).await?;
//! println!("Page ready: {} ({})", result.url, result.ready_state);
//! page.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod traits;
pub mod manager;
pub mod browser;
pub mod page;
pub mod routing;
pub mod mock;


pub use traits::{
    SessionManager, RenderingSession, PageContext, ElementHandle,
    PageOptions, NavigationOptions, LoadState, NavigationResult,
};
pub use routing::{RequestPolicy, ResourceKind, RouteDecision};

// Re-export implementation structs
pub use manager::SessionManagerImpl;
pub use browser::RenderingSessionImpl;
pub use page::PageContextImpl;

// Re-export mock implementations for testing
pub use mock::{
    MockElement, MockLauncher, MockNavigation, MockPage, MockPageScript, MockSession,
    MockSessionManager,
};
