//! # 定位器服务
//!
//! 通过 gRPC 暴露定位器提取流水线与验收标准查询。
//!
//! ## 主要功能
//! - **流式提取**: 每处理完一个元素立即推送一条记录
//! - **分块提取**: 按固定大小（默认 30 条）分组推送，适用于不便逐条处理的客户端
//! - **验收标准**: 从 Jira 读取指定字段
//! - **断开处理**: 客户端断开后停止提取并关闭页面
//!
//! ## 模块结构
//! - `service`: gRPC 服务实现
//! - `conversions`: 结果记录到 protobuf 的转换
//!
//! ## RPC 方法
//! - `ExtractLocators`: 流式返回定位器记录
//! - `ExtractLocatorsBatched`: 分块流式返回定位器记录
//! - `GetAcceptanceCriteria`: 查询验收标准
//!
//! ## 使用示例
//! ```rust,no_run
//! use locator_forge::extract::{ExtractorSettings, LocatorExtractor};
//! use locator_forge::services::LocatorGrpcService;
//! use locator_forge::session::SessionManager;
//! use std::sync::Arc;
//!
//! # fn example(sessions: Arc<dyn SessionManager>) {
//! let extractor = Arc::new(LocatorExtractor::new(sessions, ExtractorSettings::default()));
//! let server = LocatorGrpcService::new(extractor, None).into_server();
//! # let _ = server;
//! # }
//! ```

pub mod conversions;
pub mod service;


pub use service::LocatorGrpcService;
