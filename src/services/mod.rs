//! # 服务层
//!
//! 将定位器提取能力暴露为网络接口。
//!
//! ## 主要服务
//! - **LocatorService**: gRPC 服务，流式/分块返回定位器记录，查询验收标准
//! - **Health**: HTTP 健康检查路由，返回固定 JSON
//!
//! ## 架构设计
//! 服务层只做协议转换，通过依赖注入使用提取流水线和 Jira 客户端。
//!
//! ## 模块结构
//! - `locator`: 定位器 gRPC 服务实现
//! - `health`: HTTP 健康检查

pub mod locator;
pub mod health;

pub use health::HealthStatus;
pub use locator::LocatorGrpcService;
