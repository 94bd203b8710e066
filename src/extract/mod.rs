//! # 定位器提取层
//!
//! 打开页面、收集候选元素、批量读取属性并为每个元素生成定位器候选集与最佳定位器。
//!
//! ## 主要功能
//! - **导航控制**: 校验 URL（仅 http/https），打开隔离页面，等待 DOM 解析完成，统一错误分类
//! - **元素收集**: 按固定选择器查询候选元素，按文档顺序截断到上限
//! - **属性批量读取**: 每个元素一次往返读取全部属性，单元素读取有超时
//! - **定位器生成**: 纯函数，把属性转换为各策略的定位表达式
//! - **最佳定位器**: 按优先级顺序选取第一个可用的表达式
//! - **工具片段**: 可选地把候选集渲染为 Playwright / Selenium 查找语句
//! - **结果流**: 逐条产出结果记录；页面在任何退出路径上都会被关闭
//!
//! ## 失败策略
//! - 导航或收集阶段失败: 只产出一条终止错误记录
//! - 单个元素失败: 跳过该元素并记录日志，继续处理后续元素
//!
//! ## 模块结构
//! - `navigation`: 导航控制器
//! - `collector`: 元素收集器
//! - `attributes`: 属性批量读取
//! - `scripts`: 页面内执行的脚本
//! - `strategy`: 定位器策略与候选集
//! - `best`: 最佳定位器选择
//! - `snippets`: 工具片段渲染
//! - `record`: 结果记录
//! - `pipeline`: 提取流水线与结果流
//!
//! ## 使用示例
//! ```rust,no_run
//! use futures::StreamExt;
//! use locator_forge::extract::{ExtractorSettings, LocatorExtractor};
//! use locator_forge::session::SessionManager;
//! use std::sync::Arc;
//!
//! # async fn example(sessions: Arc<dyn SessionManager>) {
//! let extractor = Arc::new(LocatorExtractor::new(sessions, ExtractorSettings::default()));
//! let mut records = extractor.extract("https://example.com");
//! while let Some(record) = records.next().await {
//!     println!("{}", serde_json::to_string(&record).unwrap_or_default());
//! }
//! # }
//! ```

pub mod navigation;
pub mod collector;
pub mod attributes;
pub mod scripts;
pub mod strategy;
pub mod best;
pub mod snippets;
pub mod record;
pub mod pipeline;


pub use attributes::{AttributeBundle, AttributeExtractor};
pub use best::BestLocatorPolicy;
pub use collector::ElementCollector;
pub use navigation::{validate_url, NavigationController};
pub use pipeline::{
    chunked, collect_records, ElementOutcome, ExtractorSettings, LocatorExtractor, ResultStream,
};
pub use record::{ElementRecord, FailureRecord, ResultRecord};
pub use snippets::{render, Tool, ToolSnippets};
pub use strategy::{build, LocatorCandidateSet, LocatorStrategy, DEFAULT_PRIORITY};
