//! # 批量处理模块
//!
//! 提供按标识批量获取、按目录批量绘图的能力。
//!
//! ## 功能
//! - 按输入顺序执行（可选并行）
//! - 收集匹配文件列表
//! - 进度反馈与统计
//!
//! ## 依赖关系
//! - 被 `commands/fetch.rs`, `commands/plot.rs` 使用
//! - 使用 `rayon` 进行并行处理
//! - 使用 `indicatif` 显示进度

pub mod collector;
pub mod driver;
pub mod runner;

pub use collector::FileCollector;
pub use driver::{BatchDriver, BatchReport, DriverConfig};
pub use runner::{BatchRunner, BatchSummary, Failure};
