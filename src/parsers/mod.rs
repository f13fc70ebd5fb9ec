//! # 解析器模块
//!
//! 读取输入文件与化学式。
//!
//! ## 依赖关系
//! - 被 `commands/`, `models/query.rs` 使用
//! - 子模块: identifiers, formula

pub mod formula;
pub mod identifiers;

pub use identifiers::IdentifierSource;
