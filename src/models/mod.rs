//! # 数据模型模块
//!
//! 定义标识、查询条件、远程响应与标准化记录。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `remote/`, `normalize/`, `batch/`, `plot/`, `commands/` 使用
//! - 子模块: material, query, response, record

pub mod material;
pub mod query;
pub mod record;
pub mod response;

pub use material::{BandPathType, Identifier, PropertyKind};
pub use query::{MatchMode, NemadDb, QueryFilter, QueryTarget};
pub use record::{
    BandRecord, BandTick, DosRecord, ElasticRecord, MagneticRecord, NemadEntry,
    NormalizedRecord, SummaryRecord,
};
pub use response::{RawResponse, TypedResponse};
