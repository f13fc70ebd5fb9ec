//! # fetch 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/fetch.rs`

use super::plot::RenderArgs;
use super::MpApiArgs;
use crate::models::{BandPathType, PropertyKind};

use clap::Args;
use std::path::PathBuf;

/// fetch 子命令参数
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Input file with one material identifier per row (CSV/TSV or plain list)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output directory for per-material JSON, summary.csv and errors.csv
    #[arg(short, long)]
    pub output: PathBuf,

    /// Name of the identifier column (auto-detected when omitted)
    #[arg(short, long)]
    pub column: Option<String>,

    /// Properties to fetch, comma-separated
    #[arg(
        short,
        long,
        value_enum,
        value_delimiter = ',',
        default_values_t = PropertyKind::ALL.to_vec()
    )]
    pub properties: Vec<PropertyKind>,

    /// High-symmetry path convention for band structures
    #[arg(long, value_enum, default_value = "setyawan-curtarolo")]
    pub path_type: BandPathType,

    /// Render dos/bands images next to the JSON files
    #[arg(long, default_value_t = false)]
    pub plot: bool,

    #[command(flatten)]
    pub render: RenderArgs,

    /// Number of identifiers processed in parallel
    #[arg(short, long, default_value_t = 1)]
    pub jobs: usize,

    /// Minimum delay between two requests, in milliseconds
    #[arg(long, default_value_t = 0)]
    pub sleep_ms: u64,

    /// Per-request timeout, in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    #[command(flatten)]
    pub api: MpApiArgs,
}
