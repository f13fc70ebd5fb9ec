//! # query 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/query.rs`

use super::NemadApiArgs;
use crate::models::{MatchMode, NemadDb};

use clap::{ArgGroup, Args};
use std::path::PathBuf;

/// query 子命令参数
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("target").required(true).args(["elements", "input"])))]
pub struct QueryArgs {
    /// Comma-separated element symbols (e.g. Fe,Co); all must be present
    #[arg(short, long)]
    pub elements: Option<String>,

    /// CSV of materials; one query per row, built from the formula column
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Formula column in the input CSV (default: compound, pretty_formula, formula)
    #[arg(short, long, requires = "input")]
    pub column: Option<String>,

    /// Query by exact formula instead of by element set
    #[arg(long, requires = "input", default_value_t = false)]
    pub by_formula: bool,

    /// NEMAD database
    #[arg(long, value_enum)]
    pub db: NemadDb,

    /// Maximum number of entries per query
    #[arg(short, long, default_value_t = 50)]
    pub limit: usize,

    /// Element matching mode
    #[arg(long = "match", value_enum, default_value = "exact")]
    pub match_mode: MatchMode,

    /// Output directory for nemad_results.json / .csv and errors.csv
    #[arg(short, long, default_value = "nemad_out")]
    pub output: PathBuf,

    /// Minimum delay between two requests, in milliseconds
    #[arg(long, default_value_t = 250)]
    pub sleep_ms: u64,

    /// Per-request timeout, in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    #[command(flatten)]
    pub api: NemadApiArgs,
}
