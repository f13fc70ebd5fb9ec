//! # plot 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs`, `cli/fetch.rs` 使用
//! - 参数传递给 `commands/plot.rs`

use crate::plot::{ImageFormat, PlotConfig};

use clap::{ArgGroup, Args};
use std::path::{Path, PathBuf};

/// plot 子命令参数
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["dos", "bands", "all"])))]
pub struct PlotArgs {
    /// DOS JSON file (normalized record or raw DOS document)
    #[arg(long)]
    pub dos: Option<PathBuf>,

    /// Band structure JSON file (normalized record or raw band structure document)
    #[arg(long)]
    pub bands: Option<PathBuf>,

    /// Directory searched recursively for plot inputs
    #[arg(long)]
    pub all: Option<PathBuf>,

    /// File patterns used with --all, comma-separated
    #[arg(long, default_value = "dos.json,bands.json")]
    pub pattern: String,

    /// Only search the top level of the --all directory
    #[arg(long, requires = "all", default_value_t = false)]
    pub no_recursive: bool,

    /// Output image path (single-file mode; default: next to the input)
    #[arg(short, long, conflicts_with = "all")]
    pub output: Option<PathBuf>,

    /// Number of files rendered in parallel (--all)
    #[arg(short, long, default_value_t = 1)]
    pub jobs: usize,

    #[command(flatten)]
    pub render: RenderArgs,
}

/// 绘图参数（与 fetch --plot 共用）
#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// Lower bound of the energy window (eV)
    #[arg(long, default_value_t = -6.0, allow_hyphen_values = true)]
    pub emin: f64,

    /// Upper bound of the energy window (eV)
    #[arg(long, default_value_t = 6.0, allow_hyphen_values = true)]
    pub emax: f64,

    /// Keep absolute energies instead of shifting E_F to zero
    #[arg(long, default_value_t = false)]
    pub no_shift: bool,

    /// Image width in pixels
    #[arg(long, default_value_t = 1024)]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 768)]
    pub height: u32,

    /// Image format (default: from the output extension, else png)
    #[arg(long, value_enum)]
    pub format: Option<ImageFormat>,
}

impl RenderArgs {
    /// 转换为绘图配置
    pub fn to_config(&self, output: Option<&Path>) -> PlotConfig {
        PlotConfig {
            emin: self.emin,
            emax: self.emax,
            width: self.width,
            height: self.height,
            format: ImageFormat::resolve(self.format, output),
            shift_fermi: !self.no_shift,
        }
    }
}
