//! # screen 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/screen.rs`

use super::MpApiArgs;

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 默认排除的元素（贵金属、放射性元素、稀有气体等）
pub const DEFAULT_EXCLUDED: &str =
    "Re,Os,Ir,Pt,Au,In,Tc,Be,As,Cd,Ba,Hg,Tl,Pb,Ac,Cs,Po,Np,U,Pu,Th,He,Ne,Ar,Kr,Xe";

/// 磁序过滤
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OrderingFilter {
    /// Ferromagnetic
    #[value(name = "FM", alias = "fm")]
    Fm,
    /// Ferrimagnetic
    #[value(name = "FiM", alias = "fim")]
    Fim,
    /// Antiferromagnetic
    #[value(name = "AFM", alias = "afm")]
    Afm,
}

impl OrderingFilter {
    /// MP 磁性文档中的 ordering 值
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderingFilter::Fm => "FM",
            OrderingFilter::Fim => "FiM",
            OrderingFilter::Afm => "AFM",
        }
    }
}

/// screen 子命令参数
#[derive(Args, Debug)]
pub struct ScreenArgs {
    /// Elements searched one at a time, comma-separated
    #[arg(short, long, default_value = "Mn,Fe,Co,Ni,Cr")]
    pub elements: String,

    /// Elements that must not appear, comma-separated (empty string disables)
    #[arg(short = 'x', long, default_value = DEFAULT_EXCLUDED)]
    pub exclude: String,

    /// Keep only candidates with this magnetic ordering
    #[arg(long, value_enum, default_value = "FM")]
    pub ordering: OrderingFilter,

    /// Skip the magnetic ordering check
    #[arg(long, conflicts_with = "ordering")]
    pub any_ordering: bool,

    /// Minimum total magnetization per volume (μB/Å³)
    #[arg(long, default_value_t = 0.0386)]
    pub min_magnetization_per_volume: f64,

    /// Minimum number of symmetry-distinct magnetic sites
    #[arg(long, default_value_t = 2)]
    pub min_unique_magnetic_sites: u32,

    /// Output CSV (ID,formula), usable as fetch input
    #[arg(short, long)]
    pub output: PathBuf,

    /// Minimum delay between two requests, in milliseconds
    #[arg(long, default_value_t = 0)]
    pub sleep_ms: u64,

    /// Per-request timeout, in seconds
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,

    #[command(flatten)]
    pub api: MpApiArgs,
}
