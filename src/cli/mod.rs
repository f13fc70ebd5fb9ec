//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `fetch`: 按标识批量获取 Materials Project 属性
//! - `query`: 按元素 / 化学式检索 NEMAD
//! - `plot`: 绘制 DOS / 能带图
//! - `screen`: 在 Materials Project 中检索磁性过渡金属候选
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: fetch, query, plot, screen

pub mod fetch;
pub mod plot;
pub mod query;
pub mod screen;

use crate::config::{MP_DEFAULT_ENDPOINT, NEMAD_DEFAULT_ENDPOINT};

use clap::{Args, Parser, Subcommand};

/// tmscreen - 过渡金属磁性材料筛选工具
#[derive(Parser)]
#[command(name = "tmscreen")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Retrieve, normalize and plot materials data from Materials Project and NEMAD", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Print debug logs to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Fetch and normalize properties for a list of material identifiers
    Fetch(fetch::FetchArgs),

    /// Query NEMAD by element set or formula
    Query(query::QueryArgs),

    /// Render DOS / band structure JSON to PNG or SVG
    Plot(plot::PlotArgs),

    /// Search Materials Project for magnetic transition-metal candidates
    Screen(screen::ScreenArgs),
}

// ─────────────────────────────────────────────────────────────
// 远程服务参数
// ─────────────────────────────────────────────────────────────

/// Materials Project 连接参数
#[derive(Args, Debug, Clone)]
pub struct MpApiArgs {
    /// Materials Project API key
    #[arg(long = "mp-api-key", env = "MP_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Materials Project API endpoint
    #[arg(long = "mp-endpoint", env = "MP_API_ENDPOINT", default_value = MP_DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

/// NEMAD 连接参数
#[derive(Args, Debug, Clone)]
pub struct NemadApiArgs {
    /// NEMAD API key
    #[arg(long = "nemad-api-key", env = "NEMAD_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// NEMAD API endpoint
    #[arg(long = "nemad-endpoint", env = "NEMAD_API_ENDPOINT", default_value = NEMAD_DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_fetch_properties() {
        let cli = Cli::try_parse_from([
            "tmscreen",
            "fetch",
            "--input",
            "ids.csv",
            "--output",
            "out",
            "--properties",
            "summary,dos",
            "--mp-api-key",
            "k",
        ])
        .unwrap();
        match cli.command {
            Commands::Fetch(args) => {
                assert_eq!(
                    args.properties,
                    vec![
                        crate::models::PropertyKind::Summary,
                        crate::models::PropertyKind::Dos
                    ]
                );
                assert_eq!(args.jobs, 1);
                assert!(!args.plot);
            }
            _ => panic!("expected fetch"),
        }
    }

    #[test]
    fn test_query_requires_exactly_one_target() {
        assert!(Cli::try_parse_from(["tmscreen", "query", "--db", "magnetic"]).is_err());
        assert!(Cli::try_parse_from([
            "tmscreen",
            "query",
            "--db",
            "magnetic",
            "--elements",
            "Fe,Co",
            "--input",
            "mp.csv"
        ])
        .is_err());
        let cli = Cli::try_parse_from([
            "tmscreen",
            "query",
            "--db",
            "magnetic_anisotropy",
            "--elements",
            "Fe,Co",
            "--limit",
            "20",
        ])
        .unwrap();
        match cli.command {
            Commands::Query(args) => {
                assert_eq!(args.db, crate::models::NemadDb::MagneticAnisotropy);
                assert_eq!(args.limit, 20);
                assert_eq!(args.sleep_ms, 250);
            }
            _ => panic!("expected query"),
        }
    }

    #[test]
    fn test_plot_accepts_negative_emin() {
        let cli = Cli::try_parse_from([
            "tmscreen", "plot", "--dos", "dos.json", "--emin", "-3", "--emax", "2",
        ])
        .unwrap();
        match cli.command {
            Commands::Plot(args) => {
                assert_eq!(args.render.emin, -3.0);
                assert_eq!(args.render.emax, 2.0);
            }
            _ => panic!("expected plot"),
        }
    }
}
