//! # tmscreen - 过渡金属磁性材料筛选工具
//!
//! 从 Materials Project 与 NEMAD 批量获取材料数据，标准化为统一记录，
//! 并绘制态密度 / 能带图。
//!
//! ## 子命令
//! - `fetch`  - 按标识批量获取并标准化属性
//! - `query`  - 按元素 / 化学式检索 NEMAD
//! - `plot`   - 绘制 DOS / 能带图
//! - `screen` - 检索磁性过渡金属候选材料
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── batch/     (批量驱动与执行器)
//!   │     ├── remote/    (MP / NEMAD 客户端)
//!   │     ├── normalize/ (响应标准化)
//!   │     ├── plot/      (绘图)
//!   │     ├── parsers/   (标识列表与化学式)
//!   │     └── models/    (数据模型)
//!   ├── config.rs   (远程服务配置)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod config;
mod error;
mod models;
mod normalize;
mod parsers;
mod plot;
mod remote;
mod utils;

use clap::Parser;
use cli::Cli;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// 初始化诊断日志（写到 stderr；`RUST_LOG` 优先）
fn init_tracing(verbose: bool) {
    let default = if verbose { "tmscreen=debug" } else { "tmscreen=warn" };
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
