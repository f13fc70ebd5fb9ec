//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `batch/`, `remote/`, `plot/`, `utils/`
//! - 子模块: fetch, query, plot, screen

pub mod fetch;
pub mod plot;
pub mod query;
pub mod screen;

use crate::batch::{BatchSummary, Failure};
use crate::cli::Commands;
use crate::error::Result;
use crate::utils::output;

use tabled::{Table, Tabled};

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Fetch(args) => fetch::execute(args),
        Commands::Query(args) => query::execute(args),
        Commands::Plot(args) => plot::execute(args),
        Commands::Screen(args) => screen::execute(args),
    }
}

/// 失败表格最多显示的行数
const MAX_FAILURE_ROWS: usize = 10;

#[derive(Tabled)]
struct FailureRow {
    #[tabled(rename = "Item")]
    item: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

/// 打印运行统计与失败表格
pub(crate) fn print_batch_summary(summary: &BatchSummary) {
    output::print_separator();
    output::print_success(&format!(
        "Batch complete: {} items, {} success, {} skipped, {} failed",
        summary.total(),
        summary.succeeded,
        summary.skipped,
        summary.failed
    ));
    print_failures(&summary.failures);
}

/// 打印前若干个失败条目
pub(crate) fn print_failures(failures: &[Failure]) {
    if failures.is_empty() {
        return;
    }
    output::print_warning(&format!("{} item(s) failed:", failures.len()));
    let rows: Vec<FailureRow> = failures
        .iter()
        .take(MAX_FAILURE_ROWS)
        .map(|f| FailureRow {
            item: f.identifier.clone(),
            category: f.category.clone(),
            reason: truncate(&f.reason, 80),
        })
        .collect();
    println!("{}", Table::new(&rows));
    if failures.len() > MAX_FAILURE_ROWS {
        output::print_warning(&format!(
            "  ... and {} more",
            failures.len() - MAX_FAILURE_ROWS
        ));
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() <= max_chars {
        line.to_string()
    } else {
        format!("{}...", line.chars().take(max_chars).collect::<String>())
    }
}
