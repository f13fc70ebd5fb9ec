//! # 终端输出工具
//!
//! 统一 `[OK]` / `[WARN]` / `[ERR]` 等前缀样式。进度条运行期间应通过
//! `ProgressBar::suspend` 调用，避免与进度条输出交错。
//!
//! ## 依赖关系
//! - 被 `commands/`, `batch/driver.rs`, `main.rs` 使用
//! - 使用 `colored` crate

use colored::Colorize;

pub fn print_success(msg: &str) {
    println!("{} {}", "[OK]".green().bold(), msg);
}

/// 错误写到 stderr
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[ERR]".red().bold(), msg);
}

pub fn print_warning(msg: &str) {
    println!("{} {}", "[WARN]".yellow().bold(), msg);
}

pub fn print_info(msg: &str) {
    println!("{} {}", "[*]".blue().bold(), msg);
}

/// 跳过的条目（如重复标识）
pub fn print_skip(msg: &str) {
    println!("{} {}", "[SKIP]".dimmed(), msg);
}

pub fn print_done(msg: &str) {
    println!("{} {}", "[DONE]".green().bold(), msg);
}

/// 输入文件 -> 生成文件
pub fn print_written(input: &str, written: &str) {
    println!(
        "{} {} {} {}",
        "[OK]".green().bold(),
        input.dimmed(),
        "->".cyan(),
        written
    );
}

/// 打印命令标题栏
pub fn print_header(title: &str) {
    let line = "─".repeat(60);
    println!("\n{}", line.dimmed());
    println!("  {} {}", "tmscreen".cyan().bold(), title.bold());
    println!("{}\n", line.dimmed());
}

pub fn print_separator() {
    println!("{}", "─".repeat(60).dimmed());
}
