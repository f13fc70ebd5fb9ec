//! # plot 子命令实现
//!
//! 单文件模式直接渲染并在失败时返回错误；`--all` 模式收集目录下的
//! 输入文件批量渲染，单个文件失败只记入汇总。
//!
//! ## 依赖关系
//! - 使用 `cli/plot.rs` 定义的 PlotArgs
//! - 使用 `plot/` 渲染
//! - 使用 `batch/` 收集文件与并行执行

use crate::batch::{BatchRunner, BatchSummary, FileCollector};
use crate::cli::plot::PlotArgs;
use crate::error::{Result, ScreenError};
use crate::models::PropertyKind;
use crate::plot::{self, PlotConfig};
use crate::utils::output;

use std::path::{Path, PathBuf};

/// 执行 plot 命令
pub fn execute(args: PlotArgs) -> Result<()> {
    output::print_header("DOS / Band Structure Plot");

    if let Some(ref dir) = args.all {
        let config = args.render.to_config(None);
        config.validate()?;
        let collector = FileCollector::new(dir.clone())
            .with_pattern(&args.pattern)?
            .recursive(!args.no_recursive);
        return execute_batch(dir, &collector, &args.pattern, args.jobs, &config);
    }

    let (input, expected) = match (&args.dos, &args.bands) {
        (Some(p), _) => (p, PropertyKind::Dos),
        (None, Some(p)) => (p, PropertyKind::Bands),
        (None, None) => {
            return Err(ScreenError::InvalidArgument(
                "one of --dos, --bands or --all is required".to_string(),
            ))
        }
    };
    let config = args.render.to_config(args.output.as_deref());
    let written = render_single(input, expected, args.output.as_deref(), &config)?;
    output::print_written(&input.display().to_string(), &written.display().to_string());
    Ok(())
}

/// 渲染单个文件；记录类型必须与请求一致
pub fn render_single(
    input: &Path,
    expected: PropertyKind,
    output: Option<&Path>,
    config: &PlotConfig,
) -> Result<PathBuf> {
    config.validate()?;
    let plottable = plot::load_plottable(input)?;
    if plottable.kind() != expected {
        return Err(ScreenError::FormatError {
            path: input.display().to_string(),
            reason: format!("expected a {} record, found {}", expected, plottable.kind()),
        });
    }
    let target = match output {
        Some(p) => p.to_path_buf(),
        None => plot::default_output(input, config.format),
    };
    plot::render_record(&plottable, &target, config)?;
    Ok(target)
}

/// 批量模式
fn execute_batch(
    dir: &Path,
    collector: &FileCollector,
    pattern: &str,
    jobs: usize,
    config: &PlotConfig,
) -> Result<()> {
    output::print_info(&format!("Batch mode: directory '{}'", dir.display()));

    let files = collector.collect()?;

    if files.is_empty() {
        output::print_warning(&format!(
            "No matching files found with pattern '{}'",
            pattern
        ));
        return Ok(());
    }
    output::print_info(&format!("Found {} files to plot", files.len()));

    let runner = BatchRunner::new(jobs);
    let results = runner.run(&files, "Plotting", |file, _| {
        plot::render_file(file, None, config)
    })?;

    let mut summary = BatchSummary::default();
    for (file, result) in files.iter().zip(results) {
        match result {
            Ok(_) => summary.record_success(),
            Err(e) => {
                let category = match e {
                    ScreenError::FormatError { .. } => "format",
                    _ => "plot",
                };
                tracing::warn!(file = %file.display(), "{}", e);
                summary.record_failure(&file.display().to_string(), category, &e.to_string());
            }
        }
    }

    super::print_batch_summary(&summary);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_single_rejects_kind_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dos.json");
        std::fs::write(
            &path,
            r#"{"efermi": 0.0, "energies": [-1.0, 0.0, 1.0], "densities": {"1": [1.0, 2.0, 1.0]}}"#,
        )
        .unwrap();

        let err = render_single(&path, PropertyKind::Bands, None, &PlotConfig::default());
        assert!(matches!(err, Err(ScreenError::FormatError { .. })));
    }

    #[test]
    fn test_render_single_rejects_empty_dos_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dos.json");
        std::fs::write(
            &path,
            r#"{"efermi": 0.0, "energies": [], "densities": {"1": []}}"#,
        )
        .unwrap();

        let err = render_single(&path, PropertyKind::Dos, None, &PlotConfig::default());
        assert!(matches!(err, Err(ScreenError::FormatError { .. })));
        assert!(!dir.path().join("dos.png").exists());
    }
}
