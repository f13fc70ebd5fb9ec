//! # fetch 子命令实现
//!
//! 读取标识列表，从 Materials Project 获取并标准化请求的属性，
//! 写出单条目 JSON、可选图像以及 `summary.csv` / `errors.csv`。
//!
//! ## 依赖关系
//! - 使用 `cli/fetch.rs` 定义的 FetchArgs
//! - 使用 `batch/driver.rs` 执行批量获取
//! - 使用 `remote/mp.rs` 访问 Materials Project

use crate::batch::{BatchDriver, DriverConfig};
use crate::cli::fetch::FetchArgs;
use crate::config::RemoteConfig;
use crate::error::Result;
use crate::models::PropertyKind;
use crate::parsers::IdentifierSource;
use crate::remote::MpClient;
use crate::utils::output;

/// 执行 fetch 命令
pub fn execute(args: FetchArgs) -> Result<()> {
    output::print_header("Materials Project Property Fetch");

    // 密钥缺失时在读取输入前失败
    let config = RemoteConfig::new(
        "Materials Project",
        "MP_API_KEY",
        args.api.api_key.as_deref(),
        &args.api.endpoint,
    )?
    .with_timeout(args.timeout_secs)
    .with_min_interval_ms(args.sleep_ms);
    tracing::debug!(?config, "remote configuration");

    let plot_config = if args.plot {
        let c = args.render.to_config(None);
        c.validate()?;
        Some(c)
    } else {
        None
    };

    let mut source = IdentifierSource::new(&args.input);
    if let Some(ref column) = args.column {
        source = source.with_column(column.clone());
    }
    let ids = source.read_all()?;

    let kinds = unique_kinds(&args.properties);
    output::print_info(&format!(
        "Read {} identifiers from '{}'",
        ids.len(),
        args.input.display()
    ));
    output::print_info(&format!(
        "Properties: {}",
        kinds
            .iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    ));
    if args.plot && !kinds.iter().any(PropertyKind::is_plottable) {
        output::print_warning("--plot has no effect without dos or bands");
    }
    if kinds.contains(&PropertyKind::Bands) {
        output::print_info(&format!("Band path type: {}", args.path_type.api_key()));
    }

    let client = MpClient::new(&config)?.with_path_type(args.path_type);
    let driver = BatchDriver::new(
        &client,
        DriverConfig::new(&args.output, kinds)
            .with_plot(plot_config)
            .with_jobs(args.jobs),
    );
    let report = driver.run(&ids)?;

    super::print_batch_summary(&report.summary);
    if !report.plot_warnings.is_empty() {
        output::print_warning(&format!(
            "{} plot(s) could not be rendered",
            report.plot_warnings.len()
        ));
    }
    output::print_done(&format!(
        "Summary written to '{}', errors to '{}'",
        report.summary_csv.display(),
        report.errors_csv.display()
    ));

    Ok(())
}

/// 去除重复的属性类型，保留首次出现的顺序
fn unique_kinds(kinds: &[PropertyKind]) -> Vec<PropertyKind> {
    let mut out = Vec::with_capacity(kinds.len());
    for &kind in kinds {
        if !out.contains(&kind) {
            out.push(kind);
        }
    }
    out
}
