//! # query 子命令实现
//!
//! 按元素集合或化学式检索 NEMAD，结果写出为 JSON 与 CSV。
//!
//! ## 功能
//! - `--elements Fe,Co`: 单次元素检索
//! - `--input mp.csv`: 每行化学式生成一次检索（元素集合或精确化学式）
//! - 多元素检索采用 AND 语义，在客户端按化学式复核，并截断到 `--limit`
//! - 单次检索失败记入 `errors.csv`，其余检索继续
//!
//! ## 依赖关系
//! - 使用 `cli/query.rs` 定义的 QueryArgs
//! - 使用 `remote/nemad.rs` 访问 NEMAD
//! - 使用 `normalize/nemad.rs` 标准化结果

use crate::batch::driver::write_errors_csv;
use crate::batch::BatchSummary;
use crate::cli::query::QueryArgs;
use crate::config::RemoteConfig;
use crate::error::{ItemError, Result, ScreenError};
use crate::models::{NemadEntry, QueryFilter, QueryTarget};
use crate::normalize::nemad::normalize_entry;
use crate::parsers::{formula, IdentifierSource};
use crate::remote::{NemadClient, PropertyDatabase};
use crate::utils::{output, progress};

use indicatif::ProgressBar;
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

pub const RESULTS_JSON: &str = "nemad_results.json";
pub const RESULTS_CSV: &str = "nemad_results.csv";
const ERRORS_FILE: &str = "errors.csv";

/// 输入 CSV 中的化学式列（按顺序取第一个存在的）
const FORMULA_COLUMNS: [&str; 3] = ["compound", "pretty_formula", "formula"];

/// 执行 query 命令
pub fn execute(args: QueryArgs) -> Result<()> {
    output::print_header("NEMAD Query");

    let config = RemoteConfig::new(
        "NEMAD",
        "NEMAD_API_KEY",
        args.api.api_key.as_deref(),
        &args.api.endpoint,
    )?
    .with_timeout(args.timeout_secs)
    .with_min_interval_ms(args.sleep_ms);
    tracing::debug!(?config, "remote configuration");

    if args.limit == 0 {
        return Err(ScreenError::InvalidArgument(
            "--limit must be at least 1".to_string(),
        ));
    }

    let queries = build_queries(&args)?;
    output::print_info(&format!(
        "{} quer{} against '{}' (limit {}, {:?} match)",
        queries.len(),
        if queries.len() == 1 { "y" } else { "ies" },
        args.db,
        args.limit,
        args.match_mode
    ));

    let client = NemadClient::new(&config)?;
    let pb = progress::create_progress_bar(queries.len() as u64, "Querying");
    let outcome = run_queries(&client, &queries, &pb);
    pb.finish_and_clear();

    std::fs::create_dir_all(&args.output).map_err(|e| ScreenError::FileWriteError {
        path: args.output.display().to_string(),
        source: e,
    })?;
    write_results_json(&args.output.join(RESULTS_JSON), &outcome.entries)?;
    write_results_csv(&args.output.join(RESULTS_CSV), &outcome.entries)?;
    write_errors_csv(&args.output.join(ERRORS_FILE), &outcome.summary)?;

    super::print_batch_summary(&outcome.summary);
    if outcome.rejected > 0 {
        output::print_info(&format!(
            "{} returned entries did not match the requested elements and were dropped",
            outcome.rejected
        ));
    }
    output::print_done(&format!(
        "{} entries written to '{}'",
        outcome.entries.len(),
        args.output.display()
    ));
    Ok(())
}

/// 由参数构造检索列表
fn build_queries(args: &QueryArgs) -> Result<Vec<QueryFilter>> {
    let make = |target: QueryTarget| QueryFilter {
        db: args.db,
        target,
        limit: args.limit,
        mode: args.match_mode,
    };

    if let Some(ref elements) = args.elements {
        let els = formula::parse_element_list(elements).map_err(ScreenError::InvalidArgument)?;
        return Ok(vec![make(QueryTarget::elements(els))]);
    }

    let input = match args.input {
        Some(ref p) => p,
        None => {
            return Err(ScreenError::InvalidArgument(
                "either --elements or --input is required".to_string(),
            ))
        }
    };
    let source = match args.column {
        Some(ref c) => IdentifierSource::new(input).with_column(c.clone()),
        None => IdentifierSource::new(input).with_columns(FORMULA_COLUMNS),
    };
    let formulas: Vec<String> = source
        .read_all()?
        .into_iter()
        .map(|f| f.as_str().to_string())
        .collect();
    Ok(targets_from_formulas(&formulas, args.by_formula)
        .into_iter()
        .map(make)
        .collect())
}

/// 化学式列表转检索目标；去重并保持顺序
pub fn targets_from_formulas(formulas: &[String], by_formula: bool) -> Vec<QueryTarget> {
    let mut seen = HashSet::new();
    formulas
        .iter()
        .filter_map(|f| {
            if by_formula {
                Some(QueryTarget::Formula(f.clone()))
            } else {
                let els = formula::elements(f);
                (!els.is_empty()).then(|| QueryTarget::Elements(els))
            }
        })
        .filter(|t| seen.insert(t.label()))
        .collect()
}

/// 检索结果
#[derive(Debug, Default)]
pub struct QueryOutcome {
    pub entries: Vec<NemadEntry>,
    pub summary: BatchSummary,
    /// 因元素不符被丢弃的条目数
    pub rejected: usize,
}

/// 依次执行检索
pub fn run_queries(
    db: &dyn PropertyDatabase,
    queries: &[QueryFilter],
    pb: &ProgressBar,
) -> QueryOutcome {
    let mut outcome = QueryOutcome::default();

    for filter in queries {
        let label = filter.target.label();
        match db.search(filter) {
            Ok(values) => {
                let (entries, rejected) = collect_entries(filter, &label, values, pb);
                tracing::debug!(query = %label, kept = entries.len(), rejected, "query done");
                outcome.rejected += rejected;
                outcome.entries.extend(entries);
                outcome.summary.record_success();
            }
            Err(e) => {
                let err = ItemError::from(e);
                tracing::warn!(query = %label, "{}", err);
                outcome
                    .summary
                    .record_failure(&label, err.category(), &err.to_string());
            }
        }
        pb.inc(1);
    }
    outcome
}

/// 标准化、按元素复核并截断
fn collect_entries(
    filter: &QueryFilter,
    label: &str,
    values: Vec<Value>,
    pb: &ProgressBar,
) -> (Vec<NemadEntry>, usize) {
    let mut entries = Vec::new();
    let mut rejected = 0;
    for value in values {
        if entries.len() >= filter.limit {
            break;
        }
        match normalize_entry(filter.db, label, value) {
            Ok(entry) if filter.accepts(&entry.material_name) => entries.push(entry),
            Ok(entry) => {
                tracing::debug!(query = %label, material = %entry.material_name, "dropped by element filter");
                rejected += 1;
            }
            Err(e) => {
                pb.suspend(|| output::print_warning(&format!("{}: skipped entry: {}", label, e)));
                rejected += 1;
            }
        }
    }
    (entries, rejected)
}

// ─────────────────────────────────────────────────────────────
// 输出
// ─────────────────────────────────────────────────────────────

fn write_results_json(path: &Path, entries: &[NemadEntry]) -> Result<()> {
    let mut text = serde_json::to_string_pretty(entries)?;
    text.push('\n');
    std::fs::write(path, text).map_err(|e| ScreenError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}

const FIXED_COLUMNS: [&str; 8] = [
    "db",
    "query",
    "Material_Name",
    "Curie",
    "Neel",
    "Magnetic_Moment",
    "Crystal_Structure",
    "DOI",
];

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn opt_number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// 写出 CSV：固定列在前，其余属性列按名称排序
fn write_results_csv(path: &Path, entries: &[NemadEntry]) -> Result<()> {
    let extra: BTreeSet<&str> = entries
        .iter()
        .flat_map(|e| e.properties.keys().map(String::as_str))
        .collect();

    let mut wtr = csv::Writer::from_path(path)?;
    let header: Vec<&str> = FIXED_COLUMNS.iter().copied().chain(extra.iter().copied()).collect();
    wtr.write_record(&header)?;

    for e in entries {
        let mut row = vec![
            e.db.clone(),
            e.query.clone(),
            e.material_name.clone(),
            opt_number(e.curie),
            opt_number(e.neel),
            opt_number(e.magnetic_moment),
            e.crystal_structure.clone().unwrap_or_default(),
            e.doi.clone().unwrap_or_default(),
        ];
        row.extend(
            extra
                .iter()
                .map(|k| e.properties.get(*k).map(cell).unwrap_or_default()),
        );
        wtr.write_record(&row)?;
    }
    wtr.flush().map_err(|e| ScreenError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteError;
    use crate::models::{MatchMode, NemadDb};
    use serde_json::json;

    /// 内存中的 NEMAD：按元素检索时忽略 AND 语义，返回所有含任一元素的条目
    struct FakeDb {
        rows: Vec<Value>,
    }

    impl PropertyDatabase for FakeDb {
        fn search(&self, filter: &QueryFilter) -> std::result::Result<Vec<Value>, RemoteError> {
            let wanted = filter.target.required_elements();
            if wanted.iter().any(|e| e == "Xx") {
                return Err(RemoteError::Api {
                    status: 500,
                    body: "boom".to_string(),
                });
            }
            Ok(self
                .rows
                .iter()
                .filter(|r| {
                    let name = r["Material_Name"].as_str().unwrap_or_default();
                    formula::elements(name).iter().any(|e| wanted.contains(e))
                })
                .cloned()
                .collect())
        }
    }

    fn fake_db() -> FakeDb {
        let mut rows = Vec::new();
        for i in 0..30 {
            rows.push(json!({"Material_Name": format!("Fe{}Co", i + 1), "Curie": 1000 + i}));
            rows.push(json!({"Material_Name": format!("Fe{}Ni", i + 1), "Curie": 800 + i}));
        }
        rows.push(json!({"Material_Name": "Co2MnSi", "Curie": 985}));
        rows.push(json!({"Material_Name": "FeCoSi", "Curie": "1100"}));
        FakeDb { rows }
    }

    fn filter(elements: &[&str], limit: usize, mode: MatchMode) -> QueryFilter {
        QueryFilter {
            db: NemadDb::Magnetic,
            target: QueryTarget::elements(elements.iter().copied()),
            limit,
            mode,
        }
    }

    #[test]
    fn test_limit_and_and_semantics() {
        let db = fake_db();
        let pb = ProgressBar::hidden();
        let outcome = run_queries(&db, &[filter(&["Fe", "Co"], 20, MatchMode::Superset)], &pb);

        assert_eq!(outcome.summary.succeeded, 1);
        assert_eq!(outcome.entries.len(), 20);
        for entry in &outcome.entries {
            let els = formula::elements(&entry.material_name);
            assert!(els.contains(&"Fe".to_string()) && els.contains(&"Co".to_string()));
            assert_eq!(entry.query, "Co,Fe");
        }
    }

    #[test]
    fn test_exact_mode_excludes_extra_elements() {
        let db = fake_db();
        let pb = ProgressBar::hidden();
        let outcome = run_queries(&db, &[filter(&["Fe", "Co"], 100, MatchMode::Exact)], &pb);
        assert_eq!(outcome.entries.len(), 30);
        assert!(outcome.entries.iter().all(|e| e.material_name != "FeCoSi"));
    }

    #[test]
    fn test_failed_query_is_recorded_and_others_continue() {
        let db = fake_db();
        let pb = ProgressBar::hidden();
        let outcome = run_queries(
            &db,
            &[
                filter(&["Xx"], 10, MatchMode::Exact),
                filter(&["Mn", "Co", "Si"], 10, MatchMode::Exact),
            ],
            &pb,
        );
        assert_eq!(outcome.summary.failed, 1);
        assert_eq!(outcome.summary.failures[0].identifier, "Xx");
        assert_eq!(outcome.summary.failures[0].category, "remote");
        assert_eq!(outcome.entries.len(), 1);
        assert_eq!(outcome.entries[0].curie, Some(985.0));
    }

    #[test]
    fn test_targets_from_formulas() {
        let formulas: Vec<String> = ["Fe3O4", "O4Fe3", "Fe2O3", "123"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let by_elements = targets_from_formulas(&formulas, false);
        assert_eq!(by_elements, vec![QueryTarget::Elements(vec!["Fe".into(), "O".into()])]);

        let by_formula = targets_from_formulas(&formulas, true);
        assert_eq!(by_formula.len(), 4);
        assert_eq!(by_formula[0], QueryTarget::Formula("Fe3O4".to_string()));
    }

    #[test]
    fn test_results_csv_has_fixed_then_extra_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(RESULTS_CSV);
        let entry = normalize_entry(
            NemadDb::Magnetic,
            "Co,Fe",
            json!({"Material_Name": "FeCo", "Curie": 1250, "Synthesis": "arc", "Year": 2001}),
        )
        .unwrap();
        write_results_csv(&path, &[entry]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "db,query,Material_Name,Curie,Neel,Magnetic_Moment,Crystal_Structure,DOI,Synthesis,Year"
        );
        assert_eq!(lines.next().unwrap(), "magnetic,\"Co,Fe\",FeCo,1250,,,,,arc,2001");
    }
}
