//! # screen 子命令实现
//!
//! 在 Materials Project 中检索磁性过渡金属候选材料，写出 `ID,formula`
//! 列表，可直接作为 fetch 的输入。
//!
//! ## 功能
//! - 每个元素 × 每组排除元素各检索一次，结果取并集并按 ID 排序
//! - 形成能必须严格小于 0（服务端过滤为闭区间，这里再检查一次）
//! - 默认只保留铁磁（FM）候选，逐个获取磁性文档比对；`--any-ordering` 关闭
//!
//! ## 依赖关系
//! - 使用 `cli/screen.rs` 定义的 ScreenArgs
//! - 使用 `remote/mp.rs` 的候选检索与属性获取

use crate::cli::screen::{OrderingFilter, ScreenArgs};
use crate::config::RemoteConfig;
use crate::error::{Result, ScreenError};
use crate::models::{Identifier, NormalizedRecord, PropertyKind};
use crate::normalize;
use crate::parsers::formula;
use crate::remote::mp::{candidate_from_doc, chunk_symbols};
use crate::remote::{CandidateSearch, CandidateSource, MaterialsSource, MpClient};
use crate::utils::{output, progress};

use indicatif::ProgressBar;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// 排除元素拼接后单次请求允许的最大长度
const EXCLUDE_CHUNK_CHARS: usize = 55;

/// 检索计划
#[derive(Debug, Clone)]
pub struct ScreenPlan {
    pub searches: Vec<CandidateSearch>,
    pub ordering: Option<OrderingFilter>,
}

impl ScreenPlan {
    pub fn from_args(args: &ScreenArgs) -> Result<Self> {
        let elements =
            formula::parse_element_list(&args.elements).map_err(ScreenError::InvalidArgument)?;
        let exclude = if args.exclude.trim().is_empty() {
            Vec::new()
        } else {
            formula::parse_element_list(&args.exclude).map_err(ScreenError::InvalidArgument)?
        };

        let mut chunks = chunk_symbols(&exclude, EXCLUDE_CHUNK_CHARS);
        if chunks.is_empty() {
            chunks.push(Vec::new());
        }

        let searches = elements
            .iter()
            .flat_map(|element| {
                chunks.iter().map(move |chunk| CandidateSearch {
                    element: element.clone(),
                    exclude: chunk.clone(),
                    min_magnetization_per_volume: args.min_magnetization_per_volume,
                    min_unique_magnetic_sites: args.min_unique_magnetic_sites,
                })
            })
            .collect();

        Ok(Self {
            searches,
            ordering: (!args.any_ordering).then_some(args.ordering),
        })
    }
}

/// 执行 screen 命令
pub fn execute(args: ScreenArgs) -> Result<()> {
    output::print_header("Materials Project Candidate Screen");

    let config = RemoteConfig::new(
        "Materials Project",
        "MP_API_KEY",
        args.api.api_key.as_deref(),
        &args.api.endpoint,
    )?
    .with_timeout(args.timeout_secs)
    .with_min_interval_ms(args.sleep_ms);
    tracing::debug!(?config, "remote configuration");

    let plan = ScreenPlan::from_args(&args)?;
    output::print_info(&format!("Running {} searches", plan.searches.len()));

    let client = MpClient::new(&config)?;
    let pb = progress::create_spinner("Searching candidates");
    let candidates = screen_candidates(&client, &plan, &pb);
    pb.finish_and_clear();

    if candidates.is_empty() {
        output::print_warning("No candidates matched the search criteria");
    }
    write_candidates_csv(&args.output, &candidates)?;

    output::print_done(&format!(
        "{} candidates written to '{}'",
        candidates.len(),
        args.output.display()
    ));
    Ok(())
}

/// 执行全部检索并按磁序过滤，返回按 ID 排序的 (ID, 化学式)
pub fn screen_candidates<S>(source: &S, plan: &ScreenPlan, pb: &ProgressBar) -> BTreeMap<String, String>
where
    S: CandidateSource + MaterialsSource,
{
    let mut found = BTreeMap::new();
    for search in &plan.searches {
        pb.set_message(format!("Searching {}", search.element));
        match source.search_candidates(search) {
            Ok(docs) => {
                let total = docs.len();
                let before = found.len();
                let mut kept = 0;
                for (id, formula) in docs.iter().filter_map(candidate_from_doc) {
                    kept += 1;
                    found.insert(id, formula);
                }
                tracing::debug!(
                    element = %search.element,
                    total,
                    kept,
                    new = found.len() - before,
                    "search finished"
                );
            }
            Err(e) => {
                pb.suspend(|| {
                    output::print_warning(&format!("Search for {} failed: {}", search.element, e))
                });
            }
        }
    }

    let Some(ordering) = plan.ordering else {
        return found;
    };

    found
        .into_iter()
        .filter(|(id, _)| {
            pb.set_message(format!("Checking ordering of {}", id));
            match magnetic_ordering(source, id) {
                Ok(actual) => actual == ordering.as_str(),
                Err(reason) => {
                    pb.suspend(|| {
                        output::print_warning(&format!("{}: dropped, {}", id, reason))
                    });
                    false
                }
            }
        })
        .collect()
}

fn magnetic_ordering<S: MaterialsSource>(source: &S, id: &str) -> std::result::Result<String, String> {
    let id = Identifier::new(id).ok_or_else(|| "empty identifier".to_string())?;
    let raw = source
        .fetch(&id, PropertyKind::Magnetic)
        .map_err(|e| e.to_string())?;
    match normalize::normalize(&id, &raw).map_err(|e| e.to_string())? {
        NormalizedRecord::Magnetic(record) => Ok(record.ordering),
        other => Err(format!("unexpected {} record", other.kind())),
    }
}

/// 写出候选列表（表头 `ID,formula`）
pub fn write_candidates_csv(path: &Path, candidates: &BTreeMap<String, String>) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| ScreenError::FileWriteError {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
    }
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["ID", "formula"])?;
    for (id, formula) in candidates {
        writer.write_record([id.as_str(), formula.as_str()])?;
    }
    writer.flush().map_err(|e| ScreenError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use crate::error::RemoteError;
    use crate::models::RawResponse;
    use crate::parsers::IdentifierSource;
    use clap::Parser;
    use serde_json::{json, Value};
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakeMp {
        by_element: HashMap<String, Vec<Value>>,
        orderings: HashMap<String, String>,
    }

    impl CandidateSource for FakeMp {
        fn search_candidates(
            &self,
            search: &CandidateSearch,
        ) -> std::result::Result<Vec<Value>, RemoteError> {
            self.by_element
                .get(&search.element)
                .cloned()
                .ok_or_else(|| RemoteError::Network("connection refused".to_string()))
        }
    }

    impl MaterialsSource for FakeMp {
        fn fetch(
            &self,
            id: &Identifier,
            kind: PropertyKind,
        ) -> std::result::Result<RawResponse, RemoteError> {
            let ordering = self
                .orderings
                .get(id.as_str())
                .ok_or_else(|| RemoteError::NotFound { what: id.to_string() })?;
            Ok(RawResponse::new(
                kind,
                json!({"material_id": id.as_str(), "ordering": ordering}),
            ))
        }
    }

    fn parse_args(extra: &[&str]) -> ScreenArgs {
        let mut argv = vec!["tmscreen", "screen", "--output", "out.csv", "--mp-api-key", "k"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Screen(args) => args,
            _ => panic!("expected screen"),
        }
    }

    fn doc(id: &str, formula: &str) -> Value {
        doc_with_energy(id, formula, -0.5)
    }

    fn doc_with_energy(id: &str, formula: &str, energy: f64) -> Value {
        json!({"material_id": id, "formula_pretty": formula, "formation_energy_per_atom": energy})
    }

    #[test]
    fn test_plan_chunks_default_exclusions() {
        let plan = ScreenPlan::from_args(&parse_args(&[])).unwrap();
        assert_eq!(plan.ordering, Some(OrderingFilter::Fm));
        let per_element = plan.searches.len() / 5;
        assert_eq!(plan.searches.len() % 5, 0);
        assert!(per_element >= 2);
        for search in &plan.searches {
            assert!(search.exclude.join(",").len() <= EXCLUDE_CHUNK_CHARS);
        }
    }

    #[test]
    fn test_plan_without_exclusions_has_one_search_per_element() {
        let plan = ScreenPlan::from_args(&parse_args(&["--elements", "Fe,Co", "--exclude", ""])).unwrap();
        assert_eq!(plan.searches.len(), 2);
        assert!(plan.searches[0].exclude.is_empty());
    }

    #[test]
    fn test_any_ordering_disables_filter() {
        let plan = ScreenPlan::from_args(&parse_args(&["--any-ordering"])).unwrap();
        assert_eq!(plan.ordering, None);

        let argv = [
            "tmscreen", "screen", "-o", "out.csv", "--mp-api-key", "k",
            "--any-ordering", "--ordering", "AFM",
        ];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_union_is_sorted_and_failed_search_is_skipped() {
        let mut fake = FakeMp::default();
        fake.by_element.insert(
            "Fe".to_string(),
            vec![doc("mp-20", "Fe3O4"), doc("mp-13", "Fe")],
        );
        fake.by_element
            .insert("Co".to_string(), vec![doc("mp-13", "Fe"), doc("mp-102", "Co")]);
        let plan =
            ScreenPlan::from_args(&parse_args(&["-e", "Fe,Co,Ni", "-x", "", "--any-ordering"]))
                .unwrap();

        let found = screen_candidates(&fake, &plan, &ProgressBar::hidden());
        let ids: Vec<_> = found.keys().cloned().collect();
        assert_eq!(ids, vec!["mp-102", "mp-13", "mp-20"]);
    }

    #[test]
    fn test_zero_formation_energy_is_dropped() {
        let mut fake = FakeMp::default();
        fake.by_element.insert(
            "Fe".to_string(),
            vec![
                doc_with_energy("mp-1", "FeO", -0.8),
                doc_with_energy("mp-2", "Fe", 0.0),
                doc_with_energy("mp-3", "FeH", 0.02),
                json!({"material_id": "mp-4", "formula_pretty": "FeN"}),
            ],
        );
        for id in ["mp-1", "mp-2", "mp-3", "mp-4"] {
            fake.orderings.insert(id.to_string(), "FM".to_string());
        }
        let plan = ScreenPlan::from_args(&parse_args(&["-e", "Fe", "-x", ""])).unwrap();

        let found = screen_candidates(&fake, &plan, &ProgressBar::hidden());
        assert_eq!(found.keys().collect::<Vec<_>>(), vec!["mp-1"]);
    }

    #[test]
    fn test_ordering_filter_drops_mismatches_and_failures() {
        let mut fake = FakeMp::default();
        fake.by_element.insert(
            "Fe".to_string(),
            vec![doc("mp-1", "A"), doc("mp-2", "B"), doc("mp-3", "C")],
        );
        fake.orderings.insert("mp-1".to_string(), "FM".to_string());
        fake.orderings.insert("mp-2".to_string(), "AFM".to_string());
        let plan =
            ScreenPlan::from_args(&parse_args(&["-e", "Fe", "-x", "", "--ordering", "afm"])).unwrap();

        let found = screen_candidates(&fake, &plan, &ProgressBar::hidden());
        assert_eq!(found.keys().collect::<Vec<_>>(), vec!["mp-2"]);
    }

    #[test]
    fn test_candidates_csv_is_fetch_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("candidates.csv");
        let mut candidates = BTreeMap::new();
        candidates.insert("mp-13".to_string(), "Fe".to_string());
        candidates.insert("mp-102".to_string(), "Co".to_string());
        write_candidates_csv(&path, &candidates).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("ID,formula\n"));

        let ids = IdentifierSource::new(&path).read_all().unwrap();
        let ids: Vec<_> = ids.iter().map(|i| i.as_str().to_string()).collect();
        assert_eq!(ids, vec!["mp-102", "mp-13"]);
    }
}
