//! # 批量获取驱动
//!
//! 对每个标识依次获取并标准化所有请求的属性，写出单条目产物，
//! 最后汇总为 `summary.csv` 与 `errors.csv`。
//!
//! ## 功能
//! - 单个标识任一属性失败即整体失败，不写任何产物，并清除上次运行留下的目录
//! - 成功时先清空 `<out>/<stem>/` 再写入，目录内容只反映本次运行
//! - 重复标识只处理一次；不同标识映射到同一目录名时，后出现者记为失败
//! - 运行级 CSV 每次整体重写，按输入顺序，重复运行结果一致
//! - 可选绘图；绘图失败仅警告
//!
//! ## 依赖关系
//! - 被 `commands/fetch.rs` 调用
//! - 使用 `remote::MaterialsSource`, `normalize/`, `plot/`, `batch/runner.rs`

use super::runner::{BatchRunner, BatchSummary};
use crate::error::{ItemError, Result, ScreenError};
use crate::models::{Identifier, NormalizedRecord, PropertyKind};
use crate::normalize;
use crate::plot::{self, PlotConfig, Plottable};
use crate::remote::MaterialsSource;
use crate::utils::output;

use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

pub const SUMMARY_FILE: &str = "summary.csv";
pub const ERRORS_FILE: &str = "errors.csv";

/// 驱动配置
#[derive(Debug, Clone)]
pub struct DriverConfig {
    pub out_dir: PathBuf,
    pub kinds: Vec<PropertyKind>,
    pub plot: Option<PlotConfig>,
    pub jobs: usize,
    pub show_progress: bool,
}

impl DriverConfig {
    pub fn new(out_dir: impl Into<PathBuf>, kinds: Vec<PropertyKind>) -> Self {
        Self {
            out_dir: out_dir.into(),
            kinds,
            plot: None,
            jobs: 1,
            show_progress: true,
        }
    }

    pub fn with_plot(mut self, plot: Option<PlotConfig>) -> Self {
        self.plot = plot;
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }
}

/// 去重后的单个标识
#[derive(Debug)]
enum Planned {
    Fetch(Identifier),
    /// 目录名已被先出现的标识占用
    StemTaken { id: Identifier, owner: Identifier },
}

/// 单个标识的处理结果
#[derive(Debug)]
struct ItemOutcome {
    records: std::result::Result<Vec<NormalizedRecord>, ItemError>,
    plot_warnings: Vec<String>,
}

/// 一次运行的报告
#[derive(Debug)]
pub struct BatchReport {
    pub summary: BatchSummary,
    pub summary_csv: PathBuf,
    pub errors_csv: PathBuf,
    pub plot_warnings: Vec<String>,
}

/// 批量获取驱动
pub struct BatchDriver<'a> {
    source: &'a dyn MaterialsSource,
    config: DriverConfig,
}

impl<'a> BatchDriver<'a> {
    pub fn new(source: &'a dyn MaterialsSource, config: DriverConfig) -> Self {
        Self { source, config }
    }

    /// 处理全部标识
    pub fn run(&self, ids: &[Identifier]) -> Result<BatchReport> {
        if self.config.kinds.is_empty() {
            return Err(ScreenError::InvalidArgument(
                "no properties requested".to_string(),
            ));
        }
        std::fs::create_dir_all(&self.config.out_dir).map_err(|e| ScreenError::FileWriteError {
            path: self.config.out_dir.display().to_string(),
            source: e,
        })?;

        let mut summary = BatchSummary::default();
        let planned = plan(ids, &mut summary);
        let unique: Vec<Identifier> = planned
            .iter()
            .filter_map(|p| match p {
                Planned::Fetch(id) => Some(id.clone()),
                Planned::StemTaken { .. } => None,
            })
            .collect();

        let runner = BatchRunner::new(self.config.jobs).with_progress(self.config.show_progress);
        let mut outcomes = runner
            .run(&unique, "Fetching", |id, pb| self.process(id, pb))?
            .into_iter();

        let mut rows = Vec::new();
        let mut plot_warnings = Vec::new();
        for item in &planned {
            let (id, result) = match item {
                Planned::Fetch(id) => match outcomes.next() {
                    Some(outcome) => {
                        plot_warnings.extend(outcome.plot_warnings);
                        (id, outcome.records)
                    }
                    None => break,
                },
                Planned::StemTaken { id, owner } => (
                    id,
                    Err(ItemError::Io(format!(
                        "output directory '{}' already used by {}",
                        id.file_stem(),
                        owner
                    ))),
                ),
            };
            match result {
                Ok(records) => {
                    summary.record_success();
                    rows.push(SummaryRow::from_records(id, &records));
                }
                Err(e) => summary.record_failure(id.as_str(), e.category(), &e.to_string()),
            }
        }

        let summary_csv = self.config.out_dir.join(SUMMARY_FILE);
        let errors_csv = self.config.out_dir.join(ERRORS_FILE);
        write_summary_csv(&summary_csv, &rows)?;
        write_errors_csv(&errors_csv, &summary)?;

        Ok(BatchReport {
            summary,
            summary_csv,
            errors_csv,
            plot_warnings,
        })
    }

    /// 处理单个标识
    fn process(&self, id: &Identifier, pb: &ProgressBar) -> ItemOutcome {
        let item_dir = self.config.out_dir.join(id.file_stem());
        let records = match self.fetch_all(id) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(material = %id, category = e.category(), "{}", e);
                if let Err(clear) = clear_item_dir(&item_dir) {
                    tracing::warn!(material = %id, "{}", clear);
                }
                return ItemOutcome {
                    records: Err(e),
                    plot_warnings: Vec::new(),
                };
            }
        };

        if let Err(e) = clear_item_dir(&item_dir).and_then(|_| write_records(&item_dir, &records)) {
            tracing::warn!(material = %id, "{}", e);
            if let Err(clear) = clear_item_dir(&item_dir) {
                tracing::warn!(material = %id, "{}", clear);
            }
            return ItemOutcome {
                records: Err(e),
                plot_warnings: Vec::new(),
            };
        }

        let mut plot_warnings = Vec::new();
        if let Some(ref plot_config) = self.config.plot {
            for plottable in records.iter().filter_map(Plottable::from_record) {
                let target = item_dir.join(format!(
                    "{}.{}",
                    plottable.kind(),
                    plot_config.format.extension()
                ));
                if let Err(e) = plot::render_record(&plottable, &target, plot_config) {
                    let msg = format!("{}: {} plot failed: {}", id, plottable.kind(), e);
                    tracing::warn!("{}", msg);
                    pb.suspend(|| output::print_warning(&msg));
                    plot_warnings.push(msg);
                }
            }
        }

        ItemOutcome {
            records: Ok(records),
            plot_warnings,
        }
    }

    /// 获取并标准化所有属性；第一个失败即返回
    fn fetch_all(&self, id: &Identifier) -> std::result::Result<Vec<NormalizedRecord>, ItemError> {
        self.config
            .kinds
            .iter()
            .map(|&kind| -> std::result::Result<NormalizedRecord, ItemError> {
                let raw = self.source.fetch(id, kind)?;
                Ok(normalize::normalize(id, &raw)?)
            })
            .collect()
    }
}

/// 去重并检测目录名冲突，保持输入顺序
fn plan(ids: &[Identifier], summary: &mut BatchSummary) -> Vec<Planned> {
    let mut seen = HashSet::new();
    let mut stems: HashMap<String, Identifier> = HashMap::new();
    let mut planned = Vec::with_capacity(ids.len());
    for id in ids {
        if !seen.insert(id.clone()) {
            output::print_skip(&format!("{}: duplicate identifier", id));
            summary.record_skip();
            continue;
        }
        match stems.get(&id.file_stem()) {
            Some(owner) => {
                tracing::warn!(material = %id, owner = %owner, "output directory collision");
                planned.push(Planned::StemTaken {
                    id: id.clone(),
                    owner: owner.clone(),
                });
            }
            None => {
                stems.insert(id.file_stem(), id.clone());
                planned.push(Planned::Fetch(id.clone()));
            }
        }
    }
    planned
}

/// 删除单个标识的输出目录（不存在时忽略）
fn clear_item_dir(dir: &Path) -> std::result::Result<(), ItemError> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ItemError::Io(format!("{}: {}", dir.display(), e))),
    }
}

/// 写出单个标识的全部 JSON；失败时由调用方清除目录
fn write_records(dir: &Path, records: &[NormalizedRecord]) -> std::result::Result<(), ItemError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| ItemError::Io(format!("{}: {}", dir.display(), e)))?;

    for record in records {
        let path = dir.join(format!("{}.json", record.kind()));
        let text = record
            .to_json_string()
            .map_err(|e| ItemError::Io(format!("{}: {}", path.display(), e)))?;
        std::fs::write(&path, text)
            .map_err(|e| ItemError::Io(format!("{}: {}", path.display(), e)))?;
        tracing::debug!(material = record.material_id(), path = %path.display(), "record written");
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────
// 运行级 CSV
// ─────────────────────────────────────────────────────────────

/// `summary.csv` 的一行：各属性的标量字段，缺失为空
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub material_id: String,
    pub formula: Option<String>,
    pub crystal_system: Option<String>,
    pub spacegroup: Option<String>,
    pub is_stable: Option<bool>,
    pub band_gap: Option<f64>,
    pub energy_above_hull: Option<f64>,
    pub formation_energy_per_atom: Option<f64>,
    pub volume: Option<f64>,
    pub icsd_ids: Option<String>,
    pub ordering: Option<String>,
    pub total_magnetization: Option<f64>,
    pub total_magnetization_normalized_vol: Option<f64>,
    pub num_magnetic_sites: Option<u32>,
    pub num_unique_magnetic_sites: Option<u32>,
    pub bulk_modulus_vrh: Option<f64>,
    pub shear_modulus_vrh: Option<f64>,
    pub homogeneous_poisson: Option<f64>,
    pub universal_anisotropy: Option<f64>,
    pub dos_efermi: Option<f64>,
    pub bands_is_metal: Option<bool>,
    pub bands_gap: Option<f64>,
}

impl SummaryRow {
    pub const HEADERS: [&'static str; 22] = [
        "material_id",
        "formula",
        "crystal_system",
        "spacegroup",
        "is_stable",
        "band_gap",
        "energy_above_hull",
        "formation_energy_per_atom",
        "volume",
        "icsd_ids",
        "ordering",
        "total_magnetization",
        "total_magnetization_normalized_vol",
        "num_magnetic_sites",
        "num_unique_magnetic_sites",
        "bulk_modulus_vrh",
        "shear_modulus_vrh",
        "homogeneous_poisson",
        "universal_anisotropy",
        "dos_efermi",
        "bands_is_metal",
        "bands_gap",
    ];

    pub fn from_records(id: &Identifier, records: &[NormalizedRecord]) -> Self {
        let mut row = SummaryRow {
            material_id: id.to_string(),
            ..Default::default()
        };
        for record in records {
            match record {
                NormalizedRecord::Summary(r) => {
                    row.formula = Some(r.formula.clone());
                    row.crystal_system = r.crystal_system.clone();
                    row.spacegroup = r.spacegroup.clone();
                    row.is_stable = r.is_stable;
                    row.band_gap = r.band_gap;
                    row.energy_above_hull = r.energy_above_hull;
                    row.formation_energy_per_atom = r.formation_energy_per_atom;
                    row.volume = r.volume;
                    row.icsd_ids = (!r.icsd_ids.is_empty()).then(|| r.icsd_ids.join(";"));
                }
                NormalizedRecord::Magnetic(r) => {
                    row.ordering = Some(r.ordering.clone());
                    row.total_magnetization = r.total_magnetization;
                    row.total_magnetization_normalized_vol = r.total_magnetization_normalized_vol;
                    row.num_magnetic_sites = r.num_magnetic_sites;
                    row.num_unique_magnetic_sites = r.num_unique_magnetic_sites;
                }
                NormalizedRecord::Elastic(r) => {
                    row.bulk_modulus_vrh = r.bulk_modulus_vrh;
                    row.shear_modulus_vrh = r.shear_modulus_vrh;
                    row.homogeneous_poisson = r.homogeneous_poisson;
                    row.universal_anisotropy = r.universal_anisotropy;
                }
                NormalizedRecord::Dos(r) => row.dos_efermi = Some(r.efermi),
                NormalizedRecord::Bands(r) => {
                    row.bands_is_metal = Some(r.is_metal);
                    row.bands_gap = r.band_gap;
                }
            }
        }
        row
    }
}

/// 写出 `summary.csv`（无数据行时也写表头）
pub fn write_summary_csv(path: &Path, rows: &[SummaryRow]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    wtr.write_record(SummaryRow::HEADERS)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush().map_err(|e| ScreenError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(())
}

/// 写出 `errors.csv`
pub fn write_errors_csv(path: &Path, summary: &BatchSummary) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["identifier", "category", "reason"])?;
    for f in &summary.failures {
        wtr.write_record([f.identifier.as_str(), f.category.as_str(), f.reason.as_str()])?;
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
    use crate::models::RawResponse;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 内存中的数据源；未登记的组合返回 NotFound
    #[derive(Default)]
    struct FakeSource {
        docs: HashMap<(String, PropertyKind), Value>,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn with(mut self, id: &str, kind: PropertyKind, body: Value) -> Self {
            self.docs.insert((id.to_string(), kind), body);
            self
        }

        fn with_material(self, id: &str, formula: &str) -> Self {
            self.with(
                id,
                PropertyKind::Summary,
                json!({
                    "material_id": id,
                    "formula_pretty": formula,
                    "band_gap": 0.61,
                    "is_stable": true,
                    "database_IDs": {"icsd": ["icsd-76268"]}
                }),
            )
            .with(
                id,
                PropertyKind::Magnetic,
                json!({"ordering": "NM", "total_magnetization": 0.0}),
            )
        }
    }

    impl MaterialsSource for FakeSource {
        fn fetch(
            &self,
            id: &Identifier,
            kind: PropertyKind,
        ) -> std::result::Result<RawResponse, RemoteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.docs
                .get(&(id.as_str().to_string(), kind))
                .map(|body| RawResponse::new(kind, body.clone()))
                .ok_or_else(|| RemoteError::NotFound {
                    what: id.to_string(),
                })
        }
    }

    fn ids(list: &[&str]) -> Vec<Identifier> {
        list.iter().filter_map(|s| Identifier::new(s)).collect()
    }

    fn config(dir: &Path, kinds: Vec<PropertyKind>) -> DriverConfig {
        DriverConfig::new(dir, kinds).with_progress(false)
    }

    fn read_csv(path: &Path) -> Vec<Vec<String>> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(path)
            .unwrap();
        rdr.records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn test_found_and_missing_identifier() {
        let dir = tempfile::tempdir().unwrap();
        let source = FakeSource::default().with_material("mp-149", "Si");
        let driver = BatchDriver::new(&source, config(dir.path(), vec![PropertyKind::Summary]));

        let report = driver.run(&ids(&["mp-149", "mp-999999"])).unwrap();
        assert_eq!(report.summary.succeeded, 1);
        assert_eq!(report.summary.failed, 1);

        assert!(dir.path().join("mp-149/summary.json").is_file());
        assert!(!dir.path().join("mp-999999").exists());

        let errors = read_csv(&report.errors_csv);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[1][0], "mp-999999");
        assert_eq!(errors[1][1], "not_found");
        assert!(errors[1][2].contains("not found"));

        let summary = read_csv(&report.summary_csv);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[1][0], "mp-149");
        assert_eq!(summary[1][1], "Si");
        assert_eq!(summary[1][9], "icsd-76268");
    }

    #[test]
    fn test_all_succeed_gives_n_rows_in_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let names = ["mp-1", "mp-2", "mp-3", "mp-4", "mp-5"];
        let source = names
            .iter()
            .fold(FakeSource::default(), |s, id| s.with_material(id, "Fe"));
        let driver = BatchDriver::new(
            &source,
            config(dir.path(), vec![PropertyKind::Summary, PropertyKind::Magnetic]).with_jobs(3),
        );

        let report = driver.run(&ids(&names)).unwrap();
        assert_eq!(report.summary.succeeded, 5);
        for id in names {
            assert!(dir.path().join(id).join("summary.json").is_file());
            assert!(dir.path().join(id).join("magnetic.json").is_file());
        }

        let rows = read_csv(&report.summary_csv);
        assert_eq!(rows.len(), 6);
        let order: Vec<&str> = rows[1..].iter().map(|r| r[0].as_str()).collect();
        assert_eq!(order, names);
        assert_eq!(rows[1][10], "NM");
        // 缺失的弹性字段为空
        assert_eq!(rows[1][16], "");
    }

    #[test]
    fn test_rerun_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let source = FakeSource::default().with_material("mp-149", "Si");
        let driver = BatchDriver::new(
            &source,
            config(dir.path(), vec![PropertyKind::Summary, PropertyKind::Magnetic]),
        );
        let input = ids(&["mp-149", "mp-999999"]);

        let snapshot = || {
            ["summary.csv", "errors.csv", "mp-149/summary.json", "mp-149/magnetic.json"]
                .iter()
                .map(|f| std::fs::read(dir.path().join(f)).unwrap())
                .collect::<Vec<_>>()
        };

        driver.run(&input).unwrap();
        let first = snapshot();
        driver.run(&input).unwrap();
        assert_eq!(first, snapshot());
    }

    #[test]
    fn test_schema_failure_only_fails_that_item() {
        let dir = tempfile::tempdir().unwrap();
        let source = FakeSource::default()
            .with_material("mp-1", "Fe")
            .with_material("mp-3", "Co")
            .with(
                "mp-2",
                PropertyKind::Summary,
                json!({"material_id": "mp-2", "formula_pretty": "Ni"}),
            )
            .with("mp-2", PropertyKind::Magnetic, json!({"total_magnetization": 0.6}));
        let driver = BatchDriver::new(
            &source,
            config(dir.path(), vec![PropertyKind::Summary, PropertyKind::Magnetic]),
        );

        let report = driver.run(&ids(&["mp-1", "mp-2", "mp-3"])).unwrap();
        assert_eq!(report.summary.succeeded, 2);
        assert_eq!(report.summary.failed, 1);
        assert_eq!(report.summary.failures[0].identifier, "mp-2");
        assert_eq!(report.summary.failures[0].category, "schema");
        // 第一个属性已成功也不写任何产物
        assert!(!dir.path().join("mp-2").exists());
    }

    #[test]
    fn test_duplicates_fetched_once() {
        let dir = tempfile::tempdir().unwrap();
        let source = FakeSource::default().with_material("mp-149", "Si");
        let driver = BatchDriver::new(&source, config(dir.path(), vec![PropertyKind::Summary]));

        let report = driver.run(&ids(&["mp-149", "mp-149", " mp-149 "])).unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.summary.succeeded, 1);
        assert_eq!(report.summary.skipped, 2);
        assert_eq!(read_csv(&report.summary_csv).len(), 2);
    }

    #[test]
    fn test_dot_identifier_stays_inside_output_dir() {
        let root = tempfile::tempdir().unwrap();
        let out = root.path().join("out");
        let source = FakeSource::default().with_material("..", "Fe");
        let driver = BatchDriver::new(&source, config(&out, vec![PropertyKind::Summary]));

        let report = driver.run(&ids(&[".."])).unwrap();
        assert_eq!(report.summary.succeeded, 1);
        assert!(out.join("__/summary.json").is_file());
        assert!(!root.path().join("summary.json").exists());
    }

    #[test]
    fn test_stem_collision_fails_later_identifier() {
        let dir = tempfile::tempdir().unwrap();
        let source = FakeSource::default()
            .with_material("mp/1", "Fe")
            .with_material("mp_1", "Co")
            .with_material("mp-2", "Ni");
        let driver = BatchDriver::new(&source, config(dir.path(), vec![PropertyKind::Summary]));

        let report = driver.run(&ids(&["mp/1", "mp_1", "mp-2"])).unwrap();
        assert_eq!(report.summary.succeeded, 2);
        assert_eq!(report.summary.failed, 1);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);

        let written = std::fs::read_to_string(dir.path().join("mp_1/summary.json")).unwrap();
        assert!(written.contains("\"mp/1\""));
        assert!(written.contains("\"Fe\""));

        let errors = read_csv(&report.errors_csv);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[1][0], "mp_1");
        assert_eq!(errors[1][1], "io");
        assert!(errors[1][2].contains("already used by mp/1"));

        let summary = read_csv(&report.summary_csv);
        let order: Vec<&str> = summary[1..].iter().map(|r| r[0].as_str()).collect();
        assert_eq!(order, ["mp/1", "mp-2"]);
    }

    #[test]
    fn test_failed_rerun_removes_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let kinds = vec![PropertyKind::Summary, PropertyKind::Magnetic];
        let good = FakeSource::default().with_material("mp-149", "Si");
        BatchDriver::new(&good, config(dir.path(), kinds.clone()))
            .run(&ids(&["mp-149"]))
            .unwrap();
        assert!(dir.path().join("mp-149/magnetic.json").is_file());

        let broken = FakeSource::default().with(
            "mp-149",
            PropertyKind::Summary,
            json!({"material_id": "mp-149", "formula_pretty": "Si"}),
        );
        let report = BatchDriver::new(&broken, config(dir.path(), kinds))
            .run(&ids(&["mp-149"]))
            .unwrap();
        assert_eq!(report.summary.failed, 1);
        assert!(!dir.path().join("mp-149").exists());
    }

    #[test]
    fn test_rerun_with_fewer_kinds_drops_stale_records() {
        let dir = tempfile::tempdir().unwrap();
        let source = FakeSource::default().with_material("mp-149", "Si");
        BatchDriver::new(
            &source,
            config(dir.path(), vec![PropertyKind::Summary, PropertyKind::Magnetic]),
        )
        .run(&ids(&["mp-149"]))
        .unwrap();

        BatchDriver::new(&source, config(dir.path(), vec![PropertyKind::Summary]))
            .run(&ids(&["mp-149"]))
            .unwrap();
        assert!(dir.path().join("mp-149/summary.json").is_file());
        assert!(!dir.path().join("mp-149/magnetic.json").exists());
    }

    #[test]
    fn test_summary_header_matches_row_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");
        let row = SummaryRow {
            material_id: "mp-13".to_string(),
            formula: Some("Fe".to_string()),
            bands_is_metal: Some(true),
            ..Default::default()
        };
        write_summary_csv(&path, &[row.clone()]).unwrap();

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        let back: Vec<SummaryRow> = rdr.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(back, vec![row]);
    }
}
