//! # 绘图模块
//!
//! 将态密度 / 能带 JSON 渲染为 PNG 或 SVG 图像。
//!
//! ## 功能
//! - 接受本工具写出的标准化记录（`kind` 为 `dos` / `bands`）
//! - 接受 pymatgen 形式的原始 DOS / 能带文档（先经标准化）
//! - 其他形状、空数组直接报 `FormatError`，不生成空图
//! - 输出结果只取决于输入文件与绘图配置
//!
//! ## 依赖关系
//! - 被 `commands/plot.rs`, `batch/driver.rs` 调用
//! - 使用 `normalize/` 处理原始文档
//! - 子模块: dos, bands

pub mod bands;
pub mod dos;

use crate::error::{Result, ScreenError};
use crate::models::{BandRecord, DosRecord, Identifier, NormalizedRecord, PropertyKind, RawResponse};
use crate::normalize;

use clap::ValueEnum;
use plotters::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// 图像格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum ImageFormat {
    #[default]
    Png,
    Svg,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }

    /// 由文件扩展名推断
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(ImageFormat::Png),
            "svg" => Some(ImageFormat::Svg),
            _ => None,
        }
    }

    /// 显式指定优先，其次输出文件扩展名，默认 PNG
    pub fn resolve(explicit: Option<ImageFormat>, output: Option<&Path>) -> ImageFormat {
        explicit
            .or_else(|| output.and_then(ImageFormat::from_path))
            .unwrap_or_default()
    }
}

/// 绘图配置
#[derive(Debug, Clone, PartialEq)]
pub struct PlotConfig {
    /// 能量窗口下限 (eV)
    pub emin: f64,
    /// 能量窗口上限 (eV)
    pub emax: f64,
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    /// 能量是否以费米能级为零点
    pub shift_fermi: bool,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            emin: -6.0,
            emax: 6.0,
            width: 1024,
            height: 768,
            format: ImageFormat::Png,
            shift_fermi: true,
        }
    }
}

impl PlotConfig {
    pub fn validate(&self) -> Result<()> {
        if self.emin.is_nan() || self.emax.is_nan() || self.emin >= self.emax {
            return Err(ScreenError::InvalidArgument(format!(
                "energy window is empty: emin ({}) must be below emax ({})",
                self.emin, self.emax
            )));
        }
        if self.width < 100 || self.height < 100 {
            return Err(ScreenError::InvalidArgument(format!(
                "image size {}x{} is too small",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// 费米能级在图中的位置
    fn fermi_position(&self, efermi: f64) -> f64 {
        if self.shift_fermi {
            0.0
        } else {
            efermi
        }
    }

    /// 图中的能量坐标
    fn energy(&self, value: f64, efermi: f64) -> f64 {
        if self.shift_fermi {
            value - efermi
        } else {
            value
        }
    }
}

/// 可绘制的记录
#[derive(Debug, Clone, PartialEq)]
pub enum Plottable {
    Dos(DosRecord),
    Bands(BandRecord),
}

impl Plottable {
    pub fn kind(&self) -> PropertyKind {
        match self {
            Plottable::Dos(_) => PropertyKind::Dos,
            Plottable::Bands(_) => PropertyKind::Bands,
        }
    }

    pub fn material_id(&self) -> &str {
        match self {
            Plottable::Dos(r) => &r.material_id,
            Plottable::Bands(r) => &r.material_id,
        }
    }

    /// 由标准化记录构造；非 DOS / 能带返回 None
    pub fn from_record(record: &NormalizedRecord) -> Option<Self> {
        match record {
            NormalizedRecord::Dos(r) => Some(Plottable::Dos(r.clone())),
            NormalizedRecord::Bands(r) => Some(Plottable::Bands(r.clone())),
            _ => None,
        }
    }
}

fn format_error(path: &Path, reason: impl Into<String>) -> ScreenError {
    ScreenError::FormatError {
        path: path.display().to_string(),
        reason: reason.into(),
    }
}

/// 原始文档缺少标识时，取所在目录名
fn fallback_id(path: &Path) -> Option<Identifier> {
    path.parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .and_then(Identifier::new)
        .or_else(|| {
            path.file_stem()
                .and_then(|n| n.to_str())
                .and_then(Identifier::new)
        })
}

/// 解析 JSON 值为可绘制记录
pub fn plottable_from_value(path: &Path, value: Value) -> Result<Plottable> {
    let obj = match value.as_object() {
        Some(obj) => obj,
        None => return Err(format_error(path, "top-level JSON value is not an object")),
    };

    let plottable = if obj.contains_key("kind") {
        let record: NormalizedRecord = serde_json::from_value(value)
            .map_err(|e| format_error(path, format!("not a valid record: {}", e)))?;
        match Plottable::from_record(&record) {
            Some(p) => p,
            None => {
                return Err(format_error(
                    path,
                    format!("record kind '{}' cannot be plotted", record.kind()),
                ))
            }
        }
    } else {
        let kind = if obj.contains_key("densities") {
            PropertyKind::Dos
        } else if obj.contains_key("bands") && obj.contains_key("kpoints") {
            PropertyKind::Bands
        } else {
            return Err(format_error(
                path,
                "expected a DOS (energies/densities) or band structure (kpoints/bands) document",
            ));
        };
        let id = fallback_id(path)
            .ok_or_else(|| format_error(path, "cannot derive a material id from the path"))?;
        let raw = RawResponse::new(kind, value);
        let record = normalize::normalize(&id, &raw)
            .map_err(|e| format_error(path, e.to_string()))?;
        match Plottable::from_record(&record) {
            Some(p) => p,
            None => return Err(format_error(path, "document did not normalize to DOS or bands")),
        }
    };

    check_not_empty(path, &plottable)?;
    Ok(plottable)
}

/// 空数组不绘图
fn check_not_empty(path: &Path, plottable: &Plottable) -> Result<()> {
    match plottable {
        Plottable::Dos(r) => {
            if r.energies.is_empty() || r.spin_up.is_empty() || r.total.is_empty() {
                return Err(format_error(path, "DOS has empty energies or densities"));
            }
            if r.spin_up.len() != r.energies.len() || r.total.len() != r.energies.len() {
                return Err(format_error(path, "DOS densities do not match the energy grid"));
            }
        }
        Plottable::Bands(r) => {
            if r.distances.is_empty() || r.spin_up.is_empty() {
                return Err(format_error(path, "band structure has no k-points or no bands"));
            }
        }
    }
    Ok(())
}

/// 读取并识别绘图输入文件
pub fn load_plottable(path: &Path) -> Result<Plottable> {
    if !path.exists() {
        return Err(ScreenError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let content = std::fs::read_to_string(path).map_err(|e| ScreenError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    let value: Value = serde_json::from_str(&content)
        .map_err(|e| format_error(path, format!("invalid JSON: {}", e)))?;
    plottable_from_value(path, value)
}

/// 默认输出路径：与输入同目录同名，扩展名换为图像格式
pub fn default_output(input: &Path, format: ImageFormat) -> PathBuf {
    input.with_extension(format.extension())
}

/// 渲染单个文件，返回输出路径
pub fn render_file(input: &Path, output: Option<&Path>, config: &PlotConfig) -> Result<PathBuf> {
    let plottable = load_plottable(input)?;
    let output = match output {
        Some(p) => p.to_path_buf(),
        None => default_output(input, config.format),
    };
    render_record(&plottable, &output, config)?;
    Ok(output)
}

/// 渲染已加载的记录
pub fn render_record(plottable: &Plottable, output: &Path, config: &PlotConfig) -> Result<()> {
    config.validate()?;
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| ScreenError::FileWriteError {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
    }

    let size = (config.width, config.height);
    match config.format {
        ImageFormat::Png => {
            let root = BitMapBackend::new(output, size).into_drawing_area();
            draw(&root, plottable, config)?;
            root.present().map_err(plot_error)?;
        }
        ImageFormat::Svg => {
            let root = SVGBackend::new(output, size).into_drawing_area();
            draw(&root, plottable, config)?;
            root.present().map_err(plot_error)?;
        }
    }
    tracing::debug!(
        material = plottable.material_id(),
        "rendered {} plot to {}",
        plottable.kind(),
        output.display()
    );
    Ok(())
}

fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    plottable: &Plottable,
    config: &PlotConfig,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    match plottable {
        Plottable::Dos(r) => dos::draw_dos_chart(root, &dos::prepare(r, config)?, config),
        Plottable::Bands(r) => bands::draw_band_chart(root, &bands::prepare(r, config)?, config),
    }
}

pub(crate) fn plot_error<E: std::fmt::Debug>(e: E) -> ScreenError {
    ScreenError::PlotError(format!("{:?}", e))
}

/// 虚线分段（plotters 的线段没有虚线样式）
pub(crate) fn dash_segments(
    from: (f64, f64),
    to: (f64, f64),
    count: usize,
) -> Vec<[(f64, f64); 2]> {
    let count = count.max(1);
    let steps = count * 2 - 1;
    (0..steps)
        .step_by(2)
        .map(|i| {
            let t0 = i as f64 / steps as f64;
            let t1 = (i + 1) as f64 / steps as f64;
            [
                (from.0 + (to.0 - from.0) * t0, from.1 + (to.1 - from.1) * t0),
                (from.0 + (to.0 - from.0) * t1, from.1 + (to.1 - from.1) * t1),
            ]
        })
        .collect()
}
