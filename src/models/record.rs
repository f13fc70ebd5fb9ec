//! # 标准化记录
//!
//! 每个标识 + 属性类型对应一条记录，以带 `kind` 标签的 JSON 写盘。
//! 可选字段缺失时保持 `None`（JSON 中为 `null`），不以 0 填充。
//!
//! ## 依赖关系
//! - 被 `normalize/` 构造
//! - 被 `batch/`, `plot/` 使用

use crate::models::PropertyKind;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 标准化记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NormalizedRecord {
    Summary(SummaryRecord),
    Magnetic(MagneticRecord),
    Elastic(ElasticRecord),
    Dos(DosRecord),
    Bands(BandRecord),
}

impl NormalizedRecord {
    pub fn kind(&self) -> PropertyKind {
        match self {
            NormalizedRecord::Summary(_) => PropertyKind::Summary,
            NormalizedRecord::Magnetic(_) => PropertyKind::Magnetic,
            NormalizedRecord::Elastic(_) => PropertyKind::Elastic,
            NormalizedRecord::Dos(_) => PropertyKind::Dos,
            NormalizedRecord::Bands(_) => PropertyKind::Bands,
        }
    }

    pub fn material_id(&self) -> &str {
        match self {
            NormalizedRecord::Summary(r) => &r.material_id,
            NormalizedRecord::Magnetic(r) => &r.material_id,
            NormalizedRecord::Elastic(r) => &r.material_id,
            NormalizedRecord::Dos(r) => &r.material_id,
            NormalizedRecord::Bands(r) => &r.material_id,
        }
    }

    /// 序列化为写盘用的 JSON 文本（带结尾换行）
    pub fn to_json_string(&self) -> serde_json::Result<String> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        Ok(text)
    }
}

/// 概要信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub material_id: String,
    pub formula: String,
    pub crystal_system: Option<String>,
    pub spacegroup: Option<String>,
    pub elements: Option<Vec<String>>,
    pub is_stable: Option<bool>,
    pub band_gap: Option<f64>,
    pub energy_above_hull: Option<f64>,
    pub formation_energy_per_atom: Option<f64>,
    pub volume: Option<f64>,
    pub icsd_ids: Vec<String>,
}

/// 磁性
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MagneticRecord {
    pub material_id: String,
    pub ordering: String,
    pub total_magnetization: Option<f64>,
    pub total_magnetization_normalized_vol: Option<f64>,
    pub num_magnetic_sites: Option<u32>,
    pub num_unique_magnetic_sites: Option<u32>,
    pub magmoms: Option<Vec<f64>>,
}

/// 弹性
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElasticRecord {
    pub material_id: String,
    pub bulk_modulus_voigt: Option<f64>,
    pub bulk_modulus_reuss: Option<f64>,
    pub bulk_modulus_vrh: Option<f64>,
    pub shear_modulus_voigt: Option<f64>,
    pub shear_modulus_reuss: Option<f64>,
    pub shear_modulus_vrh: Option<f64>,
    pub homogeneous_poisson: Option<f64>,
    pub universal_anisotropy: Option<f64>,
    /// 6x6 Voigt 记号弹性张量 (GPa)
    pub elastic_tensor: Option<Vec<Vec<f64>>>,
}

/// 态密度
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DosRecord {
    pub material_id: String,
    pub efermi: f64,
    pub energies: Vec<f64>,
    pub total: Vec<f64>,
    pub spin_up: Vec<f64>,
    pub spin_down: Option<Vec<f64>>,
}

/// 高对称点刻度
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandTick {
    pub label: String,
    pub distance: f64,
}

/// 能带
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandRecord {
    pub material_id: String,
    pub efermi: f64,
    pub is_metal: bool,
    /// 由本征值计算；金属为 0，无法确定时为 None
    pub band_gap: Option<f64>,
    /// 每个 k 点沿路径的累计距离
    pub distances: Vec<f64>,
    pub ticks: Vec<BandTick>,
    /// `[band][kpoint]` 能量 (eV)
    pub spin_up: Vec<Vec<f64>>,
    pub spin_down: Option<Vec<Vec<f64>>>,
}

/// NEMAD 检索结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NemadEntry {
    pub db: String,
    pub query: String,
    pub material_name: String,
    pub curie: Option<f64>,
    pub neel: Option<f64>,
    pub magnetic_moment: Option<f64>,
    pub crystal_structure: Option<String>,
    pub doi: Option<String>,
    pub properties: BTreeMap<String, serde_json::Value>,
}
