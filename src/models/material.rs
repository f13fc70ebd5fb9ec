//! # 材料标识与属性类型
//!
//! ## 依赖关系
//! - 被 `parsers/identifiers.rs`, `remote/`, `normalize/`, `batch/` 使用

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// 材料数据库中的条目标识（如 `mp-149`）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    /// 去除首尾空白后构造；空字符串返回 None
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Identifier(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 用作输出目录名的安全形式
    ///
    /// 路径分隔符与保留字符替换为 `_`；全由 `.` 组成的标识（`.`、`..`）整体替换，
    /// 保证结果始终是输出目录下的单层子目录。不同标识可能得到相同结果，由调用方检测。
    pub fn file_stem(&self) -> String {
        if self.0.chars().all(|c| c == '.') {
            return "_".repeat(self.0.len());
        }
        self.0
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                c if c.is_whitespace() => '_',
                c => c,
            })
            .collect()
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 可获取的属性类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    /// Summary document (formula, symmetry, stability, band gap)
    Summary,
    /// Magnetic ordering and moments
    Magnetic,
    /// Elastic tensor and moduli
    Elastic,
    /// Electronic density of states
    Dos,
    /// Electronic band structure (line mode)
    Bands,
}

impl PropertyKind {
    /// 全部属性类型（默认获取顺序）
    pub const ALL: [PropertyKind; 5] = [
        PropertyKind::Summary,
        PropertyKind::Magnetic,
        PropertyKind::Elastic,
        PropertyKind::Dos,
        PropertyKind::Bands,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyKind::Summary => "summary",
            PropertyKind::Magnetic => "magnetic",
            PropertyKind::Elastic => "elastic",
            PropertyKind::Dos => "dos",
            PropertyKind::Bands => "bands",
        }
    }

    /// 是否可以绘图
    pub fn is_plottable(&self) -> bool {
        matches!(self, PropertyKind::Dos | PropertyKind::Bands)
    }
}

impl std::fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 能带高对称路径约定
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum BandPathType {
    /// Setyawan-Curtarolo
    #[default]
    SetyawanCurtarolo,
    /// Hinuma et al.
    Hinuma,
    /// Latimer-Munro
    LatimerMunro,
}

impl BandPathType {
    /// MP electronic_structure 文档中的键名
    pub fn api_key(&self) -> &'static str {
        match self {
            BandPathType::SetyawanCurtarolo => "setyawan_curtarolo",
            BandPathType::Hinuma => "hinuma",
            BandPathType::LatimerMunro => "latimer_munro",
        }
    }
}
