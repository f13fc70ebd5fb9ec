//! # NEMAD 查询条件
//!
//! ## 依赖关系
//! - 被 `cli/query.rs`, `remote/nemad.rs`, `commands/query.rs` 使用
//! - 使用 `parsers/formula.rs` 提取元素

use crate::parsers::formula;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// NEMAD 数据库类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NemadDb {
    /// Magnetic materials (Curie / Néel temperatures)
    Magnetic,
    /// Magnetic anisotropy
    #[value(alias = "magnetic_anisotropy")]
    MagneticAnisotropy,
    /// Thermoelectric materials
    Thermoelectric,
    /// Superconductors
    Superconductor,
}

impl NemadDb {
    /// API 路径段
    pub fn as_path(&self) -> &'static str {
        match self {
            NemadDb::Magnetic => "magnetic",
            NemadDb::MagneticAnisotropy => "magnetic_anisotropy",
            NemadDb::Thermoelectric => "thermoelectric",
            NemadDb::Superconductor => "superconductor",
        }
    }
}

impl std::fmt::Display for NemadDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_path())
    }
}

/// 元素匹配模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum MatchMode {
    /// Composition has exactly the requested element set
    #[default]
    Exact,
    /// Composition contains all requested elements, possibly more
    Superset,
}

/// 查询目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryTarget {
    /// 元素集合检索（去重排序后的元素符号）
    Elements(Vec<String>),
    /// 精确化学式检索
    Formula(String),
}

impl QueryTarget {
    /// 从元素列表构造，去重并排序
    pub fn elements<I, S>(elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut els: Vec<String> = elements
            .into_iter()
            .map(|e| e.as_ref().trim().to_string())
            .filter(|e| !e.is_empty())
            .collect();
        els.sort();
        els.dedup();
        QueryTarget::Elements(els)
    }

    /// 查询涉及的元素
    pub fn required_elements(&self) -> Vec<String> {
        match self {
            QueryTarget::Elements(els) => els.clone(),
            QueryTarget::Formula(f) => formula::elements(f),
        }
    }

    /// 用于日志与结果标注的文本
    pub fn label(&self) -> String {
        match self {
            QueryTarget::Elements(els) => els.join(","),
            QueryTarget::Formula(f) => f.clone(),
        }
    }
}

/// 一次 NEMAD 查询
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFilter {
    pub db: NemadDb,
    pub target: QueryTarget,
    pub limit: usize,
    pub mode: MatchMode,
}

impl QueryFilter {
    /// 判断某化学式是否满足过滤条件
    ///
    /// 多元素检索采用 AND 语义：化学式必须包含全部请求元素；
    /// `Exact` 模式下元素集合必须完全相同。
    pub fn accepts(&self, material_formula: &str) -> bool {
        let required = self.target.required_elements();
        if required.is_empty() {
            return false;
        }
        let present = formula::elements(material_formula);
        let contains_all = required.iter().all(|e| present.contains(e));
        match (&self.target, self.mode) {
            (QueryTarget::Formula(_), _) => contains_all && present.len() == required.len(),
            (QueryTarget::Elements(_), MatchMode::Exact) => {
                contains_all && present.len() == required.len()
            }
            (QueryTarget::Elements(_), MatchMode::Superset) => contains_all,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(els: &[&str], mode: MatchMode) -> QueryFilter {
        QueryFilter {
            db: NemadDb::Magnetic,
            target: QueryTarget::elements(els.iter().copied()),
            limit: 20,
            mode,
        }
    }

    #[test]
    fn test_elements_are_sorted_and_deduplicated() {
        let t = QueryTarget::elements(["Fe", " Co", "Fe", ""]);
        assert_eq!(t, QueryTarget::Elements(vec!["Co".into(), "Fe".into()]));
        assert_eq!(t.label(), "Co,Fe");
    }

    #[test]
    fn test_accepts_requires_all_elements() {
        let f = filter(&["Fe", "Co"], MatchMode::Superset);
        assert!(f.accepts("FeCo"));
        assert!(f.accepts("Fe2CoSi"));
        assert!(!f.accepts("Fe3O4"));
        assert!(!f.accepts("CoO"));
    }

    #[test]
    fn test_exact_mode_rejects_extra_elements() {
        let f = filter(&["Fe", "Co"], MatchMode::Exact);
        assert!(f.accepts("Fe0.5Co0.5"));
        assert!(!f.accepts("Fe2CoSi"));
    }
}
