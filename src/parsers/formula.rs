//! # 化学式元素提取
//!
//! 从化学式（如 `Fe2CoSi`, `Fe0.5Co0.5`, `(Mn,Fe)3O4`）中提取元素符号。
//!
//! ## 依赖关系
//! - 被 `models/query.rs`, `commands/query.rs` 使用
//! - 使用 `regex`

use regex::Regex;
use std::sync::OnceLock;

fn element_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Z][a-z]?").unwrap())
}

/// 提取化学式中出现的元素，去重并排序
pub fn elements(formula: &str) -> Vec<String> {
    let mut els: Vec<String> = element_regex()
        .find_iter(formula)
        .map(|m| m.as_str().to_string())
        .collect();
    els.sort();
    els.dedup();
    els
}

/// 解析逗号分隔的元素列表（`"Fe, Co"` -> `["Co", "Fe"]`）
pub fn parse_element_list(input: &str) -> Result<Vec<String>, String> {
    let mut els = Vec::new();
    for token in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !is_element_symbol(token) {
            return Err(format!("'{}' is not an element symbol", token));
        }
        els.push(token.to_string());
    }
    if els.is_empty() {
        return Err("element list is empty".to_string());
    }
    els.sort();
    els.dedup();
    Ok(els)
}

fn is_element_symbol(token: &str) -> bool {
    let mut chars = token.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(a), None, None) => a.is_ascii_uppercase(),
        (Some(a), Some(b), None) => a.is_ascii_uppercase() && b.is_ascii_lowercase(),
        _ => false,
    }
}
