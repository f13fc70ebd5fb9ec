//! # 电子结构提取
//!
//! 态密度与能带文档的提取。
//!
//! ## 能带路径距离
//! - 有倒格子矩阵时，分数坐标先转为笛卡尔坐标
//! - 每个分支起点不累加距离（不连续跳跃处保持同一横坐标）
//! - 高对称点刻度取自 `labels_dict`，同一位置的不同标签合并为 `X|U`
//!
//! ## 依赖关系
//! - 被 `normalize/mod.rs` 调用

use crate::error::SchemaError;
use crate::models::response::{BandStructureDoc, BranchDoc, DosDoc};
use crate::models::{BandRecord, BandTick, DosRecord};

use std::collections::{BTreeMap, BTreeSet};

const SPIN_UP_KEYS: [&str; 4] = ["1", "up", "Spin.up", "spin_up"];
const SPIN_DOWN_KEYS: [&str; 4] = ["-1", "down", "Spin.down", "spin_down"];

/// 判断 k 点与标签坐标重合的容差
const KPOINT_TOLERANCE: f64 = 1e-4;

fn channel<'a, T>(map: &'a BTreeMap<String, T>, keys: &[&str]) -> Option<&'a T> {
    keys.iter().find_map(|k| map.get(*k))
}

fn inconsistent(kind: &str, reason: impl Into<String>) -> SchemaError {
    SchemaError::Inconsistent {
        kind: kind.to_string(),
        reason: reason.into(),
    }
}

// ─────────────────────────────────────────────────────────────
// 态密度
// ─────────────────────────────────────────────────────────────

/// 态密度
pub fn dos(material_id: &str, doc: DosDoc) -> Result<DosRecord, SchemaError> {
    if doc.energies.is_empty() {
        return Err(inconsistent("dos", "energies array is empty"));
    }

    let up = channel(&doc.densities, &SPIN_UP_KEYS)
        .cloned()
        .ok_or_else(|| SchemaError::MissingField {
            kind: "dos".to_string(),
            field: "densities.1".to_string(),
        })?;
    let down = channel(&doc.densities, &SPIN_DOWN_KEYS).cloned();

    let n = doc.energies.len();
    if up.len() != n {
        return Err(inconsistent(
            "dos",
            format!("spin-up density has {} points, energies has {}", up.len(), n),
        ));
    }
    if let Some(ref d) = down {
        if d.len() != n {
            return Err(inconsistent(
                "dos",
                format!("spin-down density has {} points, energies has {}", d.len(), n),
            ));
        }
    }

    let total = match down {
        Some(ref d) => up.iter().zip(d).map(|(a, b)| a + b).collect(),
        None => up.clone(),
    };

    Ok(DosRecord {
        material_id: material_id.to_string(),
        efermi: doc.efermi,
        energies: doc.energies,
        total,
        spin_up: up,
        spin_down: down,
    })
}

// ─────────────────────────────────────────────────────────────
// 能带
// ─────────────────────────────────────────────────────────────

/// 能带
pub fn bands(material_id: &str, doc: BandStructureDoc) -> Result<BandRecord, SchemaError> {
    let nk = doc.kpoints.len();
    if nk == 0 {
        return Err(inconsistent("bands", "kpoints array is empty"));
    }

    let up = channel(&doc.bands, &SPIN_UP_KEYS)
        .cloned()
        .ok_or_else(|| SchemaError::MissingField {
            kind: "bands".to_string(),
            field: "bands.1".to_string(),
        })?;
    let down = channel(&doc.bands, &SPIN_DOWN_KEYS).cloned();

    if up.is_empty() {
        return Err(inconsistent("bands", "no bands in spin-up channel"));
    }
    for (spin, bands) in std::iter::once(("up", &up)).chain(down.iter().map(|d| ("down", d))) {
        if let Some((i, band)) = bands.iter().enumerate().find(|(_, b)| b.len() != nk) {
            return Err(inconsistent(
                "bands",
                format!(
                    "spin-{} band {} has {} energies for {} k-points",
                    spin,
                    i,
                    band.len(),
                    nk
                ),
            ));
        }
    }

    let matrix = doc.lattice_rec.as_ref().map(|l| l.matrix);
    let distances = path_distances(&doc.kpoints, matrix.as_ref(), doc.branches.as_deref());
    let ticks = doc
        .labels_dict
        .as_ref()
        .map(|labels| high_symmetry_ticks(&doc.kpoints, &distances, labels))
        .unwrap_or_default();

    let mut channels = vec![&up];
    if let Some(ref d) = down {
        channels.push(d);
    }
    let (is_metal, band_gap) = band_gap(&channels, doc.efermi);

    Ok(BandRecord {
        material_id: material_id.to_string(),
        efermi: doc.efermi,
        is_metal,
        band_gap,
        distances,
        ticks,
        spin_up: up,
        spin_down: down,
    })
}

fn to_cartesian(k: &[f64; 3], matrix: Option<&[[f64; 3]; 3]>) -> [f64; 3] {
    match matrix {
        Some(m) => [
            k[0] * m[0][0] + k[1] * m[1][0] + k[2] * m[2][0],
            k[0] * m[0][1] + k[1] * m[1][1] + k[2] * m[2][1],
            k[0] * m[0][2] + k[1] * m[1][2] + k[2] * m[2][2],
        ],
        None => *k,
    }
}

/// 沿高对称路径的累计距离
pub fn path_distances(
    kpoints: &[[f64; 3]],
    matrix: Option<&[[f64; 3]; 3]>,
    branches: Option<&[BranchDoc]>,
) -> Vec<f64> {
    let breaks: BTreeSet<usize> = branches
        .unwrap_or_default()
        .iter()
        .map(|b| b.start_index)
        .filter(|&i| i > 0)
        .collect();

    let mut distances = Vec::with_capacity(kpoints.len());
    let mut acc = 0.0;
    let mut prev: Option<[f64; 3]> = None;

    for (i, k) in kpoints.iter().enumerate() {
        let cart = to_cartesian(k, matrix);
        if let Some(p) = prev {
            if !breaks.contains(&i) {
                let d2: f64 = (0..3).map(|j| (cart[j] - p[j]).powi(2)).sum();
                acc += d2.sqrt();
            }
        }
        distances.push(acc);
        prev = Some(cart);
    }
    distances
}

/// 高对称点刻度
pub fn high_symmetry_ticks(
    kpoints: &[[f64; 3]],
    distances: &[f64],
    labels: &BTreeMap<String, [f64; 3]>,
) -> Vec<BandTick> {
    let mut ticks: Vec<BandTick> = Vec::new();

    for (k, &distance) in kpoints.iter().zip(distances) {
        let label = labels.iter().find_map(|(name, coords)| {
            let same = (0..3).all(|j| (coords[j] - k[j]).abs() < KPOINT_TOLERANCE);
            same.then(|| display_label(name))
        });
        let Some(label) = label else { continue };

        if let Some(last) = ticks.last_mut() {
            if (last.distance - distance).abs() < 1e-9 {
                if !last.label.split('|').any(|l| l == label) {
                    last.label = format!("{}|{}", last.label, label);
                }
                continue;
            }
        }
        ticks.push(BandTick { label, distance });
    }
    ticks
}

/// 标签美化（`\Gamma` -> `Γ`）
fn display_label(raw: &str) -> String {
    let cleaned = raw.replace('$', "").replace("\\mathrm", "");
    let cleaned = cleaned.trim_matches(|c| c == '{' || c == '}');
    match cleaned {
        "\\Gamma" | "GAMMA" | "Gamma" | "G" => "Γ".to_string(),
        other => other.replace("\\Sigma", "Σ").replace("\\Delta", "Δ"),
    }
}

/// 由本征值判断金属性与带隙
///
/// 任一能带跨越费米能级即为金属（带隙 0）；否则带隙为
/// 导带底与价带顶之差。两侧之一没有能级时无法确定。
pub fn band_gap(channels: &[&Vec<Vec<f64>>], efermi: f64) -> (bool, Option<f64>) {
    let mut vbm = f64::NEG_INFINITY;
    let mut cbm = f64::INFINITY;

    for channel in channels {
        for band in channel.iter() {
            let lo = band.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = band.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            if lo < efermi && hi > efermi {
                return (true, Some(0.0));
            }
            if hi <= efermi {
                vbm = vbm.max(hi);
            } else {
                cbm = cbm.min(lo);
            }
        }
    }

    if vbm.is_finite() && cbm.is_finite() {
        (false, Some((cbm - vbm).max(0.0)))
    } else {
        (false, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn band_doc(value: serde_json::Value) -> BandStructureDoc {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_dos_spin_polarized_total() {
        let doc: DosDoc = serde_json::from_value(json!({
            "efermi": 0.5,
            "energies": [-1.0, 0.0, 1.0],
            "densities": {"1": [1.0, 2.0, 3.0], "-1": [0.5, 0.5, 0.5]}
        }))
        .unwrap();
        let rec = dos("mp-13", doc).unwrap();
        assert_eq!(rec.total, vec![1.5, 2.5, 3.5]);
        assert_eq!(rec.spin_down, Some(vec![0.5, 0.5, 0.5]));
    }

    #[test]
    fn test_dos_rejects_empty_and_mismatched() {
        let empty: DosDoc = serde_json::from_value(json!({
            "efermi": 0.0, "energies": [], "densities": {"1": []}
        }))
        .unwrap();
        assert!(dos("mp-1", empty).is_err());

        let mismatched: DosDoc = serde_json::from_value(json!({
            "efermi": 0.0, "energies": [0.0, 1.0], "densities": {"1": [1.0]}
        }))
        .unwrap();
        assert!(matches!(
            dos("mp-1", mismatched),
            Err(SchemaError::Inconsistent { .. })
        ));

        let no_up: DosDoc = serde_json::from_value(json!({
            "efermi": 0.0, "energies": [0.0], "densities": {"-1": [1.0]}
        }))
        .unwrap();
        assert!(matches!(
            dos("mp-1", no_up),
            Err(SchemaError::MissingField { .. })
        ));
    }

    #[test]
    fn test_path_distances_with_branch_break() {
        let kpoints = [
            [0.0, 0.0, 0.0],
            [0.5, 0.0, 0.0],
            [0.5, 0.5, 0.0],
            [0.0, 0.0, 0.5],
        ];
        let matrix = [[2.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 2.0]];
        let branches: Vec<BranchDoc> = serde_json::from_value(json!([
            {"start_index": 0, "end_index": 2, "name": "G-X-M"},
            {"start_index": 3, "end_index": 3, "name": "Z"}
        ]))
        .unwrap();
        let d = path_distances(&kpoints, Some(&matrix), Some(&branches));
        assert_eq!(d, vec![0.0, 1.0, 2.0, 2.0]);

        let plain = path_distances(&kpoints[..2], None, None);
        assert_eq!(plain, vec![0.0, 0.5]);
    }

    #[test]
    fn test_ticks_merge_labels_at_same_distance() {
        let kpoints = [[0.0, 0.0, 0.0], [0.5, 0.0, 0.0], [0.5, 0.5, 0.0], [0.5, 0.0, 0.0]];
        let distances = [0.0, 1.0, 2.0, 2.0];
        let mut labels = BTreeMap::new();
        labels.insert("\\Gamma".to_string(), [0.0, 0.0, 0.0]);
        labels.insert("X".to_string(), [0.5, 0.0, 0.0]);
        labels.insert("M".to_string(), [0.5, 0.5, 0.0]);

        let ticks = high_symmetry_ticks(&kpoints, &distances, &labels);
        let names: Vec<_> = ticks.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(names, vec!["Γ", "X", "M|X"]);
        assert_eq!(ticks[2].distance, 2.0);
    }

    #[test]
    fn test_band_gap_semiconductor_and_metal() {
        let insulator = vec![vec![-2.0, -1.0, -1.5], vec![1.0, 0.5, 2.0]];
        assert_eq!(band_gap(&[&insulator], 0.0), (false, Some(1.5)));

        let metal = vec![vec![-1.0, 0.2, 1.0]];
        assert_eq!(band_gap(&[&metal], 0.0), (true, Some(0.0)));

        let only_valence = vec![vec![-1.0, -2.0]];
        assert_eq!(band_gap(&[&only_valence], 0.0), (false, None));
    }

    #[test]
    fn test_bands_record() {
        let doc = band_doc(json!({
            "efermi": 0.0,
            "kpoints": [[0.0, 0.0, 0.0], [0.5, 0.0, 0.0]],
            "bands": {"1": [[-1.0, -0.5], [1.0, 1.2]]},
            "labels_dict": {"\\Gamma": [0.0, 0.0, 0.0], "X": [0.5, 0.0, 0.0]}
        }));
        let rec = bands("mp-149", doc).unwrap();
        assert!(!rec.is_metal);
        assert_eq!(rec.band_gap, Some(1.5));
        assert_eq!(rec.ticks.len(), 2);
        assert!(rec.spin_down.is_none());
    }

    #[test]
    fn test_bands_rejects_ragged_band() {
        let doc = band_doc(json!({
            "efermi": 0.0,
            "kpoints": [[0.0, 0.0, 0.0], [0.5, 0.0, 0.0]],
            "bands": {"1": [[-1.0]]}
        }));
        assert!(matches!(
            bands("mp-1", doc),
            Err(SchemaError::Inconsistent { .. })
        ));
    }
}
