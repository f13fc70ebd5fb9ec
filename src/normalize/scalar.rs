//! # 标量属性提取
//!
//! 概要、磁性、弹性文档的提取。
//!
//! ## 依赖关系
//! - 被 `normalize/mod.rs` 调用

use crate::error::SchemaError;
use crate::models::response::{ElasticDoc, MagneticDoc, SummaryDoc};
use crate::models::{ElasticRecord, MagneticRecord, SummaryRecord};

/// 概要
pub fn summary(material_id: &str, doc: SummaryDoc) -> SummaryRecord {
    let (crystal_system, spacegroup) = match doc.symmetry {
        Some(sym) => (sym.crystal_system, sym.symbol),
        None => (None, None),
    };

    let mut icsd_ids: Vec<String> = doc
        .database_ids
        .and_then(|mut ids| ids.remove("icsd"))
        .unwrap_or_default()
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    icsd_ids.sort();
    icsd_ids.dedup();

    SummaryRecord {
        material_id: material_id.to_string(),
        formula: doc.formula_pretty,
        crystal_system,
        spacegroup,
        elements: doc.elements,
        is_stable: doc.is_stable,
        band_gap: doc.band_gap,
        energy_above_hull: doc.energy_above_hull,
        formation_energy_per_atom: doc.formation_energy_per_atom,
        volume: doc.volume,
        icsd_ids,
    }
}

/// 磁性
pub fn magnetic(material_id: &str, doc: MagneticDoc) -> MagneticRecord {
    MagneticRecord {
        material_id: material_id.to_string(),
        ordering: doc.ordering,
        total_magnetization: doc.total_magnetization,
        total_magnetization_normalized_vol: doc.total_magnetization_normalized_vol,
        num_magnetic_sites: doc.num_magnetic_sites,
        num_unique_magnetic_sites: doc.num_unique_magnetic_sites,
        magmoms: doc.magmoms,
    }
}

/// 弹性；模量与张量全部缺失时报错
pub fn elastic(material_id: &str, doc: ElasticDoc) -> Result<ElasticRecord, SchemaError> {
    let tensor = doc
        .elastic_tensor
        .and_then(|t| t.ieee_format.or(t.raw));

    if let Some(ref t) = tensor {
        if t.len() != 6 || t.iter().any(|row| row.len() != 6) {
            return Err(SchemaError::Inconsistent {
                kind: "elastic".to_string(),
                reason: format!("elastic tensor is not 6x6 ({} rows)", t.len()),
            });
        }
    }

    let (bulk_voigt, bulk_reuss, bulk_vrh) = match doc.bulk_modulus {
        Some(m) => (m.voigt, m.reuss, m.vrh),
        None => (None, None, None),
    };
    let (shear_voigt, shear_reuss, shear_vrh) = match doc.shear_modulus {
        Some(m) => (m.voigt, m.reuss, m.vrh),
        None => (None, None, None),
    };

    let record = ElasticRecord {
        material_id: material_id.to_string(),
        bulk_modulus_voigt: bulk_voigt,
        bulk_modulus_reuss: bulk_reuss,
        bulk_modulus_vrh: bulk_vrh,
        shear_modulus_voigt: shear_voigt,
        shear_modulus_reuss: shear_reuss,
        shear_modulus_vrh: shear_vrh,
        homogeneous_poisson: doc.homogeneous_poisson,
        universal_anisotropy: doc.universal_anisotropy,
        elastic_tensor: tensor,
    };

    let has_any = record.elastic_tensor.is_some()
        || [
            record.bulk_modulus_voigt,
            record.bulk_modulus_reuss,
            record.bulk_modulus_vrh,
            record.shear_modulus_voigt,
            record.shear_modulus_reuss,
            record.shear_modulus_vrh,
            record.homogeneous_poisson,
        ]
        .iter()
        .any(Option::is_some);

    if !has_any {
        return Err(SchemaError::MissingField {
            kind: "elastic".to_string(),
            field: "elastic_tensor".to_string(),
        });
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn elastic_doc(value: serde_json::Value) -> ElasticDoc {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_elastic_prefers_ieee_tensor() {
        let ieee: Vec<Vec<f64>> = (0..6).map(|i| vec![i as f64; 6]).collect();
        let doc = elastic_doc(json!({
            "bulk_modulus": {"voigt": 89.0, "reuss": 88.0, "vrh": 88.5},
            "shear_modulus": {"vrh": 61.2},
            "homogeneous_poisson": 0.22,
            "elastic_tensor": {"ieee_format": ieee, "raw": [[0.0]]}
        }));
        let rec = elastic("mp-149", doc).unwrap();
        assert_eq!(rec.bulk_modulus_vrh, Some(88.5));
        assert_eq!(rec.shear_modulus_voigt, None);
        assert_eq!(rec.elastic_tensor.unwrap()[5][0], 5.0);
    }

    #[test]
    fn test_elastic_rejects_bad_tensor_and_empty_doc() {
        let bad = elastic_doc(json!({"elastic_tensor": {"raw": [[1.0, 2.0]]}}));
        assert!(matches!(
            elastic("mp-1", bad),
            Err(SchemaError::Inconsistent { .. })
        ));

        let empty = elastic_doc(json!({"universal_anisotropy": null}));
        assert!(matches!(
            elastic("mp-1", empty),
            Err(SchemaError::MissingField { .. })
        ));
    }

    #[test]
    fn test_summary_collects_icsd_ids() {
        let doc: SummaryDoc = serde_json::from_value(json!({
            "material_id": "mp-13",
            "formula_pretty": "Fe",
            "symmetry": {"crystal_system": "Cubic", "symbol": "Im-3m"},
            "database_IDs": {"icsd": ["icsd-64795", " icsd-52258", "icsd-64795"]}
        }))
        .unwrap();
        let rec = summary("mp-13", doc);
        assert_eq!(rec.crystal_system.as_deref(), Some("Cubic"));
        assert_eq!(rec.spacegroup.as_deref(), Some("Im-3m"));
        assert_eq!(rec.icsd_ids, vec!["icsd-52258", "icsd-64795"]);
    }
}
