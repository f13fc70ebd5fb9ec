//! # 响应标准化模块
//!
//! 将 `RawResponse` 解码为带类型的文档，再提取为 `NormalizedRecord`。
//! 相同输入总是得到完全相同的记录（所有映射均为有序结构）。
//!
//! ## 依赖关系
//! - 被 `batch/driver.rs`, `plot/`, `commands/query.rs` 使用
//! - 使用 `models/`
//! - 子模块: scalar, electronic, nemad

pub mod electronic;
pub mod nemad;
pub mod scalar;

use crate::error::SchemaError;
use crate::models::{Identifier, NormalizedRecord, RawResponse, TypedResponse};

/// 标准化单个响应
pub fn normalize(id: &Identifier, raw: &RawResponse) -> Result<NormalizedRecord, SchemaError> {
    let material_id = id.as_str();
    Ok(match raw.decode()? {
        TypedResponse::Summary(doc) => NormalizedRecord::Summary(scalar::summary(material_id, doc)),
        TypedResponse::Magnetic(doc) => {
            NormalizedRecord::Magnetic(scalar::magnetic(material_id, doc))
        }
        TypedResponse::Elastic(doc) => NormalizedRecord::Elastic(scalar::elastic(material_id, doc)?),
        TypedResponse::Dos(doc) => NormalizedRecord::Dos(electronic::dos(material_id, doc)?),
        TypedResponse::BandStructure(doc) => {
            NormalizedRecord::Bands(electronic::bands(material_id, doc)?)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PropertyKind;
    use serde_json::json;

    #[test]
    fn test_normalize_is_deterministic() {
        let id = Identifier::new("mp-149").unwrap();
        let raw = RawResponse::new(
            PropertyKind::Dos,
            json!({
                "efermi": 5.6,
                "energies": [4.0, 5.0, 6.0],
                "densities": {"1": [0.1, 0.2, 0.3], "-1": [0.1, 0.1, 0.1]}
            }),
        );
        let a = normalize(&id, &raw).unwrap().to_json_string().unwrap();
        let b = normalize(&id, &raw).unwrap().to_json_string().unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_normalize_summary_keeps_absent_fields_absent() {
        let id = Identifier::new("mp-149").unwrap();
        let raw = RawResponse::new(
            PropertyKind::Summary,
            json!({"material_id": "mp-149", "formula_pretty": "Si", "band_gap": 0.0}),
        );
        match normalize(&id, &raw).unwrap() {
            NormalizedRecord::Summary(rec) => {
                assert_eq!(rec.band_gap, Some(0.0));
                assert_eq!(rec.energy_above_hull, None);
                assert!(rec.icsd_ids.is_empty());
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_normalize_fails_closed_on_missing_required() {
        let id = Identifier::new("mp-149").unwrap();
        let raw = RawResponse::new(PropertyKind::Magnetic, json!({"total_magnetization": 1.0}));
        assert!(matches!(
            normalize(&id, &raw),
            Err(SchemaError::MissingField { .. })
        ));
    }
}
