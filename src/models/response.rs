//! # 远程响应数据模型
//!
//! `RawResponse` 保存原始 JSON；`decode` 按属性类型解码为带显式
//! 必选/可选字段的 `TypedResponse`，字段缺失或类型不符时直接失败。
//!
//! ## 依赖关系
//! - 被 `remote/` 构造
//! - 被 `normalize/` 解码使用

use crate::error::SchemaError;
use crate::models::PropertyKind;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// 单次远程调用返回的原始文档
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub kind: PropertyKind,
    pub body: Value,
}

impl RawResponse {
    pub fn new(kind: PropertyKind, body: Value) -> Self {
        Self { kind, body }
    }

    /// 按属性类型解码
    pub fn decode(&self) -> Result<TypedResponse, SchemaError> {
        if !self.body.is_object() {
            return Err(SchemaError::InvalidShape {
                kind: self.kind.to_string(),
                reason: "document is not a JSON object".to_string(),
            });
        }
        Ok(match self.kind {
            PropertyKind::Summary => TypedResponse::Summary(decode_as(self.kind, &self.body)?),
            PropertyKind::Magnetic => TypedResponse::Magnetic(decode_as(self.kind, &self.body)?),
            PropertyKind::Elastic => TypedResponse::Elastic(decode_as(self.kind, &self.body)?),
            PropertyKind::Dos => TypedResponse::Dos(decode_as(self.kind, &self.body)?),
            PropertyKind::Bands => {
                TypedResponse::BandStructure(decode_as(self.kind, &self.body)?)
            }
        })
    }
}

fn decode_as<T: DeserializeOwned>(kind: PropertyKind, body: &Value) -> Result<T, SchemaError> {
    T::deserialize(body).map_err(|e| {
        let msg = e.to_string();
        // serde 报告缺失字段的格式为 "missing field `name`"
        match msg
            .strip_prefix("missing field `")
            .and_then(|rest| rest.split('`').next())
        {
            Some(field) => SchemaError::MissingField {
                kind: kind.to_string(),
                field: field.to_string(),
            },
            None => SchemaError::InvalidShape {
                kind: kind.to_string(),
                reason: msg,
            },
        }
    })
}

/// 按类型区分的响应
#[derive(Debug, Clone)]
pub enum TypedResponse {
    Summary(SummaryDoc),
    Magnetic(MagneticDoc),
    Elastic(ElasticDoc),
    Dos(DosDoc),
    BandStructure(BandStructureDoc),
}

// ─────────────────────────────────────────────────────────────
// Materials Project 文档
// ─────────────────────────────────────────────────────────────

/// `/materials/summary/` 文档
#[derive(Debug, Clone, Deserialize)]
pub struct SummaryDoc {
    pub material_id: String,
    pub formula_pretty: String,
    pub band_gap: Option<f64>,
    pub energy_above_hull: Option<f64>,
    pub formation_energy_per_atom: Option<f64>,
    pub volume: Option<f64>,
    pub is_stable: Option<bool>,
    pub elements: Option<Vec<String>>,
    pub symmetry: Option<SymmetryDoc>,
    #[serde(rename = "database_IDs", alias = "database_Ids")]
    pub database_ids: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SymmetryDoc {
    pub crystal_system: Option<String>,
    pub symbol: Option<String>,
}

/// `/materials/magnetism/` 文档
#[derive(Debug, Clone, Deserialize)]
pub struct MagneticDoc {
    pub ordering: String,
    pub total_magnetization: Option<f64>,
    pub total_magnetization_normalized_vol: Option<f64>,
    pub num_magnetic_sites: Option<u32>,
    pub num_unique_magnetic_sites: Option<u32>,
    pub magmoms: Option<Vec<f64>>,
}

/// `/materials/elasticity/` 文档
#[derive(Debug, Clone, Deserialize)]
pub struct ElasticDoc {
    pub bulk_modulus: Option<ModulusDoc>,
    pub shear_modulus: Option<ModulusDoc>,
    pub homogeneous_poisson: Option<f64>,
    pub universal_anisotropy: Option<f64>,
    pub elastic_tensor: Option<ElasticTensorDoc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModulusDoc {
    pub voigt: Option<f64>,
    pub reuss: Option<f64>,
    pub vrh: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ElasticTensorDoc {
    pub ieee_format: Option<Vec<Vec<f64>>>,
    pub raw: Option<Vec<Vec<f64>>>,
}

/// 态密度文档（pymatgen `Dos.as_dict()` 形式）
#[derive(Debug, Clone, Deserialize)]
pub struct DosDoc {
    pub efermi: f64,
    pub energies: Vec<f64>,
    pub densities: BTreeMap<String, Vec<f64>>,
}

/// 能带文档（pymatgen `BandStructureSymmLine.as_dict()` 形式）
#[derive(Debug, Clone, Deserialize)]
pub struct BandStructureDoc {
    pub efermi: f64,
    pub kpoints: Vec<[f64; 3]>,
    pub bands: BTreeMap<String, Vec<Vec<f64>>>,
    pub labels_dict: Option<BTreeMap<String, [f64; 3]>>,
    pub lattice_rec: Option<LatticeDoc>,
    pub branches: Option<Vec<BranchDoc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LatticeDoc {
    pub matrix: [[f64; 3]; 3],
}

#[derive(Debug, Clone, Deserialize)]
pub struct BranchDoc {
    pub start_index: usize,
    pub end_index: usize,
    pub name: Option<String>,
}

// ─────────────────────────────────────────────────────────────
// NEMAD 文档
// ─────────────────────────────────────────────────────────────

/// NEMAD 检索结果中的单条记录
#[derive(Debug, Clone, Deserialize)]
pub struct NemadDoc {
    #[serde(rename = "Material_Name")]
    pub material_name: String,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_reports_missing_required_field() {
        let raw = RawResponse::new(PropertyKind::Dos, json!({"efermi": 1.0, "energies": [0.0]}));
        match raw.decode() {
            Err(SchemaError::MissingField { kind, field }) => {
                assert_eq!(kind, "dos");
                assert_eq!(field, "densities");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_decode_rejects_non_object() {
        let raw = RawResponse::new(PropertyKind::Summary, json!([1, 2, 3]));
        assert!(matches!(
            raw.decode(),
            Err(SchemaError::InvalidShape { .. })
        ));
    }

    #[test]
    fn test_summary_accepts_legacy_database_ids_key() {
        let raw = RawResponse::new(
            PropertyKind::Summary,
            json!({
                "material_id": "mp-20",
                "formula_pretty": "Fe",
                "database_Ids": {"icsd": ["icsd-631729"]}
            }),
        );
        match raw.decode().unwrap() {
            TypedResponse::Summary(doc) => {
                let ids = doc.database_ids.unwrap();
                assert_eq!(ids["icsd"], vec!["icsd-631729".to_string()]);
                assert!(doc.band_gap.is_none());
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_wrong_field_type_is_invalid_shape() {
        let raw = RawResponse::new(PropertyKind::Magnetic, json!({"ordering": 3}));
        assert!(matches!(
            raw.decode(),
            Err(SchemaError::InvalidShape { .. })
        ));
    }
}
