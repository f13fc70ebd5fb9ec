//! # NEMAD 结果标准化
//!
//! 将 `results` 数组中的单条记录转换为 `NemadEntry`：
//! 居里温度、奈尔温度、磁矩转为数值（接受数字字符串），
//! 其余列原样保留在 `properties` 中。
//!
//! ## 依赖关系
//! - 被 `commands/query.rs` 调用

use crate::error::SchemaError;
use crate::models::response::NemadDoc;
use crate::models::{NemadDb, NemadEntry};

use serde_json::Value;

const KIND: &str = "nemad";

/// 标准化单条 NEMAD 记录
pub fn normalize_entry(db: NemadDb, query: &str, value: Value) -> Result<NemadEntry, SchemaError> {
    if !value.is_object() {
        return Err(SchemaError::InvalidShape {
            kind: KIND.to_string(),
            reason: "result entry is not a JSON object".to_string(),
        });
    }

    let doc: NemadDoc = serde_json::from_value(value).map_err(|e| {
        let msg = e.to_string();
        if msg.contains("missing field") {
            SchemaError::MissingField {
                kind: KIND.to_string(),
                field: "Material_Name".to_string(),
            }
        } else {
            SchemaError::InvalidShape {
                kind: KIND.to_string(),
                reason: msg,
            }
        }
    })?;

    let material_name = doc.material_name.trim().to_string();
    if material_name.is_empty() {
        return Err(SchemaError::MissingField {
            kind: KIND.to_string(),
            field: "Material_Name".to_string(),
        });
    }

    let mut properties = doc.fields;
    let curie = take_number(&mut properties, "Curie")?;
    let neel = take_number(&mut properties, "Neel")?;
    let magnetic_moment = take_number(&mut properties, "Magnetic_Moment")?;
    let crystal_structure = take_text(&mut properties, "Crystal_Structure");
    let doi = take_text(&mut properties, "DOI");

    Ok(NemadEntry {
        db: db.as_path().to_string(),
        query: query.to_string(),
        material_name,
        curie,
        neel,
        magnetic_moment,
        crystal_structure,
        doi,
        properties,
    })
}

/// 取出数值列；空值与空字符串视为缺失
fn take_number(
    fields: &mut std::collections::BTreeMap<String, Value>,
    key: &str,
) -> Result<Option<f64>, SchemaError> {
    match fields.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s.trim().parse::<f64>().map(Some).map_err(|_| {
            SchemaError::InvalidShape {
                kind: KIND.to_string(),
                reason: format!("{} is not numeric: '{}'", key, s),
            }
        }),
        Some(other) => Err(SchemaError::InvalidShape {
            kind: KIND.to_string(),
            reason: format!("{} has unexpected type: {}", key, other),
        }),
    }
}

/// 取出文本列；数字按原样转为文本
fn take_text(fields: &mut std::collections::BTreeMap<String, Value>, key: &str) -> Option<String> {
    match fields.remove(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}
