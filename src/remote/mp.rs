//! # Materials Project 客户端
//!
//! 通过 MP REST API（`X-API-KEY` 认证，`{"data": [...]}` 包装）获取
//! 概要、磁性、弹性、态密度与能带文档。
//!
//! 态密度与能带需两步：先从 `electronic_structure` 文档取 task id，
//! 再请求对应的 `object` 端点。
//!
//! ## 依赖关系
//! - 被 `commands/fetch.rs`, `commands/screen.rs` 使用
//! - 使用 `remote/mod.rs` 的请求与节流工具

use super::{build_http_client, get_json, CandidateSource, MaterialsSource, RateLimiter};
use crate::config::RemoteConfig;
use crate::error::{RemoteError, Result};
use crate::models::{BandPathType, Identifier, PropertyKind, RawResponse};

use serde_json::Value;

const SUMMARY_FIELDS: &str = "material_id,formula_pretty,band_gap,energy_above_hull,\
formation_energy_per_atom,volume,is_stable,elements,symmetry,database_IDs";
const MAGNETIC_FIELDS: &str = "material_id,ordering,total_magnetization,\
total_magnetization_normalized_vol,num_magnetic_sites,num_unique_magnetic_sites,magmoms";
const ELASTIC_FIELDS: &str = "material_id,bulk_modulus,shear_modulus,homogeneous_poisson,\
universal_anisotropy,elastic_tensor";

/// 候选检索每页条数
const SEARCH_PAGE_SIZE: usize = 1000;

/// Materials Project 客户端
pub struct MpClient {
    config: RemoteConfig,
    client: reqwest::blocking::Client,
    limiter: RateLimiter,
    path_type: BandPathType,
}

impl MpClient {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        Ok(Self {
            client: build_http_client(config)?,
            limiter: RateLimiter::new(config.min_interval),
            config: config.clone(),
            path_type: BandPathType::default(),
        })
    }

    /// 设置能带路径约定
    pub fn with_path_type(mut self, path_type: BandPathType) -> Self {
        self.path_type = path_type;
        self
    }

    fn get(&self, path: &str, params: &[(String, String)], what: &str) -> std::result::Result<Value, RemoteError> {
        let url = format!("{}{}", self.config.endpoint, path);
        get_json(
            &self.client,
            &self.limiter,
            self.config.service,
            &url,
            &[("X-API-KEY", self.config.api_key.as_str()), ("accept", "application/json")],
            params,
            what,
        )
    }

    fn lookup(
        &self,
        path: &str,
        id: &Identifier,
        fields: &str,
    ) -> std::result::Result<Value, RemoteError> {
        let params = vec![
            ("material_ids".to_string(), id.to_string()),
            ("_fields".to_string(), fields.to_string()),
            ("_all_fields".to_string(), "false".to_string()),
        ];
        let body = self.get(path, &params, id.as_str())?;
        first_document(body, id.as_str())
    }

    fn fetch_electronic(
        &self,
        id: &Identifier,
        kind: PropertyKind,
    ) -> std::result::Result<Value, RemoteError> {
        let (field, object_path) = match kind {
            PropertyKind::Dos => ("dos", "/materials/electronic_structure/dos/object/"),
            _ => (
                "bandstructure",
                "/materials/electronic_structure/bandstructure/object/",
            ),
        };

        let doc = self.lookup("/materials/electronic_structure/", id, field)?;
        let task_id = match kind {
            PropertyKind::Dos => dos_task_id(&doc),
            _ => band_task_id(&doc, self.path_type),
        }
        .ok_or_else(|| RemoteError::NotFound {
            what: format!("{} {} data", id, kind),
        })?;

        tracing::debug!(material = %id, task_id = %task_id, kind = %kind, "resolved electronic structure task");

        let params = vec![("task_id".to_string(), task_id.clone())];
        let body = self.get(object_path, &params, &task_id)?;
        object_document(body, &task_id)
    }

    /// 按条件分页检索候选材料，返回全部 summary 文档
    pub fn search_candidates(
        &self,
        search: &CandidateSearch,
    ) -> std::result::Result<Vec<Value>, RemoteError> {
        let mut found = Vec::new();
        let mut skip = 0;
        loop {
            let params = search.params(skip, SEARCH_PAGE_SIZE);
            let body = self.get("/materials/summary/", &params, &search.element)?;
            let page = data_array(body)?;
            let count = page.len();
            found.extend(page);
            if count < SEARCH_PAGE_SIZE {
                break;
            }
            skip += count;
        }
        Ok(found)
    }
}

impl MaterialsSource for MpClient {
    fn fetch(
        &self,
        id: &Identifier,
        kind: PropertyKind,
    ) -> std::result::Result<RawResponse, RemoteError> {
        let body = match kind {
            PropertyKind::Summary => self.lookup("/materials/summary/", id, SUMMARY_FIELDS)?,
            PropertyKind::Magnetic => self.lookup("/materials/magnetism/", id, MAGNETIC_FIELDS)?,
            PropertyKind::Elastic => self.lookup("/materials/elasticity/", id, ELASTIC_FIELDS)?,
            PropertyKind::Dos | PropertyKind::Bands => self.fetch_electronic(id, kind)?,
        };
        Ok(RawResponse::new(kind, body))
    }
}

impl CandidateSource for MpClient {
    fn search_candidates(
        &self,
        search: &CandidateSearch,
    ) -> std::result::Result<Vec<Value>, RemoteError> {
        MpClient::search_candidates(self, search)
    }
}

// ─────────────────────────────────────────────────────────────
// 候选检索条件
// ─────────────────────────────────────────────────────────────

/// 磁性过渡金属候选检索条件（单个元素 + 一组排除元素）
#[derive(Debug, Clone)]
pub struct CandidateSearch {
    pub element: String,
    pub exclude: Vec<String>,
    pub min_magnetization_per_volume: f64,
    pub min_unique_magnetic_sites: u32,
}

impl CandidateSearch {
    /// summary 端点查询参数
    pub fn params(&self, skip: usize, limit: usize) -> Vec<(String, String)> {
        let mut params = vec![
            ("elements".to_string(), self.element.clone()),
            ("is_stable".to_string(), "true".to_string()),
            ("formation_energy_per_atom_max".to_string(), "0".to_string()),
            ("total_magnetization_min".to_string(), "0".to_string()),
            (
                "total_magnetization_normalized_vol_min".to_string(),
                self.min_magnetization_per_volume.to_string(),
            ),
            (
                "num_unique_magnetic_sites_min".to_string(),
                self.min_unique_magnetic_sites.to_string(),
            ),
            (
                "_fields".to_string(),
                "material_id,formula_pretty,formation_energy_per_atom".to_string(),
            ),
            ("_skip".to_string(), skip.to_string()),
            ("_limit".to_string(), limit.to_string()),
        ];
        if !self.exclude.is_empty() {
            params.push(("exclude_elements".to_string(), self.exclude.join(",")));
        }
        params
    }
}

/// 从 summary 文档中取出 (material_id, formula)
///
/// 服务端的 `formation_energy_per_atom_max` 是闭区间，这里要求形成能严格小于 0；
/// 缺少形成能的文档同样丢弃。
pub fn candidate_from_doc(doc: &Value) -> Option<(String, String)> {
    let id = doc.get("material_id").and_then(Value::as_str)?;
    let energy = doc.get("formation_energy_per_atom").and_then(Value::as_f64)?;
    if energy >= 0.0 {
        return None;
    }
    let formula = doc
        .get("formula_pretty")
        .and_then(Value::as_str)
        .unwrap_or_default();
    Some((id.to_string(), formula.to_string()))
}

/// 将元素符号按逗号拼接后的长度切块（单块不超过 `max_chars`）
pub fn chunk_symbols(symbols: &[String], max_chars: usize) -> Vec<Vec<String>> {
    let mut chunks = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut current_len = 0;

    for symbol in symbols {
        let add_len = symbol.len() + usize::from(!current.is_empty());
        if current_len + add_len > max_chars && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = symbol.len();
        } else {
            current_len += add_len;
        }
        current.push(symbol.clone());
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

// ─────────────────────────────────────────────────────────────
// 响应包装解析
// ─────────────────────────────────────────────────────────────

fn data_array(body: Value) -> std::result::Result<Vec<Value>, RemoteError> {
    match body {
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => Ok(items),
            Some(_) => Err(RemoteError::Decode("'data' is not an array".to_string())),
            None => Err(RemoteError::Decode("response has no 'data' field".to_string())),
        },
        _ => Err(RemoteError::Decode("response is not a JSON object".to_string())),
    }
}

/// 取 `data` 中的第一个文档；为空时视为不存在
fn first_document(body: Value, what: &str) -> std::result::Result<Value, RemoteError> {
    data_array(body)?
        .into_iter()
        .next()
        .ok_or_else(|| RemoteError::NotFound {
            what: what.to_string(),
        })
}

/// `object` 端点的文档：可能包在 `data[0].object` 中，也可能直接返回
fn object_document(body: Value, what: &str) -> std::result::Result<Value, RemoteError> {
    if body.get("data").is_none() && body.get("efermi").is_some() {
        return Ok(body);
    }
    let mut doc = first_document(body, what)?;
    match doc.get_mut("object").map(Value::take) {
        Some(obj) if !obj.is_null() => Ok(obj),
        _ => Ok(doc),
    }
}

fn task_id_of(value: Option<&Value>) -> Option<String> {
    value
        .and_then(|v| v.get("task_id"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// electronic_structure 文档中总态密度的 task id
pub fn dos_task_id(doc: &Value) -> Option<String> {
    task_id_of(doc.pointer("/dos/total/1")).or_else(|| task_id_of(doc.get("dos")))
}

/// electronic_structure 文档中指定路径能带的 task id
pub fn band_task_id(doc: &Value, path_type: BandPathType) -> Option<String> {
    task_id_of(doc.get("bandstructure").and_then(|b| b.get(path_type.api_key())))
}
