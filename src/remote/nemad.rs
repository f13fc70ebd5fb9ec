//! # NEMAD 客户端
//!
//! NEMAD API（`X-API-Key` 认证，`{"results": [...]}` 包装）：
//! - 元素检索: `/api/<db>/search?elements=Fe,Co&exact_match=true&limit=N`
//! - 化学式检索: `/api/<db>/formula?formula=Fe3O4&limit=N`
//!
//! ## 依赖关系
//! - 被 `commands/query.rs` 使用
//! - 使用 `remote/mod.rs` 的请求与节流工具

use super::{build_http_client, get_json, PropertyDatabase, RateLimiter};
use crate::config::RemoteConfig;
use crate::error::{RemoteError, Result};
use crate::models::{MatchMode, QueryFilter, QueryTarget};

use serde_json::Value;

/// NEMAD 客户端
pub struct NemadClient {
    config: RemoteConfig,
    client: reqwest::blocking::Client,
    limiter: RateLimiter,
}

impl NemadClient {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        Ok(Self {
            client: build_http_client(config)?,
            limiter: RateLimiter::new(config.min_interval),
            config: config.clone(),
        })
    }
}

/// 构造请求路径与参数
pub fn request_for(filter: &QueryFilter) -> (String, Vec<(String, String)>) {
    let db = filter.db.as_path();
    match &filter.target {
        QueryTarget::Elements(els) => (
            format!("/api/{}/search", db),
            vec![
                ("elements".to_string(), els.join(",")),
                (
                    "exact_match".to_string(),
                    (filter.mode == MatchMode::Exact).to_string(),
                ),
                ("limit".to_string(), filter.limit.to_string()),
            ],
        ),
        QueryTarget::Formula(f) => (
            format!("/api/{}/formula", db),
            vec![
                ("formula".to_string(), f.clone()),
                ("limit".to_string(), filter.limit.to_string()),
            ],
        ),
    }
}

/// 取出 `results` 数组
fn results_array(body: Value) -> std::result::Result<Vec<Value>, RemoteError> {
    match body {
        Value::Object(mut map) => match map.remove("results") {
            Some(Value::Array(items)) => Ok(items),
            Some(Value::Null) | None => Err(RemoteError::Decode(
                "response has no 'results' array".to_string(),
            )),
            Some(_) => Err(RemoteError::Decode("'results' is not an array".to_string())),
        },
        _ => Err(RemoteError::Decode("response is not a JSON object".to_string())),
    }
}

impl PropertyDatabase for NemadClient {
    fn search(&self, filter: &QueryFilter) -> std::result::Result<Vec<Value>, RemoteError> {
        let (path, params) = request_for(filter);
        let url = format!("{}{}", self.config.endpoint, path);
        let body = get_json(
            &self.client,
            &self.limiter,
            self.config.service,
            &url,
            &[("X-API-Key", self.config.api_key.as_str()), ("accept", "application/json")],
            &params,
            &filter.target.label(),
        )?;
        results_array(body)
    }
}
