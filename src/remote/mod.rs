//! # 远程数据库适配层
//!
//! 将单个标识或查询条件转换为 HTTP 请求，并返回原始 JSON。
//! 不做重试；失败以 `RemoteError` 返回，由调用方决定跳过或终止。
//!
//! ## 依赖关系
//! - 被 `batch/driver.rs`, `commands/` 使用
//! - 使用 `config.rs`, `models/`
//! - 子模块: mp, nemad

pub mod mp;
pub mod nemad;

pub use mp::{CandidateSearch, MpClient};
pub use nemad::NemadClient;

use crate::config::RemoteConfig;
use crate::error::{RemoteError, Result, ScreenError};
use crate::models::{Identifier, PropertyKind, QueryFilter, RawResponse};

use serde_json::Value;
use std::sync::Mutex;
use std::time::{Duration, Instant};

const USER_AGENT: &str = concat!("tmscreen/", env!("CARGO_PKG_VERSION"));

/// 按标识获取材料属性的数据源
pub trait MaterialsSource: Sync {
    fn fetch(&self, id: &Identifier, kind: PropertyKind) -> std::result::Result<RawResponse, RemoteError>;
}

/// 按条件检索的属性数据库
pub trait PropertyDatabase: Sync {
    fn search(&self, filter: &QueryFilter) -> std::result::Result<Vec<Value>, RemoteError>;
}

/// 按条件检索候选材料的数据源，返回原始 summary 文档
pub trait CandidateSource: Sync {
    fn search_candidates(
        &self,
        search: &mp::CandidateSearch,
    ) -> std::result::Result<Vec<Value>, RemoteError>;
}

/// 请求节流器：保证相邻请求间隔不小于 `min_interval`
pub struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval,
        }
    }

    /// 必要时阻塞等待
    pub fn wait(&self) {
        if self.min_interval.is_zero() {
            return;
        }
        let mut last = match self.last_request.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("Rate limiting: waiting {:?}", wait_time);
                std::thread::sleep(wait_time);
            }
        }
        *last = Some(Instant::now());
    }
}

/// 构建阻塞 HTTP 客户端
pub fn build_http_client(config: &RemoteConfig) -> Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(config.timeout)
        .build()
        .map_err(|e| {
            ScreenError::Config(format!(
                "failed to build HTTP client for {}: {}",
                config.service, e
            ))
        })
}

/// 将非 2xx 状态码映射为错误
pub fn classify_status(status: u16, body: &str, what: &str) -> RemoteError {
    match status {
        401 | 403 => RemoteError::Unauthorized { status },
        404 => RemoteError::NotFound {
            what: what.to_string(),
        },
        429 => RemoteError::RateLimited,
        _ => RemoteError::Api {
            status,
            body: truncate(body, 200),
        },
    }
}

/// 将传输层错误映射为错误
pub fn classify_transport(err: &reqwest::Error) -> RemoteError {
    if err.is_timeout() {
        RemoteError::Timeout
    } else {
        let kind = if err.is_connect() {
            "connect"
        } else if err.is_request() {
            "request"
        } else {
            "transport"
        };
        RemoteError::Network(format!("{} error: {}", kind, err))
    }
}

/// 发送 GET 请求并解析 JSON 响应体
pub(crate) fn get_json(
    client: &reqwest::blocking::Client,
    limiter: &RateLimiter,
    service: &str,
    url: &str,
    headers: &[(&str, &str)],
    params: &[(String, String)],
    what: &str,
) -> std::result::Result<Value, RemoteError> {
    limiter.wait();
    tracing::debug!(service = service, url = %url, params = ?params, "GET");

    let mut request = client.get(url).query(params);
    for (name, value) in headers {
        request = request.header(*name, *value);
    }

    let response = request.send().map_err(|e| {
        let err = classify_transport(&e);
        tracing::warn!(service = service, url = %url, error = %err, "request failed");
        err
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        let err = classify_status(status.as_u16(), &body, what);
        tracing::warn!(service = service, url = %url, status = %status, "API returned error status");
        return Err(err);
    }

    response
        .json::<Value>()
        .map_err(|e| RemoteError::Decode(e.to_string()))
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut s: String = text.chars().take(max_chars).collect();
        s.push_str("...");
        s
    }
}
