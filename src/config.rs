//! # 远程服务配置
//!
//! 启动时从命令行参数（或环境变量）构建一次，校验后以引用传给客户端。
//!
//! ## 依赖关系
//! - 被 `commands/` 构建
//! - 被 `remote/` 使用

use crate::error::{Result, ScreenError};

use std::time::Duration;

/// Materials Project 默认地址
pub const MP_DEFAULT_ENDPOINT: &str = "https://api.materialsproject.org";
/// NEMAD 默认地址
pub const NEMAD_DEFAULT_ENDPOINT: &str = "https://api.nemad.org";

/// 单个远程服务的连接配置
#[derive(Clone)]
pub struct RemoteConfig {
    /// 服务名（用于日志与错误信息）
    pub service: &'static str,
    pub api_key: String,
    pub endpoint: String,
    pub timeout: Duration,
    /// 相邻两次请求的最小间隔
    pub min_interval: Duration,
}

impl RemoteConfig {
    /// 校验并构建配置；缺少密钥为致命配置错误
    pub fn new(
        service: &'static str,
        env_var: &str,
        api_key: Option<&str>,
        endpoint: &str,
    ) -> Result<Self> {
        let api_key = require_key(service, env_var, api_key)?;
        let endpoint = endpoint.trim().trim_end_matches('/').to_string();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ScreenError::Config(format!(
                "{} endpoint must be an http(s) URL, got '{}'",
                service, endpoint
            )));
        }
        Ok(Self {
            service,
            api_key,
            endpoint,
            timeout: Duration::from_secs(30),
            min_interval: Duration::ZERO,
        })
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs.max(1));
        self
    }

    pub fn with_min_interval_ms(mut self, ms: u64) -> Self {
        self.min_interval = Duration::from_millis(ms);
        self
    }
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("service", &self.service)
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .field("min_interval", &self.min_interval)
            .finish()
    }
}

/// 密钥必须存在且非空
pub fn require_key(service: &str, env_var: &str, key: Option<&str>) -> Result<String> {
    match key.map(str::trim) {
        Some(k) if !k.is_empty() => Ok(k.to_string()),
        _ => Err(ScreenError::Config(format!(
            "{} API key not set. Provide it with the {} environment variable or the matching --*-api-key flag",
            service, env_var
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_or_blank_key_is_config_error() {
        assert!(matches!(
            RemoteConfig::new("MP", "MP_API_KEY", None, MP_DEFAULT_ENDPOINT),
            Err(ScreenError::Config(_))
        ));
        assert!(matches!(
            RemoteConfig::new("MP", "MP_API_KEY", Some("   "), MP_DEFAULT_ENDPOINT),
            Err(ScreenError::Config(_))
        ));
    }

    #[test]
    fn test_endpoint_is_normalized_and_key_redacted() {
        let cfg = RemoteConfig::new("NEMAD", "NEMAD_API_KEY", Some(" secret "), "https://api.nemad.org/")
            .unwrap()
            .with_min_interval_ms(250);
        assert_eq!(cfg.endpoint, "https://api.nemad.org");
        assert_eq!(cfg.api_key, "secret");
        assert_eq!(cfg.min_interval, Duration::from_millis(250));
        let dbg = format!("{:?}", cfg);
        assert!(!dbg.contains("secret"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn test_rejects_non_http_endpoint() {
        assert!(RemoteConfig::new("MP", "MP_API_KEY", Some("k"), "ftp://example.org").is_err());
    }
}
