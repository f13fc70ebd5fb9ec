//! # 统一错误处理模块
//!
//! 定义 tmscreen 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 错误分类
//! - `ScreenError`: 致命错误（配置、输入文件、绘图格式），直接终止命令
//! - `RemoteError`: 远程调用失败，按条目记录后继续
//! - `SchemaError`: 响应结构不符合预期，按条目记录后继续
//! - `ItemError`: 单个条目的失败原因（上述两者 + 写文件失败）
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// tmscreen 统一错误类型
#[derive(Error, Debug)]
pub enum ScreenError {
    // ─────────────────────────────────────────────────────────────
    // 配置错误
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    #[error("Unrecognized record shape in {path}\nReason: {reason}")]
    FormatError { path: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // 序列化与绘图
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Plot rendering failed: {0}")]
    PlotError(String),

    // ─────────────────────────────────────────────────────────────
    // 远程调用（仅在单次调用即整个命令时出现）
    // ─────────────────────────────────────────────────────────────
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("{0}")]
    Other(String),
}

/// 远程数据库调用错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("authentication rejected (HTTP {status})")]
    Unauthorized { status: u16 },

    #[error("not found: {what}")]
    NotFound { what: String },

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("undecodable response body: {0}")]
    Decode(String),
}

/// 响应结构校验错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("{kind} response has an unexpected shape: {reason}")]
    InvalidShape { kind: String, reason: String },

    #[error("{kind} response is missing required field '{field}'")]
    MissingField { kind: String, field: String },

    #[error("{kind} response is inconsistent: {reason}")]
    Inconsistent { kind: String, reason: String },
}

/// 单个条目的失败原因
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ItemError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("write failed: {0}")]
    Io(String),
}

impl ItemError {
    /// 错误日志中使用的类别名
    pub fn category(&self) -> &'static str {
        match self {
            ItemError::Remote(RemoteError::NotFound { .. }) => "not_found",
            ItemError::Remote(_) => "remote",
            ItemError::Schema(_) => "schema",
            ItemError::Io(_) => "io",
        }
    }
}

impl From<ScreenError> for ItemError {
    fn from(e: ScreenError) -> Self {
        match e {
            ScreenError::Remote(r) => ItemError::Remote(r),
            other => ItemError::Io(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, ScreenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_error_category() {
        let nf = ItemError::from(RemoteError::NotFound {
            what: "mp-999999".to_string(),
        });
        assert_eq!(nf.category(), "not_found");
        assert_eq!(ItemError::from(RemoteError::Timeout).category(), "remote");

        let schema = ItemError::from(SchemaError::MissingField {
            kind: "dos".to_string(),
            field: "energies".to_string(),
        });
        assert_eq!(schema.category(), "schema");
        assert!(schema.to_string().contains("energies"));
    }
}
