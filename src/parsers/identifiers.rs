//! # 标识列表读取器
//!
//! 从分隔文本文件中读取材料标识（每行一个）。
//!
//! ## 格式
//! - `.tsv` / `.tab` 使用制表符分隔，其余使用逗号
//! - 指定列名时首行为表头，该列必须存在
//! - 未指定列名时，若首行含 `ID` / `material_id` / `mp_id` 字段则视为表头，
//!   否则视为纯列表，取每行第一个字段
//! - 数据行之间的空行、所选字段为空的行均为解析错误；文件末尾的空行忽略
//!
//! ## 依赖关系
//! - 被 `commands/fetch.rs`, `commands/query.rs` 使用
//! - 使用 `csv` 读取

use crate::error::{Result, ScreenError};
use crate::models::Identifier;

use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter, Trim};
use std::collections::VecDeque;
use std::io::Cursor;
use std::path::PathBuf;

/// 自动识别为表头的列名
const ID_HEADERS: [&str; 4] = ["id", "material_id", "mp_id", "mpid"];

/// 标识来源（可重复读取）
#[derive(Debug, Clone)]
pub struct IdentifierSource {
    path: PathBuf,
    /// 候选列名，按顺序取第一个存在的列
    columns: Vec<String>,
}

impl IdentifierSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            columns: Vec::new(),
        }
    }

    /// 指定单个列名
    pub fn with_column(self, column: impl Into<String>) -> Self {
        self.with_columns([column])
    }

    /// 指定候选列名
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    fn delimiter(&self) -> u8 {
        match self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .as_deref()
        {
            Some("tsv") | Some("tab") => b'\t',
            _ => b',',
        }
    }

    fn parse_error(&self, reason: impl Into<String>) -> ScreenError {
        ScreenError::ParseError {
            format: "identifier list".to_string(),
            path: self.path.display().to_string(),
            reason: reason.into(),
        }
    }

    /// 打开文件并返回惰性迭代器；每次调用都重新读取文件
    pub fn iter(&self) -> Result<IdentifierIter> {
        if !self.path.is_file() {
            return Err(ScreenError::FileNotFound {
                path: self.path.display().to_string(),
            });
        }
        let bytes = std::fs::read(&self.path).map_err(|e| ScreenError::FileReadError {
            path: self.path.display().to_string(),
            source: e,
        })?;
        // csv 读取器会静默跳过空行，需先记录其行号
        let blank_lines = blank_lines(&bytes);

        let mut records = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .delimiter(self.delimiter())
            .from_reader(Cursor::new(bytes))
            .into_records();

        let first = match records.next() {
            Some(r) => {
                let record = r.map_err(|e| self.parse_error(e.to_string()))?;
                Some((record, records.reader().position().line()))
            }
            None => None,
        };

        let (column, pending) = match first {
            None => (0, None),
            Some((header, _)) if !self.columns.is_empty() => {
                let idx = self
                    .columns
                    .iter()
                    .find_map(|name| header.iter().position(|f| f.eq_ignore_ascii_case(name)))
                    .ok_or_else(|| {
                        self.parse_error(format!(
                            "none of the columns [{}] found in header",
                            self.columns.join(", ")
                        ))
                    })?;
                (idx, None)
            }
            Some((first, end_line)) => match first
                .iter()
                .position(|f| ID_HEADERS.iter().any(|h| f.eq_ignore_ascii_case(h)))
            {
                Some(idx) => (idx, None),
                None => (0, Some((first, end_line))),
            },
        };

        Ok(IdentifierIter {
            records,
            column,
            pending,
            blank_lines,
            path: self.path.display().to_string(),
        })
    }

    /// 读取全部标识；文件中没有任何标识时报错
    pub fn read_all(&self) -> Result<Vec<Identifier>> {
        let ids = self.iter()?.collect::<Result<Vec<_>>>()?;
        if ids.is_empty() {
            return Err(self.parse_error("no identifiers found"));
        }
        Ok(ids)
    }
}

/// 最后一个非空行之前的空行行号（从 1 开始）
fn blank_lines(bytes: &[u8]) -> VecDeque<u64> {
    let is_blank = |line: &[u8]| line.is_empty() || line == b"\r";
    let lines: Vec<&[u8]> = bytes.split(|&b| b == b'\n').collect();
    match lines.iter().rposition(|l| !is_blank(l)) {
        Some(last) => lines[..last]
            .iter()
            .enumerate()
            .filter(|(_, l)| is_blank(l))
            .map(|(i, _)| i as u64 + 1)
            .collect(),
        None => VecDeque::new(),
    }
}

/// 标识迭代器
pub struct IdentifierIter {
    records: StringRecordsIntoIter<Cursor<Vec<u8>>>,
    column: usize,
    /// 已读取但尚未返回的记录及其结束行号
    pending: Option<(StringRecord, u64)>,
    blank_lines: VecDeque<u64>,
    path: String,
}

impl IdentifierIter {
    fn parse_error(&self, reason: String) -> ScreenError {
        ScreenError::ParseError {
            format: "identifier list".to_string(),
            path: self.path.clone(),
            reason,
        }
    }
}

impl Iterator for IdentifierIter {
    type Item = Result<Identifier>;

    fn next(&mut self) -> Option<Self::Item> {
        let (record, end_line) = match self.pending.take() {
            Some(p) => p,
            None => match self.records.next()? {
                Ok(r) => {
                    let end_line = self.records.reader().position().line();
                    (r, end_line)
                }
                Err(e) => return Some(Err(self.parse_error(e.to_string()))),
            },
        };

        if let Some(&blank) = self.blank_lines.front() {
            if blank < end_line {
                self.blank_lines.pop_front();
                self.pending = Some((record, end_line));
                return Some(Err(self.parse_error(format!("line {}: empty row", blank))));
            }
        }

        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let field = record.get(self.column).unwrap_or("");

        Some(Identifier::new(field).ok_or_else(|| {
            self.parse_error(format!(
                "line {}: empty identifier in column {}",
                line,
                self.column + 1
            ))
        }))
    }
}
