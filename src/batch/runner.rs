//! # 批量执行器
//!
//! 按输入顺序执行批量任务，结果也按输入顺序返回。
//!
//! ## 功能
//! - 默认单线程顺序执行；`jobs > 1` 时使用 rayon 线程池
//! - 进度条显示（每个条目推进一次）
//! - 失败收集与汇总
//!
//! ## 依赖关系
//! - 被 `batch/driver.rs`, `commands/plot.rs` 调用
//! - 使用 `utils/progress.rs` 创建进度条
//! - 使用 `rayon` 进行并行计算

use crate::error::{Result, ScreenError};
use crate::utils::progress;

use indicatif::ProgressBar;
use rayon::prelude::*;

/// 单个失败条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub identifier: String,
    pub category: String,
    pub reason: String,
}

/// 批量处理结果统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    /// 成功数量
    pub succeeded: usize,
    /// 跳过数量（重复标识）
    pub skipped: usize,
    /// 失败数量
    pub failed: usize,
    /// 失败详情（按输入顺序）
    pub failures: Vec<Failure>,
}

impl BatchSummary {
    pub fn record_success(&mut self) {
        self.succeeded += 1;
    }

    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    pub fn record_failure(&mut self, identifier: &str, category: &str, reason: &str) {
        self.failed += 1;
        self.failures.push(Failure {
            identifier: identifier.to_string(),
            category: category.to_string(),
            reason: reason.to_string(),
        });
    }

    /// 总处理数量
    pub fn total(&self) -> usize {
        self.succeeded + self.skipped + self.failed
    }
}

/// 批量执行器
pub struct BatchRunner {
    /// 并行作业数
    jobs: usize,
    /// 是否显示进度条
    show_progress: bool,
}

impl BatchRunner {
    /// 创建新的批量执行器；`jobs == 0` 表示使用全部 CPU
    pub fn new(jobs: usize) -> Self {
        let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        Self {
            jobs,
            show_progress: true,
        }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// 处理条目列表，结果与输入一一对应
    pub fn run<T, R, F>(&self, items: &[T], message: &str, processor: F) -> Result<Vec<R>>
    where
        T: Sync,
        R: Send,
        F: Fn(&T, &ProgressBar) -> R + Sync + Send,
    {
        let pb = if self.show_progress {
            progress::create_progress_bar(items.len() as u64, message)
        } else {
            ProgressBar::hidden()
        };

        let results: Vec<R> = if self.jobs <= 1 {
            items
                .iter()
                .map(|item| {
                    let result = processor(item, &pb);
                    pb.inc(1);
                    result
                })
                .collect()
        } else {
            // 配置 rayon 线程池
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.jobs)
                .build()
                .map_err(|e| ScreenError::Other(format!("failed to start worker pool: {}", e)))?;

            pool.install(|| {
                items
                    .par_iter()
                    .map(|item| {
                        let result = processor(item, &pb);
                        pb.inc(1);
                        result
                    })
                    .collect()
            })
        };

        pb.finish_and_clear();
        Ok(results)
    }
}
