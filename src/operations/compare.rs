use std::io::Write;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{CompareConfig, ErrorPolicy};
use crate::error::{self, CompareError};
use crate::models::{CompareStats, Entry};
use crate::report::Reporter;
use crate::scanner::{DirectoryComparator, ParallelTreeWalker, TreeWalker};

/// 比较操作 - 驱动遍历器并把结果交给输出器
pub struct CompareOperation {
    config: CompareConfig,
    progress: ProgressBar,
}

impl CompareOperation {
    pub fn new(config: CompareConfig) -> Self {
        Self {
            config,
            progress: ProgressBar::hidden(),
        }
    }

    /// 在标准错误上显示进度
    pub fn with_progress(mut self, show: bool) -> Self {
        self.progress = if show && !cfg!(test) {
            create_progress_bar()
        } else {
            ProgressBar::hidden()
        };
        self
    }

    /// 检查两个根目录是否存在
    pub fn validate(&self) -> error::Result<()> {
        for root in [&self.config.origin_root, &self.config.new_root] {
            if !root.is_dir() {
                return Err(CompareError::NotADirectory { path: root.clone() });
            }
        }
        Ok(())
    }

    /// 执行比较，结果写入 `out`
    pub fn run<W: Write>(&self, out: W) -> Result<CompareStats> {
        self.validate()?;

        let comparator = DirectoryComparator::new(&self.config);
        let mut reporter = Reporter::new(out, self.config.format, self.config.report);
        let mut stats = CompareStats::start();

        tracing::info!(
            "比较 {} -> {}",
            self.config.origin_root.display(),
            self.config.new_root.display()
        );

        if self.config.is_parallel() {
            let (rx, handle) = ParallelTreeWalker::new(comparator, self.config.jobs)
                .with_progress(self.progress.clone())
                .walk()
                .context("failed to start worker pool")?;
            // 接收端在 consume 返回时被丢弃，工作线程随之停止
            let consumed = self.consume(rx.into_iter(), &mut reporter, &mut stats);
            if handle.join().is_err() {
                anyhow::bail!("worker thread panicked");
            }
            consumed?;
        } else {
            let walker = TreeWalker::new(&comparator).with_progress(self.progress.clone());
            self.consume(walker, &mut reporter, &mut stats)?;
        }

        let written = reporter.written();
        reporter.finish().context("failed to write output")?;
        stats.finish();
        self.progress.finish_and_clear();

        tracing::info!("比较完成: {}", stats);
        tracing::info!("输出 {} 条记录", written);
        if !stats.has_differences() {
            tracing::info!("未发现差异");
        }
        Ok(stats)
    }

    /// 逐条处理遍历结果，按错误策略终止或跳过
    fn consume<W, I>(
        &self,
        items: I,
        reporter: &mut Reporter<W>,
        stats: &mut CompareStats,
    ) -> Result<()>
    where
        W: Write,
        I: Iterator<Item = error::Result<Entry>>,
    {
        for item in items {
            match item {
                Ok(entry) => {
                    stats.record(&entry);
                    reporter.report(&entry).context("failed to write output")?;
                }
                Err(err) => match self.config.on_error {
                    ErrorPolicy::Abort => {
                        self.progress.abandon();
                        return Err(err.into());
                    }
                    ErrorPolicy::Skip => {
                        tracing::warn!("跳过: {}", err);
                        stats.record_skipped();
                    }
                },
            }
        }
        Ok(())
    }
}

/// 创建进度条
fn create_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] 文件: {pos} | {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
