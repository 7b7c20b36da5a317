use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::models::{Entry, Status};

/// 一次比较运行的统计信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareStats {
    /// 比较过的文件数量（含缺失）
    pub files_compared: usize,

    /// 缺失的文件数量
    pub missing_files: usize,

    /// 缺失的目录数量
    pub missing_dirs: usize,

    /// 内容不同的文件数量
    pub changed_files: usize,

    /// 新目录中更新的文件数量
    pub newer_files: usize,

    /// 一致的文件数量
    pub unchanged_files: usize,

    /// 因读取错误而跳过的路径数量
    pub skipped_errors: usize,

    /// 开始时间
    pub started_at: DateTime<Utc>,

    /// 结束时间
    pub finished_at: Option<DateTime<Utc>>,

    /// 耗时
    pub duration: Option<Duration>,
}

impl Default for CompareStats {
    fn default() -> Self {
        Self {
            files_compared: 0,
            missing_files: 0,
            missing_dirs: 0,
            changed_files: 0,
            newer_files: 0,
            unchanged_files: 0,
            skipped_errors: 0,
            started_at: Utc::now(),
            finished_at: None,
            duration: None,
        }
    }
}

impl CompareStats {
    /// 开始计时
    pub fn start() -> Self {
        Self::default()
    }

    /// 记录一条比较结果
    pub fn record(&mut self, entry: &Entry) {
        if entry.is_dir {
            self.missing_dirs += 1;
            return;
        }

        self.files_compared += 1;
        match entry.status {
            Status::Missing => self.missing_files += 1,
            Status::Changed => self.changed_files += 1,
            Status::Newer => self.newer_files += 1,
            Status::Ok => self.unchanged_files += 1,
        }
    }

    /// 记录一次被跳过的错误
    pub fn record_skipped(&mut self) {
        self.skipped_errors += 1;
    }

    /// 结束计时
    pub fn finish(&mut self) {
        let end_time = Utc::now();
        self.finished_at = Some(end_time);
        self.duration = Some(
            end_time.signed_duration_since(self.started_at)
                .to_std()
                .unwrap_or_default()
        );
    }

    /// 是否发现了差异
    pub fn has_differences(&self) -> bool {
        self.missing_files + self.missing_dirs + self.changed_files > 0
    }

    /// 耗时的友好显示
    pub fn duration_display(&self) -> String {
        match self.duration {
            Some(duration) => {
                let millis = duration.as_millis();
                if millis < 1000 {
                    format!("{}ms", millis)
                } else if millis < 60_000 {
                    format!("{:.1}s", duration.as_secs_f64())
                } else {
                    let seconds = duration.as_secs();
                    format!("{}m {}s", seconds / 60, seconds % 60)
                }
            }
            None => "running".to_string(),
        }
    }
}

impl fmt::Display for CompareStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} files compared, {} missing, {} missing directories, {} changed, {} newer, {} skipped in {}",
            self.files_compared,
            self.missing_files,
            self.missing_dirs,
            self.changed_files,
            self.newer_files,
            self.skipped_errors,
            self.duration_display(),
        )
    }
}
