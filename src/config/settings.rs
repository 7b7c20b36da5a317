use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::Status;

/// 一次比较运行的全部配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareConfig {
    /// 参照目录
    pub origin_root: PathBuf,

    /// 被检查的目录
    pub new_root: PathBuf,

    /// 排除的相对路径前缀（按顺序匹配）
    pub excludes: Vec<String>,

    /// 忽略时间戳，总是比较内容
    pub ignore_times: bool,

    /// 是否跟随目录符号链接
    pub follow_symlinks: bool,

    /// 输出哪些状态
    pub report: ReportLevel,

    /// 文件系统错误的处理方式
    pub on_error: ErrorPolicy,

    /// 输出格式
    pub format: OutputFormat,

    /// 并发线程数，1 表示顺序遍历，0 表示按 CPU 核心数
    pub jobs: usize,
}

/// 输出哪些比较结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportLevel {
    /// 只输出 MIS 和 CHA
    Issues,
    /// 额外输出 OKN（新目录中的文件更新）
    Newer,
    /// 输出所有文件，包括 OK
    All,
}

/// 遇到无法读取的路径时如何处理
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// 终止整个运行
    Abort,
    /// 记录警告并跳过
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// 制表符分隔的文本
    Text,
    /// 每行一个 JSON 对象
    Json,
}

impl ReportLevel {
    /// 该级别下是否输出指定状态
    pub fn includes(&self, status: Status) -> bool {
        match self {
            ReportLevel::Issues => status.is_issue(),
            ReportLevel::Newer => status.is_issue() || status == Status::Newer,
            ReportLevel::All => true,
        }
    }
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            origin_root: PathBuf::from("."),
            new_root: PathBuf::from("."),
            excludes: Vec::new(),
            ignore_times: false,
            follow_symlinks: false,
            report: ReportLevel::Issues,
            on_error: ErrorPolicy::Abort,
            format: OutputFormat::Text,
            jobs: 1,
        }
    }
}

impl CompareConfig {
    /// 以两个根目录创建默认配置
    pub fn new(origin_root: impl Into<PathBuf>, new_root: impl Into<PathBuf>) -> Self {
        Self {
            origin_root: origin_root.into(),
            new_root: new_root.into(),
            ..Self::default()
        }
    }

    /// 是否使用并行遍历
    pub fn is_parallel(&self) -> bool {
        self.jobs != 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CompareConfig::new("/a", "/b");
        assert_eq!(config.origin_root, PathBuf::from("/a"));
        assert_eq!(config.new_root, PathBuf::from("/b"));
        assert!(config.excludes.is_empty());
        assert!(!config.ignore_times);
        assert_eq!(config.report, ReportLevel::Issues);
        assert_eq!(config.on_error, ErrorPolicy::Abort);
        assert!(!config.is_parallel());
    }

    #[test]
    fn test_report_level_includes() {
        assert!(ReportLevel::Issues.includes(Status::Missing));
        assert!(ReportLevel::Issues.includes(Status::Changed));
        assert!(!ReportLevel::Issues.includes(Status::Newer));
        assert!(!ReportLevel::Issues.includes(Status::Ok));

        assert!(ReportLevel::Newer.includes(Status::Newer));
        assert!(!ReportLevel::Newer.includes(Status::Ok));

        assert!(ReportLevel::All.includes(Status::Ok));
    }

    #[test]
    fn test_config_serializes_lowercase_enums() {
        let mut config = CompareConfig::new("/a", "/b");
        config.report = ReportLevel::Newer;
        config.on_error = ErrorPolicy::Skip;

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"report\":\"newer\""));
        assert!(json.contains("\"on_error\":\"skip\""));

        let back: CompareConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.report, ReportLevel::Newer);
        assert_eq!(back.on_error, ErrorPolicy::Skip);
    }
}
