use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, MAIN_SEPARATOR};

/// 单个文件或目录的比较结论
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// 内容一致
    #[serde(rename = "OK")]
    Ok,

    /// 新目录中不存在
    #[serde(rename = "MIS")]
    Missing,

    /// 内容不同
    #[serde(rename = "CHA")]
    Changed,

    /// 内容未发现差异，但新目录中的文件更新
    #[serde(rename = "OKN")]
    Newer,
}

impl Status {
    /// 固定 3 个字符的状态码
    pub fn code(&self) -> &'static str {
        match self {
            Status::Ok => "OK ",
            Status::Missing => "MIS",
            Status::Changed => "CHA",
            Status::Newer => "OKN",
        }
    }

    /// 是否属于需要报告的差异
    pub fn is_issue(&self) -> bool {
        matches!(self, Status::Missing | Status::Changed)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// 相对于根目录的路径
///
/// 以路径分隔符开头（如 `/sub/b.txt`），根目录本身为 `.`。
/// 排除规则按字符串前缀匹配这里的文本形式。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RelativePath(String);

impl RelativePath {
    /// 根目录
    pub fn root() -> Self {
        Self(".".to_string())
    }

    /// 由去掉根目录后的剩余部分构造
    pub fn from_stripped(rest: &Path) -> Self {
        let mut text = String::new();
        for component in rest.components() {
            text.push(MAIN_SEPARATOR);
            text.push_str(&component.as_os_str().to_string_lossy());
        }

        if text.is_empty() {
            Self::root()
        } else {
            Self(text)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "."
    }

    /// 字面前缀匹配，不按路径段区分
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 一条比较记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub status: Status,
    pub path: RelativePath,

    /// 仅缺失的目录为 true
    pub is_dir: bool,
}

impl Entry {
    pub fn file(status: Status, path: RelativePath) -> Self {
        Self {
            status,
            path,
            is_dir: false,
        }
    }

    /// 新目录中缺失的整个目录
    pub fn missing_dir(path: RelativePath) -> Self {
        Self {
            status: Status::Missing,
            path,
            is_dir: true,
        }
    }

    /// 输出用的路径，目录带结尾分隔符
    pub fn display_path(&self) -> String {
        if self.is_dir {
            format!("{}{}", self.path, MAIN_SEPARATOR)
        } else {
            self.path.to_string()
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.status.code(), self.display_path())
    }
}
