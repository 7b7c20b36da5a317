use std::path::{Path, PathBuf};
use thiserror::Error;

/// 比较过程中面向用户的错误
#[derive(Error, Debug)]
pub enum CompareError {
    /// 根目录不存在或不是目录
    #[error("not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    /// 读取文件系统失败
    #[error("could not access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CompareError {
    /// 出错的路径
    pub fn path(&self) -> &Path {
        match self {
            CompareError::NotADirectory { path } => path,
            CompareError::Io { path, .. } => path,
        }
    }
}

pub type Result<T> = std::result::Result<T, CompareError>;

/// 为 io::Error 附加出错路径
pub(crate) fn io_err<P: AsRef<Path>>(path: P) -> impl FnOnce(std::io::Error) -> CompareError {
    let path = path.as_ref().to_path_buf();
    move |source| CompareError::Io { path, source }
}
