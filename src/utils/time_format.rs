use chrono::{DateTime, Utc};
use std::fs::Metadata;
use std::path::Path;

use crate::error::{io_err, Result};

/// 读取文件的最后修改时间（UTC）
pub fn modified_utc(metadata: &Metadata, path: &Path) -> Result<DateTime<Utc>> {
    metadata
        .modified()
        .map(DateTime::<Utc>::from)
        .map_err(io_err(path))
}

/// 格式化时间用于日志输出
pub fn format_time(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string()
}
