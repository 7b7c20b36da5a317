pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod operations;
pub mod report;
pub mod scanner;
pub mod utils;

// 重新导出常用类型
pub use config::CompareConfig;
pub use error::CompareError;
pub use models::{CompareStats, Entry, Status};
pub use operations::CompareOperation;
pub use scanner::{DirectoryComparator, ParallelTreeWalker, TreeWalker};
