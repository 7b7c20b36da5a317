pub mod compare_stats;
pub mod entry;

pub use compare_stats::CompareStats;
pub use entry::{Entry, RelativePath, Status};
