pub mod hash;
pub mod time_format;

pub use hash::{hash_file, ContentHash};
pub use time_format::{format_time, modified_utc};
