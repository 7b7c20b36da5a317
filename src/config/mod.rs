pub mod settings;

pub use settings::{CompareConfig, ErrorPolicy, OutputFormat, ReportLevel};
