pub mod generator;
pub mod stats;

pub use generator::{generate_report, ReportOptions};
pub use stats::{calculate_summary, SummaryStats};
