mod metrics;
mod summary;
pub mod views;

pub use metrics::{DashboardSnapshot, KafalatMetrics};
pub use summary::ViolationReport;
