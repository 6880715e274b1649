pub mod dashboard;

pub use dashboard::{DashboardService, DashboardSettings, DashboardSnapshot, SnapshotStatus};
