pub mod etl;
pub mod progress;
pub mod report;
pub mod runner;

pub use crate::domain::model::{ReportData, ReportRequest, RunSummary};
pub use crate::domain::ports::{ConfigProvider, Pipeline, ProgressEvent, ProgressSink, Storage};
pub use crate::utils::error::Result;
