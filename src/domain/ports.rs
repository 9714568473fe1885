use crate::domain::model::{PhysicianPage, ReportData, ReportRequest};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::time::Duration;

pub trait Storage: Send + Sync {
    /// Writes the whole file or nothing.
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn login(&self) -> &str;
    fn password(&self) -> &str;
    fn user_agent(&self) -> &str;
    fn request_delay(&self) -> Duration;
    fn request_timeout(&self) -> Duration;
    fn output_path(&self) -> &str;
    fn filename_prefix(&self) -> &str;
    fn report_title(&self) -> &str;
}

/// Everything a run tells the operator while it works.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Started {
        start: NaiveDate,
        end: NaiveDate,
        facility_id: String,
    },
    Authenticated,
    DayScanned {
        day: NaiveDate,
        links_on_day: usize,
        unique_links: usize,
    },
    NoPhysiciansFound,
    PhysicianProcessed {
        index: usize,
        total: usize,
        name: String,
        specialty: String,
        rows: usize,
    },
    PhysicianExcluded {
        name: String,
        specialty: String,
        reason: String,
    },
    ReportWritten {
        path: String,
        efficiency: f64,
    },
}

impl std::fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgressEvent::Started {
                start,
                end,
                facility_id,
            } => write!(
                f,
                "Starting extraction | Period: {} to {} | Facility: {}",
                start, end, facility_id
            ),
            ProgressEvent::Authenticated => write!(f, "Authentication submitted"),
            ProgressEvent::DayScanned {
                day,
                links_on_day,
                unique_links,
            } => write!(
                f,
                "{}: {} physician link(s), {} unique so far",
                day, links_on_day, unique_links
            ),
            ProgressEvent::NoPhysiciansFound => write!(f, "No physicians found in the period"),
            ProgressEvent::PhysicianProcessed {
                index,
                total,
                name,
                specialty,
                rows,
            } => write!(
                f,
                "[{}/{}] {} - {} ({} row(s))",
                index, total, name, specialty, rows
            ),
            ProgressEvent::PhysicianExcluded {
                name,
                specialty,
                reason,
            } => write!(f, "Excluded {} - {} ({})", name, specialty, reason),
            ProgressEvent::ReportWritten { path, efficiency } => write!(
                f,
                "Report written: {} | Overall efficiency: {:.2}%",
                path, efficiency
            ),
        }
    }
}

pub trait ProgressSink: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn report(&self, event: ProgressEvent) {
        self(event)
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    /// Authenticates and scrapes one page per unique physician.
    async fn extract(
        &self,
        request: &ReportRequest,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<PhysicianPage>>;

    /// Applies the exclusion filters and groups the rows by day.
    async fn transform(
        &self,
        request: &ReportRequest,
        pages: Vec<PhysicianPage>,
        progress: &dyn ProgressSink,
    ) -> Result<ReportData>;

    /// Renders and stores the report, returning where it was written.
    async fn load(&self, request: &ReportRequest, data: &ReportData) -> Result<String>;
}
