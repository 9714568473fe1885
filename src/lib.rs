pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::{LocalStorage, PortalClient};
pub use app::pipelines::AttendancePipeline;
pub use crate::core::{
    etl::EtlEngine,
    progress::TracingProgress,
    runner::{ReportRunner, RunOutcome, RunStatus},
};
pub use utils::error::{EtlError, Result};
