pub mod toml_config;

pub use toml_config::TomlConfig;

#[cfg(feature = "cli")]
use crate::domain::model::ReportRequest;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "clinic-report")]
#[command(about = "Builds the physician attendance report from the clinic portal")]
pub struct CliConfig {
    #[arg(long, help = "First day of the period (YYYY-MM-DD)")]
    pub start: String,

    #[arg(long, help = "Last day of the period (YYYY-MM-DD)")]
    pub end: String,

    #[arg(long, help = "Facility id as used by the portal")]
    pub facility: String,

    #[arg(long, default_value = "", help = "Comma-separated physician name fragments to leave out")]
    pub exclude_physicians: String,

    #[arg(long, default_value = "", help = "Comma-separated specialty fragments to leave out")]
    pub exclude_specialties: String,

    #[arg(long, default_value = "clinic-report.toml")]
    pub config: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[arg(long, help = "Print the run summary as JSON")]
    pub json: bool,

    #[arg(long, help = "Print the planned listing requests and exit")]
    pub dry_run: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn report_request(&self) -> Result<ReportRequest> {
        ReportRequest::from_inputs(
            &self.start,
            &self.end,
            &self.facility,
            &self.exclude_physicians,
            &self.exclude_specialties,
        )
    }
}
