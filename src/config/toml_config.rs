use crate::core::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::logger::LogFormat;
use crate::utils::validation::{
    validate_path, validate_positive_number, validate_secret, validate_url, Validate,
    ENV_PLACEHOLDER,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 1000;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_FILENAME_PREFIX: &str = "Relatorio";
pub const DEFAULT_REPORT_TITLE: &str = "Physician Attendance Report";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub portal: PortalConfig,
    pub load: LoadConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    pub base_url: String,
    pub login: String,
    pub password: String,
    pub user_agent: Option<String>,
    pub request_delay_ms: Option<u64>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub filename_prefix: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub format: Option<String>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value. Unset variables are left
    /// in place so validation can name them.
    fn substitute_env_vars(content: &str) -> String {
        ENV_PLACEHOLDER
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.level.as_deref()
    }

    pub fn log_format(&self) -> LogFormat {
        self.logging
            .format
            .as_deref()
            .and_then(LogFormat::from_name)
            .unwrap_or_default()
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.portal.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }
}

impl ConfigProvider for TomlConfig {
    fn base_url(&self) -> &str {
        &self.portal.base_url
    }

    fn login(&self) -> &str {
        &self.portal.login
    }

    fn password(&self) -> &str {
        &self.portal.password
    }

    fn user_agent(&self) -> &str {
        self.portal.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    fn request_delay(&self) -> Duration {
        Duration::from_millis(
            self.portal
                .request_delay_ms
                .unwrap_or(DEFAULT_REQUEST_DELAY_MS),
        )
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds())
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn filename_prefix(&self) -> &str {
        self.load
            .filename_prefix
            .as_deref()
            .unwrap_or(DEFAULT_FILENAME_PREFIX)
    }

    fn report_title(&self) -> &str {
        self.report.title.as_deref().unwrap_or(DEFAULT_REPORT_TITLE)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_url("portal.base_url", &self.portal.base_url)?;
        validate_secret("portal.login", &self.portal.login)?;
        validate_secret("portal.password", &self.portal.password)?;
        validate_positive_number("portal.timeout_seconds", self.timeout_seconds(), 1)?;
        validate_path("load.output_path", &self.load.output_path)?;

        if let Some(format) = &self.logging.format {
            if LogFormat::from_name(format).is_none() {
                return Err(EtlError::InvalidConfigValueError {
                    field: "logging.format".to_string(),
                    value: format.clone(),
                    reason: "Unsupported format. Valid formats: compact, json".to_string(),
                });
            }
        }

        Ok(())
    }
}
