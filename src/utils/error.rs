use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Portal request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Markup parsing error: {0}")]
    ParseError(#[from] crate::adapters::parser::ParseError),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing configuration value: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid input: {message}")]
    ValidationError { message: String },

    #[error("A report is already being generated")]
    AlreadyRunning,

    #[error("Report worker stopped unexpectedly: {message}")]
    WorkerFailed { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Parsing,
    Storage,
    Configuration,
    Input,
    Execution,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn validation(message: impl Into<String>) -> Self {
        EtlError::ValidationError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::HttpError(_) | EtlError::UrlError(_) => ErrorCategory::Network,
            EtlError::ParseError(_) => ErrorCategory::Parsing,
            EtlError::CsvError(_) | EtlError::IoError(_) => ErrorCategory::Storage,
            EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
            EtlError::ValidationError { .. } => ErrorCategory::Input,
            EtlError::AlreadyRunning | EtlError::WorkerFailed { .. } => ErrorCategory::Execution,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Low,
            ErrorCategory::Network | ErrorCategory::Parsing => ErrorSeverity::Medium,
            ErrorCategory::Storage | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Execution => match self {
                EtlError::AlreadyRunning => ErrorSeverity::Low,
                _ => ErrorSeverity::Critical,
            },
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::HttpError(e) if e.is_timeout() => {
                "The portal did not answer in time; raise portal.timeout_seconds or try again later"
            }
            EtlError::HttpError(e) if e.is_status() => {
                "The portal rejected a request; check the credentials and the facility id"
            }
            EtlError::HttpError(_) => "Check the network connection and portal.base_url",
            EtlError::UrlError(_) => "Check portal.base_url in the configuration file",
            EtlError::ParseError(_) => {
                "The portal markup changed or the login failed; open the portal in a browser to compare"
            }
            EtlError::CsvError(_) | EtlError::IoError(_) => {
                "Check that load.output_path exists and is writable"
            }
            EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => {
                "Fix the configuration file or export the referenced environment variables"
            }
            EtlError::ValidationError { .. } => {
                "Dates must be YYYY-MM-DD with start <= end and a facility id is required"
            }
            EtlError::AlreadyRunning => "Wait for the running report to finish",
            EtlError::WorkerFailed { .. } => "Run again with --verbose and inspect the log",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::HttpError(_) | EtlError::UrlError(_) => {
                format!("Could not reach the clinic portal ({})", self)
            }
            EtlError::ParseError(_) => format!("Could not read the portal pages ({})", self),
            EtlError::CsvError(_) | EtlError::IoError(_) => {
                format!("Could not write the report file ({})", self)
            }
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
