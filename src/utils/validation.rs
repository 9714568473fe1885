use crate::utils::error::{EtlError, Result};
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// `${VAR}` reference to an environment variable inside a config value.
pub static ENV_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("invalid regex: env placeholder"));

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(EtlError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

/// Rejects blank values and `${VAR}` placeholders left behind by env substitution.
pub fn validate_secret(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EtlError::MissingConfigError {
            field: field_name.to_string(),
        });
    }
    if let Some(caps) = ENV_PLACEHOLDER.captures(value) {
        return Err(EtlError::ConfigValidationError {
            field: field_name.to_string(),
            message: format!("environment variable {} is not set", &caps[1]),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EtlError::validation(format!("{} is required", field_name)));
    }
    Ok(())
}

pub fn parse_date(field_name: &str, value: &str) -> Result<NaiveDate> {
    let value = value.trim();
    validate_non_empty_string(field_name, value)?;
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        EtlError::validation(format!(
            "{} '{}' is not a valid date, expected YYYY-MM-DD",
            field_name, value
        ))
    })
}

pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if start > end {
        return Err(EtlError::validation(format!(
            "start date ({}) cannot be after end date ({})",
            start, end
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("portal.base_url", "https://example.com").is_ok());
        assert!(validate_url("portal.base_url", "http://example.com").is_ok());
        assert!(validate_url("portal.base_url", "").is_err());
        assert!(validate_url("portal.base_url", "invalid-url").is_err());
        assert!(validate_url("portal.base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_secret() {
        assert!(validate_secret("portal.login", "operator").is_ok());
        assert!(matches!(
            validate_secret("portal.login", "  "),
            Err(EtlError::MissingConfigError { .. })
        ));
        let err = validate_secret("portal.password", "${PORTAL_PASSWORD}").unwrap_err();
        assert!(err.to_string().contains("PORTAL_PASSWORD"));

        let err = validate_secret("portal.password", "abc${PORTAL_SUFFIX}").unwrap_err();
        assert!(matches!(err, EtlError::ConfigValidationError { .. }));
        assert!(err.to_string().contains("PORTAL_SUFFIX"));
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("start date", " 2026-01-09 ").unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 9).unwrap()
        );
        assert!(parse_date("start date", "").is_err());
        assert!(parse_date("start date", "09/01/2026").is_err());
    }

    #[test]
    fn test_validate_date_range() {
        let a = NaiveDate::from_ymd_opt(2026, 1, 9).unwrap();
        let b = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
        assert!(validate_date_range(a, a).is_ok());
        assert!(validate_date_range(a, b).is_ok());
        assert!(validate_date_range(b, a).is_err());
    }
}
