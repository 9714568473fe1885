use crate::domain::model::{
    AttendanceRecord, ExclusionField, ExclusionFilters, ExclusionHit, ParsedRow, PhysicianPage,
    ReportRequest,
};
use crate::utils::error::Result;
use crate::utils::validation::{
    parse_date, validate_date_range, validate_non_empty_string, Validate,
};
use chrono::NaiveDate;

// Two-digit years are tried first so "09/01/26" is not read as year 26.
const DATE_LABEL_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%y", "%d/%m/%Y"];

fn split_terms(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect()
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl ExclusionFilters {
    /// Builds filters from the comma-separated lists typed by the operator.
    pub fn from_lists(physicians: &str, specialties: &str) -> Self {
        Self {
            physicians: split_terms(physicians),
            specialties: split_terms(specialties),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.physicians.is_empty() && self.specialties.is_empty()
    }

    /// First term that matches the physician, names before specialties.
    pub fn matching_term(&self, physician: &str, specialty: &str) -> Option<ExclusionHit> {
        let by_name = self
            .physicians
            .iter()
            .find(|term| contains_ignore_case(physician, term))
            .map(|term| ExclusionHit {
                field: ExclusionField::Physician,
                term: term.clone(),
            });

        by_name.or_else(|| {
            self.specialties
                .iter()
                .find(|term| contains_ignore_case(specialty, term))
                .map(|term| ExclusionHit {
                    field: ExclusionField::Specialty,
                    term: term.clone(),
                })
        })
    }
}

/// Normalizes a row date label so that keys sort chronologically.
pub fn day_key(label: Option<&str>, fallback: NaiveDate) -> String {
    let label = match label.map(str::trim) {
        Some(label) if !label.is_empty() => label,
        _ => return fallback.format("%Y-%m-%d").to_string(),
    };

    DATE_LABEL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(label, fmt).ok())
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| label.to_string())
}

pub fn to_record(page: &PhysicianPage, row: &ParsedRow) -> AttendanceRecord {
    AttendanceRecord {
        date: day_key(row.date_label.as_deref(), page.first_seen),
        physician: page.name.clone(),
        specialty: page.specialty.clone(),
        work_hours: row.work_hours.clone(),
        slot_count: row.slot_count,
        attended_count: row.attended_count,
    }
}

impl ReportRequest {
    /// Parses the raw operator input; every field except the filters is required.
    pub fn from_inputs(
        start: &str,
        end: &str,
        facility_id: &str,
        excluded_physicians: &str,
        excluded_specialties: &str,
    ) -> Result<Self> {
        let request = Self {
            start: parse_date("start date", start)?,
            end: parse_date("end date", end)?,
            facility_id: facility_id.trim().to_string(),
            filters: ExclusionFilters::from_lists(excluded_physicians, excluded_specialties),
        };
        request.validate()?;
        Ok(request)
    }
}

impl Validate for ReportRequest {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("facility id", &self.facility_id)?;
        validate_date_range(self.start, self.end)
    }
}
