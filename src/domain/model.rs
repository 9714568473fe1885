use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

pub const UNKNOWN_PHYSICIAN: &str = "Unknown";
pub const NOT_AVAILABLE: &str = "N/A";

/// Percentage of booked slots that were attended, 0 when nothing was booked.
pub fn efficiency(slots: u64, attended: u64) -> f64 {
    if slots == 0 {
        0.0
    } else {
        attended as f64 / slots as f64 * 100.0
    }
}

/// One results-table row of a physician's detail page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub date: String,
    pub physician: String,
    pub specialty: String,
    pub work_hours: String,
    pub slot_count: u32,
    pub attended_count: u32,
}

impl AttendanceRecord {
    pub fn efficiency(&self) -> f64 {
        efficiency(self.slot_count as u64, self.attended_count as u64)
    }
}

/// A row as read from the markup, before it is assigned to a day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    pub date_label: Option<String>,
    pub work_hours: String,
    pub slot_count: u32,
    pub attended_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicianLink {
    pub url: String,
    pub first_seen: NaiveDate,
}

/// Detail-page links in discovery order, each URL kept once.
#[derive(Debug, Default, Clone)]
pub struct LinkSet {
    seen: HashSet<String>,
    links: Vec<PhysicianLink>,
}

impl LinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the URL was already known.
    pub fn insert(&mut self, url: String, day: NaiveDate) -> bool {
        if !self.seen.insert(url.clone()) {
            return false;
        }
        self.links.push(PhysicianLink {
            url,
            first_seen: day,
        });
        true
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PhysicianLink> {
        self.links.iter()
    }

    pub fn into_links(self) -> Vec<PhysicianLink> {
        self.links
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicianPage {
    pub url: String,
    pub first_seen: NaiveDate,
    pub name: String,
    pub specialty: String,
    pub rows: Vec<ParsedRow>,
    pub skipped_rows: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionFilters {
    pub physicians: Vec<String>,
    pub specialties: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionField {
    Physician,
    Specialty,
}

impl std::fmt::Display for ExclusionField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExclusionField::Physician => write!(f, "physician"),
            ExclusionField::Specialty => write!(f, "specialty"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionHit {
    pub field: ExclusionField,
    pub term: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub slots: u64,
    pub attended: u64,
}

impl Totals {
    pub fn add(&mut self, record: &AttendanceRecord) {
        self.slots += record.slot_count as u64;
        self.attended += record.attended_count as u64;
    }

    pub fn efficiency(&self) -> f64 {
        efficiency(self.slots, self.attended)
    }
}

/// Records grouped by normalized date key; iteration is in ascending key order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayBuckets {
    days: BTreeMap<String, Vec<AttendanceRecord>>,
}

impl DayBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: AttendanceRecord) {
        self.days
            .entry(record.date.clone())
            .or_default()
            .push(record);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<AttendanceRecord>)> {
        self.days.iter()
    }

    pub fn get(&self, day: &str) -> Option<&[AttendanceRecord]> {
        self.days.get(day).map(Vec::as_slice)
    }

    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    pub fn record_count(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn totals(&self) -> Totals {
        let mut totals = Totals::default();
        for record in self.days.values().flatten() {
            totals.add(record);
        }
        totals
    }
}

/// Operator parameters for one report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub facility_id: String,
    pub filters: ExclusionFilters,
}

impl ReportRequest {
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |day| *day <= self.end)
    }

    pub fn is_single_day(&self) -> bool {
        self.start == self.end
    }
}

/// Output of the transform step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportData {
    pub buckets: DayBuckets,
    pub totals: Totals,
    pub links_found: usize,
    pub physicians_included: usize,
    pub physicians_excluded: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub output_path: Option<String>,
    pub links_found: usize,
    pub physicians_included: usize,
    pub physicians_excluded: usize,
    pub records: usize,
    pub totals: Totals,
}

impl RunSummary {
    pub fn efficiency(&self) -> f64 {
        self.totals.efficiency()
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.output_path {
            Some(path) => writeln!(f, "Report saved to: {}", path)?,
            None => writeln!(f, "No physicians found in the period, no report written")?,
        }
        writeln!(
            f,
            "Physicians: {} found, {} included, {} excluded",
            self.links_found, self.physicians_included, self.physicians_excluded
        )?;
        writeln!(
            f,
            "Rows: {} | Slots: {} | Attended: {}",
            self.records, self.totals.slots, self.totals.attended
        )?;
        write!(f, "Overall efficiency: {:.2}%", self.efficiency())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, slots: u32, attended: u32) -> AttendanceRecord {
        AttendanceRecord {
            date: date.to_string(),
            physician: "Dr. Test".to_string(),
            specialty: "Clinic".to_string(),
            work_hours: "08:00 - 12:00".to_string(),
            slot_count: slots,
            attended_count: attended,
        }
    }

    #[test]
    fn test_efficiency_zero_slots() {
        assert_eq!(efficiency(0, 0), 0.0);
        assert_eq!(efficiency(0, 5), 0.0);
        assert_eq!(record("2026-01-09", 0, 3).efficiency(), 0.0);
        assert_eq!(format!("{:.2}%", efficiency(0, 3)), "0.00%");
    }

    #[test]
    fn test_efficiency_ratio() {
        assert_eq!(efficiency(10, 8), 80.0);
        assert_eq!(format!("{:.2}%", efficiency(3, 1)), "33.33%");
    }

    #[test]
    fn test_link_set_deduplicates_and_keeps_first_day() {
        let day1 = NaiveDate::from_ymd_opt(2026, 1, 9).unwrap();
        let day2 = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
        let mut links = LinkSet::new();

        assert!(links.insert("https://portal/a".to_string(), day1));
        assert!(links.insert("https://portal/b".to_string(), day1));
        assert!(!links.insert("https://portal/a".to_string(), day2));

        let links = links.into_links();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].url, "https://portal/a");
        assert_eq!(links[0].first_seen, day1);
    }

    #[test]
    fn test_day_buckets_sorted_and_totals() {
        let mut buckets = DayBuckets::new();
        buckets.push(record("2026-01-10", 4, 2));
        buckets.push(record("2026-01-09", 10, 8));
        buckets.push(record("2026-01-09", 5, 5));

        let keys: Vec<&String> = buckets.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["2026-01-09", "2026-01-10"]);
        assert_eq!(buckets.get("2026-01-09").unwrap().len(), 2);
        assert_eq!(buckets.record_count(), 3);
        assert_eq!(
            buckets.totals(),
            Totals {
                slots: 19,
                attended: 15
            }
        );
    }

    #[test]
    fn test_request_days_inclusive() {
        let request = ReportRequest {
            start: NaiveDate::from_ymd_opt(2026, 1, 30).unwrap(),
            end: NaiveDate::from_ymd_opt(2026, 2, 2).unwrap(),
            facility_id: "1".to_string(),
            filters: ExclusionFilters::default(),
        };
        let days: Vec<String> = request.days().map(|d| d.to_string()).collect();
        assert_eq!(
            days,
            vec!["2026-01-30", "2026-01-31", "2026-02-01", "2026-02-02"]
        );
        assert!(!request.is_single_day());
    }
}
