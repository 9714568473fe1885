use crate::domain::model::{DayBuckets, Totals};
use crate::utils::error::{EtlError, Result};
use chrono::{NaiveDate, NaiveDateTime};

pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub const COLUMNS: [&str; 7] = [
    "Date",
    "Physician",
    "Specialty",
    "Work Hours",
    "Slot Count",
    "Attended Count",
    "Efficiency%",
];

const BLANK_ROW: [&str; 7] = ["", "", "", "", "", "", ""];

#[derive(Debug, Clone)]
pub struct ReportMeta<'a> {
    pub title: &'a str,
    pub generated_at: NaiveDateTime,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub facility_id: &'a str,
}

pub fn format_percentage(value: f64) -> String {
    format!("{:.2}%", value)
}

/// `<prefix>_20260109.csv` for one day, `<prefix>_20260109_to_20260110.csv` for a range.
pub fn report_filename(prefix: &str, start: NaiveDate, end: NaiveDate) -> String {
    if start == end {
        format!("{}_{}.csv", prefix, start.format("%Y%m%d"))
    } else {
        format!(
            "{}_{}_to_{}.csv",
            prefix,
            start.format("%Y%m%d"),
            end.format("%Y%m%d")
        )
    }
}

fn totals_row(first: &str, second: &str, totals: &Totals) -> Vec<String> {
    vec![
        first.to_string(),
        second.to_string(),
        String::new(),
        String::new(),
        totals.slots.to_string(),
        totals.attended.to_string(),
        format_percentage(totals.efficiency()),
    ]
}

/// Renders the semicolon-delimited report, BOM included.
pub fn render_csv(buckets: &DayBuckets, meta: &ReportMeta) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_writer(UTF8_BOM.to_vec());

    writer.write_record(["Report Title", meta.title])?;
    writer.write_record([
        "Generated At".to_string(),
        meta.generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
    ])?;
    writer.write_record(["Period".to_string(), format!("{} to {}", meta.start, meta.end)])?;
    writer.write_record(["Facility", meta.facility_id])?;
    writer.write_record(BLANK_ROW)?;
    writer.write_record(COLUMNS)?;

    let mut grand_total = Totals::default();
    for (day, records) in buckets.iter() {
        let mut day_total = Totals::default();
        for record in records {
            writer.write_record([
                record.date.clone(),
                record.physician.clone(),
                record.specialty.clone(),
                record.work_hours.clone(),
                record.slot_count.to_string(),
                record.attended_count.to_string(),
                format_percentage(record.efficiency()),
            ])?;
            day_total.add(record);
        }
        writer.write_record(totals_row(day, "Subtotal", &day_total))?;
        writer.write_record(BLANK_ROW)?;

        grand_total.slots += day_total.slots;
        grand_total.attended += day_total.attended;
    }

    writer.write_record(totals_row("Grand Total", "", &grand_total))?;

    writer
        .into_inner()
        .map_err(|e| EtlError::IoError(e.into_error()))
}
