//! Applicant report exports.
//!
//! CSV is rendered in creation order with a fixed column set. PDF export
//! is not available on the server and is answered with a 501.

use chrono::NaiveDateTime;

pub const CSV_FILENAME: &str = "applicants_report.csv";
pub const CSV_COLUMNS: [&str; 4] = ["Name", "Email", "Status", "Date Applied"];
pub const PDF_UNSUPPORTED: &str = "PDF generation not yet implemented on the server.";

#[derive(Debug, Clone)]
pub struct ReportRow {
    pub name: String,
    pub email: Option<String>,
    pub status: String,
    pub created_at: NaiveDateTime,
}

/// Renders rows as CSV with a header line, preserving the input order.
pub fn render_csv(rows: &[ReportRow]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_COLUMNS)?;
    for row in rows {
        let applied = row.created_at.format("%Y-%m-%d").to_string();
        writer.write_record([
            row.name.as_str(),
            row.email.as_deref().unwrap_or(""),
            row.status.as_str(),
            applied.as_str(),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))
}
