//! Business vehicle driving log in the fixed report layout: spreadsheet (CSV) and HTML

use crate::domain::{Aggregation, ClassifiedRow};
use crate::format::{format_km, plain};
use crate::source::{Business, Vehicle};
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;
use tabled::Tabled;

pub const REPORT_TITLE: &str = "Business Vehicle Driving Log";

/// Everything needed to render one vehicle's report
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    pub vehicle: &'a Vehicle,
    pub business: Option<&'a Business>,
    pub aggregation: &'a Aggregation,
}

/// One rendered line of the driving table
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct ReportRow {
    #[tabled(rename = "Date")]
    pub date: String,

    #[tabled(rename = "Department")]
    pub department: String,

    #[tabled(rename = "Name")]
    pub name: String,

    #[tabled(rename = "Odometer Before")]
    pub odometer_before: String,

    #[tabled(rename = "Odometer After")]
    pub odometer_after: String,

    #[tabled(rename = "Distance")]
    pub total_driving: String,

    #[tabled(rename = "Commute")]
    pub commute_distance: String,

    #[tabled(rename = "General Business")]
    pub general_distance: String,

    #[tabled(rename = "Notes")]
    pub notes: String,
}

impl ReportRow {
    /// Distances formatted for people (`1,150km`)
    pub fn display(row: &ClassifiedRow) -> Self {
        Self::with_format(row, format_km)
    }

    /// Distances as plain numbers for spreadsheets
    pub fn plain(row: &ClassifiedRow) -> Self {
        Self::with_format(row, plain)
    }

    fn with_format(row: &ClassifiedRow, fmt: fn(Decimal) -> String) -> Self {
        ReportRow {
            date: row.usage_date.format("%Y-%m-%d").to_string(),
            department: row.owner.department.clone(),
            name: row.owner.driver.clone(),
            odometer_before: fmt(row.odometer_before),
            odometer_after: fmt(row.odometer_after),
            total_driving: fmt(row.total_driving),
            commute_distance: fmt(row.commute_distance),
            general_distance: fmt(row.general_distance),
            notes: row.notes.clone(),
        }
    }
}

const ROW_HEADERS: [&str; 9] = [
    "Date",
    "Department",
    "Name",
    "Odometer Before (km)",
    "Odometer After (km)",
    "Distance (km)",
    "Commute (km)",
    "General Business (km)",
    "Notes",
];

/// Write the report as a spreadsheet-friendly CSV, section by section
pub fn write_csv<W: Write>(report: &Report, writer: W) -> anyhow::Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_writer(writer);
    let summary = &report.aggregation.summary;

    wtr.write_record([REPORT_TITLE])?;
    wtr.write_record([
        "Vehicle Number",
        report.vehicle.number.as_str(),
        "Vehicle Model",
        report.vehicle.model.as_deref().unwrap_or(""),
    ])?;
    wtr.write_record(["Tax Period".to_string(), report.aggregation.period.to_string()])?;
    if let Some(business) = report.business {
        wtr.write_record([
            "Business Name",
            business.name.as_str(),
            "Registration Number",
            business.registration_number.as_str(),
        ])?;
    }

    wtr.write_record(ROW_HEADERS)?;
    for row in &report.aggregation.rows {
        wtr.serialize(ReportRow::plain(row))?;
    }

    wtr.write_record([
        "Total Period Distance (km)".to_string(),
        plain(summary.total_period_distance),
        "Business Use Distance (km)".to_string(),
        plain(summary.total_business_distance),
        "Business Use Ratio".to_string(),
        summary.business_use_ratio.to_string(),
    ])?;

    wtr.flush()?;
    Ok(())
}

/// Render the report as a self-contained HTML page
pub fn render_html(report: &Report) -> String {
    let summary = &report.aggregation.summary;

    let business = match report.business {
        Some(b) => format!(
            "<tr><th>Business Name</th><td>{}</td><th>Registration Number</th><td>{}</td></tr>",
            escape(&b.name),
            escape(&b.registration_number)
        ),
        None => String::new(),
    };

    let header_cells: String = ROW_HEADERS
        .iter()
        .map(|h| format!("<th>{}</th>", h))
        .collect();

    let body_rows: String = report
        .aggregation
        .rows
        .iter()
        .map(|row| {
            let r = ReportRow::display(row);
            let cells = [
                r.date,
                r.department,
                r.name,
                r.odometer_before,
                r.odometer_after,
                r.total_driving,
                r.commute_distance,
                r.general_distance,
                r.notes,
            ];
            let tds: String = cells.iter().map(|c| format!("<td>{}</td>", escape(c))).collect();
            format!("<tr>{}</tr>\n", tds)
        })
        .collect();

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{title} - {vehicle}</title>
    <style>
        body {{ font-family: sans-serif; margin: 2rem; color: #222222; }}
        table {{ border-collapse: collapse; width: 100%; margin-bottom: 1rem; }}
        th, td {{ border: 1px solid #cccccc; padding: 0.4rem 0.6rem; text-align: center; }}
        th {{ background: #f4f4f4; }}
    </style>
</head>
<body>
    <h1>{title}</h1>
    <table>
        <tr><th>Vehicle Number</th><td>{vehicle}</td><th>Vehicle Model</th><td>{model}</td></tr>
        <tr><th>Tax Period</th><td colspan="3">{period}</td></tr>
        {business}
    </table>
    <table>
        <tr>{header_cells}</tr>
{body_rows}    </table>
    <table>
        <tr>
            <th>Total Period Distance</th><td>{total}</td>
            <th>Business Use Distance</th><td>{business_distance}</td>
            <th>Business Use Ratio</th><td>{ratio}</td>
        </tr>
    </table>
</body>
</html>
"##,
        title = REPORT_TITLE,
        vehicle = escape(&report.vehicle.number),
        model = escape(report.vehicle.model.as_deref().unwrap_or("")),
        period = report.aggregation.period,
        business = business,
        header_cells = header_cells,
        body_rows = body_rows,
        total = format_km(summary.total_period_distance),
        business_distance = format_km(summary.total_business_distance),
        ratio = summary.business_use_ratio,
    )
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
