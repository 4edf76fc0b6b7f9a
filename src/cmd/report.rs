//! Report command - the driving log table for one vehicle and tax period

use super::{load_and_aggregate, PeriodArgs};
use crate::domain::Aggregation;
use crate::export::{Report, ReportRow, REPORT_TITLE};
use crate::format::format_km;
use clap::Args;
use std::{io, path::PathBuf};
use tabled::{
    builder::Builder,
    settings::{object::Columns, Alignment, Modify, Style},
    Table,
};

#[derive(Args, Debug)]
pub struct ReportCommand {
    /// JSON or CSV driving log ("-" reads JSON from stdin)
    #[arg(short, long)]
    log: PathBuf,

    #[command(flatten)]
    period: PeriodArgs,

    /// Output rows as CSV instead of formatted tables
    #[arg(long)]
    csv: bool,
}

impl ReportCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let (log, aggregation) = load_and_aggregate(&self.log, &self.period)?;

        if self.csv {
            return self.write_csv(&aggregation);
        }

        let report = Report {
            vehicle: &log.vehicle,
            business: log.business.as_ref(),
            aggregation: &aggregation,
        };
        print_report(&report);
        Ok(())
    }

    fn write_csv(&self, aggregation: &Aggregation) -> anyhow::Result<()> {
        let mut wtr = csv::Writer::from_writer(io::stdout());
        for row in &aggregation.rows {
            wtr.serialize(ReportRow::plain(row))?;
        }
        wtr.flush()?;
        Ok(())
    }
}

fn print_report(report: &Report) {
    let aggregation = report.aggregation;
    let summary = &aggregation.summary;

    println!();
    println!("{}", REPORT_TITLE.to_uppercase());
    println!();

    let mut header = Builder::default();
    header.push_record(["Vehicle Number", report.vehicle.number.as_str()]);
    header.push_record(["Vehicle Model", report.vehicle.model.as_deref().unwrap_or("-")]);
    header.push_record(["Tax Period".to_string(), aggregation.period.to_string()]);
    if let Some(business) = report.business {
        header.push_record(["Business Name", business.name.as_str()]);
        header.push_record(["Registration Number", business.registration_number.as_str()]);
    }
    println!("{}", header.build().with(Style::rounded()));
    println!();

    if aggregation.rows.is_empty() {
        println!("No driving records in this period");
    } else {
        let rows: Vec<_> = aggregation.rows.iter().map(ReportRow::display).collect();
        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(3..8)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
    }
    println!();

    let mut totals = Builder::default();
    totals.push_record(["Total Period Distance".to_string(), format_km(summary.total_period_distance)]);
    totals.push_record(["  Commute".to_string(), format_km(summary.total_commute_distance)]);
    totals.push_record(["  General Business".to_string(), format_km(summary.total_general_distance)]);
    totals.push_record(["Business Use Distance".to_string(), format_km(summary.total_business_distance)]);
    totals.push_record(["Business Use Ratio".to_string(), summary.business_use_ratio.to_string()]);
    println!("{}", totals.build().with(Style::rounded()));

    if aggregation.excluded_count > 0 {
        println!();
        println!(
            "\u{26A0} {} record(s) outside the tax period were excluded",
            aggregation.excluded_count
        );
    }
}
