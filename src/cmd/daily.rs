//! Daily command - distances per usage date

use super::{load_and_aggregate, PeriodArgs};
use crate::domain::{daily_totals, DailyTotal};
use crate::format::{format_km, plain};
use clap::Args;
use serde::Serialize;
use std::{io, path::PathBuf};
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct DailyCommand {
    /// JSON or CSV driving log ("-" reads JSON from stdin)
    #[arg(short, long)]
    log: PathBuf,

    #[command(flatten)]
    period: PeriodArgs,

    /// Output as CSV instead of a formatted table
    #[arg(long)]
    csv: bool,
}

#[derive(Debug, Tabled, Serialize)]
struct DailyRow {
    #[tabled(rename = "Date")]
    date: String,

    #[tabled(rename = "Trips")]
    trips: usize,

    #[tabled(rename = "Distance")]
    total_driving: String,

    #[tabled(rename = "Commute")]
    commute_distance: String,

    #[tabled(rename = "General Business")]
    general_distance: String,
}

impl DailyRow {
    fn new(day: &DailyTotal, fmt: fn(rust_decimal::Decimal) -> String) -> Self {
        DailyRow {
            date: day.date.format("%Y-%m-%d").to_string(),
            trips: day.trips,
            total_driving: fmt(day.total_driving),
            commute_distance: fmt(day.commute_distance),
            general_distance: fmt(day.general_distance),
        }
    }
}

impl DailyCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let (_, aggregation) = load_and_aggregate(&self.log, &self.period)?;
        let days = daily_totals(&aggregation.rows);

        if self.csv {
            let mut wtr = csv::Writer::from_writer(io::stdout());
            for day in &days {
                wtr.serialize(DailyRow::new(day, plain))?;
            }
            wtr.flush()?;
            return Ok(());
        }

        if days.is_empty() {
            println!("No driving records in this period");
            return Ok(());
        }

        let rows: Vec<_> = days.iter().map(|d| DailyRow::new(d, format_km)).collect();
        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
        Ok(())
    }
}
