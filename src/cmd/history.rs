//! History command - fleet-wide usage list, one line per vehicle

use super::{aggregate_log, read_log, PeriodArgs};
use crate::domain::{vehicle_history, VehicleHistory};
use crate::format::format_km;
use clap::Args;
use std::path::PathBuf;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct HistoryCommand {
    /// Driving logs, one per vehicle
    #[arg(required = true)]
    logs: Vec<PathBuf>,

    #[command(flatten)]
    period: PeriodArgs,

    /// Only show vehicles whose number contains this text
    #[arg(short, long)]
    search: Option<String>,

    /// Output as JSON instead of a formatted table
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Tabled)]
struct HistoryRow {
    #[tabled(rename = "Vehicle")]
    vehicle: String,

    #[tabled(rename = "Department")]
    department: String,

    #[tabled(rename = "Driver")]
    driver: String,

    #[tabled(rename = "Driving Days")]
    driving_days: usize,

    #[tabled(rename = "Avg Distance")]
    average: String,

    #[tabled(rename = "Total Distance")]
    total: String,

    #[tabled(rename = "Business Use")]
    ratio: String,
}

impl From<&VehicleHistory> for HistoryRow {
    fn from(h: &VehicleHistory) -> Self {
        HistoryRow {
            vehicle: h.vehicle_number.clone(),
            department: h.department.clone().unwrap_or_else(|| "-".to_string()),
            driver: h.driver.clone().unwrap_or_else(|| "-".to_string()),
            driving_days: h.driving_days,
            average: format_km(h.average_driving_distance),
            total: format_km(h.total_driving_distance),
            ratio: h.business_use_ratio.to_string(),
        }
    }
}

impl HistoryCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let mut histories = Vec::with_capacity(self.logs.len());
        for path in &self.logs {
            let log = read_log(path)?;
            if !matches_search(&log.vehicle.number, self.search.as_deref()) {
                log::debug!("skipping {}: does not match search", log.vehicle.number);
                continue;
            }
            let aggregation = aggregate_log(&log, &self.period)?;
            histories.push(vehicle_history(&log.vehicle.number, &aggregation));
        }

        if self.json {
            println!("{}", serde_json::to_string_pretty(&histories)?);
            return Ok(());
        }

        if histories.is_empty() {
            println!("No vehicles found matching filters");
            return Ok(());
        }

        let rows: Vec<HistoryRow> = histories.iter().map(HistoryRow::from).collect();
        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(3..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
        Ok(())
    }
}

fn matches_search(vehicle_number: &str, search: Option<&str>) -> bool {
    match search {
        Some(needle) => {
            let strip = |s: &str| s.chars().filter(|c| !c.is_whitespace()).collect::<String>();
            strip(vehicle_number).to_lowercase().contains(&strip(needle).to_lowercase())
        }
        None => true,
    }
}
