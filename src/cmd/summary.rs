//! Summary command - period totals and business use ratio

use super::{load_and_aggregate, PeriodArgs};
use crate::domain::{Aggregation, BusinessUseRatio};
use crate::format::{format_km, plain};
use crate::source::VehicleLog;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct SummaryCommand {
    /// JSON or CSV driving log ("-" reads JSON from stdin)
    #[arg(short, long)]
    log: PathBuf,

    #[command(flatten)]
    period: PeriodArgs,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

/// Summary data for JSON output
#[derive(Debug, Serialize)]
struct SummaryData {
    vehicle_number: String,
    tax_period: String,
    record_count: usize,
    excluded_count: usize,
    total_period_distance: String,
    total_business_distance: String,
    total_commute_distance: String,
    total_general_distance: String,
    business_use_ratio: BusinessUseRatio,
}

impl SummaryCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let (log, aggregation) = load_and_aggregate(&self.log, &self.period)?;

        if self.json {
            let data = summary_data(&log, &aggregation);
            println!("{}", serde_json::to_string_pretty(&data)?);
        } else {
            print_summary(&log, &aggregation);
        }
        Ok(())
    }
}

fn summary_data(log: &VehicleLog, aggregation: &Aggregation) -> SummaryData {
    let summary = &aggregation.summary;
    SummaryData {
        vehicle_number: log.vehicle.number.clone(),
        tax_period: aggregation.period.to_string(),
        record_count: aggregation.rows.len(),
        excluded_count: aggregation.excluded_count,
        total_period_distance: plain(summary.total_period_distance),
        total_business_distance: plain(summary.total_business_distance),
        total_commute_distance: plain(summary.total_commute_distance),
        total_general_distance: plain(summary.total_general_distance),
        business_use_ratio: summary.business_use_ratio,
    }
}

fn print_summary(log: &VehicleLog, aggregation: &Aggregation) {
    let summary = &aggregation.summary;

    println!();
    println!("DRIVING SUMMARY ({}) {}", log.vehicle.number, aggregation.period);
    println!();
    println!(
        "  Records: {} | Excluded: {}",
        aggregation.rows.len(),
        aggregation.excluded_count
    );
    println!(
        "  Total: {} | Commute: {} | General: {}",
        format_km(summary.total_period_distance),
        format_km(summary.total_commute_distance),
        format_km(summary.total_general_distance)
    );
    println!(
        "  Business Use: {} | Ratio: {}",
        format_km(summary.total_business_distance),
        summary.business_use_ratio
    );
    println!();
}
