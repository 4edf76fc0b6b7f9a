pub mod daily;
pub mod export;
pub mod history;
pub mod report;
pub mod schema;
pub mod summary;
pub mod validate;

use crate::domain::{aggregate, Aggregation, TaxPeriod};
use crate::source::{self, VehicleLog};
use anyhow::Context;
use chrono::NaiveDate;
use clap::Args;
use std::path::Path;

/// Tax period selection shared by the reporting commands
#[derive(Args, Debug, Clone)]
pub struct PeriodArgs {
    /// Tax year (1 January to 31 December)
    #[arg(short, long, conflicts_with_all = ["from", "to"])]
    year: Option<i32>,

    /// First day of the tax period (YYYY-MM-DD)
    #[arg(long, requires = "to")]
    from: Option<NaiveDate>,

    /// Last day of the tax period (YYYY-MM-DD)
    #[arg(long, requires = "from")]
    to: Option<NaiveDate>,
}

impl PeriodArgs {
    /// Period from the command line, falling back to the one declared by the log
    pub fn resolve(&self, declared: Option<TaxPeriod>) -> anyhow::Result<TaxPeriod> {
        if let Some(year) = self.year {
            return Ok(TaxPeriod::year(year)?);
        }
        if let (Some(from), Some(to)) = (self.from, self.to) {
            return Ok(TaxPeriod::new(from, to)?);
        }
        declared.context("no tax period: the log declares none, pass --year or --from/--to")
    }
}

/// Load a driving log (JSON, CSV or "-" for JSON on stdin)
pub fn read_log(path: &Path) -> anyhow::Result<VehicleLog> {
    source::read_log(path).with_context(|| format!("failed to load {}", path.display()))
}

/// Load a log and aggregate it over the selected period
pub fn load_and_aggregate(path: &Path, period: &PeriodArgs) -> anyhow::Result<(VehicleLog, Aggregation)> {
    let log = read_log(path)?;
    let aggregation = aggregate_log(&log, period)?;
    Ok((log, aggregation))
}

/// Aggregate an already loaded log over the selected period
pub fn aggregate_log(log: &VehicleLog, period: &PeriodArgs) -> anyhow::Result<Aggregation> {
    let period = period.resolve(log.declared_period)?;
    log::info!("aggregating {} records for {} over {}", log.records.len(), log.vehicle.number, period);

    let aggregation = aggregate(&log.records, &period)
        .with_context(|| format!("cannot aggregate driving log for {}", log.vehicle.number))?;

    if aggregation.excluded_count > 0 {
        log::warn!(
            "{} record(s) outside {} were excluded",
            aggregation.excluded_count,
            period
        );
    }
    Ok(aggregation)
}
