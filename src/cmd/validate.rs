//! Validate command - surface invalid records and disagreements with server totals

use super::{read_log, PeriodArgs};
use crate::domain::{aggregate, classify, reconcile, TaxPeriod};
use crate::source::VehicleLog;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ValidateCommand {
    /// JSON or CSV driving log ("-" reads JSON from stdin)
    #[arg(short, long)]
    log: PathBuf,

    #[command(flatten)]
    period: PeriodArgs,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

/// A validation issue for output
#[derive(Debug, Clone, Serialize)]
struct ValidationIssue {
    #[serde(rename = "type")]
    issue_type: &'static str,
    record: Option<String>,
    message: String,
}

/// JSON output structure
#[derive(Debug, Serialize)]
struct ValidationOutput {
    vehicle_number: String,
    tax_period: String,
    excluded_count: usize,
    issue_count: usize,
    issues: Vec<ValidationIssue>,
}

impl ValidateCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let log = read_log(&self.log)?;
        let period = self.period.resolve(log.declared_period)?;
        let (issues, excluded_count) = collect_issues(&log, &period);

        if self.json {
            let output = ValidationOutput {
                vehicle_number: log.vehicle.number.clone(),
                tax_period: period.to_string(),
                excluded_count,
                issue_count: issues.len(),
                issues: issues.to_vec(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            print_text(&log, &period, &issues, excluded_count);
        }

        // Exit with code 1 if issues found
        if !issues.is_empty() {
            std::process::exit(1);
        }
        Ok(())
    }
}

fn collect_issues(log: &VehicleLog, period: &TaxPeriod) -> (Vec<ValidationIssue>, usize) {
    let mut issues = Vec::new();
    let mut excluded_count = 0;

    for record in &log.records {
        if !period.contains(record.usage_date) {
            excluded_count += 1;
            continue;
        }
        if let Err(err) = classify(record) {
            issues.push(ValidationIssue {
                issue_type: "InvalidRecord",
                record: Some(record.id.to_string()),
                message: err.to_string(),
            });
        }
    }

    // Totals are only meaningful once every record is valid
    if issues.is_empty() {
        match aggregate(&log.records, period) {
            Ok(aggregation) => {
                for d in reconcile(&aggregation.summary, &log.reported) {
                    issues.push(ValidationIssue {
                        issue_type: "Mismatch",
                        record: None,
                        message: format!(
                            "{} reported as {} but records add up to {}",
                            d.field, d.reported, d.computed
                        ),
                    });
                }
            }
            Err(err) => issues.push(ValidationIssue {
                issue_type: "Totals",
                record: None,
                message: err.to_string(),
            }),
        }
    }

    (issues, excluded_count)
}

fn print_text(log: &VehicleLog, period: &TaxPeriod, issues: &[ValidationIssue], excluded_count: usize) {
    println!();
    println!("VALIDATION RESULTS ({}, {})", log.vehicle.number, period);
    println!();

    if excluded_count > 0 {
        println!("  {} record(s) outside the tax period skipped", excluded_count);
        println!();
    }

    if issues.is_empty() {
        println!("\u{2713} No issues found.");
        return;
    }

    println!("\u{26A0} {} issue(s) found:", issues.len());
    println!();
    for (i, issue) in issues.iter().enumerate() {
        match &issue.record {
            Some(record) => println!("  {}. [{}] record {}", i + 1, issue.issue_type, record),
            None => println!("  {}. [{}]", i + 1, issue.issue_type),
        }
        println!("     {}", issue.message);
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DrivingRecord, OwnerRef, RecordId, ReportedFigures, UsePurpose};
    use crate::source::Vehicle;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn record(id: &str, day: u32, before: Decimal, after: Decimal, declared: Decimal) -> DrivingRecord {
        DrivingRecord {
            id: RecordId(id.to_string()),
            usage_date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            odometer_before: before,
            odometer_after: after,
            use_purpose: UsePurpose::General,
            declared_business_distance: declared,
            notes: String::new(),
            owner: OwnerRef::default(),
        }
    }

    fn log(records: Vec<DrivingRecord>, reported: ReportedFigures) -> VehicleLog {
        VehicleLog {
            vehicle: Vehicle {
                number: "12G 3456".to_string(),
                model: None,
            },
            business: None,
            declared_period: None,
            reported,
            records,
        }
    }

    fn january() -> TaxPeriod {
        TaxPeriod::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn every_invalid_record_listed() {
        let log = log(
            vec![
                record("1", 2, dec!(500), dec!(480), dec!(0)),
                record("2", 3, dec!(0), dec!(10), dec!(10)),
                record("3", 4, dec!(0), dec!(150), dec!(200)),
            ],
            ReportedFigures::default(),
        );
        let (issues, excluded) = collect_issues(&log, &january());
        assert_eq!(excluded, 0);
        let ids: Vec<_> = issues.iter().filter_map(|i| i.record.clone()).collect();
        assert_eq!(ids, vec!["1".to_string(), "3".to_string()]);
    }

    #[test]
    fn mismatched_server_totals_listed() {
        let log = log(
            vec![record("1", 2, dec!(0), dec!(100), dec!(50))],
            ReportedFigures {
                tax_period_distance: Some(dec!(100)),
                tax_period_business_distance: Some(dec!(60)),
                business_use_ratio: Some(60),
            },
        );
        let (issues, _) = collect_issues(&log, &january());
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.issue_type == "Mismatch"));
    }

    #[test]
    fn overflowing_totals_listed() {
        let half = Decimal::MAX / dec!(2) + dec!(1);
        let log = log(
            vec![
                record("1", 2, dec!(0), half, dec!(0)),
                record("2", 3, dec!(0), half, dec!(0)),
            ],
            ReportedFigures::default(),
        );
        let (issues, _) = collect_issues(&log, &january());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].issue_type, "Totals");
        assert!(issues[0].record.is_none());
    }

    #[test]
    fn out_of_period_records_not_checked() {
        let log = log(
            vec![
                record("1", 2, dec!(0), dec!(100), dec!(50)),
                record("2", 1, dec!(0), dec!(0), dec!(0)),
            ],
            ReportedFigures {
                business_use_ratio: Some(50),
                ..Default::default()
            },
        );
        let mut log = log;
        log.records.push(record("late", 31, dec!(9), dec!(1), dec!(0)));
        let period = TaxPeriod::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 30).unwrap(),
        )
        .unwrap();
        let (issues, excluded) = collect_issues(&log, &period);
        assert!(issues.is_empty());
        assert_eq!(excluded, 1);
    }
}
