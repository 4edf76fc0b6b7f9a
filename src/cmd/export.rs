//! Export command - write the driving log report as a spreadsheet or HTML page

use super::{load_and_aggregate, PeriodArgs};
use crate::export::{render_html, write_csv, Report};
use anyhow::Context;
use clap::{Args, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ExportFormat {
    /// Spreadsheet layout as CSV
    #[default]
    Csv,
    /// Self-contained HTML page
    Html,
}

#[derive(Args, Debug)]
pub struct ExportCommand {
    /// JSON or CSV driving log ("-" reads JSON from stdin)
    #[arg(short, long)]
    log: PathBuf,

    #[command(flatten)]
    period: PeriodArgs,

    /// Export format
    #[arg(short, long, value_enum, default_value_t = ExportFormat::Csv)]
    format: ExportFormat,

    /// Output file (default: stdout for csv, opens in browser for html)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl ExportCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let (log, aggregation) = load_and_aggregate(&self.log, &self.period)?;
        let report = Report {
            vehicle: &log.vehicle,
            business: log.business.as_ref(),
            aggregation: &aggregation,
        };

        match self.format {
            ExportFormat::Csv => match self.output {
                Some(ref path) => {
                    let file = File::create(path)
                        .with_context(|| format!("cannot create {}", path.display()))?;
                    write_csv(&report, BufWriter::new(file))?;
                    println!("Driving log written to: {}", path.display());
                }
                None => write_csv(&report, io::stdout())?,
            },
            ExportFormat::Html => {
                let html = render_html(&report);
                match self.output {
                    Some(ref path) => {
                        let mut file = File::create(path)
                            .with_context(|| format!("cannot create {}", path.display()))?;
                        file.write_all(html.as_bytes())?;
                        println!("HTML report written to: {}", path.display());
                    }
                    None => {
                        let temp_path = std::env::temp_dir()
                            .join(format!("drivelog-{}.html", sanitize(&log.vehicle.number)));
                        std::fs::write(&temp_path, &html)?;
                        opener::open(&temp_path)?;
                        println!("Opened HTML report in browser: {}", temp_path.display());
                    }
                }
            }
        }
        Ok(())
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}
