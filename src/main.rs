use clap::{Parser, Subcommand};
use drivelog::cmd;

#[derive(Parser, Debug)]
#[command(name = "drivelog", version, about = "Business vehicle driving log and tax period mileage")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Driving log table with period totals
    Report(cmd::report::ReportCommand),
    /// Period totals and business use ratio
    Summary(cmd::summary::SummaryCommand),
    /// Distances per usage date
    Daily(cmd::daily::DailyCommand),
    /// Usage list across vehicles
    History(cmd::history::HistoryCommand),
    /// Export the driving log report as CSV or HTML
    Export(cmd::export::ExportCommand),
    /// Check records and server totals
    Validate(cmd::validate::ValidateCommand),
    /// Print expected input formats
    Schema(cmd::schema::SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Report(report) => report.exec(),
        Command::Summary(summary) => summary.exec(),
        Command::Daily(daily) => daily.exec(),
        Command::History(history) => history.exec(),
        Command::Export(export) => export.exec(),
        Command::Validate(validate) => validate.exec(),
        Command::Schema(schema) => schema.exec(),
    }
}
