//! Schema command - print expected input formats

use crate::source::{DrivingRecordRow, LogInput};
use clap::Args;
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Output format: json-schema, csv-header or csv-fields
    #[arg(value_enum, default_value = "json-schema")]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaFormat {
    /// JSON Schema for the JSON driving log
    JsonSchema,
    /// CSV header row with column names
    CsvHeader,
    /// CSV column descriptions
    CsvFields,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::JsonSchema => {
                let schema = schema_for!(LogInput);
                println!("{}", serde_json::to_string_pretty(&schema)?);
            }
            SchemaFormat::CsvHeader => println!("{}", DrivingRecordRow::csv_header()),
            SchemaFormat::CsvFields => {
                println!("CSV Input Format");
                println!("================");
                println!();
                for column in DrivingRecordRow::csv_columns() {
                    let req = if column.required { "required" } else { "optional" };
                    println!("{:20} ({:8})  {}", column.name, req, column.description);
                }
                println!();
                println!("Distances are kilometres; the file name (without extension) is the vehicle number");
            }
        }
        Ok(())
    }
}
