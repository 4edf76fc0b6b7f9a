//! Record source: loads a vehicle's driving log and converts it into strict domain types

use crate::domain::{DrivingRecord, OwnerRef, PeriodError, RecordId, ReportedFigures, TaxPeriod, UsePurpose};
use chrono::{NaiveDate, NaiveDateTime};
use drivelog_derive::CsvSchema;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("could not read driving log: {0}")]
    Io(#[from] io::Error),
    #[error("malformed JSON driving log: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed CSV driving log: {0}")]
    Csv(#[from] csv::Error),
    #[error("no input received. Provide a file or pipe data to stdin.")]
    EmptyInput,
    #[error("invalid date '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { value: String },
    #[error("record {record}: unknown use purpose '{value}' (expected COMMUTE or GENERAL)")]
    UnknownPurpose { record: String, value: String },
    #[error("tax period needs both a start and an end date")]
    IncompletePeriod,
    #[error("invalid business use ratio '{0}' (expected a whole percentage)")]
    InvalidRatio(Decimal),
    #[error(transparent)]
    Period(#[from] PeriodError),
}

/// Vehicle the log belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vehicle {
    pub number: String,
    pub model: Option<String>,
}

/// Business that operates the vehicle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Business {
    pub name: String,
    pub registration_number: String,
}

/// A loaded driving log for one vehicle
#[derive(Debug, Clone)]
pub struct VehicleLog {
    pub vehicle: Vehicle,
    pub business: Option<Business>,
    /// Tax period declared by the source, if any
    pub declared_period: Option<TaxPeriod>,
    /// Totals the source computed itself, kept for reconciliation
    pub reported: ReportedFigures,
    pub records: Vec<DrivingRecord>,
}

/// Input root for a JSON driving log, as served by the fleet API
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogInput {
    pub vehicle_type: VehicleInput,
    #[serde(default)]
    pub business_info: Option<BusinessInput>,
    /// First day of the tax period (YYYY-MM-DD)
    #[serde(default)]
    pub tax_start_period: Option<String>,
    /// Last day of the tax period (YYYY-MM-DD)
    #[serde(default)]
    pub tax_end_period: Option<String>,
    /// Total distance for the period as computed by the server
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub tax_period_distance: Option<Decimal>,
    /// Business distance for the period as computed by the server
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub tax_period_business_distance: Option<Decimal>,
    /// Business use ratio as a whole percentage, as computed by the server
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub business_use_ratio: Option<Decimal>,
    pub records: Vec<RecordInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VehicleInput {
    pub vehicle_number: String,
    #[serde(default)]
    pub vehicle_model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BusinessInput {
    pub business_name: String,
    pub business_registration_number: String,
}

/// Record identifiers arrive as numbers or strings depending on the server
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum IdInput {
    Number(u64),
    Text(String),
}

impl From<IdInput> for RecordId {
    fn from(id: IdInput) -> Self {
        match id {
            IdInput::Number(n) => RecordId(n.to_string()),
            IdInput::Text(s) => RecordId(s),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordInput {
    pub id: IdInput,
    /// Date the vehicle was used (YYYY-MM-DD)
    pub usage_date: String,
    #[serde(default)]
    pub user: Option<UserInput>,
    pub driving_info: DrivingInfoInput,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserInput {
    #[serde(default)]
    pub department_name: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DrivingInfoInput {
    /// Odometer reading before the trip, in km
    #[schemars(with = "f64")]
    pub driving_before: Decimal,
    /// Odometer reading after the trip, in km
    #[schemars(with = "f64")]
    pub driving_after: Decimal,
    /// Server-side trip distance; recomputed from the odometer readings
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub total_driving: Option<Decimal>,
    pub business_driving_details: BusinessDrivingInput,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BusinessDrivingInput {
    /// COMMUTE or GENERAL
    pub use_purpose: String,
    /// Distance declared as business use, in km
    #[schemars(with = "f64")]
    pub driving_distance: Decimal,
}

/// Description of one CSV input column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvColumn {
    pub name: &'static str,
    pub required: bool,
    pub description: &'static str,
}

/// Flat CSV format for driving records, one trip per row
#[derive(Debug, Clone, Serialize, Deserialize, CsvSchema)]
pub struct DrivingRecordRow {
    /// Unique record identifier
    pub id: String,
    /// Date the vehicle was used (YYYY-MM-DD)
    pub usage_date: String,
    /// Department of the driver
    #[serde(default)]
    pub department: Option<String>,
    /// Name of the driver
    #[serde(default)]
    pub driver: Option<String>,
    /// Odometer reading before the trip, in km
    pub odometer_before: Decimal,
    /// Odometer reading after the trip, in km
    pub odometer_after: Decimal,
    /// COMMUTE or GENERAL
    pub use_purpose: String,
    /// Distance declared as business use, in km
    pub business_distance: Decimal,
    /// Free text notes
    #[serde(default)]
    pub notes: Option<String>,
}

/// Read a driving log from a JSON or CSV file, or JSON from stdin with "-"
pub fn read_log(path: &Path) -> Result<VehicleLog, SourceError> {
    if path.as_os_str() == "-" {
        return read_from_stdin();
    }

    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    let file = File::open(path)?;
    if is_csv {
        let vehicle_number = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        read_csv(file, &vehicle_number)
    } else {
        read_json(BufReader::new(file))
    }
}

fn read_from_stdin() -> Result<VehicleLog, SourceError> {
    let mut buffer = Vec::new();
    io::stdin().lock().read_to_end(&mut buffer)?;

    if buffer.is_empty() {
        return Err(SourceError::EmptyInput);
    }
    read_json(io::Cursor::new(buffer))
}

/// Read a JSON driving log
pub fn read_json<R: Read>(reader: R) -> Result<VehicleLog, SourceError> {
    let input: LogInput = serde_json::from_reader(reader)?;
    input.into_log()
}

/// Read flat CSV driving records. CSV carries no vehicle metadata, so the caller names the vehicle.
pub fn read_csv<R: Read>(reader: R, vehicle_number: &str) -> Result<VehicleLog, SourceError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let row: DrivingRecordRow = result?;
        records.push(row.into_record()?);
    }
    log::debug!("read {} csv driving records", records.len());

    Ok(VehicleLog {
        vehicle: Vehicle {
            number: vehicle_number.to_string(),
            model: None,
        },
        business: None,
        declared_period: None,
        reported: ReportedFigures::default(),
        records,
    })
}

impl LogInput {
    pub fn into_log(self) -> Result<VehicleLog, SourceError> {
        let declared_period = match (&self.tax_start_period, &self.tax_end_period) {
            (Some(start), Some(end)) => Some(TaxPeriod::new(parse_date(start)?, parse_date(end)?)?),
            (None, None) => None,
            _ => return Err(SourceError::IncompletePeriod),
        };

        let business_use_ratio = self
            .business_use_ratio
            .map(|ratio| {
                if ratio.fract().is_zero() {
                    ratio.to_u32().ok_or(SourceError::InvalidRatio(ratio))
                } else {
                    Err(SourceError::InvalidRatio(ratio))
                }
            })
            .transpose()?;

        let records = self
            .records
            .into_iter()
            .map(RecordInput::into_record)
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!(
            "read {} driving records for vehicle {}",
            records.len(),
            self.vehicle_type.vehicle_number
        );

        Ok(VehicleLog {
            vehicle: Vehicle {
                number: self.vehicle_type.vehicle_number,
                model: self.vehicle_type.vehicle_model,
            },
            business: self.business_info.map(|b| Business {
                name: b.business_name,
                registration_number: b.business_registration_number,
            }),
            declared_period,
            reported: ReportedFigures {
                tax_period_distance: self.tax_period_distance,
                tax_period_business_distance: self.tax_period_business_distance,
                business_use_ratio,
            },
            records,
        })
    }
}

impl RecordInput {
    fn into_record(self) -> Result<DrivingRecord, SourceError> {
        let id = RecordId::from(self.id);
        let info = self.driving_info;
        let details = info.business_driving_details;

        let use_purpose = parse_purpose(&id.0, &details.use_purpose)?;

        if let Some(total) = info.total_driving {
            let computed = info.driving_after - info.driving_before;
            if total != computed {
                log::warn!(
                    "record {}: server total {} differs from odometer difference {}, using the latter",
                    id,
                    total,
                    computed
                );
            }
        }

        let owner = self
            .user
            .map(|u| OwnerRef {
                department: u.department_name,
                driver: u.name,
            })
            .unwrap_or_default();

        Ok(DrivingRecord {
            usage_date: parse_date(&self.usage_date)?,
            id,
            odometer_before: info.driving_before,
            odometer_after: info.driving_after,
            use_purpose,
            declared_business_distance: details.driving_distance,
            notes: info.notes.unwrap_or_default(),
            owner,
        })
    }
}

impl DrivingRecordRow {
    fn into_record(self) -> Result<DrivingRecord, SourceError> {
        let use_purpose = parse_purpose(&self.id, &self.use_purpose)?;
        Ok(DrivingRecord {
            usage_date: parse_date(&self.usage_date)?,
            id: RecordId(self.id),
            odometer_before: self.odometer_before,
            odometer_after: self.odometer_after,
            use_purpose,
            declared_business_distance: self.business_distance,
            notes: self.notes.unwrap_or_default(),
            owner: OwnerRef {
                department: self.department.unwrap_or_default(),
                driver: self.driver.unwrap_or_default(),
            },
        })
    }
}

fn parse_purpose(record: &str, value: &str) -> Result<UsePurpose, SourceError> {
    UsePurpose::from_str(value).ok_or_else(|| SourceError::UnknownPurpose {
        record: record.to_string(),
        value: value.to_string(),
    })
}

/// Parse a date, accepting `-`, `.` or `/` separators and an optional time part
pub fn parse_date(s: &str) -> Result<NaiveDate, SourceError> {
    let s = s.trim();
    for format in ["%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Ok(date);
        }
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt.date());
        }
    }
    Err(SourceError::InvalidDate {
        value: s.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const LOG_JSON: &str = r#"{
        "vehicleType": { "vehicleNumber": "123가 4567", "vehicleModel": "Sonata" },
        "businessInfo": { "businessName": "Alin Logistics", "businessRegistrationNumber": "123-45-67890" },
        "taxStartPeriod": "2024-01-01",
        "taxEndPeriod": "2024-01-31",
        "taxPeriodDistance": 190,
        "taxPeriodBusinessDistance": 180,
        "businessUseRatio": 95,
        "records": [
            {
                "id": 1,
                "usageDate": "2024-01-05",
                "user": { "departmentName": "Overseas Sales 1", "name": "Kim" },
                "drivingInfo": {
                    "drivingBefore": 1000,
                    "drivingAfter": 1150,
                    "totalDriving": 150,
                    "businessDrivingDetails": { "usePurpose": "GENERAL", "drivingDistance": 150 },
                    "notes": "client visit"
                }
            },
            {
                "id": "r-2",
                "usageDate": "2024.01.06",
                "drivingInfo": {
                    "drivingBefore": "1150",
                    "drivingAfter": 1190.5,
                    "businessDrivingDetails": { "usePurpose": "COMMUTE", "drivingDistance": 30 }
                }
            }
        ]
    }"#;

    #[test]
    fn json_log_converted() {
        let log = read_json(LOG_JSON.as_bytes()).unwrap();
        assert_eq!(log.vehicle.number, "123가 4567");
        assert_eq!(log.vehicle.model.as_deref(), Some("Sonata"));
        assert_eq!(log.business.as_ref().map(|b| b.name.as_str()), Some("Alin Logistics"));

        let period = log.declared_period.unwrap();
        assert_eq!(period.start(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(period.end(), NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());

        assert_eq!(log.reported.tax_period_distance, Some(dec!(190)));
        assert_eq!(log.reported.business_use_ratio, Some(95));

        assert_eq!(log.records.len(), 2);
        let first = &log.records[0];
        assert_eq!(first.id, RecordId("1".to_string()));
        assert_eq!(first.use_purpose, UsePurpose::General);
        assert_eq!(first.owner.driver, "Kim");
        assert_eq!(first.notes, "client visit");

        let second = &log.records[1];
        assert_eq!(second.id, RecordId("r-2".to_string()));
        assert_eq!(second.usage_date, NaiveDate::from_ymd_opt(2024, 1, 6).unwrap());
        assert_eq!(second.odometer_after, dec!(1190.5));
        assert_eq!(second.use_purpose, UsePurpose::Commute);
        assert_eq!(second.owner, OwnerRef::default());
        assert_eq!(second.notes, "");
    }

    #[test]
    fn unknown_purpose_rejected() {
        let json = LOG_JSON.replace("\"COMMUTE\"", "\"LEISURE\"");
        let err = read_json(json.as_bytes()).unwrap_err();
        assert!(matches!(err, SourceError::UnknownPurpose { ref record, ref value } if record == "r-2" && value == "LEISURE"));
    }

    #[test]
    fn half_declared_period_rejected() {
        let json = LOG_JSON.replace("\"taxEndPeriod\": \"2024-01-31\",", "");
        let err = read_json(json.as_bytes()).unwrap_err();
        assert!(matches!(err, SourceError::IncompletePeriod));
    }

    #[test]
    fn inverted_declared_period_rejected() {
        let json = LOG_JSON.replace("\"2024-01-31\"", "\"2023-12-01\"");
        let err = read_json(json.as_bytes()).unwrap_err();
        assert!(matches!(err, SourceError::Period(PeriodError::Inverted { .. })));
    }

    #[test]
    fn fractional_ratio_rejected() {
        let json = LOG_JSON.replace("\"businessUseRatio\": 95", "\"businessUseRatio\": 94.7");
        let err = read_json(json.as_bytes()).unwrap_err();
        assert!(matches!(err, SourceError::InvalidRatio(_)));
    }

    #[test]
    fn csv_log_converted() {
        let data = "\
id,usage_date,department,driver,odometer_before,odometer_after,use_purpose,business_distance,notes
1,2024-01-05,Sales,Kim,1000,1150,GENERAL,150,client visit
2,2024-01-06,,,1150,1190,commute,40,
";
        let log = read_csv(data.as_bytes(), "12G3456").unwrap();
        assert_eq!(log.vehicle.number, "12G3456");
        assert!(log.declared_period.is_none());
        assert_eq!(log.records.len(), 2);
        assert_eq!(log.records[0].owner.department, "Sales");
        assert_eq!(log.records[1].use_purpose, UsePurpose::Commute);
        assert_eq!(log.records[1].owner.driver, "");
        assert_eq!(log.records[1].declared_business_distance, dec!(40));
    }

    #[test]
    fn csv_bad_date_rejected() {
        let data = "\
id,usage_date,odometer_before,odometer_after,use_purpose,business_distance
1,05/01/2024,1000,1150,GENERAL,150
";
        let err = read_csv(data.as_bytes(), "x").unwrap_err();
        assert!(matches!(err, SourceError::InvalidDate { .. }));
    }

    #[test]
    fn csv_columns_from_derive() {
        let columns = DrivingRecordRow::csv_columns();
        assert_eq!(columns.len(), 9);
        assert_eq!(columns[0].name, "id");
        assert!(columns[0].required);
        assert_eq!(columns[2].name, "department");
        assert!(!columns[2].required);
        assert_eq!(columns[6].description, "COMMUTE or GENERAL");
        assert_eq!(
            DrivingRecordRow::csv_header(),
            "id,usage_date,department,driver,odometer_before,odometer_after,use_purpose,business_distance,notes"
        );
    }

    #[test]
    fn date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(parse_date("2024-03-09").unwrap(), expected);
        assert_eq!(parse_date("2024.03.09").unwrap(), expected);
        assert_eq!(parse_date("2024/03/09").unwrap(), expected);
        assert_eq!(parse_date("2024-03-09T08:30:00").unwrap(), expected);
        assert!(parse_date("09-03-2024").is_err());
    }
}
