use chrono::NaiveDate;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared purpose of a trip, as recorded on the driving log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UsePurpose {
    /// Home to work travel
    Commute,
    /// Business use other than commuting
    #[default]
    General,
}

impl UsePurpose {
    pub fn from_str(s: &str) -> Option<UsePurpose> {
        match s.trim().to_uppercase().as_str() {
            "COMMUTE" => Some(UsePurpose::Commute),
            "GENERAL" => Some(UsePurpose::General),
            _ => None,
        }
    }
}

impl fmt::Display for UsePurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsePurpose::Commute => write!(f, "COMMUTE"),
            UsePurpose::General => write!(f, "GENERAL"),
        }
    }
}

/// Identity of a driving record, as assigned by the record source
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RecordId(pub String);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who drove the vehicle. Display only, never part of the arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct OwnerRef {
    pub department: String,
    pub driver: String,
}

/// A single day's entry in a vehicle driving log.
///
/// Distances are kilometres. Records are built by the record source and are
/// never mutated afterwards; invariants are checked by [`classify`].
///
/// [`classify`]: crate::domain::classify()
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrivingRecord {
    pub id: RecordId,
    pub usage_date: NaiveDate,
    pub odometer_before: Decimal,
    pub odometer_after: Decimal,
    pub use_purpose: UsePurpose,
    pub declared_business_distance: Decimal,
    pub notes: String,
    pub owner: OwnerRef,
}

/// Broken record invariant
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("odometer reading before the trip is negative: {0}")]
    NegativeOdometerBefore(Decimal),
    #[error("odometer reading after the trip is negative: {0}")]
    NegativeOdometerAfter(Decimal),
    #[error("odometer decreased from {before} to {after}")]
    OdometerDecreased { before: Decimal, after: Decimal },
    #[error("declared business distance is negative: {0}")]
    NegativeBusinessDistance(Decimal),
    #[error("declared business distance {declared} exceeds total driving distance {total}")]
    BusinessDistanceExceedsTotal { declared: Decimal, total: Decimal },
}
