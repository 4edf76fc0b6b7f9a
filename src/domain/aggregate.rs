use super::classify::{classify, ClassifiedRow};
use super::period::TaxPeriod;
use super::record::{DrivingRecord, RecordId, ValidationError};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Serialize, Serializer};
use std::fmt;

/// Share of the period's distance driven for business, as a whole percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusinessUseRatio {
    Percent(u32),
    /// Nothing was driven in the period, so there is no ratio to report
    NoData,
}

impl BusinessUseRatio {
    /// Rounds half up. Fails unless `0 <= business <= total`.
    pub fn from_distances(business: Decimal, total: Decimal) -> Result<Self, AggregateError> {
        if total.is_zero() {
            return Ok(BusinessUseRatio::NoData);
        }
        let out_of_range = || AggregateError::RatioOutOfRange { business, total };
        if business.is_sign_negative() || total.is_sign_negative() || business > total {
            return Err(out_of_range());
        }

        // The quotient is at most 1, so scaling it to a percentage cannot overflow
        let pct = (business / total * dec!(100))
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        pct.to_u32().map(BusinessUseRatio::Percent).ok_or_else(out_of_range)
    }
}

impl fmt::Display for BusinessUseRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusinessUseRatio::Percent(p) => write!(f, "{}%", p),
            BusinessUseRatio::NoData => write!(f, "-"),
        }
    }
}

impl Serialize for BusinessUseRatio {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            BusinessUseRatio::Percent(p) => serializer.serialize_u32(*p),
            BusinessUseRatio::NoData => serializer.serialize_str("NO_DATA"),
        }
    }
}

/// Period totals over the included records
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub total_period_distance: Decimal,
    pub total_business_distance: Decimal,
    pub total_commute_distance: Decimal,
    pub total_general_distance: Decimal,
    pub business_use_ratio: BusinessUseRatio,
}

/// Classified rows and totals for one tax period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregation {
    pub period: TaxPeriod,
    pub rows: Vec<ClassifiedRow>,
    pub summary: PeriodSummary,
    /// Records dated outside the period
    pub excluded_count: usize,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AggregateError {
    #[error("invalid driving record {record}")]
    InvalidRecord {
        record: RecordId,
        #[source]
        source: ValidationError,
    },
    #[error("{sum} is too large to total")]
    Overflow { sum: &'static str },
    #[error("business distance {business} is not within the total distance {total}")]
    RatioOutOfRange { business: Decimal, total: Decimal },
}

/// Classify every record dated inside `period` and total the distances.
///
/// Rows keep the order of `records`. Records outside the period are counted in
/// `excluded_count` and otherwise ignored. A single invalid record inside the
/// period fails the whole call.
pub fn aggregate(records: &[DrivingRecord], period: &TaxPeriod) -> Result<Aggregation, AggregateError> {
    let mut rows = Vec::with_capacity(records.len());
    let mut excluded_count = 0;

    let mut total_period_distance = Decimal::ZERO;
    let mut total_business_distance = Decimal::ZERO;
    let mut total_commute_distance = Decimal::ZERO;
    let mut total_general_distance = Decimal::ZERO;

    for record in records {
        if !period.contains(record.usage_date) {
            excluded_count += 1;
            continue;
        }

        let row = classify(record).map_err(|source| AggregateError::InvalidRecord {
            record: record.id.clone(),
            source,
        })?;

        add(&mut total_period_distance, row.total_driving, "total period distance")?;
        add(&mut total_business_distance, row.business_distance(), "business distance")?;
        add(&mut total_commute_distance, row.commute_distance, "commute distance")?;
        add(&mut total_general_distance, row.general_distance, "general distance")?;
        rows.push(row);
    }

    let business_use_ratio =
        BusinessUseRatio::from_distances(total_business_distance, total_period_distance)?;

    Ok(Aggregation {
        period: *period,
        rows,
        summary: PeriodSummary {
            total_period_distance,
            total_business_distance,
            total_commute_distance,
            total_general_distance,
            business_use_ratio,
        },
        excluded_count,
    })
}

fn add(total: &mut Decimal, distance: Decimal, sum: &'static str) -> Result<(), AggregateError> {
    *total = total
        .checked_add(distance)
        .ok_or(AggregateError::Overflow { sum })?;
    Ok(())
}
