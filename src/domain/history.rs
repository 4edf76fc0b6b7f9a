use super::aggregate::{Aggregation, BusinessUseRatio};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeSet;

/// One line of the fleet history list: how much a vehicle was used in a period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleHistory {
    pub vehicle_number: String,
    /// Distinct usage dates on which the vehicle actually moved
    pub driving_days: usize,
    /// Mean distance per driving day, two decimal places
    pub average_driving_distance: Decimal,
    pub total_driving_distance: Decimal,
    pub business_use_ratio: BusinessUseRatio,
    /// Department of the most recent driver in the period
    pub department: Option<String>,
    /// Most recent driver in the period
    pub driver: Option<String>,
}

pub fn vehicle_history(vehicle_number: &str, aggregation: &Aggregation) -> VehicleHistory {
    let driving_days = aggregation
        .rows
        .iter()
        .filter(|r| !r.total_driving.is_zero())
        .map(|r| r.usage_date)
        .collect::<BTreeSet<_>>()
        .len();

    let total = aggregation.summary.total_period_distance;
    let average_driving_distance = if driving_days == 0 {
        Decimal::ZERO
    } else {
        (total / Decimal::from(driving_days)).round_dp(2)
    };

    // Later rows win ties on the same date
    let latest = aggregation.rows.iter().max_by_key(|r| r.usage_date).map(|r| &r.owner);
    let non_empty = |s: &String| Some(s.clone()).filter(|s| !s.is_empty());

    VehicleHistory {
        vehicle_number: vehicle_number.to_string(),
        driving_days,
        average_driving_distance,
        total_driving_distance: total,
        business_use_ratio: aggregation.summary.business_use_ratio,
        department: latest.and_then(|o| non_empty(&o.department)),
        driver: latest.and_then(|o| non_empty(&o.driver)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregate::aggregate;
    use crate::domain::period::TaxPeriod;
    use crate::domain::record::{DrivingRecord, OwnerRef, RecordId, UsePurpose};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn record(id: &str, day: u32, before: Decimal, after: Decimal, declared: Decimal) -> DrivingRecord {
        DrivingRecord {
            id: RecordId(id.to_string()),
            usage_date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            odometer_before: before,
            odometer_after: after,
            use_purpose: UsePurpose::General,
            declared_business_distance: declared,
            notes: String::new(),
            owner: OwnerRef::default(),
        }
    }

    #[test]
    fn counts_distinct_days_with_movement() {
        let records = vec![
            record("1", 1, dec!(0), dec!(100), dec!(80)),
            record("2", 1, dec!(100), dec!(150), dec!(50)),
            record("3", 2, dec!(150), dec!(150), dec!(0)),
            record("4", 5, dec!(150), dec!(250), dec!(70)),
        ];
        let period = TaxPeriod::year(2024).unwrap();
        let aggregation = aggregate(&records, &period).unwrap();

        let history = vehicle_history("12G 3456", &aggregation);
        assert_eq!(history.vehicle_number, "12G 3456");
        assert_eq!(history.driving_days, 2);
        assert_eq!(history.total_driving_distance, dec!(250));
        assert_eq!(history.average_driving_distance, dec!(125));
        assert_eq!(history.business_use_ratio, BusinessUseRatio::Percent(80));
    }

    #[test]
    fn shows_most_recent_driver() {
        let owner = |department: &str, driver: &str| OwnerRef {
            department: department.to_string(),
            driver: driver.to_string(),
        };
        let mut records = vec![
            record("1", 9, dec!(0), dec!(100), dec!(80)),
            record("2", 3, dec!(100), dec!(150), dec!(50)),
            record("3", 9, dec!(150), dec!(160), dec!(0)),
        ];
        records[0].owner = owner("Sales", "Kim");
        records[1].owner = owner("Support", "Lee");
        records[2].owner = owner("Operations", "Park");
        let aggregation = aggregate(&records, &TaxPeriod::year(2024).unwrap()).unwrap();

        let history = vehicle_history("12G 3456", &aggregation);
        assert_eq!(history.department.as_deref(), Some("Operations"));
        assert_eq!(history.driver.as_deref(), Some("Park"));
    }

    #[test]
    fn idle_vehicle_has_zero_average() {
        let records = vec![record("1", 1, dec!(10), dec!(10), dec!(0))];
        let period = TaxPeriod::year(2024).unwrap();
        let aggregation = aggregate(&records, &period).unwrap();

        let history = vehicle_history("12G 3456", &aggregation);
        assert_eq!(history.driving_days, 0);
        assert_eq!(history.average_driving_distance, Decimal::ZERO);
        assert_eq!(history.business_use_ratio, BusinessUseRatio::NoData);
        assert_eq!(history.department, None);
        assert_eq!(history.driver, None);
    }
}
