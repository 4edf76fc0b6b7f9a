use super::record::{DrivingRecord, OwnerRef, RecordId, UsePurpose, ValidationError};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// A driving record with its distance split into commute and general business use
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedRow {
    pub id: RecordId,
    pub usage_date: NaiveDate,
    pub owner: OwnerRef,
    pub odometer_before: Decimal,
    pub odometer_after: Decimal,
    pub total_driving: Decimal,
    pub commute_distance: Decimal,
    pub general_distance: Decimal,
    pub notes: String,
}

impl ClassifiedRow {
    /// Declared business distance, whichever bucket it landed in
    pub fn business_distance(&self) -> Decimal {
        self.commute_distance + self.general_distance
    }
}

/// Check a record's invariants and split its declared business distance by purpose.
pub fn classify(record: &DrivingRecord) -> Result<ClassifiedRow, ValidationError> {
    let before = record.odometer_before;
    let after = record.odometer_after;
    let declared = record.declared_business_distance;

    if before < Decimal::ZERO {
        return Err(ValidationError::NegativeOdometerBefore(before));
    }
    if after < Decimal::ZERO {
        return Err(ValidationError::NegativeOdometerAfter(after));
    }
    if after < before {
        return Err(ValidationError::OdometerDecreased { before, after });
    }
    if declared < Decimal::ZERO {
        return Err(ValidationError::NegativeBusinessDistance(declared));
    }

    let total_driving = after - before;
    if declared > total_driving {
        return Err(ValidationError::BusinessDistanceExceedsTotal {
            declared,
            total: total_driving,
        });
    }

    let (commute_distance, general_distance) = match record.use_purpose {
        UsePurpose::Commute => (declared, Decimal::ZERO),
        UsePurpose::General => (Decimal::ZERO, declared),
    };

    Ok(ClassifiedRow {
        id: record.id.clone(),
        usage_date: record.usage_date,
        owner: record.owner.clone(),
        odometer_before: before,
        odometer_after: after,
        total_driving,
        commute_distance,
        general_distance,
        notes: record.notes.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(before: Decimal, after: Decimal, purpose: UsePurpose, declared: Decimal) -> DrivingRecord {
        DrivingRecord {
            id: RecordId("1".to_string()),
            usage_date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            odometer_before: before,
            odometer_after: after,
            use_purpose: purpose,
            declared_business_distance: declared,
            notes: "client visit".to_string(),
            owner: OwnerRef {
                department: "Sales".to_string(),
                driver: "Kim".to_string(),
            },
        }
    }

    #[test]
    fn general_purpose_goes_to_general_bucket() {
        let row = classify(&record(dec!(1000), dec!(1150), UsePurpose::General, dec!(150))).unwrap();
        assert_eq!(row.total_driving, dec!(150));
        assert_eq!(row.commute_distance, dec!(0));
        assert_eq!(row.general_distance, dec!(150));
    }

    #[test]
    fn commute_purpose_goes_to_commute_bucket() {
        let row = classify(&record(dec!(1000), dec!(1040), UsePurpose::Commute, dec!(30))).unwrap();
        assert_eq!(row.total_driving, dec!(40));
        assert_eq!(row.commute_distance, dec!(30));
        assert_eq!(row.general_distance, dec!(0));
        assert_eq!(row.business_distance(), dec!(30));
    }

    #[test]
    fn idle_day_is_all_zero() {
        for purpose in [UsePurpose::Commute, UsePurpose::General] {
            let row = classify(&record(dec!(500), dec!(500), purpose, dec!(0))).unwrap();
            assert_eq!(row.total_driving, dec!(0));
            assert_eq!(row.commute_distance, dec!(0));
            assert_eq!(row.general_distance, dec!(0));
        }
    }

    #[test]
    fn buckets_are_mutually_exclusive() {
        for purpose in [UsePurpose::Commute, UsePurpose::General] {
            let row = classify(&record(dec!(0), dec!(12.5), purpose, dec!(12.5))).unwrap();
            let non_zero = [row.commute_distance, row.general_distance]
                .iter()
                .filter(|d| !d.is_zero())
                .count();
            assert_eq!(non_zero, 1);
        }
    }

    #[test]
    fn pass_through_fields_unchanged() {
        let input = record(dec!(10), dec!(20), UsePurpose::General, dec!(5));
        let row = classify(&input).unwrap();
        assert_eq!(row.id, input.id);
        assert_eq!(row.usage_date, input.usage_date);
        assert_eq!(row.owner, input.owner);
        assert_eq!(row.notes, "client visit");
        assert_eq!(row.odometer_before, dec!(10));
        assert_eq!(row.odometer_after, dec!(20));
    }

    #[test]
    fn decreasing_odometer_rejected() {
        let result = classify(&record(dec!(500), dec!(480), UsePurpose::General, dec!(0)));
        assert_eq!(
            result,
            Err(ValidationError::OdometerDecreased {
                before: dec!(500),
                after: dec!(480)
            })
        );
    }

    #[test]
    fn declared_over_total_rejected() {
        let result = classify(&record(dec!(0), dec!(150), UsePurpose::General, dec!(200)));
        assert_eq!(
            result,
            Err(ValidationError::BusinessDistanceExceedsTotal {
                declared: dec!(200),
                total: dec!(150)
            })
        );
    }

    #[test]
    fn negative_declared_rejected() {
        let result = classify(&record(dec!(0), dec!(150), UsePurpose::Commute, dec!(-1)));
        assert_eq!(result, Err(ValidationError::NegativeBusinessDistance(dec!(-1))));
    }

    #[test]
    fn negative_odometer_rejected() {
        let result = classify(&record(dec!(-10), dec!(5), UsePurpose::General, dec!(0)));
        assert_eq!(result, Err(ValidationError::NegativeOdometerBefore(dec!(-10))));

        let result = classify(&record(dec!(0), dec!(-5), UsePurpose::General, dec!(0)));
        assert_eq!(result, Err(ValidationError::NegativeOdometerAfter(dec!(-5))));
    }

    #[test]
    fn classification_is_deterministic() {
        let input = record(dec!(100), dec!(180.4), UsePurpose::Commute, dec!(80.4));
        assert_eq!(classify(&input), classify(&input));
    }
}
