use super::classify::ClassifiedRow;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Distances driven on one usage date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub trips: usize,
    pub total_driving: Decimal,
    pub commute_distance: Decimal,
    pub general_distance: Decimal,
}

/// Group classified rows by usage date, earliest first
pub fn daily_totals(rows: &[ClassifiedRow]) -> Vec<DailyTotal> {
    let mut by_date: BTreeMap<NaiveDate, DailyTotal> = BTreeMap::new();

    for row in rows {
        let entry = by_date.entry(row.usage_date).or_insert_with(|| DailyTotal {
            date: row.usage_date,
            trips: 0,
            total_driving: Decimal::ZERO,
            commute_distance: Decimal::ZERO,
            general_distance: Decimal::ZERO,
        });
        entry.trips += 1;
        entry.total_driving += row.total_driving;
        entry.commute_distance += row.commute_distance;
        entry.general_distance += row.general_distance;
    }

    by_date.into_values().collect()
}
