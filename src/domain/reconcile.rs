use super::aggregate::{BusinessUseRatio, PeriodSummary};
use rust_decimal::Decimal;
use serde::Serialize;

/// Period figures as computed upstream by the record source, if it sent any
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportedFigures {
    pub tax_period_distance: Option<Decimal>,
    pub tax_period_business_distance: Option<Decimal>,
    pub business_use_ratio: Option<u32>,
}

/// A reported figure that disagrees with the one computed from the records
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discrepancy {
    pub field: &'static str,
    pub reported: String,
    pub computed: String,
}

/// Compare upstream figures with the computed summary. Missing figures are skipped.
pub fn reconcile(summary: &PeriodSummary, reported: &ReportedFigures) -> Vec<Discrepancy> {
    let mut discrepancies = Vec::new();

    if let Some(distance) = reported.tax_period_distance {
        if distance != summary.total_period_distance {
            discrepancies.push(Discrepancy {
                field: "tax_period_distance",
                reported: distance.normalize().to_string(),
                computed: summary.total_period_distance.normalize().to_string(),
            });
        }
    }

    if let Some(distance) = reported.tax_period_business_distance {
        if distance != summary.total_business_distance {
            discrepancies.push(Discrepancy {
                field: "tax_period_business_distance",
                reported: distance.normalize().to_string(),
                computed: summary.total_business_distance.normalize().to_string(),
            });
        }
    }

    if let Some(ratio) = reported.business_use_ratio {
        let computed = summary.business_use_ratio;
        if computed != BusinessUseRatio::Percent(ratio) {
            discrepancies.push(Discrepancy {
                field: "business_use_ratio",
                reported: format!("{}%", ratio),
                computed: computed.to_string(),
            });
        }
    }

    discrepancies
}
