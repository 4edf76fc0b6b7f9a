pub mod aggregate;
pub mod classify;
pub mod daily;
pub mod history;
pub mod period;
pub mod reconcile;
pub mod record;

// Flat public surface for domain types and functions.
pub use aggregate::{aggregate, AggregateError, Aggregation, BusinessUseRatio, PeriodSummary};
pub use classify::{classify, ClassifiedRow};
pub use daily::{daily_totals, DailyTotal};
pub use history::{vehicle_history, VehicleHistory};
pub use period::{PeriodError, TaxPeriod};
pub use reconcile::{reconcile, Discrepancy, ReportedFigures};
pub use record::{DrivingRecord, OwnerRef, RecordId, UsePurpose, ValidationError};
