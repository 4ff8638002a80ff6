use crate::models::StockRecord;
use chrono::NaiveDate;
use serde::Deserialize;
use service_core::error::AppError;

/// Optional `?start_date=YYYY-MM-DD&end_date=YYYY-MM-DD` on the lookup route.
#[derive(Debug, Default, Deserialize)]
pub struct DateRangeParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Inclusive date window. Both bounds open means "no filtering".
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRangeParams {
    pub fn into_range(self) -> Result<DateRange, AppError> {
        let start = parse_bound("start_date", self.start_date.as_deref())?;
        let end = parse_bound("end_date", self.end_date.as_deref())?;

        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(AppError::BadRequest(format!(
                    "start_date {} is after end_date {}",
                    start, end
                )));
            }
        }

        Ok(DateRange { start, end })
    }
}

fn parse_bound(name: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                AppError::BadRequest(format!("{} must be a date in YYYY-MM-DD format", name))
            }),
    }
}

impl DateRange {
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }

    /// Keeps records inside the window. With a bound set, records whose date
    /// cannot be parsed are dropped.
    pub fn apply(&self, records: Vec<StockRecord>) -> Vec<StockRecord> {
        if self.is_unbounded() {
            return records;
        }

        records
            .into_iter()
            .filter(|r| r.trading_date().is_some_and(|d| self.contains(d)))
            .collect()
    }
}
