use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportingError {
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("unknown report type `{0}`: expected SUMMARY, DETAILED or COMPONENT_SPECIFIC")]
    UnknownReportType(String),
    #[error("data source unavailable: {0:#}")]
    DataSourceUnavailable(#[source] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ReportingError>;

pub fn ensure_range(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if start > end {
        return Err(ReportingError::InvalidRange { start, end });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_single_day_range() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert!(ensure_range(day, day).is_ok());
    }

    #[test]
    fn rejects_inverted_range() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let err = ensure_range(start, end).unwrap_err();
        assert!(matches!(err, ReportingError::InvalidRange { .. }));
        assert_eq!(
            err.to_string(),
            "invalid date range: start 2024-03-02 is after end 2024-03-01"
        );
    }
}
