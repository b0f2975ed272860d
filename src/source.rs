use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::models::{EntityKind, InspectionReport};

#[async_trait]
pub trait ReportSource: Send + Sync {
    // Empty `screen_ids` means no screen filter.
    async fn fetch_reports(
        &self,
        screen_ids: &[Uuid],
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<InspectionReport>>;
}

#[async_trait]
pub trait DailyCountSource: Send + Sync {
    async fn fetch_daily_counts(
        &self,
        kind: EntityKind,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<BTreeMap<NaiveDate, i64>>;
}
