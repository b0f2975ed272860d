use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{error, info};

use crate::error::{ensure_range, ReportingError, Result};
use crate::models::{DailyActivityBucket, DailyActivityResponse, EntityKind};
use crate::source::DailyCountSource;

/// Half-open timestamp window `[start 00:00, end + 1 day 00:00)`.
pub fn activity_window(start: NaiveDate, end: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let from = start.and_time(NaiveTime::MIN);
    let to = end.and_time(NaiveTime::MIN) + Duration::days(1);
    (from, to)
}

type DailyCounts = BTreeMap<NaiveDate, i64>;

/// Zero-filled buckets for every day in `[start, end]`.
pub fn fill_buckets(
    start: NaiveDate,
    end: NaiveDate,
    users: &DailyCounts,
    contracts: &DailyCounts,
    tickets: &DailyCounts,
    companies: &DailyCounts,
) -> Vec<DailyActivityBucket> {
    let count = |series: &DailyCounts, date: NaiveDate| series.get(&date).copied().unwrap_or(0);

    start
        .iter_days()
        .take_while(|date| *date <= end)
        .map(|date| {
            let users_created = count(users, date);
            let contracts_created = count(contracts, date);
            let tickets_created = count(tickets, date);
            let companies_created = count(companies, date);
            DailyActivityBucket {
                date,
                users_created,
                contracts_created,
                tickets_created,
                companies_created,
                total_activity: users_created
                    + contracts_created
                    + tickets_created
                    + companies_created,
            }
        })
        .collect()
}

pub struct DailyActivityService<S> {
    source: S,
}

impl<S: DailyCountSource> DailyActivityService<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    async fn series(
        &self,
        kind: EntityKind,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<DailyCounts> {
        self.source
            .fetch_daily_counts(kind, from, to)
            .await
            .map_err(|err| {
                error!(kind = kind.table(), error = %err, "failed to fetch daily counts");
                ReportingError::DataSourceUnavailable(err)
            })
    }

    pub async fn daily_activity(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DailyActivityResponse> {
        ensure_range(start, end)?;
        let (from, to) = activity_window(start, end);

        let (users, contracts, tickets, companies) = tokio::try_join!(
            self.series(EntityKind::Users, from, to),
            self.series(EntityKind::Contracts, from, to),
            self.series(EntityKind::Tickets, from, to),
            self.series(EntityKind::Companies, from, to),
        )?;

        let daily_stats = fill_buckets(start, end, &users, &contracts, &tickets, &companies);
        let sum = |pick: fn(&DailyActivityBucket) -> i64| daily_stats.iter().map(pick).sum::<i64>();

        let response = DailyActivityResponse {
            start_date: start,
            end_date: end,
            total_users_created: sum(|b| b.users_created),
            total_contracts_created: sum(|b| b.contracts_created),
            total_tickets_created: sum(|b| b.tickets_created),
            total_companies_created: sum(|b| b.companies_created),
            total_activity: sum(|b| b.total_activity),
            daily_stats,
        };

        info!(
            %start,
            %end,
            days = response.daily_stats.len(),
            total_activity = response.total_activity,
            "computed daily activity"
        );
        Ok(response)
    }
}
