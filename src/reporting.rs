use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use tracing::{error, info};
use uuid::Uuid;

use crate::aggregate;
use crate::error::{ensure_range, ReportingError, Result};
use crate::models::{
    ComponentChangesSummary, InspectionReport, Report, ReportRequest, ReportType, ScreenHistory,
};
use crate::source::ReportSource;

pub fn report_window(start: NaiveDate, end: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let from = start.and_time(NaiveTime::MIN);
    let to = end.and_time(NaiveTime::MIN) + Duration::seconds(86_399);
    (from, to)
}

pub struct ReportingService<S> {
    source: S,
}

impl<S: ReportSource> ReportingService<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    async fn load(
        &self,
        screen_ids: &[Uuid],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<InspectionReport>> {
        ensure_range(start, end)?;
        let (from, to) = report_window(start, end);
        self.source
            .fetch_reports(screen_ids, from, to)
            .await
            .map_err(|err| {
                error!(%start, %end, error = %err, "failed to fetch inspection reports");
                ReportingError::DataSourceUnavailable(err)
            })
    }

    pub async fn generate_report(&self, request: &ReportRequest) -> Result<Report> {
        ensure_range(request.start_date, request.end_date)?;
        if request.report_type == ReportType::ComponentSpecific && request.components.is_empty() {
            return Err(ReportingError::InvalidRequest(
                "COMPONENT_SPECIFIC reports need at least one component".to_string(),
            ));
        }

        let reports = self
            .load(&request.screen_ids, request.start_date, request.end_date)
            .await?;
        let orphaned_reports = aggregate::count_orphans(&reports);
        let reports_analyzed = reports.len() - orphaned_reports;

        let mut report = Report {
            report_type: request.report_type,
            start_date: request.start_date,
            end_date: request.end_date,
            generated_at: Utc::now().naive_utc(),
            reports_analyzed,
            orphaned_reports,
            component_summaries: Vec::new(),
            detailed_records: Vec::new(),
            total_counts: Default::default(),
        };

        match request.report_type {
            ReportType::Summary => {
                let summaries = aggregate::build_summaries(&reports, &request.components);
                report.total_counts = aggregate::total_counts(&summaries);
                report.component_summaries = summaries;
            }
            ReportType::Detailed => {
                report.detailed_records =
                    aggregate::build_detailed_records(&reports, &request.components);
            }
            ReportType::ComponentSpecific => {
                report.component_summaries =
                    aggregate::build_summaries(&reports, &request.components);
            }
        }

        info!(
            report_type = %request.report_type,
            start = %request.start_date,
            end = %request.end_date,
            reports_analyzed,
            orphaned_reports,
            "generated component change report"
        );
        Ok(report)
    }

    pub async fn screen_history(
        &self,
        screen_ids: &[Uuid],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ScreenHistory>> {
        let reports = self.load(screen_ids, start, end).await?;
        let orphaned = aggregate::count_orphans(&reports);
        let histories = aggregate::build_screen_history(&reports);
        info!(%start, %end, screens = histories.len(), orphaned, "built screen histories");
        Ok(histories)
    }

    pub async fn component_specific(
        &self,
        name: &str,
        screen_ids: &[Uuid],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ComponentChangesSummary> {
        let reports = self.load(screen_ids, start, end).await?;
        let orphaned = aggregate::count_orphans(&reports);
        let summary = aggregate::component_specific(name, &reports);
        info!(
            component = name,
            %start,
            %end,
            total_changes = summary.total_changes,
            orphaned,
            "built component summary"
        );
        Ok(summary)
    }

    pub async fn total_change_count(
        &self,
        screen_ids: &[Uuid],
        components: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<u64> {
        let reports = self.load(screen_ids, start, end).await?;
        let orphaned = aggregate::count_orphans(&reports);
        let total = aggregate::total_change_count(&reports, components);
        info!(%start, %end, total, orphaned, "counted component changes");
        Ok(total)
    }
}
