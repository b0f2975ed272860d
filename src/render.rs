use std::fmt::Write;

use crate::aggregate::OVERALL_TOTAL_KEY;
use crate::models::{
    DailyActivityResponse, DetailedChangeRecord, Report, ReportType, ScreenHistory,
};

pub fn report_markdown(report: &Report) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Component Change Report ({})", report.report_type);
    let _ = writeln!(
        output,
        "Reports from {} to {}, generated {}",
        report.start_date,
        report.end_date,
        report.generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(
        output,
        "{} reports analysed, {} excluded without a screen",
        report.reports_analyzed, report.orphaned_reports
    );

    if !report.component_summaries.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Component Summaries");

        let mut summaries: Vec<_> = report.component_summaries.iter().collect();
        summaries.sort_by(|a, b| b.total_changes.cmp(&a.total_changes));
        for summary in summaries {
            let _ = writeln!(
                output,
                "- {}: {} changes across {} screens",
                summary.component_name,
                summary.total_changes,
                summary.changes_per_screen.len()
            );
            for (value, count) in summary.change_type_distribution.iter() {
                let _ = writeln!(output, "  - \"{}\" x{}", value, count);
            }
        }
    }

    if let Some(overall) = report.total_counts.get(OVERALL_TOTAL_KEY) {
        let _ = writeln!(output);
        let _ = writeln!(output, "Total changes: {}", overall);
    }

    if report.report_type == ReportType::Detailed {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Change Records");

        if report.detailed_records.is_empty() {
            let _ = writeln!(output, "No changes recorded for this window.");
        } else {
            for record in report.detailed_records.iter() {
                let _ = writeln!(
                    output,
                    "- {} screen {} ticket {}: {} -> \"{}\"",
                    record.change_date.format("%Y-%m-%d %H:%M"),
                    record.screen_id,
                    record.ticket_id,
                    record.component_name,
                    record.current_value
                );
            }
        }
    }

    output
}

pub fn history_markdown(histories: &[ScreenHistory]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# Screen Histories");

    if histories.is_empty() {
        let _ = writeln!(output, "No screens with reports in this window.");
        return output;
    }

    for history in histories {
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "## {} ({} changes)",
            history.screen_name, history.total_changes
        );
        for component in history
            .component_histories
            .iter()
            .filter(|component| component.total_changes > 0)
        {
            let _ = writeln!(output, "- {}", component.component_name);
            for change in component.changes.iter() {
                let _ = writeln!(
                    output,
                    "  - {}: \"{}\" (ticket {})",
                    change.change_date.format("%Y-%m-%d %H:%M"),
                    change.value,
                    change.ticket_id
                );
            }
        }
    }

    output
}

pub fn activity_markdown(activity: &DailyActivityResponse) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Daily Activity");
    let _ = writeln!(output, "From {} to {}", activity.start_date, activity.end_date);
    let _ = writeln!(output);
    let _ = writeln!(output, "| Date | Users | Contracts | Tickets | Companies | Total |");
    let _ = writeln!(output, "|---|---|---|---|---|---|");
    for bucket in activity.daily_stats.iter() {
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} | {} | {} |",
            bucket.date,
            bucket.users_created,
            bucket.contracts_created,
            bucket.tickets_created,
            bucket.companies_created,
            bucket.total_activity
        );
    }
    let _ = writeln!(
        output,
        "| **Total** | {} | {} | {} | {} | {} |",
        activity.total_users_created,
        activity.total_contracts_created,
        activity.total_tickets_created,
        activity.total_companies_created,
        activity.total_activity
    );

    output
}

pub fn records_csv(records: &[DetailedChangeRecord]) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "change_date",
        "screen_id",
        "ticket_id",
        "component_name",
        "previous_value",
        "current_value",
    ])?;

    for record in records {
        writer.write_record([
            record.change_date.format("%Y-%m-%dT%H:%M:%S").to_string(),
            record.screen_id.to_string(),
            record.ticket_id.to_string(),
            record.component_name.clone(),
            record.previous_value.clone().unwrap_or_default(),
            record.current_value.clone(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| anyhow::anyhow!("failed to flush csv output: {}", err.error()))?;
    Ok(String::from_utf8(bytes)?)
}

pub fn activity_csv(activity: &DailyActivityResponse) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for bucket in activity.daily_stats.iter() {
        writer.serialize(bucket)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| anyhow::anyhow!("failed to flush csv output: {}", err.error()))?;
    Ok(String::from_utf8(bytes)?)
}
