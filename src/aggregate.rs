use std::collections::BTreeMap;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::checklist::{ChecklistEntry, Component};
use crate::detection::detect;
use crate::models::{
    ComponentChangeEvent, ComponentChangesSummary, ComponentHistory, DetailedChangeRecord,
    InspectionReport, ScreenHistory,
};

pub const OVERALL_TOTAL_KEY: &str = "overallTotal";

/// Resolves requested component names; an empty request means the whole catalog.
pub fn target_entries(components: &[String]) -> Vec<ChecklistEntry> {
    if components.is_empty() {
        return Component::ALL.into_iter().map(ChecklistEntry::Tracked).collect();
    }

    let mut entries: Vec<ChecklistEntry> = Vec::with_capacity(components.len());
    for name in components {
        let entry = ChecklistEntry::resolve(name);
        if entries.contains(&entry) {
            debug!(component = %name, "ignoring repeated component");
            continue;
        }
        if let ChecklistEntry::Untracked(name) = &entry {
            warn!(component = %name, "requested component is not in the checklist catalog");
        }
        entries.push(entry);
    }
    entries
}

fn screened(reports: &[InspectionReport]) -> Vec<(Uuid, &InspectionReport)> {
    let mut resolved: Vec<(Uuid, &InspectionReport)> = reports
        .iter()
        .filter_map(|report| match report.screen_id {
            Some(screen_id) => Some((screen_id, report)),
            None => {
                debug!(report_id = %report.report_id, "skipping report without a screen");
                None
            }
        })
        .collect();

    resolved.sort_by(|a, b| a.1.report_date.cmp(&b.1.report_date));
    resolved
}

/// Counts and logs reports whose ticket has no screen. These never reach
/// any summary, record or history.
pub fn count_orphans(reports: &[InspectionReport]) -> usize {
    let mut orphans = 0usize;
    for report in reports.iter().filter(|report| report.screen_id.is_none()) {
        warn!(
            report_id = %report.report_id,
            ticket_id = %report.ticket_id,
            "excluding report whose ticket has no screen"
        );
        orphans += 1;
    }
    orphans
}

pub fn build_summaries(
    reports: &[InspectionReport],
    components: &[String],
) -> Vec<ComponentChangesSummary> {
    let entries = target_entries(components);
    let mut summaries: Vec<ComponentChangesSummary> = entries
        .iter()
        .map(|entry| ComponentChangesSummary::empty(entry.name()))
        .collect();

    for (screen_id, report) in screened(reports) {
        for (entry, summary) in entries.iter().zip(summaries.iter_mut()) {
            let Some(value) = detect(report, entry) else {
                continue;
            };
            summary.total_changes += 1;
            *summary.changes_per_screen.entry(screen_id).or_insert(0) += 1;
            *summary
                .change_type_distribution
                .entry(value.to_string())
                .or_insert(0) += 1;
        }
    }

    summaries
}

pub fn build_detailed_records(
    reports: &[InspectionReport],
    components: &[String],
) -> Vec<DetailedChangeRecord> {
    let entries = target_entries(components);
    let mut records = Vec::new();

    for (screen_id, report) in screened(reports) {
        for entry in entries.iter() {
            if let Some(value) = detect(report, entry) {
                records.push(DetailedChangeRecord {
                    ticket_id: report.ticket_id,
                    screen_id,
                    component_name: entry.name().to_string(),
                    previous_value: None,
                    current_value: value.to_string(),
                    change_date: report.report_date,
                });
            }
        }
    }

    records
}

pub fn build_screen_history(reports: &[InspectionReport]) -> Vec<ScreenHistory> {
    let mut groups: BTreeMap<Uuid, Vec<&InspectionReport>> = BTreeMap::new();
    for (screen_id, report) in screened(reports) {
        groups.entry(screen_id).or_default().push(report);
    }

    groups
        .into_iter()
        .map(|(screen_id, group)| {
            let screen_name = group
                .first()
                .and_then(|report| report.screen_name.clone())
                .unwrap_or_else(|| format!("Screen {screen_id}"));

            let component_histories: Vec<ComponentHistory> = Component::ALL
                .into_iter()
                .map(|component| {
                    let entry = ChecklistEntry::Tracked(component);
                    let changes: Vec<ComponentChangeEvent> = group
                        .iter()
                        .filter_map(|report| {
                            detect(report, &entry).map(|value| ComponentChangeEvent {
                                change_date: report.report_date,
                                component_name: component.display_name().to_string(),
                                value: value.to_string(),
                                ticket_id: report.ticket_id,
                            })
                        })
                        .collect();
                    ComponentHistory {
                        component_name: component.display_name().to_string(),
                        total_changes: changes.len() as u64,
                        changes,
                    }
                })
                .collect();

            let total_changes = component_histories
                .iter()
                .map(|history| history.total_changes)
                .sum();

            ScreenHistory {
                screen_id,
                screen_name,
                component_histories,
                total_changes,
            }
        })
        .collect()
}

pub fn component_specific(name: &str, reports: &[InspectionReport]) -> ComponentChangesSummary {
    build_summaries(reports, &[name.to_string()])
        .into_iter()
        .next()
        .unwrap_or_else(|| ComponentChangesSummary::empty(name))
}

pub fn total_change_count(reports: &[InspectionReport], components: &[String]) -> u64 {
    build_summaries(reports, components)
        .iter()
        .map(|summary| summary.total_changes)
        .sum()
}

pub fn total_counts(summaries: &[ComponentChangesSummary]) -> BTreeMap<String, u64> {
    let mut totals: BTreeMap<String, u64> = summaries
        .iter()
        .map(|summary| (summary.component_name.clone(), summary.total_changes))
        .collect();
    let overall = summaries.iter().map(|summary| summary.total_changes).sum();
    totals.insert(OVERALL_TOTAL_KEY.to_string(), overall);
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn report(screen_id: Option<Uuid>, date: NaiveDateTime) -> InspectionReport {
        InspectionReport {
            report_id: Uuid::new_v4(),
            ticket_id: Uuid::new_v4(),
            screen_id,
            screen_name: screen_id.map(|_| "Mall Atrium".to_string()),
            report_date: date,
            ..InspectionReport::default()
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn component_specific_counts_only_anomalies() {
        let screen = Uuid::new_v4();
        let mut ok = report(Some(screen), at(1, 9));
        ok.power_cable = Some("OK".to_string());
        let mut frayed = report(Some(screen), at(2, 9));
        frayed.power_cable = Some("Frayed".to_string());

        let summary = component_specific("Power Cable", &[ok, frayed]);
        assert_eq!(summary.component_name, "Power Cable");
        assert_eq!(summary.total_changes, 1);
        assert_eq!(summary.changes_per_screen, BTreeMap::from([(screen, 1)]));
        assert_eq!(
            summary.change_type_distribution,
            BTreeMap::from([("Frayed".to_string(), 1)])
        );
    }

    #[test]
    fn summaries_default_to_full_catalog() {
        let summaries = build_summaries(&[], &[]);
        assert_eq!(summaries.len(), 12);
        assert!(summaries.iter().all(|summary| summary.total_changes == 0));
    }

    #[test]
    fn summary_partitions_agree_with_total() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut reports = Vec::new();
        for (index, (screen, value)) in [
            (a, "Dead pixels"),
            (a, "ok"),
            (b, "Dead pixels"),
            (b, "Loose"),
            (a, ""),
        ]
        .into_iter()
        .enumerate()
        {
            let mut r = report(Some(screen), at(index as u32 + 1, 8));
            r.led_modules = Some(value.to_string());
            reports.push(r);
        }

        let summaries = build_summaries(&reports, &names(&["LED Modules"]));
        let summary = &summaries[0];
        assert_eq!(summary.total_changes, 4);
        assert_eq!(summary.changes_per_screen.values().sum::<u64>(), 4);
        assert_eq!(summary.change_type_distribution.values().sum::<u64>(), 4);
        assert!(!summary.change_type_distribution.contains_key("ok"));
        assert_eq!(summary.change_type_distribution.get("Dead pixels"), Some(&2));
        assert_eq!(summary.change_type_distribution.get(""), Some(&1));
    }

    #[test]
    fn summaries_are_deterministic() {
        let mut r = report(Some(Uuid::new_v4()), at(3, 10));
        r.software = Some("Licence expired".to_string());
        let reports = vec![r, report(Some(Uuid::new_v4()), at(1, 10))];
        assert_eq!(build_summaries(&reports, &[]), build_summaries(&reports, &[]));
    }

    #[test]
    fn orphaned_reports_are_excluded_everywhere() {
        let mut orphan = report(None, at(1, 12));
        orphan.power_supplies = Some("Burnt".to_string());
        let reports = vec![orphan];

        assert_eq!(total_change_count(&reports, &[]), 0);
        assert!(build_detailed_records(&reports, &[]).is_empty());
        assert!(build_screen_history(&reports).is_empty());
        assert_eq!(count_orphans(&reports), 1);
    }

    #[test]
    fn detailed_records_follow_report_order() {
        let screen = Uuid::new_v4();
        let mut late = report(Some(screen), at(9, 9));
        late.video_processors = Some("No signal".to_string());
        let mut early = report(Some(screen), at(2, 9));
        early.video_processors = Some("Overheating".to_string());
        early.software = Some("Outdated".to_string());

        let records = build_detailed_records(&[late, early], &[]);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].change_date, at(2, 9));
        assert_eq!(records[2].current_value, "No signal");
        assert!(records.iter().all(|record| record.previous_value.is_none()));
        assert!(records.iter().all(|record| record.screen_id == screen));
    }

    #[test]
    fn unknown_component_yields_zero_summary() {
        let mut r = report(Some(Uuid::new_v4()), at(1, 9));
        r.software = Some("Crashed".to_string());
        let summary = component_specific("Flux Capacitor", &[r]);
        assert_eq!(summary, ComponentChangesSummary::empty("Flux Capacitor"));
    }

    #[test]
    fn screen_history_groups_and_orders_by_date() {
        let screen = Uuid::new_v4();
        let mut second = report(Some(screen), at(5, 9));
        second.control_systems = Some("Relay stuck".to_string());
        let mut first = report(Some(screen), at(3, 9));
        first.control_systems = Some("Firmware".to_string());
        first.power_dbs = Some("Breaker tripped".to_string());
        let mut unnamed = report(Some(Uuid::new_v4()), at(4, 9));
        unnamed.screen_name = None;

        let histories = build_screen_history(&[second, first, unnamed.clone()]);
        assert_eq!(histories.len(), 2);

        let history = histories
            .iter()
            .find(|history| history.screen_id == screen)
            .unwrap();
        assert_eq!(history.screen_name, "Mall Atrium");
        assert_eq!(history.component_histories.len(), 12);
        assert_eq!(history.total_changes, 3);

        let control = history
            .component_histories
            .iter()
            .find(|h| h.component_name == "Control Systems")
            .unwrap();
        let values: Vec<&str> = control.changes.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, vec!["Firmware", "Relay stuck"]);

        let fallback = histories
            .iter()
            .find(|history| Some(history.screen_id) == unnamed.screen_id)
            .unwrap();
        assert_eq!(fallback.screen_name, format!("Screen {}", fallback.screen_id));
        assert_eq!(fallback.total_changes, 0);
    }

    #[test]
    fn repeated_components_are_counted_once() {
        let mut r = report(Some(Uuid::new_v4()), at(1, 9));
        r.power_cable = Some("Frayed".to_string());
        let reports = vec![r];
        let requested = names(&["Power Cable", "Software", "Power Cable"]);

        let summaries = build_summaries(&reports, &requested);
        assert_eq!(summaries.len(), 2);

        let totals = total_counts(&summaries);
        let per_component: u64 = totals
            .iter()
            .filter(|(name, _)| name.as_str() != OVERALL_TOTAL_KEY)
            .map(|(_, count)| count)
            .sum();
        assert_eq!(totals.get(OVERALL_TOTAL_KEY), Some(&per_component));
        assert_eq!(total_change_count(&reports, &requested), 1);
        assert_eq!(build_detailed_records(&reports, &requested).len(), 1);
    }

    #[test]
    fn total_counts_include_overall() {
        let summaries = vec![
            ComponentChangesSummary {
                total_changes: 2,
                ..ComponentChangesSummary::empty("Software")
            },
            ComponentChangesSummary {
                total_changes: 3,
                ..ComponentChangesSummary::empty("Power DBs")
            },
        ];
        let totals = total_counts(&summaries);
        assert_eq!(totals.get(OVERALL_TOTAL_KEY), Some(&5));
        assert_eq!(totals.get("Software"), Some(&2));
    }
}
