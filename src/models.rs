use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ReportingError;

/// One worker inspection submission, joined with its ticket and the
/// ticket's screen. `screen_id` is `None` when the ticket is orphaned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InspectionReport {
    pub report_id: Uuid,
    pub ticket_id: Uuid,
    pub screen_id: Option<Uuid>,
    pub screen_name: Option<String>,
    pub report_date: NaiveDateTime,
    pub data_cables: Option<String>,
    pub power_cable: Option<String>,
    pub power_supplies: Option<String>,
    pub led_modules: Option<String>,
    pub cooling_systems: Option<String>,
    pub service_lights_sockets: Option<String>,
    pub operating_computers: Option<String>,
    pub software: Option<String>,
    pub power_dbs: Option<String>,
    pub media_converters: Option<String>,
    pub control_systems: Option<String>,
    pub video_processors: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentChangeEvent {
    pub change_date: NaiveDateTime,
    pub component_name: String,
    pub value: String,
    pub ticket_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentChangesSummary {
    pub component_name: String,
    pub total_changes: u64,
    pub changes_per_screen: BTreeMap<Uuid, u64>,
    pub change_type_distribution: BTreeMap<String, u64>,
}

impl ComponentChangesSummary {
    pub fn empty(component_name: impl Into<String>) -> Self {
        Self {
            component_name: component_name.into(),
            total_changes: 0,
            changes_per_screen: BTreeMap::new(),
            change_type_distribution: BTreeMap::new(),
        }
    }
}

/// `previous_value` is always `None`: reports are single snapshots, there is
/// no earlier value to diff against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedChangeRecord {
    pub ticket_id: Uuid,
    pub screen_id: Uuid,
    pub component_name: String,
    pub previous_value: Option<String>,
    pub current_value: String,
    pub change_date: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentHistory {
    pub component_name: String,
    pub total_changes: u64,
    pub changes: Vec<ComponentChangeEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenHistory {
    pub screen_id: Uuid,
    pub screen_name: String,
    pub component_histories: Vec<ComponentHistory>,
    pub total_changes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportType {
    Summary,
    Detailed,
    ComponentSpecific,
}

impl ReportType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Summary => "SUMMARY",
            Self::Detailed => "DETAILED",
            Self::ComponentSpecific => "COMPONENT_SPECIFIC",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportType {
    type Err = ReportingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "SUMMARY" => Ok(Self::Summary),
            "DETAILED" => Ok(Self::Detailed),
            "COMPONENT_SPECIFIC" => Ok(Self::ComponentSpecific),
            _ => Err(ReportingError::UnknownReportType(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub report_type: ReportType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub screen_ids: Vec<Uuid>,
    #[serde(default)]
    pub components: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub report_type: ReportType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub generated_at: NaiveDateTime,
    pub reports_analyzed: usize,
    pub orphaned_reports: usize,
    pub component_summaries: Vec<ComponentChangesSummary>,
    pub detailed_records: Vec<DetailedChangeRecord>,
    pub total_counts: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Users,
    Contracts,
    Tickets,
    Companies,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Users,
        EntityKind::Contracts,
        EntityKind::Tickets,
        EntityKind::Companies,
    ];

    pub fn table(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Contracts => "contracts",
            Self::Tickets => "tickets",
            Self::Companies => "companies",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyActivityBucket {
    pub date: NaiveDate,
    pub users_created: i64,
    pub contracts_created: i64,
    pub tickets_created: i64,
    pub companies_created: i64,
    pub total_activity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyActivityResponse {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub daily_stats: Vec<DailyActivityBucket>,
    pub total_users_created: i64,
    pub total_contracts_created: i64,
    pub total_tickets_created: i64,
    pub total_companies_created: i64,
    pub total_activity: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_parses_from_camel_case_json() {
        let request: ReportRequest = serde_json::from_str(
            r#"{
                "reportType": "COMPONENT_SPECIFIC",
                "startDate": "2024-01-01",
                "endDate": "2024-01-31",
                "components": ["Power Cable"]
            }"#,
        )
        .unwrap();

        assert_eq!(request.report_type, ReportType::ComponentSpecific);
        assert_eq!(request.end_date, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        assert!(request.screen_ids.is_empty());
        assert_eq!(request.components, vec!["Power Cable".to_string()]);
        assert_eq!(
            serde_json::to_string(&request.report_type).unwrap(),
            "\"COMPONENT_SPECIFIC\""
        );
    }

    #[test]
    fn unknown_json_report_type_is_rejected() {
        let parsed = serde_json::from_str::<ReportRequest>(
            r#"{"reportType": "WEEKLY", "startDate": "2024-01-01", "endDate": "2024-01-02"}"#,
        );
        assert!(parsed.is_err());
    }
}
