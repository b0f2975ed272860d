use crate::checklist::{ChecklistEntry, OK_VALUE};
use crate::models::InspectionReport;

/// A recorded value counts as a change when it is anything other than a
/// case-insensitive "OK". Blank strings are changes.
pub fn is_anomaly(value: &str) -> bool {
    !value.eq_ignore_ascii_case(OK_VALUE)
}

/// Returns the recorded value when the entry is flagged on this report.
pub fn detect<'r>(report: &'r InspectionReport, entry: &ChecklistEntry) -> Option<&'r str> {
    let value = entry.read(report);
    is_anomaly(value).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checklist::Component;

    #[test]
    fn ok_in_any_case_is_stable() {
        assert!(!is_anomaly("OK"));
        assert!(!is_anomaly("ok"));
        assert!(!is_anomaly("Ok"));
    }

    #[test]
    fn empty_and_defect_values_are_changes() {
        assert!(is_anomaly(""));
        assert!(is_anomaly("Frayed"));
        assert!(is_anomaly(" OK "));
    }

    #[test]
    fn missing_value_is_not_detected() {
        let report = InspectionReport {
            cooling_systems: Some("Fan noisy".to_string()),
            ..InspectionReport::default()
        };
        let cooling = ChecklistEntry::Tracked(Component::CoolingSystems);
        let software = ChecklistEntry::Tracked(Component::Software);
        assert_eq!(detect(&report, &cooling), Some("Fan noisy"));
        assert_eq!(detect(&report, &software), None);
    }
}
