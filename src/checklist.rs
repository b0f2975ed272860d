use std::fmt;

use crate::models::InspectionReport;

pub const OK_VALUE: &str = "OK";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Component {
    DataCables,
    PowerCable,
    PowerSupplies,
    LedModules,
    CoolingSystems,
    ServiceLightsSockets,
    OperatingComputers,
    Software,
    PowerDbs,
    MediaConverters,
    ControlSystems,
    VideoProcessors,
}

impl Component {
    pub const ALL: [Component; 12] = [
        Component::DataCables,
        Component::PowerCable,
        Component::PowerSupplies,
        Component::LedModules,
        Component::CoolingSystems,
        Component::ServiceLightsSockets,
        Component::OperatingComputers,
        Component::Software,
        Component::PowerDbs,
        Component::MediaConverters,
        Component::ControlSystems,
        Component::VideoProcessors,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Self::DataCables => "Data Cables (Cat6/RJ45)",
            Self::PowerCable => "Power Cable",
            Self::PowerSupplies => "Power Supplies",
            Self::LedModules => "LED Modules",
            Self::CoolingSystems => "Cooling Systems",
            Self::ServiceLightsSockets => "Service Lights & Sockets",
            Self::OperatingComputers => "Operating Computers",
            Self::Software => "Software",
            Self::PowerDbs => "Power DBs",
            Self::MediaConverters => "Media Converters",
            Self::ControlSystems => "Control Systems",
            Self::VideoProcessors => "Video Processors",
        }
    }

    pub fn from_name(name: &str) -> Option<Component> {
        Self::ALL
            .into_iter()
            .find(|component| component.display_name() == name)
    }

    fn field(self, report: &InspectionReport) -> Option<&str> {
        match self {
            Self::DataCables => report.data_cables.as_deref(),
            Self::PowerCable => report.power_cable.as_deref(),
            Self::PowerSupplies => report.power_supplies.as_deref(),
            Self::LedModules => report.led_modules.as_deref(),
            Self::CoolingSystems => report.cooling_systems.as_deref(),
            Self::ServiceLightsSockets => report.service_lights_sockets.as_deref(),
            Self::OperatingComputers => report.operating_computers.as_deref(),
            Self::Software => report.software.as_deref(),
            Self::PowerDbs => report.power_dbs.as_deref(),
            Self::MediaConverters => report.media_converters.as_deref(),
            Self::ControlSystems => report.control_systems.as_deref(),
            Self::VideoProcessors => report.video_processors.as_deref(),
        }
    }

    // Missing values read as OK.
    pub fn read(self, report: &InspectionReport) -> &str {
        self.field(report).unwrap_or(OK_VALUE)
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

pub fn component_names() -> impl Iterator<Item = &'static str> {
    Component::ALL.into_iter().map(Component::display_name)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChecklistEntry {
    Tracked(Component),
    Untracked(String),
}

impl ChecklistEntry {
    pub fn resolve(name: &str) -> Self {
        match Component::from_name(name) {
            Some(component) => Self::Tracked(component),
            None => Self::Untracked(name.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Tracked(component) => component.display_name(),
            Self::Untracked(name) => name.as_str(),
        }
    }

    pub fn read<'r>(&self, report: &'r InspectionReport) -> &'r str {
        match self {
            Self::Tracked(component) => component.read(report),
            Self::Untracked(_) => OK_VALUE,
        }
    }
}

pub fn value_of<'r>(report: &'r InspectionReport, component_name: &str) -> &'r str {
    ChecklistEntry::resolve(component_name).read(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_twelve_unique_names() {
        let mut names: Vec<&str> = component_names().collect();
        assert_eq!(names.len(), 12);
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 12);
    }

    #[test]
    fn names_round_trip_through_lookup() {
        for component in Component::ALL {
            assert_eq!(Component::from_name(component.display_name()), Some(component));
        }
        assert_eq!(Component::from_name("power cable"), None);
    }

    #[test]
    fn reads_recorded_value_and_defaults_missing_to_ok() {
        let report = InspectionReport {
            led_modules: Some("Dead pixels".to_string()),
            ..InspectionReport::default()
        };
        assert_eq!(value_of(&report, "LED Modules"), "Dead pixels");
        assert_eq!(value_of(&report, "Power Cable"), OK_VALUE);
    }

    #[test]
    fn unknown_names_read_as_ok() {
        let report = InspectionReport {
            software: Some("Crashed".to_string()),
            ..InspectionReport::default()
        };
        assert_eq!(value_of(&report, "Flux Capacitor"), OK_VALUE);
        assert_eq!(
            ChecklistEntry::resolve("Flux Capacitor"),
            ChecklistEntry::Untracked("Flux Capacitor".to_string())
        );
    }
}
