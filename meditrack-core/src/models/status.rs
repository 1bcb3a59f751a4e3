use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatientStatus {
    Critical,
    #[default]
    Normal,
    Stable,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
    #[serde(rename = "In Progress")]
    InProgress,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportStatus {
    #[default]
    Pending,
    Completed,
    #[serde(rename = "In Review")]
    InReview,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    #[default]
    Normal,
    Urgent,
    Critical,
}

impl PatientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatientStatus::Critical => "Critical",
            PatientStatus::Normal => "Normal",
            PatientStatus::Stable => "Stable",
        }
    }
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "Scheduled",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::Cancelled => "Cancelled",
            AppointmentStatus::InProgress => "In Progress",
        }
    }
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "Pending",
            ReportStatus::Completed => "Completed",
            ReportStatus::InReview => "In Review",
        }
    }
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Normal => "Normal",
            Priority::Urgent => "Urgent",
            Priority::Critical => "Critical",
        }
    }
}

macro_rules! display_and_parse {
    ($ty:ident, [$($variant:ident),+], $options:expr) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_lowercase().replace(['-', '_'], " ");
                $(
                    if $ty::$variant.as_str().to_lowercase() == wanted {
                        return Ok($ty::$variant);
                    }
                )+
                Err(format!(
                    "Invalid {} '{}'. Valid options: {}",
                    stringify!($ty),
                    s,
                    $options
                ))
            }
        }
    };
}

display_and_parse!(
    PatientStatus,
    [Critical, Normal, Stable],
    "Critical, Normal, Stable"
);
display_and_parse!(
    AppointmentStatus,
    [Scheduled, Completed, Cancelled, InProgress],
    "Scheduled, Completed, Cancelled, In Progress"
);
display_and_parse!(
    ReportStatus,
    [Pending, Completed, InReview],
    "Pending, Completed, In Review"
);
display_and_parse!(Priority, [Normal, Urgent, Critical], "Normal, Urgent, Critical");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        assert_eq!(format!("{}", AppointmentStatus::InProgress), "In Progress");
        assert_eq!(format!("{}", ReportStatus::InReview), "In Review");
        assert_eq!(format!("{}", PatientStatus::Stable), "Stable");
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!(
            AppointmentStatus::from_str("in-progress").unwrap(),
            AppointmentStatus::InProgress
        );
        assert_eq!(
            ReportStatus::from_str("IN REVIEW").unwrap(),
            ReportStatus::InReview
        );
        assert_eq!(Priority::from_str("urgent").unwrap(), Priority::Urgent);
        assert!(PatientStatus::from_str("dying").is_err());
    }

    #[test]
    fn test_status_wire_names() {
        let json = serde_json::to_string(&AppointmentStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");

        let parsed: ReportStatus = serde_json::from_str("\"In Review\"").unwrap();
        assert_eq!(parsed, ReportStatus::InReview);
    }
}
