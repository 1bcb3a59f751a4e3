use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::null_default;
use super::status::{Priority, ReportStatus};
use crate::entity::{Entity, EntityFields, EntityKind};

/// Test types offered by the report form.
pub const TEST_TYPES: [&str; 7] = [
    "Blood Test",
    "X-Ray",
    "CT Scan",
    "MRI",
    "Ultrasound",
    "ECG",
    "Blood Sugar Test",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestReport {
    pub id: String,
    pub patient_name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub patient_id: String,
    pub test_type: String,
    pub test_date: NaiveDate,
    /// Unset until the report is written up.
    #[serde(default)]
    pub report_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "null_default")]
    pub status: ReportStatus,
    #[serde(default, deserialize_with = "null_default")]
    pub doctor: String,
    #[serde(default, deserialize_with = "null_default")]
    pub technician: String,
    #[serde(default, deserialize_with = "null_default")]
    pub results: String,
    #[serde(default, deserialize_with = "null_default")]
    pub notes: String,
    #[serde(default, deserialize_with = "null_default")]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TestReport {
    pub fn new(
        id: impl Into<String>,
        patient_name: impl Into<String>,
        test_type: impl Into<String>,
        test_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            patient_name: patient_name.into(),
            patient_id: String::new(),
            test_type: test_type.into(),
            test_date,
            report_date: None,
            status: ReportStatus::Pending,
            doctor: String::new(),
            technician: String::new(),
            results: String::new(),
            notes: String::new(),
            priority: Priority::Normal,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_status(mut self, status: ReportStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn is_pending(&self) -> bool {
        self.status == ReportStatus::Pending
    }
}

/// Create/update input for [`TestReport`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TestReportFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ReportStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technician: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

impl EntityFields for TestReportFields {
    const REQUIRED_ON_CREATE: &'static [&'static str] = &["patient_name", "test_type", "test_date"];
    const REQUIRED_ON_UPDATE: &'static [&'static str] = &["patient_name"];
}

impl Entity for TestReport {
    type Fields = TestReportFields;

    const KIND: EntityKind = EntityKind::TestReports;

    fn id(&self) -> &str {
        &self.id
    }

    fn search_text(&self) -> String {
        [
            &self.patient_name,
            &self.patient_id,
            &self.test_type,
            &self.doctor,
        ]
        .map(|s| s.to_lowercase())
        .join("\n")
    }

    fn fixtures() -> Vec<Self> {
        crate::fixtures::reports()
    }
}

impl fmt::Display for TestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = format!("{} for {} ({})", self.test_type, self.patient_name, self.id);
        writeln!(f, "{}", title)?;
        writeln!(f, "{}", "=".repeat(title.len()))?;
        writeln!(f, "Status: {}", self.status)?;
        writeln!(f, "Priority: {}", self.priority)?;
        writeln!(f, "Tested: {}", self.test_date)?;
        match self.report_date {
            Some(date) => writeln!(f, "Reported: {}", date)?,
            None => writeln!(f, "Reported: pending")?,
        }
        if !self.doctor.is_empty() {
            writeln!(f, "Doctor: {}", self.doctor)?;
        }
        if !self.technician.is_empty() {
            writeln!(f, "Technician: {}", self.technician)?;
        }
        if !self.results.is_empty() {
            writeln!(f, "\nResults:\n  {}", self.results)?;
        }
        if !self.notes.is_empty() {
            writeln!(f, "\nNotes:\n  {}", self.notes)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_defaults() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let report = TestReport::new("R010", "Emily Davis", "MRI", date);

        assert!(report.is_pending());
        assert_eq!(report.priority, Priority::Normal);
        assert!(report.report_date.is_none());
    }

    #[test]
    fn test_null_report_date_roundtrip() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let report = TestReport::new("R004", "Sarah Wilson", "Ultrasound", date);

        let value = serde_json::to_value(&report).unwrap();
        assert!(value["report_date"].is_null());

        let parsed: TestReport = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn test_display_pending_report() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let report = TestReport::new("R004", "Sarah Wilson", "Ultrasound", date)
            .with_priority(Priority::Urgent);
        let output = format!("{}", report);

        assert!(output.contains("Ultrasound for Sarah Wilson (R004)"));
        assert!(output.contains("Reported: pending"));
        assert!(output.contains("Priority: Urgent"));
    }
}
