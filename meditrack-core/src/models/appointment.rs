use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::null_default;
use super::status::AppointmentStatus;
use crate::entity::{Entity, EntityFields, EntityKind};

/// Visit types offered by the scheduling form.
pub const APPOINTMENT_TYPES: [&str; 5] = [
    "Consultation",
    "Checkup",
    "Follow-up",
    "Treatment",
    "Surgery",
];

/// Durations offered by the scheduling form.
pub const DURATIONS: [&str; 5] = [
    "15 minutes",
    "30 minutes",
    "45 minutes",
    "60 minutes",
    "90 minutes",
];

fn default_duration() -> String {
    DURATIONS[1].to_string()
}

fn null_duration<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_duration))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: String,
    pub patient_name: String,
    /// Denormalized, never checked against the patients collection.
    #[serde(default, deserialize_with = "null_default")]
    pub patient_id: String,
    pub doctor: String,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    #[serde(rename = "type", default, deserialize_with = "null_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_default")]
    pub status: AppointmentStatus,
    #[serde(default, deserialize_with = "null_default")]
    pub notes: String,
    #[serde(default = "default_duration", deserialize_with = "null_duration")]
    pub duration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Appointment {
    pub fn new(
        id: impl Into<String>,
        patient_name: impl Into<String>,
        doctor: impl Into<String>,
        date: NaiveDate,
        time: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            patient_name: patient_name.into(),
            patient_id: String::new(),
            doctor: doctor.into(),
            appointment_date: date,
            appointment_time: time.into(),
            kind: String::new(),
            status: AppointmentStatus::Scheduled,
            notes: String::new(),
            duration: default_duration(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_patient_id(mut self, patient_id: impl Into<String>) -> Self {
        self.patient_id = patient_id.into();
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_status(mut self, status: AppointmentStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = duration.into();
        self
    }

    pub fn is_on(&self, date: NaiveDate) -> bool {
        self.appointment_date == date
    }
}

/// Create/update input for [`Appointment`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppointmentFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_time: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl EntityFields for AppointmentFields {
    const REQUIRED_ON_CREATE: &'static [&'static str] = &[
        "patient_name",
        "doctor",
        "appointment_date",
        "appointment_time",
    ];
    const REQUIRED_ON_UPDATE: &'static [&'static str] = &["patient_name"];
}

impl Entity for Appointment {
    type Fields = AppointmentFields;

    const KIND: EntityKind = EntityKind::Appointments;

    fn id(&self) -> &str {
        &self.id
    }

    fn search_text(&self) -> String {
        [&self.patient_name, &self.patient_id, &self.doctor, &self.kind]
            .map(|s| s.to_lowercase())
            .join("\n")
    }

    fn fixtures() -> Vec<Self> {
        crate::fixtures::appointments()
    }
}

impl fmt::Display for Appointment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = format!("Appointment {}", self.id);
        writeln!(f, "{}", title)?;
        writeln!(f, "{}", "=".repeat(title.len()))?;
        if self.patient_id.is_empty() {
            writeln!(f, "Patient: {}", self.patient_name)?;
        } else {
            writeln!(f, "Patient: {} ({})", self.patient_name, self.patient_id)?;
        }
        writeln!(f, "Doctor: {}", self.doctor)?;
        writeln!(
            f,
            "When: {} {} ({})",
            self.appointment_date, self.appointment_time, self.duration
        )?;
        if !self.kind.is_empty() {
            writeln!(f, "Type: {}", self.kind)?;
        }
        writeln!(f, "Status: {}", self.status)?;
        if !self.notes.is_empty() {
            writeln!(f, "\nNotes: {}", self.notes)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn test_appointment_defaults() {
        let appt = Appointment::new("A001", "John Smith", "Dr. Johnson", jan(16), "09:00");
        assert_eq!(appt.status, AppointmentStatus::Scheduled);
        assert_eq!(appt.duration, "30 minutes");
        assert!(appt.is_on(jan(16)));
        assert!(!appt.is_on(jan(17)));
    }

    #[test]
    fn test_type_column_name() {
        let appt = Appointment::new("A001", "John Smith", "Dr. Johnson", jan(16), "09:00")
            .with_kind("Checkup");
        let value = serde_json::to_value(&appt).unwrap();
        assert_eq!(value["type"], "Checkup");

        let parsed: Appointment = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.kind, "Checkup");
    }

    #[test]
    fn test_null_duration_defaults() {
        let json = r#"{
            "id": "A010",
            "patient_name": "Emily Davis",
            "doctor": "Dr. Wilson",
            "appointment_date": "2024-01-18",
            "appointment_time": "10:30",
            "duration": null
        }"#;
        let appt: Appointment = serde_json::from_str(json).unwrap();
        assert_eq!(appt.duration, "30 minutes");
    }

    #[test]
    fn test_missing_duration_defaults() {
        let json = r#"{
            "id": "A009",
            "patient_name": "Emily Davis",
            "doctor": "Dr. Wilson",
            "appointment_date": "2024-01-18",
            "appointment_time": "10:30:00",
            "status": "In Progress"
        }"#;
        let appt: Appointment = serde_json::from_str(json).unwrap();
        assert_eq!(appt.duration, "30 minutes");
        assert_eq!(appt.status, AppointmentStatus::InProgress);
    }
}
