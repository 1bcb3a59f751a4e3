use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::status::PatientStatus;
use super::{null_default, null_today, today};
use crate::entity::{Entity, EntityFields, EntityKind};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub age: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub gender: String,
    #[serde(default, deserialize_with = "null_default")]
    pub phone: String,
    #[serde(default, deserialize_with = "null_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_default")]
    pub address: String,
    #[serde(default, deserialize_with = "null_default")]
    pub status: PatientStatus,
    #[serde(default, deserialize_with = "null_default")]
    pub condition: String,
    #[serde(default = "today", deserialize_with = "null_today")]
    pub admission_date: NaiveDate,
    /// Attending doctor's display name, not a reference to a Doctor record.
    #[serde(default, deserialize_with = "null_default")]
    pub doctor: String,
    #[serde(default, deserialize_with = "null_default")]
    pub blood_group: String,
    #[serde(default, deserialize_with = "null_default")]
    pub emergency_contact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Patient {
    pub fn new(id: impl Into<String>, name: impl Into<String>, age: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            age,
            gender: String::new(),
            phone: String::new(),
            email: String::new(),
            address: String::new(),
            status: PatientStatus::Normal,
            condition: String::new(),
            admission_date: today(),
            doctor: String::new(),
            blood_group: String::new(),
            emergency_contact: String::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = gender.into();
        self
    }

    pub fn with_status(mut self, status: PatientStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = condition.into();
        self
    }

    pub fn with_doctor(mut self, doctor: impl Into<String>) -> Self {
        self.doctor = doctor.into();
        self
    }

    pub fn is_critical(&self) -> bool {
        self.status == PatientStatus::Critical
    }
}

/// Create/update input for [`Patient`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PatientFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PatientStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admission_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<String>,
}

impl EntityFields for PatientFields {
    const REQUIRED_ON_CREATE: &'static [&'static str] = &["name", "age", "gender"];
    const REQUIRED_ON_UPDATE: &'static [&'static str] = &["name"];
}

impl Entity for Patient {
    type Fields = PatientFields;

    const KIND: EntityKind = EntityKind::Patients;

    fn id(&self) -> &str {
        &self.id
    }

    fn search_text(&self) -> String {
        [&self.name, &self.id, &self.condition]
            .map(|s| s.to_lowercase())
            .join("\n")
    }

    fn fixtures() -> Vec<Self> {
        crate::fixtures::patients()
    }
}

impl fmt::Display for Patient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = format!("{} ({})", self.name, self.id);
        writeln!(f, "{}", title)?;
        writeln!(f, "{}", "=".repeat(title.len()))?;
        writeln!(f, "Status: {}", self.status)?;
        writeln!(f, "Age: {}", self.age)?;
        if !self.gender.is_empty() {
            writeln!(f, "Gender: {}", self.gender)?;
        }
        if !self.blood_group.is_empty() {
            writeln!(f, "Blood group: {}", self.blood_group)?;
        }
        if !self.condition.is_empty() {
            writeln!(f, "Condition: {}", self.condition)?;
        }
        writeln!(f, "Admitted: {}", self.admission_date)?;
        if !self.doctor.is_empty() {
            writeln!(f, "Doctor: {}", self.doctor)?;
        }

        let contact: Vec<&str> = [&self.phone, &self.email, &self.address]
            .into_iter()
            .filter(|s| !s.is_empty())
            .map(String::as_str)
            .collect();
        if !contact.is_empty() {
            writeln!(f, "\nContact:")?;
            for line in contact {
                writeln!(f, "  {}", line)?;
            }
        }
        if !self.emergency_contact.is_empty() {
            writeln!(f, "Emergency contact: {}", self.emergency_contact)?;
        }

        Ok(())
    }
}
