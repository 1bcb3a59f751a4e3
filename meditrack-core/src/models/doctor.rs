use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::null_default;
use crate::entity::{Entity, EntityFields, EntityKind};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Doctor {
    pub id: String,
    pub first_name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Doctor {
    pub fn new(
        id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: None,
            phone: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Create/update input for [`Doctor`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DoctorFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl EntityFields for DoctorFields {
    const REQUIRED_ON_CREATE: &'static [&'static str] = &["first_name", "last_name"];
    const REQUIRED_ON_UPDATE: &'static [&'static str] = &["first_name", "last_name"];
}

impl Entity for Doctor {
    type Fields = DoctorFields;

    const KIND: EntityKind = EntityKind::Doctors;

    fn id(&self) -> &str {
        &self.id
    }

    fn search_text(&self) -> String {
        [
            self.id.as_str(),
            self.first_name.as_str(),
            self.last_name.as_str(),
            self.email.as_deref().unwrap_or_default(),
            self.phone.as_deref().unwrap_or_default(),
        ]
        .join(" ")
        .to_lowercase()
    }

    fn fixtures() -> Vec<Self> {
        crate::fixtures::doctors()
    }
}

impl fmt::Display for Doctor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = format!("Dr. {} ({})", self.full_name(), self.id);
        writeln!(f, "{}", title)?;
        writeln!(f, "{}", "=".repeat(title.len()))?;
        writeln!(f, "Email: {}", self.email.as_deref().unwrap_or("-"))?;
        writeln!(f, "Phone: {}", self.phone.as_deref().unwrap_or("-"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doctor_full_name() {
        let doctor = Doctor::new("D001", "Alan", "Johnson");
        assert_eq!(doctor.full_name(), "Alan Johnson");
    }

    #[test]
    fn test_doctor_optional_contact_is_null() {
        let doctor = Doctor::new("D002", "Grace", "Wilson");
        let value = serde_json::to_value(&doctor).unwrap();

        assert!(value["email"].is_null());
        assert!(value.get("created_at").is_none());
    }

    #[test]
    fn test_search_text_includes_contact() {
        let doctor = Doctor::new("D003", "Maria", "Martinez").with_email("M.Martinez@clinic.org");
        assert!(doctor.search_text().contains("m.martinez@clinic.org"));
        assert!(doctor.search_text().contains("d003 maria"));
    }
}
