//! Entity kinds and the traits shared by every record type.
//!
//! Each kind owns a remote table, a local storage key, an identifier prefix
//! and a natural list ordering.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A JSON object as exchanged with the stores.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// The four entity types managed by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Patients,
    Doctors,
    Appointments,
    TestReports,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Patients,
        EntityKind::Doctors,
        EntityKind::Appointments,
        EntityKind::TestReports,
    ];

    /// Table name on the remote store.
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Patients => "patients",
            EntityKind::Doctors => "doctors",
            EntityKind::Appointments => "appointments",
            EntityKind::TestReports => "test_reports",
        }
    }

    /// Key of the collection in the local fallback store.
    pub fn storage_key(&self) -> &'static str {
        match self {
            EntityKind::Patients => "meditrack-patients",
            EntityKind::Doctors => "meditrack-doctors",
            EntityKind::Appointments => "meditrack-appointments",
            EntityKind::TestReports => "meditrack-reports",
        }
    }

    /// Single-letter identifier prefix.
    pub fn id_prefix(&self) -> char {
        match self {
            EntityKind::Patients => 'P',
            EntityKind::Doctors => 'D',
            EntityKind::Appointments => 'A',
            EntityKind::TestReports => 'R',
        }
    }

    /// Column and direction used when a caller does not ask for an order.
    pub fn default_order(&self) -> Order {
        match self {
            EntityKind::Patients | EntityKind::Doctors => Order::desc("created_at"),
            EntityKind::Appointments => Order::asc("appointment_date"),
            EntityKind::TestReports => Order::desc("test_date"),
        }
    }

    /// Human readable singular name.
    pub fn singular(&self) -> &'static str {
        match self {
            EntityKind::Patients => "patient",
            EntityKind::Doctors => "doctor",
            EntityKind::Appointments => "appointment",
            EntityKind::TestReports => "test report",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "patients" | "patient" => Ok(EntityKind::Patients),
            "doctors" | "doctor" => Ok(EntityKind::Doctors),
            "appointments" | "appointment" => Ok(EntityKind::Appointments),
            "test_reports" | "reports" | "report" => Ok(EntityKind::TestReports),
            _ => Err(format!(
                "Invalid entity type '{}'. Valid options: patients, doctors, appointments, test_reports",
                s
            )),
        }
    }
}

/// Sort column and direction for list reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

impl Order {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }
}

/// Parameters of a list read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl ListQuery {
    /// Natural order of the kind, no limit.
    pub fn default_for(kind: EntityKind) -> Self {
        Self {
            order: Some(kind.default_order()),
            limit: None,
        }
    }

    pub fn ordered_by(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Partial field set supplied by callers on create and update.
///
/// Unset fields must serialize as absent keys so that a serialized value is
/// directly usable as an update patch.
pub trait EntityFields: Default + Clone + fmt::Debug + Serialize + DeserializeOwned {
    /// Fields that must be present before a create touches any store.
    const REQUIRED_ON_CREATE: &'static [&'static str];
    /// Fields that must be present before an update touches any store.
    const REQUIRED_ON_UPDATE: &'static [&'static str];
}

/// A persisted record type.
pub trait Entity: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync {
    type Fields: EntityFields;

    const KIND: EntityKind;

    fn id(&self) -> &str;

    /// Lowercased text the client-side search filter matches against.
    fn search_text(&self) -> String;

    /// Example records used to seed an empty local store.
    fn fixtures() -> Vec<Self>;
}
