//! Record types for the four dashboard entities.

mod appointment;
mod doctor;
mod patient;
mod status;
mod test_report;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Deserializer};

pub use appointment::{Appointment, AppointmentFields, APPOINTMENT_TYPES, DURATIONS};
pub use doctor::{Doctor, DoctorFields};
pub use patient::{Patient, PatientFields};
pub use status::{AppointmentStatus, PatientStatus, Priority, ReportStatus};
pub use test_report::{TestReport, TestReportFields, TEST_TYPES};

/// Hosted tables return `null` for unset text columns; read those as the default.
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Like [`null_default`], for dates that default to today.
fn null_today<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<NaiveDate>::deserialize(deserializer)?.unwrap_or_else(today))
}
