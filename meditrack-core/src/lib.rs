//! MediTrack Core Library
//!
//! Entity models and the data layer behind the MediTrack hospital dashboard:
//! a remote table store, a device-local fallback store, and the layer that
//! routes between them.

pub mod dashboard;
pub mod entity;
pub mod error;
pub mod fixtures;
pub mod ids;
pub mod models;
pub mod remote;
pub mod screen;
pub mod sort;
pub mod store;
pub mod sync;

pub use dashboard::{DashboardStats, DashboardSummary};
pub use entity::{Entity, EntityFields, EntityKind, ListQuery, Order, Record};
pub use error::{RemoteError, StoreError, SyncError, ValidationError};
pub use ids::IdPolicy;
pub use models::{
    Appointment, AppointmentFields, AppointmentStatus, Doctor, DoctorFields, Patient,
    PatientFields, PatientStatus, Priority, ReportStatus, TestReport, TestReportFields,
};
pub use remote::{RemoteSettings, RemoteStore, RestClient};
pub use screen::{LoadTicket, Screen};
pub use store::{FileStore, KeyValueStore, LocalCollections, MemoryStore};
pub use sync::{AfterWrite, EntityPolicy, Listing, ListingSource, Mode, Policies, SyncLayer};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
