//! Per-entity write policies.

use serde::{Deserialize, Serialize};

use crate::entity::EntityKind;
use crate::ids::IdPolicy;

/// What happens to the local mirror after a successful remote write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AfterWrite {
    /// Re-read the whole table from the remote and mirror it.
    Refetch,
    /// Apply the write to the local mirror without another round-trip.
    PatchCache,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityPolicy {
    pub ids: IdPolicy,
    pub after_write: AfterWrite,
}

impl EntityPolicy {
    pub fn new(ids: IdPolicy, after_write: AfterWrite) -> Self {
        Self { ids, after_write }
    }
}

/// Policies for every entity kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policies {
    patients: EntityPolicy,
    doctors: EntityPolicy,
    appointments: EntityPolicy,
    test_reports: EntityPolicy,
}

impl Default for Policies {
    fn default() -> Self {
        let refetch = EntityPolicy::new(IdPolicy::ClientGenerated, AfterWrite::Refetch);
        Self {
            patients: refetch,
            doctors: EntityPolicy::new(IdPolicy::ClientGenerated, AfterWrite::PatchCache),
            appointments: refetch,
            test_reports: refetch,
        }
    }
}

impl Policies {
    pub fn get(&self, kind: EntityKind) -> EntityPolicy {
        match kind {
            EntityKind::Patients => self.patients,
            EntityKind::Doctors => self.doctors,
            EntityKind::Appointments => self.appointments,
            EntityKind::TestReports => self.test_reports,
        }
    }

    fn slot(&mut self, kind: EntityKind) -> &mut EntityPolicy {
        match kind {
            EntityKind::Patients => &mut self.patients,
            EntityKind::Doctors => &mut self.doctors,
            EntityKind::Appointments => &mut self.appointments,
            EntityKind::TestReports => &mut self.test_reports,
        }
    }

    pub fn with_ids(mut self, kind: EntityKind, ids: IdPolicy) -> Self {
        self.slot(kind).ids = ids;
        self
    }

    pub fn with_after_write(mut self, kind: EntityKind, after_write: AfterWrite) -> Self {
        self.slot(kind).after_write = after_write;
        self
    }

    /// Defaults, with the listed kinds switched to remote-assigned ids.
    pub fn remote_assigned<I: IntoIterator<Item = EntityKind>>(kinds: I) -> Self {
        kinds
            .into_iter()
            .fold(Self::default(), |p, kind| p.with_ids(kind, IdPolicy::RemoteAssigned))
    }
}
