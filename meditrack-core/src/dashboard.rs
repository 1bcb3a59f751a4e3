//! Dashboard overview: recent activity and headline counts.

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::entity::{ListQuery, Order};
use crate::models::{Appointment, Patient, TestReport};
use crate::remote::RemoteStore;
use crate::store::KeyValueStore;
use crate::sync::SyncLayer;

const RECENT_PATIENTS: usize = 5;
const RECENT_APPOINTMENTS: usize = 4;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_patients: usize,
    pub critical_patients: usize,
    pub todays_appointments: usize,
    pub pending_reports: usize,
}

impl DashboardStats {
    /// Counts over whatever lists were fetched. The patient and appointment
    /// lists on the dashboard are capped, so the totals are too.
    pub fn compute(
        patients: &[Patient],
        appointments: &[Appointment],
        reports: &[TestReport],
        today: NaiveDate,
    ) -> Self {
        Self {
            total_patients: patients.len(),
            critical_patients: patients.iter().filter(|p| p.is_critical()).count(),
            todays_appointments: appointments.iter().filter(|a| a.is_on(today)).count(),
            pending_reports: reports.iter().filter(|r| r.is_pending()).count(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub recent_patients: Vec<Patient>,
    pub recent_appointments: Vec<Appointment>,
    pub reports: Vec<TestReport>,
    pub stats: DashboardStats,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl DashboardSummary {
    pub async fn load<S, R>(layer: &SyncLayer<S, R>) -> Self
    where
        S: KeyValueStore,
        R: RemoteStore,
    {
        Self::load_on(layer, Utc::now().date_naive()).await
    }

    /// Loads the summary as of `today`.
    pub async fn load_on<S, R>(layer: &SyncLayer<S, R>, today: NaiveDate) -> Self
    where
        S: KeyValueStore,
        R: RemoteStore,
    {
        let newest = || ListQuery::default().ordered_by(Order::desc("created_at"));

        let patients = layer
            .list::<Patient>(newest().with_limit(RECENT_PATIENTS))
            .await;
        let appointments = layer
            .list::<Appointment>(newest().with_limit(RECENT_APPOINTMENTS))
            .await;
        let reports = layer.list::<TestReport>(newest()).await;

        let warnings = [patients.warning, appointments.warning, reports.warning]
            .into_iter()
            .flatten()
            .collect();

        let stats = DashboardStats::compute(
            &patients.records,
            &appointments.records,
            &reports.records,
            today,
        );

        Self {
            recent_patients: patients.records,
            recent_appointments: appointments.records,
            reports: reports.records,
            stats,
            warnings,
        }
    }
}
