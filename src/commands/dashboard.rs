use clap::Args;
use meditrack_core::{DashboardSummary, Mode};

use super::output::{truncate, OutputFormat};
use super::Layer;

/// Headline counts plus the most recent patients and appointments
#[derive(Args)]
pub struct DashboardCommand {
    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl DashboardCommand {
    pub async fn run(&self, layer: &Layer) -> Result<(), Box<dyn std::error::Error>> {
        let summary = DashboardSummary::load(layer).await;

        if layer.mode() == Mode::LocalOnly {
            eprintln!("Demo mode: no remote store configured, data is kept on this device only.");
        }
        for warning in &summary.warnings {
            eprintln!("Warning: {}", warning);
        }

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
            OutputFormat::Text => print_summary(&summary),
        }
        Ok(())
    }
}

fn print_summary(summary: &DashboardSummary) {
    let stats = &summary.stats;
    println!("MediTrack Dashboard");
    println!("===================\n");
    println!("Patients:              {}", stats.total_patients);
    println!("Critical patients:     {}", stats.critical_patients);
    println!("Today's appointments:  {}", stats.todays_appointments);
    println!("Pending reports:       {}", stats.pending_reports);

    println!("\nRecent Patients");
    println!("{}", "-".repeat(60));
    if summary.recent_patients.is_empty() {
        println!("  (none)");
    }
    for patient in &summary.recent_patients {
        println!(
            "  {:<6}  {:<24}  {:<8}  {}",
            patient.id,
            truncate(&patient.name, 24),
            patient.status,
            truncate(&patient.condition, 20)
        );
    }

    println!("\nUpcoming Appointments");
    println!("{}", "-".repeat(60));
    if summary.recent_appointments.is_empty() {
        println!("  (none)");
    }
    for appt in &summary.recent_appointments {
        println!(
            "  {:<10}  {:<8}  {:<20}  {}",
            appt.appointment_date,
            truncate(&appt.appointment_time, 8),
            truncate(&appt.patient_name, 20),
            appt.doctor
        );
    }
}
