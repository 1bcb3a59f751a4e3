use chrono::NaiveDate;
use clap::{Args, Subcommand};
use meditrack_core::{Appointment, AppointmentFields, AppointmentStatus};

use super::output::{truncate, OutputFormat};
use super::{confirm, load_list, Layer};

#[derive(Args)]
pub struct AppointmentCommand {
    #[command(subcommand)]
    pub command: AppointmentSubcommand,
}

#[derive(Args, Default)]
pub struct AppointmentArgs {
    /// Patient's name
    #[arg(long)]
    patient_name: Option<String>,

    /// Patient ID (e.g. P001)
    #[arg(long)]
    patient_id: Option<String>,

    /// Doctor's display name
    #[arg(long)]
    doctor: Option<String>,

    /// Date (YYYY-MM-DD)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Time of day (e.g. 09:30)
    #[arg(long)]
    time: Option<String>,

    /// Visit type (Consultation, Checkup, Follow-up, Treatment, Surgery)
    #[arg(long = "type")]
    kind: Option<String>,

    /// Scheduled, Completed, Cancelled or "In Progress"
    #[arg(long)]
    status: Option<AppointmentStatus>,

    /// Free-form notes
    #[arg(long)]
    notes: Option<String>,

    /// Duration (e.g. "30 minutes")
    #[arg(long)]
    duration: Option<String>,
}

impl AppointmentArgs {
    fn to_fields(&self) -> AppointmentFields {
        AppointmentFields {
            patient_name: self.patient_name.clone(),
            patient_id: self.patient_id.clone(),
            doctor: self.doctor.clone(),
            appointment_date: self.date,
            appointment_time: self.time.clone(),
            kind: self.kind.clone(),
            status: self.status,
            notes: self.notes.clone(),
            duration: self.duration.clone(),
        }
    }
}

#[derive(Subcommand)]
pub enum AppointmentSubcommand {
    /// List appointments by date
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Only show appointments whose patient, doctor or type contains this text
        #[arg(long, short)]
        search: Option<String>,

        /// Only show appointments on this date (YYYY-MM-DD)
        #[arg(long, short)]
        date: Option<NaiveDate>,

        /// Maximum number of appointments to fetch
        #[arg(long, short)]
        limit: Option<usize>,
    },

    /// Show an appointment
    Show {
        /// Appointment ID (e.g. A001)
        id: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Schedule an appointment (requires --patient-name, --doctor, --date and --time)
    Create {
        #[command(flatten)]
        fields: AppointmentArgs,
    },

    /// Update an appointment (requires --patient-name)
    Update {
        /// Appointment ID (e.g. A001)
        id: String,

        #[command(flatten)]
        fields: AppointmentArgs,
    },

    /// Cancel and remove an appointment
    Delete {
        /// Appointment ID (e.g. A001)
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

impl AppointmentCommand {
    pub async fn run(&self, layer: &Layer) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            AppointmentSubcommand::List {
                format,
                search,
                date,
                limit,
            } => {
                let screen = load_list::<Appointment>(layer, search.as_deref(), *limit).await;
                let appointments: Vec<&Appointment> = screen
                    .visible()
                    .into_iter()
                    .filter(|a| date.map_or(true, |d| a.is_on(d)))
                    .collect();

                if appointments.is_empty() {
                    println!("No appointments found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&appointments)?);
                    }
                    OutputFormat::Text => {
                        println!(
                            "{:<8}  {:<10}  {:<8}  {:<20}  {:<16}  STATUS",
                            "ID", "DATE", "TIME", "PATIENT", "DOCTOR"
                        );
                        println!("{}", "-".repeat(86));
                        for appt in &appointments {
                            println!(
                                "{:<8}  {:<10}  {:<8}  {:<20}  {:<16}  {}",
                                appt.id,
                                appt.appointment_date,
                                truncate(&appt.appointment_time, 8),
                                truncate(&appt.patient_name, 20),
                                truncate(&appt.doctor, 16),
                                appt.status
                            );
                        }
                        println!("\nTotal: {} appointment(s)", appointments.len());
                    }
                }
                Ok(())
            }

            AppointmentSubcommand::Show { id, format } => {
                match layer.get::<Appointment>(id).await {
                    Some(appt) => {
                        match format {
                            OutputFormat::Json => {
                                println!("{}", serde_json::to_string_pretty(&appt)?);
                            }
                            OutputFormat::Text => {
                                println!("{}", appt);
                            }
                        }
                        Ok(())
                    }
                    None => Err(format!("Appointment not found: {}", id).into()),
                }
            }

            AppointmentSubcommand::Create { fields } => {
                let created: Appointment = layer.create(fields.to_fields()).await?;
                println!("Scheduled appointment:");
                println!("{}", created);
                Ok(())
            }

            AppointmentSubcommand::Update { id, fields } => {
                let updated: Appointment = layer.update(id, fields.to_fields()).await?;
                println!("Updated appointment:");
                println!("{}", updated);
                Ok(())
            }

            AppointmentSubcommand::Delete { id, force } => {
                let label = match layer.get::<Appointment>(id).await {
                    Some(appt) => format!(
                        "{} on {} at {}",
                        appt.patient_name, appt.appointment_date, appt.appointment_time
                    ),
                    None => id.clone(),
                };

                if !force && !confirm(&format!("Delete appointment '{}'?", label))? {
                    println!("Deletion cancelled.");
                    return Ok(());
                }

                layer.delete::<Appointment>(id).await?;
                println!("Deleted appointment: {}", label);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meditrack_core::FileStore;

    #[test]
    fn test_date_and_time_map_to_columns() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let args = AppointmentArgs {
            patient_name: Some("John Smith".into()),
            date: Some(date),
            time: Some("09:30".into()),
            kind: Some("Checkup".into()),
            ..Default::default()
        };

        let value = serde_json::to_value(args.to_fields()).unwrap();
        assert_eq!(value["appointment_date"], "2024-02-01");
        assert_eq!(value["appointment_time"], "09:30");
        assert_eq!(value["type"], "Checkup");
        assert!(value.get("doctor").is_none());
    }

    #[tokio::test]
    async fn test_schedule_offline_assigns_next_id() {
        let temp_dir = tempfile::tempdir().unwrap();
        let layer = Layer::local_only(FileStore::new(temp_dir.path()));
        let before = layer.list::<Appointment>(Default::default()).await.records.len();

        let create = AppointmentCommand {
            command: AppointmentSubcommand::Create {
                fields: AppointmentArgs {
                    patient_name: Some("John Smith".into()),
                    doctor: Some("Dr. Johnson".into()),
                    date: NaiveDate::from_ymd_opt(2024, 2, 1),
                    time: Some("09:30".into()),
                    ..Default::default()
                },
            },
        };
        create.run(&layer).await.unwrap();

        let after = layer
            .list::<Appointment>(Default::default())
            .await
            .records;
        assert_eq!(after.len(), before + 1);
        let created = after
            .iter()
            .find(|a| a.appointment_time == "09:30" && a.patient_name == "John Smith")
            .unwrap();
        assert_eq!(created.status, AppointmentStatus::Scheduled);
        assert!(created.id.starts_with('A'));
    }
}
