use chrono::NaiveDate;
use clap::{Args, Subcommand};
use meditrack_core::{Priority, ReportStatus, TestReport, TestReportFields};

use super::output::{truncate, OutputFormat};
use super::{confirm, load_list, Layer};

#[derive(Args)]
pub struct ReportCommand {
    #[command(subcommand)]
    pub command: ReportSubcommand,
}

#[derive(Args, Default)]
pub struct ReportArgs {
    /// Patient's name
    #[arg(long)]
    patient_name: Option<String>,

    /// Patient ID (e.g. P001)
    #[arg(long)]
    patient_id: Option<String>,

    /// Test type (e.g. "Blood Test", MRI)
    #[arg(long)]
    test_type: Option<String>,

    /// Date the test was taken (YYYY-MM-DD)
    #[arg(long)]
    test_date: Option<NaiveDate>,

    /// Date the report was written (YYYY-MM-DD)
    #[arg(long)]
    report_date: Option<NaiveDate>,

    /// Pending, Completed or "In Review"
    #[arg(long)]
    status: Option<ReportStatus>,

    /// Requesting doctor
    #[arg(long)]
    doctor: Option<String>,

    /// Technician who ran the test
    #[arg(long)]
    technician: Option<String>,

    /// Findings
    #[arg(long)]
    results: Option<String>,

    /// Free-form notes
    #[arg(long)]
    notes: Option<String>,

    /// Normal, Urgent or Critical
    #[arg(long)]
    priority: Option<Priority>,
}

impl ReportArgs {
    fn to_fields(&self) -> TestReportFields {
        TestReportFields {
            patient_name: self.patient_name.clone(),
            patient_id: self.patient_id.clone(),
            test_type: self.test_type.clone(),
            test_date: self.test_date,
            report_date: self.report_date,
            status: self.status,
            doctor: self.doctor.clone(),
            technician: self.technician.clone(),
            results: self.results.clone(),
            notes: self.notes.clone(),
            priority: self.priority,
        }
    }
}

#[derive(Subcommand)]
pub enum ReportSubcommand {
    /// List test reports, newest first
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Only show reports whose patient, test type or doctor contains this text
        #[arg(long, short)]
        search: Option<String>,

        /// Only show reports with this status
        #[arg(long)]
        status: Option<ReportStatus>,

        /// Maximum number of reports to fetch
        #[arg(long, short)]
        limit: Option<usize>,
    },

    /// Show a test report
    Show {
        /// Report ID (e.g. R001)
        id: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// File a test report (requires --patient-name, --test-type and --test-date)
    Create {
        #[command(flatten)]
        fields: ReportArgs,
    },

    /// Update a test report (requires --patient-name)
    Update {
        /// Report ID (e.g. R001)
        id: String,

        #[command(flatten)]
        fields: ReportArgs,
    },

    /// Delete a test report
    Delete {
        /// Report ID (e.g. R001)
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

impl ReportCommand {
    pub async fn run(&self, layer: &Layer) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ReportSubcommand::List {
                format,
                search,
                status,
                limit,
            } => {
                let screen = load_list::<TestReport>(layer, search.as_deref(), *limit).await;
                let reports: Vec<&TestReport> = screen
                    .visible()
                    .into_iter()
                    .filter(|r| status.map_or(true, |s| r.status == s))
                    .collect();

                if reports.is_empty() {
                    println!("No test reports found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&reports)?);
                    }
                    OutputFormat::Text => {
                        println!(
                            "{:<8}  {:<20}  {:<18}  {:<10}  {:<9}  PRIORITY",
                            "ID", "PATIENT", "TEST", "DATE", "STATUS"
                        );
                        println!("{}", "-".repeat(86));
                        for report in &reports {
                            println!(
                                "{:<8}  {:<20}  {:<18}  {:<10}  {:<9}  {}",
                                report.id,
                                truncate(&report.patient_name, 20),
                                truncate(&report.test_type, 18),
                                report.test_date,
                                report.status,
                                report.priority
                            );
                        }
                        println!("\nTotal: {} report(s)", reports.len());
                    }
                }
                Ok(())
            }

            ReportSubcommand::Show { id, format } => match layer.get::<TestReport>(id).await {
                Some(report) => {
                    match format {
                        OutputFormat::Json => {
                            println!("{}", serde_json::to_string_pretty(&report)?);
                        }
                        OutputFormat::Text => {
                            println!("{}", report);
                        }
                    }
                    Ok(())
                }
                None => Err(format!("Test report not found: {}", id).into()),
            },

            ReportSubcommand::Create { fields } => {
                let created: TestReport = layer.create(fields.to_fields()).await?;
                println!("Filed test report:");
                println!("{}", created);
                Ok(())
            }

            ReportSubcommand::Update { id, fields } => {
                let updated: TestReport = layer.update(id, fields.to_fields()).await?;
                println!("Updated test report:");
                println!("{}", updated);
                Ok(())
            }

            ReportSubcommand::Delete { id, force } => {
                let label = match layer.get::<TestReport>(id).await {
                    Some(report) => format!("{} for {}", report.test_type, report.patient_name),
                    None => id.clone(),
                };

                if !force && !confirm(&format!("Delete test report '{}'?", label))? {
                    println!("Deletion cancelled.");
                    return Ok(());
                }

                layer.delete::<TestReport>(id).await?;
                println!("Deleted test report: {}", label);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meditrack_core::FileStore;

    #[tokio::test]
    async fn test_complete_pending_report() {
        let temp_dir = tempfile::tempdir().unwrap();
        let layer = Layer::local_only(FileStore::new(temp_dir.path()));

        let update = ReportCommand {
            command: ReportSubcommand::Update {
                id: "R004".into(),
                fields: ReportArgs {
                    patient_name: Some("Sarah Wilson".into()),
                    status: Some(ReportStatus::Completed),
                    report_date: NaiveDate::from_ymd_opt(2024, 1, 17),
                    results: Some("No abnormalities".into()),
                    ..Default::default()
                },
            },
        };
        update.run(&layer).await.unwrap();

        let report = layer.get::<TestReport>("R004").await.unwrap();
        assert_eq!(report.status, ReportStatus::Completed);
        assert_eq!(report.results, "No abnormalities");
        assert_eq!(report.test_type, "Ultrasound");
        assert_eq!(report.report_date, NaiveDate::from_ymd_opt(2024, 1, 17));
    }

    #[tokio::test]
    async fn test_update_unknown_report_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let layer = Layer::local_only(FileStore::new(temp_dir.path()));

        let update = ReportCommand {
            command: ReportSubcommand::Update {
                id: "R999".into(),
                fields: ReportArgs {
                    patient_name: Some("Nobody".into()),
                    ..Default::default()
                },
            },
        };
        let err = update.run(&layer).await.unwrap_err();
        assert_eq!(err.to_string(), "No test report with id 'R999'");
    }
}
