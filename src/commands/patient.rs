use chrono::NaiveDate;
use clap::{Args, Subcommand};
use meditrack_core::{Patient, PatientFields, PatientStatus};

use super::output::{truncate, OutputFormat};
use super::{confirm, load_list, Layer};

#[derive(Args)]
pub struct PatientCommand {
    #[command(subcommand)]
    pub command: PatientSubcommand,
}

/// Patient fields settable from the command line
#[derive(Args, Default)]
pub struct PatientArgs {
    /// Full name
    #[arg(long)]
    name: Option<String>,

    /// Age in years
    #[arg(long)]
    age: Option<u32>,

    /// Gender
    #[arg(long)]
    gender: Option<String>,

    /// Phone number
    #[arg(long)]
    phone: Option<String>,

    /// Email address
    #[arg(long)]
    email: Option<String>,

    /// Home address
    #[arg(long)]
    address: Option<String>,

    /// Critical, Normal or Stable
    #[arg(long)]
    status: Option<PatientStatus>,

    /// Medical condition
    #[arg(long)]
    condition: Option<String>,

    /// Admission date (YYYY-MM-DD)
    #[arg(long)]
    admission_date: Option<NaiveDate>,

    /// Attending doctor
    #[arg(long)]
    doctor: Option<String>,

    /// Blood group (e.g. O+)
    #[arg(long)]
    blood_group: Option<String>,

    /// Emergency contact phone
    #[arg(long)]
    emergency_contact: Option<String>,
}

impl PatientArgs {
    fn to_fields(&self) -> PatientFields {
        PatientFields {
            name: self.name.clone(),
            age: self.age,
            gender: self.gender.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            address: self.address.clone(),
            status: self.status,
            condition: self.condition.clone(),
            admission_date: self.admission_date,
            doctor: self.doctor.clone(),
            blood_group: self.blood_group.clone(),
            emergency_contact: self.emergency_contact.clone(),
        }
    }
}

#[derive(Subcommand)]
pub enum PatientSubcommand {
    /// List patients, newest first
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Only show patients whose name, ID or condition contains this text
        #[arg(long, short)]
        search: Option<String>,

        /// Maximum number of patients to fetch
        #[arg(long, short)]
        limit: Option<usize>,
    },

    /// Show a patient's details
    Show {
        /// Patient ID (e.g. P001)
        id: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Register a new patient (requires --name, --age and --gender)
    Create {
        #[command(flatten)]
        fields: PatientArgs,
    },

    /// Update an existing patient (requires --name)
    Update {
        /// Patient ID (e.g. P001)
        id: String,

        #[command(flatten)]
        fields: PatientArgs,
    },

    /// Delete a patient
    Delete {
        /// Patient ID (e.g. P001)
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

impl PatientCommand {
    pub async fn run(&self, layer: &Layer) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            PatientSubcommand::List {
                format,
                search,
                limit,
            } => {
                let screen = load_list::<Patient>(layer, search.as_deref(), *limit).await;
                let patients = screen.visible();

                if patients.is_empty() {
                    println!("No patients found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&patients)?);
                    }
                    OutputFormat::Text => {
                        println!(
                            "{:<8}  {:<24}  {:>3}  {:<8}  CONDITION",
                            "ID", "NAME", "AGE", "STATUS"
                        );
                        println!("{}", "-".repeat(80));
                        for patient in &patients {
                            println!(
                                "{:<8}  {:<24}  {:>3}  {:<8}  {}",
                                patient.id,
                                truncate(&patient.name, 24),
                                patient.age,
                                patient.status,
                                truncate(&patient.condition, 30)
                            );
                        }
                        println!("\nTotal: {} patient(s)", patients.len());
                    }
                }
                Ok(())
            }

            PatientSubcommand::Show { id, format } => match layer.get::<Patient>(id).await {
                Some(patient) => {
                    match format {
                        OutputFormat::Json => {
                            println!("{}", serde_json::to_string_pretty(&patient)?);
                        }
                        OutputFormat::Text => {
                            println!("{}", patient);
                        }
                    }
                    Ok(())
                }
                None => Err(format!("Patient not found: {}", id).into()),
            },

            PatientSubcommand::Create { fields } => {
                let created: Patient = layer.create(fields.to_fields()).await?;
                println!("Created patient:");
                println!("{}", created);
                Ok(())
            }

            PatientSubcommand::Update { id, fields } => {
                let updated: Patient = layer.update(id, fields.to_fields()).await?;
                println!("Updated patient:");
                println!("{}", updated);
                Ok(())
            }

            PatientSubcommand::Delete { id, force } => {
                let label = match layer.get::<Patient>(id).await {
                    Some(patient) => format!("{} ({})", patient.name, patient.id),
                    None => id.clone(),
                };

                // Confirm deletion unless --force is used
                if !force && !confirm(&format!("Delete patient '{}'?", label))? {
                    println!("Deletion cancelled.");
                    return Ok(());
                }

                layer.delete::<Patient>(id).await?;
                println!("Deleted patient: {}", label);
                Ok(())
            }
        }
    }
}
