use clap::{Args, Subcommand};
use meditrack_core::{Doctor, DoctorFields};

use super::output::{truncate, OutputFormat};
use super::{confirm, load_list, Layer};

#[derive(Args)]
pub struct DoctorCommand {
    #[command(subcommand)]
    pub command: DoctorSubcommand,
}

#[derive(Args, Default)]
pub struct DoctorArgs {
    /// First name
    #[arg(long)]
    first_name: Option<String>,

    /// Last name
    #[arg(long)]
    last_name: Option<String>,

    /// Email address
    #[arg(long)]
    email: Option<String>,

    /// Phone number
    #[arg(long)]
    phone: Option<String>,
}

impl DoctorArgs {
    fn to_fields(&self) -> DoctorFields {
        DoctorFields {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }
}

#[derive(Subcommand)]
pub enum DoctorSubcommand {
    /// List doctors by first name
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Only show doctors whose name, ID or contact details contain this text
        #[arg(long, short)]
        search: Option<String>,

        /// Maximum number of doctors to fetch
        #[arg(long, short)]
        limit: Option<usize>,
    },

    /// Show a doctor's details
    Show {
        /// Doctor ID (e.g. D001)
        id: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Add a doctor (requires --first-name and --last-name)
    Create {
        #[command(flatten)]
        fields: DoctorArgs,
    },

    /// Update a doctor (requires --first-name and --last-name)
    Update {
        /// Doctor ID (e.g. D001)
        id: String,

        #[command(flatten)]
        fields: DoctorArgs,
    },

    /// Remove a doctor
    Delete {
        /// Doctor ID (e.g. D001)
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

impl DoctorCommand {
    pub async fn run(&self, layer: &Layer) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            DoctorSubcommand::List {
                format,
                search,
                limit,
            } => {
                let screen = load_list::<Doctor>(layer, search.as_deref(), *limit).await;
                let doctors = screen.visible();

                if doctors.is_empty() {
                    println!("No doctors found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&doctors)?);
                    }
                    OutputFormat::Text => {
                        println!("{:<8}  {:<28}  {:<30}  PHONE", "ID", "NAME", "EMAIL");
                        println!("{}", "-".repeat(84));
                        for doctor in &doctors {
                            println!(
                                "{:<8}  {:<28}  {:<30}  {}",
                                doctor.id,
                                truncate(&doctor.full_name(), 28),
                                truncate(doctor.email.as_deref().unwrap_or("-"), 30),
                                doctor.phone.as_deref().unwrap_or("-")
                            );
                        }
                        println!("\nTotal: {} doctor(s)", doctors.len());
                    }
                }
                Ok(())
            }

            DoctorSubcommand::Show { id, format } => match layer.get::<Doctor>(id).await {
                Some(doctor) => {
                    match format {
                        OutputFormat::Json => {
                            println!("{}", serde_json::to_string_pretty(&doctor)?);
                        }
                        OutputFormat::Text => {
                            println!("{}", doctor);
                        }
                    }
                    Ok(())
                }
                None => Err(format!("Doctor not found: {}", id).into()),
            },

            DoctorSubcommand::Create { fields } => {
                let created: Doctor = layer.create(fields.to_fields()).await?;
                println!("Added doctor:");
                println!("{}", created);
                Ok(())
            }

            DoctorSubcommand::Update { id, fields } => {
                let updated: Doctor = layer.update(id, fields.to_fields()).await?;
                println!("Updated doctor:");
                println!("{}", updated);
                Ok(())
            }

            DoctorSubcommand::Delete { id, force } => {
                let label = match layer.get::<Doctor>(id).await {
                    Some(doctor) => format!("Dr. {} ({})", doctor.full_name(), doctor.id),
                    None => id.clone(),
                };

                if !force && !confirm(&format!("Remove doctor '{}'?", label))? {
                    println!("Deletion cancelled.");
                    return Ok(());
                }

                layer.delete::<Doctor>(id).await?;
                println!("Removed doctor: {}", label);
                Ok(())
            }
        }
    }
}
