use clap::{Parser, Subcommand};
use meditrack_core::SyncLayer;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::{
    AppointmentCommand, ConfigCommand, DashboardCommand, DoctorCommand, Layer, PatientCommand,
    ReportCommand, StatusCommand,
};
use config::Config;

#[derive(Parser)]
#[command(name = "meditrack")]
#[command(version)]
#[command(about = "Hospital dashboard for patients, doctors, appointments and test reports", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage patients
    Patient(PatientCommand),

    /// Manage doctors
    Doctor(DoctorCommand),

    /// Manage appointments
    Appointment(AppointmentCommand),

    /// Manage test reports
    Report(ReportCommand),

    /// Show the dashboard overview
    Dashboard(DashboardCommand),

    /// Show data mode and local store status
    Status(StatusCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so list output stays pipeable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("MEDITRACK_LOG")
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config_target = cli.config.clone().unwrap_or_else(Config::default_config_path);
    let config = Config::load(cli.config)?;

    let layer = || -> Layer {
        SyncLayer::connect(config.store(), &config.remote, config.policies())
    };

    match cli.command {
        Some(Commands::Patient(cmd)) => cmd.run(&layer()).await?,
        Some(Commands::Doctor(cmd)) => cmd.run(&layer()).await?,
        Some(Commands::Appointment(cmd)) => cmd.run(&layer()).await?,
        Some(Commands::Report(cmd)) => cmd.run(&layer()).await?,
        Some(Commands::Dashboard(cmd)) => cmd.run(&layer()).await?,
        Some(Commands::Status(cmd)) => cmd.run(&layer(), &config).await?,
        Some(Commands::Config(cmd)) => cmd.run(&config, &config_target)?,
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
