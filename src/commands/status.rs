use clap::Args;
use meditrack_core::{
    Appointment, Doctor, Entity, EntityKind, KeyValueStore, ListQuery, Mode, Patient, RemoteStore,
    TestReport,
};

use super::output::mask_secret;
use super::Layer;
use crate::config::Config;

/// Show data mode, remote reachability and local record counts
#[derive(Args)]
pub struct StatusCommand {}

impl StatusCommand {
    pub async fn run(&self, layer: &Layer, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        println!("MediTrack Status");
        println!("================\n");

        println!("Mode:       {}", layer.mode());
        println!("Data dir:   {}", config.data_dir.value.display());

        match layer.mode() {
            Mode::LocalOnly => {
                println!();
                println!("No remote store configured. To connect one, add to your config file:");
                println!();
                println!("  remote:");
                println!("    url: \"https://your-project.example.co\"");
                println!("    api_key: \"your-anon-key\"");
                println!();
                println!("Or set environment variables:");
                println!("  MEDITRACK_REMOTE_URL");
                println!("  MEDITRACK_REMOTE_KEY");
            }
            Mode::Remote => {
                if let Some(url) = &config.remote.url {
                    println!("Remote:     {}", url);
                }
                if let Some(key) = &config.remote.api_key {
                    println!("API key:    {}", mask_secret(key));
                }

                print!("Reachable:  ");
                if let Some(remote) = layer.remote() {
                    let probe = ListQuery::default().with_limit(1);
                    match remote.select(EntityKind::Patients.table(), &probe).await {
                        Ok(_) => println!("✓ connected"),
                        Err(e) => println!("✗ {}", e),
                    }
                }
            }
        }

        println!("\nIdentifiers");
        for kind in EntityKind::ALL {
            let policy = layer.policies().get(kind);
            let ids = if policy.ids.client_generates_id() {
                format!("client ({}001, ...)", kind.id_prefix())
            } else {
                "remote-assigned".to_string()
            };
            println!("  {:<14} {}", kind.table(), ids);
        }

        println!("\nLocal records");
        print_count::<Patient>(layer);
        print_count::<Doctor>(layer);
        print_count::<Appointment>(layer);
        print_count::<TestReport>(layer);

        Ok(())
    }
}

fn print_count<E: Entity>(layer: &Layer) {
    let written = matches!(
        layer.local().store().get(E::KIND.storage_key()),
        Ok(Some(_))
    );
    if written {
        println!("  {:<14} {}", E::KIND.table(), layer.local().get::<E>().len());
    } else {
        println!("  {:<14} (not yet loaded)", E::KIND.table());
    }
}
