use std::path::Path;

use clap::{Args, Subcommand};
use meditrack_core::{AfterWrite, EntityKind};

use super::output::{mask_secret, OutputFormat};
use crate::config::Config;

const TEMPLATE: &str = "\
# MediTrack configuration

# Where the local fallback store keeps its files.
# Relative paths resolve against this file's directory.
# data_dir: ~/.local/share/meditrack

# Remote table store. Both values are needed, otherwise MediTrack
# runs in demo mode and keeps data on this device only.
# MEDITRACK_REMOTE_URL and MEDITRACK_REMOTE_KEY override these.
remote:
  url:
  api_key:

# Tables whose ids the remote store assigns (patients, doctors,
# appointments, test_reports). Others get P001-style ids.
remote_assigned_ids: []

# How the local copy follows a remote write, per table: refetch
# (read the table again) or patch_cache (apply the change in place).
# Doctors default to patch_cache, everything else to refetch.
# after_write:
#   doctors: patch_cache
";

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Write a commented config file
    Init {
        /// Overwrite an existing file
        #[arg(long, short)]
        force: bool,
    },
}

impl ConfigCommand {
    /// `target` is where `init` writes; `show` reports what was loaded.
    pub fn run(&self, config: &Config, target: &Path) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        let mut value = serde_json::to_value(config)?;
                        if let Some(key) = config.remote.api_key.as_deref() {
                            value["remote"]["api_key"] = mask_secret(key).into();
                        }
                        println!("{}", serde_json::to_string_pretty(&value)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        if let Some(path) = &config.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            println!("Config file: {} (not found)", target.display());
                        }
                        println!();

                        println!("data_dir: {}", config.data_dir.value.display());
                        println!("  source: {}", config.data_dir.source);
                        println!();

                        println!(
                            "remote.url: {}",
                            config.remote.url.as_deref().unwrap_or("(not set)")
                        );
                        println!(
                            "remote.api_key: {}",
                            config
                                .remote
                                .api_key
                                .as_deref()
                                .map(mask_secret)
                                .unwrap_or_else(|| "(not set)".to_string())
                        );
                        println!();

                        let kinds: Vec<&str> = config
                            .remote_assigned_ids
                            .iter()
                            .map(EntityKind::table)
                            .collect();
                        if kinds.is_empty() {
                            println!("remote_assigned_ids: (none)");
                        } else {
                            println!("remote_assigned_ids: {}", kinds.join(", "));
                        }

                        let policies = config.policies();
                        println!("after_write:");
                        for kind in EntityKind::ALL {
                            let after_write = match policies.get(kind).after_write {
                                AfterWrite::Refetch => "refetch",
                                AfterWrite::PatchCache => "patch_cache",
                            };
                            println!("  {}: {}", kind.table(), after_write);
                        }
                    }
                }
                Ok(())
            }

            ConfigSubcommand::Init { force } => {
                write_template(target, *force)?;
                println!("Wrote {}", target.display());
                Ok(())
            }
        }
    }
}

fn write_template(path: &Path, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() && !force {
        return Err(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )
        .into());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, TEMPLATE)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_loads_as_demo_mode() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.yaml");

        write_template(&path, false).unwrap();

        let config = Config::load(Some(path.clone())).unwrap();
        assert_eq!(config.config_file, Some(path));
        assert!(config.remote_assigned_ids.is_empty());
        assert!(config.after_write.is_empty());
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(&path, "data_dir: /keep\n").unwrap();

        assert!(write_template(&path, false).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "data_dir: /keep\n");

        write_template(&path, true).unwrap();
        assert!(std::fs::read_to_string(&path)
            .unwrap()
            .contains("remote_assigned_ids"));
    }
}
