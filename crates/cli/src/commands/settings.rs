//! Settings commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::PathBuf;

use n1_core::{SettingsStore, DEFAULT_SETTINGS_PATH};

/// Arguments for the settings command.
#[derive(Args, Debug, Clone)]
pub struct SettingsArgs {
    /// Settings document
    #[arg(long, global = true, env = "N1_SETTINGS", default_value = DEFAULT_SETTINGS_PATH)]
    pub settings: PathBuf,

    #[command(subcommand)]
    pub action: SettingsAction,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SettingsAction {
    /// Print the effective settings as JSON
    Show {
        /// Fail instead of falling back to defaults on an invalid document
        #[arg(long)]
        strict: bool,
    },
    /// Override one setting and save the document
    Set {
        /// One of min_baseline_days, min_intervention_days, min_data_points, max_safe_metrics
        key: String,
        value: u32,
    },
}

/// Runs the settings command.
pub fn run_settings(args: SettingsArgs) -> Result<()> {
    let store = SettingsStore::new(&args.settings);

    match args.action {
        SettingsAction::Show { strict } => {
            let settings = if strict {
                store.load_strict()?
            } else {
                store.load()
            };
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        SettingsAction::Set { key, value } => {
            let mut settings = store.load();
            settings.set(&key, value)?;
            store.save(&settings)?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
    }
    Ok(())
}
