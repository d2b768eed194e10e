//! Config command: show or create the configuration file

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::super::output::color;
use super::super::utils::load_config;
use super::super::GlobalOpts;
use crate::Config;

/// Show or create the configuration file
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// What to do.
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Write the defaults to the config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn target_path(globals: &GlobalOpts) -> Result<PathBuf, String> {
    globals
        .config
        .clone()
        .or_else(Config::default_path)
        .ok_or_else(|| "no config directory on this platform; pass --config".to_string())
}

/// Run the config command.
pub fn run(args: ConfigArgs, globals: &GlobalOpts) -> Result<(), String> {
    match args.action {
        ConfigAction::Show => {
            let config = load_config(globals.config.as_deref())?;
            print!("{}", config.to_toml().map_err(|e| e.to_string())?);
        }
        ConfigAction::Init { force } => {
            let path = target_path(globals)?;
            if path.exists() && !force {
                return Err(format!("{} already exists (use --force to overwrite)", path.display()));
            }
            Config::default().save(&path).map_err(|e| e.to_string())?;
            println!("{} wrote {}", color("32", "ok:"), path.display());
        }
    }
    Ok(())
}
