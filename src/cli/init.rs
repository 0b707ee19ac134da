//! flow init command implementation.

use std::path::PathBuf;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::storage::JsonFileStore;

pub struct InitOptions {
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(serde::Serialize)]
struct InitOutput {
    config_path: String,
    data_dir: String,
    config_created: bool,
}

/// Write a default config (if none exists) and seed the local data
/// directory with the starter task and category collections.
pub fn run(options: InitOptions) -> Result<()> {
    let config_path = match options.config.clone() {
        Some(path) => path,
        None => Config::default_path().ok_or_else(|| {
            Error::InvalidConfig("could not resolve a config directory".to_string())
        })?,
    };

    let config_created = if config_path.exists() {
        false
    } else {
        Config::default().write_to(&config_path)?;
        true
    };

    let config = Config::load(Some(&config_path))?;
    let data_dir = config.data_dir(options.data_dir.as_deref())?;
    JsonFileStore::new(&data_dir).init().map_err(|err| {
        Error::Persistence(format!("cannot seed {}: {err}", data_dir.display()))
    })?;

    let mut human = HumanOutput::new("Initialized");
    human.push_summary("Config", config_path.display().to_string());
    human.push_summary("Data dir", data_dir.display().to_string());
    if !config_created {
        human.push_detail("existing config left in place".to_string());
    }
    human.push_next_step("flow task list".to_string());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "init",
        &InitOutput {
            config_path: config_path.display().to_string(),
            data_dir: data_dir.display().to_string(),
            config_created,
        },
        Some(&human),
    )
}
