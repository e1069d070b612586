// Copyright 2026 Hybrid Mount Developers
// SPDX-License-Identifier: GPL-3.0-or-later
mod conf;
mod core;
mod defs;
mod sys;
mod utils;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use conf::{
    cli::{Action, Cli},
    cli_handlers,
    config::Config,
};
use mimalloc::MiMalloc;

use crate::{
    core::MountEngine,
    sys::{mount::SysMounter, probe::SuperblockProbe},
};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn load_config(cli: &Cli) -> Result<Config> {
    if let Some(config_path) = &cli.config {
        return Config::from_file(config_path).with_context(|| {
            format!(
                "Failed to load config from custom path: {}",
                config_path.display()
            )
        });
    }

    match Config::load_default() {
        Ok(config) => Ok(config),
        Err(e) => {
            let is_not_found = e
                .root_cause()
                .downcast_ref::<std::io::Error>()
                .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                .unwrap_or(false);

            if is_not_found {
                Ok(Config::default())
            } else {
                Err(e).context(format!(
                    "Failed to load default config from {}",
                    defs::CONFIG_FILE
                ))
            }
        }
    }
}

fn run(cli: &Cli, action: Action) -> Result<()> {
    let mut config = load_config(cli)?;
    config.merge_with_cli(cli.no_mtab, cli.verbose);

    let _log_guard = utils::init_logging(config.verbose, config.log_file.as_deref())
        .context("Failed to initialize logging")?;

    tracing::debug!("Effective config: {:?}", config);

    if let Action::List { json } = action {
        return cli_handlers::handle_list(&config, json);
    }

    let engine = MountEngine::new(SysMounter, SuperblockProbe, config.table_settings());

    match action {
        Action::MountOne {
            device,
            mount_point,
            flags,
            fs_type,
            options,
        } => cli_handlers::handle_mount_one(
            &engine,
            &device,
            &mount_point,
            flags,
            fs_type.as_deref(),
            options.as_deref(),
        ),
        Action::MountAll => cli_handlers::handle_mount_all(&engine, &config),
        Action::List { .. } => Ok(()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let action = cli.action().unwrap_or_else(|e| e.exit());

    match run(&cli, action) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {:#}", defs::PROGRAM, e);
            ExitCode::FAILURE
        }
    }
}
