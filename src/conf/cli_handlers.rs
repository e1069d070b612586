// Copyright 2026 Hybrid Mount Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::io::{self, Write};

use anyhow::{Context, Result};

use crate::{
    conf::config::Config,
    core::{MountEngine, MountRequest, listing, resolver::VersionProbe},
    defs,
    sys::{fstab::Fstab, mount::Mounter, mount::MountFlags},
};

pub fn handle_list(config: &Config, json: bool) -> Result<()> {
    let table = config.table_settings();

    if json {
        let rendered = listing::list_json(&table, defs::PROGRAM)?;
        println!("{}", rendered);
        return Ok(());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for line in listing::list(&table, defs::PROGRAM)? {
        writeln!(out, "{}", line).context("Failed to write listing")?;
    }

    Ok(())
}

pub fn handle_mount_one<M: Mounter, P: VersionProbe>(
    engine: &MountEngine<M, P>,
    device: &str,
    mount_point: &str,
    flags: MountFlags,
    fs_type: Option<&str>,
    options: Option<&str>,
) -> Result<()> {
    let request = MountRequest {
        device,
        mount_point,
        flags,
        fs_type,
        options,
    };

    let entry = engine.mount_one(&request)?;

    println!(
        "{} is {} mounted on {}",
        device,
        entry.mode.describe(),
        mount_point
    );

    Ok(())
}

pub fn handle_mount_all<M: Mounter, P: VersionProbe>(
    engine: &MountEngine<M, P>,
    config: &Config,
) -> Result<()> {
    let fstab = Fstab::load(&config.fstab)?;
    tracing::debug!("Mounting entries of {}", fstab.path().display());

    let report = engine.mount_all(fstab)?;

    tracing::info!(
        "Batch complete: {} mounted, {} skipped",
        report.mounted.len(),
        report.skipped
    );

    Ok(())
}
