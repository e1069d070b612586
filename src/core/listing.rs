// Copyright 2026 Hybrid Mount Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::core::{
    engine::TableSettings,
    error::Result,
    mtab::{MountEntry, MountTable},
};

pub fn render(entry: &MountEntry) -> String {
    format!(
        "{} is {} mounted on {} (type {})",
        entry.device,
        entry.mode.describe(),
        entry.mount_point,
        entry.version
    )
}

/// Opens the table and yields its rows rendered, in table order.
pub fn list(table: &TableSettings, caller: &str) -> Result<impl Iterator<Item = String>> {
    let mut mtab = MountTable::open(&table.path, table.capacity, caller)?;
    Ok(std::iter::from_fn(move || mtab.next_entry()).map(|e| render(&e)))
}

pub fn list_json(table: &TableSettings, caller: &str) -> anyhow::Result<String> {
    let mut mtab = MountTable::open(&table.path, table.capacity, caller)?;
    let entries: Vec<MountEntry> = std::iter::from_fn(|| mtab.next_entry()).collect();
    Ok(serde_json::to_string_pretty(&entries)?)
}
