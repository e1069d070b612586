// Copyright 2026 Hybrid Mount Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{core::TableSettings, defs};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_mtab")]
    pub mtab: PathBuf,
    #[serde(default = "default_fstab")]
    pub fstab: PathBuf,
    #[serde(default = "default_mtab_capacity")]
    pub mtab_capacity: usize,
    #[serde(default = "default_write_mtab")]
    pub write_mtab: bool,
    #[serde(default = "default_native_type")]
    pub native_type: String,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

fn default_mtab() -> PathBuf {
    PathBuf::from(defs::MTAB_FILE)
}

fn default_fstab() -> PathBuf {
    PathBuf::from(defs::FSTAB_FILE)
}

fn default_mtab_capacity() -> usize {
    defs::DEFAULT_MTAB_CAPACITY
}

fn default_write_mtab() -> bool {
    true
}

fn default_native_type() -> String {
    defs::NATIVE_FS_TYPE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mtab: default_mtab(),
            fstab: default_fstab(),
            mtab_capacity: default_mtab_capacity(),
            write_mtab: default_write_mtab(),
            native_type: default_native_type(),
            verbose: false,
            log_file: None,
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).context("failed to read config file")?;

        let config: Config = toml::from_str(&content).context("failed to parse config file")?;

        Ok(config)
    }

    pub fn load_default() -> Result<Self> {
        Self::from_file(defs::CONFIG_FILE)
    }

    /// `-n` can only turn recording off; `-v` can only turn debug output on.
    pub fn merge_with_cli(&mut self, no_mtab: bool, verbose: bool) {
        if no_mtab {
            self.write_mtab = false;
        }

        if verbose {
            self.verbose = true;
        }
    }

    pub fn table_settings(&self) -> TableSettings {
        TableSettings {
            path: self.mtab.clone(),
            capacity: self.mtab_capacity,
            record: self.write_mtab,
            native_type: self.native_type.clone(),
        }
    }
}
