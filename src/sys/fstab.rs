// Copyright 2026 Hybrid Mount Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::core::error::{MountError, Result};

/// One static row of the mount configuration table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountConfigEntry {
    pub device: String,
    pub mount_point: String,
    pub fs_type: String,
    pub options: String,
}

impl MountConfigEntry {
    pub fn new(device: &str, mount_point: &str, fs_type: &str, options: &str) -> Self {
        Self {
            device: device.to_string(),
            mount_point: mount_point.to_string(),
            fs_type: fs_type.to_string(),
            options: options.to_string(),
        }
    }
}

pub struct Fstab {
    path: PathBuf,
    entries: Vec<MountConfigEntry>,
}

impl Fstab {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = fs::read_to_string(&path).map_err(|e| MountError::ConfigTableLoad {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        let entries = Self::parse(&content).map_err(|line| MountError::ConfigTableLoad {
            path: path.clone(),
            reason: format!("malformed entry on line {}", line),
        })?;

        tracing::debug!("Loaded {} entries from {}", entries.len(), path.display());

        Ok(Self { path, entries })
    }

    /// Parses `spec file vfstype [mntops [freq [passno]]]` rows. On error
    /// returns the 1-based number of the offending line.
    fn parse(content: &str) -> std::result::Result<Vec<MountConfigEntry>, usize> {
        let mut entries = Vec::new();

        for (idx, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 3 {
                return Err(idx + 1);
            }

            entries.push(MountConfigEntry::new(
                fields[0],
                fields[1],
                fields[2],
                fields.get(3).copied().unwrap_or(""),
            ));
        }

        Ok(entries)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl IntoIterator for Fstab {
    type Item = MountConfigEntry;
    type IntoIter = std::vec::IntoIter<MountConfigEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
