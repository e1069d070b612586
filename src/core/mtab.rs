// Copyright 2026 Hybrid Mount Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

use serde::Serialize;

use crate::{
    core::error::{MountError, Result},
    defs, utils,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AccessMode {
    #[serde(rename = "rw")]
    ReadWrite,
    #[serde(rename = "ro")]
    ReadOnly,
}

impl AccessMode {
    pub fn from_read_only(read_only: bool) -> Self {
        if read_only {
            AccessMode::ReadOnly
        } else {
            AccessMode::ReadWrite
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            AccessMode::ReadWrite => defs::MODE_RW,
            AccessMode::ReadOnly => defs::MODE_RO,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            AccessMode::ReadWrite => "read-write",
            AccessMode::ReadOnly => "read-only",
        }
    }
}

/// Version column for a freshly mounted filesystem of type `fs_type`.
pub fn version_tag(fs_type: Option<&str>, native_type: &str) -> String {
    match fs_type {
        Some(t) if t == native_type => defs::NATIVE_VERSION_TAG.to_string(),
        Some(t) if !t.is_empty() && t.len() <= defs::VERSION_TAG_MAX => t.to_string(),
        _ => defs::VERSION_TAG_FALLBACK.to_string(),
    }
}

/// Octal escape for bytes that would split or end a row: `\040` for space.
fn escape_field(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    for c in field.chars() {
        match c {
            ' ' | '\t' | '\n' | '\r' | '\\' => out.push_str(&format!("\\{:03o}", c as u32)),
            _ => out.push(c),
        }
    }
    out
}

/// Reverses [`escape_field`]. A backslash not followed by three octal
/// digits is kept literally.
fn unescape_field(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\'
            && i + 3 < bytes.len()
            && bytes[i + 1..=i + 3].iter().all(|b| (b'0'..=b'7').contains(b))
        {
            let value = bytes[i + 1..=i + 3]
                .iter()
                .fold(0u32, |acc, b| acc * 8 + u32::from(b - b'0'));
            if let Ok(byte) = u8::try_from(value) {
                out.push(byte);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MountEntry {
    pub device: String,
    pub mount_point: String,
    pub version: String,
    pub mode: AccessMode,
    /// Mode column as stored; anything but `rw` reads as read-only.
    #[serde(skip)]
    mode_token: String,
}

impl MountEntry {
    pub fn new(
        device: &str,
        mount_point: &str,
        fs_type: Option<&str>,
        mode: AccessMode,
        native_type: &str,
    ) -> Self {
        Self {
            device: device.to_string(),
            mount_point: mount_point.to_string(),
            version: version_tag(fs_type, native_type),
            mode,
            mode_token: mode.token().to_string(),
        }
    }

    fn parse(line: &str) -> Option<Self> {
        let mut fields = line.split_whitespace();
        let device = fields.next()?;
        let mount_point = fields.next()?;
        let version = fields.next()?;
        let mode_token = fields.next()?;
        if fields.next().is_some() {
            return None;
        }

        let mode = if mode_token == defs::MODE_RW {
            AccessMode::ReadWrite
        } else {
            AccessMode::ReadOnly
        };

        Some(Self {
            device: unescape_field(device),
            mount_point: unescape_field(mount_point),
            version: unescape_field(version),
            mode,
            mode_token: mode_token.to_string(),
        })
    }
}

impl fmt::Display for MountEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            escape_field(&self.device),
            escape_field(&self.mount_point),
            escape_field(&self.version),
            self.mode_token
        )
    }
}

/// Working copy of the persisted mount table.
///
/// A session loads the whole file, hands out the loaded rows in file order,
/// collects the rows of the replacement table and finally swaps the file in
/// one rename. Nothing reaches the disk before [`MountTable::commit`].
pub struct MountTable {
    path: PathBuf,
    capacity: usize,
    loaded: Vec<MountEntry>,
    cursor: usize,
    staged: Vec<MountEntry>,
}

impl MountTable {
    pub fn open<P: AsRef<Path>>(path: P, capacity: usize, caller: &str) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("{}: {} does not exist yet", caller, path.display());
                String::new()
            }
            Err(source) => {
                return Err(MountError::TableLoad {
                    caller: caller.to_string(),
                    path,
                    source,
                });
            }
        };

        let mut loaded = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match MountEntry::parse(line) {
                Some(entry) => loaded.push(entry),
                None => {
                    return Err(MountError::TableParse {
                        caller: caller.to_string(),
                        path,
                        line: idx + 1,
                    });
                }
            }
        }

        tracing::debug!(
            "{}: loaded {} entries from {}",
            caller,
            loaded.len(),
            path.display()
        );

        Ok(Self {
            path,
            capacity,
            loaded,
            cursor: 0,
            staged: Vec::new(),
        })
    }

    pub fn next_entry(&mut self) -> Option<MountEntry> {
        let entry = self.loaded.get(self.cursor).cloned()?;
        self.cursor += 1;
        Some(entry)
    }

    pub fn stage_entry(&mut self, entry: MountEntry) -> Result<()> {
        if self.staged.len() >= self.capacity {
            return Err(MountError::TableCapacity {
                path: self.path.clone(),
                capacity: self.capacity,
            });
        }
        self.staged.push(entry);
        Ok(())
    }

    pub fn commit(self, caller: &str) -> Result<()> {
        let mut content = String::new();
        for entry in &self.staged {
            content.push_str(&entry.to_string());
            content.push('\n');
        }

        utils::atomic_write(&self.path, content).map_err(|source| MountError::TableCommit {
            caller: caller.to_string(),
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(
            "{}: committed {} entries to {}",
            caller,
            self.staged.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Reloads the table, carries every existing row over unchanged, appends
/// `entry` and commits. Rows are not deduplicated by mount point.
pub fn record_mount<P: AsRef<Path>>(
    path: P,
    capacity: usize,
    entry: MountEntry,
    caller: &str,
) -> Result<()> {
    let mut table = MountTable::open(path, capacity, caller)?;

    while let Some(existing) = table.next_entry() {
        table.stage_entry(existing)?;
    }
    table.stage_entry(entry)?;

    table.commit(caller)
}
