// Copyright 2026 Hybrid Mount Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::{io, path::Path};

/// On-disk format reported by a [`VersionProbe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsVersion {
    Mfs1,
    Mfs2,
    Mfs3,
    Ext2,
    Unknown,
}

impl FsVersion {
    /// Type name the format mounts as, or `None` when the probe gave no answer.
    pub fn type_name(self, native_type: &str) -> Option<String> {
        match self {
            FsVersion::Mfs1 | FsVersion::Mfs2 | FsVersion::Mfs3 => Some(native_type.to_string()),
            FsVersion::Ext2 => Some("ext2".to_string()),
            FsVersion::Unknown => None,
        }
    }
}

pub trait VersionProbe {
    fn probe(&self, device: &Path, caller: &str) -> io::Result<FsVersion>;
}

/// Picks the filesystem type handed to the mount call.
///
/// Probing only happens for a real device whose requested type is unset or
/// the native one. A failed or inconclusive probe leaves `requested` as is;
/// the mount call then has the final word.
pub fn resolve_type<P: VersionProbe + ?Sized>(
    probe: &P,
    device: Option<&str>,
    requested: Option<&str>,
    native_type: &str,
    caller: &str,
) -> Option<String> {
    let Some(device) = device else {
        return requested.map(str::to_string);
    };

    if requested.is_some_and(|t| t != native_type) {
        return requested.map(str::to_string);
    }

    match probe.probe(Path::new(device), caller) {
        Ok(version) => {
            tracing::debug!("{}: {} probed as {:?}", caller, device, version);
            version
                .type_name(native_type)
                .or_else(|| requested.map(str::to_string))
        }
        Err(e) => {
            tracing::warn!("{}: can't probe {}: {}", caller, device, e);
            requested.map(str::to_string)
        }
    }
}
