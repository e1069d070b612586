// Copyright 2026 Hybrid Mount Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::{Path, PathBuf};

use nix::{
    errno::Errno,
    mount::{MsFlags, mount},
};
use procfs::process::Process;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MountFlags {
    pub read_only: bool,
    /// Succeed without mounting again when the same source is already on the target.
    pub reuse: bool,
    /// Only attach a filesystem instance that is already mounted elsewhere.
    pub existing: bool,
}

/// Arguments of one mount call. `device` is `None` for pseudo filesystems.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountCall<'a> {
    pub device: Option<&'a str>,
    pub mount_point: &'a Path,
    pub flags: MountFlags,
    pub fs_type: Option<&'a str>,
    pub options: Option<&'a str>,
}

pub trait Mounter {
    fn mount(&self, call: &MountCall<'_>) -> Result<(), Errno>;
}

/// Kernel backed [`Mounter`].
pub struct SysMounter;

struct ActiveMount {
    source: Option<String>,
    mount_point: PathBuf,
}

fn active_mounts() -> Result<Vec<ActiveMount>, Errno> {
    let mountinfo = Process::myself()
        .and_then(|p| p.mountinfo())
        .map_err(|e| {
            tracing::warn!("Failed to read mountinfo: {}", e);
            Errno::EIO
        })?;

    Ok(mountinfo
        .into_iter()
        .map(|m| ActiveMount {
            source: m.mount_source,
            mount_point: m.mount_point,
        })
        .collect())
}

impl SysMounter {
    fn attach_existing(&self, call: &MountCall<'_>) -> Result<(), Errno> {
        let device = call.device.ok_or(Errno::EINVAL)?;
        let mounts = active_mounts()?;
        let instance = mounts
            .iter()
            .find(|m| m.source.as_deref() == Some(device))
            .ok_or(Errno::ENOENT)?;

        tracing::debug!(
            "Attaching existing instance of {} from {}",
            device,
            instance.mount_point.display()
        );

        mount(
            Some(instance.mount_point.as_path()),
            call.mount_point,
            None::<&str>,
            MsFlags::MS_BIND,
            None::<&str>,
        )?;

        if call.flags.read_only {
            mount(
                None::<&str>,
                call.mount_point,
                None::<&str>,
                MsFlags::MS_BIND | MsFlags::MS_REMOUNT | MsFlags::MS_RDONLY,
                None::<&str>,
            )?;
        }
        Ok(())
    }

    fn already_mounted(&self, call: &MountCall<'_>) -> bool {
        let Ok(mounts) = active_mounts() else {
            return false;
        };
        let device = call.device.unwrap_or(crate::defs::NO_DEVICE);
        mounts
            .iter()
            .any(|m| m.mount_point == call.mount_point && m.source.as_deref() == Some(device))
    }
}

impl Mounter for SysMounter {
    fn mount(&self, call: &MountCall<'_>) -> Result<(), Errno> {
        if call.flags.reuse && self.already_mounted(call) {
            tracing::info!(
                "Reusing existing mount on {}",
                call.mount_point.display()
            );
            return Ok(());
        }

        if call.flags.existing {
            return self.attach_existing(call);
        }

        let mut flags = MsFlags::empty();
        if call.flags.read_only {
            flags |= MsFlags::MS_RDONLY;
        }

        tracing::debug!(
            "mount({:?}, {}, {:?}, {:?}, {:?})",
            call.device,
            call.mount_point.display(),
            flags,
            call.fs_type,
            call.options
        );

        mount(call.device, call.mount_point, call.fs_type, flags, call.options)
    }
}
