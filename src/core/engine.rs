// Copyright 2026 Hybrid Mount Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::{Path, PathBuf};

use crate::{
    core::{
        error::{MountError, Result},
        mtab::{self, AccessMode, MountEntry},
        options::has_option,
        resolver::{self, VersionProbe},
    },
    defs,
    sys::{
        fstab::MountConfigEntry,
        mount::{MountCall, MountFlags, Mounter},
    },
};

/// Where and whether successful mounts are recorded.
#[derive(Debug, Clone)]
pub struct TableSettings {
    pub path: PathBuf,
    pub capacity: usize,
    pub record: bool,
    pub native_type: String,
}

/// A single interactive mount. `device` is kept as typed; `none` means no
/// backing device.
#[derive(Debug, Clone)]
pub struct MountRequest<'a> {
    pub device: &'a str,
    pub mount_point: &'a str,
    pub flags: MountFlags,
    pub fs_type: Option<&'a str>,
    pub options: Option<&'a str>,
}

pub fn backing_device(device: &str) -> Option<&str> {
    if device == defs::NO_DEVICE {
        None
    } else {
        Some(device)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub mounted: Vec<MountEntry>,
    pub skipped: usize,
}

pub struct MountEngine<M, P> {
    mounter: M,
    probe: P,
    table: TableSettings,
}

impl<M: Mounter, P: VersionProbe> MountEngine<M, P> {
    pub fn new(mounter: M, probe: P, table: TableSettings) -> Self {
        Self {
            mounter,
            probe,
            table,
        }
    }

    fn record(&self, entry: &MountEntry) -> Result<()> {
        if !self.table.record {
            tracing::debug!("Table recording disabled, not recording {}", entry.mount_point);
            return Ok(());
        }
        mtab::record_mount(
            &self.table.path,
            self.table.capacity,
            entry.clone(),
            defs::PROGRAM,
        )
    }

    /// Resolves the type, mounts, and records the new row.
    ///
    /// A failed mount leaves the table alone. A bookkeeping failure after a
    /// successful mount is returned as is; the mount stays in place.
    pub fn mount_one(&self, req: &MountRequest<'_>) -> Result<MountEntry> {
        let device = backing_device(req.device);

        let fs_type = resolver::resolve_type(
            &self.probe,
            device,
            req.fs_type,
            &self.table.native_type,
            defs::PROGRAM,
        );

        let call = MountCall {
            device,
            mount_point: Path::new(req.mount_point),
            flags: req.flags,
            fs_type: fs_type.as_deref(),
            options: req.options,
        };

        self.mounter
            .mount(&call)
            .map_err(|errno| MountError::MountCall {
                device: req.device.to_string(),
                mount_point: req.mount_point.to_string(),
                errno,
            })?;

        tracing::info!(
            "Mounted {} on {} (type {:?})",
            req.device,
            req.mount_point,
            fs_type
        );

        let entry = MountEntry::new(
            req.device,
            req.mount_point,
            fs_type.as_deref(),
            AccessMode::from_read_only(req.flags.read_only),
            &self.table.native_type,
        );
        self.record(&entry)?;

        Ok(entry)
    }

    /// Mounts every eligible configuration row in order, stopping at the
    /// first failure. Rows recorded before the failure stay recorded.
    pub fn mount_all<I>(&self, entries: I) -> Result<BatchReport>
    where
        I: IntoIterator<Item = MountConfigEntry>,
    {
        let mut report = BatchReport::default();

        for fs in entries {
            let mount_point = std::fs::canonicalize(&fs.mount_point).map_err(|source| {
                MountError::PathResolution {
                    mount_point: fs.mount_point.clone(),
                    source,
                }
            })?;

            if has_option(&fs.options, defs::OPT_NOAUTO) {
                tracing::debug!("Skipping {}: noauto", fs.mount_point);
                report.skipped += 1;
                continue;
            }

            if mount_point == Path::new("/") {
                tracing::debug!("Skipping root entry {}", fs.device);
                report.skipped += 1;
                continue;
            }

            let flags = MountFlags {
                read_only: has_option(&fs.options, defs::OPT_READ_ONLY),
                ..MountFlags::default()
            };

            let call = MountCall {
                device: backing_device(&fs.device),
                mount_point: &mount_point,
                flags,
                fs_type: Some(fs.fs_type.as_str()),
                options: Some(fs.options.as_str()).filter(|o| !o.is_empty()),
            };

            self.mounter
                .mount(&call)
                .map_err(|errno| MountError::MountCall {
                    device: fs.device.clone(),
                    mount_point: fs.mount_point.clone(),
                    errno,
                })?;

            let entry = MountEntry::new(
                &fs.device,
                &fs.mount_point,
                Some(fs.fs_type.as_str()),
                AccessMode::from_read_only(flags.read_only),
                &self.table.native_type,
            );

            tracing::info!("Mounted {} on {}", fs.device, entry.mount_point);

            self.record(&entry)?;
            report.mounted.push(entry);
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        cell::RefCell,
        collections::HashMap,
        fs, io,
    };

    use nix::errno::Errno;
    use tempfile::TempDir;

    use super::*;
    use crate::core::resolver::FsVersion;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct RecordedCall {
        device: Option<String>,
        mount_point: PathBuf,
        flags: MountFlags,
        fs_type: Option<String>,
        options: Option<String>,
    }

    #[derive(Default)]
    struct FakeMounter {
        calls: RefCell<Vec<RecordedCall>>,
        failures: HashMap<PathBuf, Errno>,
    }

    impl FakeMounter {
        fn failing_on(mount_point: &Path, errno: Errno) -> Self {
            let mut failures = HashMap::new();
            failures.insert(mount_point.to_path_buf(), errno);
            Self {
                calls: RefCell::default(),
                failures,
            }
        }
    }

    impl Mounter for &FakeMounter {
        fn mount(&self, call: &MountCall<'_>) -> std::result::Result<(), Errno> {
            self.calls.borrow_mut().push(RecordedCall {
                device: call.device.map(str::to_string),
                mount_point: call.mount_point.to_path_buf(),
                flags: call.flags,
                fs_type: call.fs_type.map(str::to_string),
                options: call.options.map(str::to_string),
            });
            match self.failures.get(call.mount_point) {
                Some(errno) => Err(*errno),
                None => Ok(()),
            }
        }
    }

    struct FixedProbe(FsVersion);

    impl VersionProbe for FixedProbe {
        fn probe(&self, _device: &Path, _caller: &str) -> io::Result<FsVersion> {
            Ok(self.0)
        }
    }

    struct Fixture {
        dir: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                dir: TempDir::new().unwrap(),
            }
        }

        fn mtab(&self) -> PathBuf {
            self.dir.path().join("mtab")
        }

        fn mkdir(&self, name: &str) -> String {
            let p = self.dir.path().join(name);
            fs::create_dir_all(&p).unwrap();
            fs::canonicalize(&p).unwrap().to_string_lossy().to_string()
        }

        fn settings(&self, record: bool) -> TableSettings {
            TableSettings {
                path: self.mtab(),
                capacity: 16,
                record,
                native_type: "minix".to_string(),
            }
        }

        fn engine<'a>(
            &self,
            mounter: &'a FakeMounter,
            version: FsVersion,
        ) -> MountEngine<&'a FakeMounter, FixedProbe> {
            MountEngine::new(mounter, FixedProbe(version), self.settings(true))
        }

        fn table(&self) -> String {
            fs::read_to_string(self.mtab()).unwrap_or_default()
        }
    }

    fn request<'a>(device: &'a str, mount_point: &'a str) -> MountRequest<'a> {
        MountRequest {
            device,
            mount_point,
            flags: MountFlags::default(),
            fs_type: None,
            options: None,
        }
    }

    #[test]
    fn test_mount_one_probes_and_records() {
        let fx = Fixture::new();
        let mounter = FakeMounter::default();
        let engine = fx.engine(&mounter, FsVersion::Mfs3);

        let entry = engine.mount_one(&request("/dev/c0d1p0", "/mnt")).unwrap();

        assert_eq!(entry.version, "MFSv3");
        assert_eq!(entry.mode, AccessMode::ReadWrite);
        let calls = mounter.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].device.as_deref(), Some("/dev/c0d1p0"));
        assert_eq!(calls[0].fs_type.as_deref(), Some("minix"));
        assert_eq!(fx.table(), "/dev/c0d1p0 /mnt MFSv3 rw\n");
    }

    #[test]
    fn test_mount_one_none_device_is_absent() {
        let fx = Fixture::new();
        let mounter = FakeMounter::default();
        let engine = fx.engine(&mounter, FsVersion::Mfs3);

        let mut req = request("none", "/proc");
        req.fs_type = Some("procfs");
        engine.mount_one(&req).unwrap();

        let calls = mounter.calls.borrow();
        assert_eq!(calls[0].device, None);
        assert_eq!(calls[0].fs_type.as_deref(), Some("procfs"));
        assert_eq!(fx.table(), "none /proc procfs rw\n");
    }

    #[test]
    fn test_mount_one_passes_flags_and_options() {
        let fx = Fixture::new();
        let mounter = FakeMounter::default();
        let engine = fx.engine(&mounter, FsVersion::Unknown);

        let req = MountRequest {
            device: "/dev/c0d1p0",
            mount_point: "/mnt",
            flags: MountFlags {
                read_only: true,
                reuse: true,
                existing: false,
            },
            fs_type: Some("averylongfstype"),
            options: Some("uid=0"),
        };
        let entry = engine.mount_one(&req).unwrap();

        assert_eq!(entry.version, "-");
        let calls = mounter.calls.borrow();
        assert!(calls[0].flags.read_only && calls[0].flags.reuse);
        assert_eq!(calls[0].options.as_deref(), Some("uid=0"));
        assert_eq!(fx.table(), "/dev/c0d1p0 /mnt - ro\n");
    }

    #[test]
    fn test_mount_one_failure_leaves_table_alone() {
        let fx = Fixture::new();
        fs::write(fx.mtab(), "/dev/a / MFSv3 rw\n").unwrap();
        let mounter = FakeMounter::failing_on(Path::new("/mnt"), Errno::ENODEV);
        let engine = fx.engine(&mounter, FsVersion::Mfs3);

        let err = engine.mount_one(&request("/dev/c0d1p0", "/mnt")).unwrap_err();

        assert_eq!(
            err.to_string(),
            format!("Can't mount /dev/c0d1p0 on /mnt: {}", Errno::ENODEV.desc())
        );
        assert_eq!(fx.table(), "/dev/a / MFSv3 rw\n");
    }

    #[test]
    fn test_recording_disabled() {
        let fx = Fixture::new();
        let mounter = FakeMounter::default();
        let engine = MountEngine::new(&mounter, FixedProbe(FsVersion::Mfs3), fx.settings(false));

        engine.mount_one(&request("/dev/c0d1p0", "/mnt")).unwrap();

        assert_eq!(mounter.calls.borrow().len(), 1);
        assert!(!fx.mtab().exists());
    }

    #[test]
    fn test_bookkeeping_overflow_is_reported() {
        let fx = Fixture::new();
        fs::write(fx.mtab(), "/dev/a / MFSv3 rw\n").unwrap();
        let mounter = FakeMounter::default();
        let mut settings = fx.settings(true);
        settings.capacity = 1;
        let engine = MountEngine::new(&mounter, FixedProbe(FsVersion::Mfs3), settings);

        let err = engine.mount_one(&request("/dev/c0d1p0", "/mnt")).unwrap_err();

        assert!(matches!(err, MountError::TableCapacity { .. }));
        assert_eq!(mounter.calls.borrow().len(), 1);
        assert_eq!(fx.table(), "/dev/a / MFSv3 rw\n");
    }

    #[test]
    fn test_batch_skips_noauto_and_root() {
        let fx = Fixture::new();
        let a = fx.mkdir("a");
        let b = fx.mkdir("b");
        let mounter = FakeMounter::default();
        let engine = fx.engine(&mounter, FsVersion::Mfs3);

        let report = engine
            .mount_all(vec![
                MountConfigEntry::new("d1", &a, "fsX", "noauto"),
                MountConfigEntry::new("d2", "/", "fsX", ""),
                MountConfigEntry::new("d3", &b, "fsX", "ro"),
            ])
            .unwrap();

        assert_eq!(report.skipped, 2);
        assert_eq!(report.mounted.len(), 1);
        let calls = mounter.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0],
            RecordedCall {
                device: Some("d3".to_string()),
                mount_point: PathBuf::from(&b),
                flags: MountFlags {
                    read_only: true,
                    ..MountFlags::default()
                },
                fs_type: Some("fsX".to_string()),
                options: Some("ro".to_string()),
            }
        );
        assert_eq!(fx.table(), format!("d3 {} fsX ro\n", b));
    }

    #[test]
    fn test_batch_records_configured_mount_point() {
        let fx = Fixture::new();
        let real = fx.mkdir("real");
        let link = fx.dir.path().join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();
        let link = link.to_string_lossy().to_string();
        let mounter = FakeMounter::default();
        let engine = fx.engine(&mounter, FsVersion::Mfs3);

        let report = engine
            .mount_all(vec![MountConfigEntry::new("d1", &link, "minix", "")])
            .unwrap();

        assert_eq!(mounter.calls.borrow()[0].mount_point, PathBuf::from(&real));
        assert_eq!(report.mounted[0].mount_point, link);
        assert_eq!(fx.table(), format!("d1 {} MFSv3 rw\n", link));
    }

    #[test]
    fn test_batch_stops_at_first_failure() {
        let fx = Fixture::new();
        let a = fx.mkdir("a");
        let b = fx.mkdir("b");
        let mounter = FakeMounter::failing_on(Path::new(&a), Errno::EBUSY);
        let engine = fx.engine(&mounter, FsVersion::Mfs3);

        let err = engine
            .mount_all(vec![
                MountConfigEntry::new("d1", &a, "minix", ""),
                MountConfigEntry::new("d2", &b, "minix", ""),
            ])
            .unwrap_err();

        assert!(matches!(err, MountError::MountCall { errno: Errno::EBUSY, .. }));
        assert_eq!(mounter.calls.borrow().len(), 1);
        assert_eq!(fx.table(), "");
    }

    #[test]
    fn test_batch_keeps_rows_recorded_before_failure() {
        let fx = Fixture::new();
        let a = fx.mkdir("a");
        let b = fx.mkdir("b");
        let mounter = FakeMounter::failing_on(Path::new(&b), Errno::EINVAL);
        let engine = fx.engine(&mounter, FsVersion::Mfs3);

        assert!(
            engine
                .mount_all(vec![
                    MountConfigEntry::new("d1", &a, "minix", ""),
                    MountConfigEntry::new("d2", &b, "minix", ""),
                ])
                .is_err()
        );
        assert_eq!(fx.table(), format!("d1 {} MFSv3 rw\n", a));
    }

    #[test]
    fn test_batch_unresolvable_mount_point_aborts() {
        let fx = Fixture::new();
        let b = fx.mkdir("b");
        let missing = fx.dir.path().join("missing").to_string_lossy().to_string();
        let mounter = FakeMounter::default();
        let engine = fx.engine(&mounter, FsVersion::Mfs3);

        let err = engine
            .mount_all(vec![
                MountConfigEntry::new("d1", &missing, "minix", "noauto"),
                MountConfigEntry::new("d2", &b, "minix", ""),
            ])
            .unwrap_err();

        assert!(matches!(err, MountError::PathResolution { .. }));
        assert!(mounter.calls.borrow().is_empty());
    }

    #[test]
    fn test_batch_none_device_and_no_probe() {
        let fx = Fixture::new();
        let a = fx.mkdir("proc");
        let mounter = FakeMounter::default();
        let engine = fx.engine(&mounter, FsVersion::Ext2);

        engine
            .mount_all(vec![MountConfigEntry::new("none", &a, "minix", "")])
            .unwrap();

        let calls = mounter.calls.borrow();
        assert_eq!(calls[0].device, None);
        assert_eq!(calls[0].fs_type.as_deref(), Some("minix"));
        assert_eq!(calls[0].options, None);
        assert_eq!(fx.table(), format!("none {} MFSv3 rw\n", a));
    }
}
