// Copyright 2026 Hybrid Mount Developers
// SPDX-License-Identifier: GPL-3.0-or-later

// Program name used as caller tag in diagnostics
pub const PROGRAM: &str = "mount";

// Persisted state
pub const MTAB_FILE: &str = "/etc/mtab";
pub const FSTAB_FILE: &str = "/etc/fstab";
pub const CONFIG_FILE: &str = "/etc/mount.toml";

// Rows the mount table may hold before a rewrite is refused
pub const DEFAULT_MTAB_CAPACITY: usize = 128;

// Native format family
pub const NATIVE_FS_TYPE: &str = "minix";
pub const NATIVE_VERSION_TAG: &str = "MFSv3";

// Version column width; longer type names are recorded as the fallback tag
pub const VERSION_TAG_MAX: usize = 9;
pub const VERSION_TAG_FALLBACK: &str = "-";

// Device text meaning "no backing device"
pub const NO_DEVICE: &str = "none";

// Option keywords understood by the batch pass
pub const OPT_NOAUTO: &str = "noauto";
pub const OPT_READ_ONLY: &str = "ro";

// Access mode tokens in the table
pub const MODE_RW: &str = "rw";
pub const MODE_RO: &str = "ro";
