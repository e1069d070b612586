// Copyright 2026 Hybrid Mount Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::PathBuf;

use nix::errno::Errno;
use thiserror::Error;

/// Failures of the mount orchestration. Rendered with `{:#}` so the io
/// cause, when present, follows the message on the same line.
#[derive(Error, Debug)]
pub enum MountError {
    #[error("Can't mount {device} on {mount_point}: {}", .errno.desc())]
    MountCall {
        device: String,
        mount_point: String,
        errno: Errno,
    },

    #[error("{caller}: {}", .path.display())]
    TableLoad {
        caller: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{caller}: {}: malformed entry on line {line}", .path.display())]
    TableParse {
        caller: String,
        path: PathBuf,
        line: usize,
    },

    #[error("{} has grown too large (capacity {capacity})", .path.display())]
    TableCapacity { path: PathBuf, capacity: usize },

    #[error("{caller}: can't rewrite {}", .path.display())]
    TableCommit {
        caller: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Can't mount on {mount_point}")]
    PathResolution {
        mount_point: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {reason}", .path.display())]
    ConfigTableLoad { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, MountError>;
