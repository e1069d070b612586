// Copyright 2026 Hybrid Mount Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::{path::PathBuf, sync::OnceLock};

use clap::{CommandFactory, Parser, error::ErrorKind};
use regex_lite::Regex;

use crate::sys::mount::MountFlags;

static FS_TYPE_REGEX: OnceLock<Regex> = OnceLock::new();

fn parse_fs_type(value: &str) -> Result<String, String> {
    let re = FS_TYPE_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._+-]*$").expect("Invalid Regex pattern")
    });
    if re.is_match(value) {
        Ok(value.to_string())
    } else {
        Err(format!("invalid filesystem type '{value}'"))
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "mount",
    version,
    about = "Mount a file system",
    override_usage = "mount [-a] [-r] [-i] [-e] [-n] [-t type] [-o options] special name"
)]
pub struct Cli {
    /// Mount read-only
    #[arg(short = 'r')]
    pub read_only: bool,
    /// Reuse an instance already mounted on the target
    #[arg(short = 'i')]
    pub reuse: bool,
    /// Attach an instance that is already mounted elsewhere
    #[arg(short = 'e')]
    pub existing: bool,
    /// Do not record the mount in the mount table
    #[arg(short = 'n')]
    pub no_mtab: bool,
    #[arg(short = 't', value_name = "TYPE", value_parser = parse_fs_type)]
    pub fs_type: Option<String>,
    #[arg(short = 'o', value_name = "OPTIONS")]
    pub options: Option<String>,
    /// Mount every eligible entry of the fstab
    #[arg(short = 'a')]
    pub all: bool,
    /// List the mount table as JSON
    #[arg(short = 'j', long = "json", conflicts_with = "all")]
    pub json: bool,
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,
    pub device: Option<String>,
    pub mount_point: Option<String>,
}

/// What a command line asks for once the flags are checked.
#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    List { json: bool },
    MountOne {
        device: String,
        mount_point: String,
        flags: MountFlags,
        fs_type: Option<String>,
        options: Option<String>,
    },
    MountAll,
}

impl Cli {
    fn flags(&self) -> MountFlags {
        MountFlags {
            read_only: self.read_only,
            reuse: self.reuse,
            existing: self.existing,
        }
    }

    fn has_mount_flags(&self) -> bool {
        self.read_only
            || self.reuse
            || self.existing
            || self.no_mtab
            || self.fs_type.is_some()
            || self.options.is_some()
    }

    fn usage_error(msg: &str) -> clap::Error {
        Cli::command().error(ErrorKind::MissingRequiredArgument, msg)
    }

    pub fn action(&self) -> Result<Action, clap::Error> {
        if self.all {
            return Ok(Action::MountAll);
        }

        match (&self.device, &self.mount_point) {
            (None, None) if !self.has_mount_flags() => Ok(Action::List { json: self.json }),
            (Some(device), Some(mount_point)) if !device.is_empty() && !self.json => {
                Ok(Action::MountOne {
                    device: device.clone(),
                    mount_point: mount_point.clone(),
                    flags: self.flags(),
                    fs_type: self.fs_type.clone(),
                    options: self.options.clone(),
                })
            }
            _ => Err(Self::usage_error("expected a special file and a mount point")),
        }
    }
}
