// Copyright 2026 Hybrid Mount Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::{
    fs::File,
    io::{self, Read, Seek, SeekFrom},
    path::Path,
};

use crate::core::resolver::{FsVersion, VersionProbe};

const SUPER_OFFSET: u64 = 1024;
const SUPER_SIZE: usize = 1024;

const MINIX_MAGIC_OFFSET: usize = 16;
const MINIX_V3_MAGIC_OFFSET: usize = 24;
const EXT2_MAGIC_OFFSET: usize = 56;

const MINIX_V1_MAGIC: u16 = 0x137F;
const MINIX_V1_MAGIC_30: u16 = 0x138F;
const MINIX_V2_MAGIC: u16 = 0x2468;
const MINIX_V2_MAGIC_30: u16 = 0x2478;
const MINIX_V3_MAGIC: u16 = 0x4D5A;
const EXT2_MAGIC: u16 = 0xEF53;

fn read_u16(buf: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buf[offset], buf[offset + 1]])
}

/// Classifies a raw superblock. `sb` must hold at least the first 64 bytes.
pub fn classify_superblock(sb: &[u8]) -> FsVersion {
    match read_u16(sb, MINIX_MAGIC_OFFSET) {
        MINIX_V1_MAGIC | MINIX_V1_MAGIC_30 => return FsVersion::Mfs1,
        MINIX_V2_MAGIC | MINIX_V2_MAGIC_30 => return FsVersion::Mfs2,
        _ => {}
    }

    if read_u16(sb, MINIX_V3_MAGIC_OFFSET) == MINIX_V3_MAGIC {
        return FsVersion::Mfs3;
    }

    if read_u16(sb, EXT2_MAGIC_OFFSET) == EXT2_MAGIC {
        return FsVersion::Ext2;
    }

    FsVersion::Unknown
}

/// Reads the superblock straight off the device node.
pub struct SuperblockProbe;

impl VersionProbe for SuperblockProbe {
    fn probe(&self, device: &Path, caller: &str) -> io::Result<FsVersion> {
        let mut file = File::open(device)?;
        file.seek(SeekFrom::Start(SUPER_OFFSET))?;

        let mut sb = vec![0u8; SUPER_SIZE];
        let mut filled = 0;
        while filled < sb.len() {
            match file.read(&mut sb[filled..])? {
                0 => break,
                n => filled += n,
            }
        }

        if filled <= EXT2_MAGIC_OFFSET + 1 {
            tracing::debug!("{}: {} too short for a superblock", caller, device.display());
            return Ok(FsVersion::Unknown);
        }

        Ok(classify_superblock(&sb[..filled]))
    }
}
