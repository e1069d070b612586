// Copyright 2026 Hybrid Mount Developers
// SPDX-License-Identifier: GPL-3.0-or-later

pub mod engine;
pub mod error;
pub mod listing;
pub mod mtab;
pub mod options;
pub mod resolver;

pub use engine::{MountEngine, MountRequest, TableSettings};
