// Copyright 2026 Hybrid Mount Developers
// SPDX-License-Identifier: GPL-3.0-or-later

/// Borrowed token view over a comma separated mount option string.
#[derive(Debug, Clone, Copy)]
pub struct OptionList<'a> {
    raw: &'a str,
}

impl<'a> OptionList<'a> {
    pub fn new(raw: &'a str) -> Self {
        Self { raw }
    }

    /// Tokens in order. Empty tokens between adjacent commas are dropped.
    pub fn tokens(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.raw.split(',').filter(|t| !t.is_empty())
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.tokens().any(|t| t == keyword)
    }
}

/// Exact, case-sensitive token match. No trimming is applied.
pub fn has_option(options: &str, keyword: &str) -> bool {
    OptionList::new(options).contains(keyword)
}
