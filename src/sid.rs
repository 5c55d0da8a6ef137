//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use serde::{Deserialize, Serialize};

/// A 20-bit MPLS label value, as carried by the IS-IS SID/Label sub-TLVs.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub struct Label(u32);

impl Label {
    pub const VALUE_MASK: u32 = 0x000F_FFFF;

    pub fn new(label: u32) -> Label {
        Label(label & Self::VALUE_MASK)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A Segment Routing identifier: either a 32-bit index into an SRGB, or a
/// 24-bit-wire-encoded MPLS label.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum Sid {
    Index(u32),
    Label(Label),
}
