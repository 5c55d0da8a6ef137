//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use bitflags::bitflags;
use num_derive::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};

pub const SYSTEM_ID_LEN: u8 = 6;

// IS-IS top-level TLV types supported by this decoder.
//
// This is a deliberate subset of the full IANA registry
// (https://www.iana.org/assignments/isis-tlv-codepoints/isis-tlv-codepoints.xhtml#tlv-codepoints):
// legacy TLVs (IS Reachability, Internal/External IP Reachability),
// adjacency-protocol TLVs (Neighbors, Padding, Authentication, LSP
// Entries, LSP Buffer Size) and the IPv6 Router ID TLV are out of scope.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(FromPrimitive, ToPrimitive)]
#[derive(Deserialize, Serialize)]
pub enum TlvType {
    AreaAddresses = 1,
    ExtIsReach = 22,
    ProtocolsSupported = 129,
    Ipv4Addresses = 132,
    Ipv4RouterId = 134,
    ExtIpv4Reach = 135,
    DynamicHostname = 137,
    Ipv6Addresses = 232,
    Ipv6Reach = 236,
    RouterCapability = 242,
}

// IS-IS Sub-TLVs for TLVs Advertising Neighbor Information (Extended IS
// Reachability). Type 4 (Link local/remote identifiers) and type 38
// (Residual bandwidth) have no counterpart in the reference stack's
// `NeighborStlvType` and are decoded against the same fixed-width shape
// as the other TE sub-TLVs.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(FromPrimitive, ToPrimitive)]
#[derive(Deserialize, Serialize)]
pub enum NeighborStlvType {
    AdminGroup = 3,
    LinkId = 4,
    Ipv4InterfaceAddress = 6,
    Ipv4NeighborAddress = 8,
    MaxLinkBandwidth = 9,
    MaxResvLinkBandwidth = 10,
    UnreservedBandwidth = 11,
    AdjacencySid = 31,
    LanAdjacencySid = 32,
    ResidualBandwidth = 38,
}

// IS-IS Sub-TLVs for TLVs Advertising Prefix Reachability.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[derive(FromPrimitive, ToPrimitive)]
#[derive(Deserialize, Serialize)]
pub enum PrefixStlvType {
    PrefixSid = 3,
}

// IS-IS Sub-TLVs for the Router Capability TLV.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[derive(FromPrimitive, ToPrimitive)]
#[derive(Deserialize, Serialize)]
pub enum RouterCapStlvType {
    SrCapability = 2,
    SrAlgorithm = 19,
}

// Sub-TLV inside each SR Capability SRGB descriptor.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[derive(FromPrimitive, ToPrimitive)]
#[derive(Deserialize, Serialize)]
pub enum LabelBindingStlvType {
    SidLabel = 1,
}

// NLPID values recognized inside the Protocols Supported TLV.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub enum Nlpid {
    Ipv4 = 0xcc,
    Ipv6 = 0x8e,
}

impl Nlpid {
    pub(crate) fn from_u8(value: u8) -> Option<Self> {
        match value {
            0xcc => Some(Nlpid::Ipv4),
            0x8e => Some(Nlpid::Ipv6),
            _ => None,
        }
    }
}

// IS-IS LSP flags field.
//
// Bit numbering follows the spec's own layout, not the reference stack's:
// the single `ATT` bit of the reference implementation is split into four
// dedicated sub-bits here (ERROR/EXPENSE/DELAY/DEFAULT metrics), and
// `OVERLOAD` moves from 0x04 to... 0x04 (unchanged position, different
// neighbors). Bit 0 is the most significant bit of the byte.
bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    #[derive(Deserialize, Serialize)]
    #[serde(transparent)]
    pub struct LspFlags: u8 {
        const PARTITION_REPAIR = 0x80;
        const ATTACHED_ERROR = 0x40;
        const ATTACHED_EXPENSE = 0x20;
        const ATTACHED_DELAY = 0x10;
        const ATTACHED_DEFAULT = 0x08;
        const OVERLOAD = 0x04;
    }
}

impl LspFlags {
    /// Returns the set bits as a bit-ordered sequence of names, matching
    /// the spec's requirement that flag sets render as an ordered list of
    /// enumerants rather than a raw bitmask.
    pub fn iter_names_ordered(&self) -> Vec<&'static str> {
        const ORDER: &[(LspFlags, &str)] = &[
            (LspFlags::PARTITION_REPAIR, "PARTITION_REPAIR"),
            (LspFlags::ATTACHED_ERROR, "ATTACHED_ERROR"),
            (LspFlags::ATTACHED_EXPENSE, "ATTACHED_EXPENSE"),
            (LspFlags::ATTACHED_DELAY, "ATTACHED_DELAY"),
            (LspFlags::ATTACHED_DEFAULT, "ATTACHED_DEFAULT"),
            (LspFlags::OVERLOAD, "OVERLOAD"),
        ];
        ORDER
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

// Router Capability TLV flags (bit 6 = DOWN, bit 7 = FLOOD per spec §4.2,
// using the standard LSB=bit-0 numbering).
bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    #[derive(Deserialize, Serialize)]
    #[serde(transparent)]
    pub struct RouterCapFlags: u8 {
        const DOWN = 0x40;
        const FLOOD = 0x80;
    }
}

// SR-Algorithm enumerants (IS-IS Router Capability sub-TLV 19).
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(FromPrimitive, ToPrimitive)]
#[derive(Deserialize, Serialize)]
pub enum IgpAlgoType {
    Spf = 0,
    StrictSpf = 1,
}
