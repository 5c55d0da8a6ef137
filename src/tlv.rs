//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeMap;
use std::net::{Ipv4Addr, Ipv6Addr};

use bytes::{Buf, Bytes};
use serde::{Deserialize, Serialize};
use tracing::debug_span;

use crate::bytes_ext::BytesExt;
use crate::consts::{
    Nlpid, NeighborStlvType, PrefixStlvType, RouterCapFlags,
    RouterCapStlvType, TlvType,
};
use crate::error::{Diagnostic, TlvDecodeError, TlvDecodeResult};
use crate::ident::{AreaAddr, SystemId};
use crate::subtlvs::capability::{SrAlgorithmStlv, SrCapabilityStlv};
use crate::subtlvs::neighbor::{
    AdjSidStlv, AdminGroupStlv, Ipv4InterfaceAddrStlv, Ipv4NeighborAddrStlv,
    LinkIdStlv, MaxLinkBwStlv, MaxResvLinkBwStlv, ResidualBwStlv,
    UnreservedBwStlv,
};
use crate::subtlvs::prefix::PrefixSidStlv;

pub const TLV_HDR_SIZE: usize = 2;

/// A raw, unparsed TLV record: one type byte, one length byte, and
/// exactly `length` value bytes.
#[derive(Clone, Debug)]
pub struct RawTlv {
    pub tlv_type: u8,
    pub length: u8,
    pub value: Bytes,
}

/// Splits a byte range into an ordered sequence of raw TLV records.
///
/// Stops at the first malformed record (a dangling type byte with no
/// length byte, or a declared length that runs past the end of the
/// input) and reports it via the second return value, together with
/// whatever well-formed records were read before it. This lets a caller
/// that treats truncation as a soft, per-call failure (the top-level LSP
/// dispatcher) keep everything decoded so far, matching this decoder's
/// general "always return what could be constructed" philosophy.
pub fn split_tlvs(buf: &mut Bytes) -> (Vec<RawTlv>, Option<TlvDecodeError>) {
    let mut tlvs = Vec::new();

    while buf.has_remaining() {
        if buf.remaining() < TLV_HDR_SIZE {
            return (tlvs, Some(TlvDecodeError::Truncated));
        }
        let tlv_type = buf.get_u8();
        let length = buf.get_u8();
        if length as usize > buf.remaining() {
            return (tlvs, Some(TlvDecodeError::Truncated));
        }
        let value = buf.copy_to_bytes(length as usize);
        tlvs.push(RawTlv {
            tlv_type,
            length,
            value,
        });
    }

    (tlvs, None)
}

// ===== Area Addresses (type 1) =====

#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct AreaAddressesTlv {
    pub addresses: Vec<AreaAddr>,
}

impl AreaAddressesTlv {
    pub(crate) fn decode(
        buf: &mut Bytes,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Self {
        let mut addresses = Vec::new();
        while buf.has_remaining() {
            let Ok(addr_len) = buf.try_get_u8() else {
                diagnostics.push(Diagnostic {
                    tlv_path: vec![TlvType::AreaAddresses as u8],
                    error: TlvDecodeError::Truncated,
                });
                break;
            };
            if addr_len == 0
                || addr_len > AreaAddr::MAX_LEN
                || addr_len as usize > buf.remaining()
            {
                diagnostics.push(Diagnostic {
                    tlv_path: vec![TlvType::AreaAddresses as u8],
                    error: TlvDecodeError::InvalidAreaAddrLen(addr_len),
                });
                break;
            }
            let addr_bytes = buf.copy_to_bytes(addr_len as usize);
            addresses.push(AreaAddr::from(addr_bytes.as_ref()));
        }
        AreaAddressesTlv { addresses }
    }
}

// ===== Protocols Supported / NLPID (type 129) =====

#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct ProtocolsSupportedTlv {
    pub protocols: Vec<Nlpid>,
}

impl ProtocolsSupportedTlv {
    pub(crate) fn decode(
        buf: &mut Bytes,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Self {
        let mut protocols = Vec::new();
        while buf.has_remaining() {
            let value = buf.get_u8();
            match Nlpid::from_u8(value) {
                Some(nlpid) => protocols.push(nlpid),
                None => {
                    diagnostics.push(Diagnostic {
                        tlv_path: vec![TlvType::ProtocolsSupported as u8],
                        error: TlvDecodeError::UnsupportedEnumerant(value),
                    });
                }
            }
        }
        ProtocolsSupportedTlv { protocols }
    }
}

// ===== IPv4/IPv6 Interface Addresses (types 132, 232) =====

#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Ipv4AddressesTlv {
    pub addresses: Vec<Ipv4Addr>,
}

impl Ipv4AddressesTlv {
    pub(crate) fn decode(buf: &mut Bytes) -> TlvDecodeResult<Self> {
        if buf.remaining() % 4 != 0 {
            return Err(TlvDecodeError::InvalidLength(buf.remaining() as u8));
        }
        let mut addresses = Vec::new();
        while buf.has_remaining() {
            addresses.push(buf.try_get_ipv4()?);
        }
        Ok(Ipv4AddressesTlv { addresses })
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Ipv6AddressesTlv {
    pub addresses: Vec<Ipv6Addr>,
}

impl Ipv6AddressesTlv {
    pub(crate) fn decode(buf: &mut Bytes) -> TlvDecodeResult<Self> {
        if buf.remaining() % 16 != 0 {
            return Err(TlvDecodeError::InvalidLength(buf.remaining() as u8));
        }
        let mut addresses = Vec::new();
        while buf.has_remaining() {
            addresses.push(buf.try_get_ipv6()?);
        }
        Ok(Ipv6AddressesTlv { addresses })
    }
}

// ===== Extended IS Reachability (type 22) =====

const IS_REACH_ENTRY_FIXED_LEN: usize = 7 + 3 + 1;

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum NeighborStlvValue {
    AdminGroup(Vec<u32>),
    LinkId(Vec<(u32, u32)>),
    Ipv4InterfaceAddr(Vec<Ipv4Addr>),
    Ipv4NeighborAddr(Vec<Ipv4Addr>),
    MaxLinkBw(Vec<[u8; 4]>),
    MaxResvLinkBw(Vec<[u8; 4]>),
    UnreservedBw(Vec<[[u8; 4]; 8]>),
    AdjSid(Vec<AdjSidStlv>),
    ResidualBw(Vec<[u8; 4]>),
}

#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct NeighborInstance {
    pub metric: u32,
    pub subtlvs: BTreeMap<NeighborStlvType, NeighborStlvValue>,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Neighbor {
    pub instances: BTreeMap<u32, NeighborInstance>,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct ExtIsReachTlv {
    pub neighbors: BTreeMap<SystemId, Neighbor>,
}

impl ExtIsReachTlv {
    pub(crate) fn decode(
        buf: &mut Bytes,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Self {
        let mut neighbors: BTreeMap<SystemId, Neighbor> = BTreeMap::new();

        while buf.remaining() >= IS_REACH_ENTRY_FIXED_LEN {
            let _span = debug_span!("IS reachability entry").entered();

            // 7-byte neighbor identifier: 6-byte system-ID followed by a
            // 1-byte pseudonode-ID. The pseudonode byte has no place in
            // the `Neighbor` map (keyed by system-ID alone) and is read
            // and discarded here purely to stay aligned with the rest of
            // the entry.
            let system_id = match SystemId::decode(buf) {
                Ok(id) => id,
                Err(_) => {
                    diagnostics.push(Diagnostic {
                        tlv_path: vec![TlvType::ExtIsReach as u8],
                        error: TlvDecodeError::Truncated,
                    });
                    break;
                }
            };
            buf.advance(1);
            let metric = buf.try_get_u24().unwrap_or(0);
            let stlv_block_len = buf.get_u8();
            if stlv_block_len as usize > buf.remaining() {
                diagnostics.push(Diagnostic {
                    tlv_path: vec![TlvType::ExtIsReach as u8],
                    error: TlvDecodeError::Truncated,
                });
                break;
            }
            let mut stlv_buf = buf.copy_to_bytes(stlv_block_len as usize);

            let mut instance = NeighborInstance {
                metric,
                subtlvs: BTreeMap::new(),
            };
            decode_neighbor_subtlvs(
                &mut stlv_buf,
                &mut instance.subtlvs,
                diagnostics,
            );

            let neighbor = neighbors.entry(system_id).or_default();
            let idx = neighbor.instances.len() as u32;
            neighbor.instances.insert(idx, instance);
        }

        ExtIsReachTlv { neighbors }
    }
}

fn decode_neighbor_subtlvs(
    buf: &mut Bytes,
    subtlvs: &mut BTreeMap<NeighborStlvType, NeighborStlvValue>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    use num_traits::FromPrimitive;

    while buf.remaining() >= TLV_HDR_SIZE {
        let stlv_type = buf.get_u8();
        let stlv_etype = NeighborStlvType::from_u8(stlv_type);
        let stlv_len = buf.get_u8();
        if stlv_len as usize > buf.remaining() {
            diagnostics.push(Diagnostic {
                tlv_path: vec![TlvType::ExtIsReach as u8, stlv_type],
                error: TlvDecodeError::Truncated,
            });
            break;
        }
        let mut stlv_buf = buf.copy_to_bytes(stlv_len as usize);
        let _span = debug_span!("sub-TLV", r#type = stlv_type, length = stlv_len)
            .entered();

        let result = match stlv_etype {
            Some(NeighborStlvType::AdminGroup) => {
                AdminGroupStlv::decode(stlv_len, &mut stlv_buf).map(|v| {
                    push(subtlvs, NeighborStlvType::AdminGroup, v.0, |l, x| {
                        if let NeighborStlvValue::AdminGroup(l) = l {
                            l.push(x)
                        }
                    })
                })
            }
            Some(NeighborStlvType::LinkId) => {
                LinkIdStlv::decode(stlv_len, &mut stlv_buf).map(|v| {
                    push(
                        subtlvs,
                        NeighborStlvType::LinkId,
                        (v.local, v.remote),
                        |l, x| {
                            if let NeighborStlvValue::LinkId(l) = l {
                                l.push(x)
                            }
                        },
                    )
                })
            }
            Some(NeighborStlvType::Ipv4InterfaceAddress) => {
                Ipv4InterfaceAddrStlv::decode(stlv_len, &mut stlv_buf).map(
                    |v| {
                        push(
                            subtlvs,
                            NeighborStlvType::Ipv4InterfaceAddress,
                            v.0,
                            |l, x| {
                                if let NeighborStlvValue::Ipv4InterfaceAddr(l) =
                                    l
                                {
                                    l.push(x)
                                }
                            },
                        )
                    },
                )
            }
            Some(NeighborStlvType::Ipv4NeighborAddress) => {
                Ipv4NeighborAddrStlv::decode(stlv_len, &mut stlv_buf).map(
                    |v| {
                        push(
                            subtlvs,
                            NeighborStlvType::Ipv4NeighborAddress,
                            v.0,
                            |l, x| {
                                if let NeighborStlvValue::Ipv4NeighborAddr(l) =
                                    l
                                {
                                    l.push(x)
                                }
                            },
                        )
                    },
                )
            }
            Some(NeighborStlvType::MaxLinkBandwidth) => {
                MaxLinkBwStlv::decode(stlv_len, &mut stlv_buf).map(|v| {
                    push(
                        subtlvs,
                        NeighborStlvType::MaxLinkBandwidth,
                        v.0,
                        |l, x| {
                            if let NeighborStlvValue::MaxLinkBw(l) = l {
                                l.push(x)
                            }
                        },
                    )
                })
            }
            Some(NeighborStlvType::MaxResvLinkBandwidth) => {
                MaxResvLinkBwStlv::decode(stlv_len, &mut stlv_buf).map(|v| {
                    push(
                        subtlvs,
                        NeighborStlvType::MaxResvLinkBandwidth,
                        v.0,
                        |l, x| {
                            if let NeighborStlvValue::MaxResvLinkBw(l) = l {
                                l.push(x)
                            }
                        },
                    )
                })
            }
            Some(NeighborStlvType::UnreservedBandwidth) => {
                UnreservedBwStlv::decode(stlv_len, &mut stlv_buf).map(|v| {
                    push(
                        subtlvs,
                        NeighborStlvType::UnreservedBandwidth,
                        v.0,
                        |l, x| {
                            if let NeighborStlvValue::UnreservedBw(l) = l {
                                l.push(x)
                            }
                        },
                    )
                })
            }
            Some(NeighborStlvType::ResidualBandwidth) => {
                ResidualBwStlv::decode(stlv_len, &mut stlv_buf).map(|v| {
                    push(
                        subtlvs,
                        NeighborStlvType::ResidualBandwidth,
                        v.0,
                        |l, x| {
                            if let NeighborStlvValue::ResidualBw(l) = l {
                                l.push(x)
                            }
                        },
                    )
                })
            }
            Some(NeighborStlvType::AdjacencySid) => {
                AdjSidStlv::decode(false, &mut stlv_buf).map(|v| {
                    push(subtlvs, NeighborStlvType::AdjacencySid, v, |l, x| {
                        if let NeighborStlvValue::AdjSid(l) = l {
                            l.push(x)
                        }
                    })
                })
            }
            Some(NeighborStlvType::LanAdjacencySid) => {
                AdjSidStlv::decode(true, &mut stlv_buf).map(|v| {
                    push(
                        subtlvs,
                        NeighborStlvType::LanAdjacencySid,
                        v,
                        |l, x| {
                            if let NeighborStlvValue::AdjSid(l) = l {
                                l.push(x)
                            }
                        },
                    )
                })
            }
            None => {
                diagnostics.push(Diagnostic {
                    tlv_path: vec![TlvType::ExtIsReach as u8, stlv_type],
                    error: TlvDecodeError::UnsupportedEnumerant(stlv_type),
                });
                continue;
            }
        };

        if let Err(error) = result {
            error.log();
            diagnostics.push(Diagnostic {
                tlv_path: vec![TlvType::ExtIsReach as u8, stlv_type],
                error,
            });
        }
    }
}

// Inserts or appends a sub-TLV value into its type-keyed variant,
// constructing the variant on first encounter (as the spec's map-of-
// tagged-union design note describes) and appending on every subsequent
// occurrence of the same sub-TLV type.
fn push<T>(
    map: &mut BTreeMap<NeighborStlvType, NeighborStlvValue>,
    key: NeighborStlvType,
    value: T,
    append: impl Fn(&mut NeighborStlvValue, T),
) {
    let entry = map.entry(key).or_insert_with(|| match key {
        NeighborStlvType::AdminGroup => NeighborStlvValue::AdminGroup(vec![]),
        NeighborStlvType::LinkId => NeighborStlvValue::LinkId(vec![]),
        NeighborStlvType::Ipv4InterfaceAddress => {
            NeighborStlvValue::Ipv4InterfaceAddr(vec![])
        }
        NeighborStlvType::Ipv4NeighborAddress => {
            NeighborStlvValue::Ipv4NeighborAddr(vec![])
        }
        NeighborStlvType::MaxLinkBandwidth => {
            NeighborStlvValue::MaxLinkBw(vec![])
        }
        NeighborStlvType::MaxResvLinkBandwidth => {
            NeighborStlvValue::MaxResvLinkBw(vec![])
        }
        NeighborStlvType::UnreservedBandwidth => {
            NeighborStlvValue::UnreservedBw(vec![])
        }
        NeighborStlvType::AdjacencySid | NeighborStlvType::LanAdjacencySid => {
            NeighborStlvValue::AdjSid(vec![])
        }
        NeighborStlvType::ResidualBandwidth => {
            NeighborStlvValue::ResidualBw(vec![])
        }
    });
    append(entry, value);
}

// ===== Extended IPv4 Reachability (type 135) =====

const CONTROL_UPDOWN_BIT: u8 = 0x80;
const CONTROL_SUBTLVS_BIT: u8 = 0x40;
const CONTROL_PLEN_MASK: u8 = 0x3f;

#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Ipv4PrefixEntry {
    pub metric: u32,
    pub up_down: bool,
    pub sub_tlvs_present: bool,
    pub prefix_sids: BTreeMap<u32, PrefixSidStlv>,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct ExtIpv4ReachTlv {
    pub prefixes: BTreeMap<String, Ipv4PrefixEntry>,
}

fn prefix_wire_len(prefix_len: u8) -> usize {
    prefix_len.div_ceil(8) as usize
}

impl ExtIpv4ReachTlv {
    pub(crate) fn decode(
        buf: &mut Bytes,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Self {
        let mut prefixes = BTreeMap::new();

        while buf.remaining() >= 5 {
            if let Err(error) =
                Self::decode_one(buf, &mut prefixes, diagnostics)
            {
                error.log();
                diagnostics.push(Diagnostic {
                    tlv_path: vec![TlvType::ExtIpv4Reach as u8],
                    error,
                });
                break;
            }
        }

        ExtIpv4ReachTlv { prefixes }
    }

    fn decode_one(
        buf: &mut Bytes,
        prefixes: &mut BTreeMap<String, Ipv4PrefixEntry>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> TlvDecodeResult<()> {
        let metric = buf.try_get_u32()?;
        let control = buf.try_get_u8()?;
        let up_down = control & CONTROL_UPDOWN_BIT != 0;
        let sub_tlvs_present = control & CONTROL_SUBTLVS_BIT != 0;
        let prefix_len = control & CONTROL_PLEN_MASK;
        if prefix_len > 32 {
            return Err(TlvDecodeError::InvalidPrefixLength(prefix_len));
        }

        let wire_len = prefix_wire_len(prefix_len);
        if wire_len > buf.remaining() {
            return Err(TlvDecodeError::Truncated);
        }
        let mut octets = [0u8; 4];
        octets[..wire_len].copy_from_slice(&buf.copy_to_bytes(wire_len));
        let addr = Ipv4Addr::from(octets);

        let mut prefix_sids = BTreeMap::new();
        if sub_tlvs_present {
            let stlv_block_len = buf.try_get_u8()?;
            if stlv_block_len as usize > buf.remaining() {
                return Err(TlvDecodeError::Truncated);
            }
            let mut stlv_buf = buf.copy_to_bytes(stlv_block_len as usize);
            decode_prefix_subtlvs(
                &mut stlv_buf,
                &mut prefix_sids,
                diagnostics,
                TlvType::ExtIpv4Reach as u8,
            );
        }

        let key = format!("{addr}/{prefix_len}");
        if prefixes.contains_key(&key) {
            return Err(TlvDecodeError::DuplicatePrefixKey(key));
        }
        prefixes.insert(
            key,
            Ipv4PrefixEntry {
                metric,
                up_down,
                sub_tlvs_present,
                prefix_sids,
            },
        );
        Ok(())
    }
}

// ===== IPv6 Reachability (type 236) =====

const IPV6_FLAG_UPDOWN: u8 = 0x80;
const IPV6_FLAG_EXTERNAL: u8 = 0x40;
const IPV6_FLAG_SUBTLVS: u8 = 0x20;

#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Ipv6PrefixEntry {
    pub metric: u32,
    pub up_down: bool,
    pub external: bool,
    pub sub_tlvs_present: bool,
    pub prefix_sids: BTreeMap<u32, PrefixSidStlv>,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Ipv6ReachTlv {
    pub prefixes: BTreeMap<String, Ipv6PrefixEntry>,
}

impl Ipv6ReachTlv {
    pub(crate) fn decode(
        buf: &mut Bytes,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Self {
        let mut prefixes = BTreeMap::new();

        while buf.remaining() >= 6 {
            if let Err(error) =
                Self::decode_one(buf, &mut prefixes, diagnostics)
            {
                error.log();
                diagnostics.push(Diagnostic {
                    tlv_path: vec![TlvType::Ipv6Reach as u8],
                    error,
                });
                break;
            }
        }

        Ipv6ReachTlv { prefixes }
    }

    fn decode_one(
        buf: &mut Bytes,
        prefixes: &mut BTreeMap<String, Ipv6PrefixEntry>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> TlvDecodeResult<()> {
        let metric = buf.try_get_u32()?;
        let flags = buf.try_get_u8()?;
        let up_down = flags & IPV6_FLAG_UPDOWN != 0;
        let external = flags & IPV6_FLAG_EXTERNAL != 0;
        let sub_tlvs_present = flags & IPV6_FLAG_SUBTLVS != 0;

        let prefix_len = buf.try_get_u8()?;
        if prefix_len > 128 {
            return Err(TlvDecodeError::InvalidPrefixLength(prefix_len));
        }
        let wire_len = prefix_wire_len(prefix_len);
        if wire_len > buf.remaining() {
            return Err(TlvDecodeError::Truncated);
        }
        let mut octets = [0u8; 16];
        octets[..wire_len].copy_from_slice(&buf.copy_to_bytes(wire_len));
        let addr = Ipv6Addr::from(octets);

        let mut prefix_sids = BTreeMap::new();
        if sub_tlvs_present {
            let stlv_block_len = buf.try_get_u8()?;
            if stlv_block_len as usize > buf.remaining() {
                return Err(TlvDecodeError::Truncated);
            }
            let mut stlv_buf = buf.copy_to_bytes(stlv_block_len as usize);
            decode_prefix_subtlvs(
                &mut stlv_buf,
                &mut prefix_sids,
                diagnostics,
                TlvType::Ipv6Reach as u8,
            );
        }

        let key = format!("{addr}/{prefix_len}");
        if prefixes.contains_key(&key) {
            return Err(TlvDecodeError::DuplicatePrefixKey(key));
        }
        prefixes.insert(
            key,
            Ipv6PrefixEntry {
                metric,
                up_down,
                external,
                sub_tlvs_present,
                prefix_sids,
            },
        );
        Ok(())
    }
}

fn decode_prefix_subtlvs(
    buf: &mut Bytes,
    prefix_sids: &mut BTreeMap<u32, PrefixSidStlv>,
    diagnostics: &mut Vec<Diagnostic>,
    owner_tlv_type: u8,
) {
    use num_traits::FromPrimitive;

    while buf.remaining() >= TLV_HDR_SIZE {
        let stlv_type = buf.get_u8();
        let stlv_etype = PrefixStlvType::from_u8(stlv_type);
        let stlv_len = buf.get_u8();
        if stlv_len as usize > buf.remaining() {
            diagnostics.push(Diagnostic {
                tlv_path: vec![owner_tlv_type, stlv_type],
                error: TlvDecodeError::Truncated,
            });
            break;
        }
        let mut stlv_buf = buf.copy_to_bytes(stlv_len as usize);

        match stlv_etype {
            Some(PrefixStlvType::PrefixSid) => {
                match PrefixSidStlv::decode(stlv_len, &mut stlv_buf) {
                    Ok(sid) => {
                        prefix_sids.insert(sid.key(), sid);
                    }
                    Err(error) => {
                        error.log();
                        diagnostics.push(Diagnostic {
                            tlv_path: vec![owner_tlv_type, stlv_type],
                            error,
                        });
                    }
                }
            }
            None => {
                diagnostics.push(Diagnostic {
                    tlv_path: vec![owner_tlv_type, stlv_type],
                    error: TlvDecodeError::UnsupportedEnumerant(stlv_type),
                });
            }
        }
    }
}

// ===== Router Capability (type 242) =====

#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Capability {
    pub router_id: Option<Ipv4Addr>,
    pub flags: RouterCapFlags,
    pub sr_capability: Option<SrCapabilityStlv>,
    pub sr_algorithm: Option<SrAlgorithmStlv>,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct RouterCapTlv {
    pub capabilities: BTreeMap<u32, Capability>,
}

impl RouterCapTlv {
    pub(crate) fn decode(
        buf: &mut Bytes,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> TlvDecodeResult<Capability> {
        use num_traits::FromPrimitive;

        let router_id = {
            let addr = buf.try_get_ipv4()?;
            (!addr.is_unspecified()).then_some(addr)
        };
        let flags = buf.try_get_u8()?;
        let flags = RouterCapFlags::from_bits_truncate(flags);

        let mut sr_capability = None;
        let mut sr_algorithm = None;

        while buf.remaining() >= TLV_HDR_SIZE {
            let stlv_type = buf.get_u8();
            let stlv_etype = RouterCapStlvType::from_u8(stlv_type);
            let stlv_len = buf.get_u8();
            if stlv_len as usize > buf.remaining() {
                diagnostics.push(Diagnostic {
                    tlv_path: vec![TlvType::RouterCapability as u8, stlv_type],
                    error: TlvDecodeError::Truncated,
                });
                break;
            }
            let mut stlv_buf = buf.copy_to_bytes(stlv_len as usize);

            let result: TlvDecodeResult<()> = match stlv_etype {
                Some(RouterCapStlvType::SrCapability) => {
                    SrCapabilityStlv::decode(stlv_len, &mut stlv_buf)
                        .map(|v| sr_capability = Some(v))
                }
                Some(RouterCapStlvType::SrAlgorithm) => {
                    SrAlgorithmStlv::decode(stlv_len, &mut stlv_buf)
                        .map(|v| sr_algorithm = Some(v))
                }
                None => {
                    diagnostics.push(Diagnostic {
                        tlv_path: vec![
                            TlvType::RouterCapability as u8,
                            stlv_type,
                        ],
                        error: TlvDecodeError::UnsupportedEnumerant(
                            stlv_type,
                        ),
                    });
                    continue;
                }
            };

            if let Err(error) = result {
                error.log();
                diagnostics.push(Diagnostic {
                    tlv_path: vec![TlvType::RouterCapability as u8, stlv_type],
                    error,
                });
            }
        }

        Ok(Capability {
            router_id,
            flags,
            sr_capability,
            sr_algorithm,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::IgpAlgoType;
    use crate::sid::Sid;
    use crate::subtlvs::neighbor::AdjSidFlags;

    // Scenario 4 from the spec, extended with a trailing Adjacency-SID
    // sub-TLV: one neighbor, metric 10, index-form SID 100.
    #[test]
    fn ext_is_reach_decodes_one_neighbor_with_adjacency_sid() {
        let raw: &[u8] = &[
            0x00, 0x00, 0x40, 0x00, 0xce, 0x39, // system-id
            0x01, // pseudonode
            0x00, 0x00, 0x0a, // metric
            0x08, // sub-TLV block length
            31, 6, // Adjacency-SID sub-TLV
            0x00, 0x00, // flags, weight
            0x00, 0x00, 0x00, 0x64, // index SID = 100
        ];
        let mut buf = Bytes::copy_from_slice(raw);
        let mut diagnostics = Vec::new();
        let tlv = ExtIsReachTlv::decode(&mut buf, &mut diagnostics);

        assert!(diagnostics.is_empty());
        assert_eq!(tlv.neighbors.len(), 1);
        let neighbor = tlv.neighbors.values().next().unwrap();
        assert_eq!(neighbor.instances.len(), 1);
        let instance = neighbor.instances.get(&0).unwrap();
        assert_eq!(instance.metric, 10);

        let Some(NeighborStlvValue::AdjSid(sids)) =
            instance.subtlvs.get(&NeighborStlvType::AdjacencySid)
        else {
            panic!("expected AdjSid sub-TLV");
        };
        assert_eq!(sids.len(), 1);
        assert!(matches!(sids[0].sid, Sid::Index(100)));
        assert!(!sids[0].flags.contains(AdjSidFlags::VALUE));
    }

    #[test]
    fn ext_is_reach_truncated_entry_stops_with_diagnostic() {
        // 11 bytes (the fixed entry length) but the sub-TLV block length
        // byte claims 5 more bytes than actually follow.
        let raw: &[u8] = &[
            0x00, 0x00, 0x40, 0x00, 0xce, 0x39, 0x01, 0x00, 0x00, 0x0a, 0x05,
        ];
        let mut buf = Bytes::copy_from_slice(raw);
        let mut diagnostics = Vec::new();
        let tlv = ExtIsReachTlv::decode(&mut buf, &mut diagnostics);

        assert!(tlv.neighbors.is_empty());
        assert_eq!(diagnostics.len(), 1);
        assert!(matches!(diagnostics[0].error, TlvDecodeError::Truncated));
    }

    // Scenario 5 from the spec: Extended IPv4 Reachability with a
    // Prefix-SID sub-TLV.
    #[test]
    fn ext_ipv4_reach_decodes_prefix_with_prefix_sid() {
        let raw: &[u8] = &[
            0x00, 0x00, 0x00, 0x0a, // metric
            0xe0, // control: up/down + sub-TLVs present, /32
            0x64, 0x01, 0x01, 0x0d, // prefix 100.1.1.13
            0x08, // sub-TLV block length
            3, 6, // Prefix-SID sub-TLV
            0x40, 0x00, // flags (NODE), algo (SPF)
            0x00, 0x00, 0x00, 0xc8, // index SID = 200
        ];
        let mut buf = Bytes::copy_from_slice(raw);
        let mut diagnostics = Vec::new();
        let tlv = ExtIpv4ReachTlv::decode(&mut buf, &mut diagnostics);

        assert!(diagnostics.is_empty());
        let entry = tlv.prefixes.get("100.1.1.13/32").unwrap();
        assert_eq!(entry.metric, 10);
        assert!(entry.up_down);
        assert!(entry.sub_tlvs_present);
        let sid = entry.prefix_sids.get(&200).unwrap();
        assert_eq!(sid.algo, IgpAlgoType::Spf);
    }

    #[test]
    fn router_capability_decodes_router_id_and_flags() {
        let raw: &[u8] = &[
            0x01, 0x01, 0x01, 0x01, // router-id
            0xc0, // flags: DOWN | FLOOD
        ];
        let mut buf = Bytes::copy_from_slice(raw);
        let mut diagnostics = Vec::new();
        let capability =
            RouterCapTlv::decode(&mut buf, &mut diagnostics).unwrap();

        assert_eq!(capability.router_id, Some(Ipv4Addr::new(1, 1, 1, 1)));
        assert!(capability.flags.contains(RouterCapFlags::DOWN));
        assert!(capability.flags.contains(RouterCapFlags::FLOOD));
        assert!(capability.sr_capability.is_none());
    }
}
