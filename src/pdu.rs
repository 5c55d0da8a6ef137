//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use bytes::{Buf, Bytes};
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};
use tracing::debug_span;

use crate::bytes_ext::BytesExt;
use crate::consts::{LspFlags, TlvType};
use crate::error::{Diagnostic, HeaderDecodeError, HeaderDecodeResult, TlvDecodeError};
use crate::ident::LspId;
use crate::tlv::{
    AreaAddressesTlv, Capability, ExtIpv4ReachTlv, ExtIsReachTlv,
    Ipv4AddressesTlv, Ipv6AddressesTlv, Ipv6ReachTlv, ProtocolsSupportedTlv,
    RouterCapTlv, TLV_HDR_SIZE,
};

/// One top-level TLV's decoded value, tagged by [`TlvType`]. The LSP
/// stores at most one `TlvValue` per variant; a repeated occurrence of
/// the same top-level TLV type merges into the existing value rather
/// than replacing it (see [`Lsp::decode`]).
#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum TlvValue {
    AreaAddresses(AreaAddressesTlv),
    ExtIsReach(ExtIsReachTlv),
    ProtocolsSupported(ProtocolsSupportedTlv),
    Ipv4Addresses(Ipv4AddressesTlv),
    Ipv4RouterId(Ipv4Addr),
    ExtIpv4Reach(ExtIpv4ReachTlv),
    DynamicHostname(String),
    Ipv6Addresses(Ipv6AddressesTlv),
    Ipv6Reach(Ipv6ReachTlv),
    RouterCapability(RouterCapTlv),
}

/// A decoded IS-IS Link State PDU.
///
/// Per-TLV failures never abort the whole decode: every soft or
/// TLV-scoped error is instead recorded in `diagnostics` and the rest of
/// the PDU continues to be parsed. Only a malformed fixed header (fewer
/// than [`Lsp::HEADER_LEN`] bytes) is fatal.
#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Lsp {
    pub lsp_id: LspId,
    pub sequence_number: u32,
    pub checksum: u16,
    pub flags: LspFlags,
    pub tlvs: BTreeMap<TlvType, TlvValue>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Lsp {
    /// Size in bytes of the fixed LSP header: LSP-ID (7) + LSP number (1)
    /// + sequence number (4) + checksum (2) + flags (1).
    pub const HEADER_LEN: usize = 15;

    /// External decoder entry point: applies a caller-supplied byte
    /// offset (to skip whatever precedes the LSP-ID field in the
    /// caller's own framing) and decodes the LSP starting there.
    ///
    /// Returns `(None, false)` only on a fatal header-level failure
    /// (input shorter than [`Self::HEADER_LEN`] once the offset is
    /// applied); a successfully decoded LSP is always returned alongside
    /// `true`, with any per-TLV diagnostics reachable through
    /// [`Lsp::diagnostics`].
    pub fn decode_at(bytes: &[u8], offset: usize) -> (Option<Self>, bool) {
        let Some(bytes) = bytes.get(offset..) else {
            return (None, false);
        };
        let mut buf = Bytes::copy_from_slice(bytes);
        match Self::decode(&mut buf) {
            Ok(lsp) => (Some(lsp), true),
            Err(_) => (None, false),
        }
    }

    pub fn decode(buf: &mut Bytes) -> HeaderDecodeResult<Self> {
        if buf.remaining() < Self::HEADER_LEN {
            return Err(HeaderDecodeError::Truncated);
        }

        let lsp_id = LspId::decode(buf)?;
        let sequence_number = buf.try_get_u32()?;
        let checksum = buf.try_get_u16()?;
        let flags = buf.try_get_u8()?;
        let flags = LspFlags::from_bits_truncate(flags);

        let span = debug_span!("LSP", lsp_id = %lsp_id, sequence_number);
        let _span_guard = span.enter();

        let mut tlvs = BTreeMap::new();
        let mut diagnostics = Vec::new();

        while buf.has_remaining() {
            if buf.remaining() < TLV_HDR_SIZE {
                diagnostics.push(Diagnostic {
                    tlv_path: vec![buf.chunk()[0]],
                    error: TlvDecodeError::Truncated,
                });
                break;
            }
            let tlv_type = buf.get_u8();
            let tlv_etype = TlvType::from_u8(tlv_type);
            let tlv_len = buf.get_u8();
            if tlv_len as usize > buf.remaining() {
                diagnostics.push(Diagnostic {
                    tlv_path: vec![tlv_type],
                    error: TlvDecodeError::Truncated,
                });
                break;
            }

            let _span = debug_span!(
                "TLV",
                r#type = tlv_type,
                length = tlv_len
            )
            .entered();
            let mut tlv_buf = buf.copy_to_bytes(tlv_len as usize);

            let Some(tlv_etype) = tlv_etype else {
                diagnostics.push(Diagnostic {
                    tlv_path: vec![tlv_type],
                    error: TlvDecodeError::UnsupportedEnumerant(tlv_type),
                });
                continue;
            };

            decode_top_level_tlv(
                tlv_etype,
                tlv_len,
                &mut tlv_buf,
                &mut tlvs,
                &mut diagnostics,
            );
        }

        Ok(Lsp {
            lsp_id,
            sequence_number,
            checksum,
            flags,
            tlvs,
            diagnostics,
        })
    }
}

fn decode_top_level_tlv(
    tlv_etype: TlvType,
    tlv_len: u8,
    buf: &mut Bytes,
    tlvs: &mut BTreeMap<TlvType, TlvValue>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match tlv_etype {
        TlvType::AreaAddresses => {
            let decoded = AreaAddressesTlv::decode(buf, diagnostics);
            match tlvs.get_mut(&tlv_etype) {
                Some(TlvValue::AreaAddresses(existing)) => {
                    existing.addresses.extend(decoded.addresses);
                }
                _ => {
                    tlvs.insert(tlv_etype, TlvValue::AreaAddresses(decoded));
                }
            }
        }
        TlvType::ExtIsReach => {
            let decoded = ExtIsReachTlv::decode(buf, diagnostics);
            match tlvs.get_mut(&tlv_etype) {
                Some(TlvValue::ExtIsReach(existing)) => {
                    for (system_id, neighbor) in decoded.neighbors {
                        let target =
                            existing.neighbors.entry(system_id).or_default();
                        for instance in neighbor.instances.into_values() {
                            let idx = target.instances.len() as u32;
                            target.instances.insert(idx, instance);
                        }
                    }
                }
                _ => {
                    tlvs.insert(tlv_etype, TlvValue::ExtIsReach(decoded));
                }
            }
        }
        TlvType::ProtocolsSupported => {
            if tlvs.contains_key(&tlv_etype) {
                diagnostics.push(Diagnostic {
                    tlv_path: vec![tlv_etype as u8],
                    error: TlvDecodeError::UnexpectedType(tlv_etype as u8),
                });
                return;
            }
            let decoded = ProtocolsSupportedTlv::decode(buf, diagnostics);
            tlvs.insert(tlv_etype, TlvValue::ProtocolsSupported(decoded));
        }
        TlvType::Ipv4Addresses => {
            match Ipv4AddressesTlv::decode(buf) {
                Ok(decoded) => match tlvs.get_mut(&tlv_etype) {
                    Some(TlvValue::Ipv4Addresses(existing)) => {
                        existing.addresses.extend(decoded.addresses);
                    }
                    _ => {
                        tlvs.insert(
                            tlv_etype,
                            TlvValue::Ipv4Addresses(decoded),
                        );
                    }
                },
                Err(error) => {
                    error.log();
                    diagnostics.push(Diagnostic {
                        tlv_path: vec![tlv_etype as u8],
                        error,
                    });
                }
            }
        }
        TlvType::Ipv4RouterId => {
            if tlvs.contains_key(&tlv_etype) {
                diagnostics.push(Diagnostic {
                    tlv_path: vec![tlv_etype as u8],
                    error: TlvDecodeError::UnexpectedType(tlv_etype as u8),
                });
                return;
            }
            if tlv_len != 4 {
                diagnostics.push(Diagnostic {
                    tlv_path: vec![tlv_etype as u8],
                    error: TlvDecodeError::InvalidLength(tlv_len),
                });
                return;
            }
            match buf.try_get_ipv4() {
                Ok(addr) => {
                    tlvs.insert(tlv_etype, TlvValue::Ipv4RouterId(addr));
                }
                Err(error) => {
                    let error = TlvDecodeError::from(error);
                    error.log();
                    diagnostics.push(Diagnostic {
                        tlv_path: vec![tlv_etype as u8],
                        error,
                    });
                }
            }
        }
        TlvType::ExtIpv4Reach => {
            let decoded = ExtIpv4ReachTlv::decode(buf, diagnostics);
            match tlvs.get_mut(&tlv_etype) {
                Some(TlvValue::ExtIpv4Reach(existing)) => {
                    for (key, entry) in decoded.prefixes {
                        existing.prefixes.entry(key).or_insert(entry);
                    }
                }
                _ => {
                    tlvs.insert(tlv_etype, TlvValue::ExtIpv4Reach(decoded));
                }
            }
        }
        TlvType::DynamicHostname => {
            if tlvs.contains_key(&tlv_etype) {
                diagnostics.push(Diagnostic {
                    tlv_path: vec![tlv_etype as u8],
                    error: TlvDecodeError::UnexpectedType(tlv_etype as u8),
                });
                return;
            }
            let hostname =
                String::from_utf8_lossy(buf.chunk()).into_owned();
            tlvs.insert(tlv_etype, TlvValue::DynamicHostname(hostname));
        }
        TlvType::Ipv6Addresses => {
            match Ipv6AddressesTlv::decode(buf) {
                Ok(decoded) => match tlvs.get_mut(&tlv_etype) {
                    Some(TlvValue::Ipv6Addresses(existing)) => {
                        existing.addresses.extend(decoded.addresses);
                    }
                    _ => {
                        tlvs.insert(
                            tlv_etype,
                            TlvValue::Ipv6Addresses(decoded),
                        );
                    }
                },
                Err(error) => {
                    error.log();
                    diagnostics.push(Diagnostic {
                        tlv_path: vec![tlv_etype as u8],
                        error,
                    });
                }
            }
        }
        TlvType::Ipv6Reach => {
            let decoded = Ipv6ReachTlv::decode(buf, diagnostics);
            match tlvs.get_mut(&tlv_etype) {
                Some(TlvValue::Ipv6Reach(existing)) => {
                    for (key, entry) in decoded.prefixes {
                        existing.prefixes.entry(key).or_insert(entry);
                    }
                }
                _ => {
                    tlvs.insert(tlv_etype, TlvValue::Ipv6Reach(decoded));
                }
            }
        }
        TlvType::RouterCapability => {
            match RouterCapTlv::decode(buf, diagnostics) {
                Ok(capability) => {
                    insert_capability(tlvs, tlv_etype, capability)
                }
                Err(error) => {
                    error.log();
                    diagnostics.push(Diagnostic {
                        tlv_path: vec![tlv_etype as u8],
                        error,
                    });
                }
            }
        }
    }
}

fn insert_capability(
    tlvs: &mut BTreeMap<TlvType, TlvValue>,
    tlv_etype: TlvType,
    capability: Capability,
) {
    match tlvs.get_mut(&tlv_etype) {
        Some(TlvValue::RouterCapability(existing)) => {
            let idx = existing.capabilities.len() as u32;
            existing.capabilities.insert(idx, capability);
        }
        _ => {
            let mut capabilities = BTreeMap::new();
            capabilities.insert(0, capability);
            tlvs.insert(
                tlv_etype,
                TlvValue::RouterCapability(RouterCapTlv { capabilities }),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Scenario 1: a 16-byte LSP with an empty TLV section except for one
    // dangling type byte (no following length byte).
    #[test]
    fn decode_minimal_with_dangling_tlv_type() {
        let raw: &[u8] = &[
            0x00, 0x00, 0x40, 0x00, 0xce, 0x39, 0x00, 0x00, // LSP-ID
            0x00, 0x00, 0x14, 0x26, // sequence number = 5158
            0x27, 0x7f, // checksum
            0x03, // flags
            0x01, // dangling TLV type byte
        ];
        let mut buf = Bytes::copy_from_slice(raw);
        let lsp = Lsp::decode(&mut buf).unwrap();

        assert_eq!(lsp.lsp_id.to_string(), "0000.4000.ce39.00-00");
        assert_eq!(lsp.sequence_number, 5158);
        assert_eq!(lsp.checksum, 0x277f);
        assert!(lsp.tlvs.is_empty());
        assert_eq!(lsp.diagnostics.len(), 1);
        assert!(matches!(
            lsp.diagnostics[0].error,
            TlvDecodeError::Truncated
        ));
    }

    #[test]
    fn decode_header_too_short() {
        let raw: &[u8] = &[0x00; 10];
        let mut buf = Bytes::copy_from_slice(raw);
        assert!(matches!(
            Lsp::decode(&mut buf),
            Err(HeaderDecodeError::Truncated)
        ));
    }

    #[test]
    fn decode_at_applies_offset_and_rejects_short_input() {
        let mut raw = vec![0xff, 0xff, 0xff]; // leading bytes to discard
        raw.extend_from_slice(&[
            0x00, 0x00, 0x40, 0x00, 0xce, 0x39, 0x00, 0x00, // LSP-ID
            0x00, 0x00, 0x14, 0x26, // sequence number
            0x27, 0x7f, // checksum
            0x03, // flags
        ]);
        let (lsp, parsed) = Lsp::decode_at(&raw, 3);
        assert!(parsed);
        assert_eq!(lsp.unwrap().lsp_id.to_string(), "0000.4000.ce39.00-00");

        let (lsp, parsed) = Lsp::decode_at(&raw, raw.len());
        assert!(!parsed);
        assert!(lsp.is_none());
    }

    #[test]
    fn decode_area_addresses() {
        let mut tlv_value = vec![7u8, 0x39, 0x75, 0x2f, 0x01, 0x00, 0x00, 0x14];
        let mut header: Vec<u8> = vec![
            0x00, 0x00, 0x40, 0x00, 0xce, 0x39, 0x00, 0x00, 0x00, 0x00, 0x14,
            0x26, 0x27, 0x7f, 0x03, TlvType::AreaAddresses as u8,
            tlv_value.len() as u8,
        ];
        header.append(&mut tlv_value);
        let mut buf = Bytes::copy_from_slice(&header);
        let lsp = Lsp::decode(&mut buf).unwrap();

        let TlvValue::AreaAddresses(tlv) =
            lsp.tlvs.get(&TlvType::AreaAddresses).unwrap()
        else {
            panic!("expected AreaAddresses TLV");
        };
        assert_eq!(tlv.addresses.len(), 1);
        assert_eq!(tlv.addresses[0].to_string(), "39.752f0100.0014");
        assert!(lsp.diagnostics.is_empty());
    }
}
