//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeSet;

use bitflags::bitflags;
use bytes::{Buf, Bytes};
use derive_new::new;
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};

use crate::bytes_ext::BytesExt;
use crate::consts::{IgpAlgoType, LabelBindingStlvType};
use crate::error::{TlvDecodeError, TlvDecodeResult};
use crate::sid::{Label, Sid};

bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    #[derive(Deserialize, Serialize)]
    #[serde(transparent)]
    pub struct SrCapabilitiesFlags: u8 {
        const IPV4_MPLS = 0x80;
        const IPV6_MPLS = 0x40;
    }
}

/// One SRGB descriptor: a label/index range starting at `first`, spanning
/// `range` consecutive values. Descriptors are kept in encounter order so
/// their index in the `Vec` doubles as the spec's sequential descriptor
/// index (0, 1, 2, …).
#[derive(Clone, Copy, Debug, PartialEq)]
#[derive(new)]
#[derive(Deserialize, Serialize)]
pub struct SrgbDescriptor {
    pub range: u32,
    pub first: Sid,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(new)]
#[derive(Deserialize, Serialize)]
pub struct SrCapabilityStlv {
    pub flags: SrCapabilitiesFlags,
    pub srgb_entries: Vec<SrgbDescriptor>,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(new)]
#[derive(Deserialize, Serialize)]
pub struct SrAlgorithmStlv(pub BTreeSet<IgpAlgoType>);

// ===== impl SrCapabilityStlv =====

impl SrCapabilityStlv {
    const MIN_SIZE: usize = 1;

    pub(crate) fn decode(
        stlv_len: u8,
        buf: &mut Bytes,
    ) -> TlvDecodeResult<Self> {
        if (stlv_len as usize) < Self::MIN_SIZE {
            return Err(TlvDecodeError::InvalidLength(stlv_len));
        }

        let flags = buf.try_get_u8()?;
        let flags = SrCapabilitiesFlags::from_bits_truncate(flags);

        let mut srgb_entries = vec![];
        while buf.remaining() >= 1 {
            match SrgbDescriptor::decode(buf) {
                Ok(Some(entry)) => srgb_entries.push(entry),
                Ok(None) => continue,
                Err(error) => {
                    error.log();
                    break;
                }
            }
        }

        Ok(SrCapabilityStlv {
            flags,
            srgb_entries,
        })
    }
}

// ===== impl SrgbDescriptor =====

impl SrgbDescriptor {
    pub(crate) fn decode(
        buf: &mut Bytes,
    ) -> TlvDecodeResult<Option<Self>> {
        let range = buf.try_get_u24()?;

        let stlv_type = buf.try_get_u8()?;
        let stlv_len = buf.try_get_u8()?;
        if stlv_len as usize > buf.remaining() {
            return Err(TlvDecodeError::Truncated);
        }
        let mut value = buf.copy_to_bytes(stlv_len as usize);

        if stlv_type != LabelBindingStlvType::SidLabel as u8 {
            // Unknown SID/Label inner type: non-fatal, skip this
            // descriptor and keep parsing the rest of the SRGB.
            return Ok(None);
        }

        let first = match stlv_len {
            4 => Sid::Index(value.try_get_u32()?),
            3 => {
                let label = value.try_get_u24()? & Label::VALUE_MASK;
                Sid::Label(Label::new(label))
            }
            _ => return Err(TlvDecodeError::InvalidLength(stlv_len)),
        };

        Ok(Some(SrgbDescriptor { range, first }))
    }
}

// ===== impl SrAlgorithmStlv =====

impl SrAlgorithmStlv {
    pub(crate) fn decode(
        stlv_len: u8,
        buf: &mut Bytes,
    ) -> TlvDecodeResult<Self> {
        let mut list = BTreeSet::new();
        for _ in 0..stlv_len {
            let algo = buf.try_get_u8()?;
            match IgpAlgoType::from_u8(algo) {
                Some(algo) => {
                    list.insert(algo);
                }
                None => {
                    TlvDecodeError::UnsupportedEnumerant(algo).log();
                }
            }
        }
        Ok(SrAlgorithmStlv(list))
    }
}
