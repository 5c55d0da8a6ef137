//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::Ipv4Addr;

use bitflags::bitflags;
use bytes::{Buf, Bytes};
use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::bytes_ext::BytesExt;
use crate::error::{TlvDecodeError, TlvDecodeResult};
use crate::ident::SystemId;
use crate::sid::{Label, Sid};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(new)]
#[derive(Deserialize, Serialize)]
pub struct AdminGroupStlv(pub u32);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(new)]
#[derive(Deserialize, Serialize)]
pub struct LinkIdStlv {
    pub local: u32,
    pub remote: u32,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(new)]
#[derive(Deserialize, Serialize)]
pub struct Ipv4InterfaceAddrStlv(pub Ipv4Addr);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(new)]
#[derive(Deserialize, Serialize)]
pub struct Ipv4NeighborAddrStlv(pub Ipv4Addr);

// Bandwidth sub-TLVs are kept as the 4 opaque wire bytes rather than a
// native f32, matching the downstream leaf shape; decode still validates
// that the bytes parse as a finite float so a garbled width is rejected.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(new)]
#[derive(Deserialize, Serialize)]
pub struct MaxLinkBwStlv(pub [u8; 4]);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(new)]
#[derive(Deserialize, Serialize)]
pub struct MaxResvLinkBwStlv(pub [u8; 4]);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(new)]
#[derive(Deserialize, Serialize)]
pub struct ResidualBwStlv(pub [u8; 4]);

#[derive(Clone, Copy, Debug, PartialEq)]
#[derive(new)]
#[derive(Deserialize, Serialize)]
pub struct UnreservedBwStlv(pub [[u8; 4]; 8]);

bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    #[derive(Deserialize, Serialize)]
    #[serde(transparent)]
    pub struct AdjSidFlags: u8 {
        const ADDRESS_FAMILY = 0x80;
        const BACKUP = 0x40;
        const VALUE = 0x20;
        const LOCAL = 0x10;
        const SET = 0x08;
    }
}

#[derive(Clone, Debug, PartialEq)]
#[derive(new)]
#[derive(Deserialize, Serialize)]
pub struct AdjSidStlv {
    pub flags: AdjSidFlags,
    pub weight: u8,
    pub nbr_system_id: Option<SystemId>,
    pub sid: Sid,
}

fn finite_bw(bytes: [u8; 4]) -> TlvDecodeResult<[u8; 4]> {
    if f32::from_be_bytes(bytes).is_finite() {
        Ok(bytes)
    } else {
        Err(TlvDecodeError::InvalidLength(4))
    }
}

// ===== impl AdminGroupStlv =====

impl AdminGroupStlv {
    const SIZE: usize = 4;

    pub(crate) fn decode(
        stlv_len: u8,
        buf: &mut Bytes,
    ) -> TlvDecodeResult<Self> {
        if stlv_len as usize != Self::SIZE {
            return Err(TlvDecodeError::InvalidLength(stlv_len));
        }
        Ok(AdminGroupStlv(buf.try_get_u32()?))
    }
}

// ===== impl LinkIdStlv =====

impl LinkIdStlv {
    const SIZE: usize = 8;

    pub(crate) fn decode(
        stlv_len: u8,
        buf: &mut Bytes,
    ) -> TlvDecodeResult<Self> {
        if stlv_len as usize != Self::SIZE {
            return Err(TlvDecodeError::InvalidLength(stlv_len));
        }
        let local = buf.try_get_u32()?;
        let remote = buf.try_get_u32()?;
        Ok(LinkIdStlv { local, remote })
    }
}

// ===== impl Ipv4InterfaceAddrStlv =====

impl Ipv4InterfaceAddrStlv {
    const SIZE: usize = 4;

    pub(crate) fn decode(
        stlv_len: u8,
        buf: &mut Bytes,
    ) -> TlvDecodeResult<Self> {
        if stlv_len as usize != Self::SIZE {
            return Err(TlvDecodeError::InvalidLength(stlv_len));
        }
        Ok(Ipv4InterfaceAddrStlv(buf.try_get_ipv4()?))
    }
}

// ===== impl Ipv4NeighborAddrStlv =====

impl Ipv4NeighborAddrStlv {
    const SIZE: usize = 4;

    pub(crate) fn decode(
        stlv_len: u8,
        buf: &mut Bytes,
    ) -> TlvDecodeResult<Self> {
        if stlv_len as usize != Self::SIZE {
            return Err(TlvDecodeError::InvalidLength(stlv_len));
        }
        Ok(Ipv4NeighborAddrStlv(buf.try_get_ipv4()?))
    }
}

// ===== impl MaxLinkBwStlv / MaxResvLinkBwStlv / ResidualBwStlv =====

macro_rules! bw_stlv {
    ($ty:ident) => {
        impl $ty {
            const SIZE: usize = 4;

            pub(crate) fn decode(
                stlv_len: u8,
                buf: &mut Bytes,
            ) -> TlvDecodeResult<Self> {
                if stlv_len as usize != Self::SIZE {
                    return Err(TlvDecodeError::InvalidLength(stlv_len));
                }
                let mut bytes = [0; 4];
                buf.try_copy_to_slice(&mut bytes)?;
                Ok($ty(finite_bw(bytes)?))
            }
        }
    };
}

bw_stlv!(MaxLinkBwStlv);
bw_stlv!(MaxResvLinkBwStlv);
bw_stlv!(ResidualBwStlv);

// ===== impl UnreservedBwStlv =====

impl UnreservedBwStlv {
    const SIZE: usize = 32;

    pub(crate) fn decode(
        stlv_len: u8,
        buf: &mut Bytes,
    ) -> TlvDecodeResult<Self> {
        if stlv_len as usize != Self::SIZE {
            return Err(TlvDecodeError::InvalidLength(stlv_len));
        }
        let mut bws = [[0u8; 4]; 8];
        for bw in &mut bws {
            let mut bytes = [0; 4];
            buf.try_copy_to_slice(&mut bytes)?;
            *bw = finite_bw(bytes)?;
        }
        Ok(UnreservedBwStlv(bws))
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &[u8; 4])> {
        self.0.iter().enumerate()
    }
}

// ===== impl AdjSidStlv =====

impl AdjSidStlv {
    pub(crate) fn decode(
        lan: bool,
        buf: &mut Bytes,
    ) -> TlvDecodeResult<Self> {
        let flags = buf.try_get_u8()?;
        let flags = AdjSidFlags::from_bits_truncate(flags);
        let weight = buf.try_get_u8()?;

        let nbr_system_id = if lan {
            Some(SystemId::decode(buf)?)
        } else {
            None
        };

        let sid = decode_sid(flags.contains(AdjSidFlags::VALUE), flags.contains(AdjSidFlags::LOCAL), buf)?;

        Ok(AdjSidStlv {
            flags,
            weight,
            nbr_system_id,
            sid,
        })
    }
}

/// Shared VALUE/LOCAL SID-width deduction used by both the Adjacency-SID
/// and Prefix-SID sub-TLVs: value+local both set means a 3-byte MPLS
/// label, both clear means a 4-byte index, and any other combination is
/// rejected with a diagnostic rather than silently dropped.
pub(crate) fn decode_sid(
    value: bool,
    local: bool,
    buf: &mut Bytes,
) -> TlvDecodeResult<Sid> {
    match (value, local) {
        (true, true) => {
            if buf.remaining() != 3 {
                return Err(TlvDecodeError::InvalidSidLength(
                    buf.remaining() as u8,
                ));
            }
            let label = buf.try_get_u24()? & Label::VALUE_MASK;
            Ok(Sid::Label(Label::new(label)))
        }
        (false, false) => {
            if buf.remaining() != 4 {
                return Err(TlvDecodeError::InvalidSidLength(
                    buf.remaining() as u8,
                ));
            }
            Ok(Sid::Index(buf.try_get_u32()?))
        }
        _ => Err(TlvDecodeError::InvalidFlagCombination),
    }
}
