//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use bitflags::bitflags;
use bytes::{Buf, Bytes};
use derive_new::new;
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};

use crate::bytes_ext::BytesExt;
use crate::consts::IgpAlgoType;
use crate::error::{TlvDecodeError, TlvDecodeResult};
use crate::sid::{Label, Sid};

bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    #[derive(Deserialize, Serialize)]
    #[serde(transparent)]
    pub struct PrefixSidFlags: u8 {
        const READVERTISEMENT = 0x80;
        const NODE = 0x40;
        const NO_PHP = 0x20;
        const EXPLICIT_NULL = 0x10;
        const VALUE = 0x08;
        const LOCAL = 0x04;
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[derive(new)]
#[derive(Deserialize, Serialize)]
pub struct PrefixSidStlv {
    pub flags: PrefixSidFlags,
    pub algo: IgpAlgoType,
    pub sid: Sid,
}

impl PrefixSidStlv {
    // Unlike the Adjacency-SID/LAN-Adjacency-SID sub-TLVs, the value width
    // here is deduced from the VALUE bit alone; LOCAL plays no part in it
    // (see spec §4.2.6).
    const MIN_SIZE_VALUE: usize = 5;
    const MIN_SIZE_INDEX: usize = 6;

    pub(crate) fn decode(
        stlv_len: u8,
        buf: &mut Bytes,
    ) -> TlvDecodeResult<Self> {
        let flags = buf.try_get_u8()?;
        let flags = PrefixSidFlags::from_bits_truncate(flags);
        let value = flags.contains(PrefixSidFlags::VALUE);

        let min_size = if value {
            Self::MIN_SIZE_VALUE
        } else {
            Self::MIN_SIZE_INDEX
        };
        if (stlv_len as usize) < min_size {
            return Err(TlvDecodeError::InvalidLength(stlv_len));
        }

        let algo = buf.try_get_u8()?;
        let algo = IgpAlgoType::from_u8(algo)
            .ok_or(TlvDecodeError::UnsupportedEnumerant(algo))?;

        let sid = if value {
            if buf.remaining() != 3 {
                return Err(TlvDecodeError::InvalidSidLength(
                    buf.remaining() as u8,
                ));
            }
            let label = buf.try_get_u24()? & Label::VALUE_MASK;
            Sid::Label(Label::new(label))
        } else {
            if buf.remaining() != 4 {
                return Err(TlvDecodeError::InvalidSidLength(
                    buf.remaining() as u8,
                ));
            }
            Sid::Index(buf.try_get_u32()?)
        };

        Ok(PrefixSidStlv { flags, algo, sid })
    }

    /// Key used in the prefix's Prefix-SID map: the raw SID value.
    pub fn key(&self) -> u32 {
        match self.sid {
            Sid::Index(index) => index,
            Sid::Label(label) => label.get(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Scenario 5 from the spec: flag byte 0x40 (NODE, VALUE clear) with a
    // 4-byte index value.
    #[test]
    fn decode_index_form() {
        let raw: &[u8] =
            &[0x40, 0x00, 0x00, 0x00, 0x00, 0xc8];
        let mut buf = Bytes::copy_from_slice(raw);
        let stlv = PrefixSidStlv::decode(raw.len() as u8, &mut buf).unwrap();

        assert!(stlv.flags.contains(PrefixSidFlags::NODE));
        assert!(!stlv.flags.contains(PrefixSidFlags::VALUE));
        assert_eq!(stlv.algo, IgpAlgoType::Spf);
        assert_eq!(stlv.key(), 200);
        assert!(matches!(stlv.sid, Sid::Index(200)));
    }

    // VALUE set but LOCAL also set must still decode as a 3-byte label:
    // unlike Adjacency-SID, LOCAL has no bearing on Prefix-SID's value
    // width.
    #[test]
    fn decode_value_form_ignores_local_bit() {
        let raw: &[u8] = &[
            PrefixSidFlags::VALUE.bits() | PrefixSidFlags::LOCAL.bits(),
            0x00,
            0x00,
            0x00,
            0x64,
        ];
        let mut buf = Bytes::copy_from_slice(raw);
        let stlv = PrefixSidStlv::decode(raw.len() as u8, &mut buf).unwrap();

        assert!(matches!(stlv.sid, Sid::Label(label) if label.get() == 100));
    }

    #[test]
    fn decode_rejects_short_index_form() {
        let raw: &[u8] = &[0x00, 0x00, 0x00, 0x00, 0x00];
        let mut buf = Bytes::copy_from_slice(raw);
        assert!(matches!(
            PrefixSidStlv::decode(raw.len() as u8, &mut buf),
            Err(TlvDecodeError::InvalidLength(5))
        ));
    }
}
