//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::fmt;

use bytes::{Buf, Bytes, TryGetError};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// An IS-IS Area Address, up to 13 bytes.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub struct AreaAddr(SmallVec<[u8; 13]>);

/// An IS-IS System ID (6 bytes).
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub struct SystemId([u8; 6]);

/// An IS-IS LSP ID: system-ID + pseudonode byte + LSP-number byte.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub struct LspId {
    pub system_id: SystemId,
    pub pseudonode: u8,
    pub fragment: u8,
}

// ===== impl AreaAddr =====

impl AreaAddr {
    pub const MAX_LEN: u8 = 13;
}

impl AsRef<[u8]> for AreaAddr {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<&[u8]> for AreaAddr {
    fn from(bytes: &[u8]) -> AreaAddr {
        AreaAddr(SmallVec::from_slice(bytes))
    }
}

// Canonical-hex rendering: the first byte becomes its own two-hex-digit
// group; the remaining bytes are grouped in fours (not the teacher's
// two-byte grouping), each group hex-encoded with no internal separator,
// and the groups joined with dots. All hex digits are lowercase.
impl fmt::Display for AreaAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.0.as_slice();
        if bytes.is_empty() {
            return Ok(());
        }

        write!(f, "{:02x}", bytes[0])?;
        for chunk in bytes[1..].chunks(4) {
            write!(f, ".")?;
            for byte in chunk {
                write!(f, "{byte:02x}")?;
            }
        }
        Ok(())
    }
}

// ===== impl SystemId =====

impl SystemId {
    pub(crate) fn decode(buf: &mut Bytes) -> Result<Self, TryGetError> {
        let mut system_id = [0; 6];
        buf.try_copy_to_slice(&mut system_id)?;
        Ok(SystemId(system_id))
    }
}

impl AsRef<[u8]> for SystemId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8; 6]> for SystemId {
    fn as_ref(&self) -> &[u8; 6] {
        &self.0
    }
}

impl From<[u8; 6]> for SystemId {
    fn from(bytes: [u8; 6]) -> SystemId {
        SystemId(bytes)
    }
}

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02x}{:02x}.{:02x}{:02x}.{:02x}{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

// ===== impl LspId =====

impl LspId {
    pub(crate) fn decode(buf: &mut Bytes) -> Result<Self, TryGetError> {
        let mut bytes = [0; 8];
        buf.try_copy_to_slice(&mut bytes)?;
        Ok(Self::from(bytes))
    }

    pub(crate) const fn is_pseudonode(&self) -> bool {
        self.pseudonode != 0
    }
}

impl From<[u8; 8]> for LspId {
    fn from(bytes: [u8; 8]) -> LspId {
        LspId {
            system_id: SystemId::from([
                bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5],
            ]),
            pseudonode: bytes[6],
            fragment: bytes[7],
        }
    }
}

impl fmt::Display for LspId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:02x}-{:02x}",
            self.system_id, self.pseudonode, self.fragment
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_addr_display() {
        let addr = AreaAddr::from(
            [0x39, 0x75, 0x2f, 0x01, 0x00, 0x00, 0x14].as_slice(),
        );
        assert_eq!(addr.to_string(), "39.752f0100.0014");
    }

    #[test]
    fn lsp_id_display() {
        let lsp_id =
            LspId::from([0x00, 0x00, 0x40, 0x00, 0xce, 0x39, 0x00, 0x00]);
        assert_eq!(lsp_id.to_string(), "0000.4000.ce39.00-00");
        assert!(!lsp_id.is_pseudonode());
    }
}
