//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::{Ipv4Addr, Ipv6Addr};

use bytes::{Bytes, TryGetError};

/// Extension methods for [`Bytes`] used by the TLV decoders.
///
/// Mirrors the extension-trait pattern used throughout the reference IS-IS
/// stack this crate is modeled on, trimmed to the handful of fixed-width
/// reads the LSP decoder actually needs.
pub trait BytesExt {
    /// Gets an unsigned 24 bit integer from `self` in big-endian byte order.
    ///
    /// Returns `Err(TryGetError)` when there are not enough remaining bytes.
    fn try_get_u24(&mut self) -> Result<u32, TryGetError>;

    /// Gets an IPv4 address from `self` in big-endian byte order.
    fn try_get_ipv4(&mut self) -> Result<Ipv4Addr, TryGetError>;

    /// Gets an IPv6 address from `self` in big-endian byte order.
    fn try_get_ipv6(&mut self) -> Result<Ipv6Addr, TryGetError>;
}

impl BytesExt for Bytes {
    fn try_get_u24(&mut self) -> Result<u32, TryGetError> {
        use bytes::Buf;

        let mut n = [0; 4];
        self.try_copy_to_slice(&mut n[1..=3])?;
        Ok(u32::from_be_bytes(n))
    }

    fn try_get_ipv4(&mut self) -> Result<Ipv4Addr, TryGetError> {
        use bytes::Buf;

        let bytes = self.try_get_u32()?;
        Ok(Ipv4Addr::from(bytes))
    }

    fn try_get_ipv6(&mut self) -> Result<Ipv6Addr, TryGetError> {
        use bytes::Buf;

        let bytes = self.try_get_u128()?;
        Ok(Ipv6Addr::from(bytes))
    }
}
