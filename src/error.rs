//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use bytes::TryGetError;
use serde::{Deserialize, Serialize};
use tracing::warn;

// Type aliases.
pub type HeaderDecodeResult<T> = Result<T, HeaderDecodeError>;
pub type TlvDecodeResult<T> = Result<T, TlvDecodeError>;

/// Fatal, header-level LSP decode failures. A header decode failure yields
/// no LSP at all.
#[derive(Debug)]
#[derive(Deserialize, Serialize)]
pub enum HeaderDecodeError {
    Truncated,
}

/// Per-TLV decode failures. Every occurrence is aggregated into the
/// parse's diagnostics list rather than aborting the whole decode; only
/// the enclosing TLV (or, for entry-based TLVs, the remaining entries of
/// that TLV) is affected.
#[derive(Debug)]
#[derive(Deserialize, Serialize)]
pub enum TlvDecodeError {
    ReadOutOfBounds,
    Truncated,
    InvalidLength(u8),
    InvalidAreaAddrLen(u8),
    InvalidPrefixLength(u8),
    DuplicatePrefixKey(String),
    InvalidFlagCombination,
    InvalidSidLength(u8),
    UnexpectedType(u8),
    UnsupportedEnumerant(u8),
}

/// A per-TLV diagnostic, annotated with enough path information (the
/// top-level TLV type, and the sub-TLV type if the failure happened one
/// level down) for logging and test assertions to tell diagnostics apart.
#[derive(Debug)]
#[derive(Deserialize, Serialize)]
pub struct Diagnostic {
    pub tlv_path: Vec<u8>,
    pub error: TlvDecodeError,
}

/// Fatal renderer failure.
#[derive(Debug)]
#[derive(Deserialize, Serialize)]
pub enum RenderError {
    NilInput,
}

// ===== impl HeaderDecodeError =====

impl std::fmt::Display for HeaderDecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeaderDecodeError::Truncated => {
                write!(f, "input shorter than the fixed LSP header")
            }
        }
    }
}

impl std::error::Error for HeaderDecodeError {}

impl From<TryGetError> for HeaderDecodeError {
    fn from(_error: TryGetError) -> HeaderDecodeError {
        HeaderDecodeError::Truncated
    }
}

// ===== impl TlvDecodeError =====

impl TlvDecodeError {
    pub(crate) fn log(&self) {
        warn!("{}", self);
    }
}

impl std::fmt::Display for TlvDecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TlvDecodeError::ReadOutOfBounds => {
                write!(f, "attempt to read out of bounds")
            }
            TlvDecodeError::Truncated => {
                write!(f, "declared length runs past the end of the input")
            }
            TlvDecodeError::InvalidLength(len) => {
                write!(f, "invalid length: {len}")
            }
            TlvDecodeError::InvalidAreaAddrLen(len) => {
                write!(f, "invalid area address length: {len}")
            }
            TlvDecodeError::InvalidPrefixLength(len) => {
                write!(f, "invalid prefix length: {len}")
            }
            TlvDecodeError::DuplicatePrefixKey(key) => {
                write!(f, "duplicate prefix key: {key}")
            }
            TlvDecodeError::InvalidFlagCombination => {
                write!(f, "invalid VALUE/LOCAL flag combination")
            }
            TlvDecodeError::InvalidSidLength(len) => {
                write!(f, "invalid SID value length: {len}")
            }
            TlvDecodeError::UnexpectedType(tlv_type) => {
                write!(f, "unexpected type: {tlv_type}")
            }
            TlvDecodeError::UnsupportedEnumerant(value) => {
                write!(f, "unsupported enumerant: {value}")
            }
        }
    }
}

impl std::error::Error for TlvDecodeError {}

impl From<TryGetError> for TlvDecodeError {
    fn from(_error: TryGetError) -> TlvDecodeError {
        TlvDecodeError::ReadOutOfBounds
    }
}

// ===== impl RenderError =====

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::NilInput => {
                write!(f, "no LSP (or no LSP-ID) to render")
            }
        }
    }
}

impl std::error::Error for RenderError {}
