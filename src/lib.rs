//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Decoder and telemetry-notification renderer for IS-IS Link State PDUs.
//!
//! [`pdu::Lsp::decode`] turns a byte range starting at the LSP-ID field
//! into a [`pdu::Lsp`]: a structured model of the PDU's header fields and
//! its TLV payload. Per-TLV failures never abort the whole decode; they
//! are aggregated into [`pdu::Lsp::diagnostics`] instead. Only a
//! truncated fixed header is fatal, via [`error::HeaderDecodeError`].
//!
//! [`notification::render`] flattens a decoded LSP into a single gNMI-
//! style [`notification::Notification`] — a list of leaf path/value
//! updates anchored under a caller-supplied [`notification::Context`].

pub mod bytes_ext;
pub mod consts;
pub mod error;
pub mod ident;
pub mod notification;
pub mod pdu;
pub mod sid;
pub mod subtlvs;
pub mod tlv;
