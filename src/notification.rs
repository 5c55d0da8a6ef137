//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Flattens a decoded [`crate::pdu::Lsp`] into a gNMI-style notification:
//! a single atomic update list anchored under a path keyed by the LSP's
//! identity.
//!
//! There is no generated-schema notification layer to build on here (the
//! reference stack's own `holo-northbound::notification::send` emits a
//! single YANG-bound data node against a statically generated schema
//! tree, not a generic walk of an arbitrary typed model), so this module
//! follows the wire-level conventions of a gNMI `Notification`/`Update`
//! pair directly, as seen in the reference stack's own gNMI client
//! (`holo-daemon::northbound::client::gnmi`): a `prefix` path, a flat
//! `Vec<Update>`, a `timestamp`, and an `atomic` flag.

use std::collections::BTreeMap;

use tracing::debug_span;

use crate::error::RenderError;
use crate::pdu::{Lsp, TlvValue};
use crate::tlv::{NeighborStlvValue, RouterCapTlv};

/// One segment of a notification path: a YANG-style container/list name,
/// plus the list keys present at that segment (empty for non-list
/// segments). Mirrors `proto::PathElem` from the gNMI wire protocol.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PathElem {
    pub name: String,
    pub key: BTreeMap<String, String>,
}

impl PathElem {
    fn new(name: &str) -> Self {
        PathElem {
            name: name.to_owned(),
            key: BTreeMap::new(),
        }
    }

    fn keyed(name: &str, keys: &[(&str, &str)]) -> Self {
        PathElem {
            name: name.to_owned(),
            key: keys
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// A notification path, in either of the two forms the spec lets a
/// caller opt into via [`Context::use_structured_paths`]: a list of
/// typed path elements, or a single flattened gNMI-style string.
#[derive(Clone, Debug, PartialEq)]
pub enum Path {
    Structured(Vec<PathElem>),
    Textual(String),
}

impl Path {
    fn build(elems: Vec<PathElem>, structured: bool) -> Self {
        if structured {
            Path::Structured(elems)
        } else {
            Path::Textual(render_textual(&elems))
        }
    }

    /// True if this path's last element is `name` (used by tests to
    /// check a path "ends with" a given list entry).
    pub fn ends_with(&self, name: &str) -> bool {
        match self {
            Path::Structured(elems) => {
                elems.last().is_some_and(|e| e.name == name)
            }
            Path::Textual(s) => s
                .rsplit('/')
                .next()
                .is_some_and(|seg| seg.starts_with(name)),
        }
    }
}

fn render_textual(elems: &[PathElem]) -> String {
    let mut out = String::new();
    for elem in elems {
        out.push('/');
        out.push_str(&elem.name);
        for (k, v) in &elem.key {
            out.push('[');
            out.push_str(k);
            out.push('=');
            out.push_str(v);
            out.push(']');
        }
    }
    out
}

/// A leaf value. List-valued leaves (area addresses, NLPIDs, interface
/// addresses) are carried as `StringList` and emitted as a single update,
/// per spec §4.3.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    String(String),
    U32(u32),
    Bool(bool),
    StringList(Vec<String>),
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::U32(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

/// One leaf update: a path (relative to the notification's prefix, in
/// the same representation) plus its value.
#[derive(Clone, Debug, PartialEq)]
pub struct Update {
    pub path: Path,
    pub value: Value,
}

/// A single gNMI-style notification: one atomic bundle of leaf updates
/// anchored under `prefix`.
#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    pub prefix: Path,
    pub update: Vec<Update>,
    pub timestamp: i64,
    pub atomic: bool,
}

/// Caller context the renderer needs to build the notification's prefix;
/// this is the crate's entire configuration surface, since there is no
/// daemon, CLI, or file-based config layer in scope.
#[derive(Clone, Debug)]
pub struct Context {
    pub network_instance: String,
    pub protocol_instance: String,
    pub level: u8,
    pub timestamp: i64,
    pub use_structured_paths: bool,
}

/// Renders `lsp` into a single-element notification list.
///
/// Fails with [`RenderError::NilInput`] if `lsp` is `None` — there is no
/// separate "LSP-ID absent" case to check since a successfully decoded
/// [`Lsp`] always carries an `lsp_id` (it is part of the fixed header).
pub fn render(
    lsp: Option<&Lsp>,
    ctx: &Context,
) -> Result<Vec<Notification>, RenderError> {
    let lsp = lsp.ok_or(RenderError::NilInput)?;
    let lsp_id = lsp.lsp_id.to_string();

    let _span = debug_span!("render", lsp_id = %lsp_id).entered();

    let prefix_elems = vec![
        PathElem::new("network-instances"),
        PathElem::keyed(
            "network-instance",
            &[("name", &ctx.network_instance)],
        ),
        PathElem::new("protocols"),
        PathElem::keyed(
            "protocol",
            &[
                ("identifier", "ISIS"),
                ("name", &ctx.protocol_instance),
            ],
        ),
        PathElem::new("isis"),
        PathElem::new("levels"),
        PathElem::keyed(
            "level",
            &[("level-number", &ctx.level.to_string())],
        ),
        PathElem::new("link-state-database"),
        PathElem::keyed("lsp", &[("lsp-id", &lsp_id)]),
    ];

    let mut updates = Vec::new();
    push_keyed_leaf(&mut updates, &[], "lsp-id", lsp_id.clone().into());
    push_state_leaf(
        &mut updates,
        &[],
        "sequence-number",
        lsp.sequence_number.into(),
    );
    push_state_leaf(
        &mut updates,
        &[],
        "checksum",
        Value::U32(lsp.checksum as u32),
    );
    push_state_leaf(
        &mut updates,
        &[],
        "flags",
        Value::StringList(
            lsp.flags
                .iter_names_ordered()
                .into_iter()
                .map(str::to_owned)
                .collect(),
        ),
    );

    for value in lsp.tlvs.values() {
        render_tlv(&mut updates, value);
    }

    let structured = ctx.use_structured_paths;
    let update = updates
        .into_iter()
        .map(|(elems, value)| Update {
            path: Path::build(elems, structured),
            value,
        })
        .collect();

    let notification = Notification {
        prefix: Path::build(prefix_elems, structured),
        update,
        timestamp: ctx.timestamp,
        atomic: true,
    };

    Ok(vec![notification])
}

type RawUpdate = (Vec<PathElem>, Value);

fn push_state_leaf(
    updates: &mut Vec<RawUpdate>,
    base: &[PathElem],
    name: &str,
    value: Value,
) {
    let mut elems = base.to_vec();
    elems.push(PathElem::new("state"));
    elems.push(PathElem::new(name));
    updates.push((elems, value));
}

/// Emits both halves of a keyed-list-entry key leaf: the direct leaf and
/// its `state/` mirror, per spec §4.3's pairing rule.
fn push_keyed_leaf(
    updates: &mut Vec<RawUpdate>,
    base: &[PathElem],
    name: &str,
    value: Value,
) {
    let mut direct = base.to_vec();
    direct.push(PathElem::new(name));
    updates.push((direct, value.clone()));
    push_state_leaf(updates, base, name, value);
}

fn render_tlv(updates: &mut Vec<RawUpdate>, value: &TlvValue) {
    match value {
        TlvValue::AreaAddresses(tlv) => {
            push_state_leaf(
                updates,
                &[PathElem::new("area-addresses")],
                "area-address",
                Value::StringList(
                    tlv.addresses.iter().map(|a| a.to_string()).collect(),
                ),
            );
        }
        TlvValue::ProtocolsSupported(tlv) => {
            push_state_leaf(
                updates,
                &[PathElem::new("protocols-supported")],
                "nlpid",
                Value::StringList(
                    tlv.protocols
                        .iter()
                        .map(|p| format!("{p:?}"))
                        .collect(),
                ),
            );
        }
        TlvValue::Ipv4Addresses(tlv) => {
            push_state_leaf(
                updates,
                &[PathElem::new("ipv4-interface-addresses")],
                "address",
                Value::StringList(
                    tlv.addresses.iter().map(|a| a.to_string()).collect(),
                ),
            );
        }
        TlvValue::Ipv6Addresses(tlv) => {
            push_state_leaf(
                updates,
                &[PathElem::new("ipv6-interface-addresses")],
                "address",
                Value::StringList(
                    tlv.addresses.iter().map(|a| a.to_string()).collect(),
                ),
            );
        }
        TlvValue::Ipv4RouterId(addr) => {
            push_state_leaf(
                updates,
                &[],
                "te-router-id",
                addr.to_string().into(),
            );
        }
        TlvValue::DynamicHostname(hostname) => {
            push_state_leaf(updates, &[], "hostname", hostname.clone().into());
        }
        TlvValue::ExtIsReach(tlv) => {
            let base = [PathElem::new("extended-is-reachability")];
            for (system_id, neighbor) in &tlv.neighbors {
                let system_id = system_id.to_string();
                let mut nbr_base = base.to_vec();
                nbr_base.push(PathElem::keyed(
                    "neighbor",
                    &[("system-id", &system_id)],
                ));
                push_keyed_leaf(
                    updates,
                    &nbr_base,
                    "system-id",
                    system_id.clone().into(),
                );

                for (idx, instance) in &neighbor.instances {
                    let idx_str = idx.to_string();
                    let mut inst_base = nbr_base.clone();
                    inst_base.push(PathElem::keyed(
                        "instance",
                        &[("id", &idx_str)],
                    ));
                    push_keyed_leaf(updates, &inst_base, "id", idx_str.into());
                    push_state_leaf(
                        updates,
                        &inst_base,
                        "metric",
                        instance.metric.into(),
                    );
                    render_neighbor_subtlvs(
                        updates,
                        &inst_base,
                        &instance.subtlvs,
                    );
                }
            }
        }
        TlvValue::ExtIpv4Reach(tlv) => {
            let base = [PathElem::new("extended-ipv4-reachability")];
            for (prefix, entry) in &tlv.prefixes {
                let mut prefix_base = base.to_vec();
                prefix_base.push(PathElem::keyed(
                    "prefix",
                    &[("prefix", prefix)],
                ));
                push_keyed_leaf(
                    updates,
                    &prefix_base,
                    "prefix",
                    prefix.clone().into(),
                );
                push_state_leaf(
                    updates,
                    &prefix_base,
                    "metric",
                    entry.metric.into(),
                );
                push_state_leaf(
                    updates,
                    &prefix_base,
                    "up-down",
                    entry.up_down.into(),
                );
                push_state_leaf(
                    updates,
                    &prefix_base,
                    "s-bit",
                    entry.sub_tlvs_present.into(),
                );
                for sid in entry.prefix_sids.values() {
                    render_prefix_sid(updates, &prefix_base, sid);
                }
            }
        }
        TlvValue::Ipv6Reach(tlv) => {
            let base = [PathElem::new("ipv6-reachability")];
            for (prefix, entry) in &tlv.prefixes {
                let mut prefix_base = base.to_vec();
                prefix_base.push(PathElem::keyed(
                    "prefix",
                    &[("prefix", prefix)],
                ));
                push_keyed_leaf(
                    updates,
                    &prefix_base,
                    "prefix",
                    prefix.clone().into(),
                );
                push_state_leaf(
                    updates,
                    &prefix_base,
                    "metric",
                    entry.metric.into(),
                );
                push_state_leaf(
                    updates,
                    &prefix_base,
                    "up-down",
                    entry.up_down.into(),
                );
                push_state_leaf(
                    updates,
                    &prefix_base,
                    "x-bit",
                    entry.external.into(),
                );
                push_state_leaf(
                    updates,
                    &prefix_base,
                    "s-bit",
                    entry.sub_tlvs_present.into(),
                );
                for sid in entry.prefix_sids.values() {
                    render_prefix_sid(updates, &prefix_base, sid);
                }
            }
        }
        TlvValue::RouterCapability(tlv) => render_router_capability(
            updates,
            tlv,
        ),
    }
}

fn render_prefix_sid(
    updates: &mut Vec<RawUpdate>,
    base: &[PathElem],
    sid: &crate::subtlvs::prefix::PrefixSidStlv,
) {
    let value = sid.key().to_string();
    let mut sid_base = base.to_vec();
    sid_base.push(PathElem::keyed("prefix-sid", &[("value", &value)]));
    push_keyed_leaf(updates, &sid_base, "value", sid.key().into());
    push_state_leaf(
        updates,
        &sid_base,
        "algorithm",
        format!("{:?}", sid.algo).into(),
    );
    push_state_leaf(
        updates,
        &sid_base,
        "flags",
        Value::StringList(
            sid.flags
                .iter_names()
                .map(|(name, _)| name.to_owned())
                .collect(),
        ),
    );
}

fn render_neighbor_subtlvs(
    updates: &mut Vec<RawUpdate>,
    base: &[PathElem],
    subtlvs: &BTreeMap<
        crate::consts::NeighborStlvType,
        NeighborStlvValue,
    >,
) {
    for value in subtlvs.values() {
        match value {
            NeighborStlvValue::AdminGroup(groups) => {
                push_state_leaf(
                    updates,
                    base,
                    "admin-group",
                    Value::StringList(
                        groups.iter().map(|g| g.to_string()).collect(),
                    ),
                );
            }
            NeighborStlvValue::LinkId(ids) => {
                for (local, remote) in ids {
                    push_state_leaf(
                        updates,
                        base,
                        "local-link-id",
                        Value::U32(*local),
                    );
                    push_state_leaf(
                        updates,
                        base,
                        "remote-link-id",
                        Value::U32(*remote),
                    );
                }
            }
            NeighborStlvValue::Ipv4InterfaceAddr(addrs) => {
                push_state_leaf(
                    updates,
                    base,
                    "local-if-ipv4-addrs",
                    Value::StringList(
                        addrs.iter().map(|a| a.to_string()).collect(),
                    ),
                );
            }
            NeighborStlvValue::Ipv4NeighborAddr(addrs) => {
                push_state_leaf(
                    updates,
                    base,
                    "remote-if-ipv4-addrs",
                    Value::StringList(
                        addrs.iter().map(|a| a.to_string()).collect(),
                    ),
                );
            }
            NeighborStlvValue::MaxLinkBw(values) => {
                push_bw(updates, base, "max-link-bandwidth", values);
            }
            NeighborStlvValue::MaxResvLinkBw(values) => {
                push_bw(updates, base, "max-reservable-link-bandwidth", values);
            }
            NeighborStlvValue::ResidualBw(values) => {
                push_bw(updates, base, "residual-bandwidth", values);
            }
            NeighborStlvValue::UnreservedBw(blocks) => {
                for block in blocks {
                    push_state_leaf(
                        updates,
                        base,
                        "unreserved-bandwidth",
                        Value::StringList(
                            block
                                .iter()
                                .map(|b| f32::from_be_bytes(*b).to_string())
                                .collect(),
                        ),
                    );
                }
            }
            NeighborStlvValue::AdjSid(sids) => {
                for sid in sids {
                    let id = match sid.sid {
                        crate::sid::Sid::Index(i) => i,
                        crate::sid::Sid::Label(l) => l.get(),
                    };
                    let id_str = id.to_string();
                    let mut sid_base = base.to_vec();
                    sid_base.push(PathElem::keyed(
                        "adjacency-sid",
                        &[("value", &id_str)],
                    ));
                    push_keyed_leaf(updates, &sid_base, "value", id.into());
                    push_state_leaf(
                        updates,
                        &sid_base,
                        "weight",
                        Value::U32(sid.weight as u32),
                    );
                    if let Some(nbr) = sid.nbr_system_id {
                        push_state_leaf(
                            updates,
                            &sid_base,
                            "neighbor-id",
                            nbr.to_string().into(),
                        );
                    }
                    push_state_leaf(
                        updates,
                        &sid_base,
                        "flags",
                        Value::StringList(
                            sid.flags
                                .iter_names()
                                .map(|(name, _)| name.to_owned())
                                .collect(),
                        ),
                    );
                }
            }
        }
    }
}

fn push_bw(
    updates: &mut Vec<RawUpdate>,
    base: &[PathElem],
    name: &str,
    values: &[[u8; 4]],
) {
    for bytes in values {
        push_state_leaf(
            updates,
            base,
            name,
            f32::from_be_bytes(*bytes).to_string().into(),
        );
    }
}

fn render_router_capability(
    updates: &mut Vec<RawUpdate>,
    tlv: &RouterCapTlv,
) {
    let base = [PathElem::new("router-capabilities")];
    for (idx, capability) in &tlv.capabilities {
        let idx_str = idx.to_string();
        let mut cap_base = base.to_vec();
        cap_base
            .push(PathElem::keyed("router-capability", &[("id", &idx_str)]));
        push_keyed_leaf(updates, &cap_base, "id", idx_str.into());

        if let Some(router_id) = capability.router_id {
            push_state_leaf(
                updates,
                &cap_base,
                "router-id",
                router_id.to_string().into(),
            );
        }
        push_state_leaf(
            updates,
            &cap_base,
            "flags",
            Value::StringList(
                capability
                    .flags
                    .iter_names()
                    .map(|(name, _)| name.to_owned())
                    .collect(),
            ),
        );
        if let Some(sr_algo) = &capability.sr_algorithm {
            push_state_leaf(
                updates,
                &cap_base,
                "sr-algorithm",
                Value::StringList(
                    sr_algo.0.iter().map(|a| format!("{a:?}")).collect(),
                ),
            );
        }
        if let Some(sr_cap) = &capability.sr_capability {
            let mut sr_base = cap_base.clone();
            sr_base.push(PathElem::new("sr-capability"));
            push_state_leaf(
                updates,
                &sr_base,
                "flags",
                Value::StringList(
                    sr_cap
                        .flags
                        .iter_names()
                        .map(|(name, _)| name.to_owned())
                        .collect(),
                ),
            );
            for (index, descriptor) in sr_cap.srgb_entries.iter().enumerate() {
                let index_str = index.to_string();
                let mut srgb_base = sr_base.clone();
                srgb_base.push(PathElem::keyed(
                    "srgb",
                    &[("index", &index_str)],
                ));
                push_keyed_leaf(
                    updates,
                    &srgb_base,
                    "index",
                    index_str.into(),
                );
                push_state_leaf(
                    updates,
                    &srgb_base,
                    "range",
                    descriptor.range.into(),
                );
                let first = match descriptor.first {
                    crate::sid::Sid::Index(i) => i,
                    crate::sid::Sid::Label(l) => l.get(),
                };
                push_state_leaf(
                    updates,
                    &srgb_base,
                    "first",
                    first.into(),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::pdu::Lsp;

    fn ctx() -> Context {
        Context {
            network_instance: "default".to_owned(),
            protocol_instance: "main".to_owned(),
            level: 2,
            timestamp: 1_700_000_000_000_000_000,
            use_structured_paths: false,
        }
    }

    // Scenario 6 from the spec: renderer atomicity and the key/state
    // mirror pairing for the lsp-id leaf.
    #[test]
    fn render_emits_one_atomic_notification_with_paired_lsp_id() {
        let raw: &[u8] = &[
            0x00, 0x00, 0x40, 0x00, 0xce, 0x39, 0x00, 0x00, // LSP-ID
            0x00, 0x00, 0x14, 0x26, // sequence number
            0x27, 0x7f, // checksum
            0x03, // flags
        ];
        let mut buf = Bytes::copy_from_slice(raw);
        let lsp = Lsp::decode(&mut buf).unwrap();

        let notifications = render(Some(&lsp), &ctx()).unwrap();
        assert_eq!(notifications.len(), 1);
        let notification = &notifications[0];
        assert!(notification.atomic);
        assert!(notification.prefix.ends_with("lsp"));

        let paths: Vec<String> = notification
            .update
            .iter()
            .map(|u| match &u.path {
                Path::Textual(s) => s.clone(),
                Path::Structured(_) => unreachable!(),
            })
            .collect();
        assert!(paths.contains(&"/lsp-id".to_owned()));
        assert!(paths.contains(&"/state/lsp-id".to_owned()));
    }

    #[test]
    fn render_nil_input_is_fatal() {
        assert!(matches!(
            render(None, &ctx()),
            Err(RenderError::NilInput)
        ));
    }

    #[test]
    fn prefix_ends_with_lsp_keyed_by_id() {
        let raw: &[u8] = &[
            0x00, 0x00, 0x40, 0x00, 0xce, 0x39, 0x00, 0x00, 0x00, 0x00, 0x14,
            0x26, 0x27, 0x7f, 0x03,
        ];
        let mut buf = Bytes::copy_from_slice(raw);
        let lsp = Lsp::decode(&mut buf).unwrap();

        let mut ctx = ctx();
        ctx.use_structured_paths = true;
        let notifications = render(Some(&lsp), &ctx).unwrap();
        let Path::Structured(elems) = &notifications[0].prefix else {
            unreachable!()
        };
        let last = elems.last().unwrap();
        assert_eq!(last.name, "lsp");
        assert_eq!(
            last.key.get("lsp-id"),
            Some(&"0000.4000.ce39.00-00".to_owned())
        );
    }
}
