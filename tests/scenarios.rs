//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use bytes::Bytes;
use isis_lsp_decode::consts::{IgpAlgoType, NeighborStlvType, TlvType};
use isis_lsp_decode::notification::{self, Context, Path};
use isis_lsp_decode::pdu::{Lsp, TlvValue};
use isis_lsp_decode::tlv::NeighborStlvValue;

const LSP_HEADER: &[u8] = &[
    0x00, 0x00, 0x40, 0x00, 0xce, 0x39, 0x00, 0x00, // LSP-ID
    0x00, 0x00, 0x14, 0x26, // sequence number = 5158
    0x27, 0x7f, // checksum
    0x03, // flags
];

fn lsp_with_tlv(tlv: &[u8]) -> Lsp {
    let mut raw = LSP_HEADER.to_vec();
    raw.extend_from_slice(tlv);
    let mut buf = Bytes::copy_from_slice(&raw);
    Lsp::decode(&mut buf).unwrap()
}

// Scenario 1: a minimal 16-byte LSP whose sole trailing byte is a
// dangling TLV type with no length byte.
#[test]
fn scenario_1_minimal_lsp_dangling_tlv_type() {
    let raw: &[u8] = &[
        0x00, 0x00, 0x40, 0x00, 0xce, 0x39, 0x00, 0x00, 0x00, 0x00, 0x14,
        0x26, 0x27, 0x7f, 0x03, 0x01,
    ];
    let (lsp, parsed) = Lsp::decode_at(raw, 0);
    assert!(parsed);
    let lsp = lsp.unwrap();

    assert_eq!(lsp.lsp_id.to_string(), "0000.4000.ce39.00-00");
    assert_eq!(lsp.sequence_number, 5158);
    assert_eq!(lsp.checksum, 0x277f);
    assert!(lsp.tlvs.is_empty());
    assert_eq!(lsp.diagnostics.len(), 1);
}

// Scenario 2: a single Area Addresses TLV, canonical-hex grouped display.
#[test]
fn scenario_2_area_addresses_canonical_hex() {
    let lsp = lsp_with_tlv(&[
        TlvType::AreaAddresses as u8,
        8,
        7, // address length
        0x39, 0x75, 0x2f, 0x01, 0x00, 0x00, 0x14,
    ]);

    let TlvValue::AreaAddresses(tlv) =
        lsp.tlvs.get(&TlvType::AreaAddresses).unwrap()
    else {
        panic!("expected AreaAddresses TLV");
    };
    assert_eq!(tlv.addresses.len(), 1);
    assert_eq!(tlv.addresses[0].to_string(), "39.752f0100.0014");
}

// Scenario 3: Dynamic Name TLV carrying an ASCII hostname.
#[test]
fn scenario_3_dynamic_hostname() {
    let hostname = "re0-pr05.sql88";
    let mut tlv = vec![TlvType::DynamicHostname as u8, hostname.len() as u8];
    tlv.extend_from_slice(hostname.as_bytes());
    let lsp = lsp_with_tlv(&tlv);

    let TlvValue::DynamicHostname(name) =
        lsp.tlvs.get(&TlvType::DynamicHostname).unwrap()
    else {
        panic!("expected DynamicHostname TLV");
    };
    assert_eq!(name, hostname);
}

// Scenario 4: Extended IS Reachability, one neighbor, no sub-TLVs.
#[test]
fn scenario_4_ext_is_reach_one_neighbor_no_subtlvs() {
    let lsp = lsp_with_tlv(&[
        TlvType::ExtIsReach as u8,
        0x0b,
        0x00, 0x00, 0x40, 0x00, 0xce, 0x39, // system-id
        0x00, // pseudonode
        0x00, 0x00, 0x1e, // metric = 30
        0x00, // no sub-TLVs
    ]);

    let TlvValue::ExtIsReach(tlv) = lsp.tlvs.get(&TlvType::ExtIsReach).unwrap()
    else {
        panic!("expected ExtIsReach TLV");
    };
    assert_eq!(tlv.neighbors.len(), 1);
    let (system_id, neighbor) = tlv.neighbors.iter().next().unwrap();
    assert_eq!(system_id.to_string(), "0000.4000.ce39");
    let instance = neighbor.instances.get(&0).unwrap();
    assert_eq!(instance.metric, 30);
    assert!(instance.subtlvs.is_empty());
    assert!(lsp.diagnostics.is_empty());
}

// Scenario 5: Extended IPv4 Reachability with a Prefix-SID sub-TLV.
#[test]
fn scenario_5_ext_ipv4_reach_with_prefix_sid() {
    let lsp = lsp_with_tlv(&[
        TlvType::ExtIpv4Reach as u8,
        17,
        0x00, 0x00, 0x00, 0x00, // metric = 0
        0xe0, // control: up/down | sub-TLVs present | prefix-len 32
        0x64, 0x01, 0x01, 0x0d, // prefix 100.1.1.13
        0x08, // sub-TLV block length
        3, 6, // Prefix-SID sub-TLV
        0x40, 0x00, // flags (NODE), algo (SPF)
        0x00, 0x00, 0x00, 0xc8, // index SID = 200
    ]);

    let TlvValue::ExtIpv4Reach(tlv) =
        lsp.tlvs.get(&TlvType::ExtIpv4Reach).unwrap()
    else {
        panic!("expected ExtIpv4Reach TLV");
    };
    let entry = tlv.prefixes.get("100.1.1.13/32").unwrap();
    assert_eq!(entry.metric, 0);
    assert!(entry.up_down);
    assert!(entry.sub_tlvs_present);
    let sid = entry.prefix_sids.get(&200).unwrap();
    assert_eq!(sid.algo, IgpAlgoType::Spf);
    assert!(lsp.diagnostics.is_empty());
}

// Scenario 6: renderer atomicity and the key-leaf/state mirror pairing.
#[test]
fn scenario_6_renderer_atomicity() {
    let lsp = lsp_with_tlv(&[]);
    let ctx = Context {
        network_instance: "default".to_owned(),
        protocol_instance: "main".to_owned(),
        level: 2,
        timestamp: 1_700_000_000_000_000_000,
        use_structured_paths: false,
    };

    let notifications = notification::render(Some(&lsp), &ctx).unwrap();
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

// Truncation: a declared TLV length running past the buffer end stops the
// splitter rather than reading out of bounds.
#[test]
fn truncated_top_level_tlv_length_is_caught() {
    let lsp = lsp_with_tlv(&[TlvType::Ipv4Addresses as u8, 0xff, 0x01, 0x02]);
    assert!(lsp.tlvs.is_empty());
    assert_eq!(lsp.diagnostics.len(), 1);
}

// Adjacency-SID VALUE/LOCAL width deduction: both flags clear means a
// 4-byte index.
#[test]
fn adjacency_sid_index_form_end_to_end() {
    let lsp = lsp_with_tlv(&[
        TlvType::ExtIsReach as u8,
        19,
        0x00, 0x00, 0x40, 0x00, 0xce, 0x39, // system-id
        0x01, // pseudonode
        0x00, 0x00, 0x0a, // metric
        0x08, // sub-TLV block length
        31, 6, // Adjacency-SID sub-TLV
        0x00, 0x00, // flags, weight
        0x00, 0x00, 0x00, 0x64, // index SID = 100
    ]);

    let TlvValue::ExtIsReach(tlv) = lsp.tlvs.get(&TlvType::ExtIsReach).unwrap()
    else {
        panic!("expected ExtIsReach TLV");
    };
    let neighbor = tlv.neighbors.values().next().unwrap();
    let instance = neighbor.instances.get(&0).unwrap();
    assert!(matches!(
        instance.subtlvs.get(&NeighborStlvType::AdjacencySid),
        Some(NeighborStlvValue::AdjSid(sids)) if sids.len() == 1
    ));
}
