//! Frame classification tests

mod common;

use common::frame;
use uip_task::net::ethernet::{
    ETHERTYPE_ARP, ETHERTYPE_IPV4, ETHERTYPE_IPV6, FrameKind, HEADER_SIZE, classify, ethertype,
};

#[test]
fn test_ipv4_frame_is_network_layer() {
    assert_eq!(classify(&frame(ETHERTYPE_IPV4, 46)), FrameKind::Ipv4);
}

#[test]
fn test_arp_frame_is_address_resolution() {
    assert_eq!(classify(&frame(ETHERTYPE_ARP, 28)), FrameKind::Arp);
}

#[test]
fn test_other_ethertypes_are_unrecognized() {
    assert_eq!(classify(&frame(ETHERTYPE_IPV6, 40)), FrameKind::Unrecognized);
    assert_eq!(classify(&frame(0x88cc, 40)), FrameKind::Unrecognized); // LLDP
    // byte-swapped IPv4 tag must not match
    assert_eq!(classify(&frame(0x0008, 40)), FrameKind::Unrecognized);
}

#[test]
fn test_header_only_frame_is_classified() {
    let header = frame(ETHERTYPE_ARP, 0);
    assert_eq!(header.len(), HEADER_SIZE);
    assert_eq!(classify(&header), FrameKind::Arp);
}

#[test]
fn test_runt_frame_is_unrecognized() {
    let full = frame(ETHERTYPE_IPV4, 46);
    let runt = &full[..HEADER_SIZE - 1];
    assert_eq!(ethertype(runt), None);
    assert_eq!(classify(runt), FrameKind::Unrecognized);
    assert_eq!(classify(&[]), FrameKind::Unrecognized);
}

#[test]
fn test_classification_reads_only_the_type_field() {
    let mut f = frame(ETHERTYPE_IPV4, 46);
    // payload that looks like an ARP header does not matter
    f[HEADER_SIZE..HEADER_SIZE + 2].copy_from_slice(&ETHERTYPE_ARP.to_be_bytes());
    assert_eq!(classify(&f), FrameKind::Ipv4);
}
