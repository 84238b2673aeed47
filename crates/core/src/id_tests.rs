// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn new_ids_carry_prefix_and_random_suffix() {
    let id = SessionId::new();
    assert!(id.as_str().starts_with("cmp-"));
    assert_eq!(id.suffix().len(), SUFFIX_LEN);
}

#[test]
fn ids_are_unique() {
    let a = SessionId::new();
    let b = SessionId::new();
    assert_ne!(a, b);
}

#[test]
fn from_string_round_trips() {
    let id = ReportId::from_string("rpt-abc123");
    assert_eq!(id.as_str(), "rpt-abc123");
    assert_eq!(id.suffix(), "abc123");
    assert_eq!(id, "rpt-abc123");
}

#[test]
fn suffix_of_unprefixed_id_is_whole_string() {
    let id = SessionId::from_string("no-prefix-here");
    assert_eq!(id.suffix(), "no-prefix-here");
}

#[test]
fn serde_is_transparent() {
    let id = SessionId::from_string("cmp-serde");
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"cmp-serde\"");
    let back: SessionId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
}

#[test]
fn display_prints_full_id() {
    let id = ReportId::from_string("rpt-x");
    assert_eq!(id.to_string(), "rpt-x");
}
