//! Serial extraction from a decrypted save document.
//!
//! The document tree has no single schema: a character save keeps
//! items under `state.inventory`, a profile save under
//! `domains.local.shared.inventory`, and both kinds can show up in the
//! same file format. Each known shape is probed independently and an
//! absent or malformed sub-tree simply contributes nothing.

use std::collections::HashSet;

use serde_yaml::Value;

/// Character save, backpack: `state.inventory.items.backpack.slot_N.serial`
const BACKPACK_PATH: &[&str] = &["state", "inventory", "items", "backpack"];

/// Character save, equipped: `state.inventory.equipped_inventory.equipped.slot_N[0].serial`
const EQUIPPED_PATH: &[&str] = &["state", "inventory", "equipped_inventory", "equipped"];

/// Profile save, bank: `domains.local.shared.inventory.items.bank.slot_N.serial`
const BANK_PATH: &[&str] = &["domains", "local", "shared", "inventory", "items", "bank"];

/// Collect every item serial reachable through a known document shape,
/// deduplicated, in discovery order. Never fails: a document matching
/// no shape yields an empty list.
pub fn extract_serials(doc: &Value) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut serials = Vec::new();

    let mut push = |serial: &str| {
        if seen.insert(serial.to_string()) {
            serials.push(serial.to_string());
        }
    };

    if let Some(backpack) = value_at(doc, BACKPACK_PATH) {
        for slot in scan_indexed_slots(backpack) {
            if let Some(serial) = slot_serial(slot) {
                push(serial);
            }
        }
    }

    if let Some(equipped) = value_at(doc, EQUIPPED_PATH) {
        for slot in scan_indexed_slots(equipped) {
            // Equipped slots are sequences; the item sits in the first entry.
            if let Some(serial) = slot.get(0).and_then(slot_serial) {
                push(serial);
            }
        }
    }

    if let Some(bank) = value_at(doc, BANK_PATH) {
        for slot in scan_indexed_slots(bank) {
            if let Some(serial) = slot_serial(slot) {
                push(serial);
            }
        }
    }

    serials
}

/// Follow a chain of mapping keys from the root.
fn value_at<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(root, |node, key| node.get(*key))
}

/// Enumerate `slot_0`, `slot_1`, … until the first missing key.
///
/// The save format writes slot families as mappings with numbered
/// keys, densely from zero; a gap means the end, and later keys past
/// a gap are deliberately not picked up.
fn scan_indexed_slots(container: &Value) -> Vec<&Value> {
    let mut slots = Vec::new();
    let mut index = 0usize;
    while let Some(slot) = container.get(format!("slot_{index}").as_str()) {
        slots.push(slot);
        index += 1;
    }
    slots
}

/// A slot contributes only a non-empty string `serial`.
fn slot_serial(slot: &Value) -> Option<&str> {
    slot.get("serial").and_then(Value::as_str).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn backpack_serials_in_slot_order() {
        let doc = doc(r#"
            state:
              inventory:
                items:
                  backpack:
                    slot_0: { serial: "@Ugr$ZCm" }
                    slot_1: { serial: "@Ugd9fJx" }
                    slot_2: { serial: "@Ugw11Qq" }
        "#);
        assert_eq!(
            extract_serials(&doc),
            vec!["@Ugr$ZCm", "@Ugd9fJx", "@Ugw11Qq"]
        );
    }

    #[test]
    fn scan_stops_at_first_missing_index() {
        let doc = doc(r#"
            state:
              inventory:
                items:
                  backpack:
                    slot_0: { serial: "@Ugr$ZCm" }
                    slot_2: { serial: "@Ugnever" }
        "#);
        // slot_2 sits past the gap and must not be picked up
        assert_eq!(extract_serials(&doc), vec!["@Ugr$ZCm"]);
    }

    #[test]
    fn equipped_reads_first_sequence_entry() {
        let doc = doc(r#"
            state:
              inventory:
                equipped_inventory:
                  equipped:
                    slot_0:
                      - { serial: "@Ugequip1" }
                      - { serial: "@Ugshadow" }
                    slot_1:
                      - { serial: "@Ugequip2" }
        "#);
        assert_eq!(extract_serials(&doc), vec!["@Ugequip1", "@Ugequip2"]);
    }

    #[test]
    fn bank_shape_is_probed() {
        let doc = doc(r#"
            domains:
              local:
                shared:
                  inventory:
                    items:
                      bank:
                        slot_0: { serial: "@Ugbank0" }
        "#);
        assert_eq!(extract_serials(&doc), vec!["@Ugbank0"]);
    }

    #[test]
    fn duplicate_across_shapes_collapses() {
        let doc = doc(r#"
            state:
              inventory:
                items:
                  backpack:
                    slot_0: { serial: "@Ugr$ZCm" }
            domains:
              local:
                shared:
                  inventory:
                    items:
                      bank:
                        slot_0: { serial: "@Ugr$ZCm" }
                        slot_1: { serial: "@Xyz123" }
        "#);
        assert_eq!(extract_serials(&doc), vec!["@Ugr$ZCm", "@Xyz123"]);
    }

    #[test]
    fn non_string_and_empty_serials_are_skipped() {
        let doc = doc(r#"
            state:
              inventory:
                items:
                  backpack:
                    slot_0: { serial: 12345 }
                    slot_1: { serial: "" }
                    slot_2: { serial: "@Ugvalid" }
                    slot_3: { level: 50 }
        "#);
        assert_eq!(extract_serials(&doc), vec!["@Ugvalid"]);
    }

    #[test]
    fn absent_inventory_yields_empty() {
        assert!(extract_serials(&doc("state: {}")).is_empty());
        assert!(extract_serials(&doc("unrelated: true")).is_empty());
        assert!(extract_serials(&doc("state: { inventory: { items: {} } }")).is_empty());
    }

    #[test]
    fn malformed_subtrees_contribute_nothing() {
        let doc = doc(r#"
            state:
              inventory:
                items:
                  backpack: "not a mapping"
                equipped_inventory:
                  equipped:
                    slot_0: { serial: "@Ugnotaseq" }
        "#);
        // backpack is a scalar and the equipped slot is not a sequence
        assert!(extract_serials(&doc).is_empty());
    }
}
