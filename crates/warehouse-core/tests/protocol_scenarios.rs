//! End-to-end protocol scenarios against the dispatcher.
//!
//! Each test feeds the exact text a client would send and checks both the
//! reply text and the resulting inventory.

use warehouse_core::command::{dispatch, Channel};
use warehouse_core::config::ProtocolConfig;
use warehouse_core::{AtomCounts, Inventory, InventorySnapshot, MoleculeCounts};

/// Dispatch `line` on `channel` and return the reply text.
fn send(inventory: &mut Inventory, channel: Channel, line: &str) -> Option<String> {
    dispatch(inventory, channel, line).reply(channel)
}

#[test]
fn test_add_then_deliver_water() {
    let mut inventory = Inventory::new();

    assert_eq!(send(&mut inventory, Channel::Stream, "ADD HYDROGEN 4\n"), None);
    assert_eq!(send(&mut inventory, Channel::Stream, "ADD OXYGEN 2\n"), None);

    assert_eq!(
        send(&mut inventory, Channel::Datagram, "DELIVER WATER 2").as_deref(),
        Some("OK 2")
    );
    assert_eq!(*inventory.atoms(), AtomCounts::default());
    assert_eq!(inventory.molecules().water, 2);
}

#[test]
fn test_deliver_fails_without_oxygen() {
    let mut inventory = Inventory::with_atoms(AtomCounts::new(1, 0, 0));

    assert_eq!(
        send(&mut inventory, Channel::Datagram, "DELIVER WATER 1").as_deref(),
        Some("FAILED")
    );
    assert_eq!(*inventory.atoms(), AtomCounts::new(1, 0, 0));
}

#[test]
fn test_unknown_molecule_is_invalid() {
    let mut inventory = Inventory::with_atoms(AtomCounts::new(50, 50, 50));
    let before = inventory.snapshot();

    assert_eq!(
        send(&mut inventory, Channel::Datagram, "DELIVER UNKNOWNMOL 1").as_deref(),
        Some("Invalid command")
    );
    assert_eq!(inventory.snapshot(), before);
}

#[test]
fn test_partial_delivery_reports_count() {
    let mut inventory = Inventory::with_atoms(AtomCounts::new(0, 5, 2));

    assert_eq!(
        send(&mut inventory, Channel::Datagram, "DELIVER CARBON DIOXIDE 3").as_deref(),
        Some("OK 2")
    );
    assert_eq!(*inventory.atoms(), AtomCounts::new(0, 1, 0));
    assert_eq!(inventory.molecules().carbon_dioxide, 2);
}

#[test]
fn test_gen_vodka_uses_minimum() {
    let mut inventory = Inventory::from(InventorySnapshot {
        atoms: AtomCounts::default(),
        molecules: MoleculeCounts {
            water: 3,
            alcohol: 1,
            glucose: 5,
            carbon_dioxide: 0,
        },
    });

    assert_eq!(
        send(&mut inventory, Channel::Console, "GEN VODKA").as_deref(),
        Some("You can make 1 VODKA(s)")
    );
    assert_eq!(
        send(&mut inventory, Channel::Console, "GEN SOFT DRINK").as_deref(),
        Some("You can make 0 SOFT DRINK(s)")
    );
    assert_eq!(
        send(&mut inventory, Channel::Console, "GEN WHISKY").as_deref(),
        Some("Unknown command.")
    );
}

#[test]
fn test_malformed_add_changes_nothing() {
    let mut inventory = Inventory::new();

    for line in ["ADD", "ADD HYDROGEN", "ADD HYDROGEN two", "ADD XENON 3", "HELLO"] {
        assert_eq!(send(&mut inventory, Channel::Stream, line), None);
    }
    assert_eq!(inventory, Inventory::new());
}

#[test]
fn test_add_over_datagram_is_rejected() {
    let mut inventory = Inventory::new();
    assert_eq!(
        send(&mut inventory, Channel::Datagram, "ADD HYDROGEN 4").as_deref(),
        Some("Invalid command")
    );
    assert_eq!(inventory.atoms().hydrogen, 0);
}

#[test]
fn test_huge_deliver_count_is_rejected_without_production() {
    let mut inventory = Inventory::new();
    send(&mut inventory, Channel::Stream, "ADD HYDROGEN 18446744073709551615");
    send(&mut inventory, Channel::Stream, "ADD OXYGEN 18446744073709551615");

    assert_eq!(
        send(&mut inventory, Channel::Datagram, "DELIVER WATER 18446744073709551615").as_deref(),
        Some("Invalid command")
    );
    assert_eq!(inventory.molecules().water, 0);

    let line = format!("DELIVER WATER {}", ProtocolConfig::MAX_DELIVER_COUNT);
    assert_eq!(
        send(&mut inventory, Channel::Datagram, &line),
        Some(format!("OK {}", ProtocolConfig::MAX_DELIVER_COUNT))
    );
    assert_eq!(inventory.molecules().water, ProtocolConfig::MAX_DELIVER_COUNT);
}
