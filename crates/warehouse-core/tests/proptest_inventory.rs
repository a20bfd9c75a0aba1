//! Property-based tests for the inventory, recipe engine and dispatcher.
//!
//! Uses proptest to generate random stocks and command sequences, then
//! checks that atoms are conserved and deliveries are maximal.

use proptest::prelude::*;
use warehouse_core::command::{dispatch, Channel};
use warehouse_core::{recipe, AtomCounts, AtomKind, Inventory, InventorySnapshot, MoleculeCounts, MoleculeKind};

// ===========================================================================
// Generators
// ===========================================================================

fn arb_atom() -> impl Strategy<Value = AtomKind> {
    prop::sample::select(AtomKind::ALL.to_vec())
}

fn arb_molecule() -> impl Strategy<Value = MoleculeKind> {
    prop::sample::select(MoleculeKind::ALL.to_vec())
}

fn arb_atoms(max: u64) -> impl Strategy<Value = AtomCounts> {
    (0..=max, 0..=max, 0..=max).prop_map(|(h, o, c)| AtomCounts::new(h, o, c))
}

fn arb_snapshot() -> impl Strategy<Value = InventorySnapshot> {
    (arb_atoms(u64::MAX), prop::array::uniform4(any::<u64>())).prop_map(|(atoms, m)| {
        InventorySnapshot {
            atoms,
            molecules: MoleculeCounts {
                water: m[0],
                carbon_dioxide: m[1],
                alcohol: m[2],
                glucose: m[3],
            },
        }
    })
}

/// A message together with the channel it arrives on.
#[derive(Debug, Clone)]
enum Op {
    Add(AtomKind, u64),
    Deliver(MoleculeKind, u64),
}

fn arb_ops(max_ops: usize) -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(
        prop_oneof![
            (arb_atom(), 0..200u64).prop_map(|(a, n)| Op::Add(a, n)),
            (arb_molecule(), 0..10u64).prop_map(|(m, n)| Op::Deliver(m, n)),
        ],
        0..max_ops,
    )
}

fn scaled(cost: AtomCounts, units: u64) -> AtomCounts {
    AtomCounts::new(cost.hydrogen * units, cost.oxygen * units, cost.carbon * units)
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #[test]
    fn add_totals_match_sum_of_amounts(adds in prop::collection::vec((arb_atom(), 0..10_000u64), 0..64)) {
        let mut inventory = Inventory::new();
        let mut expected = AtomCounts::default();

        for (atom, amount) in &adds {
            let line = format!("ADD {} {}", atom, amount);
            dispatch(&mut inventory, Channel::Stream, &line);
            *expected.get_mut(*atom) += amount;
        }

        prop_assert_eq!(*inventory.atoms(), expected);
    }

    #[test]
    fn deliver_is_maximal_and_exact(stock in arb_atoms(60), molecule in arb_molecule(), n in 0..20u64) {
        let mut inventory = Inventory::with_atoms(stock);
        let production = recipe::produce(&mut inventory, molecule, n);
        let cost = molecule.recipe();

        prop_assert!(production.produced <= n);

        let spent = scaled(cost, production.produced);
        prop_assert!(stock.covers(&spent));
        prop_assert_eq!(
            *inventory.atoms(),
            AtomCounts::new(
                stock.hydrogen - spent.hydrogen,
                stock.oxygen - spent.oxygen,
                stock.carbon - spent.carbon,
            )
        );

        // One more unit would have been either unrequested or unaffordable.
        if production.produced < n {
            prop_assert!(!stock.covers(&scaled(cost, production.produced + 1)));
        }

        prop_assert_eq!(inventory.molecules().get(molecule), production.produced);
    }

    #[test]
    fn mixed_traffic_conserves_atoms(ops in arb_ops(80)) {
        let mut inventory = Inventory::new();
        let mut added = AtomCounts::default();

        for op in &ops {
            match op {
                Op::Add(atom, amount) => {
                    dispatch(&mut inventory, Channel::Stream, &format!("ADD {} {}", atom, amount));
                    *added.get_mut(*atom) += amount;
                }
                Op::Deliver(molecule, count) => {
                    dispatch(&mut inventory, Channel::Datagram, &format!("DELIVER {} {}", molecule, count));
                }
            }
        }

        for atom in AtomKind::ALL {
            let locked_in_molecules: u64 = MoleculeKind::ALL
                .iter()
                .map(|m| inventory.molecules().get(*m) * m.recipe().get(atom))
                .sum();
            prop_assert_eq!(inventory.atoms().get(atom) + locked_in_molecules, added.get(atom));
        }
    }

    #[test]
    fn snapshot_restore_is_identity(snapshot in arb_snapshot()) {
        let mut inventory = Inventory::with_atoms(AtomCounts::new(1, 2, 3));
        inventory.restore(&snapshot);
        prop_assert_eq!(inventory.snapshot(), snapshot);
    }

    #[test]
    fn snapshot_text_roundtrip(snapshot in arb_snapshot()) {
        let mut restored = InventorySnapshot::default();
        let applied = restored.apply_text(&snapshot.to_text());
        prop_assert_eq!(applied, AtomKind::ALL.len() + MoleculeKind::ALL.len());
        prop_assert_eq!(restored, snapshot);
    }
}
