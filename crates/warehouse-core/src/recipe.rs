//! Recipe engine: molecule costs, bulk production and drink capacity.

use crate::chemistry::{AtomCounts, MoleculeCounts, MoleculeKind};
use crate::error::Result;
use crate::inventory::Inventory;

/// Result of a bulk production request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Production {
    pub molecule: MoleculeKind,
    pub produced: u64,
    pub requested: u64,
}

impl Production {
    pub fn is_complete(&self) -> bool {
        self.produced == self.requested
    }
}

/// Look up the atom cost of one unit of the named molecule.
pub fn cost_of(name: &str) -> Result<AtomCounts> {
    let kind: MoleculeKind = name.parse()?;
    Ok(kind.recipe())
}

/// Produce up to `requested` units of `molecule`, one unit at a time.
///
/// Stops at the first unit whose cost is not covered, so the stock is left
/// at exactly `before - produced * cost`. Produced units are recorded in the
/// molecule ledger. The loop runs up to `requested` times; the parser caps
/// counts at `ProtocolConfig::MAX_DELIVER_COUNT`.
pub fn produce(inventory: &mut Inventory, molecule: MoleculeKind, requested: u64) -> Production {
    let cost = molecule.recipe();
    let mut produced = 0;
    while produced < requested {
        if !inventory.debit_if_available(&cost) {
            break;
        }
        produced += 1;
    }

    if produced > 0 {
        inventory.record_molecules(molecule, produced);
    }

    Production {
        molecule,
        produced,
        requested,
    }
}

/// How many finished products need one unit of each listed molecule.
///
/// Returns 0 for an empty list. Read-only.
pub fn max_producible(ledger: &MoleculeCounts, kinds: &[MoleculeKind]) -> u64 {
    kinds
        .iter()
        .map(|&kind| ledger.get(kind))
        .min()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chemistry::AtomKind;
    use crate::error::WarehouseError;

    #[test]
    fn test_cost_of_known_and_unknown() {
        assert_eq!(cost_of("WATER").unwrap(), AtomCounts::new(2, 1, 0));
        assert_eq!(cost_of("CARBON DIOXIDE").unwrap(), AtomCounts::new(0, 2, 1));
        assert!(matches!(
            cost_of("UNKNOWNMOL"),
            Err(WarehouseError::UnknownMolecule(_))
        ));
    }

    #[test]
    fn test_produce_full_request() {
        let mut inventory = Inventory::new();
        inventory.credit(AtomKind::Hydrogen, 4);
        inventory.credit(AtomKind::Oxygen, 2);

        let production = produce(&mut inventory, MoleculeKind::Water, 2);
        assert_eq!(production.produced, 2);
        assert!(production.is_complete());
        assert_eq!(*inventory.atoms(), AtomCounts::default());
        assert_eq!(inventory.molecules().water, 2);
    }

    #[test]
    fn test_produce_stops_at_first_shortfall() {
        let mut inventory = Inventory::with_atoms(AtomCounts::new(13, 100, 100));

        let production = produce(&mut inventory, MoleculeKind::Alcohol, 5);
        assert_eq!(production.produced, 2);
        assert_eq!(production.requested, 5);
        assert!(!production.is_complete());
        assert_eq!(*inventory.atoms(), AtomCounts::new(1, 98, 96));
        assert_eq!(inventory.molecules().alcohol, 2);
    }

    #[test]
    fn test_produce_nothing_leaves_ledger_untouched() {
        let mut inventory = Inventory::with_atoms(AtomCounts::new(1, 0, 0));
        let production = produce(&mut inventory, MoleculeKind::Water, 1);
        assert_eq!(production.produced, 0);
        assert_eq!(*inventory.atoms(), AtomCounts::new(1, 0, 0));
        assert_eq!(*inventory.molecules(), MoleculeCounts::default());
    }

    #[test]
    fn test_produce_zero_requested() {
        let mut inventory = Inventory::with_atoms(AtomCounts::new(10, 10, 10));
        let production = produce(&mut inventory, MoleculeKind::Water, 0);
        assert_eq!(production.produced, 0);
        assert!(production.is_complete());
        assert_eq!(*inventory.atoms(), AtomCounts::new(10, 10, 10));
    }

    #[test]
    fn test_max_producible_takes_minimum() {
        let ledger = MoleculeCounts {
            water: 3,
            alcohol: 1,
            glucose: 5,
            carbon_dioxide: 0,
        };
        let vodka = [MoleculeKind::Water, MoleculeKind::Alcohol, MoleculeKind::Glucose];
        assert_eq!(max_producible(&ledger, &vodka), 1);
        assert_eq!(max_producible(&ledger, &[MoleculeKind::Water]), 3);
        assert_eq!(max_producible(&ledger, &[]), 0);
    }
}
