//! In-memory inventory: atom stock plus the produced-molecule ledger.
//!
//! The inventory is a plain owned value. The server's event loop holds the
//! only instance and every command borrows it mutably for one update, so no
//! operation here needs locking. If a caller ever shares it between
//! threads, each method is the unit that has to be made mutually exclusive.

use crate::chemistry::{AtomCounts, AtomKind, MoleculeCounts, MoleculeKind};

/// Point-in-time copy of the whole inventory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct InventorySnapshot {
    pub atoms: AtomCounts,
    pub molecules: MoleculeCounts,
}

/// Atom stock and molecule ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    atoms: AtomCounts,
    molecules: MoleculeCounts,
}

impl Inventory {
    /// Create an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an inventory holding the given atoms and no molecules.
    pub fn with_atoms(atoms: AtomCounts) -> Self {
        Self {
            atoms,
            molecules: MoleculeCounts::default(),
        }
    }

    pub fn atoms(&self) -> &AtomCounts {
        &self.atoms
    }

    pub fn molecules(&self) -> &MoleculeCounts {
        &self.molecules
    }

    /// Add `amount` atoms of `kind` and return the new count.
    ///
    /// Saturates at `u64::MAX` instead of failing.
    pub fn credit(&mut self, kind: AtomKind, amount: u64) -> u64 {
        let count = self.atoms.get_mut(kind);
        *count = count.saturating_add(amount);
        *count
    }

    /// Subtract `cost` from the stock if, and only if, every kind is covered.
    ///
    /// Returns `false` without touching the stock when any kind falls short.
    #[must_use]
    pub fn debit_if_available(&mut self, cost: &AtomCounts) -> bool {
        if !self.atoms.covers(cost) {
            return false;
        }
        for kind in AtomKind::ALL {
            *self.atoms.get_mut(kind) -= cost.get(kind);
        }
        true
    }

    /// Record `units` finished molecules of `kind` in the ledger.
    ///
    /// Callers must have debited the matching atom cost first.
    pub(crate) fn record_molecules(&mut self, kind: MoleculeKind, units: u64) -> u64 {
        let count = self.molecules.get_mut(kind);
        *count = count.saturating_add(units);
        *count
    }

    pub fn snapshot(&self) -> InventorySnapshot {
        InventorySnapshot {
            atoms: self.atoms,
            molecules: self.molecules,
        }
    }

    /// Overwrite every count with the snapshot's values.
    pub fn restore(&mut self, snapshot: &InventorySnapshot) {
        self.atoms = snapshot.atoms;
        self.molecules = snapshot.molecules;
    }
}

impl From<InventorySnapshot> for Inventory {
    fn from(snapshot: InventorySnapshot) -> Self {
        let mut inventory = Inventory::new();
        inventory.restore(&snapshot);
        inventory
    }
}
