use super::atom::AtomCounts;
use crate::error::WarehouseError;

/// A finished unit assembled from a fixed recipe of atoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoleculeKind {
    Water,
    CarbonDioxide,
    Alcohol,
    Glucose,
}

impl MoleculeKind {
    /// All molecule kinds, in persistence order.
    pub const ALL: [MoleculeKind; 4] = [
        MoleculeKind::Alcohol,
        MoleculeKind::CarbonDioxide,
        MoleculeKind::Glucose,
        MoleculeKind::Water,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MoleculeKind::Water => "WATER",
            MoleculeKind::CarbonDioxide => "CARBON DIOXIDE",
            MoleculeKind::Alcohol => "ALCOHOL",
            MoleculeKind::Glucose => "GLUCOSE",
        }
    }

    /// Atoms consumed to produce one unit.
    pub const fn recipe(&self) -> AtomCounts {
        // (hydrogen, oxygen, carbon)
        match self {
            MoleculeKind::Water => AtomCounts::new(2, 1, 0),
            MoleculeKind::CarbonDioxide => AtomCounts::new(0, 2, 1),
            MoleculeKind::Alcohol => AtomCounts::new(6, 1, 2),
            MoleculeKind::Glucose => AtomCounts::new(12, 6, 6),
        }
    }
}

impl std::str::FromStr for MoleculeKind {
    type Err = WarehouseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WATER" => Ok(MoleculeKind::Water),
            "CARBON DIOXIDE" => Ok(MoleculeKind::CarbonDioxide),
            "ALCOHOL" => Ok(MoleculeKind::Alcohol),
            "GLUCOSE" => Ok(MoleculeKind::Glucose),
            other => Err(WarehouseError::UnknownMolecule(other.to_string())),
        }
    }
}

impl std::fmt::Display for MoleculeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Produced-and-retained units per molecule kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MoleculeCounts {
    pub water: u64,
    pub carbon_dioxide: u64,
    pub alcohol: u64,
    pub glucose: u64,
}

impl MoleculeCounts {
    pub fn get(&self, kind: MoleculeKind) -> u64 {
        match kind {
            MoleculeKind::Water => self.water,
            MoleculeKind::CarbonDioxide => self.carbon_dioxide,
            MoleculeKind::Alcohol => self.alcohol,
            MoleculeKind::Glucose => self.glucose,
        }
    }

    pub fn get_mut(&mut self, kind: MoleculeKind) -> &mut u64 {
        match kind {
            MoleculeKind::Water => &mut self.water,
            MoleculeKind::CarbonDioxide => &mut self.carbon_dioxide,
            MoleculeKind::Alcohol => &mut self.alcohol,
            MoleculeKind::Glucose => &mut self.glucose,
        }
    }
}
