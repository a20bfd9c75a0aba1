use super::molecule::MoleculeKind;
use crate::error::WarehouseError;

/// A console-only product made from one unit each of three molecules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrinkKind {
    SoftDrink,
    Vodka,
    Champagne,
}

impl DrinkKind {
    pub const ALL: [DrinkKind; 3] = [DrinkKind::SoftDrink, DrinkKind::Vodka, DrinkKind::Champagne];

    pub fn as_str(&self) -> &'static str {
        match self {
            DrinkKind::SoftDrink => "SOFT DRINK",
            DrinkKind::Vodka => "VODKA",
            DrinkKind::Champagne => "CHAMPAGNE",
        }
    }

    pub fn ingredients(&self) -> &'static [MoleculeKind] {
        match self {
            DrinkKind::SoftDrink => &[
                MoleculeKind::Water,
                MoleculeKind::CarbonDioxide,
                MoleculeKind::Glucose,
            ],
            DrinkKind::Vodka => &[
                MoleculeKind::Water,
                MoleculeKind::Alcohol,
                MoleculeKind::Glucose,
            ],
            DrinkKind::Champagne => &[
                MoleculeKind::Water,
                MoleculeKind::CarbonDioxide,
                MoleculeKind::Alcohol,
            ],
        }
    }
}

impl std::str::FromStr for DrinkKind {
    type Err = WarehouseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SOFT DRINK" => Ok(DrinkKind::SoftDrink),
            "VODKA" => Ok(DrinkKind::Vodka),
            "CHAMPAGNE" => Ok(DrinkKind::Champagne),
            other => Err(WarehouseError::UnknownProduct(other.to_string())),
        }
    }
}

impl std::fmt::Display for DrinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
