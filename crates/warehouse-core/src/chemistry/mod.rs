//! Fixed chemistry tables: atom kinds, molecule recipes and drink products.
//!
//! Every table here is static. Names are matched case-sensitively against
//! their wire form (`CARBON DIOXIDE` and `SOFT DRINK` keep their space).

mod atom;
mod drink;
mod molecule;

pub use atom::{AtomCounts, AtomKind};
pub use drink::DrinkKind;
pub use molecule::{MoleculeCounts, MoleculeKind};
