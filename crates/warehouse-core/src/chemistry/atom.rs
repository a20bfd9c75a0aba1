use crate::error::WarehouseError;

/// A raw resource added by suppliers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomKind {
    Hydrogen,
    Oxygen,
    Carbon,
}

impl AtomKind {
    /// All atom kinds, in persistence order.
    pub const ALL: [AtomKind; 3] = [AtomKind::Carbon, AtomKind::Hydrogen, AtomKind::Oxygen];

    pub fn as_str(&self) -> &'static str {
        match self {
            AtomKind::Hydrogen => "HYDROGEN",
            AtomKind::Oxygen => "OXYGEN",
            AtomKind::Carbon => "CARBON",
        }
    }
}

impl std::str::FromStr for AtomKind {
    type Err = WarehouseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HYDROGEN" => Ok(AtomKind::Hydrogen),
            "OXYGEN" => Ok(AtomKind::Oxygen),
            "CARBON" => Ok(AtomKind::Carbon),
            other => Err(WarehouseError::UnknownAtom(other.to_string())),
        }
    }
}

impl std::fmt::Display for AtomKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One count per atom kind.
///
/// Used both for the live stock and for recipe cost vectors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AtomCounts {
    pub hydrogen: u64,
    pub oxygen: u64,
    pub carbon: u64,
}

impl AtomCounts {
    pub const fn new(hydrogen: u64, oxygen: u64, carbon: u64) -> Self {
        Self {
            hydrogen,
            oxygen,
            carbon,
        }
    }

    pub fn get(&self, kind: AtomKind) -> u64 {
        match kind {
            AtomKind::Hydrogen => self.hydrogen,
            AtomKind::Oxygen => self.oxygen,
            AtomKind::Carbon => self.carbon,
        }
    }

    pub fn get_mut(&mut self, kind: AtomKind) -> &mut u64 {
        match kind {
            AtomKind::Hydrogen => &mut self.hydrogen,
            AtomKind::Oxygen => &mut self.oxygen,
            AtomKind::Carbon => &mut self.carbon,
        }
    }

    /// True if every count in `self` is at least the matching count in `other`.
    pub fn covers(&self, other: &AtomCounts) -> bool {
        AtomKind::ALL
            .iter()
            .all(|&kind| self.get(kind) >= other.get(kind))
    }

    pub fn total(&self) -> u64 {
        self.hydrogen
            .saturating_add(self.oxygen)
            .saturating_add(self.carbon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atom_kind_roundtrip() {
        for kind in AtomKind::ALL {
            let parsed: AtomKind = kind.as_str().parse().expect("Should parse");
            assert_eq!(kind, parsed);
        }
    }

    #[test]
    fn test_atom_kind_is_case_sensitive() {
        assert!("hydrogen".parse::<AtomKind>().is_err());
        assert!(matches!(
            "NITROGEN".parse::<AtomKind>(),
            Err(WarehouseError::UnknownAtom(name)) if name == "NITROGEN"
        ));
    }

    #[test]
    fn test_covers() {
        let stock = AtomCounts::new(2, 1, 0);
        assert!(stock.covers(&AtomCounts::new(2, 1, 0)));
        assert!(stock.covers(&AtomCounts::default()));
        assert!(!stock.covers(&AtomCounts::new(0, 0, 1)));
        assert!(!stock.covers(&AtomCounts::new(3, 0, 0)));
    }
}
