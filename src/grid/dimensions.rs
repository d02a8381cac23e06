use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MenuError, Result};
use crate::slot::{MAX_ROWS, WIDTH};

/// Container kind. Only chests are row-based and may grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridKind {
    Chest,
    Furnace,
    Brewing,
    Hopper,
    Dispenser,
}

impl GridKind {
    /// Capacity of non-chest kinds; `None` for chests.
    pub fn fixed_capacity(self) -> Option<usize> {
        match self {
            GridKind::Chest => None,
            GridKind::Furnace => Some(3),
            GridKind::Brewing => Some(4),
            GridKind::Hopper => Some(5),
            GridKind::Dispenser => Some(9),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GridKind::Chest => "chest",
            GridKind::Furnace => "furnace",
            GridKind::Brewing => "brewing",
            GridKind::Hopper => "hopper",
            GridKind::Dispenser => "dispenser",
        }
    }
}

impl fmt::Display for GridKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated shape of an item grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridDimensions {
    kind: GridKind,
    rows: u8,
    growable: bool,
}

impl GridDimensions {
    /// Chest shape with `rows` rows of nine.
    pub fn chest(rows: u8) -> Result<Self> {
        if !(1..=MAX_ROWS).contains(&rows) {
            return Err(MenuError::InvalidRows(rows));
        }
        Ok(Self {
            kind: GridKind::Chest,
            rows,
            growable: false,
        })
    }

    /// Fixed shape of a non-chest kind.
    pub fn fixed(kind: GridKind) -> Result<Self> {
        if kind.fixed_capacity().is_none() {
            return Err(MenuError::FixedKind(kind.to_string()));
        }
        Ok(Self {
            kind,
            rows: 1,
            growable: false,
        })
    }

    /// Shape for `kind`; `rows` must be 1 for non-chest kinds.
    pub fn new(kind: GridKind, rows: u8) -> Result<Self> {
        match kind {
            GridKind::Chest => Self::chest(rows),
            other if rows == 1 => Self::fixed(other),
            other => Err(MenuError::FixedKind(other.to_string())),
        }
    }

    /// Allow `add` to append rows up to the ceiling. Chests only.
    pub fn growable(mut self) -> Result<Self> {
        if self.kind != GridKind::Chest {
            return Err(MenuError::FixedKind(self.kind.to_string()));
        }
        self.growable = true;
        Ok(self)
    }

    pub fn without_growth(mut self) -> Self {
        self.growable = false;
        self
    }

    pub fn kind(&self) -> GridKind {
        self.kind
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn is_growable(&self) -> bool {
        self.growable
    }

    pub fn can_grow(&self) -> bool {
        self.growable && self.rows < MAX_ROWS
    }

    pub fn capacity(&self) -> usize {
        self.kind
            .fixed_capacity()
            .unwrap_or(self.rows as usize * WIDTH as usize)
    }

    pub(crate) fn add_row(&mut self) -> bool {
        if !self.can_grow() {
            return false;
        }
        self.rows += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chest_rows_are_validated() {
        assert!(matches!(GridDimensions::chest(0), Err(MenuError::InvalidRows(0))));
        assert!(matches!(GridDimensions::chest(7), Err(MenuError::InvalidRows(7))));
        assert_eq!(GridDimensions::chest(6).unwrap().capacity(), 54);
    }

    #[test]
    fn fixed_kinds_have_closed_capacities() {
        let caps: Vec<_> = [
            GridKind::Furnace,
            GridKind::Brewing,
            GridKind::Hopper,
            GridKind::Dispenser,
        ]
        .into_iter()
        .map(|kind| GridDimensions::fixed(kind).unwrap().capacity())
        .collect();
        assert_eq!(caps, vec![3, 4, 5, 9]);
        assert!(GridDimensions::fixed(GridKind::Chest).is_err());
        assert!(GridDimensions::new(GridKind::Hopper, 2).is_err());
    }

    #[test]
    fn only_chests_grow() {
        let hopper = GridDimensions::fixed(GridKind::Hopper).unwrap();
        assert!(hopper.growable().is_err());

        let mut chest = GridDimensions::chest(5).unwrap().growable().unwrap();
        assert!(chest.add_row());
        assert_eq!(chest.rows(), 6);
        assert!(!chest.add_row());
        assert!(!chest.without_growth().can_grow());
    }
}
