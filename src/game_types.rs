//! Game concept types that describe Wargame: Red Dragon units.
//!
//! These are the identifiers and closed enumerations shared by the export
//! and clean stages.

use std::fmt;

use crate::recognized::Recognized;

// =============================================================================
// Identity Types
// =============================================================================

/// Stable unit identifier, taken from a unit descriptor's `ID` attribute.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct UnitId(u32);

impl UnitId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for UnitId {
    fn from(v: u32) -> Self {
        UnitId(v)
    }
}

/// Index into a weapon manager's `Salves` list. Several mounted weapons can
/// draw from the same stock, which is how the game encodes one logical weapon
/// split over several slots.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct StockIndex(u32);

impl StockIndex {
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Parses the exporter's text for `SalvoStockIndex`. Missing and
    /// unreadable values count as stock 0.
    pub fn from_text(text: Option<&str>) -> Self {
        text.and_then(|t| t.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| StockIndex(v as u32))
            .unwrap_or_default()
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StockIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for StockIndex {
    fn from(v: u32) -> Self {
        StockIndex(v)
    }
}

// =============================================================================
// Modules
// =============================================================================

/// The movement handler a unit's `Mouvement` module resolves to. Each kind
/// owns a disjoint set of attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MovementKind {
    Land,
    Helicopter,
    Airplane,
}

impl MovementKind {
    pub const ALL: [MovementKind; 3] = [
        MovementKind::Land,
        MovementKind::Helicopter,
        MovementKind::Airplane,
    ];

    pub fn table_kind(&self) -> &'static str {
        match self {
            MovementKind::Land => "TMouvementHandlerLandVehicleDescriptor",
            MovementKind::Helicopter => "TMouvementHandlerHelicopterDescriptor",
            MovementKind::Airplane => "TMouvementHandlerAirplaneDescriptor",
        }
    }

    pub fn from_table_kind(kind: &str) -> Recognized<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.table_kind() == kind)
            .map(Recognized::Known)
            .unwrap_or_else(|| Recognized::Unknown(kind.to_string()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            MovementKind::Land => "Land",
            MovementKind::Helicopter => "Helicopter",
            MovementKind::Airplane => "Airplane",
        }
    }
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Modules a unit reaches through its `Modules` selector list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    WeaponManager,
    Fuel,
    Movement,
    Damage,
    Visibility,
    Experience,
    Scanner,
    Supply,
}

impl ModuleKind {
    /// Substring matched against the text of a `Modules` entry. First match
    /// in list order wins.
    pub fn token(&self) -> &'static str {
        match self {
            ModuleKind::WeaponManager => "WeaponManager",
            ModuleKind::Fuel => "Fuel",
            ModuleKind::Movement => "Mouvement",
            ModuleKind::Damage => "Damage",
            ModuleKind::Visibility => "Visibility",
            ModuleKind::Experience => "Experience",
            ModuleKind::Scanner => "ScannerConfiguration",
            ModuleKind::Supply => "Supply",
        }
    }

    /// Every unit in a shipping build carries these. A unit without one is
    /// still exported, with a warning.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            ModuleKind::Movement
                | ModuleKind::Damage
                | ModuleKind::Visibility
                | ModuleKind::Experience
                | ModuleKind::Scanner
        )
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

// =============================================================================
// Clean-stage enumerations
// =============================================================================

/// Deck archetypes a unit can be eligible for, in output join order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Deck {
    Mechanized,
    Motorized,
    Marine,
    Airborne,
    Armored,
    Support,
}

impl Deck {
    pub const ALL: [Deck; 6] = [
        Deck::Mechanized,
        Deck::Motorized,
        Deck::Marine,
        Deck::Airborne,
        Deck::Armored,
        Deck::Support,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Deck::Mechanized => "Mechanized",
            Deck::Motorized => "Motorized",
            Deck::Marine => "Marine",
            Deck::Airborne => "Airborne",
            Deck::Armored => "Armored",
            Deck::Support => "Support",
        }
    }
}

/// Coarse grouping of a weapon's `Arme` class code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassBand {
    /// Codes below 3: small arms and other weapons without a piercing value.
    Unrated,
    /// 3 and 4: flamethrowers, bombs, rocket pods.
    Special,
    /// 5..=34: armor piercing value is `code - 4`.
    Kinetic,
    /// 35..=65: armor piercing value is `code - 34`.
    Explosive,
    /// Anything above 65.
    OutOfRange,
}

impl ClassBand {
    pub fn of(code: i64) -> Self {
        match code {
            i64::MIN..=2 => ClassBand::Unrated,
            3 | 4 => ClassBand::Special,
            5..=34 => ClassBand::Kinetic,
            35..=65 => ClassBand::Explosive,
            _ => ClassBand::OutOfRange,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn movement_kind_from_table_kind() {
        assert_eq!(
            MovementKind::from_table_kind("TMouvementHandlerHelicopterDescriptor"),
            Recognized::Known(MovementKind::Helicopter)
        );
        assert_eq!(
            MovementKind::from_table_kind("TMouvementHandlerHovercraft"),
            Recognized::Unknown("TMouvementHandlerHovercraft".to_string())
        );
    }

    #[test]
    fn stock_index_defaults_to_zero() {
        assert_eq!(StockIndex::from_text(None), StockIndex::from(0));
        assert_eq!(StockIndex::from_text(Some("garbage")), StockIndex::from(0));
        assert_eq!(StockIndex::from_text(Some("2")), StockIndex::from(2));
        assert_eq!(StockIndex::from_text(Some("1.0")), StockIndex::from(1));
    }

    #[test]
    fn class_bands() {
        assert_eq!(ClassBand::of(1), ClassBand::Unrated);
        assert_eq!(ClassBand::of(3), ClassBand::Special);
        assert_eq!(ClassBand::of(5), ClassBand::Kinetic);
        assert_eq!(ClassBand::of(34), ClassBand::Kinetic);
        assert_eq!(ClassBand::of(35), ClassBand::Explosive);
        assert_eq!(ClassBand::of(65), ClassBand::Explosive);
        assert_eq!(ClassBand::of(66), ClassBand::OutOfRange);
    }
}
