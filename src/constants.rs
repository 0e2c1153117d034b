//! Code tables and unit conversions used by the clean stage.
//!
//! Everything here was verified against one game build
//! ([`CONSTANTS_BUILD`]). A new build that renumbers a code simply produces
//! undefined cells for it; nothing in this module panics on unknown input.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::game_types::Deck;

/// Game build the tables below were checked against.
pub const CONSTANTS_BUILD: &str = "510049986";

/// Default code tables (hardcoded, no game files needed).
pub static DEFAULT_UNIT_CODES: LazyLock<UnitCodes> = LazyLock::new(UnitCodes::defaults);

/// Game distance units to meters.
pub fn scale_range(raw: f64) -> f64 {
    raw * 175.0 / 13000.0
}

/// Game speed, acceleration and altitude units to km/h or meters.
pub fn scale_speed(raw: f64) -> f64 {
    raw / 52.0
}

/// Weapon range attributes and the columns they become, in meters.
pub const RANGE_COLUMNS: [(&str, &str); 10] = [
    ("PorteeMaximale", "RangeGround"),
    ("PorteeMinimale", "RangeGroundMinimum"),
    ("PorteeMaximaleBateaux", "RangeShip"),
    ("PorteeMinimaleBateaux", "RangeShipMinimum"),
    ("PorteeMaximaleTBA", "RangeHelicopters"),
    ("PorteeMinimaleTBA", "RangeHelicoptersMinimum"),
    ("PorteeMaximaleHA", "RangePlanes"),
    ("PorteeMinimaleHA", "RangePlanesMinimum"),
    ("PorteeMaximaleProjectile", "RangeMissiles"),
    ("PorteeMinimaleProjectile", "RangeMissilesMinimum"),
];

/// Other weapon attributes in game distance units.
pub const DISTANCE_COLUMNS: [(&str, &str); 4] = [
    ("RadiusSplashPhysicalDamages", "RadiusSplashPhysicalDamage"),
    ("RadiusSplashSuppressDamages", "RadiusSplashSuppressDamage"),
    ("DispersionAtMaxRange", "DispersionAtMaxRange"),
    ("DispersionAtMinRange", "DispersionAtMinRange"),
];

/// Weapon-type hashes whose duplicate slots are mirrored copies for
/// accuracy purposes and are dropped instead of merged.
pub const SYMMETRIC_WEAPON_TYPES: [&str; 3] =
    ["D1D5010000000000", "6ABCBA1C00000000", "5C99C7BA89E30B00"];

/// Class code a smoke launcher slot carries.
pub const SMOKE_CLASS_CODE: i64 = 3;

/// Weapon type labels that never get a piercing value or AoE tag even when
/// their class code falls in a rated band.
pub const SPECIAL_WEAPON_TYPES: [&str; 4] = ["Rocket Launcher", "HMG", "MMG", "Flamethrower"];

/// Special weapon types plus anything that is a bomb.
pub fn is_special_weapon(weapon_type: &str) -> bool {
    SPECIAL_WEAPON_TYPES.contains(&weapon_type) || weapon_type.contains("Bomb")
}

/// Weapon type labels whose explosive rounds count as area effect.
pub const AREA_WEAPON_TYPES: [&str; 2] = ["Autocannon", "Main Gun"];

/// Weapon type label of ship-to-ship missiles.
pub const ANTI_SHIP_MISSILE_TYPE: &str = "SSM";

/// Name fragments that mark a unit as withdrawn from the game.
pub const DEPRECATED_MARKERS: [&str; 2] = ["Deprec!", "DEPREC"];

pub const COMMAND_MARKER: &str = "#command ";

/// Name markers encoding recon optics, from worst to best.
pub const OPTICS_MARKERS: [(&str, &str); 3] = [
    ("#reco1", "Good"),
    ("#reco2", "Very Good"),
    ("#reco3", "Exceptional"),
];

/// The localization file truncates some calibers at the first comma.
pub const CALIBER_REPAIRS: [(&str, &str); 6] = [
    ("7", "7,62mm"),
    ("5", "5,45mm"),
    ("12", "12,7mm"),
    ("14", "14,5mm"),
    ("4", "4,73mm"),
    ("6", "6,5mm"),
];

pub fn repair_caliber(caliber: &str) -> &str {
    CALIBER_REPAIRS
        .iter()
        .find(|(truncated, _)| *truncated == caliber)
        .map(|(_, full)| *full)
        .unwrap_or(caliber)
}

/// Closed code tables for unit attributes.
#[derive(Debug, Clone)]
pub struct UnitCodes {
    mother_countries: HashMap<&'static str, &'static str>,
    training: HashMap<&'static str, &'static str>,
    ciws: HashMap<&'static str, &'static str>,
    sailing: HashMap<&'static str, &'static str>,
    movement_classes: HashMap<i32, &'static str>,
    amphibious: HashMap<i32, bool>,
    tabs: HashMap<i32, &'static str>,
    decks: HashMap<&'static str, Deck>,
}

impl UnitCodes {
    pub fn defaults() -> Self {
        Self {
            mother_countries: HashMap::from([
                ("US", "United States"),
                ("UK", "United Kingdom"),
                ("FR", "France"),
                ("RFA", "West Germany"),
                ("CAN", "Canada"),
                ("SWE", "Sweden"),
                ("NOR", "Norway"),
                ("DAN", "Denmark"),
                ("ANZ", "ANZAC"),
                ("JAP", "Japan"),
                ("ROK", "South Korea"),
                ("ISR", "Israel"),
                ("HOL", "The Netherlands"),
                ("URSS", "Soviet Union"),
                ("RDA", "East Germany"),
                ("TCH", "Czechoslavakia"),
                ("POL", "Poland"),
                ("CHI", "China"),
                ("NK", "North Korea"),
                ("YUG", "Yugoslavia"),
                ("FIN", "Finland"),
                ("SA", "South Africa"),
            ]),
            training: HashMap::from([
                ("8F37594F19619C07", "Elite"),
                ("5593495D19619C07", "Shock"),
                ("D6173D5C19619C07", "Regular"),
                ("DE644D5719619C07", "Militia"),
            ]),
            ciws: HashMap::from([
                ("4F233E0000000000", "Exceptional"),
                ("4E96452000000000", "Very Good"),
                ("4E96450000000000", "Good"),
                ("D672711906000000", "Medium"),
                ("CEC2000000000000", "Bad"),
            ]),
            sailing: HashMap::from([
                ("CBD32D65B4780000", "Deep Sea"),
                ("CBD33165B4780000", "Coastal"),
                ("CBD33565B4780000", "Riverine"),
            ]),
            movement_classes: HashMap::from([
                (1, "Foot"),
                (2, "Wheeled"),
                (3, "Wheeled"),
                (5, "Tracked"),
                (6, "Air"),
                (7, "Wheeled"),
                (8, "Tracked"),
                (9, "Water"),
            ]),
            amphibious: HashMap::from([
                (1, false),
                (2, false),
                (3, false),
                (5, false),
                (7, true),
                (8, true),
            ]),
            tabs: HashMap::from([
                (3, "LOG"),
                (6, "INF"),
                (7, "PLA"),
                (8, "VHC"),
                (9, "TNK"),
                (10, "REC"),
                (11, "HEL"),
                (12, "SHP"),
                (13, "SUP"),
            ]),
            decks: HashMap::from([
                ("8BD43C9757360E00", Deck::Mechanized),
                ("5C76718B57360E00", Deck::Armored),
                ("5E767965E3000000", Deck::Motorized),
                ("DAD77965E3000000", Deck::Support),
                ("23B8605ED9380000", Deck::Marine),
                ("0BB7685ED9380000", Deck::Airborne),
            ]),
        }
    }

    pub fn mother_country(&self, code: &str) -> Option<&str> {
        self.mother_countries.get(code).copied()
    }

    pub fn training(&self, hash: &str) -> Option<&str> {
        self.training.get(hash).copied()
    }

    pub fn ciws(&self, hash: &str) -> Option<&str> {
        self.ciws.get(hash).copied()
    }

    pub fn sailing(&self, hash: &str) -> Option<&str> {
        self.sailing.get(hash).copied()
    }

    pub fn movement_class(&self, code: i32) -> Option<&str> {
        self.movement_classes.get(&code).copied()
    }

    /// `None` for air and water movers, where the question does not apply.
    pub fn is_amphibious(&self, code: i32) -> Option<bool> {
        self.amphibious.get(&code).copied()
    }

    pub fn tab(&self, factory: i32) -> Option<&str> {
        self.tabs.get(&factory).copied()
    }

    pub fn deck(&self, token: &str) -> Option<Deck> {
        self.decks.get(token).copied()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn conversions() {
        assert_eq!(scale_speed(520.0), 10.0);
        assert_eq!(scale_range(13000.0), 175.0);
    }

    #[test]
    fn unknown_codes_are_undefined() {
        let codes = &*DEFAULT_UNIT_CODES;
        assert_eq!(codes.mother_country("RFA"), Some("West Germany"));
        assert_eq!(codes.mother_country("ATL"), None);
        assert_eq!(codes.tab(4), None);
        assert_eq!(codes.movement_class(4), None);
        assert_eq!(codes.is_amphibious(6), None);
        assert_eq!(codes.is_amphibious(7), Some(true));
        assert_eq!(codes.deck("5C76718B57360E00"), Some(Deck::Armored));
    }

    #[test]
    fn caliber_repairs_only_truncated_values() {
        assert_eq!(repair_caliber("7"), "7,62mm");
        assert_eq!(repair_caliber("14"), "14,5mm");
        assert_eq!(repair_caliber("120mm"), "120mm");
    }

    #[test]
    fn bombs_are_special() {
        assert!(is_special_weapon("HMG"));
        assert!(is_special_weapon("Cluster Bomb"));
        assert!(!is_special_weapon("Main Gun"));
    }
}
