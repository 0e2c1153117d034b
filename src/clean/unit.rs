//! Unit-level columns of the final dataset.

use itertools::Itertools;
use tracing::debug;

use crate::clean::upgrades::UpgradeIndex;
use crate::constants::{COMMAND_MARKER, DEPRECATED_MARKERS, OPTICS_MARKERS, UnitCodes, scale_speed};
use crate::export::RawUnit;
use crate::game_types::Deck;
use crate::table::{Cell, Row};

/// Exporter attributes that never make it into the dataset.
const DROPPED_ATTRIBUTES: [&str; 35] = [
    "ID",
    "_ShortDatabaseName",
    "ClassNameForDebug",
    "StickToGround",
    "ManageUnitOrientation",
    "IconeType",
    "PositionInMenu",
    "NameInMenuToken",
    "AliasName",
    "Category",
    "AcknowUnitType",
    "TypeForAcknow",
    "CoutEtoile",
    "Key",
    "TypeUnitValue",
    "UnitInfoJaugeType",
    "SpeedBonusOnRoad",
    "VehicleSubType",
    "TerrainsToIgnoreMask",
    "DeploymentDuration",
    "WithdrawalDuration",
    "CanWinExperience",
    "ExperienceGainBySecond",
    "GunMuzzleSpeed",
    "PaliersPhysicalDamages",
    "PaliersSuppressDamages",
    "SuppressDamagesRegenRatioOutOfRange",
    "VitesseCombat",
    "KillExperienceBonus",
    "ShowInMenu",
    "DeathExplosionArme",
    "DeathExplosionRadiusSplashPhysicalDamages",
    "DeathExplosionRadiusSplashSuppressDamages",
    "DeathExplosionSuppressDamages",
    "DeathExplosionID",
];

#[derive(Debug, Clone, Copy)]
enum CodeTable {
    MotherCountry,
    Training,
    Ciws,
    Sailing,
}

impl CodeTable {
    fn lookup<'a>(&self, codes: &'a UnitCodes, code: &str) -> Option<&'a str> {
        match self {
            CodeTable::MotherCountry => codes.mother_country(code),
            CodeTable::Training => codes.training(code),
            CodeTable::Ciws => codes.ciws(code),
            CodeTable::Sailing => codes.sailing(code),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Conversion {
    /// Copied, as a number when it reads as one.
    Copy,
    Float,
    Int,
    /// Divided by 52 into km/h or meters.
    Speed,
    /// `True` when the attribute has any value.
    Presence,
    /// `True` only for the text `True`.
    Flag,
    Code(CodeTable),
}

impl Conversion {
    fn apply(&self, value: Option<&str>, codes: &UnitCodes) -> Cell {
        match self {
            Conversion::Copy => Cell::number_or_text(value),
            Conversion::Float => Cell::float(parse_f64(value)),
            Conversion::Int => Cell::int(parse_f64(value).map(|v| v as i64)),
            Conversion::Speed => Cell::float(parse_f64(value).map(scale_speed)),
            Conversion::Presence => Cell::Bool(value.is_some()),
            Conversion::Flag => Cell::Bool(value == Some("True")),
            Conversion::Code(table) => Cell::text(value.and_then(|v| table.lookup(codes, v))),
        }
    }
}

/// Exporter attribute, output column, and how one becomes the other.
const UNIT_COLUMNS: [(&str, &str, Conversion); 35] = [
    ("MotherCountry", "MotherCountry", Conversion::Code(CodeTable::MotherCountry)),
    ("Training", "Training", Conversion::Code(CodeTable::Training)),
    ("CIWS", "CIWS", Conversion::Code(CodeTable::Ciws)),
    ("Sailing", "Sailing", Conversion::Code(CodeTable::Sailing)),
    ("ProductionYear", "Year", Conversion::Int),
    ("MaxPacks", "MaxPacks", Conversion::Int),
    ("IsPrototype", "IsPrototype", Conversion::Flag),
    ("HitRollECMModifier", "ECM", Conversion::Float),
    ("HitRollSizeModifier", "SizeModifier", Conversion::Float),
    ("UnitStealthBonus", "Stealth", Conversion::Float),
    ("Maxspeed", "MaxSpeed", Conversion::Speed),
    ("TempsDemiTour", "TimeHalfTurn", Conversion::Copy),
    ("AutoOrientation", "AutoOrientation", Conversion::Presence),
    ("IsCommandUnit", "IsCommandUnit", Conversion::Presence),
    ("IsTargetableAsBoat", "IsShip", Conversion::Presence),
    ("Transporter", "IsTransporter", Conversion::Presence),
    ("MaxDamages", "Strength", Conversion::Copy),
    ("MaxSuppressionDamages", "SuppressionCeiling", Conversion::Copy),
    ("StunDamagesRegen", "StunDamageRegen", Conversion::Copy),
    ("StunDamagesToGetStunned", "StunDamageToGetStunned", Conversion::Copy),
    ("LowAltitudeFlyingAltitude", "HelicopterFlyingAltitude", Conversion::Speed),
    ("NearGroundFlyingAltitude", "HelicopterHoverAltitude", Conversion::Speed),
    ("MinimalAltitude", "AirplaneMinimalAltitude", Conversion::Speed),
    ("FlyingAltitude", "AirplaneFlyingAltitude", Conversion::Speed),
    ("DetectionTBA", "HelicopterDetectionRadius", Conversion::Speed),
    ("PorteeVision", "GroundDetectionRadius", Conversion::Speed),
    ("PorteeVisionTBA", "AirToAirHelicopterDetectionRadius", Conversion::Speed),
    ("OpticalStrength", "OpticalStrengthGround", Conversion::Copy),
    ("OpticalStrengthAltitude", "OpticalStrengthAir", Conversion::Copy),
    ("OpticalStrengthAntiradar", "OpticalStrengthAntiradar", Conversion::Int),
    ("FuelMoveDuration", "Autonomy", Conversion::Copy),
    ("MaxAcceleration", "MaxAcceleration", Conversion::Speed),
    ("MaxDeceleration", "MaxDeceleration", Conversion::Speed),
    ("UpwardSpeed", "UpwardSpeed", Conversion::Speed),
    ("FuelCapacity", "FuelCapacity", Conversion::Copy),
];

const ARMOR_COLUMNS: [&str; 4] = ["ArmorFront", "ArmorSides", "ArmorRear", "ArmorTop"];

const DEPLOYABLE_COLUMNS: [&str; 5] = [
    "RookieDeployableAmount",
    "TrainedDeployableAmount",
    "HardenedDeployableAmount",
    "VeteranDeployableAmount",
    "EliteDeployableAmount",
];

/// A localized unit name with its markup removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitName {
    pub name: String,
    /// Recon optics grade encoded by a `#recoN` marker.
    pub optics: Option<&'static str>,
}

impl UnitName {
    pub fn parse(raw: &str) -> Self {
        let optics = OPTICS_MARKERS
            .iter()
            .find(|(marker, _)| raw.contains(marker))
            .map(|(_, grade)| *grade);

        let mut name = raw.replace(COMMAND_MARKER, "");
        for (marker, _) in OPTICS_MARKERS {
            name = name.replace(marker, "");
        }

        Self {
            name: name.trim().to_string(),
            optics,
        }
    }
}

pub fn is_deprecated(name: &str) -> bool {
    DEPRECATED_MARKERS.iter().any(|marker| name.contains(marker))
}

/// Armor value and whether it only resists splash damage. Values 1 through 4
/// are splash-only ratings; above that the real rating is offset by 4.
pub fn armor_rating(raw: i64) -> (i64, bool) {
    match raw {
        1..=4 => (raw, true),
        v if v > 4 => (v - 4, false),
        v => (v, false),
    }
}

/// Builds one unit's row, everything but its weapons.
pub fn unit_row(
    unit: &RawUnit,
    name: Option<&UnitName>,
    codes: &UnitCodes,
    upgrades: &UpgradeIndex,
) -> Row {
    let attributes = &unit.attributes;
    let mut row = Row::new();

    row.set("ID", Cell::Int(unit.id.raw().into()));
    row.set("Name", Cell::text(name.map(|n| n.name.as_str())));
    row.set("Optics", Cell::text(name.and_then(|n| n.optics)));

    let factory = parse_f64(attributes.get("Factory")).map(|v| v as i32);
    row.set("Tab", Cell::text(factory.and_then(|f| codes.tab(f))));

    let moving_type = parse_f64(attributes.get("UnitMovingType")).map(|v| v as i32);
    row.set(
        "MovementType",
        Cell::text(moving_type.and_then(|m| codes.movement_class(m))),
    );
    row.set(
        "Amphibious",
        moving_type
            .and_then(|m| codes.is_amphibious(m))
            .map(Cell::Bool)
            .unwrap_or(Cell::Empty),
    );

    row.set("Decks", decks(unit, codes));
    row.set(
        "Price",
        Cell::number_or_text(unit.production_prices.first().map(String::as_str)),
    );
    for (idx, column) in DEPLOYABLE_COLUMNS.iter().enumerate() {
        let amount = unit.max_deployable.get(idx).map(String::as_str);
        row.set(column, Cell::int(parse_f64(amount).map(|v| v as i64)));
    }

    for (attribute, column, conversion) in UNIT_COLUMNS {
        row.set(column, conversion.apply(attributes.get(attribute), codes));
    }

    for column in ARMOR_COLUMNS {
        let rating = parse_f64(attributes.get(column)).map(|v| armor_rating(v as i64));
        row.set(column, Cell::int(rating.map(|(value, _)| value)));
        row.set(
            format!("{column}SplashResistant"),
            rating.map(|(_, splash)| Cell::Bool(splash)).unwrap_or(Cell::Empty),
        );
    }

    row.set(
        "UpgradeFrom",
        Cell::int(upgrades.upgrade_from(unit.id).map(|u| u.raw().into())),
    );
    row.set(
        "UpgradeTo",
        Cell::int(upgrades.upgrade_to(unit.id).map(|u| u.raw().into())),
    );
    let transporters = upgrades.expand_transporters(unit.id, &unit.transporters);
    row.set(
        "Transporters",
        Cell::List(transporters.iter().map(ToString::to_string).collect()),
    );

    for (attribute, value) in attributes.iter() {
        if is_consumed(attribute) {
            continue;
        }
        row.set(attribute, Cell::text(value));
    }

    row
}

fn decks(unit: &RawUnit, codes: &UnitCodes) -> Cell {
    let cell = deck_cell(unit.unit_type_tokens.iter().map(String::as_str), codes);
    if let Cell::List(decks) = &cell
        && decks.len() < unit.unit_type_tokens.len()
    {
        debug!(unit = %unit.id, tokens = ?unit.unit_type_tokens, "ignoring unknown deck tokens");
    }
    cell
}

/// The decks a unit can be taken in, `|`-joined in a fixed order. Unknown
/// tokens are ignored.
pub fn deck_cell<'a>(tokens: impl IntoIterator<Item = &'a str>, codes: &UnitCodes) -> Cell {
    let decks: Vec<Deck> = tokens.into_iter().filter_map(|t| codes.deck(t.trim())).collect();
    Cell::List(
        Deck::ALL
            .iter()
            .filter(|deck| decks.contains(deck))
            .map(|deck| deck.name().to_string())
            .collect_vec(),
    )
}

fn is_consumed(attribute: &str) -> bool {
    DROPPED_ATTRIBUTES.contains(&attribute)
        || ARMOR_COLUMNS.contains(&attribute)
        || matches!(attribute, "Factory" | "UnitMovingType")
        || UNIT_COLUMNS.iter().any(|(name, _, _)| *name == attribute)
}

fn parse_f64(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}
