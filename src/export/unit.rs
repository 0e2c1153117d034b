use tracing::{debug, warn};

use crate::data::{DocumentGraph, Record, Value};
use crate::export::{FieldMap, RawUnit, weapons};
use crate::game_types::{ModuleKind, MovementKind, UnitId};
use crate::recognized::Recognized;

/// Unit attributes that are collections or pointers and get dedicated
/// handling instead of a plain copy.
const STRUCTURED_ATTRIBUTES: [&str; 7] = [
    "Modules",
    "UnitTypeTokens",
    "ProductionPrice",
    "MaxDeployableAmount",
    "ShowInMenu",
    "UpgradeRequired",
    "Transporters",
];

const FUEL_ATTRIBUTES: [&str; 2] = ["FuelCapacity", "FuelMoveDuration"];
const MOVEMENT_ATTRIBUTES: [&str; 2] = ["Maxspeed", "UnitMovingType"];
const LAND_ATTRIBUTES: [&str; 3] = ["SpeedBonusOnRoad", "VehicleSubType", "TerrainsToIgnoreMask"];
const HELICOPTER_ATTRIBUTES: [&str; 14] = [
    "CyclicManoeuvrability",
    "GFactorLimit",
    "LateralSpeed",
    "Mass",
    "MaxInclination",
    "RotorArea",
    "TorqueManoeuvrability",
    "UpwardSpeed",
    "TempsDemiTour",
    "MaxAcceleration",
    "MaxDeceleration",
    "WeaponSabordAngle",
    "LowAltitudeFlyingAltitude",
    "NearGroundFlyingAltitude",
];
const AIRPLANE_ATTRIBUTES: [&str; 3] = ["FlyingAltitude", "MinimalAltitude", "GunMuzzleSpeed"];
const DAMAGE_ATTRIBUTES: [&str; 5] = [
    "MaxDamages",
    "MaxHPForHUD",
    "AutoOrientation",
    "Transporter",
    "IsTargetableAsBoat",
];
const COMMON_DAMAGE_ATTRIBUTES: [&str; 6] = [
    "MaxSuppressionDamages",
    "StunDamagesRegen",
    "StunDamagesToGetStunned",
    "SuppressDamagesRegenRatioOutOfRange",
    "PaliersPhysicalDamages",
    "PaliersSuppressDamages",
];
/// Armor facing pointer on `TBlindageProperties` and the column it fills.
const ARMOR_FACINGS: [(&str, &str); 4] = [
    ("ArmorDescriptorFront", "ArmorFront"),
    ("ArmorDescriptorSides", "ArmorSides"),
    ("ArmorDescriptorRear", "ArmorRear"),
    ("ArmorDescriptorTop", "ArmorTop"),
];
const VISIBILITY_ATTRIBUTES: [&str; 1] = ["UnitStealthBonus"];
const EXPERIENCE_ATTRIBUTES: [&str; 3] = [
    "ExperienceGainBySecond",
    "KillExperienceBonus",
    "CanWinExperience",
];
const SCANNER_ATTRIBUTES: [&str; 6] = [
    "PorteeVision",
    "PorteeVisionTBA",
    "DetectionTBA",
    "OpticalStrength",
    "OpticalStrengthAltitude",
    "OpticalStrengthAntiradar",
];
const SUPPLY_ATTRIBUTES: [&str; 1] = ["SupplyCapacity"];

pub fn movement_attributes(kind: MovementKind) -> &'static [&'static str] {
    match kind {
        MovementKind::Land => &LAND_ATTRIBUTES,
        MovementKind::Helicopter => &HELICOPTER_ATTRIBUTES,
        MovementKind::Airplane => &AIRPLANE_ATTRIBUTES,
    }
}

/// The unit's stable id: its `ID` attribute, or the record id if it has none.
pub fn unit_id_of(record: &Record) -> UnitId {
    record
        .text("ID")
        .and_then(|id| id.trim().parse::<u32>().ok())
        .unwrap_or(record.id())
        .into()
}

pub fn export_unit(graph: &DocumentGraph, record: &Record) -> RawUnit {
    let id = unit_id_of(record);
    let mut attributes = FieldMap::from_record(record, &STRUCTURED_ATTRIBUTES);

    let module = |kind: ModuleKind| {
        let found = graph.resolve_module(record, kind);
        if found.is_none() && kind.is_expected() {
            warn!(unit = %id, module = %kind, "unit has no module, its columns stay empty");
        }
        found
    };

    copy_attributes(&mut attributes, module(ModuleKind::Fuel), &FUEL_ATTRIBUTES);

    let movement = module(ModuleKind::Movement);
    let movement_kind = movement.and_then(|m| match MovementKind::from_table_kind(m.kind()) {
        Recognized::Known(kind) => Some(kind),
        Recognized::Unknown(raw) => {
            warn!(unit = %id, kind = %raw, "unrecognized movement handler");
            None
        }
    });
    copy_attributes(&mut attributes, movement, &MOVEMENT_ATTRIBUTES);
    if let Some(kind) = movement_kind {
        copy_attributes(&mut attributes, movement, movement_attributes(kind));
    }

    let damage = module(ModuleKind::Damage);
    copy_attributes(&mut attributes, damage, &DAMAGE_ATTRIBUTES);
    export_damage_descriptor(graph, id, damage, &mut attributes);

    copy_attributes(&mut attributes, module(ModuleKind::Visibility), &VISIBILITY_ATTRIBUTES);
    copy_attributes(&mut attributes, module(ModuleKind::Experience), &EXPERIENCE_ATTRIBUTES);
    copy_attributes(&mut attributes, module(ModuleKind::Scanner), &SCANNER_ATTRIBUTES);
    if let Some(supply) = module(ModuleKind::Supply) {
        copy_attributes(&mut attributes, Some(supply), &SUPPLY_ATTRIBUTES);
    }

    let (salvos, fragments) = match module(ModuleKind::WeaponManager) {
        Some(manager) => weapons::export_weapon_manager(graph, id, manager),
        None => {
            debug!(unit = %id, "no weapon manager");
            (Vec::new(), Vec::new())
        }
    };

    RawUnit::builder()
        .id(id)
        .descriptor_id(record.id())
        .maybe_movement(movement_kind)
        .attributes(attributes)
        .unit_type_tokens(collection_text(record, "UnitTypeTokens"))
        .production_prices(collection_text(record, "ProductionPrice"))
        .max_deployable(collection_text(record, "MaxDeployableAmount"))
        .salvos(salvos)
        .weapons(fragments)
        .maybe_upgrade_required(upgrade_required(graph, id, record))
        .transporters(transporters(graph, id, record))
        .build()
}

/// Copies `names` from a module. Every name gets an entry, so a missing
/// module or attribute shows up as an empty column rather than no column.
fn copy_attributes(attributes: &mut FieldMap, module: Option<&Record>, names: &[&str]) {
    for name in names {
        let value = module.and_then(|m| m.text(name)).map(str::to_string);
        attributes.insert(name, value);
    }
}

/// Follows the damage module to its common damage descriptor and the four
/// armor facings.
fn export_damage_descriptor(
    graph: &DocumentGraph,
    id: UnitId,
    damage: Option<&Record>,
    attributes: &mut FieldMap,
) {
    let common = damage.and_then(|d| graph.resolve_attribute(d, "CommonDamageDescriptor"));
    if damage.is_some() && common.is_none() {
        warn!(unit = %id, "damage module has no common damage descriptor");
    }
    copy_attributes(attributes, common, &COMMON_DAMAGE_ATTRIBUTES);

    let blindage = common.and_then(|c| graph.resolve_attribute(c, "BlindageProperties"));
    for (pointer, column) in ARMOR_FACINGS {
        let armor = blindage
            .and_then(|b| graph.resolve_attribute(b, pointer))
            .and_then(|a| a.text("BaseBlindage"))
            .map(str::to_string);
        attributes.insert(column, armor);
    }
}

fn collection_text(record: &Record, name: &str) -> Vec<String> {
    record
        .collection(name)
        .iter()
        .filter_map(Value::as_text)
        .map(str::to_string)
        .collect()
}

/// A unit id written either as a reference to a unit descriptor or as bare
/// integer text.
fn unit_id_from_value(graph: &DocumentGraph, value: &Value) -> Option<UnitId> {
    match value {
        Value::Reference(r) => graph.resolve(r).map(unit_id_of),
        Value::Scalar(text) => text.trim().parse::<u32>().ok().map(UnitId::from),
        Value::Null | Value::Collection(_) => None,
    }
}

fn upgrade_required(graph: &DocumentGraph, id: UnitId, record: &Record) -> Option<UnitId> {
    let value = record.get("UpgradeRequired")?;
    let upgrade = unit_id_from_value(graph, value);
    if upgrade.is_none() && !value.is_null() {
        warn!(unit = %id, attribute = "UpgradeRequired", value = ?value, "unresolvable upgrade prerequisite");
    }
    upgrade
}

fn transporters(graph: &DocumentGraph, id: UnitId, record: &Record) -> Vec<UnitId> {
    record
        .collection("Transporters")
        .iter()
        .filter_map(|value| {
            let transporter = unit_id_from_value(graph, value);
            if transporter.is_none() {
                warn!(unit = %id, attribute = "Transporters", value = ?value, "skipping unresolvable transporter");
            }
            transporter
        })
        .collect()
}
