//! Per-weapon output columns: armor piercing, unit conversions and the
//! short tags players use to describe a weapon.

use std::fmt;

use tracing::warn;

use crate::clean::reconcile::Weapon;
use crate::constants::{
    ANTI_SHIP_MISSILE_TYPE, AREA_WEAPON_TYPES, DISTANCE_COLUMNS, RANGE_COLUMNS, is_special_weapon,
    repair_caliber, scale_range, scale_speed,
};
use crate::data::StringLookup;
use crate::export::{FieldMap, WeaponFragment};
use crate::game_types::{ClassBand, UnitId};
use crate::localization::localize;
use crate::table::Cell;

/// Renamed weapon attributes copied as numbers.
const RENAMED_COLUMNS: [(&str, &str); 6] = [
    ("Puissance", "Noise"),
    ("TempsEntreDeuxTirs", "TimeBetweenShots"),
    ("TempsEntreDeuxSalves", "TimeBetweenSalvos"),
    ("NbrProjectilesSimultanes", "ProjectilesPerShot"),
    ("NbTirParSalves", "ShotsPerSalvo"),
    ("TempsDeVisee", "AimTime"),
];

const MISSILE_COLUMNS: [&str; 2] = ["MissileMaxSpeed", "MissileMaxAcceleration"];

const CARRIED_COLUMNS: [&str; 6] = [
    "AngleDispersion",
    "RayonPinned",
    "FireTriggeringProbability",
    "SupplyCost",
    "MissileTimeBetweenCorrections",
    "CorrectedShotDispersionMultiplier",
];

/// Aim time of weapons that get indirect fire correction.
const CORRECTED_AIM_TIME: f64 = 10.0;

const MAIN_GUN: &str = "Main Gun";
const SQUAD_AUTOMATIC_WEAPON: &str = "SAW";
/// Planes carry radar missiles of their own; the tag is only for ground AA.
const PLANE_TAB: &str = "PLA";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponTag {
    AreaOfEffect,
    Kinetic,
    Heat,
    Radar,
    Sead,
    CloseQuarters,
    Defensive,
    Corrected,
    FireAndForget,
    Napalm,
    Cluster,
    AntiShip,
    Guided,
    Static,
    SemiActive,
    Smoke,
    IndirectFireCorrection,
    Autoloader,
}

impl WeaponTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeaponTag::AreaOfEffect => "AoE",
            WeaponTag::Kinetic => "KE",
            WeaponTag::Heat => "HEAT",
            WeaponTag::Radar => "RAD",
            WeaponTag::Sead => "SEAD",
            WeaponTag::CloseQuarters => "CQC",
            WeaponTag::Defensive => "DEF",
            WeaponTag::Corrected => "CORR",
            WeaponTag::FireAndForget => "F&F",
            WeaponTag::Napalm => "NPLM",
            WeaponTag::Cluster => "CLUS",
            WeaponTag::AntiShip => "SHIP",
            WeaponTag::Guided => "GUID",
            WeaponTag::Static => "STAT",
            WeaponTag::SemiActive => "SA",
            WeaponTag::Smoke => "SMK",
            WeaponTag::IndirectFireCorrection => "IFC",
            WeaponTag::Autoloader => "AL",
        }
    }
}

impl fmt::Display for WeaponTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Localized names of a weapon.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeaponLabels {
    pub name: Option<String>,
    pub weapon_type: Option<String>,
    pub caliber: Option<String>,
}

impl WeaponLabels {
    pub fn localize<L: StringLookup + ?Sized>(fragment: &WeaponFragment, strings: &L) -> Self {
        Self {
            name: localize(strings, fragment.fields.get("Name")).map(str::to_string),
            weapon_type: localize(strings, fragment.weapon_type.as_deref()).map(str::to_string),
            caliber: localize(strings, fragment.fields.get("Caliber"))
                .map(|caliber| repair_caliber(caliber).to_string()),
        }
    }
}

/// Armor piercing value and the damage-kind tags that come with it.
pub fn armor_piercing(
    class_code: Option<i64>,
    weapon_type: Option<&str>,
    physical_damage: Option<f64>,
) -> (Option<f64>, Vec<WeaponTag>) {
    let special = weapon_type.is_some_and(is_special_weapon);
    let anti_ship = weapon_type == Some(ANTI_SHIP_MISSILE_TYPE);

    let Some(code) = class_code else {
        let tags = if anti_ship { vec![WeaponTag::Heat] } else { Vec::new() };
        return (None, tags);
    };

    match ClassBand::of(code) {
        ClassBand::Unrated => (None, Vec::new()),
        ClassBand::Special if code == 3 && !special => (None, vec![WeaponTag::AreaOfEffect]),
        ClassBand::Special => (None, Vec::new()),
        _ if anti_ship => (
            physical_damage.map(|damage| (code - 34) as f64 * damage),
            vec![WeaponTag::Heat],
        ),
        ClassBand::Kinetic => {
            let mut tags = vec![WeaponTag::Kinetic];
            if !special {
                tags.push(WeaponTag::AreaOfEffect);
            }
            (Some((code - 4) as f64), tags)
        }
        ClassBand::Explosive => {
            let mut tags = vec![WeaponTag::Heat];
            if weapon_type.is_some_and(|t| AREA_WEAPON_TYPES.contains(&t)) {
                tags.push(WeaponTag::AreaOfEffect);
            }
            (Some((code - 34) as f64), tags)
        }
        ClassBand::OutOfRange => (None, Vec::new()),
    }
}

/// Everything about the unit a weapon's columns depend on.
#[derive(Debug, Clone, Copy)]
pub struct WeaponContext<'a> {
    pub unit: UnitId,
    pub tab: Option<&'a str>,
    pub salvos: &'a [u32],
}

/// Builds the `Weapon{N}*` columns of one reconciled weapon.
pub fn weapon_columns(
    weapon: &Weapon,
    labels: &WeaponLabels,
    context: WeaponContext<'_>,
) -> Vec<(String, Cell)> {
    let fragment = &weapon.fragment;
    let fields = &fragment.fields;
    let weapon_type = labels.weapon_type.as_deref();
    let prefix = format!("Weapon{}", weapon.number);
    let mut columns = Vec::new();
    let mut push = |name: &str, cell: Cell| columns.push((format!("{prefix}{name}"), cell));

    push("Name", Cell::text(labels.name.clone()));
    push("Type", Cell::text(labels.weapon_type.clone()));
    push("Caliber", Cell::text(labels.caliber.clone()));

    let (ap, mut tags) = armor_piercing(fragment.class_code, weapon_type, fragment.physical_damage);
    push("AP", Cell::float(ap));
    push("HE", Cell::float(fragment.physical_damage));

    for name in MISSILE_COLUMNS {
        if fields.contains(name) {
            push(name, Cell::float(fields.f64(name).map(scale_speed)));
        }
    }
    for (raw, column) in DISTANCE_COLUMNS {
        push(column, Cell::float(fields.f64(raw).map(scale_range)));
    }
    for (raw, column) in RENAMED_COLUMNS {
        push(column, Cell::float(fields.f64(raw)));
    }
    for (raw, column) in RANGE_COLUMNS {
        push(column, Cell::float(fields.f64(raw).map(scale_range)));
    }
    push("PositionOnCard", Cell::int(fields.f64("Level").map(|v| v as i64)));

    let shoots_on_move = fields.get("TirEnMouvement");
    let stabilizer = shoots_on_move.and_then(|_| fields.f64("HitProbabilityWhileMoving"));
    push("Accuracy", Cell::float(fields.f64("HitProbability")));
    push("Stabilizer", Cell::float(stabilizer));
    push("MinimalCritProbability", Cell::float(fields.f64("MinimalCritProbability")));
    push("MinimalAccuracy", Cell::float(fields.f64("MinimalHitProbability")));

    let number_of_salvos = context.salvos.get(fragment.stock_index.as_usize()).copied();
    if number_of_salvos.is_none() {
        warn!(unit = %context.unit, weapon = weapon.number, stock = %fragment.stock_index, "salvo stock index out of range");
    }
    push("NumberOfSalvos", Cell::int(number_of_salvos.map(i64::from)));
    let displayed = fields
        .f64("AffichageMunitionParSalve")
        .zip(number_of_salvos)
        .map(|(per_salvo, salvos)| per_salvo * salvos as f64);
    push("DisplayedAmmunition", Cell::float(displayed));

    for name in CARRIED_COLUMNS {
        push(name, Cell::number_or_text(fields.get(name)));
    }
    push("CanSmoke", Cell::Bool(weapon.can_smoke));

    let conditions = TagConditions {
        fields,
        weapon_type,
        tab: context.tab,
        stabilizer,
        can_smoke: weapon.can_smoke,
        number_of_salvos,
    };
    tags.extend(conditions.tags());
    push(
        "Tags",
        Cell::List(tags.iter().map(|tag| tag.as_str().to_string()).collect()),
    );

    columns
}

struct TagConditions<'a> {
    fields: &'a FieldMap,
    weapon_type: Option<&'a str>,
    tab: Option<&'a str>,
    stabilizer: Option<f64>,
    can_smoke: bool,
    number_of_salvos: Option<u32>,
}

impl TagConditions<'_> {
    fn tags(&self) -> Vec<WeaponTag> {
        let fields = self.fields;
        let present = |name: &str| fields.get(name).is_some();
        let is_bomb = self.weapon_type.is_some_and(|t| t.contains("Bomb"));
        let fire_and_forget = present("IsFireAndForget");
        let missile = present("MissileMaxSpeed");
        let indirect = present("TirIndirect");

        let mut tags = Vec::new();
        match fields.get("Guidance") {
            Some("1") if self.tab != Some(PLANE_TAB) => tags.push(WeaponTag::Radar),
            Some("2") => tags.push(WeaponTag::Sead),
            _ => {}
        }
        if self.weapon_type == Some(SQUAD_AUTOMATIC_WEAPON) {
            tags.push(WeaponTag::CloseQuarters);
        }
        if fields.f64("PorteeMaximaleProjectile").is_some() {
            tags.push(WeaponTag::Defensive);
        }
        if indirect && !is_bomb {
            tags.push(WeaponTag::Corrected);
        }
        if fire_and_forget {
            tags.push(WeaponTag::FireAndForget);
        }
        if present("IgnoreInflammabilityConditions") {
            tags.push(WeaponTag::Napalm);
        }
        if present("IsSubAmmunition") {
            tags.push(WeaponTag::Cluster);
        }
        let range_ground = fields.f64("PorteeMaximale");
        let range_ship = fields.f64("PorteeMaximaleBateaux");
        if range_ground.is_none() && range_ship.is_some_and(|r| r > 0.0) {
            tags.push(WeaponTag::AntiShip);
        }
        if self.stabilizer.is_none() {
            if !fire_and_forget && missile {
                tags.push(WeaponTag::Guided);
            } else {
                tags.push(WeaponTag::Static);
            }
        }
        if fields.get("TirEnMouvement") == Some("True") && !fire_and_forget && missile {
            tags.push(WeaponTag::SemiActive);
        }
        if self.can_smoke {
            tags.push(WeaponTag::Smoke);
        }
        if indirect && fields.f64("TempsDeVisee") == Some(CORRECTED_AIM_TIME) {
            tags.push(WeaponTag::IndirectFireCorrection);
        }
        if self.number_of_salvos == Some(1) && self.weapon_type == Some(MAIN_GUN) {
            tags.push(WeaponTag::Autoloader);
        }
        tags
    }
}
