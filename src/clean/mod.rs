//! The clean stage: turns exported [`RawUnit`]s into the final one row per
//! unit table.
//!
//! Names are localized first so withdrawn units can be dropped before the
//! upgrade chains are built. Chains for every remaining unit are built
//! before any row is, since a row needs to see its whole chain.

/// Weapon slot folding
pub mod reconcile;
/// Unit-level columns
pub mod unit;
/// Upgrade chains and transporter expansion
pub mod upgrades;
/// Per-weapon columns and tags
pub mod weapon_tags;

use tracing::{debug, info};

use crate::constants::UnitCodes;
use crate::data::StringLookup;
use crate::error::IResult;
use crate::export::RawUnit;
use crate::localization::localize;
use crate::table::{Cell, Table};

use self::reconcile::reconcile;
use self::unit::{UnitName, is_deprecated, unit_row};
use self::upgrades::UpgradeIndex;
use self::weapon_tags::{WeaponContext, WeaponLabels, weapon_columns};

const NAME_TOKEN: &str = "NameInMenuToken";

pub fn clean_units<L: StringLookup + ?Sized>(
    units: &[RawUnit],
    strings: &L,
    codes: &UnitCodes,
) -> IResult<Table> {
    let mut kept: Vec<(&RawUnit, Option<UnitName>)> = Vec::with_capacity(units.len());
    for unit in units {
        let name = localize(strings, unit.attributes.get(NAME_TOKEN));
        if let Some(name) = name
            && is_deprecated(name)
        {
            debug!(unit = %unit.id, name, "dropping deprecated unit");
            continue;
        }
        kept.push((unit, name.map(UnitName::parse)));
    }

    let upgrades =
        UpgradeIndex::build(kept.iter().map(|(unit, _)| (unit.id, unit.upgrade_required)))?;

    let mut table = Table::new();
    for (unit, name) in &kept {
        let mut row = unit_row(unit, name.as_ref(), codes, &upgrades);
        let tab = row.get("Tab").and_then(Cell::as_str).map(str::to_string);
        let context = WeaponContext {
            unit: unit.id,
            tab: tab.as_deref(),
            salvos: &unit.salvos,
        };

        for weapon in reconcile(unit.id, &unit.weapons) {
            let labels = WeaponLabels::localize(&weapon.fragment, strings);
            if labels.name.is_none() {
                debug!(unit = %unit.id, weapon = weapon.number, "dropping weapon without a localized name");
                continue;
            }
            row.extend(weapon_columns(&weapon, &labels, context));
        }
        table.push(row);
    }

    info!(
        units = table.rows().len(),
        dropped = units.len() - kept.len(),
        "cleaned units"
    );
    Ok(table)
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use super::*;
    use crate::constants::DEFAULT_UNIT_CODES;
    use crate::error::ErrorKind;
    use crate::export::{FieldMap, WeaponFragment};
    use crate::game_types::{StockIndex, UnitId};

    fn strings() -> HashMap<String, String> {
        [
            ("N1", "#reco1 M3A2 Bradley"),
            ("N2", "BMP-1 DEPREC"),
            ("W1", "M242 Bushmaster"),
            ("T1", "Autocannon"),
            ("C1", "25mm"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    fn unit(id: u32, name: &str, upgrade: Option<u32>) -> RawUnit {
        let attributes: FieldMap = [
            ("NameInMenuToken", Some(name.to_string())),
            ("Factory", Some("8".to_string())),
        ]
        .into_iter()
        .collect();
        RawUnit::builder()
            .id(UnitId::from(id))
            .descriptor_id(id)
            .attributes(attributes)
            .maybe_upgrade_required(upgrade.map(UnitId::from))
            .build()
    }

    fn autocannon(position: usize, class_code: i64, physical: f64) -> WeaponFragment {
        WeaponFragment::builder()
            .position(position)
            .stock_index(StockIndex::from(0))
            .class_code(class_code)
            .physical_damage(physical)
            .weapon_type("T1")
            .fields(
                [
                    ("Name", Some("W1".to_string())),
                    ("Caliber", Some("C1".to_string())),
                ]
                .into_iter()
                .collect(),
            )
            .build()
    }

    #[test]
    fn cleans_units_and_weapons() {
        let mut bradley = unit(10, "N1", None);
        bradley.salvos = vec![30];
        bradley.weapons = vec![autocannon(1, 12, 1.0), autocannon(2, 40, 2.0)];
        let units = vec![bradley, unit(11, "N2", None), unit(12, "UNKNOWN", Some(10))];

        let table = clean_units(&units, &strings(), &DEFAULT_UNIT_CODES).unwrap();
        assert_eq!(table.rows().len(), 2);

        let row = &table.rows()[0];
        assert_eq!(row.get("Name"), Some(&Cell::Text("M3A2 Bradley".into())));
        assert_eq!(row.get("Optics"), Some(&Cell::Text("Good".into())));
        assert_eq!(row.get("Tab"), Some(&Cell::Text("VHC".into())));
        assert_eq!(row.get("UpgradeTo"), Some(&Cell::Int(12)));
        assert_eq!(row.get("Weapon1Name"), Some(&Cell::Text("M242 Bushmaster".into())));
        assert_eq!(row.get("Weapon1AP"), Some(&Cell::Float(6.0)));
        assert_eq!(row.get("Weapon1HE"), Some(&Cell::Float(2.0)));
        assert_eq!(row.get("Weapon1NumberOfSalvos"), Some(&Cell::Int(30)));
        assert!(row.get("Weapon2Name").is_none());

        // A name that fails to localize keeps the unit with an empty name.
        let unnamed = &table.rows()[1];
        assert_eq!(unnamed.get("ID"), Some(&Cell::Int(12)));
        assert_eq!(unnamed.get("Name"), Some(&Cell::Empty));
        assert_eq!(unnamed.get("UpgradeFrom"), Some(&Cell::Int(10)));
    }

    #[test]
    fn weapons_without_a_localized_name_are_dropped() {
        let mut bradley = unit(10, "N1", None);
        bradley.salvos = vec![30, 4];
        let mut unnamed = autocannon(2, 12, 1.0);
        unnamed.stock_index = StockIndex::from(1);
        unnamed.fields.insert("Name", Some("UNKNOWN".to_string()));
        bradley.weapons = vec![autocannon(1, 12, 1.0), unnamed];

        let table = clean_units(&[bradley], &strings(), &DEFAULT_UNIT_CODES).unwrap();
        let row = &table.rows()[0];

        assert_eq!(row.get("Weapon1Name"), Some(&Cell::Text("M242 Bushmaster".into())));
        assert!(row.columns().all(|column| !column.starts_with("Weapon2")));
    }

    #[test]
    fn upgrade_cycles_abort_the_clean() {
        let units = vec![unit(1, "N1", Some(2)), unit(2, "N1", Some(1))];
        let err = clean_units(&units, &strings(), &DEFAULT_UNIT_CODES).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UpgradeCycle { .. }));
    }
}
