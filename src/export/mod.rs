//! The export stage: walks every unit descriptor in a [`DocumentGraph`] and
//! flattens what it references into a [`RawUnit`].
//!
//! Raw units keep the exporter's attribute names and text. All renaming,
//! unit conversion and code lookups happen in [`crate::clean`].

/// Unit-level attributes and modules
pub mod unit;
/// Weapon manager, turret, mounted weapon and ammunition walking
pub mod weapons;

#[cfg(feature = "json")]
use std::path::Path;

use bon::Builder;
use tracing::info;

use crate::data::{DocumentGraph, Record, Value};
use crate::error::{ErrorKind, IResult};
use crate::game_types::{MovementKind, StockIndex, UnitId};

/// Kind of the unit descriptor table every export starts from.
pub const UNIT_TABLE: &str = "TUniteAuSolDescriptor";

/// Ordered attribute bag. A `None` value is an attribute the exporter wrote
/// as `null`, or one a module was expected to have but did not.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct FieldMap(Vec<(String, Option<String>)>);

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies the leaf attributes of `record`. References keep their text.
    /// Collections and the names in `skip` are left out.
    pub fn from_record(record: &Record, skip: &[&str]) -> Self {
        let mut fields = FieldMap::new();
        for field in record.fields() {
            if skip.contains(&field.name.as_str()) {
                continue;
            }
            match &field.value {
                Value::Null => fields.insert(&field.name, None),
                Value::Scalar(text) => fields.insert(&field.name, Some(text.clone())),
                Value::Reference(r) => fields.insert(&field.name, Some(r.to_string())),
                Value::Collection(_) => {}
            }
        }
        fields
    }

    /// Sets `name`, keeping its original position if it already exists.
    pub fn insert(&mut self, name: impl AsRef<str>, value: Option<String>) {
        let name = name.as_ref();
        match self.0.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((name.to_string(), value)),
        }
    }

    /// Inserts every entry of `other`, later values winning.
    pub fn merge(&mut self, other: FieldMap) {
        for (name, value) in other.0 {
            self.insert(name, value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(n, _)| n == name)
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let idx = self.0.iter().position(|(n, _)| n == name)?;
        self.0.remove(idx).1
    }

    pub fn f64(&self, name: &str) -> Option<f64> {
        self.get(name)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_deref()))
    }
}

impl<K: Into<String>> FromIterator<(K, Option<String>)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (K, Option<String>)>>(iter: I) -> Self {
        let mut fields = FieldMap::new();
        for (name, value) in iter {
            let name: String = name.into();
            fields.insert(name, value);
        }
        fields
    }
}

/// One mounted weapon slot, with its turret's and ammunition's attributes
/// folded in. Several fragments can describe one logical weapon.
#[derive(Debug, Clone, PartialEq, Builder)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeaponFragment {
    /// 1-based slot number across all of the unit's turrets.
    pub position: usize,
    #[builder(default)]
    pub stock_index: StockIndex,
    /// The ammunition's `Arme` class code.
    pub class_code: Option<i64>,
    pub physical_damage: Option<f64>,
    /// Hash of the ammunition's weapon type (`TypeArme`).
    #[builder(into)]
    pub weapon_type: Option<String>,
    #[builder(default)]
    pub fields: FieldMap,
}

/// Everything the clean stage needs to know about one unit descriptor.
#[derive(Debug, Clone, PartialEq, Builder)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawUnit {
    pub id: UnitId,
    /// Record id of the descriptor in its table.
    pub descriptor_id: u32,
    pub movement: Option<MovementKind>,
    /// Unit and module attributes by their exporter names.
    #[builder(default)]
    pub attributes: FieldMap,
    #[builder(default)]
    pub unit_type_tokens: Vec<String>,
    #[builder(default)]
    pub production_prices: Vec<String>,
    /// Deployable amounts per veterancy level, rookie first.
    #[builder(default)]
    pub max_deployable: Vec<String>,
    /// Salvo counts per stock index.
    #[builder(default)]
    pub salvos: Vec<u32>,
    #[builder(default)]
    pub weapons: Vec<WeaponFragment>,
    pub upgrade_required: Option<UnitId>,
    #[builder(default)]
    pub transporters: Vec<UnitId>,
}

/// Exports every unit descriptor, in table order.
pub fn export_units(graph: &DocumentGraph) -> IResult<Vec<RawUnit>> {
    let table = graph.table(UNIT_TABLE).ok_or_else(|| ErrorKind::MissingTable {
        kind: UNIT_TABLE.to_string(),
    })?;

    let units: Vec<RawUnit> = table
        .records()
        .iter()
        .map(|record| unit::export_unit(graph, record))
        .collect();
    info!(units = units.len(), "exported units");

    Ok(units)
}

#[cfg(feature = "json")]
pub fn write_raw_units(path: &Path, units: &[RawUnit]) -> IResult<()> {
    crate::game_data::write_atomically(path, |writer| {
        serde_json::to_writer_pretty(writer, units)?;
        Ok(())
    })
}

#[cfg(feature = "json")]
pub fn read_raw_units(path: &Path) -> IResult<Vec<RawUnit>> {
    let data = std::fs::read(path).map_err(|err| ErrorKind::io(path, err))?;
    Ok(serde_json::from_slice(&data)?)
}
