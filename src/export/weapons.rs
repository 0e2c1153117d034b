use tracing::warn;

use crate::data::{DocumentGraph, Record};
use crate::export::{FieldMap, WeaponFragment};
use crate::game_types::{StockIndex, UnitId};

/// Walks weapon manager -> turrets -> mounted weapons -> ammunition.
///
/// Returns the manager's salvo counts and one fragment per mounted weapon,
/// numbered from 1 across all turrets. Turret attributes are repeated on
/// every weapon of that turret.
pub fn export_weapon_manager(
    graph: &DocumentGraph,
    unit: UnitId,
    manager: &Record,
) -> (Vec<u32>, Vec<WeaponFragment>) {
    let salvos = manager
        .collection("Salves")
        .iter()
        .map(|value| {
            let count = value
                .as_text()
                .and_then(|t| t.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite() && *v >= 0.0);
            if count.is_none() {
                warn!(%unit, value = ?value, "unreadable salvo count, using 0");
            }
            count.unwrap_or_default() as u32
        })
        .collect();

    let mut fragments = Vec::new();
    for turret in graph.resolve_list(manager, "TurretDescriptorList") {
        let turret = match turret {
            Ok(turret) => turret,
            Err(err) => {
                warn!(%unit, "skipping turret: {err}");
                continue;
            }
        };
        let turret_fields = FieldMap::from_record(turret, &["MountedWeaponDescriptorList"]);

        for mounted in graph.resolve_list(turret, "MountedWeaponDescriptorList") {
            let mounted = match mounted {
                Ok(mounted) => mounted,
                Err(err) => {
                    warn!(%unit, "skipping mounted weapon: {err}");
                    continue;
                }
            };
            let position = fragments.len() + 1;
            fragments.push(weapon_fragment(graph, unit, position, &turret_fields, mounted));
        }
    }

    (salvos, fragments)
}

fn weapon_fragment(
    graph: &DocumentGraph,
    unit: UnitId,
    position: usize,
    turret_fields: &FieldMap,
    mounted: &Record,
) -> WeaponFragment {
    let mut fields = turret_fields.clone();
    fields.merge(FieldMap::from_record(mounted, &["EffectTag", "Ammunition"]));

    match graph.resolve_attribute(mounted, "Ammunition") {
        Some(ammunition) => fields.merge(FieldMap::from_record(ammunition, &[])),
        None => warn!(%unit, position, weapon = %mounted.describe(), "mounted weapon has no ammunition"),
    }

    let stock_index = StockIndex::from_text(fields.remove("SalvoStockIndex").as_deref());
    let class_code = fields
        .remove("Arme")
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .map(|v| v as i64);
    let physical_damage = fields
        .remove("PhysicalDamages")
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite());
    let weapon_type = fields.remove("TypeArme");

    WeaponFragment::builder()
        .position(position)
        .stock_index(stock_index)
        .maybe_class_code(class_code)
        .maybe_physical_damage(physical_damage)
        .maybe_weapon_type(weapon_type)
        .fields(fields)
        .build()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::data::loader::parse_table;

    fn graph() -> DocumentGraph {
        let managers = r#"<Root>
  <TWeaponManagerModuleDescriptor id="1">
    <Salves>
      <CollectionElement>12</CollectionElement>
      <CollectionElement>3</CollectionElement>
    </Salves>
    <TurretDescriptorList>
      <CollectionElement>Turret: 10 TTurretTwoAxisDescriptor</CollectionElement>
      <CollectionElement>Turret: 11 TTurretUnitDescriptor</CollectionElement>
      <CollectionElement>Turret: 77 TTurretUnitDescriptor</CollectionElement>
    </TurretDescriptorList>
  </TWeaponManagerModuleDescriptor>
</Root>"#;
        let two_axis = r#"<Root>
  <TTurretTwoAxisDescriptor id="10">
    <VitesseRotation>40</VitesseRotation>
    <MountedWeaponDescriptorList>
      <CollectionElement>Gun: 20 TMountedWeaponDescriptor</CollectionElement>
      <CollectionElement>Gun: 21 TMountedWeaponDescriptor</CollectionElement>
    </MountedWeaponDescriptorList>
  </TTurretTwoAxisDescriptor>
</Root>"#;
        let unit_turrets = r#"<Root>
  <TTurretUnitDescriptor id="11">
    <VitesseRotation>0</VitesseRotation>
    <MountedWeaponDescriptorList>
      <CollectionElement>Gun: 22 TMountedWeaponDescriptor</CollectionElement>
      <CollectionElement>Gun: 404 TMountedWeaponDescriptor</CollectionElement>
    </MountedWeaponDescriptorList>
  </TTurretUnitDescriptor>
</Root>"#;
        let mounted = r#"<Root>
  <TMountedWeaponDescriptor id="20">
    <SalvoStockIndex>0</SalvoStockIndex>
    <EffectTag>FireEffect_TankCanon</EffectTag>
    <Ammunition>Ammo: 30 TAmmunition</Ammunition>
  </TMountedWeaponDescriptor>
  <TMountedWeaponDescriptor id="21">
    <SalvoStockIndex>0</SalvoStockIndex>
    <Ammunition>Ammo: 31 TAmmunition</Ammunition>
  </TMountedWeaponDescriptor>
  <TMountedWeaponDescriptor id="22">
    <SalvoStockIndex>null</SalvoStockIndex>
    <Ammunition>null</Ammunition>
  </TMountedWeaponDescriptor>
</Root>"#;
        let ammunition = r#"<Root>
  <TAmmunition id="30">
    <Arme>24</Arme>
    <PhysicalDamages>null</PhysicalDamages>
    <TypeArme>0A1B2C3D4E000000</TypeArme>
    <PorteeMaximale>2275</PorteeMaximale>
    <VitesseRotation>99</VitesseRotation>
  </TAmmunition>
  <TAmmunition id="31">
    <Arme>3</Arme>
    <PhysicalDamages>2</PhysicalDamages>
  </TAmmunition>
</Root>"#;

        [
            parse_table("TWeaponManagerModuleDescriptor", managers).unwrap(),
            parse_table("TTurretTwoAxisDescriptor", two_axis).unwrap(),
            parse_table("TTurretUnitDescriptor", unit_turrets).unwrap(),
            parse_table("TMountedWeaponDescriptor", mounted).unwrap(),
            parse_table("TAmmunition", ammunition).unwrap(),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn fragments_are_numbered_across_turrets() {
        let graph = graph();
        let manager = graph.record("TWeaponManagerModuleDescriptor", 1).unwrap();
        let (salvos, fragments) = export_weapon_manager(&graph, UnitId::from(1), manager);

        assert_eq!(salvos, [12, 3]);
        // The dangling turret and the dangling mounted weapon are skipped.
        let positions: Vec<_> = fragments.iter().map(|f| f.position).collect();
        assert_eq!(positions, [1, 2, 3]);

        let gun = &fragments[0];
        assert_eq!(gun.class_code, Some(24));
        assert_eq!(gun.physical_damage, None);
        assert_eq!(gun.weapon_type.as_deref(), Some("0A1B2C3D4E000000"));
        assert_eq!(gun.fields.get("PorteeMaximale"), Some("2275"));
        assert!(!gun.fields.contains("EffectTag"));
        assert!(!gun.fields.contains("Arme"));
        // Ammunition attributes win over turret attributes of the same name.
        assert_eq!(gun.fields.get("VitesseRotation"), Some("99"));

        assert_eq!(fragments[1].class_code, Some(3));
        assert_eq!(fragments[1].physical_damage, Some(2.0));
        assert_eq!(fragments[1].fields.get("VitesseRotation"), Some("40"));

        let no_ammo = &fragments[2];
        assert_eq!(no_ammo.stock_index, StockIndex::from(0));
        assert_eq!(no_ammo.class_code, None);
        assert_eq!(no_ammo.fields.get("VitesseRotation"), Some("0"));
    }
}
