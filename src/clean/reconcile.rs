//! Folds a unit's weapon slots into logical weapons.
//!
//! Slots that draw from the same salvo stock describe one weapon: a smoke
//! launcher riding along with a gun, a mirrored copy used for accuracy
//! rolls, or the HE and AP halves of one gun.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::debug;

use crate::constants::{SMOKE_CLASS_CODE, SYMMETRIC_WEAPON_TYPES};
use crate::export::WeaponFragment;
use crate::game_types::{StockIndex, UnitId};

/// One logical weapon after reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct Weapon {
    /// Dense 1-based number in slot order.
    pub number: usize,
    pub can_smoke: bool,
    pub fragment: WeaponFragment,
}

pub fn reconcile(unit: UnitId, fragments: &[WeaponFragment]) -> Vec<Weapon> {
    let mut weapons: Vec<Weapon> = Vec::with_capacity(fragments.len());
    let mut by_stock: HashMap<StockIndex, usize> = HashMap::new();

    for fragment in fragments {
        let idx = match by_stock.entry(fragment.stock_index) {
            Entry::Vacant(entry) => {
                entry.insert(weapons.len());
                weapons.push(Weapon {
                    number: 0,
                    can_smoke: false,
                    fragment: fragment.clone(),
                });
                continue;
            }
            Entry::Occupied(entry) => *entry.get(),
        };

        let earlier = &mut weapons[idx];
        if is_smoke_companion(fragment) {
            debug!(%unit, slot = fragment.position, into = earlier.fragment.position, "smoke companion");
            earlier.can_smoke = true;
        } else if is_symmetric_duplicate(&earlier.fragment, fragment) {
            debug!(%unit, slot = fragment.position, "dropping symmetric duplicate");
        } else {
            debug!(%unit, slot = fragment.position, into = earlier.fragment.position, "merging split weapon");
            let target = &mut earlier.fragment;
            target.class_code = nan_max(target.class_code, fragment.class_code, i64::max);
            target.physical_damage =
                nan_max(target.physical_damage, fragment.physical_damage, f64::max);
        }
    }

    for (idx, weapon) in weapons.iter_mut().enumerate() {
        weapon.number = idx + 1;
    }
    weapons
}

/// A smoke slot carries class code 3 (or none) and no damage of its own.
fn is_smoke_companion(fragment: &WeaponFragment) -> bool {
    matches!(fragment.class_code, None | Some(SMOKE_CLASS_CODE)) && fragment.physical_damage.is_none()
}

fn is_symmetric_duplicate(earlier: &WeaponFragment, later: &WeaponFragment) -> bool {
    match (&earlier.weapon_type, &later.weapon_type) {
        (Some(a), Some(b)) => a == b && SYMMETRIC_WEAPON_TYPES.contains(&a.as_str()),
        _ => false,
    }
}

/// Maximum of two optional values, an absent one losing to any number.
fn nan_max<T>(a: Option<T>, b: Option<T>, max: impl FnOnce(T, T) -> T) -> Option<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(max(a, b)),
        (a, b) => a.or(b),
    }
}
