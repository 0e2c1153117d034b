//! Upgrade chains built from every unit's `UpgradeRequired` pointer.
//!
//! All chains are built before any unit row is, so that `UpgradeTo` and
//! transporter expansion can look at the whole dataset.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use tracing::{debug, warn};

use crate::error::ErrorKind;
use crate::game_types::UnitId;

#[derive(Debug, Clone, Default)]
pub struct UpgradeIndex {
    required: HashMap<UnitId, Option<UnitId>>,
    /// Maximal chains, root first, sorted by smallest member id.
    chains: Vec<Vec<UnitId>>,
    chain_of: HashMap<UnitId, usize>,
}

impl UpgradeIndex {
    /// Builds the index from `(unit, prerequisite)` pairs.
    ///
    /// A prerequisite that is not itself in `units` ends the chain with a
    /// warning. A cycle is an error naming the unit it was found from.
    pub fn build<I>(units: I) -> Result<Self, ErrorKind>
    where
        I: IntoIterator<Item = (UnitId, Option<UnitId>)>,
    {
        let units: Vec<(UnitId, Option<UnitId>)> = units.into_iter().collect();
        let required: HashMap<UnitId, Option<UnitId>> = units.iter().copied().collect();

        let mut walked = Vec::with_capacity(units.len());
        for (unit, _) in &units {
            walked.push(walk(&required, *unit)?);
        }

        let chains: Vec<Vec<UnitId>> = walked.into_iter().unique().collect();
        let members: Vec<HashSet<UnitId>> = chains
            .iter()
            .map(|chain| chain.iter().copied().collect())
            .collect();

        let mut maximal: Vec<Vec<UnitId>> = chains
            .iter()
            .enumerate()
            .filter(|(idx, _)| {
                !members.iter().enumerate().any(|(other, set)| {
                    other != *idx
                        && set.len() > members[*idx].len()
                        && members[*idx].is_subset(set)
                })
            })
            .map(|(_, chain)| chain.clone())
            .collect();
        maximal.sort_by_key(|chain| (chain.iter().min().copied(), chain.clone()));

        let mut chain_of = HashMap::new();
        for (idx, chain) in maximal.iter().enumerate() {
            for unit in chain {
                chain_of.entry(*unit).or_insert(idx);
            }
        }
        debug!(chains = maximal.len(), "built upgrade chains");

        Ok(Self {
            required,
            chains: maximal,
            chain_of,
        })
    }

    /// The first maximal chain containing `unit`.
    pub fn chain(&self, unit: UnitId) -> Option<&[UnitId]> {
        self.chain_of
            .get(&unit)
            .map(|idx| self.chains[*idx].as_slice())
    }

    /// The unit's own prerequisite pointer.
    pub fn upgrade_from(&self, unit: UnitId) -> Option<UnitId> {
        self.required.get(&unit).copied().flatten()
    }

    /// The member of `unit`'s chain that requires `unit`.
    pub fn upgrade_to(&self, unit: UnitId) -> Option<UnitId> {
        self.chain(unit)?
            .iter()
            .copied()
            .find(|member| *member != unit && self.upgrade_from(*member) == Some(unit))
    }

    /// Replaces every transporter by its full chain, keeping the first
    /// occurrence of each unit.
    pub fn expand_transporters(&self, owner: UnitId, transporters: &[UnitId]) -> Vec<UnitId> {
        let mut expanded = Vec::new();
        for transporter in transporters {
            match self.chain(*transporter) {
                Some(chain) => expanded.extend_from_slice(chain),
                None => {
                    warn!(unit = %owner, %transporter, "transporter is not a known unit, keeping it as is");
                    expanded.push(*transporter);
                }
            }
        }
        expanded.into_iter().unique().collect()
    }
}

/// Follows prerequisites from `start`, returning the chain root first.
fn walk(required: &HashMap<UnitId, Option<UnitId>>, start: UnitId) -> Result<Vec<UnitId>, ErrorKind> {
    let mut path = vec![start];
    let mut visited = HashSet::from([start]);
    let mut next = required.get(&start).copied().flatten();

    while let Some(unit) = next {
        let Some(prerequisite) = required.get(&unit) else {
            warn!(from = %start, missing = %unit, "upgrade prerequisite is not a known unit");
            break;
        };
        if !visited.insert(unit) {
            path.push(unit);
            return Err(ErrorKind::UpgradeCycle { unit: start, path });
        }
        path.push(unit);
        next = *prerequisite;
    }

    path.reverse();
    Ok(path)
}
