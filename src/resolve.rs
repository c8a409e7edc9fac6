//! ID resolution
//!
//! One pass over a merged registry, in insertion order. Each definition
//! gets a dense ID among definitions of its kind. Each block side naming
//! a known tile gets that tile's ID; an unknown tile is reported and the
//! side stays absent.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::definition::{Definition, DefinitionKind};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::registry::Registry;
use crate::resource::TileTable;
use crate::shape::Side;

/// Name to ID tables for one compilation run, one table per kind. An ID
/// is the position of its name in that kind's table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedIds {
    structures: IndexMap<String, u32>,
    items: IndexMap<String, u32>,
    blocks: IndexMap<String, u32>,
    sides: IndexMap<String, BTreeMap<Side, u32>>,
}

impl ResolvedIds {
    fn table(&self, kind: DefinitionKind) -> &IndexMap<String, u32> {
        match kind {
            DefinitionKind::Structure => &self.structures,
            DefinitionKind::Item => &self.items,
            DefinitionKind::Block => &self.blocks,
        }
    }

    /// Hands out the next dense ID of `kind`.
    fn assign(&mut self, kind: DefinitionKind, name: &str) -> u32 {
        let table = match kind {
            DefinitionKind::Structure => &mut self.structures,
            DefinitionKind::Item => &mut self.items,
            DefinitionKind::Block => &mut self.blocks,
        };
        let id = table.len() as u32;
        table.insert(name.to_string(), id);
        id
    }

    pub fn id_of(&self, kind: DefinitionKind, name: &str) -> Option<u32> {
        self.table(kind).get(name).copied()
    }

    /// Resolved tile IDs of a block, only for sides that resolved.
    pub fn side_ids(&self, block: &str) -> Option<&BTreeMap<Side, u32>> {
        self.sides.get(block)
    }

    pub fn count(&self, kind: DefinitionKind) -> usize {
        self.table(kind).len()
    }

    /// Names of one kind in ID order.
    pub fn iter(&self, kind: DefinitionKind) -> impl Iterator<Item = (&str, u32)> {
        self.table(kind).iter().map(|(n, id)| (n.as_str(), *id))
    }
}

pub fn resolve(registry: &Registry, tiles: &TileTable, diags: &mut Diagnostics) -> ResolvedIds {
    let mut resolved = ResolvedIds::default();
    let mut unresolved = 0usize;

    for def in registry.iter() {
        resolved.assign(def.kind(), def.name());

        if let Definition::Block(block) = def {
            let mut side_ids = BTreeMap::new();
            for side in Side::ALL {
                let Some(tile) = block.tiles.get(&side) else {
                    continue;
                };
                match tiles.id_of(tile) {
                    Some(tile_id) => {
                        side_ids.insert(side, tile_id);
                    }
                    None => {
                        unresolved += 1;
                        diags.push(Diagnostic::unresolved_reference(&block.name, side, tile));
                    }
                }
            }
            resolved.sides.insert(block.name.clone(), side_ids);
        }
    }

    tracing::info!(
        structures = resolved.structures.len(),
        items = resolved.items.len(),
        blocks = resolved.blocks.len(),
        unresolved,
        "ids resolved"
    );
    resolved
}
