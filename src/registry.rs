//! Registry - the namespace of finalized definitions, one per kind
//!
//! Insertion order is kept: it is the order IDs are assigned in.

use indexmap::{Equivalent, IndexMap};
use serde::{Deserialize, Serialize};
use std::ops::Index;

use crate::builder::Builder;
use crate::definition::{Definition, DefinitionKind, ItemDef, Recipe, StructureDef};
use crate::diagnostics::Diagnostics;
use crate::error::{CompileError, Result};
use crate::prototype::Prototype;

/// What a merge does with a name both sides define.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MergePolicy {
    /// A name already defined for the same kind is fatal.
    #[default]
    Reject,
    /// A name already defined for the same kind is replaced in place.
    OverwriteSameKind,
}

/// Names are unique per kind. A structure and an item may share a name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Key {
    kind: DefinitionKind,
    name: String,
}

/// Borrowed form of [`Key`]; hashes the same way.
#[derive(Hash)]
struct KeyRef<'a> {
    kind: DefinitionKind,
    name: &'a str,
}

impl Equivalent<Key> for KeyRef<'_> {
    fn equivalent(&self, key: &Key) -> bool {
        self.kind == key.kind && self.name == key.name
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    defs: IndexMap<Key, Definition>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn get(&self, kind: DefinitionKind, name: &str) -> Option<&Definition> {
        self.defs.get(&KeyRef { kind, name })
    }

    pub fn structure(&self, name: &str) -> Option<&StructureDef> {
        self.get(DefinitionKind::Structure, name).and_then(Definition::as_structure)
    }

    pub fn item(&self, name: &str) -> Option<&ItemDef> {
        self.get(DefinitionKind::Item, name).and_then(Definition::as_item)
    }

    /// Definitions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Definition> {
        self.defs.values()
    }

    pub fn insert(&mut self, def: Definition) -> Result<()> {
        self.insert_with(def, MergePolicy::Reject)
    }

    /// An overwrite keeps the existing position.
    pub fn insert_with(&mut self, def: Definition, policy: MergePolicy) -> Result<()> {
        self.check_collision(&def, policy)?;
        let key = Key {
            kind: def.kind(),
            name: def.name().to_string(),
        };
        self.defs.insert(key, def);
        Ok(())
    }

    fn check_collision(&self, incoming: &Definition, policy: MergePolicy) -> Result<()> {
        let kind = incoming.kind();
        if self.get(kind, incoming.name()).is_none() {
            return Ok(());
        }
        if policy == MergePolicy::OverwriteSameKind {
            tracing::debug!(name = incoming.name(), %kind, "overwriting definition");
            return Ok(());
        }
        Err(CompileError::NameCollision {
            name: incoming.name().to_string(),
            kind,
        })
    }

    /// Fold `other` into this namespace. Collisions are checked before
    /// anything is inserted.
    pub fn merge(&mut self, other: Registry, policy: MergePolicy) -> Result<()> {
        for def in other.defs.values() {
            self.check_collision(def, policy)?;
        }
        let incoming = other.defs.len();
        self.defs.extend(other.defs);
        tracing::debug!(incoming, total = self.defs.len(), "registry merged");
        Ok(())
    }

    /// Finalize a builder and fold its definitions in.
    pub fn merge_builder<P: Prototype>(
        &mut self,
        builder: Builder<P>,
        diags: &mut Diagnostics,
    ) -> Result<()> {
        let built = builder.build(diags)?;
        self.merge(built, MergePolicy::Reject)
    }

    /// Item lookup for recipe attachment.
    pub fn item_mut(&mut self, name: &str) -> Option<&mut ItemDef> {
        match self.defs.get_mut(&KeyRef { kind: DefinitionKind::Item, name }) {
            Some(Definition::Item(item)) => Some(item),
            _ => None,
        }
    }

    /// Attach one recipe to every named item. Every name must be an item
    /// here, otherwise nothing is attached.
    pub fn attach_recipe<'n, N, I, S>(&mut self, names: N, station: &str, costs: I) -> Result<usize>
    where
        N: IntoIterator<Item = &'n str>,
        I: IntoIterator<Item = (S, u16)>,
        S: Into<String>,
    {
        let names: Vec<&str> = names.into_iter().collect();
        if let Some(missing) = names.iter().find(|n| self.item(n).is_none()) {
            return Err(CompileError::Config(format!(
                "recipe at `{}` names unknown item `{}`",
                station, missing
            )));
        }

        let recipe = Recipe::new(station, costs);
        for name in &names {
            if let Some(item) = self.item_mut(name) {
                item.recipe = Some(recipe.clone());
            }
        }
        tracing::debug!(station, items = names.len(), "recipe attached");
        Ok(names.len())
    }
}

impl Index<(DefinitionKind, &str)> for Registry {
    type Output = Definition;

    fn index(&self, (kind, name): (DefinitionKind, &str)) -> &Definition {
        match self.get(kind, name) {
            Some(def) => def,
            None => panic!("no {} named `{}`", kind, name),
        }
    }
}
