//! Finalized asset definitions.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::resource::{DepthMap, RasterHandle};
use crate::shape::{BlockShape, Shape, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefinitionKind {
    Structure,
    Item,
    Block,
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DefinitionKind::Structure => "structure",
            DefinitionKind::Item => "item",
            DefinitionKind::Block => "block",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Animation {
    pub frames: Vec<RasterHandle>,
    pub framerate: u8,
    pub oneshot: bool,
}

/// A structure is drawn from one static image or from an animation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureVisual {
    Image(RasterHandle),
    Anim(Animation),
}

impl StructureVisual {
    /// The image an item icon is cut from.
    pub fn first_image(&self) -> Option<&RasterHandle> {
        match self {
            StructureVisual::Image(img) => Some(img),
            StructureVisual::Anim(anim) => anim.frames.first(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Light {
    pub offset: [u16; 3],
    pub color: [u8; 3],
    pub radius: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureDef {
    pub name: String,
    pub visual: StructureVisual,
    pub model: DepthMap,
    pub shape: Shape,
    pub layer: u8,
    pub light: Option<Light>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub station: String,
    pub inputs: IndexMap<String, u16>,
}

impl Recipe {
    pub fn new<I, S>(station: &str, costs: I) -> Self
    where
        I: IntoIterator<Item = (S, u16)>,
        S: Into<String>,
    {
        Self {
            station: station.to_string(),
            inputs: costs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDef {
    pub name: String,
    pub ui_name: String,
    pub image: RasterHandle,
    pub recipe: Option<Recipe>,
}

impl ItemDef {
    /// Attach crafting metadata. The only mutation a finalized
    /// definition accepts.
    pub fn recipe<I, S>(&mut self, station: &str, costs: I) -> &mut Self
    where
        I: IntoIterator<Item = (S, u16)>,
        S: Into<String>,
    {
        self.recipe = Some(Recipe::new(station, costs));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDef {
    pub name: String,
    pub shape: BlockShape,
    /// Tile name per side, only for sides that were set.
    pub tiles: BTreeMap<Side, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Definition {
    Structure(StructureDef),
    Item(ItemDef),
    Block(BlockDef),
}

impl Definition {
    pub fn name(&self) -> &str {
        match self {
            Definition::Structure(d) => &d.name,
            Definition::Item(d) => &d.name,
            Definition::Block(d) => &d.name,
        }
    }

    pub fn kind(&self) -> DefinitionKind {
        match self {
            Definition::Structure(_) => DefinitionKind::Structure,
            Definition::Item(_) => DefinitionKind::Item,
            Definition::Block(_) => DefinitionKind::Block,
        }
    }

    pub fn as_structure(&self) -> Option<&StructureDef> {
        match self {
            Definition::Structure(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_item(&self) -> Option<&ItemDef> {
        match self {
            Definition::Item(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<&BlockDef> {
        match self {
            Definition::Block(d) => Some(d),
            _ => None,
        }
    }
}
