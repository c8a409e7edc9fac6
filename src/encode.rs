//! Client and server encodings of a resolved registry.
//!
//! Both walk the registry in the order IDs were assigned in, so the index
//! of a record in its client array is the definition's ID.

use serde::{Deserialize, Serialize};

use crate::definition::{Definition, DefinitionKind, Light, Recipe, StructureVisual};
use crate::registry::Registry;
use crate::resolve::ResolvedIds;
use crate::resource::{DepthMap, RasterHandle};
use crate::shape::{BlockShape, CellTag, Side};

// --- Client ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientBlock {
    pub shape: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub north: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub south: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub east: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub west: Option<u32>,
}

impl ClientBlock {
    fn side_mut(&mut self, side: Side) -> &mut Option<u32> {
        match side {
            Side::Top => &mut self.top,
            Side::Bottom => &mut self.bottom,
            Side::North => &mut self.north,
            Side::South => &mut self.south,
            Side::East => &mut self.east,
            Side::West => &mut self.west,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientAnim {
    pub frames: Vec<RasterHandle>,
    pub framerate: u8,
    pub oneshot: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientStructure {
    pub size: [u32; 3],
    pub shape: Vec<u8>,
    pub layer: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<RasterHandle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anim: Option<ClientAnim>,
    pub model: DepthMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light: Option<Light>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientItem {
    pub ui_name: String,
    pub image: RasterHandle,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientDocument {
    pub structures: Vec<ClientStructure>,
    pub items: Vec<ClientItem>,
    pub blocks: Vec<ClientBlock>,
}

pub fn encode_client(registry: &Registry, ids: &ResolvedIds) -> ClientDocument {
    let mut doc = ClientDocument::default();

    for def in registry.iter() {
        match def {
            Definition::Structure(s) => {
                debug_assert_eq!(ids.id_of(DefinitionKind::Structure, &s.name), Some(doc.structures.len() as u32));
                let (image, anim) = match &s.visual {
                    StructureVisual::Image(img) => (Some(img.clone()), None),
                    StructureVisual::Anim(a) => (
                        None,
                        Some(ClientAnim {
                            frames: a.frames.clone(),
                            framerate: a.framerate,
                            oneshot: a.oneshot,
                        }),
                    ),
                };
                doc.structures.push(ClientStructure {
                    size: s.shape.size,
                    shape: s.shape.codes(),
                    layer: s.layer,
                    image,
                    anim,
                    model: s.model.clone(),
                    light: s.light,
                });
            }
            Definition::Item(i) => {
                debug_assert_eq!(ids.id_of(DefinitionKind::Item, &i.name), Some(doc.items.len() as u32));
                doc.items.push(ClientItem {
                    ui_name: i.ui_name.clone(),
                    image: i.image.clone(),
                });
            }
            Definition::Block(b) => {
                debug_assert_eq!(ids.id_of(DefinitionKind::Block, &b.name), Some(doc.blocks.len() as u32));
                let mut record = ClientBlock {
                    shape: b.shape.code(),
                    ..Default::default()
                };
                if let Some(sides) = ids.side_ids(&b.name) {
                    for (side, tile_id) in sides {
                        *record.side_mut(*side) = Some(*tile_id);
                    }
                }
                doc.blocks.push(record);
            }
        }
    }

    doc
}

// --- Server ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerStructure {
    pub name: String,
    pub size: [u32; 3],
    pub shape: Vec<CellTag>,
    pub layer: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerItem {
    pub name: String,
    pub ui_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe: Option<Recipe>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerBlock {
    pub name: String,
    pub shape: BlockShape,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerDocument {
    pub structures: Vec<ServerStructure>,
    pub items: Vec<ServerItem>,
    pub blocks: Vec<ServerBlock>,
}

pub fn encode_server(registry: &Registry) -> ServerDocument {
    let mut doc = ServerDocument::default();

    for def in registry.iter() {
        match def {
            Definition::Structure(s) => doc.structures.push(ServerStructure {
                name: s.name.clone(),
                size: s.shape.size,
                shape: s.shape.cells.clone(),
                layer: s.layer,
            }),
            Definition::Item(i) => doc.items.push(ServerItem {
                name: i.name.clone(),
                ui_name: i.ui_name.clone(),
                recipe: i.recipe.clone(),
            }),
            Definition::Block(b) => doc.blocks.push(ServerBlock {
                name: b.name.clone(),
                shape: b.shape,
            }),
        }
    }

    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::BlockDef;
    use crate::diagnostics::Diagnostics;
    use crate::resolve::resolve;
    use crate::resource::TileTable;
    use serde_json::json;

    #[test]
    fn test_block_records() {
        let mut tiles = TileTable::new();
        tiles.insert("grass", RasterHandle::new("t"));
        tiles.insert("dirt", RasterHandle::new("t"));

        let mut r = Registry::new();
        r.insert(Definition::Block(BlockDef {
            name: "grass".into(),
            shape: BlockShape::Floor,
            tiles: [
                (Side::Top, "grass".to_string()),
                (Side::Bottom, "dirt".to_string()),
                (Side::West, "moss".to_string()),
            ]
            .into_iter()
            .collect(),
        }))
        .unwrap();

        let mut diags = Diagnostics::new();
        let ids = resolve(&r, &tiles, &mut diags);

        let client = serde_json::to_value(encode_client(&r, &ids)).unwrap();
        assert_eq!(client["blocks"][0], json!({"shape": 1, "top": 0, "bottom": 1}));

        let server = serde_json::to_value(encode_server(&r)).unwrap();
        assert_eq!(server["blocks"][0], json!({"name": "grass", "shape": "floor"}));
    }
}
