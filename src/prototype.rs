//! Prototypes - definitions in progress
//!
//! A prototype is a bag of [`Slot`]s. `instantiate` checks them and
//! freezes the result into a [`Definition`]; it never mutates the
//! prototype, so calling it twice gives equal definitions.

use std::collections::BTreeMap;

use crate::definition::{
    Animation, BlockDef, Definition, DefinitionKind, ItemDef, Light, StructureDef, StructureVisual,
};
use crate::diagnostics::Diagnostics;
use crate::field::{Checker, Slot};
use crate::resource::{DepthMap, RasterHandle};
use crate::shape::{BlockShape, Shape, Side};

pub trait Prototype: Clone + Default {
    const KIND: DefinitionKind;

    fn name(&self) -> Option<&str>;

    fn set_name(&mut self, name: String);

    /// Validate and freeze. Problems go to `diags`; `None` means this
    /// prototype produced no definition.
    fn instantiate(&self, diags: &mut Diagnostics) -> Option<Definition>;

    /// Name used in diagnostics, also for prototypes with no name yet.
    fn label(&self) -> String {
        match self.name() {
            Some(name) => name.to_string(),
            None => format!("<unnamed {}>", Self::KIND),
        }
    }
}

// --- Structures ---

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructurePrototype {
    pub name: Slot<String>,
    pub image: Slot<RasterHandle>,
    pub model: Slot<DepthMap>,
    pub shape: Slot<Shape>,
    pub layer: Slot<u8>,
    pub light_offset: Slot<[u16; 3]>,
    pub light_color: Slot<[u8; 3]>,
    pub light_radius: Slot<u16>,
    pub anim_frames: Slot<Vec<RasterHandle>>,
    pub anim_framerate: Slot<u8>,
    pub anim_oneshot: Slot<bool>,
}

impl StructurePrototype {
    pub fn image(&mut self, image: RasterHandle) -> &mut Self {
        self.image.set(image);
        self
    }

    pub fn model(&mut self, model: DepthMap) -> &mut Self {
        self.model.set(model);
        self
    }

    pub fn shape(&mut self, shape: Shape) -> &mut Self {
        self.shape.set(shape);
        self
    }

    pub fn layer(&mut self, layer: u8) -> &mut Self {
        self.layer.set(layer);
        self
    }

    pub fn light(&mut self, offset: [u16; 3], color: [u8; 3], radius: u16) -> &mut Self {
        self.light_offset.set(offset);
        self.light_color.set(color);
        self.light_radius.set(radius);
        self
    }

    pub fn anim(&mut self, frames: Vec<RasterHandle>, framerate: u8, oneshot: bool) -> &mut Self {
        self.anim_frames.set(frames);
        self.anim_framerate.set(framerate);
        self.anim_oneshot.set(oneshot);
        self
    }

    /// Image an item icon would be cut from, whichever variant is set.
    pub fn preview_image(&self) -> Option<&RasterHandle> {
        self.image
            .get()
            .or_else(|| self.anim_frames.get().and_then(|f| f.first()))
    }
}

impl Prototype for StructurePrototype {
    const KIND: DefinitionKind = DefinitionKind::Structure;

    fn name(&self) -> Option<&str> {
        self.name.get().map(String::as_str)
    }

    fn set_name(&mut self, name: String) {
        self.name.set(name);
    }

    fn instantiate(&self, diags: &mut Diagnostics) -> Option<Definition> {
        let label = self.label();
        let mut check = Checker::new(&label, diags);

        let name = check.require("name", &self.name);

        let variants = [
            ("image", self.image.is_set()),
            ("anim_frames", self.anim_frames.is_set()),
        ];
        let visual = match check.require_one(&variants) {
            Some(0) => self.image.get().cloned().map(StructureVisual::Image),
            Some(_) => {
                let frames = self.anim_frames.get().cloned().unwrap_or_default();
                let framerate =
                    check.require_because("anim_framerate", &self.anim_framerate, "anim_frames");
                let oneshot = check.require_or("anim_oneshot", &self.anim_oneshot, false);
                framerate.map(|framerate| {
                    StructureVisual::Anim(Animation {
                        frames,
                        framerate,
                        oneshot,
                    })
                })
            }
            None => None,
        };

        let model = check.require("model", &self.model);
        let shape = check.require_or("shape", &self.shape, Shape::unit());
        let layer = check.require_or("layer", &self.layer, 0);

        let light = match check.group3(
            ["light_offset", "light_color", "light_radius"],
            (&self.light_offset, &self.light_color, &self.light_radius),
        ) {
            (Some(offset), Some(color), Some(radius)) => Some(Light {
                offset,
                color,
                radius,
            }),
            _ => None,
        };

        if check.failed() {
            return None;
        }

        Some(Definition::Structure(StructureDef {
            name: name?,
            visual: visual?,
            model: model?,
            shape,
            layer,
            light,
        }))
    }
}

// --- Items ---

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPrototype {
    pub name: Slot<String>,
    pub ui_name: Slot<String>,
    pub image: Slot<RasterHandle>,
}

impl ItemPrototype {
    pub fn ui_name(&mut self, ui_name: impl Into<String>) -> &mut Self {
        self.ui_name.set(ui_name.into());
        self
    }

    pub fn image(&mut self, image: RasterHandle) -> &mut Self {
        self.image.set(image);
        self
    }
}

impl Prototype for ItemPrototype {
    const KIND: DefinitionKind = DefinitionKind::Item;

    fn name(&self) -> Option<&str> {
        self.name.get().map(String::as_str)
    }

    fn set_name(&mut self, name: String) {
        self.name.set(name);
    }

    fn instantiate(&self, diags: &mut Diagnostics) -> Option<Definition> {
        let label = self.label();
        let mut check = Checker::new(&label, diags);

        let name = check.require("name", &self.name);
        let ui_name = check.require("ui_name", &self.ui_name);
        let image = check.require("image", &self.image);

        if check.failed() {
            return None;
        }

        Some(Definition::Item(ItemDef {
            name: name?,
            ui_name: ui_name?,
            image: image?,
            recipe: None,
        }))
    }
}

// --- Blocks ---

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockPrototype {
    pub name: Slot<String>,
    pub shape: Slot<BlockShape>,
    pub sides: BTreeMap<Side, Slot<String>>,
}

impl BlockPrototype {
    pub fn shape(&mut self, shape: BlockShape) -> &mut Self {
        self.shape.set(shape);
        self
    }

    pub fn side(&mut self, side: Side, tile: impl Into<String>) -> &mut Self {
        self.sides.entry(side).or_default().set(tile.into());
        self
    }
}

impl Prototype for BlockPrototype {
    const KIND: DefinitionKind = DefinitionKind::Block;

    fn name(&self) -> Option<&str> {
        self.name.get().map(String::as_str)
    }

    fn set_name(&mut self, name: String) {
        self.name.set(name);
    }

    fn instantiate(&self, diags: &mut Diagnostics) -> Option<Definition> {
        let label = self.label();
        let mut check = Checker::new(&label, diags);

        let name = check.require("name", &self.name);
        let shape = check.require_or("shape", &self.shape, BlockShape::Solid);

        if check.failed() {
            return None;
        }

        let tiles = self
            .sides
            .iter()
            .filter_map(|(side, slot)| slot.get().map(|tile| (*side, tile.clone())))
            .collect();

        Some(Definition::Block(BlockDef {
            name: name?,
            shape,
            tiles,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticKind;

    fn complete_structure() -> StructurePrototype {
        let mut p = StructurePrototype::default();
        p.set_name("lamp".to_string());
        p.image(RasterHandle::new("s/lamp.png"))
            .model(DepthMap::Flat { width: 32, height: 64 })
            .layer(1);
        p
    }

    #[test]
    fn test_structure_defaults() {
        let mut diags = Diagnostics::new();
        let mut p = complete_structure();
        p.layer.clear();

        let def = p.instantiate(&mut diags).unwrap();
        let s = def.as_structure().unwrap();
        assert_eq!(s.shape, Shape::unit());
        assert_eq!(s.layer, 0);
        assert_eq!(s.light, None);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_anim_requires_framerate() {
        let mut diags = Diagnostics::new();
        let mut p = complete_structure();
        p.image.clear();
        p.anim_frames.set(vec![RasterHandle::new("a"), RasterHandle::new("b")]);

        assert!(p.instantiate(&mut diags).is_none());
        let d = &diags.entries()[0];
        assert_eq!(d.kind, DiagnosticKind::MissingField);
        assert_eq!(d.fields, vec!["anim_framerate".to_string()]);
        assert_eq!(d.reason.as_deref(), Some("anim_frames"));
    }

    #[test]
    fn test_anim_oneshot_defaults_false() {
        let mut diags = Diagnostics::new();
        let mut p = complete_structure();
        p.image.clear();
        p.anim_frames.set(vec![RasterHandle::new("a")]);
        p.anim_framerate.set(4);

        let def = p.instantiate(&mut diags).unwrap();
        match &def.as_structure().unwrap().visual {
            StructureVisual::Anim(anim) => {
                assert_eq!(anim.framerate, 4);
                assert!(!anim.oneshot);
            }
            other => panic!("expected animation, got {:?}", other),
        }
    }

    #[test]
    fn test_all_problems_reported_in_one_pass() {
        let mut diags = Diagnostics::new();
        let mut p = StructurePrototype::default();
        p.light_radius.set(3);

        assert!(p.instantiate(&mut diags).is_none());
        let kinds: Vec<_> = diags.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DiagnosticKind::MissingField,
                DiagnosticKind::AmbiguousVariant,
                DiagnosticKind::MissingField,
                DiagnosticKind::IncoherentGroup,
            ]
        );
        assert!(diags.iter().all(|d| d.subject == "<unnamed structure>"));
    }

    #[test]
    fn test_block_keeps_only_set_sides() {
        let mut diags = Diagnostics::new();
        let mut p = BlockPrototype::default();
        p.set_name("grass".to_string());
        p.side(Side::Top, "grass").side(Side::Bottom, "dirt");

        let def = p.instantiate(&mut diags).unwrap();
        let b = def.as_block().unwrap();
        assert_eq!(b.shape, BlockShape::Solid);
        assert_eq!(b.tiles.len(), 2);
        assert_eq!(b.tiles[&Side::Bottom], "dirt");
    }

    #[test]
    fn test_item_missing_ui_name() {
        let mut diags = Diagnostics::new();
        let mut p = ItemPrototype::default();
        p.set_name("wood_door".to_string());
        p.image(RasterHandle::new("i"));

        assert!(p.instantiate(&mut diags).is_none());
        assert_eq!(diags.entries()[0].fields, vec!["ui_name".to_string()]);
    }
}
