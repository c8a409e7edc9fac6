//! Builders - fluent accumulators of prototypes
//!
//! A modifier on the builder applies to every prototype it tracks. A
//! family of near-identical parts is written once and only the fields
//! that differ are set per prototype.

use crate::diagnostics::Diagnostics;
use crate::error::{CompileError, Result};
use crate::prototype::{BlockPrototype, ItemPrototype, Prototype, StructurePrototype};
use crate::registry::Registry;
use crate::resource::{DepthMap, RasterHandle};
use crate::shape::{BlockShape, Shape, Side};

#[derive(Debug, Clone, Default)]
pub struct Builder<P: Prototype> {
    protos: Vec<P>,
}

pub type StructureBuilder = Builder<StructurePrototype>;
pub type ItemBuilder = Builder<ItemPrototype>;
pub type BlockBuilder = Builder<BlockPrototype>;

impl<P: Prototype> Builder<P> {
    pub fn new() -> Self {
        Self { protos: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.protos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.protos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &P> {
        self.protos.iter()
    }

    /// Track a new named prototype and hand it back for chaining.
    pub fn create(&mut self, name: impl Into<String>) -> &mut P {
        let mut proto = P::default();
        proto.set_name(name.into());
        self.push(proto)
    }

    pub fn push(&mut self, proto: P) -> &mut P {
        self.protos.push(proto);
        let last = self.protos.len() - 1;
        &mut self.protos[last]
    }

    /// Apply `f` to every tracked prototype.
    pub fn modify(&mut self, mut f: impl FnMut(&mut P)) -> &mut Self {
        for proto in &mut self.protos {
            f(proto);
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&P> {
        self.protos.iter().find(|p| p.name() == Some(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut P> {
        self.protos.iter_mut().find(|p| p.name() == Some(name))
    }

    /// Copy every tracked prototype under a new name. Overrides applied
    /// to the returned builder leave this one untouched.
    pub fn duplicate(&self, mut rename: impl FnMut(&str) -> String) -> Self {
        let protos = self
            .protos
            .iter()
            .map(|p| {
                let mut copy = p.clone();
                if let Some(name) = p.name() {
                    copy.set_name(rename(name));
                }
                copy
            })
            .collect();
        Self { protos }
    }

    /// Take over the prototypes of `other`. A name tracked on both sides
    /// is fatal.
    pub fn merge(&mut self, other: Builder<P>) -> Result<&mut Self> {
        for proto in &other.protos {
            if let Some(name) = proto.name() {
                if self.get(name).is_some() {
                    return Err(CompileError::NameCollision {
                        name: name.to_string(),
                        kind: P::KIND,
                    });
                }
            }
        }
        self.protos.extend(other.protos);
        Ok(self)
    }

    /// Instantiate every prototype into a fresh registry. Invalid
    /// prototypes are reported and left out.
    pub fn build(self, diags: &mut Diagnostics) -> Result<Registry> {
        let mut registry = Registry::new();
        let total = self.protos.len();
        for proto in &self.protos {
            if let Some(def) = proto.instantiate(diags) {
                registry.insert(def)?;
            }
        }
        tracing::debug!(
            kind = %P::KIND,
            built = registry.len(),
            rejected = total - registry.len(),
            "builder finalized"
        );
        Ok(registry)
    }
}

impl StructureBuilder {
    /// One-shot structure with its usual fields, e.g. a door.
    pub fn create_structure(
        &mut self,
        name: impl Into<String>,
        image: RasterHandle,
        model: DepthMap,
        shape: Shape,
        layer: u8,
    ) -> &mut StructurePrototype {
        let proto = self.create(name);
        proto.image(image).model(model).shape(shape).layer(layer);
        proto
    }

    pub fn image(&mut self, image: RasterHandle) -> &mut Self {
        self.modify(|p| {
            p.image(image.clone());
        })
    }

    pub fn model(&mut self, model: DepthMap) -> &mut Self {
        self.modify(|p| {
            p.model(model.clone());
        })
    }

    pub fn shape(&mut self, shape: Shape) -> &mut Self {
        self.modify(|p| {
            p.shape(shape.clone());
        })
    }

    pub fn layer(&mut self, layer: u8) -> &mut Self {
        self.modify(|p| {
            p.layer(layer);
        })
    }

    pub fn light(&mut self, offset: [u16; 3], color: [u8; 3], radius: u16) -> &mut Self {
        self.modify(|p| {
            p.light(offset, color, radius);
        })
    }

    pub fn anim(&mut self, frames: Vec<RasterHandle>, framerate: u8, oneshot: bool) -> &mut Self {
        self.modify(|p| {
            p.anim(frames.clone(), framerate, oneshot);
        })
    }
}

impl ItemBuilder {
    pub fn ui_name(&mut self, ui_name: &str) -> &mut Self {
        self.modify(|p| {
            p.ui_name(ui_name);
        })
    }

    pub fn image(&mut self, image: RasterHandle) -> &mut Self {
        self.modify(|p| {
            p.image(image.clone());
        })
    }
}

impl BlockBuilder {
    pub fn shape(&mut self, shape: BlockShape) -> &mut Self {
        self.modify(|p| {
            p.shape(shape);
        })
    }

    pub fn side(&mut self, side: Side, tile: &str) -> &mut Self {
        self.modify(|p| {
            p.side(side, tile);
        })
    }
}
