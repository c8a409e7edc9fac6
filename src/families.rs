//! Asset family generators.
//!
//! Families are laid out on a grid of `tile_size` pixel cells. A part of
//! footprint `x * y * z` cells covers `x` tiles across and `y + z` tiles
//! down on the sheet.

use crate::builder::{ItemBuilder, StructureBuilder};
use crate::definition::StructureDef;
use crate::error::{CompileError, Result};
use crate::resource::{DepthMap, DepthMapExtractor, RasterHandle};
use crate::shape::{CellTag, Shape};

pub const TILE_SIZE: u32 = 32;

/// Wall parts in sheet order, one tile column each. Doors follow them.
pub const WALL_PARTS: [&str; 12] = [
    "corner/nw",
    "edge/horiz",
    "corner/ne",
    "corner/sw",
    "_/edge/horiz/copy",
    "corner/se",
    "edge/vert",
    "tee/e",
    "tee/w",
    "tee/n",
    "tee/s",
    "cross",
];

pub const WALL_LAYER: u8 = 1;

/// `solid floor solid` over `solid empty solid`.
pub fn door_shape() -> Shape {
    use CellTag::*;
    Shape::new(3, 1, 2, vec![Solid, Floor, Solid, Solid, Empty, Solid])
}

/// A sheet and its optional planemap, cut on the tile grid.
pub struct TileSheet<'a> {
    pub image: RasterHandle,
    pub planemap: Option<RasterHandle>,
    pub tile_size: u32,
    extractor: &'a dyn DepthMapExtractor,
}

impl<'a> TileSheet<'a> {
    pub fn new(
        image: RasterHandle,
        planemap: Option<RasterHandle>,
        extractor: &'a dyn DepthMapExtractor,
    ) -> Self {
        Self {
            image,
            planemap,
            tile_size: TILE_SIZE,
            extractor,
        }
    }

    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// Image and depth map of the `w * h` tile region at grid `base`.
    pub fn cut(&self, base: (u32, u32), w: u32, h: u32) -> Result<(RasterHandle, DepthMap)> {
        let t = self.tile_size;
        let px = |cells: u32| cells.checked_mul(t);
        let region = px(base.0).zip(px(base.1)).zip(px(w).zip(px(h)));
        let Some(((x, y), (pw, ph))) = region else {
            return Err(off_grid(&self.image, base, t));
        };

        let image = self.image.crop(x, y, pw, ph).ok_or_else(|| off_grid(&self.image, base, t))?;
        let depth = match &self.planemap {
            Some(plane) => {
                let cropped = plane.crop(x, y, pw, ph).ok_or_else(|| off_grid(plane, base, t))?;
                self.extractor.extract(&cropped)
            }
            None => DepthMap::Flat { width: pw, height: ph },
        };
        Ok((image, depth))
    }

    /// One solid structure of footprint `size` at grid `base`.
    pub fn solid_structure(&self, name: &str, size: [u32; 3], base: (u32, u32)) -> Result<StructureBuilder> {
        let [x, y, z] = size;
        let rows = y
            .checked_add(z)
            .ok_or_else(|| CompileError::Config(format!("structure `{}` is too tall", name)))?;
        let shape = Shape::solid(x, y, z)
            .ok_or_else(|| CompileError::Config(format!("structure `{}` has too many cells", name)))?;
        let (image, depth) = self.cut(base, x, rows)?;
        let mut b = StructureBuilder::new();
        b.create_structure(name, image, depth, shape, WALL_LAYER);
        Ok(b)
    }
}

fn off_grid(sheet: &RasterHandle, base: (u32, u32), tile_size: u32) -> CompileError {
    CompileError::Config(format!(
        "grid cell {:?} of `{}` at tile size {} is outside pixel range",
        base, sheet.sheet, tile_size
    ))
}

/// The twelve wall parts of `basename`, plus `basename/door` when asked.
pub fn wall_parts(basename: &str, sheet: &TileSheet<'_>, with_door: bool) -> Result<StructureBuilder> {
    let mut b = StructureBuilder::new();

    for (j, part) in WALL_PARTS.iter().enumerate() {
        let name = format!("{}/{}", basename, part);
        b.merge(sheet.solid_structure(&name, [1, 1, 2], (j as u32, 0))?)?;
    }

    if with_door {
        let (image, depth) = sheet.cut((WALL_PARTS.len() as u32, 0), 3, 3)?;
        b.create_structure(format!("{}/door", basename), image, depth, door_shape(), WALL_LAYER);
    }

    tracing::debug!(family = basename, parts = b.len(), "wall family laid out");
    Ok(b)
}

/// An item whose icon is the tile at `tile` in the structure's image.
pub fn structure_item(
    structure: &StructureDef,
    name: &str,
    ui_name: &str,
    tile: (u32, u32),
    tile_size: u32,
) -> Result<ItemBuilder> {
    let mut b = ItemBuilder::new();
    let proto = b.create(name);
    proto.ui_name(ui_name);
    if let Some(img) = structure.visual.first_image() {
        let icon = tile
            .0
            .checked_mul(tile_size)
            .zip(tile.1.checked_mul(tile_size))
            .and_then(|(x, y)| img.crop(x, y, tile_size, tile_size))
            .ok_or_else(|| {
                CompileError::Config(format!(
                    "icon tile {:?} of item `{}` is outside pixel range of `{}`",
                    tile, name, img.sheet
                ))
            })?;
        proto.image(icon);
    }
    Ok(b)
}
