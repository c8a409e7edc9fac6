//! Raster handles, depth maps and the tile table.
//!
//! Pixels never enter this crate. A handle names a sheet and a region of
//! it; decoding and depth extraction belong to the collaborators behind
//! [`ResourceLoader`] and [`DepthMapExtractor`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{CompileError, Result};

/// Pixel rectangle `[x, y, w, h]` relative to the sheet origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
}

/// Opaque reference to a (possibly cropped) raster sheet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RasterHandle {
    pub sheet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<Rect>,
}

impl RasterHandle {
    pub fn new(sheet: impl Into<String>) -> Self {
        Self { sheet: sheet.into(), region: None }
    }

    /// Crop relative to this handle's own region. `None` when the
    /// resulting rectangle does not fit in pixel coordinates.
    pub fn crop(&self, x: u32, y: u32, w: u32, h: u32) -> Option<Self> {
        let (ox, oy) = self.region.map_or((0, 0), |r| (r.x, r.y));
        let (x, y) = (ox.checked_add(x)?, oy.checked_add(y)?);
        x.checked_add(w)?;
        y.checked_add(h)?;
        Some(Self {
            sheet: self.sheet.clone(),
            region: Some(Rect::new(x, y, w, h)),
        })
    }
}

/// Height field derived from a planemap region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DepthMap {
    Planemap { source: RasterHandle },
    Flat { width: u32, height: u32 },
}

impl DepthMap {
    pub fn size(&self) -> Option<(u32, u32)> {
        match self {
            DepthMap::Planemap { source } => source.region.map(|r| (r.w, r.h)),
            DepthMap::Flat { width, height } => Some((*width, *height)),
        }
    }
}

/// Turns a cropped planemap into a depth map of the same dimensions.
pub trait DepthMapExtractor {
    fn extract(&self, planemap: &RasterHandle) -> DepthMap;
}

/// Keeps the planemap region as the depth source for a later bake.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanemapExtractor;

impl DepthMapExtractor for PlanemapExtractor {
    fn extract(&self, planemap: &RasterHandle) -> DepthMap {
        DepthMap::Planemap { source: planemap.clone() }
    }
}

/// Loads raster sheets by asset family and file name.
///
/// A missing file is a diagnostic and yields `Ok(None)`. Any other
/// failure is fatal.
pub trait ResourceLoader {
    fn load(&self, family: &str, file: &str, diags: &mut Diagnostics) -> Result<Option<RasterHandle>>;
}

/// Loader over `<root>/<family>/<file>`.
#[derive(Debug, Clone)]
pub struct FsLoader {
    root: PathBuf,
}

impl FsLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ResourceLoader for FsLoader {
    fn load(&self, family: &str, file: &str, diags: &mut Diagnostics) -> Result<Option<RasterHandle>> {
        let path = self.root.join(family).join(file);
        match std::fs::metadata(&path) {
            Ok(meta) if meta.is_file() => {
                tracing::debug!(path = %path.display(), "loaded sheet");
                Ok(Some(RasterHandle::new(format!("{}/{}", family, file))))
            }
            Ok(_) => Err(CompileError::Resource {
                path,
                source: std::io::Error::new(ErrorKind::InvalidInput, "not a regular file"),
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                diags.push(Diagnostic::missing_resource(family, file));
                Ok(None)
            }
            Err(source) => Err(CompileError::Resource { path, source }),
        }
    }
}

/// Named tiles. A tile's ID is its insertion index.
#[derive(Debug, Clone, Default)]
pub struct TileTable {
    tiles: IndexMap<String, RasterHandle>,
}

impl TileTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a tile. Replacing keeps the original ID.
    pub fn insert(&mut self, name: impl Into<String>, handle: RasterHandle) -> u32 {
        let (index, _) = self.tiles.insert_full(name.into(), handle);
        index as u32
    }

    pub fn id_of(&self, name: &str) -> Option<u32> {
        self.tiles.get_index_of(name).map(|i| i as u32)
    }

    pub fn get(&self, name: &str) -> Option<&RasterHandle> {
        self.tiles.get(name)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}
