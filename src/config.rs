//! Asset Manifest - hand-authored layout tables and run settings

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{CompileError, Result};
use crate::families::TILE_SIZE;
use crate::registry::MergePolicy;
use crate::shape::{BlockShape, Side};
use crate::COMPILER_VERSION;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetManifest {
    pub name: String,
    pub compiler_min_version: String,
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,
    #[serde(default)]
    pub tiles: Vec<TileEntry>,
    #[serde(default)]
    pub wall_families: Vec<WallFamilyConfig>,
    #[serde(default)]
    pub blocks: Vec<BlockEntry>,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

fn default_tile_size() -> u32 { TILE_SIZE }

/// A named tile at grid position `x, y` of a sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileEntry {
    pub name: String,
    pub family: String,
    pub file: String,
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WallFamilyConfig {
    pub basename: String,
    pub family: String,
    pub image: String,
    #[serde(default)]
    pub planemap: Option<String>,
    #[serde(default)]
    pub door: bool,
    #[serde(default)]
    pub items: Vec<StructureItemConfig>,
    /// Recipe for every derived item that does not carry its own.
    #[serde(default)]
    pub recipe: Option<RecipeConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureItemConfig {
    /// Part name relative to the family basename, e.g. `edge/horiz`.
    pub part: String,
    pub name: String,
    pub ui_name: String,
    #[serde(default)]
    pub tile: [u32; 2],
    #[serde(default)]
    pub recipe: Option<RecipeConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeConfig {
    pub station: String,
    pub costs: IndexMap<String, u16>,
}

/// A terrain block. Side keys (`top`, `north`, ...) sit next to `name`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockEntry {
    pub name: String,
    #[serde(default)]
    pub shape: BlockShape,
    #[serde(flatten)]
    pub sides: BTreeMap<Side, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    #[serde(default)]
    pub merge_policy: MergePolicy,
    /// Emit output even when diagnostics were recorded. The build
    /// manifest is then marked invalid.
    #[serde(default)]
    pub allow_diagnostics: bool,
}

impl AssetManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CompileError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let manifest: Self = serde_json::from_str(content)?;
        manifest.check_compiler_version()?;
        Ok(manifest)
    }

    pub fn check_compiler_version(&self) -> Result<()> {
        let current = semver::Version::parse(COMPILER_VERSION)
            .map_err(|_| CompileError::Config("invalid compiler version".into()))?;
        let required = semver::Version::parse(&self.compiler_min_version).map_err(|e| {
            CompileError::Config(format!(
                "invalid compilerMinVersion `{}`: {}",
                self.compiler_min_version, e
            ))
        })?;

        if current < required {
            return Err(CompileError::CompilerVersionMismatch {
                required: self.compiler_min_version.clone(),
                current: COMPILER_VERSION.to_string(),
            });
        }
        Ok(())
    }
}
