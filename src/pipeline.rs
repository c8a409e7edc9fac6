//! Compilation Pipeline - Single Entry Point
//!
//! build → merge → resolve → encode → hash. Fatal errors stop the run at
//! once; diagnostics are collected across the whole run and judged at
//! the end.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::builder::BlockBuilder;
use crate::config::{AssetManifest, PipelineConfig, WallFamilyConfig};
use crate::definition::DefinitionKind;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::encode::{encode_client, encode_server, ClientDocument, ServerDocument};
use crate::error::{CompileError, Result};
use crate::families::{structure_item, wall_parts, TileSheet, WALL_PARTS};
use crate::hashing::{compute_content_hash, compute_document_hash};
use crate::registry::{MergePolicy, Registry};
use crate::resolve::{resolve, ResolvedIds};
use crate::resource::{DepthMapExtractor, PlanemapExtractor, RasterHandle, ResourceLoader, TileTable};
use crate::COMPILER_VERSION;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionCounts {
    pub structures: usize,
    pub items: usize,
    pub blocks: usize,
    pub tiles: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildManifest {
    pub id: String,
    pub asset_set: String,
    pub compiler_version: String,
    pub created_at: DateTime<Utc>,
    pub content_hash: String,
    pub client_hash: String,
    pub server_hash: String,
    pub counts: DefinitionCounts,
    pub valid: bool,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone)]
pub struct CompiledAssets {
    pub client: ClientDocument,
    pub server: ServerDocument,
    pub ids: ResolvedIds,
    pub manifest: BuildManifest,
}

/// The compilation pipeline - single entry point for a compilation run
pub struct CompilationPipeline<L: ResourceLoader> {
    loader: L,
    extractor: Box<dyn DepthMapExtractor>,
}

impl<L: ResourceLoader> CompilationPipeline<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            extractor: Box::new(PlanemapExtractor),
        }
    }

    pub fn with_extractor(mut self, extractor: Box<dyn DepthMapExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Full run over an asset manifest.
    pub fn compile(&self, manifest: &AssetManifest) -> Result<CompiledAssets> {
        tracing::info!(asset_set = %manifest.name, "compilation started");
        let mut diags = Diagnostics::new();

        let tiles = self.load_tiles(manifest, &mut diags)?;
        let registry = self.build_registry(manifest, &mut diags)?;

        self.compile_registry(&manifest.name, &registry, &tiles, &manifest.pipeline, diags)
    }

    /// Build and resolve without producing output. Returns everything
    /// the run recorded.
    pub fn check(&self, manifest: &AssetManifest) -> Result<Diagnostics> {
        let mut diags = Diagnostics::new();
        let tiles = self.load_tiles(manifest, &mut diags)?;
        let registry = self.build_registry(manifest, &mut diags)?;
        resolve(&registry, &tiles, &mut diags);
        Ok(diags)
    }

    /// Resolve and encode an already merged registry.
    ///
    /// CRITICAL: a non-empty diagnostics log fails the run unless the
    /// config allows diagnostics.
    pub fn compile_registry(
        &self,
        asset_set: &str,
        registry: &Registry,
        tiles: &TileTable,
        config: &PipelineConfig,
        mut diags: Diagnostics,
    ) -> Result<CompiledAssets> {
        let ids = resolve(registry, tiles, &mut diags);

        if !diags.is_empty() && !config.allow_diagnostics {
            tracing::info!(diagnostics = diags.len(), "compilation failed");
            return Err(CompileError::Diagnostics(diags.into_vec()));
        }

        let client = encode_client(registry, &ids);
        let server = encode_server(registry);

        let client_hash = compute_document_hash(&client)?;
        let server_hash = compute_document_hash(&server)?;
        let content_hash = compute_content_hash(&client_hash, &server_hash, COMPILER_VERSION);

        let manifest = BuildManifest {
            id: Uuid::new_v4().to_string(),
            asset_set: asset_set.to_string(),
            compiler_version: COMPILER_VERSION.to_string(),
            created_at: Utc::now(),
            content_hash,
            client_hash,
            server_hash,
            counts: DefinitionCounts {
                structures: ids.count(DefinitionKind::Structure),
                items: ids.count(DefinitionKind::Item),
                blocks: ids.count(DefinitionKind::Block),
                tiles: tiles.len(),
            },
            valid: diags.is_empty(),
            diagnostics: diags.into_vec(),
        };

        tracing::info!(
            content_hash = %manifest.content_hash,
            valid = manifest.valid,
            "compilation finished"
        );

        Ok(CompiledAssets {
            client,
            server,
            ids,
            manifest,
        })
    }

    pub fn load_tiles(&self, manifest: &AssetManifest, diags: &mut Diagnostics) -> Result<TileTable> {
        let t = manifest.tile_size;
        let mut sheets: HashMap<(&str, &str), Option<RasterHandle>> = HashMap::new();
        let mut table = TileTable::new();

        for entry in &manifest.tiles {
            let key = (entry.family.as_str(), entry.file.as_str());
            let sheet = match sheets.get(&key) {
                Some(sheet) => sheet.clone(),
                None => {
                    let sheet = self.loader.load(&entry.family, &entry.file, diags)?;
                    sheets.insert(key, sheet.clone());
                    sheet
                }
            };
            if let Some(sheet) = sheet {
                let handle = entry
                    .x
                    .checked_mul(t)
                    .zip(entry.y.checked_mul(t))
                    .and_then(|(x, y)| sheet.crop(x, y, t, t))
                    .ok_or_else(|| {
                        CompileError::Config(format!(
                            "tile `{}` at grid ({}, {}) with tile size {} is outside pixel range",
                            entry.name, entry.x, entry.y, t
                        ))
                    })?;
                table.insert(entry.name.clone(), handle);
            }
        }

        tracing::debug!(tiles = table.len(), "tile table loaded");
        Ok(table)
    }

    /// Every family and block table, merged in manifest order.
    pub fn build_registry(&self, manifest: &AssetManifest, diags: &mut Diagnostics) -> Result<Registry> {
        let policy = manifest.pipeline.merge_policy;
        let mut registry = Registry::new();

        for family in &manifest.wall_families {
            let built = self.build_wall_family(family, manifest.tile_size, diags)?;
            registry.merge(built, policy)?;
        }

        let mut blocks = BlockBuilder::new();
        for entry in &manifest.blocks {
            let proto = blocks.create(entry.name.clone());
            proto.shape(entry.shape);
            for (side, tile) in &entry.sides {
                proto.side(*side, tile.clone());
            }
        }
        registry.merge(blocks.build(diags)?, policy)?;

        tracing::info!(definitions = registry.len(), "registry built");
        Ok(registry)
    }

    fn build_wall_family(
        &self,
        family: &WallFamilyConfig,
        tile_size: u32,
        diags: &mut Diagnostics,
    ) -> Result<Registry> {
        let image = self.loader.load(&family.family, &family.image, diags)?;
        let planemap = match &family.planemap {
            Some(file) => self.loader.load(&family.family, file, diags)?,
            None => None,
        };

        // missing sheets are already reported
        let Some(image) = image else {
            return Ok(Registry::new());
        };
        if family.planemap.is_some() && planemap.is_none() {
            return Ok(Registry::new());
        }

        let sheet = TileSheet::new(image, planemap, self.extractor.as_ref()).with_tile_size(tile_size);
        let parts = wall_parts(&family.basename, &sheet, family.door).map_err(|e| in_family(family, e))?;
        let mut registry = parts.build(diags)?;

        let mut items = Registry::new();
        let mut inherits = Vec::new();
        for item in &family.items {
            let known = WALL_PARTS.contains(&item.part.as_str()) || (family.door && item.part == "door");
            if !known {
                return Err(CompileError::Config(format!(
                    "wall family `{}` has no part `{}`",
                    family.basename, item.part
                )));
            }

            let part = format!("{}/{}", family.basename, item.part);
            let Some(structure) = registry.structure(&part) else {
                continue;
            };
            let tile = (item.tile[0], item.tile[1]);
            let built = structure_item(structure, &item.name, &item.ui_name, tile, tile_size)
                .map_err(|e| in_family(family, e))?;
            items.merge_builder(built, diags)?;

            match (&item.recipe, items.item_mut(&item.name)) {
                (Some(recipe), Some(def)) => {
                    def.recipe(&recipe.station, recipe.costs.iter().map(|(k, v)| (k.clone(), *v)));
                }
                (None, Some(_)) => inherits.push(item.name.as_str()),
                (_, None) => {}
            }
        }

        if let Some(recipe) = &family.recipe {
            items.attach_recipe(
                inherits,
                &recipe.station,
                recipe.costs.iter().map(|(k, v)| (k.clone(), *v)),
            )?;
        }

        registry.merge(items, MergePolicy::Reject)?;
        Ok(registry)
    }
}

fn in_family(family: &WallFamilyConfig, err: CompileError) -> CompileError {
    match err {
        CompileError::Config(msg) => {
            CompileError::Config(format!("wall family `{}`: {}", family.basename, msg))
        }
        other => other,
    }
}
