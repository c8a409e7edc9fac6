//! TileForge Core - Tile Asset Compiler
//!
//! # Guarantees
//! 1. Checks Report, They Never Abort
//! 2. One Name Per Kind, One Definition
//! 3. IDs Follow Merge Order
//! 4. Unresolved Means Absent, Never Zero
//! 5. Client And Server Agree On IDs

pub mod builder;
pub mod config;
pub mod definition;
pub mod diagnostics;
pub mod encode;
pub mod error;
pub mod families;
pub mod field;
pub mod hashing;
pub mod pipeline;
pub mod prototype;
pub mod registry;
pub mod resolve;
pub mod resource;
pub mod shape;

pub use builder::{Builder, BlockBuilder, ItemBuilder, StructureBuilder};
pub use config::{AssetManifest, PipelineConfig};
pub use definition::{Definition, DefinitionKind};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use encode::{encode_client, encode_server, ClientDocument, ServerDocument};
pub use error::{CompileError, Result};
pub use hashing::{canonical_json, compute_content_hash, compute_document_hash};
pub use pipeline::{BuildManifest, CompilationPipeline, CompiledAssets};
pub use prototype::{BlockPrototype, ItemPrototype, Prototype, StructurePrototype};
pub use registry::{MergePolicy, Registry};
pub use resolve::{resolve, ResolvedIds};
pub use resource::{FsLoader, RasterHandle, ResourceLoader, TileTable};

pub const COMPILER_VERSION: &str = env!("CARGO_PKG_VERSION");
