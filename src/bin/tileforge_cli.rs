//! TileForge CLI - Tile asset compiler
//!
//! Commands: check, compile
//! Outputs JSON to stdout, logs to stderr
//! Returns 2 when diagnostics were recorded

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tileforge_core::{AssetManifest, CompilationPipeline, CompileError, CompiledAssets, FsLoader};

#[derive(Parser)]
#[command(name = "tileforge-cli")]
#[command(about = "TileForge CLI - Tile Asset Compiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Root directory holding one subdirectory per asset family
    #[arg(short, long, default_value = "assets")]
    asset_root: PathBuf,

    /// Asset manifest (JSON)
    #[arg(short, long, default_value = "assets.json")]
    manifest: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and resolve, report diagnostics, write nothing
    Check,

    /// Build, resolve and write client.json, server.json and manifest.json
    Compile {
        /// Output directory
        #[arg(short, long, default_value = "out")]
        out: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let manifest = match AssetManifest::load(&cli.manifest) {
        Ok(m) => m,
        Err(e) => {
            print_json(&serde_json::json!({"success": false, "error": e.to_string()}));
            return ExitCode::FAILURE;
        }
    };

    let pipeline = CompilationPipeline::new(FsLoader::new(&cli.asset_root));

    match cli.command {
        Commands::Check => match pipeline.check(&manifest) {
            Ok(diags) => {
                print_json(&serde_json::json!({
                    "valid": diags.is_empty(),
                    "diagnostics": diags.entries(),
                }));
                if diags.is_empty() {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::from(2)
                }
            }
            Err(e) => report_error(e),
        },

        Commands::Compile { out } => {
            let compiled = match pipeline.compile(&manifest) {
                Ok(c) => c,
                Err(e) => return report_error(e),
            };

            if let Err(e) = write_outputs(&out, &compiled) {
                return report_error(e);
            }

            print_json(&serde_json::json!({
                "success": true,
                "manifest": compiled.manifest,
            }));
            if compiled.manifest.valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            }
        }
    }
}

fn write_outputs(out: &Path, compiled: &CompiledAssets) -> Result<(), CompileError> {
    fs::create_dir_all(out)?;
    fs::write(out.join("client.json"), serde_json::to_string(&compiled.client)?)?;
    fs::write(out.join("server.json"), serde_json::to_string_pretty(&compiled.server)?)?;
    fs::write(out.join("manifest.json"), serde_json::to_string_pretty(&compiled.manifest)?)?;
    tracing::info!(out = %out.display(), "outputs written");
    Ok(())
}

fn report_error(e: CompileError) -> ExitCode {
    match e {
        CompileError::Diagnostics(all) => {
            print_json(&serde_json::json!({
                "success": false,
                "error": format!("Compilation failed with {} diagnostic(s)", all.len()),
                "diagnostics": all,
            }));
            ExitCode::from(2)
        }
        other => {
            print_json(&serde_json::json!({"success": false, "error": other.to_string()}));
            ExitCode::FAILURE
        }
    }
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("failed to encode output: {}", e),
    }
}
