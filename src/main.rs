//! skframework command line.
//!
//! Headless front end to the manifest pipeline:
//!
//! - `extract <MANIFEST>` – resolve packages and layouts, print the result
//! - `csv <MANIFEST>` – print a manifest as CSV
//! - `boot <CATALOG> <SCENE_MANIFEST>` – run the boot scene headless
//!
//! Asset locations and loader settings come from `--config` (an INI file,
//! `./config.ini` by default). Missing files or keys fall back to defaults.
//!
//! # Running
//!
//! ```sh
//! RUST_LOG=debug cargo run -- extract assets/manifest.json
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use futures::executor::block_on;
use log::{error, info, warn};

use skframework::game::{
    create_session, destroy_session, enter_boot, load_catalog, read_manifest,
    run_boot_sequence, run_until_scene_change,
};
use skframework::loader::bulk::FsBulkLoader;
use skframework::loader::fontloader::FsFontFaceLoader;
use skframework::manifest::extract::ManifestExtractor;
use skframework::manifest::fetch::FsFetch;
use skframework::resources::loaderconfig::LoaderConfig;
use skframework::resources::resourcecatalog::ResourceCatalog;
use skframework::resources::scenestate::SceneState;

/// Frame delta used by the headless boot.
const BOOT_FRAME_DT: f32 = 1.0 / 60.0;

/// skframework resource pipeline
#[derive(Parser)]
#[command(version, about = "Resource manifest extraction and progressive loading")]
struct Cli {
    /// Path to the INI configuration file.
    #[arg(long, value_name = "PATH", default_value = "./config.ini", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve packages and layouts of a manifest and print the result as JSON.
    /// Exits with status 1 when duplicated keys were found.
    Extract { manifest: PathBuf },
    /// Print a manifest as CSV.
    Csv { manifest: PathBuf },
    /// Run the boot scene headless: preload the catalog, then load the scene.
    Boot {
        catalog: PathBuf,
        scene_manifest: PathBuf,
        /// Give up after this many frames.
        #[arg(long, default_value_t = 6000)]
        max_frames: usize,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = LoaderConfig::with_path(&cli.config);
    if let Err(e) = config.load_from_file() {
        warn!("{}; using defaults", e);
    }

    let outcome = match cli.command {
        Command::Extract { manifest } => extract(&config, &manifest),
        Command::Csv { manifest } => csv(&manifest),
        Command::Boot {
            catalog,
            scene_manifest,
            max_frames,
        } => boot(config, &catalog, &scene_manifest, max_frames),
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn extract(config: &LoaderConfig, manifest: &Path) -> Result<ExitCode, String> {
    let records = read_manifest(manifest)?;
    let extractor = ManifestExtractor::from_config(config);
    let mut fetch = FsFetch::new(&config.asset_root);
    let result = block_on(extractor.extract(&records, &mut fetch));

    let json = serde_json::to_string_pretty(&result).map_err(|e| e.to_string())?;
    println!("{}", json);

    if result.has_conflicts() {
        warn!(
            "{} duplicated keys must be fixed in the manifests",
            result.duplicated_keys.len()
        );
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn csv(manifest: &Path) -> Result<ExitCode, String> {
    let mut catalog = ResourceCatalog::new();
    catalog.load_file(manifest)?;
    if let Some(csv) = catalog.to_csv() {
        println!("{}", csv);
    }
    Ok(ExitCode::SUCCESS)
}

fn boot(
    config: LoaderConfig,
    catalog: &Path,
    scene_manifest: &Path,
    max_frames: usize,
) -> Result<ExitCode, String> {
    let scene_resources = read_manifest(scene_manifest)?;
    let root = config.asset_root.clone();

    let mut world = create_session(config);
    load_catalog(&mut world, catalog)?;
    enter_boot(&mut world);

    let report = run_boot_sequence(
        &mut world,
        &scene_resources,
        FsFetch::new(&root),
        FsBulkLoader::new(&root),
        FsFontFaceLoader::new(&root),
    )?;
    for (stage, pass) in [("preload", &report.preload), ("scene", &report.scene)] {
        info!(
            "{}: {} resources, {} errors, {} fonts loaded, {} fonts failed",
            stage,
            pass.extraction.resources.len(),
            pass.extraction.errors.len(),
            pass.fonts.loaded,
            pass.fonts.failed
        );
    }

    let outcome = match run_until_scene_change(&mut world, BOOT_FRAME_DT, max_frames) {
        Some(frames) => {
            let scene = world.resource::<SceneState>().get().name();
            println!("Entered {} after {} frames", scene, frames);
            Ok(ExitCode::SUCCESS)
        }
        None => Err(format!("Boot did not finish within {} frames", max_frames)),
    };
    destroy_session(&mut world);
    outcome
}
