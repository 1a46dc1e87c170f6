//! Boot lifecycle: preload, then scene load, then boot-only eviction.
//!
//! The boot scene loads twice in a row. The first pass covers the catalog's
//! `BOOT` and `BOOT_COMMON` records (the assets the boot screen itself and
//! every later scene need); the second pass covers the resources of the
//! scene being booted into. Progress of both passes is published as
//! [`LoadMessage`]s so the ECS side can drive its progress bar.

use crossbeam_channel::Sender;
use log::{debug, info, warn};

use crate::events::loadmessage::{BootStage, LoadMessage};
use crate::loader::bulk::BulkLoader;
use crate::loader::fontloader::FontFaceLoader;
use crate::loader::progressive::{LoaderIo, PassReport, ProgressiveLoader};
use crate::manifest::fetch::ManifestFetch;
use crate::resources::assetcache::AssetCaches;
use crate::resources::loaderconfig::LoaderConfig;
use crate::resources::resourcecatalog::ResourceCatalog;
use crate::resources::resourcerecord::{ResourceCategory, ResourceRecord, ResourceType};

/// Categories loaded by the preload pass.
pub const PRELOAD_CATEGORIES: [ResourceCategory; 2] =
    [ResourceCategory::Boot, ResourceCategory::BootCommon];

/// Reports of both boot passes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BootReport {
    pub preload: PassReport,
    pub scene: PassReport,
}

/// Runs the preload and scene passes in order.
#[derive(Debug, Clone, Default)]
pub struct BootSequence {
    loader: ProgressiveLoader,
}

impl BootSequence {
    pub fn new(loader: ProgressiveLoader) -> Self {
        BootSequence { loader }
    }

    pub fn from_config(config: &LoaderConfig) -> Self {
        Self::new(ProgressiveLoader::from_config(config))
    }

    pub fn loader(&self) -> &ProgressiveLoader {
        &self.loader
    }

    /// Run both passes, publishing progress on `tx`.
    ///
    /// The scene pass starts only after the preload pass has completed. A
    /// closed channel is not an error; loading simply continues unobserved.
    pub async fn run<F, B, L>(
        &mut self,
        catalog: &ResourceCatalog,
        scene_resources: &[ResourceRecord],
        io: &mut LoaderIo<'_, F, B, L>,
        tx: &Sender<LoadMessage>,
    ) -> BootReport
    where
        F: ManifestFetch,
        B: BulkLoader,
        L: FontFaceLoader,
    {
        let preload = catalog.get_by_category(&PRELOAD_CATEGORIES);
        info!("Preloading {} boot resources", preload.len());
        let preload = self.run_stage(BootStage::Preload, &preload, io, tx).await;

        info!("Loading {} scene resources", scene_resources.len());
        let scene = self.run_stage(BootStage::Scene, scene_resources, io, tx).await;

        BootReport { preload, scene }
    }

    async fn run_stage<F, B, L>(
        &mut self,
        stage: BootStage,
        manifest: &[ResourceRecord],
        io: &mut LoaderIo<'_, F, B, L>,
        tx: &Sender<LoadMessage>,
    ) -> PassReport
    where
        F: ManifestFetch,
        B: BulkLoader,
        L: FontFaceLoader,
    {
        let report = self
            .loader
            .run_pass(manifest, io, &mut |value| {
                debug!("{:?} progress {:.3}", stage, value);
                publish(tx, LoadMessage::Progress { stage, value });
            })
            .await;

        let extraction = &report.extraction;
        if extraction.has_conflicts() {
            warn!(
                "{:?} manifest has {} duplicated keys",
                stage,
                extraction.duplicated_keys.len()
            );
        }
        publish(
            tx,
            LoadMessage::Extracted {
                stage,
                errors: extraction.errors.len(),
                duplicated_keys: extraction.duplicated_keys.len(),
                duplicated_paths: extraction.duplicated_paths.len(),
            },
        );
        publish(tx, LoadMessage::StageComplete { stage });
        report
    }
}

fn publish(tx: &Sender<LoadMessage>, message: LoadMessage) {
    if tx.send(message).is_err() {
        debug!("Load message dropped, receiver is gone");
    }
}

/// Drop the cached assets of every `BOOT` record.
///
/// Only audio, image and JSON entries are evicted; resources of any other
/// category (including `BOOT_COMMON`) stay cached. Returns how many cache
/// entries were removed.
pub fn evict_boot_resources(catalog: &ResourceCatalog, caches: &mut AssetCaches) -> usize {
    let mut evicted = 0;
    for record in catalog.get_by_category(&[ResourceCategory::Boot]) {
        let removed = match record.kind {
            ResourceType::Audio => caches.audio.remove(&record.id).is_some(),
            ResourceType::Image => caches.textures.remove(&record.id).is_some(),
            ResourceType::Json => caches.json.remove(&record.id).is_some(),
            _ => false,
        };
        if removed {
            debug!("Evicted boot resource {}", record.id);
            evicted += 1;
        }
    }
    evicted
}
