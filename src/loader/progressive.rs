//! Two-phase progressive loading of an extracted manifest.
//!
//! One pass runs `Idle -> ExtractingManifest -> LoadingBulk -> LoadingFonts
//! -> Complete`. The extracted resources are split by loading mechanism:
//! everything but fonts goes to the bulk loader, fonts go to the
//! concurrency-capped [`FontLoader`] once the bulk loader has resolved.
//!
//! Both phases feed one progress signal weighted by item count:
//!
//! ```text
//! w_font = fonts / (fonts + bulk)      w_bulk = 1 - w_font
//! bulk phase:  bulk_fraction * w_bulk
//! font phase:  w_bulk + font_fraction * w_font
//! ```
//!
//! The signal never decreases and always ends on exactly `1.0`.

use log::{debug, info, warn};

use crate::loader::bulk::{BulkItem, BulkLoader};
use crate::loader::fontloader::{
    DEFAULT_FONT_CONCURRENCY, FontFaceLoader, FontItem, FontLoadReport, FontLoader,
};
use crate::manifest::extract::{ExtractionResult, ManifestExtractor};
use crate::manifest::fetch::{CachedFetch, ManifestFetch};
use crate::resources::assetcache::AssetCaches;
use crate::resources::fontstore::FontStore;
use crate::resources::loaderconfig::LoaderConfig;
use crate::resources::resourcerecord::{ResourceRecord, ResourceType};

/// Where a [`ProgressiveLoader`] is within its current pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    #[default]
    Idle,
    ExtractingManifest,
    LoadingBulk,
    LoadingFonts,
    Complete,
}

/// Share of the progress bar owned by each phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassWeights {
    pub bulk: f32,
    pub font: f32,
}

impl PassWeights {
    /// Weights for a pass, or `None` when there is nothing to load.
    pub fn new(bulk_count: usize, font_count: usize) -> Option<Self> {
        let total = bulk_count + font_count;
        if total == 0 {
            return None;
        }
        let font = font_count as f32 / total as f32;
        Some(PassWeights {
            bulk: 1.0 - font,
            font,
        })
    }

    pub fn bulk_progress(&self, fraction: f32) -> f32 {
        fraction.clamp(0.0, 1.0) * self.bulk
    }

    pub fn font_progress(&self, fraction: f32) -> f32 {
        let fraction = fraction.clamp(0.0, 1.0);
        if fraction >= 1.0 {
            return 1.0;
        }
        self.bulk + fraction * self.font
    }
}

/// Resources of a pass split by loading mechanism.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    pub bulk: Vec<BulkItem>,
    pub fonts: Vec<FontItem>,
}

/// Split extracted resources into bulk registrations and font items.
///
/// Packages and unknown types are skipped. A font without a family name
/// falls back to its id.
pub fn partition(resources: &[ResourceRecord]) -> Partition {
    let mut parts = Partition::default();
    for record in resources {
        if record.kind == ResourceType::Font {
            let name = record.font_family().unwrap_or_else(|| {
                warn!("Font {} has no family name, using its id", record.id);
                record.id.as_str()
            });
            parts.fonts.push(FontItem {
                name: name.to_string(),
                url: record.path.clone(),
            });
        } else if let Some(item) = BulkItem::from_record(record) {
            parts.bulk.push(item);
        }
    }
    parts
}

/// Collaborators and destinations of one pass.
pub struct LoaderIo<'a, F, B, L> {
    pub fetch: F,
    pub bulk: B,
    pub fonts: L,
    pub caches: &'a mut AssetCaches,
    pub font_store: &'a mut FontStore,
}

/// Outcome of one pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassReport {
    pub extraction: ExtractionResult,
    pub bulk_count: usize,
    pub font_count: usize,
    pub fonts: FontLoadReport,
}

/// Forwards progress while keeping it non-decreasing and within `[0, 1]`.
struct ProgressTracker<'p> {
    last: Option<f32>,
    sink: &'p mut dyn FnMut(f32),
}

impl<'p> ProgressTracker<'p> {
    fn new(sink: &'p mut dyn FnMut(f32)) -> Self {
        ProgressTracker { last: None, sink }
    }

    fn report(&mut self, value: f32) {
        let value = value.clamp(0.0, 1.0);
        if self.last.is_some_and(|last| value <= last) {
            return;
        }
        self.last = Some(value);
        (self.sink)(value);
    }

    fn finish(&mut self) {
        if self.last != Some(1.0) {
            self.report(1.0);
        }
    }
}

/// Drives extraction, bulk loading and font loading for one pass at a time.
#[derive(Debug, Clone)]
pub struct ProgressiveLoader {
    extractor: ManifestExtractor,
    font_concurrency: usize,
    phase: LoadPhase,
}

impl Default for ProgressiveLoader {
    fn default() -> Self {
        Self::new(ManifestExtractor::default(), DEFAULT_FONT_CONCURRENCY)
    }
}

impl ProgressiveLoader {
    pub fn new(extractor: ManifestExtractor, font_concurrency: usize) -> Self {
        ProgressiveLoader {
            extractor,
            font_concurrency: font_concurrency.max(1),
            phase: LoadPhase::Idle,
        }
    }

    pub fn from_config(config: &LoaderConfig) -> Self {
        Self::new(
            ManifestExtractor::from_config(config),
            config.font_concurrency,
        )
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn font_concurrency(&self) -> usize {
        self.font_concurrency
    }

    /// Run one full pass over `manifest`.
    ///
    /// Manifest fetches are served from the JSON cache when possible. The
    /// returned future resolving is the pass's completion; `on_progress`
    /// has received exactly `1.0` by then.
    pub async fn run_pass<F, B, L>(
        &mut self,
        manifest: &[ResourceRecord],
        io: &mut LoaderIo<'_, F, B, L>,
        on_progress: &mut dyn FnMut(f32),
    ) -> PassReport
    where
        F: ManifestFetch,
        B: BulkLoader,
        L: FontFaceLoader,
    {
        let mut tracker = ProgressTracker::new(on_progress);

        self.phase = LoadPhase::ExtractingManifest;
        let extraction = {
            let mut fetch = CachedFetch::new(&mut io.fetch, &mut io.caches.json);
            self.extractor.extract(manifest, &mut fetch).await
        };

        let parts = partition(&extraction.resources);
        let mut report = PassReport {
            bulk_count: parts.bulk.len(),
            font_count: parts.fonts.len(),
            ..PassReport::default()
        };
        info!(
            "Loading {} bulk items and {} fonts",
            report.bulk_count, report.font_count
        );

        let Some(weights) = PassWeights::new(report.bulk_count, report.font_count) else {
            debug!("Nothing to load");
            tracker.finish();
            self.phase = LoadPhase::Complete;
            report.extraction = extraction;
            return report;
        };

        self.phase = LoadPhase::LoadingBulk;
        for item in parts.bulk {
            io.bulk.add(item);
        }
        io.bulk
            .start(io.caches, &mut |fraction| {
                tracker.report(weights.bulk_progress(fraction))
            })
            .await;
        tracker.report(weights.bulk);

        self.phase = LoadPhase::LoadingFonts;
        let mut fonts = FontLoader::new(self.font_concurrency);
        for item in parts.fonts {
            fonts.add(item.name, item.url);
        }
        report.fonts = fonts
            .start(&io.fonts, io.font_store, &mut |fraction| {
                tracker.report(weights.font_progress(fraction))
            })
            .await;

        tracker.finish();
        self.phase = LoadPhase::Complete;
        report.extraction = extraction;
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::fetch::FnFetch;
    use crate::resources::fontstore::{FontFace, FontFormat};
    use crate::resources::resourcecatalog::ResourceCatalog;
    use crate::resources::resourcerecord::ResourceCategory;
    use futures::executor::block_on;
    use futures::future::{FutureExt, LocalBoxFuture};
    use serde_json::json;

    /// Records registrations and reports progress per item.
    #[derive(Default)]
    struct ScriptedBulk {
        queue: Vec<BulkItem>,
        started: usize,
    }

    impl BulkLoader for ScriptedBulk {
        fn add(&mut self, item: BulkItem) {
            self.queue.push(item);
        }

        fn len(&self) -> usize {
            self.queue.len()
        }

        fn start<'a>(
            &'a mut self,
            _caches: &'a mut AssetCaches,
            on_progress: &'a mut dyn FnMut(f32),
        ) -> LocalBoxFuture<'a, ()> {
            async move {
                self.started += 1;
                let total = self.queue.len();
                for done in 1..=total {
                    on_progress(done as f32 / total as f32);
                }
                self.queue.clear();
            }
            .boxed_local()
        }
    }

    struct Faces;

    impl FontFaceLoader for Faces {
        fn load<'a>(&'a self, item: &'a FontItem) -> LocalBoxFuture<'a, Result<FontFace, String>> {
            futures::future::ready(Ok(FontFace {
                family: item.name.clone(),
                url: item.url.clone(),
                format: FontFormat::Woff2,
                data: Vec::new(),
            }))
            .boxed_local()
        }
    }

    fn record(id: &str, kind: ResourceType) -> ResourceRecord {
        ResourceRecord::new(id, ResourceCategory::Home, kind, format!("/{}", id))
    }

    fn run(
        manifest: &[ResourceRecord],
        caches: &mut AssetCaches,
        store: &mut FontStore,
    ) -> (PassReport, Vec<f32>, usize) {
        let mut loader = ProgressiveLoader::new(ManifestExtractor::default(), 2);
        let mut io = LoaderIo {
            fetch: FnFetch(|_: &str, _: &str| Err("Not Found".to_string())),
            bulk: ScriptedBulk::default(),
            fonts: Faces,
            caches,
            font_store: store,
        };
        let mut seen = Vec::new();
        let report = block_on(loader.run_pass(manifest, &mut io, &mut |p| seen.push(p)));
        assert_eq!(loader.phase(), LoadPhase::Complete);
        (report, seen, io.bulk.started)
    }

    #[test]
    fn test_weights() {
        let w = PassWeights::new(3, 1).unwrap();
        assert_eq!(w.font, 0.25);
        assert_eq!(w.bulk, 0.75);
        assert_eq!(w.bulk_progress(1.0), 0.75);
        assert_eq!(w.font_progress(0.0), 0.75);
        assert_eq!(w.font_progress(1.0), 1.0);
        assert!(PassWeights::new(0, 0).is_none());
    }

    #[test]
    fn test_partition_by_type() {
        let font = record("f", ResourceType::Font).with_param1("Sans");
        let nameless = record("g", ResourceType::Font);
        let parts = partition(&[
            record("a", ResourceType::Audio),
            font,
            record("p", ResourceType::Package),
            nameless,
            record("x", ResourceType::Unknown),
        ]);
        assert_eq!(parts.bulk.len(), 1);
        assert_eq!(
            parts.fonts,
            vec![
                FontItem {
                    name: "Sans".to_string(),
                    url: "/f".to_string()
                },
                FontItem {
                    name: "g".to_string(),
                    url: "/g".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_pass_progress_is_weighted() {
        let manifest = vec![
            record("a", ResourceType::Audio),
            record("b", ResourceType::Image),
            record("c", ResourceType::Json),
            record("f", ResourceType::Font).with_param1("Sans"),
        ];
        let mut caches = AssetCaches::new();
        let mut store = FontStore::new();
        let (report, seen, started) = run(&manifest, &mut caches, &mut store);

        assert_eq!(started, 1);
        assert_eq!(report.bulk_count, 3);
        assert_eq!(report.font_count, 1);
        assert_eq!(report.fonts.loaded, 1);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*seen.last().unwrap(), 1.0);
        assert!(seen.contains(&0.75));
        assert!(store.get("Sans").is_some());
    }

    #[test]
    fn test_empty_pass_reports_one_immediately() {
        let mut caches = AssetCaches::new();
        let mut store = FontStore::new();
        let (report, seen, started) = run(&[], &mut caches, &mut store);
        assert_eq!(seen, vec![1.0]);
        assert_eq!(started, 0);
        assert!(report.extraction.resources.is_empty());
    }

    #[test]
    fn test_layout_fetch_is_served_from_json_cache() {
        let mut caches = AssetCaches::new();
        caches.json.add("a.json", json!({"key": ["b.png"]}));
        let mut store = FontStore::new();
        let layout = record("a.json", ResourceType::Json).with_param1(true);
        let (report, _, _) = run(&[layout], &mut caches, &mut store);

        assert!(report.extraction.errors.is_empty());
        assert_eq!(report.extraction.resources.len(), 2);
        assert_eq!(report.bulk_count, 2);
    }

    #[test]
    fn test_from_catalog_records() {
        let mut catalog = ResourceCatalog::default();
        catalog.store(record("a", ResourceType::Audio));
        let mut caches = AssetCaches::new();
        let mut store = FontStore::new();
        let (report, seen, _) = run(catalog.get_all(), &mut caches, &mut store);
        assert_eq!(report.bulk_count, 1);
        assert_eq!(seen, vec![1.0]);
    }
}
