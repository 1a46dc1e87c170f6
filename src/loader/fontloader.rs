//! Concurrency-capped font loading.
//!
//! Fonts are decoded in fixed-size batches: the items of one batch are in
//! flight together, and the next batch starts only after every item of the
//! current one has settled. A face that fails to decode is logged and still
//! counts as settled, so a bad font never stalls or aborts loading.

use std::path::PathBuf;

use futures::StreamExt;
use futures::future::{FutureExt, LocalBoxFuture};
use futures::stream::FuturesUnordered;
use log::{debug, error};

use crate::manifest::fetch::resolve_url;
use crate::resources::fontstore::{FontFace, FontFormat, FontStore};

/// Default number of fonts decoded at once.
pub const DEFAULT_FONT_CONCURRENCY: usize = 5;

/// A font family and the file it is loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontItem {
    pub name: String,
    pub url: String,
}

/// Decodes a single font face.
pub trait FontFaceLoader {
    fn load<'a>(&'a self, item: &'a FontItem) -> LocalBoxFuture<'a, Result<FontFace, String>>;
}

impl<L: FontFaceLoader + ?Sized> FontFaceLoader for &L {
    fn load<'a>(&'a self, item: &'a FontItem) -> LocalBoxFuture<'a, Result<FontFace, String>> {
        (**self).load(item)
    }
}

/// Reads font files from an asset directory and checks their signature.
#[derive(Debug, Clone)]
pub struct FsFontFaceLoader {
    root: PathBuf,
}

impl FsFontFaceLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsFontFaceLoader { root: root.into() }
    }
}

impl FontFaceLoader for FsFontFaceLoader {
    fn load<'a>(&'a self, item: &'a FontItem) -> LocalBoxFuture<'a, Result<FontFace, String>> {
        async move {
            let data = std::fs::read(resolve_url(&self.root, &item.url)).map_err(|e| e.to_string())?;
            let format = FontFormat::sniff(&data).ok_or_else(|| "unrecognised font data".to_string())?;
            Ok::<_, String>(FontFace {
                family: item.name.clone(),
                url: item.url.clone(),
                format,
                data,
            })
        }
        .boxed_local()
    }
}

/// Outcome of one font loading run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FontLoadReport {
    pub loaded: usize,
    pub failed: usize,
    pub batches: usize,
}

/// Queue of fonts loaded `concurrency` at a time.
#[derive(Debug, Clone)]
pub struct FontLoader {
    items: Vec<FontItem>,
    concurrency: usize,
}

impl Default for FontLoader {
    fn default() -> Self {
        Self::new(DEFAULT_FONT_CONCURRENCY)
    }
}

impl FontLoader {
    /// Create a loader; a cap below 1 is raised to 1.
    pub fn new(concurrency: usize) -> Self {
        FontLoader {
            items: Vec::new(),
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn add(&mut self, name: impl Into<String>, url: impl Into<String>) {
        self.items.push(FontItem {
            name: name.into(),
            url: url.into(),
        });
    }

    pub fn items(&self) -> &[FontItem] {
        &self.items
    }

    /// Load every queued font into `store`.
    ///
    /// `on_progress` receives `settled / count` each time an item settles.
    /// An empty queue completes immediately without reporting progress.
    pub async fn start<L: FontFaceLoader>(
        &self,
        loader: &L,
        store: &mut FontStore,
        on_progress: &mut dyn FnMut(f32),
    ) -> FontLoadReport {
        let mut report = FontLoadReport::default();
        let total = self.items.len();

        for batch in self.items.chunks(self.concurrency) {
            report.batches += 1;
            debug!("Font batch {} with {} items", report.batches, batch.len());

            let mut in_flight: FuturesUnordered<_> = batch
                .iter()
                .map(|item| loader.load(item).map(move |outcome| (item, outcome)))
                .collect();

            while let Some((item, outcome)) = in_flight.next().await {
                match outcome {
                    Ok(face) => {
                        store.add(face);
                        report.loaded += 1;
                    }
                    Err(e) => {
                        error!("Loading {} from {} got error: {}", item.name, item.url, e);
                        report.failed += 1;
                    }
                }
                on_progress((report.loaded + report.failed) as f32 / total as f32);
            }
        }

        report
    }
}
