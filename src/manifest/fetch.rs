//! Fetch collaborators used to resolve package and layout manifests.
//!
//! A fetch returns the JSON payload stored at `url`, or the status text that
//! explains why it could not. The extractor records that text verbatim in
//! its `errors` list, so implementations should keep it short and
//! HTTP-flavoured ("Not Found", "Forbidden", ...).

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use futures::future::{self, FutureExt, LocalBoxFuture};
use log::debug;
use serde_json::Value;

use crate::resources::assetcache::AssetCache;

/// Payload of a successful fetch, or the status text of a failed one.
pub type FetchResult = Result<Value, String>;

/// Resolves `(id, url)` to a JSON payload.
pub trait ManifestFetch {
    fn fetch<'a>(&'a mut self, id: &'a str, url: &'a str) -> LocalBoxFuture<'a, FetchResult>;
}

impl<F: ManifestFetch + ?Sized> ManifestFetch for &mut F {
    fn fetch<'a>(&'a mut self, id: &'a str, url: &'a str) -> LocalBoxFuture<'a, FetchResult> {
        (**self).fetch(id, url)
    }
}

/// Adapts a synchronous closure into a [`ManifestFetch`].
pub struct FnFetch<F>(pub F);

impl<F> ManifestFetch for FnFetch<F>
where
    F: FnMut(&str, &str) -> FetchResult,
{
    fn fetch<'a>(&'a mut self, id: &'a str, url: &'a str) -> LocalBoxFuture<'a, FetchResult> {
        future::ready((self.0)(id, url)).boxed_local()
    }
}

/// Resolve a URL such as `/internal/a.json` against an asset root directory.
pub fn resolve_url(root: &Path, url: &str) -> PathBuf {
    root.join(url.trim_start_matches('/'))
}

/// Reads JSON manifests from an asset directory on disk.
#[derive(Debug, Clone)]
pub struct FsFetch {
    root: PathBuf,
}

impl FsFetch {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsFetch { root: root.into() }
    }

    fn read(&self, url: &str) -> FetchResult {
        let path = resolve_url(&self.root, url);
        let text = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => "Not Found".to_string(),
            ErrorKind::PermissionDenied => "Forbidden".to_string(),
            _ => e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| format!("Invalid JSON: {}", e))
    }
}

impl ManifestFetch for FsFetch {
    fn fetch<'a>(&'a mut self, _id: &'a str, url: &'a str) -> LocalBoxFuture<'a, FetchResult> {
        async move { self.read(url) }.boxed_local()
    }
}

/// Serves payloads from the JSON cache before falling back to `inner`.
///
/// A cache hit never reaches the inner fetch; a successful inner fetch is
/// cached under the requested id.
pub struct CachedFetch<'c, F> {
    inner: F,
    cache: &'c mut AssetCache<Value>,
}

impl<'c, F: ManifestFetch> CachedFetch<'c, F> {
    pub fn new(inner: F, cache: &'c mut AssetCache<Value>) -> Self {
        CachedFetch { inner, cache }
    }
}

impl<F: ManifestFetch> ManifestFetch for CachedFetch<'_, F> {
    fn fetch<'a>(&'a mut self, id: &'a str, url: &'a str) -> LocalBoxFuture<'a, FetchResult> {
        async move {
            if let Some(cached) = self.cache.get(id) {
                debug!("Manifest {} served from cache", id);
                return Ok(cached.clone());
            }
            let payload = self.inner.fetch(id, url).await?;
            self.cache.add(id, payload.clone());
            Ok::<_, String>(payload)
        }
        .boxed_local()
    }
}
