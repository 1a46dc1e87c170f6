//! Manifest resolution.
//!
//! - `extract` – worklist expansion of packages and layouts into a flat,
//!   conflict-checked resource list
//! - `fetch` – collaborators that retrieve package/layout JSON (disk, cache,
//!   closures)
//! - `layout` – the key taxonomy used to discover assets inside layouts
pub mod extract;
pub mod fetch;
pub mod layout;

pub use extract::{DuplicatedKey, DuplicatedPath, ExtractionResult, FetchFailure, ManifestExtractor};
pub use fetch::{CachedFetch, FetchResult, FnFetch, FsFetch, ManifestFetch};
pub use layout::{KeyKind, LayoutScanner};
