//! Progressive loading of extracted manifests.
//!
//! - `bulk` – the bulk asset loader collaborator and its disk implementation
//! - `fontloader` – batched, concurrency-capped font loading
//! - `progressive` – the two-phase pass with weighted progress
//! - `boot` – the preload/scene boot sequence and boot-only eviction
pub mod boot;
pub mod bulk;
pub mod fontloader;
pub mod progressive;

pub use boot::{BootReport, BootSequence, evict_boot_resources};
pub use bulk::{BulkItem, BulkLoader, FsBulkLoader};
pub use fontloader::{FontFaceLoader, FontItem, FontLoadReport, FontLoader, FsFontFaceLoader};
pub use progressive::{LoadPhase, LoaderIo, PassReport, PassWeights, ProgressiveLoader};
