//! Loaded asset caches keyed by resource id.
//!
//! The bulk loader writes into these caches, the cached manifest fetch reads
//! the JSON cache before touching the asset source, and leaving the boot
//! scene evicts boot-only entries. Each cache is a plain id-keyed map; the
//! payloads stay engine-agnostic (raw bytes or parsed JSON).

use bevy_ecs::prelude::Resource;
use rustc_hash::FxHashMap;
use serde_json::Value;

/// Id-keyed map of loaded payloads of one kind.
#[derive(Debug)]
pub struct AssetCache<T> {
    entries: FxHashMap<String, T>,
}

impl<T> Default for AssetCache<T> {
    fn default() -> Self {
        AssetCache {
            entries: FxHashMap::default(),
        }
    }
}

impl<T> AssetCache<T> {
    pub fn has(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.entries.get(id)
    }

    /// Insert or replace the payload cached under `id`.
    pub fn add(&mut self, id: impl Into<String>, value: T) {
        self.entries.insert(id.into(), value);
    }

    pub fn remove(&mut self, id: &str) -> Option<T> {
        self.entries.remove(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Image or spritesheet bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub bytes: Vec<u8>,
    /// Frame width/height when the texture is a spritesheet.
    pub frame: Option<(u32, u32)>,
}

/// Skeleton and atlas of a spine animation.
#[derive(Debug, Clone, PartialEq)]
pub struct SpineData {
    pub skeleton: Value,
    pub atlas: String,
}

/// Video sources in preference order.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoData {
    pub sources: Vec<Vec<u8>>,
    pub no_audio: bool,
}

/// All asset caches of a session.
#[derive(Resource, Debug, Default)]
pub struct AssetCaches {
    pub audio: AssetCache<Vec<u8>>,
    pub textures: AssetCache<TextureData>,
    pub json: AssetCache<Value>,
    pub spine: AssetCache<SpineData>,
    pub video: AssetCache<VideoData>,
}

impl AssetCaches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every cached asset.
    pub fn clear(&mut self) {
        self.audio.clear();
        self.textures.clear();
        self.json.clear();
        self.spine.clear();
        self.video.clear();
    }
}
