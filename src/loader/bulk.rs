//! Bulk asset loader collaborator.
//!
//! Everything that is not a font goes through a [`BulkLoader`]: the pass
//! registers one [`BulkItem`] per resource, then starts the loader once. The
//! loader reports a fraction in `[0, 1]` as items finish; resolution of the
//! returned future is the one-shot completion event.

use std::path::PathBuf;

use futures::future::{FutureExt, LocalBoxFuture};
use log::{debug, warn};
use serde_json::Value;
use smallvec::SmallVec;

use crate::manifest::fetch::resolve_url;
use crate::resources::assetcache::{AssetCaches, SpineData, TextureData, VideoData};
use crate::resources::resourcerecord::{ResourceRecord, ResourceType};

/// One registration call on the bulk loader.
#[derive(Debug, Clone, PartialEq)]
pub enum BulkItem {
    Audio {
        id: String,
        url: String,
    },
    Image {
        id: String,
        url: String,
    },
    Json {
        id: String,
        url: String,
    },
    Video {
        id: String,
        urls: SmallVec<[String; 2]>,
        no_audio: bool,
    },
    /// Skeleton and atlas file names are relative to `path`.
    Spine {
        id: String,
        path: String,
        json_name: String,
        atlas_name: String,
    },
    Spritesheet {
        id: String,
        url: String,
        frame_width: u32,
        frame_height: u32,
    },
}

impl BulkItem {
    /// Registration for a resource, or `None` for fonts, packages, unknown
    /// types and records missing their type-specific parameters.
    pub fn from_record(record: &ResourceRecord) -> Option<BulkItem> {
        let id = record.id.clone();
        let url = record.path.clone();
        match record.kind {
            ResourceType::Audio => Some(BulkItem::Audio { id, url }),
            ResourceType::Image => Some(BulkItem::Image { id, url }),
            ResourceType::Json => Some(BulkItem::Json { id, url }),
            ResourceType::Video => Some(BulkItem::Video {
                id,
                urls: record.video_urls(),
                no_audio: record.video_no_audio(),
            }),
            ResourceType::Spine => match record.spine_files() {
                Some((json_name, atlas_name)) => Some(BulkItem::Spine {
                    id,
                    path: url,
                    json_name: json_name.to_string(),
                    atlas_name: atlas_name.to_string(),
                }),
                None => {
                    warn!("Spine {} has no skeleton/atlas names", record.id);
                    None
                }
            },
            ResourceType::Spritesheet => match record.frame_size() {
                Some((frame_width, frame_height)) => Some(BulkItem::Spritesheet {
                    id,
                    url,
                    frame_width,
                    frame_height,
                }),
                None => {
                    warn!("Spritesheet {} has no frame size", record.id);
                    None
                }
            },
            ResourceType::Font | ResourceType::Package | ResourceType::Unknown => None,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            BulkItem::Audio { id, .. }
            | BulkItem::Image { id, .. }
            | BulkItem::Json { id, .. }
            | BulkItem::Video { id, .. }
            | BulkItem::Spine { id, .. }
            | BulkItem::Spritesheet { id, .. } => id,
        }
    }
}

/// Loads registered items into the asset caches.
pub trait BulkLoader {
    /// Register one item for the next start.
    fn add(&mut self, item: BulkItem);

    /// Number of registered items not yet loaded.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Load every registered item, reporting progress after each one.
    ///
    /// The future resolves once, after the last item has been handled
    /// (loaded or failed); the queue is empty afterwards.
    fn start<'a>(
        &'a mut self,
        caches: &'a mut AssetCaches,
        on_progress: &'a mut dyn FnMut(f32),
    ) -> LocalBoxFuture<'a, ()>;
}

impl<B: BulkLoader + ?Sized> BulkLoader for &mut B {
    fn add(&mut self, item: BulkItem) {
        (**self).add(item)
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn start<'a>(
        &'a mut self,
        caches: &'a mut AssetCaches,
        on_progress: &'a mut dyn FnMut(f32),
    ) -> LocalBoxFuture<'a, ()> {
        (**self).start(caches, on_progress)
    }
}

/// Bulk loader reading items from an asset directory on disk.
#[derive(Debug)]
pub struct FsBulkLoader {
    root: PathBuf,
    queue: Vec<BulkItem>,
}

impl FsBulkLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsBulkLoader {
            root: root.into(),
            queue: Vec::new(),
        }
    }

    fn read(&self, url: &str) -> Result<Vec<u8>, String> {
        std::fs::read(resolve_url(&self.root, url)).map_err(|e| format!("{}: {}", url, e))
    }

    fn read_json(&self, url: &str) -> Result<Value, String> {
        let bytes = self.read(url)?;
        serde_json::from_slice(&bytes).map_err(|e| format!("{}: {}", url, e))
    }

    fn load_item(&self, item: &BulkItem, caches: &mut AssetCaches) -> Result<(), String> {
        match item {
            BulkItem::Audio { id, url } => caches.audio.add(id.clone(), self.read(url)?),
            BulkItem::Image { id, url } => caches.textures.add(
                id.clone(),
                TextureData {
                    bytes: self.read(url)?,
                    frame: None,
                },
            ),
            BulkItem::Json { id, url } => caches.json.add(id.clone(), self.read_json(url)?),
            BulkItem::Video { id, urls, no_audio } => {
                let sources = urls
                    .iter()
                    .map(|url| self.read(url))
                    .collect::<Result<Vec<_>, _>>()?;
                caches.video.add(
                    id.clone(),
                    VideoData {
                        sources,
                        no_audio: *no_audio,
                    },
                );
            }
            BulkItem::Spine {
                id,
                path,
                json_name,
                atlas_name,
            } => {
                let base = path.trim_end_matches('/');
                let skeleton = self.read_json(&format!("{}/{}", base, json_name))?;
                let atlas = self.read(&format!("{}/{}", base, atlas_name))?;
                caches.spine.add(
                    id.clone(),
                    SpineData {
                        skeleton,
                        atlas: String::from_utf8_lossy(&atlas).into_owned(),
                    },
                );
            }
            BulkItem::Spritesheet {
                id,
                url,
                frame_width,
                frame_height,
            } => caches.textures.add(
                id.clone(),
                TextureData {
                    bytes: self.read(url)?,
                    frame: Some((*frame_width, *frame_height)),
                },
            ),
        }
        Ok(())
    }
}

impl BulkLoader for FsBulkLoader {
    fn add(&mut self, item: BulkItem) {
        self.queue.push(item);
    }

    fn len(&self) -> usize {
        self.queue.len()
    }

    fn start<'a>(
        &'a mut self,
        caches: &'a mut AssetCaches,
        on_progress: &'a mut dyn FnMut(f32),
    ) -> LocalBoxFuture<'a, ()> {
        async move {
            let queue = std::mem::take(&mut self.queue);
            let total = queue.len();
            for (done, item) in queue.iter().enumerate() {
                match self.load_item(item, caches) {
                    Ok(()) => debug!("Loaded {}", item.id()),
                    Err(e) => warn!("Failed to load {}: {}", item.id(), e),
                }
                on_progress((done + 1) as f32 / total as f32);
            }
        }
        .boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::resourcerecord::ResourceCategory;
    use futures::executor::block_on;
    use smallvec::smallvec;

    #[test]
    fn test_from_record_by_type() {
        let font = ResourceRecord::new("f", ResourceCategory::Home, ResourceType::Font, "/f.ttf");
        assert_eq!(BulkItem::from_record(&font), None);

        let sheet = ResourceRecord::new("s", ResourceCategory::Home, ResourceType::Spritesheet, "/s.png")
            .with_param1(16)
            .with_param2(24);
        assert_eq!(
            BulkItem::from_record(&sheet),
            Some(BulkItem::Spritesheet {
                id: "s".to_string(),
                url: "/s.png".to_string(),
                frame_width: 16,
                frame_height: 24,
            })
        );

        let video = ResourceRecord::new("v", ResourceCategory::Home, ResourceType::Video, r#"["/a.webm","/a.mp4"]"#)
            .with_param1(true);
        assert_eq!(
            BulkItem::from_record(&video),
            Some(BulkItem::Video {
                id: "v".to_string(),
                urls: smallvec!["/a.webm".to_string(), "/a.mp4".to_string()],
                no_audio: true,
            })
        );
    }

    #[test]
    fn test_fs_bulk_loader_fills_caches_and_reports_progress() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("anim")).unwrap();
        std::fs::write(dir.path().join("a.mp3"), b"ID3").unwrap();
        std::fs::write(dir.path().join("b.json"), br#"{"x": 1}"#).unwrap();
        std::fs::write(dir.path().join("anim/hero.json"), br#"{"bones": []}"#).unwrap();
        std::fs::write(dir.path().join("anim/hero.atlas"), b"hero.png").unwrap();

        let mut loader = FsBulkLoader::new(dir.path());
        loader.add(BulkItem::Audio {
            id: "a".to_string(),
            url: "/a.mp3".to_string(),
        });
        loader.add(BulkItem::Json {
            id: "b".to_string(),
            url: "/b.json".to_string(),
        });
        loader.add(BulkItem::Image {
            id: "missing".to_string(),
            url: "/missing.png".to_string(),
        });
        loader.add(BulkItem::Spine {
            id: "hero".to_string(),
            path: "/anim".to_string(),
            json_name: "hero.json".to_string(),
            atlas_name: "hero.atlas".to_string(),
        });

        let mut caches = AssetCaches::new();
        let mut seen = Vec::new();
        block_on(loader.start(&mut caches, &mut |p| seen.push(p)));

        assert_eq!(seen, vec![0.25, 0.5, 0.75, 1.0]);
        assert!(loader.is_empty());
        assert_eq!(caches.audio.get("a").unwrap(), b"ID3");
        assert_eq!(caches.json.get("b").unwrap()["x"], 1);
        assert!(!caches.textures.has("missing"));
        assert_eq!(caches.spine.get("hero").unwrap().atlas, "hero.png");
    }
}
