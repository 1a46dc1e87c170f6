//! Asset discovery inside layout JSON files.
//!
//! Layout files describe views; the assets they use are referenced by
//! string values under a closed set of key names. [`LayoutScanner`] walks an
//! arbitrary JSON document depth-first and turns each referenced string into
//! a derived [`ResourceRecord`] inheriting the layout's category.
//!
//! | Keys | Produces |
//! |---|---|
//! | `fontFamily` | FONT at `<font_base>/<name>.ttf`, `param1 = name` |
//! | `spine`, `spines` | SPINE at `<internal_root>/<dir>`, `param1 = <file>.json`, `param2 = <file>.atlas` |
//! | `se`, `ses`, `key`, texture and layout lists | typed by file extension |
//!
//! Extension inference: `.png`/`.jpg`/`.jpeg` → IMAGE, `.json` → JSON
//! flagged as a layout (`param1 = true`), `.mp3` → AUDIO. Anything else
//! under a recognised key is ignored.

use serde_json::Value;

use crate::resources::resourcerecord::{ResourceCategory, ResourceRecord, ResourceType};

const AUDIO_KEYS: &[&str] = &["se", "ses"];
const FONT_KEYS: &[&str] = &["fontFamily"];
const IMAGE_KEYS: &[&str] = &[
    "key",
    "avatarTextureNone",
    "avatarTextures",
    "selectedAvatarTextures",
    "avatarBgTextures",
    "bgTextures",
    "bulletTextures",
    "boxLayout",
    "bubbleLayout",
    "coverTextures",
    "fgTextures",
    "iconTextures",
    "maskTextures",
    "nameBgTextures",
    "rankTextures",
    "starTextures",
    "tagTextures",
    "highlightTagTextures",
    "betEffectTextures",
    "betStarTextures",
    "effectTexture",
    "textures",
    "soundTextures",
    "playTextures",
    "checkTextures",
    "nextTextures",
    "normalTextures",
    "hoverTextures",
    "disabledTextures",
    "titleTextures",
];
const JSON_KEYS: &[&str] = &[
    "key",
    "infoLayouts",
    "questionLayouts",
    "itemLayout",
    "itemLayouts",
    "optionLayout",
    "optionLayouts",
    "textLayout",
    "effectLayout",
];
const SPINE_KEYS: &[&str] = &["spine", "spines"];

/// How a string under a recognised key becomes a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Font,
    Spine,
    /// Typed by the file extension of the value.
    ByExtension,
}

impl KeyKind {
    /// Classify a layout key; `None` for keys that are only walked through.
    pub fn of(key: &str) -> Option<KeyKind> {
        if FONT_KEYS.contains(&key) {
            Some(KeyKind::Font)
        } else if SPINE_KEYS.contains(&key) {
            Some(KeyKind::Spine)
        } else if AUDIO_KEYS.contains(&key) || IMAGE_KEYS.contains(&key) || JSON_KEYS.contains(&key)
        {
            Some(KeyKind::ByExtension)
        } else {
            None
        }
    }
}

/// Asset type implied by a file name, with the layout flag for JSON.
pub fn type_from_extension(name: &str) -> Option<(ResourceType, bool)> {
    let (_, ext) = name.rsplit_once('.')?;
    match ext {
        "png" | "jpg" | "jpeg" => Some((ResourceType::Image, false)),
        "json" => Some((ResourceType::Json, true)),
        "mp3" => Some((ResourceType::Audio, false)),
        _ => None,
    }
}

/// Derives resource records from layout documents.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutScanner {
    internal_root: String,
    font_base: String,
}

impl LayoutScanner {
    pub fn new(internal_root: impl Into<String>, font_base: impl Into<String>) -> Self {
        LayoutScanner {
            internal_root: internal_root.into(),
            font_base: font_base.into(),
        }
    }

    /// Collect every asset referenced by `layout`, in document order.
    ///
    /// The result may contain repeated ids when a layout references the same
    /// asset twice; merging is the extractor's job.
    pub fn scan(&self, layout: &Value, category: ResourceCategory) -> Vec<ResourceRecord> {
        let mut found = Vec::new();
        self.walk(layout, category, &mut found);
        found
    }

    fn walk(&self, value: &Value, category: ResourceCategory, found: &mut Vec<ResourceRecord>) {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    match KeyKind::of(key) {
                        Some(kind) => self.collect(kind, child, category, found),
                        None => self.walk(child, category, found),
                    }
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.walk(item, category, found);
                }
            }
            _ => {}
        }
    }

    fn collect(
        &self,
        kind: KeyKind,
        value: &Value,
        category: ResourceCategory,
        found: &mut Vec<ResourceRecord>,
    ) {
        match value {
            Value::String(name) => found.extend(self.derive(kind, name, category)),
            Value::Array(items) => {
                for item in items {
                    self.collect(kind, item, category, found);
                }
            }
            Value::Object(_) => self.walk(value, category, found),
            _ => {}
        }
    }

    /// Build the record a single referenced string stands for.
    pub fn derive(&self, kind: KeyKind, name: &str, category: ResourceCategory) -> Option<ResourceRecord> {
        match kind {
            KeyKind::Font => {
                let path = format!("{}/{}.ttf", self.font_base.trim_end_matches('/'), name);
                Some(ResourceRecord::new(name, category, ResourceType::Font, path).with_param1(name))
            }
            KeyKind::Spine => {
                let (dir, file) = name.rsplit_once('/').unwrap_or(("", name));
                Some(
                    ResourceRecord::new(name, category, ResourceType::Spine, self.internal_path(dir))
                        .with_param1(format!("{}.json", file))
                        .with_param2(format!("{}.atlas", file)),
                )
            }
            KeyKind::ByExtension => {
                let (kind, layout) = type_from_extension(name)?;
                let record = ResourceRecord::new(name, category, kind, self.internal_path(name));
                Some(if layout { record.with_param1(true) } else { record })
            }
        }
    }

    fn internal_path(&self, relative: &str) -> String {
        format!("{}/{}", self.internal_root.trim_end_matches('/'), relative)
    }
}
