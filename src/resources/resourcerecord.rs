//! Resource records and their category/type tags.
//!
//! A [`ResourceRecord`] is one manifest entry: an identifier, the scene
//! category it belongs to, the loading mechanism (`type`), a path and two
//! type-dependent auxiliary parameters. Records travel as JSON objects of the
//! shape `{id, category, type, path, param1?, param2?}`.
//!
//! Unknown `category`/`type` strings are accepted and mapped to the
//! `Unknown` variants; loaders simply skip what they do not understand.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::{SmallVec, smallvec};

/// Anything stored in a [`RecordStore`](crate::resources::recordstore::RecordStore).
pub trait Record {
    /// Identifier unique within one store.
    fn id(&self) -> &str;
}

/// Scene category a resource is loaded for.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResourceCategory {
    #[serde(rename = "BOOT")]
    Boot,
    /// Common resource that is already loaded at boot time.
    #[serde(rename = "BOOT_COMMON")]
    BootCommon,
    #[serde(rename = "COMMON")]
    Common,
    #[serde(rename = "HOME")]
    Home,
    #[serde(rename = "PLAY")]
    Play,
    #[serde(rename = "TEAM-SELECT")]
    TeamSelect,
    #[serde(rename = "TIME-SELECT")]
    TimeSelect,
    #[serde(rename = "MODE-SELECT")]
    ModeSelect,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ResourceCategory {
    /// Merge two categories claimed by the same resource id.
    ///
    /// `BOOT_COMMON` dominates; any other disagreement becomes `COMMON`.
    /// Equal categories are returned unchanged.
    pub fn merge(self, other: ResourceCategory) -> ResourceCategory {
        if self == other {
            self
        } else if self == ResourceCategory::BootCommon || other == ResourceCategory::BootCommon {
            ResourceCategory::BootCommon
        } else {
            ResourceCategory::Common
        }
    }

    /// Parse the wire name (`"TEAM-SELECT"`, `"BOOT_COMMON"`, ...).
    pub fn from_name(name: &str) -> Option<ResourceCategory> {
        match serde_json::from_value(Value::String(name.to_string())) {
            Ok(ResourceCategory::Unknown) | Err(_) => None,
            Ok(category) => Some(category),
        }
    }
}

/// Loading mechanism of a resource.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceType {
    Audio,
    Video,
    Image,
    Json,
    Spine,
    Font,
    Package,
    Spritesheet,
    #[default]
    #[serde(other)]
    Unknown,
}

/// One manifest entry.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ResourceRecord {
    pub id: String,
    #[serde(default)]
    pub category: ResourceCategory,
    #[serde(rename = "type", default)]
    pub kind: ResourceType,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub param1: Option<Value>,
    #[serde(default)]
    pub param2: Option<Value>,
}

impl Record for ResourceRecord {
    fn id(&self) -> &str {
        &self.id
    }
}

impl ResourceRecord {
    /// Create a record without auxiliary parameters.
    pub fn new(
        id: impl Into<String>,
        category: ResourceCategory,
        kind: ResourceType,
        path: impl Into<String>,
    ) -> Self {
        ResourceRecord {
            id: id.into(),
            category,
            kind,
            path: path.into(),
            param1: None,
            param2: None,
        }
    }

    pub fn with_param1(mut self, value: impl Into<Value>) -> Self {
        self.param1 = Some(value.into());
        self
    }

    pub fn with_param2(mut self, value: impl Into<Value>) -> Self {
        self.param2 = Some(value.into());
        self
    }

    /// A JSON record whose `param1` is literally `true` is a layout that has
    /// to be scanned for embedded asset references.
    pub fn is_layout(&self) -> bool {
        self.kind == ResourceType::Json && matches!(self.param1, Some(Value::Bool(true)))
    }

    /// Font family name of a FONT record.
    pub fn font_family(&self) -> Option<&str> {
        self.param1.as_ref().and_then(Value::as_str)
    }

    /// Skeleton and atlas file names of a SPINE record.
    pub fn spine_files(&self) -> Option<(&str, &str)> {
        let json = self.param1.as_ref().and_then(Value::as_str)?;
        let atlas = self.param2.as_ref().and_then(Value::as_str)?;
        Some((json, atlas))
    }

    /// Frame width and height of a SPRITESHEET record.
    ///
    /// Spreadsheet-authored manifests sometimes carry the numbers as strings.
    pub fn frame_size(&self) -> Option<(u32, u32)> {
        let width = value_as_u32(self.param1.as_ref()?)?;
        let height = value_as_u32(self.param2.as_ref()?)?;
        Some((width, height))
    }

    /// Source list of a VIDEO record: either a plain path or a JSON-encoded
    /// array of paths.
    pub fn video_urls(&self) -> SmallVec<[String; 2]> {
        if self.path.trim_start().starts_with('[') {
            if let Ok(urls) = serde_json::from_str::<Vec<String>>(&self.path) {
                return SmallVec::from_vec(urls);
            }
        }
        smallvec![self.path.clone()]
    }

    /// VIDEO `param1` flag: load without the audio track.
    pub fn video_no_audio(&self) -> bool {
        matches!(self.param1, Some(Value::Bool(true)))
    }
}

fn value_as_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
