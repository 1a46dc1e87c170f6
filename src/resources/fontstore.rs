//! Font store resource.
//!
//! Stores decoded font faces keyed by family name. The font loader registers
//! a face here once it has been read and recognised; text views later refer
//! to fonts by family.

use bevy_ecs::prelude::Resource;
use rustc_hash::FxHashMap;

/// Container format recognised from a font file's signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFormat {
    TrueType,
    OpenType,
    Woff,
    Woff2,
}

impl FontFormat {
    /// Detect the format from the first four bytes of a font file.
    pub fn sniff(bytes: &[u8]) -> Option<FontFormat> {
        match bytes.get(..4)? {
            [0x00, 0x01, 0x00, 0x00] | b"true" => Some(FontFormat::TrueType),
            b"OTTO" => Some(FontFormat::OpenType),
            b"wOFF" => Some(FontFormat::Woff),
            b"wOF2" => Some(FontFormat::Woff2),
            _ => None,
        }
    }
}

/// A decoded font face.
#[derive(Debug, Clone)]
pub struct FontFace {
    pub family: String,
    pub url: String,
    pub format: FontFormat,
    pub data: Vec<u8>,
}

/// Map of font family names to loaded faces.
#[derive(Resource, Debug, Default)]
pub struct FontStore {
    fonts: FxHashMap<String, FontFace>,
}

impl FontStore {
    /// Create an empty font store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a face under its family name, replacing any previous face.
    pub fn add(&mut self, face: FontFace) {
        self.fonts.insert(face.family.clone(), face);
    }

    /// Get a face by family name.
    pub fn get(&self, family: impl AsRef<str>) -> Option<&FontFace> {
        self.fonts.get(family.as_ref())
    }

    /// Remove all loaded fonts.
    pub fn clear(&mut self) {
        self.fonts.clear();
    }

    /// Get the number of loaded fonts.
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_signatures() {
        assert_eq!(FontFormat::sniff(&[0, 1, 0, 0, 9]), Some(FontFormat::TrueType));
        assert_eq!(FontFormat::sniff(b"OTTO...."), Some(FontFormat::OpenType));
        assert_eq!(FontFormat::sniff(b"wOFF"), Some(FontFormat::Woff));
        assert_eq!(FontFormat::sniff(b"wOF2"), Some(FontFormat::Woff2));
        assert_eq!(FontFormat::sniff(b"PK\x03\x04"), None);
        assert_eq!(FontFormat::sniff(b"ab"), None);
    }

    #[test]
    fn test_add_replaces_same_family() {
        let mut store = FontStore::new();
        for url in ["/a.ttf", "/b.ttf"] {
            store.add(FontFace {
                family: "Roboto".to_string(),
                url: url.to_string(),
                format: FontFormat::TrueType,
                data: vec![0, 1, 0, 0],
            });
        }
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("Roboto").unwrap().url, "/b.ttf");
    }
}
