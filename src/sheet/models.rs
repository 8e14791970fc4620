//! Sheet and track data models.
//!
//! The persisted JSON keeps the camelCase field names (`coverImg`,
//! `musicList`) of the data this manager replaces, so existing store
//! content loads unchanged.

use serde::{Deserialize, Serialize};

/// A playable track belonging to one or more sheets.
///
/// Identity is the `(platform, id)` pair; every other field is display
/// metadata. `artwork` doubles as the source for sheet cover derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MusicItem {
    /// Source platform the track was resolved from.
    pub platform: String,
    /// Track id, unique within its platform.
    pub id: String,
    pub title: String,
    pub artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artwork: Option<String>,
}

/// Whether two track records denote the same underlying track.
///
/// Pure, symmetric and reflexive; compares identity fields only, so two
/// records with different display metadata can still be the same track.
pub fn same_music_item(a: &MusicItem, b: &MusicItem) -> bool {
    a.platform == b.platform && a.id == b.id
}

/// Sheet metadata as kept in the cached metadata list and persisted
/// under the sheets storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetItemBase {
    /// Unique, stable for the sheet's lifetime.
    pub id: String,
    pub title: String,
    /// Derived artwork: the last added track's artwork, absent when the
    /// sheet is empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_img: Option<String>,
}

/// A sheet with its track list attached, as produced by the view
/// projection. Never aliases the cache's internal containers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetItem {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_img: Option<String>,
    #[serde(default)]
    pub music_list: Vec<MusicItem>,
}

impl SheetItem {
    pub fn from_base(base: SheetItemBase, music_list: Vec<MusicItem>) -> Self {
        Self {
            id: base.id,
            title: base.title,
            cover_img: base.cover_img,
            music_list,
        }
    }
}

/// Partial metadata patch applied by the update-and-save primitive.
///
/// A `None` field leaves the sheet's value untouched; `cover_img` carries
/// a full replacement so a patch can also clear the cover. The sheet id
/// is never patchable.
#[derive(Debug, Clone, Default)]
pub struct SheetPatch {
    pub title: Option<String>,
    pub cover_img: Option<Option<String>>,
}

impl SheetPatch {
    /// Patch that only replaces the derived cover.
    pub fn cover(cover_img: Option<String>) -> Self {
        Self {
            title: None,
            cover_img: Some(cover_img),
        }
    }

    pub fn apply_to(&self, sheet: &mut SheetItemBase) {
        if let Some(title) = &self.title {
            sheet.title = title.clone();
        }
        if let Some(cover_img) = &self.cover_img {
            sheet.cover_img = cover_img.clone();
        }
    }
}
