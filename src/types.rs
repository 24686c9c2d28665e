//! Shared types used across all pipeline stages.
//!
//! These types are serialized to JSON between stages (scan → process → generate)
//! and are also the payload of the `catalog` command. Field names are camelCase
//! on the wire so the catalog reads the same to a browser script as it does to
//! the generator.

use serde::{Deserialize, Serialize};

/// One before/after comparison.
///
/// Both URLs are site-relative (`/input/kitchens/kitchen_1_before.jpg`),
/// never filesystem paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePair {
    /// `"<category>-<index>"`, unique within its set.
    pub id: String,
    pub before_src: String,
    pub after_src: String,
}

/// A named gallery of pairs: one per content subdirectory, plus the
/// synthetic "Main Gallery" for files in the content root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSet {
    /// Display name (the raw directory name).
    pub name: String,
    /// URL-safe identifier, unique within a catalog.
    pub slug: String,
    /// Markdown description from `description.md` or `description.txt`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ordered by category, then numeric index.
    pub pairs: Vec<ImagePair>,
}

/// A single image in gallery mode: an "after" shot, optionally linked to the
/// "before" shot it was generated from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImage {
    pub id: String,
    pub src: String,
    /// Source filename, used to derive the display title.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_src: Option<String>,
}

/// A subdirectory as seen by gallery mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GallerySet {
    pub name: String,
    pub slug: String,
    pub images: Vec<GalleryImage>,
}

/// Pixel dimensions probed during the process stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    /// Width over height, or `None` for a degenerate zero-height image.
    pub fn aspect_ratio(&self) -> Option<f64> {
        (self.height > 0).then(|| self.width as f64 / self.height as f64)
    }
}
