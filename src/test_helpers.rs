//! Shared test utilities for the pair-gal test suite.
//!
//! Provides fixture builders and lookup helpers that work with catalog data
//! (`ImageSet`, `ImagePair`).
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = content_tree(&[
//!     "kitchen_1_before.jpg",
//!     "kitchen_1_after.jpg",
//!     "Living Rooms/sofa_1_before.png",
//!     "Living Rooms/sofa_1_after.png",
//! ]);
//! let manifest = scan(tmp.path()).unwrap();
//!
//! assert_eq!(set_names(&manifest.sets), vec!["Main Gallery", "Living Rooms"]);
//! assert_eq!(pair_ids(find_set(&manifest.sets, "living-rooms")), vec!["sofa-1"]);
//! ```

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::types::{ImagePair, ImageSet};

// =========================================================================
// Fixture setup
// =========================================================================

/// Create a content directory holding the given relative paths.
///
/// Files get placeholder bytes; they are only listed and copied, never
/// decoded, unless a test writes real image data over them.
pub fn content_tree(files: &[&str]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_files(tmp.path(), files);
    tmp
}

/// Write placeholder files under `root`, creating parent directories.
pub fn write_files(root: &Path, files: &[&str]) {
    for file in files {
        let path = root.join(file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, b"placeholder").unwrap();
    }
}

/// Build a set in memory from pair ids like `"a-1"`.
///
/// Each pair gets `/input/<category>_<index>_before.jpg` and the matching
/// after URL.
pub fn make_set(name: &str, slug: &str, ids: &[&str]) -> ImageSet {
    let pairs = ids
        .iter()
        .map(|id| {
            let (category, index) = id.rsplit_once('-').unwrap();
            ImagePair {
                id: id.to_string(),
                before_src: format!("/input/{category}_{index}_before.jpg"),
                after_src: format!("/input/{category}_{index}_after.jpg"),
            }
        })
        .collect();
    ImageSet {
        name: name.to_string(),
        slug: slug.to_string(),
        description: None,
        pairs,
    }
}

// =========================================================================
// Catalog lookups: panics with a clear message on miss
// =========================================================================

/// Find a set by slug. Panics if not found.
pub fn find_set<'a>(sets: &'a [ImageSet], slug: &str) -> &'a ImageSet {
    sets.iter().find(|s| s.slug == slug).unwrap_or_else(|| {
        let slugs: Vec<&str> = sets.iter().map(|s| s.slug.as_str()).collect();
        panic!("set '{slug}' not found. Available: {slugs:?}")
    })
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// Set display names in catalog order.
pub fn set_names(sets: &[ImageSet]) -> Vec<&str> {
    sets.iter().map(|s| s.name.as_str()).collect()
}

/// Pair ids of a set in display order.
pub fn pair_ids(set: &ImageSet) -> Vec<&str> {
    set.pairs.iter().map(|p| p.id.as_str()).collect()
}
