//! Filesystem scanning and catalog discovery.
//!
//! Stage 1 of the build pipeline. Lists the content directory, pairs
//! before/after images by filename and groups them into named sets.
//!
//! ## Directory Structure
//!
//! ```text
//! content/                         # Content root (published as /input)
//! ├── config.toml                  # Site configuration (optional)
//! ├── kitchen_1_before.jpg         # Root files → "Main Gallery" (slug "main")
//! ├── kitchen_1_after.jpg
//! ├── Living Rooms/                # Subdirectory → set "Living Rooms" (slug "living-rooms")
//! │   ├── description.md           # Set description (optional, .txt also accepted)
//! │   ├── sofa_1_before.png
//! │   ├── sofa_1_after.png
//! │   └── sofa_2_before.png        # No after image: ignored
//! └── .drafts/                     # Hidden: never scanned
//! ```
//!
//! Only one level of subdirectories is scanned; anything deeper is ignored.
//!
//! ## Ordering
//!
//! The main gallery comes first, followed by subdirectory sets sorted by
//! directory name. Within a set, pairs are ordered by category and then by
//! numeric index (`a-1`, `a-2`, `a-10`, `b-1`).
//!
//! ## Failure Handling
//!
//! Discovery never fails. An unreadable root yields an empty catalog, an
//! unreadable subdirectory contributes nothing, and files that do not follow
//! the naming convention or lack their other half are skipped. A set that
//! ends up without pairs is left out.
//!
//! ## Injected Filesystem
//!
//! Listing goes through the [`DirSource`] trait. [`FsSource`] reads the real
//! disk; [`MemorySource`] serves an in-memory tree so discovery can be
//! exercised without touching the filesystem.

use crate::config::{self, SiteConfig};
use crate::naming::{self, Side};
use crate::types::{GalleryImage, GallerySet, ImagePair, ImageSet};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Display name of the set built from files directly in the content root.
pub const MAIN_GALLERY_NAME: &str = "Main Gallery";
/// Slug of the set built from files directly in the content root.
pub const MAIN_GALLERY_SLUG: &str = "main";

/// Manifest output from the scan stage.
#[derive(Debug, Serialize, Deserialize)]
pub struct Manifest {
    /// Slider-mode catalog.
    pub sets: Vec<ImageSet>,
    /// Gallery-mode sets.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gallery: Vec<GallerySet>,
    pub config: SiteConfig,
}

// ============================================================================
// Directory sources
// ============================================================================

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Read-only view of a directory tree.
pub trait DirSource {
    /// List the entries directly inside `path`, in no particular order.
    fn list(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    /// Read a small text file (set descriptions).
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// [`DirSource`] backed by the real filesystem. Symlinks are followed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

impl DirSource for FsSource {
    fn list(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let entries = fs::read_dir(path)?
            .filter_map(|e| e.ok())
            .filter_map(|e| {
                let path = e.path();
                let is_dir = path.is_dir();
                // Broken symlinks and special files are neither; skip them.
                if !is_dir && !path.is_file() {
                    return None;
                }
                Some(DirEntry {
                    name: e.file_name().to_string_lossy().into_owned(),
                    is_dir,
                })
            })
            .collect();
        Ok(entries)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }
}

/// In-memory [`DirSource`]. Listings keep insertion order.
///
/// ```rust
/// use pair_gal::scan::{MemorySource, discover};
/// use std::path::Path;
///
/// let mut source = MemorySource::default();
/// source
///     .add_file("content/kitchen_1_before.jpg")
///     .add_file("content/kitchen_1_after.jpg");
/// let sets = discover(&source, Path::new("content"), "input");
/// assert_eq!(sets[0].pairs[0].id, "kitchen-1");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    listings: BTreeMap<PathBuf, Vec<DirEntry>>,
    texts: HashMap<PathBuf, String>,
}

impl MemorySource {
    /// Register an empty file, creating its parent directories.
    pub fn add_file(&mut self, path: impl AsRef<Path>) -> &mut Self {
        self.insert_entry(path.as_ref(), false);
        self
    }

    /// Register a file with text contents.
    pub fn add_text(&mut self, path: impl AsRef<Path>, contents: &str) -> &mut Self {
        let path = path.as_ref();
        self.insert_entry(path, false);
        self.texts.insert(path.to_path_buf(), contents.to_string());
        self
    }

    /// Register an empty directory.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) -> &mut Self {
        self.insert_entry(path.as_ref(), true);
        self
    }

    fn insert_entry(&mut self, path: &Path, is_dir: bool) {
        if is_dir {
            self.listings.entry(path.to_path_buf()).or_default();
        }
        let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
            return;
        };
        let name = name.to_string_lossy().into_owned();
        let listing = self.listings.entry(parent.to_path_buf()).or_default();
        if listing.iter().any(|e| e.name == name) {
            return;
        }
        listing.push(DirEntry { name, is_dir });
        if !parent.as_os_str().is_empty() {
            self.insert_entry(parent, true);
        }
    }
}

impl DirSource for MemorySource {
    fn list(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        self.listings.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such directory: {}", path.display()),
            )
        })
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.texts.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {}", path.display()),
            )
        })
    }
}

// ============================================================================
// Stage entry points
// ============================================================================

/// Scan the content root into a manifest: slider catalog, gallery sets and
/// the site configuration found next to them.
///
/// Only a broken `config.toml` is an error; a missing root produces an
/// empty manifest with default configuration.
pub fn scan(root: &Path) -> Result<Manifest, ScanError> {
    let config = config::load_config(root)?;
    let sets = discover(&FsSource, root, &config.root_alias);
    let gallery = discover_gallery(&FsSource, root, &config.root_alias);
    Ok(Manifest {
        sets,
        gallery,
        config,
    })
}

/// The catalog for a directory on disk: every set, in display order.
pub fn image_sets(root: &Path, alias: &str) -> Vec<ImageSet> {
    discover(&FsSource, root, alias)
}

/// Build the slider-mode catalog from `root`, publishing images under `/<alias>`.
pub fn discover(source: &impl DirSource, root: &Path, alias: &str) -> Vec<ImageSet> {
    let Ok(entries) = source.list(root) else {
        return Vec::new();
    };
    let (files, dirs) = partition_entries(entries);

    let mut sets = Vec::new();

    let root_pairs = pair_files(&files, &root_base_path(alias));
    if !root_pairs.is_empty() {
        sets.push(ImageSet {
            name: MAIN_GALLERY_NAME.to_string(),
            slug: MAIN_GALLERY_SLUG.to_string(),
            description: read_description(source, root),
            pairs: root_pairs,
        });
    }

    for dir in dirs {
        let dir_path = root.join(&dir);
        let Some(files) = list_files(source, &dir_path) else {
            continue;
        };
        let pairs = pair_files(&files, &set_base_path(alias, &dir));
        if pairs.is_empty() {
            continue;
        }
        sets.push(ImageSet {
            slug: naming::slugify(&dir),
            description: read_description(source, &dir_path),
            name: dir,
            pairs,
        });
    }

    disambiguate_slugs(sets.iter_mut().map(|s| &mut s.slug));
    sets
}

/// Build the gallery-mode sets: every non-`before` image in each
/// subdirectory, linked to its before image when one can be found.
///
/// Files in the content root are not part of gallery mode.
pub fn discover_gallery(source: &impl DirSource, root: &Path, alias: &str) -> Vec<GallerySet> {
    let Ok(entries) = source.list(root) else {
        return Vec::new();
    };
    let (_, dirs) = partition_entries(entries);

    let mut sets = Vec::new();
    for dir in dirs {
        let Some(files) = list_files(source, &root.join(&dir)) else {
            continue;
        };
        let base = set_base_path(alias, &dir);
        let images: Vec<GalleryImage> = files
            .iter()
            .filter(|f| naming::is_gallery_image(f))
            .enumerate()
            .map(|(position, file)| GalleryImage {
                id: format!("{}-{}", dir, position),
                src: file_url(&base, file),
                name: file.clone(),
                before_src: find_before_file(file, &files).map(|b| file_url(&base, b)),
            })
            .collect();
        if images.is_empty() {
            continue;
        }
        sets.push(GallerySet {
            slug: naming::slugify(&dir),
            name: dir,
            images,
        });
    }

    disambiguate_slugs(sets.iter_mut().map(|s| &mut s.slug));
    sets
}

// ============================================================================
// Pairing
// ============================================================================

/// Both halves of a pair as far as they have been found.
#[derive(Debug, Default)]
struct PartialPair {
    id: String,
    before: Option<String>,
    after: Option<String>,
}

/// Pair comparison files from one directory.
///
/// `base_path` is the URL the directory is published under; each source URL
/// is `base_path` + `/` + the percent-encoded filename. Files are processed in
/// the given order, so when two files claim the same category, index and side
/// the later one wins. Incomplete pairs are dropped and the rest are ordered
/// by category, then index.
pub fn pair_files<S: AsRef<str>>(files: &[S], base_path: &str) -> Vec<ImagePair> {
    // Keyed by (category, index): BTreeMap order is exactly the display order.
    let mut records: BTreeMap<(String, u64), PartialPair> = BTreeMap::new();

    for file in files {
        let file = file.as_ref();
        let Some(parsed) = naming::parse_pair_name(file) else {
            continue;
        };
        let id = parsed.pair_id();
        let record = records.entry((parsed.category, parsed.index)).or_default();
        record.id = id;
        let url = file_url(base_path, file);
        match parsed.side {
            Side::Before => record.before = Some(url),
            Side::After => record.after = Some(url),
        }
    }

    records
        .into_iter()
        .filter_map(|(_, record)| {
            Some(ImagePair {
                id: record.id,
                before_src: record.before?,
                after_src: record.after?,
            })
        })
        .collect()
}

/// Find the before image for a gallery after-image among its siblings.
fn find_before_file<'a>(after_file: &str, files: &'a [String]) -> Option<&'a str> {
    naming::before_candidates(after_file)
        .iter()
        .find_map(|candidate| {
            let wanted = candidate.to_lowercase();
            files.iter().find(|f| f.to_lowercase() == wanted)
        })
        .map(String::as_str)
}

// ============================================================================
// URLs
// ============================================================================

fn root_base_path(alias: &str) -> String {
    format!("/{}", alias)
}

fn set_base_path(alias: &str, dir: &str) -> String {
    format!("/{}/{}", alias, urlencoding::encode(dir))
}

fn file_url(base_path: &str, file: &str) -> String {
    format!("{}/{}", base_path, urlencoding::encode(file))
}

/// Map a published image URL back to its file under `root`.
///
/// Inverse of the URLs built during discovery: `/<alias>/<file>` or
/// `/<alias>/<dir>/<file>`, each segment percent-encoded. Anything else,
/// including segments that would escape the root, yields `None`.
pub fn resolve_source(root: &Path, alias: &str, url: &str) -> Option<PathBuf> {
    let rest = url
        .strip_prefix('/')?
        .strip_prefix(alias)?
        .strip_prefix('/')?;
    let segments: Vec<&str> = rest.split('/').collect();
    if segments.len() > 2 {
        return None;
    }

    let mut path = root.to_path_buf();
    for segment in segments {
        let decoded = urlencoding::decode(segment).ok()?;
        if decoded.is_empty()
            || decoded == "."
            || decoded == ".."
            || decoded.contains(['/', '\\'])
        {
            return None;
        }
        path.push(decoded.as_ref());
    }
    Some(path)
}

// ============================================================================
// Helpers
// ============================================================================

/// Split a listing into sorted file names and sorted, non-hidden directory names.
fn partition_entries(entries: Vec<DirEntry>) -> (Vec<String>, Vec<String>) {
    let (dirs, files): (Vec<DirEntry>, Vec<DirEntry>) =
        entries.into_iter().partition(|e| e.is_dir);
    let mut files: Vec<String> = files.into_iter().map(|e| e.name).collect();
    let mut dirs: Vec<String> = dirs
        .into_iter()
        .map(|e| e.name)
        .filter(|name| !name.starts_with('.'))
        .collect();
    files.sort();
    dirs.sort();
    (files, dirs)
}

/// Sorted file names directly inside `dir`, or `None` if it cannot be listed.
fn list_files(source: &impl DirSource, dir: &Path) -> Option<Vec<String>> {
    let entries = source.list(dir).ok()?;
    let (files, _) = partition_entries(entries);
    Some(files)
}

/// Read `description.md` (preferred) or `description.txt` from a set directory.
fn read_description(source: &impl DirSource, dir: &Path) -> Option<String> {
    ["description.md", "description.txt"]
        .iter()
        .find_map(|name| source.read_to_string(&dir.join(name)).ok())
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
}

/// Slugs that name files the generator writes next to the set directories.
const RESERVED_SLUGS: &[&str] = &["index.html"];

/// Make slugs unique in catalog order by suffixing repeats with `-2`, `-3`, ...
/// Reserved slugs count as taken from the start.
fn disambiguate_slugs<'a>(slugs: impl IntoIterator<Item = &'a mut String>) {
    let mut taken: HashSet<String> = RESERVED_SLUGS.iter().map(|s| s.to_string()).collect();
    for slug in slugs {
        if taken.contains(slug.as_str()) {
            let mut n = 2;
            while taken.contains(&format!("{}-{}", slug, n)) {
                n += 1;
            }
            *slug = format!("{}-{}", slug, n);
        }
        taken.insert(slug.clone());
    }
}
