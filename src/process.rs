//! Image staging.
//!
//! Stage 2 of the build pipeline. Takes the manifest from the scan stage,
//! copies every image it references into the processed directory under the
//! URL it will be served from, and probes each copy for its dimensions.
//!
//! ## Output Structure
//!
//! ```text
//! processed/
//! ├── manifest.json                  # Scan manifest + probed dimensions
//! └── input/                         # root_alias
//!     ├── kitchen_1_before.jpg       # Main Gallery files
//!     ├── kitchen_1_after.jpg
//!     └── Living Rooms/
//!         ├── sofa_1_before.png
//!         └── sofa_1_after.png
//! ```
//!
//! Staged files keep their names, so a site-relative URL such as
//! `/input/Living%20Rooms/sofa_1_before.png` resolves to the same relative
//! path under both `processed/` and the final output directory.
//!
//! ## Dimensions
//!
//! Dimensions are recorded per URL. A file that cannot be probed (truncated,
//! unsupported codec) is still staged; it is simply absent from the
//! dimensions table and reported as such in the progress output.
//!
//! ## Parallel Processing
//!
//! Images are staged in parallel using [rayon](https://docs.rs/rayon), one set
//! at a time so progress output stays grouped by set.

use crate::config::SiteConfig;
use crate::imaging::{ImageProbe, RustProbe};
use crate::scan::{self, Manifest};
use crate::types::{Dimensions, GallerySet, ImageSet};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Source image not found: {0}")]
    SourceNotFound(PathBuf),
    #[error("Image URL does not map into the content root: {0}")]
    InvalidUrl(String),
}

/// Output manifest (after processing).
#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessedManifest {
    pub sets: Vec<ImageSet>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gallery: Vec<GallerySet>,
    /// Probed dimensions keyed by image URL.
    #[serde(default)]
    pub dimensions: BTreeMap<String, Dimensions>,
    pub config: SiteConfig,
}

impl ProcessedManifest {
    /// Width over height for an image URL, when it was probed successfully.
    pub fn aspect_ratio(&self, url: &str) -> Option<f64> {
        self.dimensions.get(url).and_then(Dimensions::aspect_ratio)
    }
}

/// Progress events emitted while staging.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    /// A set is about to be staged. `image_count` excludes images already
    /// staged for an earlier set.
    SetStarted { name: String, image_count: usize },
    /// One image was copied into place.
    ImageStaged {
        /// 1-based position within the set.
        index: usize,
        /// Path relative to the content root.
        source_path: String,
        /// `None` when the file could not be probed.
        dimensions: Option<Dimensions>,
    },
}

pub fn process(
    manifest_path: &Path,
    source_root: &Path,
    output_dir: &Path,
    progress: Option<Sender<ProcessEvent>>,
) -> Result<ProcessedManifest, ProcessError> {
    process_with_probe(&RustProbe::new(), manifest_path, source_root, output_dir, progress)
}

/// Stage images using a specific probe (allows testing with mock).
pub fn process_with_probe(
    probe: &impl ImageProbe,
    manifest_path: &Path,
    source_root: &Path,
    output_dir: &Path,
    progress: Option<Sender<ProcessEvent>>,
) -> Result<ProcessedManifest, ProcessError> {
    let manifest_content = fs::read_to_string(manifest_path)?;
    let input: Manifest = serde_json::from_str(&manifest_content)?;
    let alias = input.config.root_alias.clone();

    // Start from an empty staging tree so removed images do not linger.
    let staged_root = output_dir.join(&alias);
    if staged_root.exists() {
        fs::remove_dir_all(&staged_root)?;
    }
    fs::create_dir_all(&staged_root)?;

    let mut seen: HashSet<&str> = HashSet::new();
    let mut dimensions = BTreeMap::new();

    for (name, urls) in staging_groups(&input) {
        let urls: Vec<&str> = urls.into_iter().filter(|u| seen.insert(*u)).collect();
        if urls.is_empty() {
            continue;
        }
        if let Some(tx) = &progress {
            tx.send(ProcessEvent::SetStarted {
                name,
                image_count: urls.len(),
            })
            .ok();
        }

        let staged: Vec<(&str, Option<Dimensions>)> = urls
            .par_iter()
            .enumerate()
            .map(|(i, url)| {
                let source = scan::resolve_source(source_root, &alias, url)
                    .ok_or_else(|| ProcessError::InvalidUrl(url.to_string()))?;
                let dest = scan::resolve_source(&staged_root, &alias, url)
                    .ok_or_else(|| ProcessError::InvalidUrl(url.to_string()))?;
                let dims = stage_image(probe, &source, &dest)?;

                if let Some(tx) = &progress {
                    let source_path = source
                        .strip_prefix(source_root)
                        .unwrap_or(&source)
                        .to_string_lossy()
                        .into_owned();
                    tx.send(ProcessEvent::ImageStaged {
                        index: i + 1,
                        source_path,
                        dimensions: dims,
                    })
                    .ok();
                }
                Ok((*url, dims))
            })
            .collect::<Result<Vec<_>, ProcessError>>()?;

        for (url, dims) in staged {
            if let Some(dims) = dims {
                dimensions.insert(url.to_string(), dims);
            }
        }
    }

    Ok(ProcessedManifest {
        sets: input.sets,
        gallery: input.gallery,
        dimensions,
        config: input.config,
    })
}

/// Every image URL the site will reference, grouped by the set that first
/// shows it: slider sets in catalog order, then gallery sets.
fn staging_groups(manifest: &Manifest) -> Vec<(String, Vec<&str>)> {
    let slider = manifest.sets.iter().map(|set| {
        let urls = set
            .pairs
            .iter()
            .flat_map(|p| [p.before_src.as_str(), p.after_src.as_str()])
            .collect();
        (set.name.clone(), urls)
    });
    let gallery = manifest.gallery.iter().map(|set| {
        let urls = set
            .images
            .iter()
            .flat_map(|img| std::iter::once(img.src.as_str()).chain(img.before_src.as_deref()))
            .collect();
        (format!("{} (gallery)", set.name), urls)
    });
    slider.chain(gallery).collect()
}

/// Copy one image into the staging tree and probe the copy.
fn stage_image(
    probe: &impl ImageProbe,
    source: &Path,
    dest: &Path,
) -> Result<Option<Dimensions>, ProcessError> {
    if !source.is_file() {
        return Err(ProcessError::SourceNotFound(source.to_path_buf()));
    }
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(source, dest)?;
    Ok(probe.identify(dest).ok())
}
