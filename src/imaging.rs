//! Image probing.
//!
//! The process stage only needs to know how large each staged image is, so
//! the comparison frame can reserve the right aspect ratio before the image
//! loads. Probing reads headers only; nothing is decoded.
//!
//! | Format | Reader |
//! |---|---|
//! | JPEG, PNG, WebP | `image::image_dimensions` |
//! | AVIF | `avif-parse` container metadata |
//!
//! The [`ImageProbe`] trait is the seam the process stage is written
//! against; tests substitute a probe that returns canned dimensions.

use crate::types::Dimensions;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImagingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Probe failed: {0}")]
    ProbeFailed(String),
}

/// Reads pixel dimensions from an image file.
///
/// `Sync` so one probe can be shared across rayon workers.
pub trait ImageProbe: Sync {
    fn identify(&self, path: &Path) -> Result<Dimensions, ImagingError>;
}

/// Pure Rust probe backed by the `image` and `avif-parse` crates.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustProbe;

impl RustProbe {
    pub fn new() -> Self {
        Self
    }
}

fn is_avif(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("avif"))
}

/// Extract dimensions from an AVIF file's container metadata.
fn identify_avif(path: &Path) -> Result<Dimensions, ImagingError> {
    let file_data = std::fs::read(path)?;
    let avif = avif_parse::read_avif(&mut std::io::Cursor::new(&file_data)).map_err(|e| {
        ImagingError::ProbeFailed(format!("Failed to parse AVIF {}: {e:?}", path.display()))
    })?;
    let meta = avif.primary_item_metadata().map_err(|e| {
        ImagingError::ProbeFailed(format!(
            "Failed to read AVIF metadata {}: {e:?}",
            path.display()
        ))
    })?;
    Ok(Dimensions {
        width: meta.max_frame_width.get(),
        height: meta.max_frame_height.get(),
    })
}

impl ImageProbe for RustProbe {
    fn identify(&self, path: &Path) -> Result<Dimensions, ImagingError> {
        if is_avif(path) {
            return identify_avif(path);
        }
        let (width, height) = image::image_dimensions(path).map_err(|e| {
            ImagingError::ProbeFailed(format!(
                "Failed to read dimensions of {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(Dimensions { width, height })
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Probe that answers from a filename → dimensions table and records
    /// every path it was asked about. Unknown files fail to probe.
    #[derive(Default)]
    pub struct MockProbe {
        pub dimensions: HashMap<String, Dimensions>,
        pub probed: Mutex<Vec<String>>,
    }

    impl MockProbe {
        pub fn with_dimensions(entries: &[(&str, u32, u32)]) -> Self {
            Self {
                dimensions: entries
                    .iter()
                    .map(|(name, width, height)| {
                        (
                            name.to_string(),
                            Dimensions {
                                width: *width,
                                height: *height,
                            },
                        )
                    })
                    .collect(),
                probed: Mutex::new(Vec::new()),
            }
        }

        pub fn probed(&self) -> Vec<String> {
            let mut probed = self.probed.lock().unwrap().clone();
            probed.sort();
            probed
        }
    }

    impl ImageProbe for MockProbe {
        fn identify(&self, path: &Path) -> Result<Dimensions, ImagingError> {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            self.probed.lock().unwrap().push(name.clone());
            self.dimensions
                .get(&name)
                .copied()
                .ok_or_else(|| ImagingError::ProbeFailed(format!("no dimensions for {name}")))
        }
    }

    /// Create a small valid PNG file with the given dimensions.
    pub fn create_test_png(path: &Path, width: u32, height: u32) {
        let img = image::RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        img.save(path).unwrap();
    }

    #[test]
    fn identify_synthetic_png() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("room_1_after.png");
        create_test_png(&path, 200, 150);

        let dims = RustProbe::new().identify(&path).unwrap();
        assert_eq!(dims, Dimensions { width: 200, height: 150 });
    }

    #[test]
    fn identify_nonexistent_file_errors() {
        let result = RustProbe::new().identify(Path::new("/nonexistent/image.jpg"));
        assert!(result.is_err());
    }

    #[test]
    fn identify_garbage_avif_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("broken_1_after.AVIF");
        std::fs::write(&path, b"not an avif container").unwrap();

        let result = RustProbe::new().identify(&path);
        assert!(matches!(result, Err(ImagingError::ProbeFailed(_))));
    }

    #[test]
    fn avif_detected_case_insensitively() {
        assert!(is_avif(Path::new("a_1_after.AVIF")));
        assert!(is_avif(Path::new("a_1_after.avif")));
        assert!(!is_avif(Path::new("a_1_after.webp")));
    }
}
