//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary display
//! for every entity (set, pair, gallery image) is its semantic identity,
//! a positional index plus a name, with filenames shown as secondary context
//! via indented lines. This makes the output readable as a content inventory
//! while still letting users trace data back to specific files.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Sets
//! 001 Main Gallery (2 pairs)
//!     Source: (content root)
//!     Slug: main
//!     001 kitchen-1
//!         Before: kitchen_1_before.jpg
//!         After: kitchen_1_after.jpg
//! 002 Living Rooms (1 pair)
//!     Source: Living Rooms/
//!     Slug: living-rooms
//!     ...
//!
//! Gallery
//! 001 Kitchens (2 images)
//!     001 Island After
//!         Source: island_after.jpg
//!         Before: island_before.jpg
//!
//! Config
//!     config.toml
//! ```
//!
//! ## Process
//!
//! ```text
//! Living Rooms (2 images)
//!     001 sofa_1_before.png
//!         Source: Living Rooms/sofa_1_before.png
//!         1600x1200
//! ```
//!
//! ## Generate
//!
//! ```text
//! Home → index.html
//! Sliders → sliders/index.html
//! 001 Main Gallery → sliders/main/index.html
//!     001 kitchen-1 → sliders/main/1.html
//! Gallery → gallery/index.html
//!
//! Generated 1 set, 1 comparison page, 0 gallery sections
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::process::{ProcessEvent, ProcessedManifest};
use crate::scan::{MAIN_GALLERY_NAME, MAIN_GALLERY_SLUG, Manifest};
use crate::types::ImageSet;
use std::path::Path;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// `"1 pair"`, `"3 pairs"`.
fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

/// Format an entity header: positional index + name + counted detail.
///
/// ```text
/// 001 Living Rooms (5 pairs)
/// ```
fn entity_header(index: usize, name: &str, count: usize, noun: &str) -> String {
    format!("{} {} ({})", format_index(index), name, plural(count, noun))
}

/// Decoded filename at the end of an image URL.
fn url_filename(url: &str) -> String {
    let last = url.rsplit('/').next().unwrap_or(url);
    urlencoding::decode(last)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| last.to_string())
}

/// Where a set's files live, relative to the content root.
fn set_source(set: &ImageSet) -> String {
    if set.slug == MAIN_GALLERY_SLUG && set.name == MAIN_GALLERY_NAME {
        "(content root)".to_string()
    } else {
        format!("{}/", set.name)
    }
}

/// Collapse whitespace and truncate text to `max` characters, appending `...`
/// if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        flat
    } else {
        let cut: String = flat.chars().take(max).collect();
        format!("{}...", cut)
    }
}

// ============================================================================
// Stage 1: Scan output
// ============================================================================

/// Format scan stage output showing the discovered catalog.
pub fn format_scan_output(manifest: &Manifest, source_root: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Sets".to_string());
    if manifest.sets.is_empty() {
        lines.push("    (no before/after pairs found)".to_string());
    }
    for (i, set) in manifest.sets.iter().enumerate() {
        lines.push(entity_header(i + 1, &set.name, set.pairs.len(), "pair"));
        lines.push(format!("    Source: {}", set_source(set)));
        lines.push(format!("    Slug: {}", set.slug));
        if let Some(desc) = &set.description {
            let truncated = truncate_desc(desc, 60);
            if !truncated.is_empty() {
                lines.push(format!("    {}", truncated));
            }
        }
        for (j, pair) in set.pairs.iter().enumerate() {
            lines.push(format!("    {} {}", format_index(j + 1), pair.id));
            lines.push(format!("        Before: {}", url_filename(&pair.before_src)));
            lines.push(format!("        After: {}", url_filename(&pair.after_src)));
        }
    }

    if !manifest.gallery.is_empty() {
        lines.push(String::new());
        lines.push("Gallery".to_string());
        for (i, set) in manifest.gallery.iter().enumerate() {
            lines.push(entity_header(i + 1, &set.name, set.images.len(), "image"));
            for (j, image) in set.images.iter().enumerate() {
                lines.push(format!(
                    "    {} {}",
                    format_index(j + 1),
                    crate::naming::image_title(&image.name)
                ));
                lines.push(format!("        Source: {}", image.name));
                if let Some(before) = &image.before_src {
                    lines.push(format!("        Before: {}", url_filename(before)));
                }
            }
        }
    }

    lines.push(String::new());
    lines.push("Config".to_string());
    if source_root.join("config.toml").is_file() {
        lines.push("    config.toml".to_string());
    } else {
        lines.push("    (defaults)".to_string());
    }

    lines
}

/// Print scan output to stdout.
pub fn print_scan_output(manifest: &Manifest, source_root: &Path) {
    for line in format_scan_output(manifest, source_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Stage 2: Process output
// ============================================================================

/// Format a single process progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::SetStarted { name, image_count } => {
            vec![format!("{} ({})", name, plural(*image_count, "image"))]
        }
        ProcessEvent::ImageStaged {
            index,
            source_path,
            dimensions,
        } => {
            let filename = Path::new(source_path)
                .file_name()
                .map(|f| f.to_string_lossy().into_owned())
                .unwrap_or_else(|| source_path.clone());
            let size = match dimensions {
                Some(d) => format!("{}x{}", d.width, d.height),
                None => "dimensions unknown".to_string(),
            };
            vec![
                format!("    {} {}", format_index(*index), filename),
                format!("        Source: {}", source_path),
                format!("        {}", size),
            ]
        }
    }
}

// ============================================================================
// Stage 3: Generate output
// ============================================================================

/// Format generate stage output showing generated HTML files.
pub fn format_generate_output(manifest: &ProcessedManifest) -> Vec<String> {
    let mut lines = Vec::new();
    let mut total_pair_pages = 0;

    lines.push("Home \u{2192} index.html".to_string());
    lines.push("Sliders \u{2192} sliders/index.html".to_string());

    for (i, set) in manifest.sets.iter().enumerate() {
        lines.push(format!(
            "{} {} \u{2192} {}",
            format_index(i + 1),
            set.name,
            crate::generate::set_page_path(&set.slug)
        ));
        for (j, pair) in set.pairs.iter().enumerate() {
            lines.push(format!(
                "    {} {} \u{2192} {}",
                format_index(j + 1),
                pair.id,
                crate::generate::pair_page_path(&set.slug, j)
            ));
            total_pair_pages += 1;
        }
    }

    lines.push("Gallery \u{2192} gallery/index.html".to_string());
    lines.push(String::new());
    lines.push(format!(
        "Generated {}, {}, {}",
        plural(manifest.sets.len(), "set"),
        plural(total_pair_pages, "comparison page"),
        plural(manifest.gallery.len(), "gallery section")
    ));

    lines
}

/// Print generate output to stdout.
pub fn print_generate_output(manifest: &ProcessedManifest) {
    for line in format_generate_output(manifest) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::test_helpers::*;
    use crate::types::{Dimensions, GalleryImage, GallerySet};
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(100), "100");
    }

    #[test]
    fn plural_forms() {
        assert_eq!(plural(1, "pair"), "1 pair");
        assert_eq!(plural(0, "pair"), "0 pairs");
        assert_eq!(plural(3, "image"), "3 images");
    }

    #[test]
    fn entity_header_with_count() {
        assert_eq!(
            entity_header(2, "Living Rooms", 5, "pair"),
            "002 Living Rooms (5 pairs)"
        );
    }

    #[test]
    fn url_filename_decodes() {
        assert_eq!(
            url_filename("/input/Living%20Rooms/sofa%201_after.png"),
            "sofa 1_after.png"
        );
        assert_eq!(url_filename("/input/k_1_before.jpg"), "k_1_before.jpg");
    }

    #[test]
    fn truncate_desc_long_is_char_safe() {
        let text = "\u{e9}".repeat(50);
        let expected = format!("{}...", "\u{e9}".repeat(40));
        assert_eq!(truncate_desc(&text, 40), expected);
    }

    #[test]
    fn truncate_desc_flattens_lines() {
        assert_eq!(truncate_desc("Two\n\nlines", 40), "Two lines");
        assert_eq!(truncate_desc("", 40), "");
    }

    // =========================================================================
    // Scan output tests
    // =========================================================================

    #[test]
    fn scan_output_lists_sets_and_pairs() {
        let manifest = Manifest {
            sets: vec![
                make_set("Main Gallery", "main", &["kitchen-1"]),
                make_set("Living Rooms", "living-rooms", &["sofa-1", "sofa-2"]),
            ],
            gallery: vec![],
            config: SiteConfig::default(),
        };
        let tmp = TempDir::new().unwrap();
        let lines = format_scan_output(&manifest, tmp.path());

        assert_eq!(lines[0], "Sets");
        assert_eq!(lines[1], "001 Main Gallery (1 pair)");
        assert_eq!(lines[2], "    Source: (content root)");
        assert_eq!(lines[3], "    Slug: main");
        assert_eq!(lines[4], "    001 kitchen-1");
        assert_eq!(lines[5], "        Before: kitchen_1_before.jpg");
        assert_eq!(lines[6], "        After: kitchen_1_after.jpg");
        assert_eq!(lines[7], "002 Living Rooms (2 pairs)");
        assert_eq!(lines[8], "    Source: Living Rooms/");
        assert_eq!(lines[9], "    Slug: living-rooms");
        assert!(lines.contains(&"    (defaults)".to_string()));
    }

    #[test]
    fn scan_output_shows_disambiguated_slug() {
        let manifest = Manifest {
            sets: vec![make_set("Main", "main-2", &["a-1"])],
            gallery: vec![],
            config: SiteConfig::default(),
        };
        let tmp = TempDir::new().unwrap();
        let lines = format_scan_output(&manifest, tmp.path());
        assert!(lines.contains(&"    Slug: main-2".to_string()));
    }

    #[test]
    fn scan_output_empty_catalog() {
        let manifest = Manifest {
            sets: vec![],
            gallery: vec![],
            config: SiteConfig::default(),
        };
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("config.toml"), "").unwrap();
        let lines = format_scan_output(&manifest, tmp.path());
        assert_eq!(lines[1], "    (no before/after pairs found)");
        assert_eq!(lines.last().unwrap(), "    config.toml");
    }

    #[test]
    fn scan_output_lists_gallery() {
        let manifest = Manifest {
            sets: vec![],
            gallery: vec![GallerySet {
                name: "Kitchens".to_string(),
                slug: "kitchens".to_string(),
                images: vec![GalleryImage {
                    id: "Kitchens-0".to_string(),
                    src: "/input/Kitchens/island_after.jpg".to_string(),
                    name: "island_after.jpg".to_string(),
                    before_src: Some("/input/Kitchens/island_before.jpg".to_string()),
                }],
            }],
            config: SiteConfig::default(),
        };
        let tmp = TempDir::new().unwrap();
        let lines = format_scan_output(&manifest, tmp.path());
        let start = lines.iter().position(|l| l == "Gallery").unwrap();
        assert_eq!(lines[start + 1], "001 Kitchens (1 image)");
        assert_eq!(lines[start + 2], "    001 Island After");
        assert_eq!(lines[start + 3], "        Source: island_after.jpg");
        assert_eq!(lines[start + 4], "        Before: island_before.jpg");
    }

    // =========================================================================
    // Process event formatting tests
    // =========================================================================

    #[test]
    fn format_process_set_started() {
        let event = ProcessEvent::SetStarted {
            name: "Living Rooms".to_string(),
            image_count: 4,
        };
        assert_eq!(format_process_event(&event), vec!["Living Rooms (4 images)"]);
    }

    #[test]
    fn format_process_image_with_dimensions() {
        let event = ProcessEvent::ImageStaged {
            index: 1,
            source_path: "Living Rooms/sofa_1_before.png".to_string(),
            dimensions: Some(Dimensions {
                width: 1600,
                height: 1200,
            }),
        };
        let lines = format_process_event(&event);
        assert_eq!(lines[0], "    001 sofa_1_before.png");
        assert_eq!(lines[1], "        Source: Living Rooms/sofa_1_before.png");
        assert_eq!(lines[2], "        1600x1200");
    }

    #[test]
    fn format_process_image_without_dimensions() {
        let event = ProcessEvent::ImageStaged {
            index: 3,
            source_path: "k_1_after.avif".to_string(),
            dimensions: None,
        };
        let lines = format_process_event(&event);
        assert_eq!(lines[0], "    003 k_1_after.avif");
        assert_eq!(lines[2], "        dimensions unknown");
    }

    // =========================================================================
    // Generate output tests
    // =========================================================================

    #[test]
    fn generate_output_lists_pages() {
        let manifest = ProcessedManifest {
            sets: vec![make_set("Main Gallery", "main", &["a-1", "a-2"])],
            gallery: vec![],
            dimensions: BTreeMap::new(),
            config: SiteConfig::default(),
        };
        let lines = format_generate_output(&manifest);
        assert_eq!(lines[0], "Home \u{2192} index.html");
        assert_eq!(lines[2], "001 Main Gallery \u{2192} sliders/main/index.html");
        assert_eq!(lines[3], "    001 a-1 \u{2192} sliders/main/1.html");
        assert_eq!(lines[4], "    002 a-2 \u{2192} sliders/main/2.html");
        assert_eq!(
            lines.last().unwrap(),
            "Generated 1 set, 2 comparison pages, 0 gallery sections"
        );
    }
}
