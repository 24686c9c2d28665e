//! Centralized filename parsing for the before/after naming convention.
//!
//! Comparison images are paired purely by name. Both halves of a pair share
//! a category and a numeric index and differ only in their side marker:
//!
//! ```text
//! kitchen_3_before.jpg   ─┐
//! kitchen_3_after.webp   ─┴─ pair "kitchen-3"
//! living_room_12_before.png
//! living_room_12_after.png   → pair "living_room-12"
//! ```
//!
//! The category may itself contain underscores and dashes; the index is the
//! last `_NNN_` group before the side marker. Matching is case-insensitive
//! and the category is lowercased, so `Kitchen_3_BEFORE.JPG` and
//! `kitchen_3_after.jpg` still form one pair.
//!
//! This module also holds the smaller display conventions shared by the
//! scanner and the HTML generator: set slugs, gallery image titles and
//! captions, and the before-image lookup used by gallery mode.

use regex::Regex;
use std::sync::LazyLock;

/// Image extensions that take part in discovery (compared case-insensitively).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "avif"];

// ASCII-only case folding: Unicode mode would let `[a-z]` match U+017F and U+212A.
static PAIR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i-u)^(?P<category>[a-z0-9_-]+)_(?P<index>[0-9]+)_(?P<side>before|after)\.(?:{})$",
        IMAGE_EXTENSIONS.join("|")
    ))
    .expect("pair filename pattern should compile")
});

/// Which half of a comparison a file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Before,
    After,
}

/// Result of parsing a filename like `Kitchen_03_before.jpg`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairName {
    /// Category, lowercased (`"kitchen"`).
    pub category: String,
    /// Numeric index with leading zeros dropped (`3`).
    pub index: u64,
    pub side: Side,
}

impl PairName {
    /// Pair identifier shared by both halves: `"<category>-<index>"`.
    pub fn pair_id(&self) -> String {
        format!("{}-{}", self.category, self.index)
    }
}

/// Parse a comparison filename. Returns `None` for anything that does not
/// follow `<category>_<index>_(before|after).<ext>`.
///
/// - `"kitchen_2_before.png"` → category="kitchen", index=2, side=Before
/// - `"Living_Room_010_AFTER.JPG"` → category="living_room", index=10, side=After
/// - `"a_after.jpg"` → None (no index)
/// - `"notes.txt"` → None
pub fn parse_pair_name(filename: &str) -> Option<PairName> {
    let caps = PAIR_PATTERN.captures(filename)?;
    // Indices too large for u64 cannot be keyed reliably; treat them as unmatched.
    let index = caps["index"].parse::<u64>().ok()?;
    let side = if caps["side"].eq_ignore_ascii_case("before") {
        Side::Before
    } else {
        Side::After
    };
    Some(PairName {
        category: caps["category"].to_lowercase(),
        index,
        side,
    })
}

/// URL slug for a set name: lowercased, each whitespace run replaced by one `-`.
///
/// - `"Living Rooms"` → `"living-rooms"`
/// - `"Phase  2\tDraft"` → `"phase-2-draft"`
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_space = false;
    for c in name.to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_space {
                slug.push('-');
                in_space = true;
            }
        } else {
            slug.push(c);
            in_space = false;
        }
    }
    slug
}

/// Whether gallery mode lists this file: a known image extension and no
/// `before` anywhere in the name.
pub fn is_gallery_image(filename: &str) -> bool {
    let ext = filename.rsplit('.').next().unwrap_or_default().to_lowercase();
    IMAGE_EXTENSIONS.contains(&ext.as_str()) && !filename.to_lowercase().contains("before")
}

/// Split `name.ext` into `("name", ".ext")`. Names without an extension
/// (or ending in a bare dot) return an empty extension.
fn split_extension(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(pos) if pos + 1 < filename.len() => filename.split_at(pos),
        _ => (filename, ""),
    }
}

/// Replace `suffix` at the end of `stem` (ASCII case-insensitive).
fn replace_suffix(stem: &str, suffix: &str, replacement: &str) -> Option<String> {
    let start = stem.len().checked_sub(suffix.len())?;
    let tail = stem.get(start..)?;
    tail.eq_ignore_ascii_case(suffix)
        .then(|| format!("{}{}", &stem[..start], replacement))
}

/// Candidate before-image names for an after-image, most specific rule first.
/// Rules that produce the same name contribute it once.
///
/// - `"sofa_after.jpg"` → `["sofa_before.jpg"]`
/// - `"Sofa After.png"` → `["Sofa before.png"]`
/// - `"sofa.jpg"` → `[]`
pub fn before_candidates(after_file: &str) -> Vec<String> {
    const RULES: &[(&str, &str)] = &[
        ("_after", "_before"),
        ("-after", "-before"),
        (" after", " before"),
        ("after", "before"),
    ];

    let (stem, ext) = split_extension(after_file);
    let mut candidates: Vec<String> = Vec::new();
    for (suffix, replacement) in RULES {
        if let Some(name) = replace_suffix(stem, suffix, replacement) {
            let candidate = format!("{name}{ext}");
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }
    candidates
}

/// Display title for a gallery image filename.
///
/// Drops the extension, collapses runs of whitespace, `_` and `-` into single
/// spaces, and capitalizes each word.
///
/// - `"modern_kitchen-after.jpg"` → `"Modern Kitchen After"`
/// - `"___.png"` → `"Gallery Image"`
pub fn image_title(filename: &str) -> String {
    let (stem, _) = split_extension(filename);
    let words: Vec<String> = stem
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|w| !w.is_empty())
        .map(capitalize)
        .collect();
    if words.is_empty() {
        "Gallery Image".to_string()
    } else {
        words.join(" ")
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Caption under a gallery image: `"<set> • Image <n>"` with a 1-based `n`.
pub fn image_caption(set_name: &str, position: usize) -> String {
    format!("{} \u{2022} Image {}", set_name, position + 1)
}
