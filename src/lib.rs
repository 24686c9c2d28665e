//! # Pair Gal
//!
//! A static site generator for before/after image comparison galleries.
//! Your filesystem is the data source: files named
//! `<category>_<n>_before.<ext>` and `<category>_<n>_after.<ext>` become
//! comparison pairs and directories become sets. Gallery mode shows every
//! non-`before` image of each non-hidden subdirectory in a browsable grid
//! with a lightbox.
//!
//! # Architecture: Three-Stage Pipeline
//!
//! Pair Gal processes content through three independent stages, each producing
//! a JSON manifest that the next stage consumes:
//!
//! ```text
//! 1. Scan      content/  →  manifest.json    (filesystem → catalog)
//! 2. Process   manifest  →  processed/       (staged images + dimensions)
//! 3. Generate  manifest  →  dist/            (final HTML site)
//! ```
//!
//! Each manifest is human-readable JSON you can inspect, and each stage is a
//! function from manifest to manifest, so unit tests exercise pipeline logic
//! against small fixture trees.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1: discovers image sets and gallery sets, produces the scan manifest |
//! | [`process`] | Stage 2: stages referenced images under the alias and probes dimensions |
//! | [`generate`] | Stage 3: renders the home, slider and gallery pages using Maud |
//! | [`viewer`] | Slider viewer state: set/pair selection, wraparound, keyboard handling |
//! | [`config`] | `config.toml` loading, validation, merging, and CSS generation |
//! | [`types`] | Catalog types serialized between stages (`ImageSet`, `ImagePair`) |
//! | [`naming`] | Pair filename convention, slugs and display titles |
//! | [`imaging`] | Dimension probing behind the `ImageProbe` trait |
//! | [`output`] | CLI output formatting for every stage |
//!
//! # Design Decisions
//!
//! ## Filenames Are the Catalog
//!
//! A pair exists when a `before` file and an `after` file share a category and
//! index. Categories are ASCII letters, digits, `_` and `-` (matched
//! case-insensitively), indices are decimal. Files that do not match are
//! ignored rather than reported, so a content directory can hold working
//! files next to the published ones.
//!
//! ## Static Pages Per Viewer State
//!
//! Slider mode is rendered ahead of time: every set gets an overview page and
//! every pair gets a comparison page whose previous/next links already encode
//! the wraparound. The script shipped with the site only drives the divider,
//! the swap toggle, keyboard shortcuts and the gallery lightbox. With
//! scripting disabled the site still navigates.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), a compile-time HTML
//! macro system. Malformed markup is a build error and all interpolation is
//! auto-escaped, which matters here because set names come straight from
//! directory names.
//!
//! ## Images Are Staged, Not Re-encoded
//!
//! Source files are copied byte for byte under `/<root_alias>/`. Dimensions are
//! probed from headers only, to give each comparison frame the right aspect
//! ratio before the images load.

pub mod config;
pub mod generate;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod process;
pub mod scan;
pub mod types;
pub mod viewer;

#[cfg(test)]
pub(crate) mod test_helpers;
