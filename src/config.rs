//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! serialized to a TOML table and the user's file is merged on top of it, so
//! a config file only needs the keys it wants to change.
//!
//! ## Config File Location
//!
//! Place `config.toml` in the content root, next to the comparison images:
//!
//! ```text
//! content/
//! ├── config.toml              # Site config (optional)
//! ├── kitchen_1_before.jpg     # Root files → "Main Gallery"
//! ├── kitchen_1_after.jpg
//! └── Living Rooms/
//!     └── ...
//! ```
//!
//! The file never takes part in pairing: its name does not match the
//! comparison pattern.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! root_alias = "input"      # URL segment images are published under
//!
//! [site]
//! eyebrow = "Real Estate AI"
//! title = "Preview Listing Photo Galleries"
//! tagline = "Choose how you want to explore the generated transformations below."
//!
//! [slider]
//! position = 50             # Initial divider position (0-100, percent)
//! keyboard_step = 5         # Divider movement per arrow key on the slider (percent)
//!
//! [theme]
//! thumbnail_gap = "1.5rem"  # Gap between cards in grids
//! grid_padding = "2rem"     # Padding around grids
//!
//! [theme.frame_x]
//! size = "3vw"
//! min = "1rem"
//! max = "2.5rem"
//!
//! [theme.frame_y]
//! size = "4vw"
//! min = "1rem"
//! max = "3rem"
//!
//! [colors.light]
//! background = "#f4f2ee"
//! surface = "#ffffff"       # Cards and frames behind images that are still loading
//! text = "#1d1b18"
//! text_muted = "#6f6a62"
//! border = "#dcd7ce"
//! accent = "#b85c2c"        # Links, current set tab, current thumbnail
//! divider = "#ffffff"       # Comparison divider line
//!
//! [colors.dark]
//! background = "#12110f"
//! surface = "#1c1a17"
//! text = "#f1ede6"
//! text_muted = "#a29c91"
//! border = "#35322d"
//! accent = "#e3894f"
//! divider = "#f1ede6"
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Directory names the generator writes into; the image alias must not shadow them.
const RESERVED_ALIASES: &[&str] = &["sliders", "gallery"];

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// URL path segment the content root is published under (`/input/...`).
    #[serde(default = "default_root_alias")]
    pub root_alias: String,
    /// Home page copy.
    pub site: SiteInfo,
    /// Comparison slider behaviour.
    pub slider: SliderConfig,
    /// Theme/layout settings (frame padding, grid spacing).
    pub theme: ThemeConfig,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

fn default_root_alias() -> String {
    "input".to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            root_alias: default_root_alias(),
            site: SiteInfo::default(),
            slider: SliderConfig::default(),
            theme: ThemeConfig::default(),
            colors: ColorConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.root_alias.is_empty()
            || self.root_alias.contains(['/', '\\'])
            || self.root_alias.starts_with('.')
        {
            return Err(ConfigError::Validation(
                "root_alias must be a single non-hidden path segment".into(),
            ));
        }
        if RESERVED_ALIASES.contains(&self.root_alias.as_str()) {
            return Err(ConfigError::Validation(format!(
                "root_alias '{}' is reserved for generated pages",
                self.root_alias
            )));
        }
        if self.slider.position > 100 {
            return Err(ConfigError::Validation(
                "slider.position must be 0-100".into(),
            ));
        }
        if self.slider.keyboard_step == 0 || self.slider.keyboard_step > 100 {
            return Err(ConfigError::Validation(
                "slider.keyboard_step must be 1-100".into(),
            ));
        }
        Ok(())
    }
}

/// Copy shown on the home page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteInfo {
    /// Small line above the title.
    pub eyebrow: String,
    /// Page title and main heading.
    pub title: String,
    /// Line under the heading.
    pub tagline: String,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            eyebrow: "Real Estate AI".to_string(),
            title: "Preview Listing Photo Galleries".to_string(),
            tagline: "Choose how you want to explore the generated transformations below."
                .to_string(),
        }
    }
}

/// Comparison slider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SliderConfig {
    /// Initial divider position as a percentage from the left edge.
    pub position: u32,
    /// How far one arrow-key press on a focused slider moves the divider.
    pub keyboard_step: u32,
}

impl Default for SliderConfig {
    fn default() -> Self {
        Self {
            position: 50,
            keyboard_step: 5,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel staging workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

/// A responsive CSS size expressed as `clamp(min, size, max)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClampSize {
    /// Preferred/fluid value, typically viewport-relative (e.g. `"3vw"`).
    pub size: String,
    /// Minimum bound (e.g. `"1rem"`).
    pub min: String,
    /// Maximum bound (e.g. `"2.5rem"`).
    pub max: String,
}

impl ClampSize {
    /// Render as a CSS `clamp()` expression.
    pub fn to_css(&self) -> String {
        format!("clamp({}, {}, {})", self.min, self.size, self.max)
    }
}

/// Theme/layout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    /// Horizontal padding around the comparison viewer.
    pub frame_x: ClampSize,
    /// Vertical padding around the comparison viewer.
    pub frame_y: ClampSize,
    /// Gap between cards in slider and gallery grids (CSS value).
    pub thumbnail_gap: String,
    /// Padding around grid containers (CSS value).
    pub grid_padding: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            frame_x: ClampSize {
                size: "3vw".to_string(),
                min: "1rem".to_string(),
                max: "2.5rem".to_string(),
            },
            frame_y: ClampSize {
                size: "4vw".to_string(),
                min: "1rem".to_string(),
                max: "3rem".to_string(),
            },
            thumbnail_gap: "1.5rem".to_string(),
            grid_padding: "2rem".to_string(),
        }
    }
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// One color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    /// Pair cards, gallery tiles and the frame shown while images load.
    pub surface: String,
    pub text: String,
    /// Captions, counters, empty states.
    pub text_muted: String,
    pub border: String,
    /// Links, the current set tab and the current thumbnail.
    pub accent: String,
    /// The line separating the before and after halves.
    pub divider: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#f4f2ee".to_string(),
            surface: "#ffffff".to_string(),
            text: "#1d1b18".to_string(),
            text_muted: "#6f6a62".to_string(),
            border: "#dcd7ce".to_string(),
            accent: "#b85c2c".to_string(),
            divider: "#ffffff".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#12110f".to_string(),
            surface: "#1c1a17".to_string(),
            text: "#f1ede6".to_string(),
            text_muted: "#a29c91".to_string(),
            border: "#35322d".to_string(),
            accent: "#e3894f".to_string(),
            divider: "#f1ede6".to_string(),
        }
    }

    /// `(name, value)` for each custom property, in declaration order.
    fn properties(&self) -> [(&'static str, &str); 7] {
        [
            ("bg", self.background.as_str()),
            ("surface", self.surface.as_str()),
            ("text", self.text.as_str()),
            ("text-muted", self.text_muted.as_str()),
            ("border", self.border.as_str()),
            ("accent", self.accent.as_str()),
            ("divider", self.divider.as_str()),
        ]
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no `config.toml` (including when
/// the directory itself does not exist).
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.is_file() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory, on top of stock defaults.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Pair Gal Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file in the content root. Unknown keys will cause an error.

# URL segment the content directory is published under.
# Images end up at /<root_alias>/<set>/<file> in the generated site.
root_alias = "input"

# ---------------------------------------------------------------------------
# Home page copy
# ---------------------------------------------------------------------------
[site]
eyebrow = "Real Estate AI"
title = "Preview Listing Photo Galleries"
tagline = "Choose how you want to explore the generated transformations below."

# ---------------------------------------------------------------------------
# Comparison slider
# ---------------------------------------------------------------------------
[slider]
# Initial divider position, percent from the left edge (0-100).
position = 50

# Divider movement per arrow-key press while the slider has focus (1-100).
keyboard_step = 5

# ---------------------------------------------------------------------------
# Theme / layout
# ---------------------------------------------------------------------------
[theme]
# Gap between cards in slider and gallery grids (CSS value).
thumbnail_gap = "1.5rem"

# Padding around grid containers (CSS value).
grid_padding = "2rem"

# Horizontal padding around the comparison viewer, as CSS clamp(min, size, max).
[theme.frame_x]
size = "3vw"
min = "1rem"
max = "2.5rem"

# Vertical padding around the comparison viewer, as CSS clamp(min, size, max).
[theme.frame_y]
size = "4vw"
min = "1rem"
max = "3rem"

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#f4f2ee"
surface = "#ffffff"       # Pair cards, gallery tiles, loading frames
text = "#1d1b18"
text_muted = "#6f6a62"    # Captions, counters, empty states
border = "#dcd7ce"
accent = "#b85c2c"        # Links, current set tab, current thumbnail
divider = "#ffffff"       # Line between the before and after halves

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#12110f"
surface = "#1c1a17"
text = "#f1ede6"
text_muted = "#a29c91"
border = "#35322d"
accent = "#e3894f"
divider = "#f1ede6"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers used to stage images.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

/// Generate CSS custom properties from color config. The dark scheme applies
/// under `prefers-color-scheme: dark`.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    let declarations = |scheme: &ColorScheme, indent: &str| -> String {
        scheme
            .properties()
            .iter()
            .map(|(name, value)| format!("{indent}--color-{name}: {value};\n"))
            .collect()
    };
    format!(
        ":root {{\n{}}}\n\n@media (prefers-color-scheme: dark) {{\n    :root {{\n{}    }}\n}}",
        declarations(&colors.light, "    "),
        declarations(&colors.dark, "        "),
    )
}

/// Generate CSS custom properties from theme and slider config.
pub fn generate_theme_css(theme: &ThemeConfig, slider: &SliderConfig) -> String {
    format!(
        r#":root {{
    --frame-width-x: {frame_x};
    --frame-width-y: {frame_y};
    --thumbnail-gap: {thumbnail_gap};
    --grid-padding: {grid_padding};
    --slider-position: {position}%;
}}"#,
        frame_x = theme.frame_x.to_css(),
        frame_y = theme.frame_y.to_css(),
        thumbnail_gap = theme.thumbnail_gap,
        grid_padding = theme.grid_padding,
        position = slider.position,
    )
}
