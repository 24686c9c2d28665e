//! HTML site generation.
//!
//! Stage 3 of the build pipeline. Takes the processed manifest and generates
//! the final static HTML site.
//!
//! ## Generated Pages
//!
//! - **Home page** (`/index.html`): Choose between slider and gallery mode
//! - **Slider landing** (`/sliders/index.html`): The first set's page, or the
//!   empty-state guidance when nothing was found
//! - **Set pages** (`/sliders/{slug}/index.html`): Set tabs and a grid of
//!   comparison cards
//! - **Comparison pages** (`/sliders/{slug}/{n}.html`): Large slider with
//!   wrap-around prev/next, position indicator, thumbnail strip and swap toggle
//! - **Gallery page** (`/gallery/index.html`): Figure grid per gallery set with
//!   a lightbox
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── sliders/
//! │   ├── index.html
//! │   ├── main/
//! │   │   ├── index.html
//! │   │   ├── 1.html
//! │   │   └── 2.html
//! │   └── living-rooms/
//! │       └── ...
//! ├── gallery/
//! │   └── index.html
//! └── input/                     # Staged images, copied from processed/
//!     └── ...
//! ```
//!
//! ## Keyboard Contract
//!
//! Comparison pages behave as an open viewer: the arrow keys follow the
//! page's prev/next links and Escape returns to the set grid. The gallery
//! lightbox only listens while it is open. Both follow [`crate::viewer`];
//! the links written here are computed by driving a [`Viewer`].
//!
//! ## CSS and JavaScript
//!
//! Static assets are embedded at compile time:
//! - `static/style.css`: Base styles (colors and theme injected from config)
//! - `static/viewer.js`: Slider drag, swap, lightbox and keyboard handling

use crate::config::{self, SiteConfig, SliderConfig};
use crate::naming;
use crate::process::ProcessedManifest;
use crate::types::{ImagePair, ImageSet};
use crate::viewer::{Key, Viewer};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use std::fs;
use std::path::Path;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

const CSS_STATIC: &str = include_str!("../static/style.css");
const JS: &str = include_str!("../static/viewer.js");

pub fn generate(
    manifest_path: &Path,
    processed_dir: &Path,
    output_dir: &Path,
) -> Result<(), GenerateError> {
    let manifest_content = fs::read_to_string(manifest_path)?;
    let manifest: ProcessedManifest = serde_json::from_str(&manifest_content)?;
    let css = build_css(&manifest.config);

    fs::create_dir_all(output_dir)?;

    let alias = &manifest.config.root_alias;
    copy_staged_images(&processed_dir.join(alias), &output_dir.join(alias))?;

    write_page(output_dir, "index.html", render_home(&manifest.config, &css))?;

    let mut viewer = Viewer::new(&manifest.sets);
    write_page(
        output_dir,
        "sliders/index.html",
        render_set_page(&manifest, &viewer, &css),
    )?;

    for (set_idx, set) in manifest.sets.iter().enumerate() {
        viewer.select_set(set_idx);
        write_page(
            output_dir,
            &set_page_path(&set.slug),
            render_set_page(&manifest, &viewer, &css),
        )?;

        for pair_idx in 0..set.pairs.len() {
            viewer.open(pair_idx);
            if let Some(page) = render_pair_page(&manifest, &viewer, &css) {
                write_page(output_dir, &pair_page_path(&set.slug, pair_idx), page)?;
            }
        }
    }

    write_page(
        output_dir,
        "gallery/index.html",
        render_gallery_page(&manifest, &css),
    )?;

    Ok(())
}

/// Output path of a set page, relative to the output directory.
pub fn set_page_path(slug: &str) -> String {
    format!("sliders/{}/index.html", slug)
}

/// Output path of a comparison page. `position` is 0-based; files are 1-based.
pub fn pair_page_path(slug: &str, position: usize) -> String {
    format!("sliders/{}/{}.html", slug, position + 1)
}

fn set_href(slug: &str) -> String {
    format!("/sliders/{}/", urlencoding::encode(slug))
}

fn pair_href(slug: &str, position: usize) -> String {
    format!("/sliders/{}/{}.html", urlencoding::encode(slug), position + 1)
}

fn build_css(config: &SiteConfig) -> String {
    format!(
        "{}\n\n{}\n\n{}",
        config::generate_color_css(&config.colors),
        config::generate_theme_css(&config.theme, &config.slider),
        CSS_STATIC
    )
}

fn write_page(output_dir: &Path, relative: &str, page: Markup) -> Result<(), GenerateError> {
    let path = output_dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, page.into_string())?;
    Ok(())
}

/// Mirror the staged image tree into the output directory.
fn copy_staged_images(src: &Path, dst: &Path) -> Result<(), GenerateError> {
    if dst.exists() {
        fs::remove_dir_all(dst)?;
    }
    if !src.is_dir() {
        return Ok(());
    }
    for entry in WalkDir::new(src) {
        let entry = entry.map_err(std::io::Error::from)?;
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

fn render_markdown(source: &str) -> String {
    let mut out = String::new();
    md_html::push_html(&mut out, Parser::new(source));
    out
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, css: &str, body_class: Option<&str>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(css)) }
            }
            body class=[body_class] {
                (content)
            }
        }
    }
}

fn site_header(breadcrumb: Markup) -> Markup {
    html! {
        header.site-header {
            nav.breadcrumb {
                (breadcrumb)
            }
        }
    }
}

/// Before/after frame. `left`/`right` are the image URLs in display order;
/// `swapped` says whether the after image is the one on the left.
///
/// Without `interactive` the frame is a static preview (grid cards).
fn comparison(
    left: &str,
    right: &str,
    alt: &str,
    swapped: bool,
    aspect_ratio: Option<f64>,
    slider: &SliderConfig,
    interactive: bool,
) -> Markup {
    let (left_label, right_label) = if swapped {
        ("After", "Before")
    } else {
        ("Before", "After")
    };
    let style = aspect_ratio.map(|ratio| format!("--aspect-ratio: {:.4};", ratio));

    html! {
        div.compare data-compare data-loading style=[style] {
            img.compare-right src=(right) alt={ (alt) " (" (right_label.to_lowercase()) ")" };
            img.compare-left src=(left) alt={ (alt) " (" (left_label.to_lowercase()) ")" };
            div.compare-divider {}
            span.compare-label.compare-label-left { (left_label) }
            span.compare-label.compare-label-right { (right_label) }
            @if interactive {
                input.compare-range type="range" min="0" max="100"
                    step=(slider.keyboard_step) value=(slider.position)
                    aria-label="Comparison position";
            }
        }
    }
}

/// Aspect ratio for a pair's frame: the after image's, else the before image's.
fn pair_aspect_ratio(manifest: &ProcessedManifest, pair: &ImagePair) -> Option<f64> {
    manifest
        .aspect_ratio(&pair.after_src)
        .or_else(|| manifest.aspect_ratio(&pair.before_src))
}

fn pair_alt(pair: &ImagePair) -> String {
    format!("Interior {}", pair.id)
}

fn set_tabs(sets: &[ImageSet], active: usize) -> Markup {
    html! {
        nav.set-tabs aria-label="Sets" {
            @for (idx, set) in sets.iter().enumerate() {
                a.set-tab.current[idx == active] href=(set_href(&set.slug)) {
                    (set.name)
                }
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders the home page with the two mode choices
fn render_home(config: &SiteConfig, css: &str) -> Markup {
    let site = &config.site;
    let content = html! {
        main.home-page {
            div.home-intro {
                p.home-eyebrow { (site.eyebrow) }
                h1.home-title { (site.title) }
                p.home-tagline { (site.tagline) }
                nav.mode-choices {
                    a.mode-button href="/sliders/" { "Sliders" }
                    a.mode-button href="/gallery/" { "Gallery" }
                }
            }
        }
    };

    base_document(&site.title, css, None, content)
}

/// Renders the grid page of the viewer's active set, or the empty state when
/// the catalog has no sets.
fn render_set_page(manifest: &ProcessedManifest, viewer: &Viewer, css: &str) -> Markup {
    let alias = &manifest.config.root_alias;
    let Some(set) = viewer.active_set() else {
        let content = html! {
            (site_header(html! { a href="/" { "Home" } " \u{203a} Sliders" }))
            main.set-page {
                div.empty-state {
                    p {
                        "Drop image pairs in the content directory (published as "
                        code { "/" (alias) }
                        ") as "
                        code { "<category>_<n>_before.<ext>" }
                        " and "
                        code { "<category>_<n>_after.<ext>" }
                        "."
                    }
                    p { a href="/" { "Return Home" } }
                }
            }
        };
        return base_document("Sliders", css, None, content);
    };

    let slider = &manifest.config.slider;
    let breadcrumb = html! {
        a href="/" { "Home" }
        " \u{203a} "
        a href="/sliders/" { "Sliders" }
        " \u{203a} "
        (set.name)
    };

    let content = html! {
        (site_header(breadcrumb))
        main.set-page {
            @if viewer.sets().len() > 1 {
                (set_tabs(viewer.sets(), viewer.state().active_set))
            }
            @if let Some(desc) = &set.description {
                div.set-description { (PreEscaped(render_markdown(desc))) }
            }
            div.pair-grid {
                @for (idx, pair) in set.pairs.iter().enumerate() {
                    a.pair-card href=(pair_href(&set.slug, idx)) {
                        (comparison(
                            &pair.before_src,
                            &pair.after_src,
                            &pair_alt(pair),
                            false,
                            pair_aspect_ratio(manifest, pair),
                            slider,
                            false,
                        ))
                        span.pair-card-label { (pair.id) }
                    }
                }
            }
        }
        script { (PreEscaped(JS)) }
    };

    base_document(&set.name, css, None, content)
}

/// Renders the single comparison page for the viewer's active pair.
fn render_pair_page(manifest: &ProcessedManifest, viewer: &Viewer, css: &str) -> Option<Markup> {
    let set = viewer.active_set()?;
    let pair = viewer.active_pair()?;
    let (left, right) = viewer.displayed_sources()?;
    let label = viewer.position_label()?;
    let state = viewer.state();

    // Where each key leads, as the viewer itself would move.
    let target = |key: Key| {
        let mut next = viewer.clone();
        next.handle_key(key);
        next.state().active_pair
    };
    let prev_url = viewer
        .has_navigation()
        .then(|| pair_href(&set.slug, target(Key::ArrowLeft)));
    let next_url = viewer
        .has_navigation()
        .then(|| pair_href(&set.slug, target(Key::ArrowRight)));
    let close_url = set_href(&set.slug);

    let breadcrumb = html! {
        a href="/" { "Home" }
        " \u{203a} "
        a href="/sliders/" { "Sliders" }
        " \u{203a} "
        a href=(close_url) { (set.name) }
    };

    let content = html! {
        (site_header(breadcrumb))
        main.pair-page {
            div.pair-stage {
                @if let Some(url) = &prev_url {
                    a.pair-prev href=(url) aria-label="Previous" { "\u{2039}" }
                }
                (comparison(
                    left,
                    right,
                    &pair_alt(pair),
                    state.swapped,
                    pair_aspect_ratio(manifest, pair),
                    &manifest.config.slider,
                    true,
                ))
                @if let Some(url) = &next_url {
                    a.pair-next href=(url) aria-label="Next" { "\u{203a}" }
                }
            }
            div.pair-toolbar {
                p.pair-counter { (label) }
                button.swap-toggle type="button" data-swap { "Swap sides" }
                a.pair-close href=(close_url) aria-label="Close" { "\u{00d7}" }
            }
            @if viewer.has_navigation() {
                nav.thumb-strip aria-label="Pairs" {
                    @for (idx, other) in set.pairs.iter().enumerate() {
                        a.current[idx == state.active_pair] href=(pair_href(&set.slug, idx)) {
                            img src=(other.after_src) alt=(pair_alt(other)) loading="lazy";
                        }
                    }
                }
            }
        }
        div.nav-zones data-prev=[prev_url.as_deref()] data-next=[next_url.as_deref()] data-close=(close_url) {}
        script { (PreEscaped(JS)) }
    };

    let page_title = format!("{} - {}", set.name, label);
    Some(base_document(&page_title, css, Some("pair-view"), content))
}

/// Renders the gallery page: one section per gallery set plus the lightbox.
fn render_gallery_page(manifest: &ProcessedManifest, css: &str) -> Markup {
    let breadcrumb = html! {
        a href="/" { "Home" }
        " \u{203a} Gallery"
    };
    let slider = &manifest.config.slider;

    let content = html! {
        (site_header(breadcrumb))
        main.gallery-page {
            @if manifest.gallery.is_empty() {
                div.empty-state {
                    p {
                        "No gallery images found. Add after images to subfolders of the content directory (published as "
                        code { "/" (manifest.config.root_alias) }
                        ")."
                    }
                    p { a href="/" { "Return Home" } }
                }
            }
            @for set in &manifest.gallery {
                @let heading_id = format!("{}-heading", set.slug);
                @let count = set.images.len();
                section.gallery-section data-gallery-set aria-labelledby=(heading_id) {
                    div.section-header {
                        h2.section-title id=(heading_id) { (set.name) }
                        p.section-meta {
                            (count) " " (if count == 1 { "image" } else { "images" })
                        }
                    }
                    div.gallery-grid {
                        @for (idx, image) in set.images.iter().enumerate() {
                            @let title = naming::image_title(&image.name);
                            figure.gallery-item id=(format!("{}-{}", set.slug, image.id)) {
                                button.gallery-open type="button" data-gallery-item
                                    data-src=(image.src)
                                    data-before=[image.before_src.as_deref()]
                                    data-title=(title)
                                    aria-label={ "Open " (title) } {
                                    img src=(image.src) alt=(title) loading="lazy";
                                }
                                figcaption {
                                    h3.gallery-title { (title) }
                                    p.gallery-caption { (naming::image_caption(&set.name, idx)) }
                                }
                            }
                        }
                    }
                }
            }
        }
        div.lightbox hidden role="dialog" aria-modal="true" data-lightbox
            data-position=(slider.position) data-step=(slider.keyboard_step) {
            div.lightbox-body {
                div.lightbox-stage {}
                p.lightbox-title {}
                p.lightbox-counter {}
            }
            button.lightbox-close type="button" aria-label="Close full-size image" { "\u{00d7}" }
            button.lightbox-prev type="button" aria-label="View previous image" { "\u{2039}" }
            button.lightbox-next type="button" aria-label="View next image" { "\u{203a}" }
        }
        script { (PreEscaped(JS)) }
    };

    base_document("Gallery", css, None, content)
}

// ============================================================================
// Tests
// ============================================================================
