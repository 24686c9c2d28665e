//! Viewer navigation state.
//!
//! All navigation in the generated site follows one contract, and this
//! module is where it lives. The HTML generator walks a [`Viewer`] to decide
//! which pair each page shows and where its prev/next links point; the
//! embedded `viewer.js` mirrors the same transitions in the browser for the
//! lightbox and keyboard handling.
//!
//! ## Contract
//!
//! - Next/previous wrap around the active set. With zero or one pairs they
//!   do nothing, and the generator renders no controls.
//! - Selecting another set resets the active pair to the first one.
//! - Keys act only while the modal is open: `ArrowRight` next, `ArrowLeft`
//!   previous, `Escape` close.
//! - The swap toggle only affects which image is drawn on which side. It is
//!   cleared whenever the displayed pair changes.
//!
//! ```text
//!   previous ◄── [ 3 / 3 ] ──► next      next from 3/3 wraps to 1/3
//! ```

use crate::types::{ImagePair, ImageSet};

/// Index after `index` in a collection of `count` items, wrapping to 0.
/// Stays put when there is nothing to move to.
pub fn wrap_next(index: usize, count: usize) -> usize {
    if count <= 1 { index } else { (index + 1) % count }
}

/// Index before `index` in a collection of `count` items, wrapping to the last.
pub fn wrap_previous(index: usize, count: usize) -> usize {
    if count <= 1 {
        index
    } else {
        (index + count - 1) % count
    }
}

/// `"<index+1> / <count>"`.
pub fn position_label(index: usize, count: usize) -> String {
    format!("{} / {}", index + 1, count)
}

/// Keys the viewer responds to, named after DOM `KeyboardEvent.key` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Escape,
    Other,
}

impl Key {
    pub fn from_dom_key(key: &str) -> Self {
        match key {
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            "Escape" | "Esc" => Key::Escape,
            _ => Key::Other,
        }
    }
}

/// Everything that changes while a visitor browses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub active_set: usize,
    pub active_pair: usize,
    pub modal_open: bool,
    pub swapped: bool,
}

/// Navigation controller over a borrowed catalog.
///
/// State is only reachable through the navigation operations, so the
/// indices always point into the catalog (or the catalog is empty).
#[derive(Debug, Clone)]
pub struct Viewer<'a> {
    sets: &'a [ImageSet],
    state: ViewState,
}

impl<'a> Viewer<'a> {
    pub fn new(sets: &'a [ImageSet]) -> Self {
        Self {
            sets,
            state: ViewState::default(),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn sets(&self) -> &'a [ImageSet] {
        self.sets
    }

    pub fn active_set(&self) -> Option<&'a ImageSet> {
        self.sets.get(self.state.active_set)
    }

    pub fn active_pair(&self) -> Option<&'a ImagePair> {
        self.active_set()?.pairs.get(self.state.active_pair)
    }

    /// Number of pairs in the active set.
    pub fn pair_count(&self) -> usize {
        self.active_set().map_or(0, |s| s.pairs.len())
    }

    /// Whether prev/next controls make sense for the active set.
    pub fn has_navigation(&self) -> bool {
        self.pair_count() > 1
    }

    /// Make set `index` active and show its first pair.
    /// Returns `false` (and changes nothing) when `index` is out of range.
    pub fn select_set(&mut self, index: usize) -> bool {
        if index >= self.sets.len() {
            return false;
        }
        self.state.active_set = index;
        self.state.active_pair = 0;
        self.state.swapped = false;
        true
    }

    pub fn select_set_by_slug(&mut self, slug: &str) -> bool {
        match self.sets.iter().position(|s| s.slug == slug) {
            Some(index) => self.select_set(index),
            None => false,
        }
    }

    /// Jump straight to a pair of the active set (thumbnail strip, grid card).
    pub fn select_pair(&mut self, index: usize) -> bool {
        if index >= self.pair_count() {
            return false;
        }
        if index != self.state.active_pair {
            self.state.swapped = false;
        }
        self.state.active_pair = index;
        true
    }

    pub fn next(&mut self) {
        let next = wrap_next(self.state.active_pair, self.pair_count());
        self.select_pair(next);
    }

    pub fn previous(&mut self) {
        let previous = wrap_previous(self.state.active_pair, self.pair_count());
        self.select_pair(previous);
    }

    /// Open the comparison modal on a pair of the active set.
    pub fn open(&mut self, pair: usize) -> bool {
        if !self.select_pair(pair) {
            return false;
        }
        self.state.modal_open = true;
        true
    }

    pub fn close(&mut self) {
        self.state.modal_open = false;
    }

    pub fn toggle_swap(&mut self) {
        self.state.swapped = !self.state.swapped;
    }

    /// Apply a key press. Returns whether the key was consumed; nothing is
    /// consumed while the modal is closed.
    pub fn handle_key(&mut self, key: Key) -> bool {
        if !self.state.modal_open {
            return false;
        }
        match key {
            Key::ArrowRight => self.next(),
            Key::ArrowLeft => self.previous(),
            Key::Escape => self.close(),
            Key::Other => return false,
        }
        true
    }

    /// Position indicator for the active pair, `None` for an empty set.
    pub fn position_label(&self) -> Option<String> {
        self.active_pair()?;
        Some(position_label(self.state.active_pair, self.pair_count()))
    }

    /// Image URLs for the (left, right) sides, honoring the swap toggle.
    /// Unswapped, before is on the left.
    pub fn displayed_sources(&self) -> Option<(&'a str, &'a str)> {
        let pair = self.active_pair()?;
        let (before, after) = (pair.before_src.as_str(), pair.after_src.as_str());
        Some(if self.state.swapped {
            (after, before)
        } else {
            (before, after)
        })
    }
}
