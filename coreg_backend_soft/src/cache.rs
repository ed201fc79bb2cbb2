// Copyright 2026 the Coreg Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared per-layer pixmap storage.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use tiny_skia::Pixmap;

/// Per-layer raster cache, keyed by layer slot index.
///
/// The composite pass drives the surface and the rasterizer through two
/// independent `&mut` seams, but in this backend both sides work on the same
/// pixmaps: [`StagedRasterizer`](crate::StagedRasterizer) fills them,
/// [`SoftSurface`](crate::SoftSurface) samples them. Passes are
/// single-threaded, so a pair of `Rc<RefCell<..>>` handles is all the
/// sharing needed.
#[derive(Clone, Debug, Default)]
pub struct LayerCache {
    pixmaps: Rc<RefCell<BTreeMap<u32, Pixmap>>>,
}

impl LayerCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached layer pixmaps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pixmaps.borrow().len()
    }

    /// Whether no layer pixmap is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pixmaps.borrow().is_empty()
    }

    /// Drops the pixmap cached for slot `index`, if any.
    pub fn evict(&self, index: u32) {
        let _ = self.pixmaps.borrow_mut().remove(&index);
    }

    pub(crate) fn insert(&self, index: u32, pixmap: Pixmap) {
        let _ = self.pixmaps.borrow_mut().insert(index, pixmap);
    }

    pub(crate) fn contains(&self, index: u32) -> bool {
        self.pixmaps.borrow().contains_key(&index)
    }

    /// Runs `f` on the cached pixmap for `index`, if one exists.
    pub(crate) fn with<R>(&self, index: u32, f: impl FnOnce(&Pixmap) -> R) -> Option<R> {
        self.pixmaps.borrow().get(&index).map(f)
    }
}
