// Copyright 2026 the Coreg Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Draining accumulated invalidations.
//!
//! Mutating accessors on [`LayerStack`] mark one of three dirty channels
//! (see [`dirty`](crate::dirty)). Once per composite pass — after the
//! synchronization steps have recorded their own viewport writes, before any
//! layer is rasterized — the pass drains all channels into an
//! [`Invalidations`] value and treats every marked layer as needing redraw.
//!
//! [`Invalidations`] uses raw slot indices (`u32`) rather than
//! [`LayerId`](super::LayerId) handles; they come straight from the dirty
//! tracker and are only compared against `LayerId::index()` of live layers.

use alloc::vec::Vec;

use super::stack::LayerStack;
use crate::dirty;

/// The set of layers invalidated since the last drain, per channel.
#[derive(Clone, Debug, Default)]
pub struct Invalidations {
    /// Layers whose viewport changed.
    pub viewports: Vec<u32>,
    /// Layers whose image reference or pixel content changed.
    pub content: Vec<u32>,
    /// Layers whose render options changed.
    pub options: Vec<u32>,
}

impl Invalidations {
    /// Whether the layer at raw slot `idx` is marked on any channel.
    #[must_use]
    pub fn contains(&self, idx: u32) -> bool {
        self.viewports.contains(&idx) || self.content.contains(&idx) || self.options.contains(&idx)
    }

    /// Whether no layer is marked on any channel.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.viewports.is_empty() && self.content.is_empty() && self.options.is_empty()
    }

    /// Clears all channels.
    pub fn clear(&mut self) {
        self.viewports.clear();
        self.content.clear();
        self.options.clear();
    }
}

impl LayerStack {
    /// Drains all dirty channels, returning the accumulated invalidations.
    ///
    /// Draining resets the tracked state; a second drain with no intervening
    /// mutation returns an empty set.
    pub fn drain_invalidations(&mut self) -> Invalidations {
        let mut invalidations = Invalidations::default();
        self.drain_invalidations_into(&mut invalidations);
        invalidations
    }

    /// Like [`drain_invalidations`](Self::drain_invalidations), but reuses a
    /// caller-provided buffer to avoid allocation.
    pub fn drain_invalidations_into(&mut self, invalidations: &mut Invalidations) {
        invalidations.clear();

        invalidations
            .viewports
            .extend(self.dirty.drain(dirty::VIEWPORT).deterministic().run());

        invalidations
            .content
            .extend(self.dirty.drain(dirty::CONTENT).deterministic().run());

        invalidations
            .options
            .extend(self.dirty.drain(dirty::OPTIONS).deterministic().run());
    }
}
