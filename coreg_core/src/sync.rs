// Copyright 2026 the Coreg Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Viewport synchronization across layers.
//!
//! Layers in one composite view are acquired at different resolutions and
//! pixel spacings, so "the same zoom" means a different absolute scale on
//! each of them. Synchronization keeps their *relative* scales fixed while
//! the active layer's absolute scale changes:
//!
//! - A [`SyncSnapshot`] anchors a layer's baseline scale at a
//!   synchronization boundary.
//! - [`viewport_ratio`](LayerStack::viewport_ratio) computes the invariant
//!   multiplier between two anchored layers.
//! - [`sync_viewports`](LayerStack::sync_viewports) rewrites every
//!   non-active layer from the active one: scale through the ratio,
//!   rotation and flips verbatim, translation through the *inverse* ratio.
//!
//! Translation divides by the ratio because a more-zoomed-out layer needs a
//! smaller pixel-space pan to move the same physical distance. That is what
//! keeps one anatomical point under the cursor across all synced layers.
//!
//! Snapshots, once captured, persist until a capture point overwrites them:
//! the sync-enable edge and the resize refresh in the composite pass, the
//! lazy backfill inside `viewport_ratio` for layers that have never been
//! anchored, and explicit host calls. Nothing else recomputes them, so ratio
//! math stays relative to the last synchronization boundary rather than to
//! whatever scale the current pass happens to see.

use crate::layer::{LayerId, LayerStack};

/// A layer's baseline scale, captured at the last synchronization boundary.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SyncSnapshot {
    /// The viewport scale at capture time.
    pub baseline_scale: f64,
}

impl LayerStack {
    /// Captures a sync snapshot of the layer's current scale, overwriting
    /// any previous snapshot.
    ///
    /// Call this only at true synchronization boundaries; capturing every
    /// pass would drift the ratio anchor and defeat relative-scale tracking.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn capture_snapshot(&mut self, id: LayerId) {
        self.validate(id);
        let baseline_scale = self.viewport[id.idx as usize].scale;
        self.snapshot[id.idx as usize] = Some(SyncSnapshot { baseline_scale });
    }

    /// The baseline-scale ratio `target / base` between two layers.
    ///
    /// A layer without a snapshot is anchored on the spot to its current
    /// scale — the one place snapshot creation is implicit rather than tied
    /// to an explicit synchronization boundary.
    ///
    /// For anchored layers A, B this is reciprocal:
    /// `viewport_ratio(A, B) == 1.0 / viewport_ratio(B, A)`.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn viewport_ratio(&mut self, base: LayerId, target: LayerId) -> f64 {
        self.validate(base);
        self.validate(target);
        let base_scale = self.baseline_or_capture(base);
        let target_scale = self.baseline_or_capture(target);
        target_scale / base_scale
    }

    /// Propagates the active layer's viewport to every other layer in
    /// `layers`, preserving each layer's relative scale.
    ///
    /// For each non-active layer with ratio `r = viewport_ratio(active,
    /// layer)`:
    ///
    /// - `scale = active.scale * r`
    /// - `rotation = active.rotation`
    /// - `translation = active.translation / r`
    /// - `hflip`/`vflip` copied
    ///
    /// Displayed areas and colormap state are per-layer and untouched.
    /// Writes go through [`set_viewport`](Self::set_viewport), so every
    /// synced layer lands on the VIEWPORT invalidation channel.
    ///
    /// Returns the number of viewports rewritten.
    ///
    /// # Panics
    ///
    /// Panics if the active handle or any handle in `layers` is stale.
    pub fn sync_viewports(&mut self, active: LayerId, layers: &[LayerId]) -> u32 {
        self.validate(active);
        let mut synced = 0;
        for &id in layers {
            if id == active {
                continue;
            }
            let r = self.viewport_ratio(active, id);
            let source = self.viewport[active.idx as usize];
            let mut viewport = self.viewport[id.idx as usize];
            viewport.scale = source.scale * r;
            viewport.rotation = source.rotation;
            viewport.translation = source.translation / r;
            viewport.hflip = source.hflip;
            viewport.vflip = source.vflip;
            self.set_viewport(id, viewport);
            synced += 1;
        }
        synced
    }

    /// Reads the baseline scale, anchoring the layer first if needed.
    fn baseline_or_capture(&mut self, id: LayerId) -> f64 {
        let idx = id.idx as usize;
        match self.snapshot[idx] {
            Some(snapshot) => snapshot.baseline_scale,
            None => {
                let baseline_scale = self.viewport[idx].scale;
                self.snapshot[idx] = Some(SyncSnapshot { baseline_scale });
                baseline_scale
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Vec2;

    use super::*;
    use crate::viewport::Viewport;

    fn stack_with_scales(scales: &[f64]) -> (LayerStack, alloc::vec::Vec<LayerId>) {
        let mut stack = LayerStack::new();
        let ids = scales
            .iter()
            .map(|&scale| {
                let id = stack.create_layer();
                stack.set_viewport(
                    id,
                    Viewport {
                        scale,
                        ..Viewport::default()
                    },
                );
                id
            })
            .collect();
        (stack, ids)
    }

    #[test]
    fn capture_overwrites_previous_snapshot() {
        let (mut stack, ids) = stack_with_scales(&[2.0]);
        stack.capture_snapshot(ids[0]);
        assert_eq!(stack.snapshot(ids[0]).unwrap().baseline_scale, 2.0);

        let mut vp = stack.viewport(ids[0]);
        vp.scale = 5.0;
        stack.set_viewport(ids[0], vp);
        // Unchanged until somebody captures again.
        assert_eq!(stack.snapshot(ids[0]).unwrap().baseline_scale, 2.0);

        stack.capture_snapshot(ids[0]);
        assert_eq!(stack.snapshot(ids[0]).unwrap().baseline_scale, 5.0);
    }

    #[test]
    fn ratio_is_reciprocal() {
        let (mut stack, ids) = stack_with_scales(&[1.5, 0.4]);
        stack.capture_snapshot(ids[0]);
        stack.capture_snapshot(ids[1]);

        let ab = stack.viewport_ratio(ids[0], ids[1]);
        let ba = stack.viewport_ratio(ids[1], ids[0]);
        assert!((ab - 1.0 / ba).abs() < 1e-12);
    }

    #[test]
    fn ratio_backfills_missing_snapshots() {
        let (mut stack, ids) = stack_with_scales(&[2.0, 6.0]);
        assert!(stack.snapshot(ids[0]).is_none());
        assert!(stack.snapshot(ids[1]).is_none());

        let r = stack.viewport_ratio(ids[0], ids[1]);
        assert!((r - 3.0).abs() < 1e-12);
        assert_eq!(stack.snapshot(ids[0]).unwrap().baseline_scale, 2.0);
        assert_eq!(stack.snapshot(ids[1]).unwrap().baseline_scale, 6.0);
    }

    #[test]
    fn ratio_sticks_to_the_anchor_not_the_current_scale() {
        let (mut stack, ids) = stack_with_scales(&[1.0, 2.0]);
        stack.capture_snapshot(ids[0]);
        stack.capture_snapshot(ids[1]);

        // Zooming a layer afterwards must not move the ratio.
        let mut vp = stack.viewport(ids[1]);
        vp.scale = 40.0;
        stack.set_viewport(ids[1], vp);

        let r = stack.viewport_ratio(ids[0], ids[1]);
        assert!((r - 2.0).abs() < 1e-12);
    }

    #[test]
    fn sync_copies_rotation_and_flips_exactly() {
        let (mut stack, ids) = stack_with_scales(&[1.0, 2.0, 0.5]);
        let active = ids[0];
        stack.set_viewport(
            active,
            Viewport {
                scale: 1.0,
                rotation: 37.5,
                translation: Vec2::new(12.0, -8.0),
                hflip: true,
                vflip: false,
                ..Viewport::default()
            },
        );

        stack.sync_viewports(active, &ids);

        for &id in &ids[1..] {
            let vp = stack.viewport(id);
            assert_eq!(vp.rotation, 37.5);
            assert!(vp.hflip);
            assert!(!vp.vflip);
        }
    }

    #[test]
    fn sync_scales_through_ratio_and_pans_through_inverse() {
        let (mut stack, ids) = stack_with_scales(&[1.0, 2.0]);
        let (active, other) = (ids[0], ids[1]);
        stack.capture_snapshot(active);
        stack.capture_snapshot(other);

        let mut vp = stack.viewport(active);
        vp.scale = 3.0;
        vp.translation = Vec2::new(30.0, 10.0);
        stack.set_viewport(active, vp);

        stack.sync_viewports(active, &ids);

        let r = stack.viewport_ratio(active, other);
        let synced = stack.viewport(other);
        assert!((synced.scale - 3.0 * r).abs() < 1e-12);
        assert!((synced.translation.x - 30.0 / r).abs() < 1e-12);
        assert!((synced.translation.y - 10.0 / r).abs() < 1e-12);
    }

    #[test]
    fn sync_skips_the_active_layer() {
        let (mut stack, ids) = stack_with_scales(&[1.0, 1.0]);
        let active = ids[0];
        let mut vp = stack.viewport(active);
        vp.translation = Vec2::new(5.0, 5.0);
        stack.set_viewport(active, vp);

        let synced = stack.sync_viewports(active, &ids);

        // The active layer's own viewport is not rewritten through the ratio.
        assert_eq!(synced, 1);
        assert_eq!(stack.viewport(active).translation, Vec2::new(5.0, 5.0));
    }

    #[test]
    fn sync_leaves_displayed_area_alone() {
        let mut stack = LayerStack::new();
        let active = stack.create_layer();
        let other = stack.create_layer();
        stack.set_image(other, Some(crate::image::ImageDescriptor::new(64, 32)));
        let area_before = stack.viewport(other).displayed_area;

        stack.sync_viewports(active, &[active, other]);
        assert_eq!(stack.viewport(other).displayed_area, area_before);
    }

    #[test]
    fn sync_marks_synced_layers_dirty() {
        let (mut stack, ids) = stack_with_scales(&[1.0, 2.0]);
        let _ = stack.drain_invalidations();

        stack.sync_viewports(ids[0], &ids);
        let invalidations = stack.drain_invalidations();
        assert!(invalidations.viewports.contains(&ids[1].index()));
        assert!(
            !invalidations.viewports.contains(&ids[0].index()),
            "the active layer was not rewritten"
        );
    }
}
