// Copyright 2026 the Coreg Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The composite pass.
//!
//! [`Compositor::compose`] renders a [`LayerStack`] onto a
//! [`CompositeSurface`] in one synchronous, single-threaded pass:
//!
//! 1. **Resync detection** — when the host flips synchronization on, every
//!    layer's baseline scale is re-anchored.
//! 2. **Resize handling** — functional layers (named
//!    [`FUNCTIONAL_LAYER_NAME`]) with a pending resize request are refit to
//!    the surface, rescaled against the first anatomical layer, re-anchored,
//!    and a synchronization sweep is forced even when the host has sync off.
//! 3. **Synchronization** — when the host has sync on, the active layer's
//!    viewport is propagated across the visible set. This may be the second
//!    sweep in the same pass; the two are deliberately not deduplicated.
//! 4. **Clear** — the surface is filled with opaque black.
//! 5. **Per-layer draw** — each visible layer in order is rasterized under
//!    its selected [`RenderStrategy`] and blended onto the surface, using
//!    the fusion transform for functional overlays and the standard display
//!    transform otherwise.
//!
//! Accumulated invalidations are drained once per pass, after the
//! synchronization steps, so viewport rewrites made by the pass itself land
//! in the same pass's redraw set.

use coreg_core::color::Rgba8;
use coreg_core::image::{Plane, SourceId};
use coreg_core::layer::{Invalidations, LayerStack};
use coreg_core::rescale::RescaleError;
use coreg_core::trace::{
    DrawEvent, PassBeginEvent, PassEndEvent, RescaleEvent, SkipEvent, SnapshotEvent,
    SnapshotReason, SyncEvent, Tracer,
};
use coreg_core::transform::display_transform;
use thiserror::Error;

use crate::fit::fit_scale;
use crate::raster::{LayerRasterizer, RasterError};
use crate::strategy::RenderStrategy;
use crate::surface::{CompositeSurface, DrawParams};

/// Display name that marks a layer as the functional overlay for resize
/// handling.
pub const FUNCTIONAL_LAYER_NAME: &str = "PET";

/// Every pass starts from an opaque black surface.
const BACKGROUND: Rgba8 = Rgba8::BLACK;

/// Per-pass inputs from the host view.
#[derive(Clone, Copy, Debug, Default)]
pub struct ComposeRequest {
    /// Whether viewport synchronization is enabled for this pass.
    pub sync_viewports: bool,
    /// Forces every layer to re-rasterize regardless of dirty state.
    pub invalidate: bool,
}

/// Error from a composite pass.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ComposeError {
    /// A layer rasterizer failed; the pass was aborted mid-draw. The next
    /// pass clears the surface, so the partial frame is transient.
    #[error("rasterization failed: {0}")]
    Raster(#[from] RasterError),
}

/// Orchestrates composite passes over a [`LayerStack`].
///
/// The compositor owns the little state that has to persist between passes:
/// the pass counter, the previous sync flag (for resync edge detection), and
/// a reusable invalidation buffer. Everything else lives in the stack.
#[derive(Debug, Default)]
pub struct Compositor {
    pass_index: u64,
    sync_was_enabled: bool,
    invalidations: Invalidations,
}

impl Compositor {
    /// Creates a compositor with no passes run and sync considered off.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders one composite pass.
    ///
    /// Runs start-to-finish before returning; there are no suspension
    /// points, and the surface must not be shared with a concurrent pass.
    ///
    /// # Errors
    ///
    /// [`ComposeError::Raster`] when a layer rasterizer fails. Layers
    /// already drawn stay on the surface; the next pass clears them.
    ///
    /// # Panics
    ///
    /// Panics if the stack hands out a stale active handle, which cannot
    /// happen through the public [`LayerStack`] API.
    pub fn compose(
        &mut self,
        stack: &mut LayerStack,
        surface: &mut dyn CompositeSurface,
        rasterizer: &mut dyn LayerRasterizer,
        request: ComposeRequest,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), ComposeError> {
        let pass = self.pass_index;
        self.pass_index += 1;

        let size = surface.size();
        let visible = stack.visible_in_order();
        #[expect(
            clippy::cast_possible_truncation,
            reason = "the visible set never outgrows the stack's u32 layer count"
        )]
        let visible_count = visible.len() as u32;
        tracer.pass_begin(&PassBeginEvent {
            pass_index: pass,
            surface_width: size.width,
            surface_height: size.height,
            layers: stack.layer_count(),
            visible: visible_count,
        });

        // Resync detection: re-anchor every layer when the host flips
        // synchronization from off to on. The stored flag is updated
        // unconditionally, whichever way the edge went.
        if request.sync_viewports && !self.sync_was_enabled {
            for id in stack.ids_in_order() {
                stack.capture_snapshot(id);
                tracer.snapshot(&SnapshotEvent {
                    pass_index: pass,
                    layer_index: id.index(),
                    baseline_scale: stack.viewport(id).scale,
                    reason: SnapshotReason::SyncEnabled,
                });
            }
        }
        self.sync_was_enabled = request.sync_viewports;

        // Resize handling for functional layers.
        let mut resized = false;
        for id in stack.ids_in_order() {
            if stack.options(id).name.as_deref() != Some(FUNCTIONAL_LAYER_NAME) {
                continue;
            }
            // A request on an imageless layer stays pending until an image
            // arrives.
            let Some(image) = stack.image(id).cloned() else {
                continue;
            };
            if !stack.take_resize_request(id) {
                continue;
            }

            let fit = fit_scale(size, &image, 0.0);
            let axial = image
                .source
                .as_ref()
                .and_then(SourceId::reformat)
                .is_some_and(|reformat| reformat.plane == Plane::Axial);
            let mut viewport = stack.viewport(id);
            viewport.scale = if axial {
                fit.factor
            } else if image.physical_width() > image.physical_height() {
                fit.horizontal
            } else {
                fit.vertical
            };
            stack.set_viewport(id, viewport);

            let base = stack.ids_in_order().into_iter().find(|&other| {
                stack.options(other).name.as_deref() != Some(FUNCTIONAL_LAYER_NAME)
            });
            if let Some(base) = base {
                match stack.rescale(base, id) {
                    Ok(()) => tracer.rescale(&RescaleEvent {
                        pass_index: pass,
                        base_index: base.index(),
                        target_index: id.index(),
                        scale: stack.viewport(id).scale,
                    }),
                    // The base search excludes functional layers, so it can
                    // never find `id` itself.
                    Err(RescaleError::SameLayer(_)) => {}
                }
            }

            stack.capture_snapshot(id);
            tracer.snapshot(&SnapshotEvent {
                pass_index: pass,
                layer_index: id.index(),
                baseline_scale: stack.viewport(id).scale,
                reason: SnapshotReason::Resize,
            });
            resized = true;
        }

        // A resize rewrote absolute scales, so re-anchor the rest of the
        // stack by syncing even when the host has synchronization off.
        if resized {
            if let Some(active) = stack.active() {
                let synced = stack.sync_viewports(active, &visible);
                tracer.sync(&SyncEvent {
                    pass_index: pass,
                    active_index: active.index(),
                    synced,
                    forced: true,
                });
            }
        }

        // Host-requested synchronization. Runs in addition to a forced
        // sweep above, not instead of it.
        if request.sync_viewports {
            if let Some(active) = stack.active() {
                let synced = stack.sync_viewports(active, &visible);
                tracer.sync(&SyncEvent {
                    pass_index: pass,
                    active_index: active.index(),
                    synced,
                    forced: false,
                });
            }
        }

        stack.drain_invalidations_into(&mut self.invalidations);

        surface.clear(BACKGROUND);

        let active = stack.active();
        let mut drawn = 0;
        let mut skipped = 0;
        for (position, &id) in visible.iter().enumerate() {
            let Some(image) = stack.image(id).cloned() else {
                tracer.skip(&SkipEvent {
                    pass_index: pass,
                    layer_index: id.index(),
                });
                skipped += 1;
                continue;
            };

            let viewport = stack.viewport(id);
            let strategy = RenderStrategy::select(&viewport, &image, position == 0);
            let (transform, fused) = match active {
                Some(active_id) if image.is_fusion_overlay() => {
                    (stack.fusion_transform(size, id, active_id), true)
                }
                _ => (display_transform(size, &viewport, &image), false),
            };

            let redraw = request.invalidate || self.invalidations.contains(id.index());
            rasterizer.rasterize(stack, id, strategy, redraw)?;

            let options = stack.options(id);
            let params = DrawParams {
                transform,
                opacity: options.opacity,
                fill: options.fill,
                smoothing: !viewport.pixel_replication,
            };
            surface.draw_layer(id, viewport.displayed_area, &params);
            tracer.draw(&DrawEvent {
                pass_index: pass,
                layer_index: id.index(),
                strategy: strategy.kind(),
                fused,
                redrawn: redraw,
            });
            drawn += 1;
        }

        tracer.pass_end(&PassEndEvent {
            pass_index: pass,
            drawn,
            skipped,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use alloc::vec::Vec;

    use coreg_core::image::ImageDescriptor;
    use coreg_core::layer::{LayerId, LayerStack};
    use coreg_core::viewport::DisplayedArea;
    use kurbo::{Affine, Point, Size, Vec2};

    use super::*;

    #[derive(Debug)]
    enum SurfaceOp {
        Clear(Rgba8),
        Draw {
            layer: u32,
            area: DisplayedArea,
            transform: Affine,
            opacity: f32,
            smoothing: bool,
        },
    }

    struct RecordingSurface {
        size: Size,
        ops: Vec<SurfaceOp>,
    }

    impl RecordingSurface {
        fn new(width: f64, height: f64) -> Self {
            Self {
                size: Size::new(width, height),
                ops: Vec::new(),
            }
        }
    }

    impl CompositeSurface for RecordingSurface {
        fn size(&self) -> Size {
            self.size
        }

        fn clear(&mut self, color: Rgba8) {
            self.ops.push(SurfaceOp::Clear(color));
        }

        fn draw_layer(&mut self, layer: LayerId, area: DisplayedArea, params: &DrawParams) {
            self.ops.push(SurfaceOp::Draw {
                layer: layer.index(),
                area,
                transform: params.transform,
                opacity: params.opacity,
                smoothing: params.smoothing,
            });
        }
    }

    struct ScriptedRasterizer {
        calls: Vec<(u32, RenderStrategy, bool)>,
        fail_layer: Option<u32>,
    }

    impl ScriptedRasterizer {
        fn new() -> Self {
            Self {
                calls: Vec::new(),
                fail_layer: None,
            }
        }
    }

    impl LayerRasterizer for ScriptedRasterizer {
        fn rasterize(
            &mut self,
            _stack: &LayerStack,
            layer: LayerId,
            strategy: RenderStrategy,
            redraw: bool,
        ) -> Result<(), RasterError> {
            if self.fail_layer == Some(layer.index()) {
                return Err(RasterError::MissingSource(layer));
            }
            self.calls.push((layer.index(), strategy, redraw));
            Ok(())
        }
    }

    fn run(
        compositor: &mut Compositor,
        stack: &mut LayerStack,
        surface: &mut RecordingSurface,
        rasterizer: &mut ScriptedRasterizer,
        request: ComposeRequest,
    ) -> Result<(), ComposeError> {
        compositor.compose(stack, surface, rasterizer, request, &mut Tracer::none())
    }

    fn image_layer(stack: &mut LayerStack, width: u32, height: u32) -> LayerId {
        let id = stack.create_layer();
        stack.set_image(id, Some(ImageDescriptor::new(width, height)));
        id
    }

    #[test]
    fn empty_stack_still_clears() {
        let mut compositor = Compositor::new();
        let mut stack = LayerStack::new();
        let mut surface = RecordingSurface::new(64.0, 64.0);
        let mut rasterizer = ScriptedRasterizer::new();

        run(
            &mut compositor,
            &mut stack,
            &mut surface,
            &mut rasterizer,
            ComposeRequest::default(),
        )
        .unwrap();

        assert!(matches!(surface.ops[..], [SurfaceOp::Clear(Rgba8::BLACK)]));
        assert!(rasterizer.calls.is_empty());
    }

    #[test]
    fn layers_draw_in_stack_order() {
        let mut compositor = Compositor::new();
        let mut stack = LayerStack::new();
        let base = image_layer(&mut stack, 8, 8);
        let overlay = image_layer(&mut stack, 8, 8);
        let mut surface = RecordingSurface::new(64.0, 64.0);
        let mut rasterizer = ScriptedRasterizer::new();

        run(
            &mut compositor,
            &mut stack,
            &mut surface,
            &mut rasterizer,
            ComposeRequest::default(),
        )
        .unwrap();

        match surface.ops[..] {
            [
                SurfaceOp::Clear(_),
                SurfaceOp::Draw {
                    layer: first, area, ..
                },
                SurfaceOp::Draw { layer: second, .. },
            ] => {
                assert_eq!(first, base.index());
                assert_eq!(second, overlay.index());
                assert_eq!(area, DisplayedArea::new(0, 0, 7, 7));
            }
            _ => panic!("unexpected op sequence: {:?}", surface.ops),
        }
    }

    #[test]
    fn grayscale_alpha_goes_to_the_base_layer_only() {
        let mut compositor = Compositor::new();
        let mut stack = LayerStack::new();
        let _ = image_layer(&mut stack, 8, 8);
        let _ = image_layer(&mut stack, 8, 8);
        let mut surface = RecordingSurface::new(64.0, 64.0);
        let mut rasterizer = ScriptedRasterizer::new();

        run(
            &mut compositor,
            &mut stack,
            &mut surface,
            &mut rasterizer,
            ComposeRequest::default(),
        )
        .unwrap();

        assert_eq!(
            rasterizer.calls[0].1,
            RenderStrategy::Grayscale {
                include_alpha: true
            }
        );
        assert_eq!(
            rasterizer.calls[1].1,
            RenderStrategy::Grayscale {
                include_alpha: false
            }
        );
    }

    #[test]
    fn imageless_layers_are_skipped() {
        let mut compositor = Compositor::new();
        let mut stack = LayerStack::new();
        let base = image_layer(&mut stack, 8, 8);
        let bare = stack.create_layer();
        let mut surface = RecordingSurface::new(64.0, 64.0);
        let mut rasterizer = ScriptedRasterizer::new();

        run(
            &mut compositor,
            &mut stack,
            &mut surface,
            &mut rasterizer,
            ComposeRequest::default(),
        )
        .unwrap();

        assert_eq!(rasterizer.calls.len(), 1);
        assert_eq!(rasterizer.calls[0].0, base.index());
        assert!(
            !surface
                .ops
                .iter()
                .any(|op| matches!(op, SurfaceOp::Draw { layer, .. } if *layer == bare.index()))
        );
    }

    #[test]
    fn hidden_layers_are_not_drawn() {
        let mut compositor = Compositor::new();
        let mut stack = LayerStack::new();
        let _ = image_layer(&mut stack, 8, 8);
        let hidden = image_layer(&mut stack, 8, 8);
        stack.set_hidden(hidden, true);
        let mut surface = RecordingSurface::new(64.0, 64.0);
        let mut rasterizer = ScriptedRasterizer::new();

        run(
            &mut compositor,
            &mut stack,
            &mut surface,
            &mut rasterizer,
            ComposeRequest::default(),
        )
        .unwrap();

        assert_eq!(rasterizer.calls.len(), 1);
    }

    #[test]
    fn sync_edge_anchors_baselines_once() {
        let mut compositor = Compositor::new();
        let mut stack = LayerStack::new();
        let active = image_layer(&mut stack, 8, 8);
        let other = image_layer(&mut stack, 8, 8);
        stack.set_active(active);
        let mut surface = RecordingSurface::new(64.0, 64.0);
        let mut rasterizer = ScriptedRasterizer::new();

        // Sync off: no snapshots appear.
        run(
            &mut compositor,
            &mut stack,
            &mut surface,
            &mut rasterizer,
            ComposeRequest::default(),
        )
        .unwrap();
        assert!(stack.snapshot(other).is_none());

        // Flipping sync on anchors every layer at its current scale.
        let mut viewport = stack.viewport(other);
        viewport.scale = 2.0;
        stack.set_viewport(other, viewport);
        let request = ComposeRequest {
            sync_viewports: true,
            ..ComposeRequest::default()
        };
        run(
            &mut compositor,
            &mut stack,
            &mut surface,
            &mut rasterizer,
            request,
        )
        .unwrap();
        let anchored = stack.snapshot(other).map(|s| s.baseline_scale);
        assert_eq!(anchored, Some(2.0));

        // Still on: zooming the active layer moves the synced scale but
        // never the anchor.
        let mut viewport = stack.viewport(active);
        viewport.scale = 3.0;
        stack.set_viewport(active, viewport);
        run(
            &mut compositor,
            &mut stack,
            &mut surface,
            &mut rasterizer,
            request,
        )
        .unwrap();
        assert_eq!(stack.viewport(other).scale, 6.0);
        assert_eq!(stack.snapshot(other).map(|s| s.baseline_scale), anchored);
    }

    #[test]
    fn sync_propagates_the_active_viewport() {
        let mut compositor = Compositor::new();
        let mut stack = LayerStack::new();
        let active = image_layer(&mut stack, 8, 8);
        let other = image_layer(&mut stack, 8, 8);
        stack.set_active(active);

        let mut viewport = stack.viewport(active);
        viewport.scale = 2.0;
        viewport.rotation = 45.0;
        viewport.translation = Vec2::new(6.0, -3.0);
        stack.set_viewport(active, viewport);

        let mut surface = RecordingSurface::new(64.0, 64.0);
        let mut rasterizer = ScriptedRasterizer::new();
        run(
            &mut compositor,
            &mut stack,
            &mut surface,
            &mut rasterizer,
            ComposeRequest {
                sync_viewports: true,
                ..ComposeRequest::default()
            },
        )
        .unwrap();

        // Baselines anchored this pass: active 2.0, other 1.0, so r = 0.5.
        let synced = stack.viewport(other);
        assert_eq!(synced.scale, 1.0);
        assert_eq!(synced.rotation, 45.0);
        assert_eq!(synced.translation, Vec2::new(12.0, -6.0));
    }

    #[test]
    fn resize_refits_rescales_and_forces_sync() {
        let mut compositor = Compositor::new();
        let mut stack = LayerStack::new();

        let ct = stack.create_layer();
        stack.set_image(
            ct,
            Some(ImageDescriptor {
                source: Some(SourceId::new("ct://base")),
                ..ImageDescriptor::new(20, 20)
            }),
        );
        let mut viewport = stack.viewport(ct);
        viewport.translation = Vec2::new(4.0, 0.0);
        stack.set_viewport(ct, viewport);
        stack.set_active(ct);

        let pet = stack.create_layer();
        stack.set_image(
            pet,
            Some(ImageDescriptor {
                source: Some(SourceId::new("ptmprsagittal://7")),
                ..ImageDescriptor::new(10, 20)
            }),
        );
        stack.set_name(pet, Some(FUNCTIONAL_LAYER_NAME.to_string()));
        stack.request_resize(pet);

        let mut surface = RecordingSurface::new(100.0, 100.0);
        let mut rasterizer = ScriptedRasterizer::new();
        run(
            &mut compositor,
            &mut stack,
            &mut surface,
            &mut rasterizer,
            ComposeRequest::default(),
        )
        .unwrap();

        // Taller than wide, so the vertical fit wins: 100 / 20 = 5. The
        // rescale against CT then compounds: (1*10)/(1*20) * (5/1) = 2.5.
        let synced = stack.viewport(pet);
        assert_eq!(synced.scale, 2.5);
        // The forced sweep ran with sync off: CT's pan arrived divided by
        // the baseline ratio captured at the resize.
        assert_eq!(synced.translation, Vec2::new(1.6, 0.0));
        assert!(!stack.options(pet).resize_requested);
        assert_eq!(stack.viewport(ct).scale, 1.0, "base untouched");
    }

    #[test]
    fn resize_waits_for_an_image() {
        let mut compositor = Compositor::new();
        let mut stack = LayerStack::new();
        let pet = stack.create_layer();
        stack.set_name(pet, Some(FUNCTIONAL_LAYER_NAME.to_string()));
        stack.request_resize(pet);

        let mut surface = RecordingSurface::new(100.0, 100.0);
        let mut rasterizer = ScriptedRasterizer::new();
        run(
            &mut compositor,
            &mut stack,
            &mut surface,
            &mut rasterizer,
            ComposeRequest::default(),
        )
        .unwrap();

        assert!(
            stack.options(pet).resize_requested,
            "request stays pending until an image arrives"
        );
    }

    #[test]
    fn redraw_only_while_dirty() {
        let mut compositor = Compositor::new();
        let mut stack = LayerStack::new();
        let a = image_layer(&mut stack, 8, 8);
        let b = image_layer(&mut stack, 8, 8);
        let mut surface = RecordingSurface::new(64.0, 64.0);
        let mut rasterizer = ScriptedRasterizer::new();

        // Pass 1: creation and image set marked both layers.
        run(
            &mut compositor,
            &mut stack,
            &mut surface,
            &mut rasterizer,
            ComposeRequest::default(),
        )
        .unwrap();
        assert!(rasterizer.calls[0].2);
        assert!(rasterizer.calls[1].2);

        // Pass 2: nothing changed.
        rasterizer.calls.clear();
        run(
            &mut compositor,
            &mut stack,
            &mut surface,
            &mut rasterizer,
            ComposeRequest::default(),
        )
        .unwrap();
        assert!(!rasterizer.calls[0].2);
        assert!(!rasterizer.calls[1].2);

        // Pass 3: only the edited layer redraws.
        rasterizer.calls.clear();
        let viewport = stack.viewport(a);
        stack.set_viewport(a, viewport);
        run(
            &mut compositor,
            &mut stack,
            &mut surface,
            &mut rasterizer,
            ComposeRequest::default(),
        )
        .unwrap();
        let by_layer: Vec<(u32, bool)> =
            rasterizer.calls.iter().map(|&(l, _, r)| (l, r)).collect();
        assert_eq!(by_layer, [(a.index(), true), (b.index(), false)]);
    }

    #[test]
    fn invalidate_forces_every_layer() {
        let mut compositor = Compositor::new();
        let mut stack = LayerStack::new();
        let _ = image_layer(&mut stack, 8, 8);
        let mut surface = RecordingSurface::new(64.0, 64.0);
        let mut rasterizer = ScriptedRasterizer::new();

        run(
            &mut compositor,
            &mut stack,
            &mut surface,
            &mut rasterizer,
            ComposeRequest::default(),
        )
        .unwrap();
        rasterizer.calls.clear();

        run(
            &mut compositor,
            &mut stack,
            &mut surface,
            &mut rasterizer,
            ComposeRequest {
                invalidate: true,
                ..ComposeRequest::default()
            },
        )
        .unwrap();
        assert!(rasterizer.calls[0].2);
    }

    #[test]
    fn raster_failure_aborts_the_pass() {
        let mut compositor = Compositor::new();
        let mut stack = LayerStack::new();
        let base = image_layer(&mut stack, 8, 8);
        let _ = image_layer(&mut stack, 8, 8);
        let mut surface = RecordingSurface::new(64.0, 64.0);
        let mut rasterizer = ScriptedRasterizer::new();
        rasterizer.fail_layer = Some(base.index());

        let result = run(
            &mut compositor,
            &mut stack,
            &mut surface,
            &mut rasterizer,
            ComposeRequest::default(),
        );

        assert_eq!(
            result,
            Err(ComposeError::Raster(RasterError::MissingSource(base)))
        );
        // The surface was cleared but nothing was drawn.
        assert!(matches!(surface.ops[..], [SurfaceOp::Clear(_)]));
        assert!(rasterizer.calls.is_empty());
    }

    #[test]
    fn functional_overlays_take_the_fusion_path() {
        let mut compositor = Compositor::new();
        let mut stack = LayerStack::new();

        // CT active layer displaying 20 rows; PET coronal overlay with 10.
        let ct = image_layer(&mut stack, 10, 20);
        stack.set_active(ct);
        let pet = stack.create_layer();
        stack.set_image(
            pet,
            Some(ImageDescriptor {
                source: Some(SourceId::new("ptmprcoronal://2")),
                ..ImageDescriptor::new(10, 10)
            }),
        );

        let mut surface = RecordingSurface::new(64.0, 64.0);
        let mut rasterizer = ScriptedRasterizer::new();
        run(
            &mut compositor,
            &mut stack,
            &mut surface,
            &mut rasterizer,
            ComposeRequest::default(),
        )
        .unwrap();

        // The overlay's transform scales y by the displayed-height ratio
        // 20/10, which the standard transform would never produce here.
        let Some(SurfaceOp::Draw { transform, .. }) = surface
            .ops
            .iter()
            .find(|op| matches!(op, SurfaceOp::Draw { layer, .. } if *layer == pet.index()))
        else {
            panic!("overlay was not drawn");
        };
        let dy = (*transform * Point::new(0.0, 1.0)) - (*transform * Point::ZERO);
        assert!((dy.y - 2.0).abs() < 1e-9);
    }

    #[test]
    fn pixel_replication_disables_smoothing() {
        let mut compositor = Compositor::new();
        let mut stack = LayerStack::new();
        let id = image_layer(&mut stack, 8, 8);
        let mut viewport = stack.viewport(id);
        viewport.pixel_replication = true;
        stack.set_viewport(id, viewport);

        let mut surface = RecordingSurface::new(64.0, 64.0);
        let mut rasterizer = ScriptedRasterizer::new();
        run(
            &mut compositor,
            &mut stack,
            &mut surface,
            &mut rasterizer,
            ComposeRequest::default(),
        )
        .unwrap();

        assert!(matches!(
            surface.ops[1],
            SurfaceOp::Draw {
                smoothing: false,
                ..
            }
        ));
    }

    #[test]
    fn opacity_reaches_the_surface() {
        let mut compositor = Compositor::new();
        let mut stack = LayerStack::new();
        let id = image_layer(&mut stack, 8, 8);
        let mut options = stack.options(id).clone();
        options.opacity = 0.25;
        stack.set_options(id, options);

        let mut surface = RecordingSurface::new(64.0, 64.0);
        let mut rasterizer = ScriptedRasterizer::new();
        run(
            &mut compositor,
            &mut stack,
            &mut surface,
            &mut rasterizer,
            ComposeRequest::default(),
        )
        .unwrap();

        let SurfaceOp::Draw { opacity, .. } = surface.ops[1] else {
            panic!("layer was not drawn");
        };
        assert_eq!(opacity, 0.25);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn events_reach_the_sink() {
        use coreg_core::trace::TraceSink;

        #[derive(Default)]
        struct RecordingSink {
            passes: Vec<u64>,
            draws: Vec<(u32, bool)>,
            ended: Vec<(u32, u32)>,
        }
        impl TraceSink for RecordingSink {
            fn on_pass_begin(&mut self, e: &PassBeginEvent) {
                self.passes.push(e.pass_index);
            }
            fn on_draw(&mut self, e: &DrawEvent) {
                self.draws.push((e.layer_index, e.fused));
            }
            fn on_pass_end(&mut self, e: &PassEndEvent) {
                self.ended.push((e.drawn, e.skipped));
            }
        }

        let mut compositor = Compositor::new();
        let mut stack = LayerStack::new();
        let ct = image_layer(&mut stack, 10, 10);
        stack.set_active(ct);
        let pet = stack.create_layer();
        stack.set_image(
            pet,
            Some(ImageDescriptor {
                source: Some(SourceId::new("ptmprsagittal://9")),
                ..ImageDescriptor::new(10, 10)
            }),
        );

        let mut surface = RecordingSurface::new(64.0, 64.0);
        let mut rasterizer = ScriptedRasterizer::new();
        let mut sink = RecordingSink::default();
        for _ in 0..2 {
            let mut tracer = Tracer::new(&mut sink);
            compositor
                .compose(
                    &mut stack,
                    &mut surface,
                    &mut rasterizer,
                    ComposeRequest::default(),
                    &mut tracer,
                )
                .unwrap();
        }

        assert_eq!(sink.passes, [0, 1]);
        assert_eq!(sink.ended, [(2, 0), (2, 0)]);
        assert_eq!(
            sink.draws,
            [
                (ct.index(), false),
                (pet.index(), true),
                (ct.index(), false),
                (pet.index(), true),
            ]
        );
    }
}
