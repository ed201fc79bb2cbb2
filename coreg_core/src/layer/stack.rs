// Copyright 2026 the Coreg Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays layer storage with allocation, ordering, and property
//! management.

use alloc::string::String;
use alloc::vec::Vec;

use understory_dirty::{CycleHandling, DirtyTracker};

use super::id::{INVALID, LayerId};
use crate::color::Rgba8;
use crate::dirty;
use crate::image::ImageDescriptor;
use crate::sync::SyncSnapshot;
use crate::viewport::{DisplayedArea, Viewport};

/// Per-layer render options.
///
/// Options shape how a layer participates in a composite pass without
/// affecting its geometry: blending opacity, an optional fill color handed to
/// the surface, a display name, visibility, and the one-shot resize request
/// consumed by the pass.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerOptions {
    /// Blending opacity in `[0, 1]`.
    pub opacity: f32,
    /// Fill color applied under the layer's pixels, if any.
    pub fill: Option<Rgba8>,
    /// Display name. Layers named `"PET"` get refit on resize requests.
    pub name: Option<String>,
    /// Whether the layer is excluded from composite passes.
    pub hidden: bool,
    /// One-shot request to refit the layer to the output surface on the next
    /// pass.
    pub resize_requested: bool,
}

impl Default for LayerOptions {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            fill: None,
            name: None,
            hidden: false,
            resize_requested: false,
        }
    }
}

/// Struct-of-arrays storage for all layers of one composite view.
///
/// Layers are addressed by [`LayerId`] handles. Internally, each layer
/// occupies a slot in parallel arrays. Destroyed layers are recycled via a
/// free list, and generation counters prevent stale handle access. Creation
/// order doubles as draw order: the first created (alive) layer is the base
/// of the composite.
#[derive(Debug)]
pub struct LayerStack {
    // -- Per-layer properties --
    pub(crate) image: Vec<Option<ImageDescriptor>>,
    pub(crate) viewport: Vec<Viewport>,
    pub(crate) options: Vec<LayerOptions>,
    pub(crate) snapshot: Vec<Option<SyncSnapshot>>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Ordering --
    pub(crate) order: Vec<u32>,
    pub(crate) active: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,
}

impl Default for LayerStack {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerStack {
    /// Creates an empty layer stack.
    #[must_use]
    pub fn new() -> Self {
        Self {
            image: Vec::new(),
            viewport: Vec::new(),
            options: Vec::new(),
            snapshot: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            order: Vec::new(),
            active: INVALID,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
        }
    }

    // -- Allocation API --

    /// Creates a new layer at the end of the draw order and returns its
    /// handle.
    ///
    /// The layer starts with no image, a default viewport, default options,
    /// and no sync snapshot.
    pub fn create_layer(&mut self) -> LayerId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot.
            self.generation[idx as usize] += 1;
            self.image[idx as usize] = None;
            self.viewport[idx as usize] = Viewport::default();
            self.options[idx as usize] = LayerOptions::default();
            self.snapshot[idx as usize] = None;
            idx
        } else {
            // Allocate a new slot.
            let idx = self.len;
            self.len += 1;
            self.image.push(None);
            self.viewport.push(Viewport::default());
            self.options.push(LayerOptions::default());
            self.snapshot.push(None);
            self.generation.push(0);
            idx
        };

        self.order.push(idx);
        self.dirty.mark(idx, dirty::CONTENT);

        LayerId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Destroys a layer, freeing its slot for reuse.
    ///
    /// If the layer was active, the stack is left without an active layer.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn destroy_layer(&mut self, id: LayerId) {
        self.validate(id);
        let idx = id.idx;

        self.dirty.remove_key(idx);

        // Bump generation so old handles immediately fail validation.
        self.generation[idx as usize] += 1;

        self.free_list.push(idx);
        self.order.retain(|&i| i != idx);
        if self.active == idx {
            self.active = INVALID;
        }
    }

    /// Returns whether the given handle refers to a live layer.
    #[must_use]
    pub fn is_alive(&self, id: LayerId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    /// Number of live layers.
    #[must_use]
    pub fn layer_count(&self) -> u32 {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "the free list never outgrows `len`, which is a u32"
        )]
        let freed = self.free_list.len() as u32;
        self.len - freed
    }

    /// Whether the stack has no live layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    // -- Ordering and active layer --

    /// All live layers in draw order (first = base).
    #[must_use]
    pub fn ids_in_order(&self) -> Vec<LayerId> {
        self.order
            .iter()
            .map(|&idx| LayerId {
                idx,
                generation: self.generation[idx as usize],
            })
            .collect()
    }

    /// Layers not marked hidden, in draw order (first = base).
    ///
    /// Visibility filtering preserves draw order, so index 0 of the returned
    /// list is the composite's base layer.
    #[must_use]
    pub fn visible_in_order(&self) -> Vec<LayerId> {
        self.order
            .iter()
            .filter(|&&idx| !self.options[idx as usize].hidden)
            .map(|&idx| LayerId {
                idx,
                generation: self.generation[idx as usize],
            })
            .collect()
    }

    /// Marks `id` as the active layer (the one user interactions drive).
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_active(&mut self, id: LayerId) {
        self.validate(id);
        self.active = id.idx;
    }

    /// The active layer, if one is set.
    #[must_use]
    pub fn active(&self) -> Option<LayerId> {
        if self.active == INVALID {
            None
        } else {
            Some(LayerId {
                idx: self.active,
                generation: self.generation[self.active as usize],
            })
        }
    }

    /// Leaves the stack without an active layer.
    pub fn clear_active(&mut self) {
        self.active = INVALID;
    }

    // -- Property getters (read-only, no dirty marking) --

    /// Returns the image descriptor of a layer.
    #[must_use]
    pub fn image(&self, id: LayerId) -> Option<&ImageDescriptor> {
        self.validate(id);
        self.image[id.idx as usize].as_ref()
    }

    /// Returns the viewport of a layer.
    #[must_use]
    pub fn viewport(&self, id: LayerId) -> Viewport {
        self.validate(id);
        self.viewport[id.idx as usize]
    }

    /// Returns the render options of a layer.
    #[must_use]
    pub fn options(&self, id: LayerId) -> &LayerOptions {
        self.validate(id);
        &self.options[id.idx as usize]
    }

    /// Returns the sync snapshot of a layer, if one has been captured.
    #[must_use]
    pub fn snapshot(&self, id: LayerId) -> Option<SyncSnapshot> {
        self.validate(id);
        self.snapshot[id.idx as usize]
    }

    // -- Mutation API (auto-marks dirty) --

    /// Sets or clears the image of a layer.
    ///
    /// Setting an image resets the viewport's displayed area to the image's
    /// full extent; the rest of the viewport is left untouched so host
    /// adjustments survive image swaps (e.g. scrolling through a series).
    ///
    /// Marks the CONTENT channel, plus VIEWPORT when the displayed area is
    /// reset.
    pub fn set_image(&mut self, id: LayerId, image: Option<ImageDescriptor>) {
        self.validate(id);
        if let Some(image) = &image {
            self.viewport[id.idx as usize].displayed_area = DisplayedArea::full(image);
            self.dirty.mark(id.idx, dirty::VIEWPORT);
        }
        self.image[id.idx as usize] = image;
        self.dirty.mark(id.idx, dirty::CONTENT);
    }

    /// Records that the layer's pixel content changed out-of-band (e.g. the
    /// imaging pipeline rewrote the buffer behind the same descriptor).
    ///
    /// Marks the CONTENT channel.
    pub fn mark_content_dirty(&mut self, id: LayerId) {
        self.validate(id);
        self.dirty.mark(id.idx, dirty::CONTENT);
    }

    /// Sets the viewport of a layer.
    ///
    /// Marks the VIEWPORT channel. The synchronizer and rescaler route their
    /// writes through here, so synced layers are invalidated like any other
    /// mutation.
    pub fn set_viewport(&mut self, id: LayerId, viewport: Viewport) {
        self.validate(id);
        self.viewport[id.idx as usize] = viewport;
        self.dirty.mark(id.idx, dirty::VIEWPORT);
    }

    /// Sets the render options of a layer.
    ///
    /// Marks the OPTIONS channel.
    pub fn set_options(&mut self, id: LayerId, options: LayerOptions) {
        self.validate(id);
        self.options[id.idx as usize] = options;
        self.dirty.mark(id.idx, dirty::OPTIONS);
    }

    /// Sets the display name of a layer.
    ///
    /// Marks the OPTIONS channel.
    pub fn set_name(&mut self, id: LayerId, name: Option<String>) {
        self.validate(id);
        self.options[id.idx as usize].name = name;
        self.dirty.mark(id.idx, dirty::OPTIONS);
    }

    /// Hides or shows a layer.
    ///
    /// Marks the OPTIONS channel.
    pub fn set_hidden(&mut self, id: LayerId, hidden: bool) {
        self.validate(id);
        self.options[id.idx as usize].hidden = hidden;
        self.dirty.mark(id.idx, dirty::OPTIONS);
    }

    /// Requests a one-shot refit of the layer to the output surface.
    ///
    /// The next composite pass consumes the request via
    /// [`take_resize_request`](Self::take_resize_request). Marks the OPTIONS
    /// channel.
    pub fn request_resize(&mut self, id: LayerId) {
        self.validate(id);
        self.options[id.idx as usize].resize_requested = true;
        self.dirty.mark(id.idx, dirty::OPTIONS);
    }

    /// Consumes a pending resize request, returning whether one was set.
    pub fn take_resize_request(&mut self, id: LayerId) -> bool {
        self.validate(id);
        let pending = self.options[id.idx as usize].resize_requested;
        if pending {
            self.options[id.idx as usize].resize_requested = false;
            self.dirty.mark(id.idx, dirty::OPTIONS);
        }
        pending
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: LayerId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale LayerId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn create_and_destroy() {
        let mut stack = LayerStack::new();
        let id = stack.create_layer();
        assert!(stack.is_alive(id));
        assert_eq!(stack.layer_count(), 1);
        stack.destroy_layer(id);
        assert!(!stack.is_alive(id));
        assert_eq!(stack.layer_count(), 0);
        assert!(stack.is_empty());
    }

    #[test]
    fn generation_prevents_stale_access() {
        let mut stack = LayerStack::new();
        let id1 = stack.create_layer();
        stack.destroy_layer(id1);
        let id2 = stack.create_layer();
        // id2 reuses the same slot but has a different generation.
        assert!(!stack.is_alive(id1));
        assert!(stack.is_alive(id2));
        assert_eq!(id1.idx, id2.idx);
        assert_ne!(id1.generation, id2.generation);
    }

    #[test]
    #[should_panic(expected = "stale LayerId")]
    fn destroyed_handle_panics_on_viewport() {
        let mut stack = LayerStack::new();
        let id = stack.create_layer();
        stack.destroy_layer(id);
        let _ = stack.viewport(id);
    }

    #[test]
    #[should_panic(expected = "stale LayerId")]
    fn destroyed_handle_panics_on_set_viewport() {
        let mut stack = LayerStack::new();
        let id = stack.create_layer();
        stack.destroy_layer(id);
        stack.set_viewport(id, Viewport::default());
    }

    #[test]
    fn draw_order_is_creation_order() {
        let mut stack = LayerStack::new();
        let a = stack.create_layer();
        let b = stack.create_layer();
        let c = stack.create_layer();
        assert_eq!(stack.ids_in_order(), [a, b, c]);

        stack.destroy_layer(b);
        assert_eq!(stack.ids_in_order(), [a, c]);

        // A recycled slot joins at the end of the order, not at its old place.
        let d = stack.create_layer();
        assert_eq!(stack.ids_in_order(), [a, c, d]);
    }

    #[test]
    fn visible_in_order_preserves_order() {
        let mut stack = LayerStack::new();
        let a = stack.create_layer();
        let b = stack.create_layer();
        let c = stack.create_layer();

        stack.set_hidden(b, true);
        assert_eq!(stack.visible_in_order(), [a, c]);

        stack.set_hidden(b, false);
        assert_eq!(stack.visible_in_order(), [a, b, c]);
    }

    #[test]
    fn active_layer_tracking() {
        let mut stack = LayerStack::new();
        let a = stack.create_layer();
        assert_eq!(stack.active(), None);

        stack.set_active(a);
        assert_eq!(stack.active(), Some(a));

        stack.clear_active();
        assert_eq!(stack.active(), None);

        stack.set_active(a);
        stack.destroy_layer(a);
        assert_eq!(stack.active(), None, "destroying the active layer clears it");
    }

    #[test]
    fn set_image_resets_displayed_area() {
        let mut stack = LayerStack::new();
        let id = stack.create_layer();
        assert_eq!(stack.viewport(id).displayed_area.width(), 1);

        stack.set_image(id, Some(ImageDescriptor::new(512, 256)));
        let area = stack.viewport(id).displayed_area;
        assert_eq!((area.width(), area.height()), (512, 256));

        // Clearing the image leaves the area alone.
        stack.set_image(id, None);
        assert_eq!(stack.viewport(id).displayed_area, area);
        assert!(stack.image(id).is_none());
    }

    #[test]
    fn options_default_to_full_opacity() {
        let mut stack = LayerStack::new();
        let id = stack.create_layer();
        let options = stack.options(id);
        assert_eq!(options.opacity, 1.0);
        assert!(options.fill.is_none());
        assert!(!options.hidden);
    }

    #[test]
    fn resize_request_is_one_shot() {
        let mut stack = LayerStack::new();
        let id = stack.create_layer();
        assert!(!stack.take_resize_request(id));

        stack.request_resize(id);
        assert!(stack.options(id).resize_requested);
        assert!(stack.take_resize_request(id));
        assert!(!stack.take_resize_request(id), "request is consumed");
    }

    #[test]
    fn set_name_updates_options() {
        let mut stack = LayerStack::new();
        let id = stack.create_layer();
        stack.set_name(id, Some("PET".to_string()));
        assert_eq!(stack.options(id).name.as_deref(), Some("PET"));
    }
}
