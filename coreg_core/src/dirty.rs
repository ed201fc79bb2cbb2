// Copyright 2026 the Coreg Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Invalidation channel constants.
//!
//! The layer stack uses multi-channel dirty tracking (via
//! [`understory_dirty`]) to record which layers need rework before the next
//! composite pass. Each channel represents an independent category of change.
//! The stack is flat — there is no inherited state between layers — so every
//! channel is local-only: marking a layer never implies marking any other.
//!
//! # Channels
//!
//! - [`VIEWPORT`] — scale, rotation, pan, flips, displayed area, or colormap
//!   state changed. Marked by
//!   [`set_viewport`](crate::layer::LayerStack::set_viewport), which includes
//!   every write the synchronizer and rescaler perform.
//! - [`CONTENT`] — the image reference or its pixel data changed. Marked by
//!   [`set_image`](crate::layer::LayerStack::set_image) and
//!   [`mark_content_dirty`](crate::layer::LayerStack::mark_content_dirty).
//! - [`OPTIONS`] — render options changed (opacity, fill, name, hidden,
//!   resize request). Marked by
//!   [`set_options`](crate::layer::LayerStack::set_options) and friends.
//!
//! # Consumption
//!
//! Callers never need to query dirty state directly. The composite pass
//! calls [`drain_invalidations`](crate::layer::LayerStack::drain_invalidations)
//! once per pass, after the synchronization steps have recorded their own
//! viewport writes, and treats any marked layer as needing rasterization.

use understory_dirty::Channel;

/// Viewport state changed — the layer's transform must be rebuilt and the
/// layer redrawn.
pub const VIEWPORT: Channel = Channel::new(0);

/// Image reference or pixel content changed — the layer must be
/// rerasterized.
pub const CONTENT: Channel = Channel::new(1);

/// Render options changed — opacity, fill, visibility, or resize requests.
pub const OPTIONS: Channel = Channel::new(2);
