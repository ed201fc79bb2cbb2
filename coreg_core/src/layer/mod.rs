// Copyright 2026 the Coreg Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer stack data model.
//!
//! A *layer* is one image within a composite view. Each layer has:
//!
//! - An identity ([`LayerId`]) — a generational handle that becomes stale
//!   when the layer is destroyed, preventing use-after-free bugs at the API
//!   level.
//! - An optional [`ImageDescriptor`](crate::image::ImageDescriptor) — images
//!   can be attached and swapped at any time; layers without one are skipped
//!   during drawing.
//! - A [`Viewport`](crate::viewport::Viewport) — how the layer's pixels map
//!   to the output surface.
//! - [`LayerOptions`] — opacity, fill, name, visibility, and the one-shot
//!   resize request.
//! - An optional [`SyncSnapshot`](crate::sync::SyncSnapshot) — the baseline
//!   scale captured at the last synchronization boundary.
//!
//! Layers are stored in struct-of-arrays layout with index-based handles.
//! The stack is flat and ordered: creation order is draw order, and the
//! first visible layer is the composite's base. Exactly one layer is
//! expected to be *active* while rendering — the one whose viewport user
//! interactions drive, and the reference for synchronization and fusion.
//!
//! # Dirty tracking
//!
//! Property mutations automatically mark the corresponding channel (see
//! [`dirty`](crate::dirty)): VIEWPORT for viewport writes (including those
//! performed by the synchronizer and rescaler), CONTENT for image changes,
//! OPTIONS for option changes. The composite pass drains all channels once
//! per pass via [`LayerStack::drain_invalidations`].

mod id;
mod invalidate;
mod stack;

pub use id::{INVALID, LayerId};
pub use invalidate::Invalidations;
pub use stack::{LayerOptions, LayerStack};
