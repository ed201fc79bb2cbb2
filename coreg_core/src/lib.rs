// Copyright 2026 the Coreg Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer stack, viewport synchronization, and fusion geometry for multimodal
//! image compositing.
//!
//! `coreg_core` provides the data structures and 2D affine math for
//! co-registering independently-acquired image layers (e.g. a CT base with a
//! PET overlay) on one output surface. Layers have different pixel spacings
//! and acquisition resolutions; this crate keeps their viewports consistent
//! so the same anatomical point stays under the cursor across all of them.
//! It is `no_std` compatible (with `alloc`) and uses array-based
//! struct-of-arrays storage with generational index handles.
//!
//! # Architecture
//!
//! The crate feeds a single-pass composite renderer (see `coreg_render`):
//!
//! ```text
//!   host edits (pan/zoom/rotate, image swaps)
//!       │
//!       ▼
//!   LayerStack ──► sync_viewports() / rescale()     (viewport co-registration)
//!       │
//!       ▼
//!   display_transform() / fusion_transform() ──► kurbo::Affine per layer
//!       │
//!       ▼
//!   drain_invalidations() ──► redraw set for the next composite pass
//! ```
//!
//! **[`layer`]** — Struct-of-arrays layer stack with generational handles.
//! Each layer holds an optional image descriptor, a viewport, render options,
//! and an optional sync snapshot; the stack tracks draw order and the active
//! layer.
//!
//! **[`dirty`]** — Multi-channel invalidation via `understory_dirty`.
//! Property mutations automatically mark the appropriate channel; the
//! composite pass drains all channels once per pass.
//!
//! **[`sync`]** — Baseline-scale snapshots, scale ratios between layers, and
//! the viewport synchronizer that propagates the active layer's
//! pan/zoom/rotation/flips to the rest of the stack.
//!
//! **[`rescale`]** — Spacing-relative rescale of one layer against another,
//! usable independently of a composite pass.
//!
//! **[`transform`]** — The standard per-layer pixel-to-surface affine.
//!
//! **[`fusion`]** — The overlay affine for non-axial reformats of functional
//! modalities, compensating for anisotropic pixel spacing and differing
//! physical extents.
//!
//! **[`image`]** — Image descriptors (dimensions, physical pixel spacing,
//! source identifiers) and reformat detection.
//!
//! **[`viewport`]** — Per-layer viewport state and the displayed-area
//! rectangle.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types for
//! composite-pass instrumentation, with zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one
//!   branch per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod color;
pub mod dirty;
pub mod fusion;
pub mod image;
pub mod layer;
pub mod rescale;
pub mod sync;
pub mod trace;
pub mod transform;
pub mod viewport;
