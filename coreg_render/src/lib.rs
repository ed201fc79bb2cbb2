// Copyright 2026 the Coreg Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Composite-pass orchestration and render-strategy dispatch for coreg.
//!
//! This crate sits between [`coreg_core`]'s layer stack and a concrete
//! pixel backend. It defines:
//!
//! - [`Compositor`] — the single-threaded composite pass (resync detection,
//!   resize handling, viewport sync, clear, per-layer draw)
//! - [`ComposeRequest`] — per-pass inputs from the host view
//! - [`RenderStrategy`] — per-modality rasterization dispatch
//! - [`CompositeSurface`] / [`LayerRasterizer`] — the seams a backend
//!   implements
//! - [`fit_scale`] — fit-to-surface scale from physical image extents
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables composite-pass trace events in
//!   `coreg_core`.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

mod compose;
mod fit;
mod raster;
mod strategy;
mod surface;

pub use compose::{ComposeError, ComposeRequest, Compositor, FUNCTIONAL_LAYER_NAME};
pub use fit::{FitScale, fit_scale};
pub use raster::{LayerRasterizer, RasterError};
pub use strategy::RenderStrategy;
pub use surface::{CompositeSurface, DrawParams};
