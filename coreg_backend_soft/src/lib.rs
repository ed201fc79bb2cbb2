// Copyright 2026 the Coreg Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Software compositing backend for coreg.
//!
//! Implements the render seams of [`coreg_render`] on the CPU with
//! [`tiny_skia`]:
//!
//! - [`SoftSurface`] — a pixmap-backed [`CompositeSurface`] that transforms
//!   and source-over blends cached layer pixmaps onto the output.
//! - [`StagedRasterizer`] — a [`LayerRasterizer`] serving externally staged
//!   samples, standing in for the per-modality renderers (windowing, LUT
//!   application) that live outside the compositing core.
//! - [`LayerCache`] — the shared per-layer pixmap store connecting the two.

mod cache;
mod raster;
mod surface;

pub use cache::LayerCache;
pub use coreg_render::{CompositeSurface, LayerRasterizer};
pub use raster::{StageError, StagedRasterizer, StagedSource};
pub use surface::{SoftSurface, SurfaceError};
