// Copyright 2026 the Coreg Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the composite pass.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! composite-pass instrumentation calls at each stage. All method bodies
//! default to no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace` — enables the `Tracer` method bodies (one branch per call).

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which rasterization strategy a layer was drawn with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Label-map overlay (colormap plus labelmap flag).
    LabelMap,
    /// Pseudo-color lookup (colormap without labelmap flag).
    PseudoColor,
    /// True-color pixels.
    TrueColor,
    /// Grayscale windowing.
    Grayscale,
}

/// Why a baseline-scale snapshot was captured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SnapshotReason {
    /// Synchronization was just switched on.
    SyncEnabled,
    /// A functional layer was rescaled after a resize request.
    Resize,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted at the start of a composite pass.
#[derive(Clone, Copy, Debug)]
pub struct PassBeginEvent {
    /// Monotonic pass counter.
    pub pass_index: u64,
    /// Output surface width in pixels.
    pub surface_width: f64,
    /// Output surface height in pixels.
    pub surface_height: f64,
    /// Total layers in the stack.
    pub layers: u32,
    /// Layers visible in this pass.
    pub visible: u32,
}

/// Emitted when a baseline-scale snapshot is captured.
#[derive(Clone, Copy, Debug)]
pub struct SnapshotEvent {
    /// Pass counter.
    pub pass_index: u64,
    /// Index of the layer whose snapshot was captured.
    pub layer_index: u32,
    /// The captured baseline scale.
    pub baseline_scale: f64,
    /// What triggered the capture.
    pub reason: SnapshotReason,
}

/// Emitted after a spacing-relative rescale.
#[derive(Clone, Copy, Debug)]
pub struct RescaleEvent {
    /// Pass counter.
    pub pass_index: u64,
    /// Index of the base layer.
    pub base_index: u32,
    /// Index of the rescaled layer.
    pub target_index: u32,
    /// The target layer's scale after the rescale.
    pub scale: f64,
}

/// Emitted after a viewport synchronization sweep.
#[derive(Clone, Copy, Debug)]
pub struct SyncEvent {
    /// Pass counter.
    pub pass_index: u64,
    /// Index of the active layer the sweep propagated from.
    pub active_index: u32,
    /// How many viewports were rewritten.
    pub synced: u32,
    /// Whether the sweep ran because of a resize rather than the sync flag.
    pub forced: bool,
}

/// Emitted when a layer is drawn onto the output surface.
#[derive(Clone, Copy, Debug)]
pub struct DrawEvent {
    /// Pass counter.
    pub pass_index: u64,
    /// Index of the drawn layer.
    pub layer_index: u32,
    /// Which rasterization strategy was selected.
    pub strategy: StrategyKind,
    /// Whether the fusion transform was used instead of the standard one.
    pub fused: bool,
    /// Whether the rasterizer was asked to redraw its pixels.
    pub redrawn: bool,
}

/// Emitted when a visible layer is skipped (no image attached).
#[derive(Clone, Copy, Debug)]
pub struct SkipEvent {
    /// Pass counter.
    pub pass_index: u64,
    /// Index of the skipped layer.
    pub layer_index: u32,
}

/// Emitted at the end of a composite pass.
#[derive(Clone, Copy, Debug)]
pub struct PassEndEvent {
    /// Pass counter.
    pub pass_index: u64,
    /// Layers drawn in this pass.
    pub drawn: u32,
    /// Layers skipped in this pass.
    pub skipped: u32,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the composite pass.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called at the start of a composite pass.
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        _ = e;
    }

    /// Called when a baseline-scale snapshot is captured.
    fn on_snapshot(&mut self, e: &SnapshotEvent) {
        _ = e;
    }

    /// Called after a spacing-relative rescale.
    fn on_rescale(&mut self, e: &RescaleEvent) {
        _ = e;
    }

    /// Called after a viewport synchronization sweep.
    fn on_sync(&mut self, e: &SyncEvent) {
        _ = e;
    }

    /// Called when a layer is drawn.
    fn on_draw(&mut self, e: &DrawEvent) {
        _ = e;
    }

    /// Called when a visible layer is skipped.
    fn on_skip(&mut self, e: &SkipEvent) {
        _ = e;
    }

    /// Called at the end of a composite pass.
    fn on_pass_end(&mut self, e: &PassEndEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`PassBeginEvent`].
    #[inline]
    pub fn pass_begin(&mut self, e: &PassBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_pass_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`SnapshotEvent`].
    #[inline]
    pub fn snapshot(&mut self, e: &SnapshotEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_snapshot(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`RescaleEvent`].
    #[inline]
    pub fn rescale(&mut self, e: &RescaleEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_rescale(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`SyncEvent`].
    #[inline]
    pub fn sync(&mut self, e: &SyncEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_sync(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`DrawEvent`].
    #[inline]
    pub fn draw(&mut self, e: &DrawEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_draw(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`SkipEvent`].
    #[inline]
    pub fn skip(&mut self, e: &SkipEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_skip(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PassEndEvent`].
    #[inline]
    pub fn pass_end(&mut self, e: &PassEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_pass_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_begin() -> PassBeginEvent {
        PassBeginEvent {
            pass_index: 42,
            surface_width: 512.0,
            surface_height: 512.0,
            layers: 2,
            visible: 2,
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_pass_begin(&sample_begin());
        sink.on_draw(&DrawEvent {
            pass_index: 42,
            layer_index: 0,
            strategy: StrategyKind::Grayscale,
            fused: false,
            redrawn: true,
        });
        sink.on_pass_end(&PassEndEvent {
            pass_index: 42,
            drawn: 1,
            skipped: 0,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.pass_begin(&sample_begin());
        tracer.skip(&SkipEvent {
            pass_index: 42,
            layer_index: 1,
        });
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            passes: Vec<u64>,
        }
        impl TraceSink for RecordingSink {
            fn on_pass_begin(&mut self, e: &PassBeginEvent) {
                self.passes.push(e.pass_index);
            }
        }

        let mut sink = RecordingSink { passes: Vec::new() };
        let mut tracer = Tracer::new(&mut sink);
        tracer.pass_begin(&sample_begin());
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.passes, &[42]);
    }
}
