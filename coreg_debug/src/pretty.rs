// Copyright 2026 the Coreg Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use coreg_core::trace::{
    DrawEvent, PassBeginEvent, PassEndEvent, RescaleEvent, SkipEvent, SnapshotEvent,
    SnapshotReason, StrategyKind, SyncEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }
}

fn strategy_name(strategy: StrategyKind) -> &'static str {
    match strategy {
        StrategyKind::LabelMap => "labelmap",
        StrategyKind::PseudoColor => "pseudocolor",
        StrategyKind::TrueColor => "truecolor",
        StrategyKind::Grayscale => "grayscale",
    }
}

fn reason_name(reason: SnapshotReason) -> &'static str {
    match reason {
        SnapshotReason::SyncEnabled => "sync-on",
        SnapshotReason::Resize => "resize",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[pass:begin] pass={} surface={:.0}x{:.0} layers={} visible={}",
            e.pass_index,
            e.surface_width,
            e.surface_height,
            e.layers,
            e.visible,
        );
    }

    fn on_snapshot(&mut self, e: &SnapshotEvent) {
        let _ = writeln!(
            self.writer,
            "[snapshot] pass={} layer={} baseline={:.3} reason={}",
            e.pass_index,
            e.layer_index,
            e.baseline_scale,
            reason_name(e.reason),
        );
    }

    fn on_rescale(&mut self, e: &RescaleEvent) {
        let _ = writeln!(
            self.writer,
            "[rescale] pass={} base={} target={} scale={:.3}",
            e.pass_index,
            e.base_index,
            e.target_index,
            e.scale,
        );
    }

    fn on_sync(&mut self, e: &SyncEvent) {
        let source = if e.forced { "resize" } else { "host" };
        let _ = writeln!(
            self.writer,
            "[sync] pass={} active={} synced={} source={source}",
            e.pass_index,
            e.active_index,
            e.synced,
        );
    }

    fn on_draw(&mut self, e: &DrawEvent) {
        let _ = writeln!(
            self.writer,
            "[draw] pass={} layer={} strategy={} fused={} redrawn={}",
            e.pass_index,
            e.layer_index,
            strategy_name(e.strategy),
            e.fused,
            e.redrawn,
        );
    }

    fn on_skip(&mut self, e: &SkipEvent) {
        let _ = writeln!(
            self.writer,
            "[skip] pass={} layer={}",
            e.pass_index,
            e.layer_index,
        );
    }

    fn on_pass_end(&mut self, e: &PassEndEvent) {
        let _ = writeln!(
            self.writer,
            "[pass:end] pass={} drawn={} skipped={}",
            e.pass_index,
            e.drawn,
            e.skipped,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_print_pass_begin() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_pass_begin(&PassBeginEvent {
            pass_index: 1,
            surface_width: 512.0,
            surface_height: 512.0,
            layers: 2,
            visible: 2,
        });
        let output = String::from_utf8(sink.writer).unwrap();
        assert!(output.contains("[pass:begin]"), "got: {output}");
        assert!(output.contains("pass=1"), "got: {output}");
        assert!(output.contains("surface=512x512"), "got: {output}");
    }

    #[test]
    fn pretty_print_draw() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_draw(&DrawEvent {
            pass_index: 3,
            layer_index: 1,
            strategy: StrategyKind::PseudoColor,
            fused: true,
            redrawn: true,
        });
        let output = String::from_utf8(sink.writer).unwrap();
        assert!(output.contains("[draw]"), "got: {output}");
        assert!(output.contains("strategy=pseudocolor"), "got: {output}");
        assert!(output.contains("fused=true"), "got: {output}");
    }
}
