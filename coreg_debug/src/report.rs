// Copyright 2026 the Coreg Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-pass JSON report exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes one JSON summary object per composite pass to the given writer.

use std::io::{self, Write};
use std::mem;

use serde_json::{Value, json};

use coreg_core::trace::{PassBeginEvent, PassEndEvent};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as per-pass JSON summaries.
///
/// The output is a complete JSON array with one object per composite pass,
/// grouping the pass's snapshots, rescales, sync sweeps, draws, and skips
/// under the pass header. A truncated recording (no closing pass-end record)
/// still yields an object for the open pass, with `null` totals.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut passes: Vec<Value> = Vec::new();
    let mut current = PassReport::default();

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::PassBegin(e) => {
                if !current.is_empty() {
                    passes.push(mem::take(&mut current).into_value());
                }
                current.begin = Some(e);
            }
            RecordedEvent::Snapshot(e) => {
                current.snapshots.push(json!({
                    "layer": e.layer_index,
                    "baseline_scale": e.baseline_scale,
                    "reason": format!("{:?}", e.reason),
                }));
            }
            RecordedEvent::Rescale(e) => {
                current.rescales.push(json!({
                    "base": e.base_index,
                    "target": e.target_index,
                    "scale": e.scale,
                }));
            }
            RecordedEvent::Sync(e) => {
                current.syncs.push(json!({
                    "active": e.active_index,
                    "synced": e.synced,
                    "forced": e.forced,
                }));
            }
            RecordedEvent::Draw(e) => {
                current.draws.push(json!({
                    "layer": e.layer_index,
                    "strategy": format!("{:?}", e.strategy),
                    "fused": e.fused,
                    "redrawn": e.redrawn,
                }));
            }
            RecordedEvent::Skip(e) => {
                current.skips.push(json!(e.layer_index));
            }
            RecordedEvent::PassEnd(e) => {
                current.end = Some(e);
                passes.push(mem::take(&mut current).into_value());
            }
        }
    }
    if !current.is_empty() {
        passes.push(current.into_value());
    }

    serde_json::to_writer_pretty(writer, &passes)?;
    Ok(())
}

/// Accumulates the events of one composite pass.
#[derive(Default)]
struct PassReport {
    begin: Option<PassBeginEvent>,
    snapshots: Vec<Value>,
    rescales: Vec<Value>,
    syncs: Vec<Value>,
    draws: Vec<Value>,
    skips: Vec<Value>,
    end: Option<PassEndEvent>,
}

impl PassReport {
    fn is_empty(&self) -> bool {
        self.begin.is_none()
            && self.end.is_none()
            && self.snapshots.is_empty()
            && self.rescales.is_empty()
            && self.syncs.is_empty()
            && self.draws.is_empty()
            && self.skips.is_empty()
    }

    fn into_value(self) -> Value {
        let pass_index = self
            .begin
            .map(|e| e.pass_index)
            .or(self.end.map(|e| e.pass_index));
        json!({
            "pass_index": pass_index,
            "surface_width": self.begin.map(|e| e.surface_width),
            "surface_height": self.begin.map(|e| e.surface_height),
            "layers": self.begin.map(|e| e.layers),
            "visible": self.begin.map(|e| e.visible),
            "snapshots": self.snapshots,
            "rescales": self.rescales,
            "syncs": self.syncs,
            "draws": self.draws,
            "skips": self.skips,
            "drawn": self.end.map(|e| e.drawn),
            "skipped": self.end.map(|e| e.skipped),
        })
    }
}
