// Copyright 2026 the Coreg Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].
//!
//! Scales and surface dimensions are stored as `f64` bit patterns, so
//! decoded values are bit-exact.

use coreg_core::trace::{
    DrawEvent, PassBeginEvent, PassEndEvent, RescaleEvent, SkipEvent, SnapshotEvent,
    SnapshotReason, StrategyKind, SyncEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_PASS_BEGIN: u8 = 1;
const TAG_SNAPSHOT: u8 = 2;
const TAG_RESCALE: u8 = 3;
const TAG_SYNC: u8 = 4;
const TAG_DRAW: u8 = 5;
const TAG_SKIP: u8 = 6;
const TAG_PASS_END: u8 = 7;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_strategy(&mut self, s: StrategyKind) {
        self.write_u8(match s {
            StrategyKind::LabelMap => 0,
            StrategyKind::PseudoColor => 1,
            StrategyKind::TrueColor => 2,
            StrategyKind::Grayscale => 3,
        });
    }

    fn write_reason(&mut self, r: SnapshotReason) {
        self.write_u8(match r {
            SnapshotReason::SyncEnabled => 0,
            SnapshotReason::Resize => 1,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        self.write_u8(TAG_PASS_BEGIN);
        self.write_u64(e.pass_index);
        self.write_f64(e.surface_width);
        self.write_f64(e.surface_height);
        self.write_u32(e.layers);
        self.write_u32(e.visible);
    }

    fn on_snapshot(&mut self, e: &SnapshotEvent) {
        self.write_u8(TAG_SNAPSHOT);
        self.write_u64(e.pass_index);
        self.write_u32(e.layer_index);
        self.write_f64(e.baseline_scale);
        self.write_reason(e.reason);
    }

    fn on_rescale(&mut self, e: &RescaleEvent) {
        self.write_u8(TAG_RESCALE);
        self.write_u64(e.pass_index);
        self.write_u32(e.base_index);
        self.write_u32(e.target_index);
        self.write_f64(e.scale);
    }

    fn on_sync(&mut self, e: &SyncEvent) {
        self.write_u8(TAG_SYNC);
        self.write_u64(e.pass_index);
        self.write_u32(e.active_index);
        self.write_u32(e.synced);
        self.write_u8(u8::from(e.forced));
    }

    fn on_draw(&mut self, e: &DrawEvent) {
        self.write_u8(TAG_DRAW);
        self.write_u64(e.pass_index);
        self.write_u32(e.layer_index);
        self.write_strategy(e.strategy);
        self.write_u8(u8::from(e.fused));
        self.write_u8(u8::from(e.redrawn));
    }

    fn on_skip(&mut self, e: &SkipEvent) {
        self.write_u8(TAG_SKIP);
        self.write_u64(e.pass_index);
        self.write_u32(e.layer_index);
    }

    fn on_pass_end(&mut self, e: &PassEndEvent) {
        self.write_u8(TAG_PASS_END);
        self.write_u64(e.pass_index);
        self.write_u32(e.drawn);
        self.write_u32(e.skipped);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`PassBeginEvent`].
    PassBegin(PassBeginEvent),
    /// A [`SnapshotEvent`].
    Snapshot(SnapshotEvent),
    /// A [`RescaleEvent`].
    Rescale(RescaleEvent),
    /// A [`SyncEvent`].
    Sync(SyncEvent),
    /// A [`DrawEvent`].
    Draw(DrawEvent),
    /// A [`SkipEvent`].
    Skip(SkipEvent),
    /// A [`PassEndEvent`].
    PassEnd(PassEndEvent),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        if self.remaining() < 1 {
            return None;
        }
        let v = self.data[self.pos];
        self.pos += 1;
        Some(v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        if self.remaining() < 4 {
            return None;
        }
        let v = u32::from_le_bytes(self.data[self.pos..self.pos + 4].try_into().ok()?);
        self.pos += 4;
        Some(v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        if self.remaining() < 8 {
            return None;
        }
        let v = u64::from_le_bytes(self.data[self.pos..self.pos + 8].try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn read_f64(&mut self) -> Option<f64> {
        Some(f64::from_bits(self.read_u64()?))
    }

    fn read_strategy(&mut self) -> Option<StrategyKind> {
        Some(match self.read_u8()? {
            0 => StrategyKind::LabelMap,
            1 => StrategyKind::PseudoColor,
            2 => StrategyKind::TrueColor,
            _ => StrategyKind::Grayscale,
        })
    }

    fn read_reason(&mut self) -> Option<SnapshotReason> {
        Some(match self.read_u8()? {
            0 => SnapshotReason::SyncEnabled,
            _ => SnapshotReason::Resize,
        })
    }

    fn decode_pass_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PassBegin(PassBeginEvent {
            pass_index: self.read_u64()?,
            surface_width: self.read_f64()?,
            surface_height: self.read_f64()?,
            layers: self.read_u32()?,
            visible: self.read_u32()?,
        }))
    }

    fn decode_snapshot(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Snapshot(SnapshotEvent {
            pass_index: self.read_u64()?,
            layer_index: self.read_u32()?,
            baseline_scale: self.read_f64()?,
            reason: self.read_reason()?,
        }))
    }

    fn decode_rescale(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Rescale(RescaleEvent {
            pass_index: self.read_u64()?,
            base_index: self.read_u32()?,
            target_index: self.read_u32()?,
            scale: self.read_f64()?,
        }))
    }

    fn decode_sync(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Sync(SyncEvent {
            pass_index: self.read_u64()?,
            active_index: self.read_u32()?,
            synced: self.read_u32()?,
            forced: self.read_u8()? != 0,
        }))
    }

    fn decode_draw(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Draw(DrawEvent {
            pass_index: self.read_u64()?,
            layer_index: self.read_u32()?,
            strategy: self.read_strategy()?,
            fused: self.read_u8()? != 0,
            redrawn: self.read_u8()? != 0,
        }))
    }

    fn decode_skip(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Skip(SkipEvent {
            pass_index: self.read_u64()?,
            layer_index: self.read_u32()?,
        }))
    }

    fn decode_pass_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PassEnd(PassEndEvent {
            pass_index: self.read_u64()?,
            drawn: self.read_u32()?,
            skipped: self.read_u32()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_PASS_BEGIN => self.decode_pass_begin(),
            TAG_SNAPSHOT => self.decode_snapshot(),
            TAG_RESCALE => self.decode_rescale(),
            TAG_SYNC => self.decode_sync(),
            TAG_DRAW => self.decode_draw(),
            TAG_SKIP => self.decode_skip(),
            TAG_PASS_END => self.decode_pass_end(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
