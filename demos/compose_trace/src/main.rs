// Copyright 2026 the Coreg Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scripted composite passes that exercise the tracing and diagnostics
//! pipeline.
//!
//! Builds a CT base layer with a sagittal PET MPR overlay, runs six
//! composite passes through the software backend (pan/zoom, sync on,
//! resize, full invalidation), recording events to a
//! [`RecorderSink`](coreg_debug::recorder::RecorderSink). The recording is
//! then replayed through a
//! [`PrettyPrintSink`](coreg_debug::pretty::PrettyPrintSink) and exported
//! as a per-pass JSON report.

use std::fs::File;
use std::io::BufWriter;

use coreg_core::image::{ImageDescriptor, SourceId};
use coreg_core::layer::{LayerId, LayerStack};
use coreg_core::trace::{TraceSink, Tracer};
use coreg_core::viewport::ColormapId;
use kurbo::Vec2;

use coreg_backend_soft::{LayerCache, SoftSurface, StagedRasterizer, StagedSource};
use coreg_debug::pretty::PrettyPrintSink;
use coreg_debug::recorder::{RecordedEvent, RecorderSink, decode};
use coreg_render::{ComposeRequest, Compositor, FUNCTIONAL_LAYER_NAME};

const SURFACE_SIZE: u32 = 256;
const CT_SIZE: u32 = 128;
const PET_WIDTH: u32 = 32;
const PET_HEIGHT: u32 = 64;

fn main() {
    // -- backend -----------------------------------------------------------
    let cache = LayerCache::new();
    let mut surface = SoftSurface::new(SURFACE_SIZE, SURFACE_SIZE, cache.clone())
        .expect("failed to allocate the composite surface");
    let mut rasterizer = StagedRasterizer::new(cache);

    // -- layer stack: CT base + sagittal PET MPR overlay -------------------
    let mut stack = LayerStack::new();

    let ct = stack.create_layer();
    stack.set_image(
        ct,
        Some(ImageDescriptor {
            source: Some(SourceId::new("ct://series/chest/1")),
            ..ImageDescriptor::new(CT_SIZE, CT_SIZE)
        }),
    );
    stack.set_active(ct);

    let pet = stack.create_layer();
    stack.set_image(
        pet,
        Some(ImageDescriptor {
            row_spacing: 4.0,
            column_spacing: 4.0,
            source: Some(SourceId::new("ptmprsagittal://series/chest/2")),
            ..ImageDescriptor::new(PET_WIDTH, PET_HEIGHT)
        }),
    );
    stack.set_name(pet, Some(FUNCTIONAL_LAYER_NAME.into()));
    let mut options = stack.options(pet).clone();
    options.opacity = 0.6;
    stack.set_options(pet, options);
    let mut viewport = stack.viewport(pet);
    viewport.colormap = Some(ColormapId(3));
    stack.set_viewport(pet, viewport);

    stage_ct(&mut rasterizer, ct, CT_SIZE, CT_SIZE);
    stage_pet(&mut rasterizer, pet, PET_WIDTH, PET_HEIGHT);

    // -- scripted passes ----------------------------------------------------
    let mut compositor = Compositor::new();
    let mut recorder = RecorderSink::new();
    let synced = ComposeRequest {
        sync_viewports: true,
        invalidate: false,
    };

    // 1. First composite: every layer draws.
    run_pass(
        &mut compositor,
        &mut stack,
        &mut surface,
        &mut rasterizer,
        &mut recorder,
        ComposeRequest::default(),
    );

    // 2. The host pans and zooms the CT; the PET stays cached.
    let mut viewport = stack.viewport(ct);
    viewport.scale = 1.5;
    viewport.translation = Vec2::new(12.0, -8.0);
    stack.set_viewport(ct, viewport);
    run_pass(
        &mut compositor,
        &mut stack,
        &mut surface,
        &mut rasterizer,
        &mut recorder,
        ComposeRequest::default(),
    );

    // 3. Viewport sync switches on: baselines anchor, the sweep follows.
    run_pass(
        &mut compositor,
        &mut stack,
        &mut surface,
        &mut rasterizer,
        &mut recorder,
        synced,
    );

    // 4. Another zoom propagates to the PET through the sweep.
    let mut viewport = stack.viewport(ct);
    viewport.scale = 2.0;
    stack.set_viewport(ct, viewport);
    run_pass(
        &mut compositor,
        &mut stack,
        &mut surface,
        &mut rasterizer,
        &mut recorder,
        synced,
    );

    // 5. The PET view resizes: refit, spacing rescale, forced sweep.
    stack.request_resize(pet);
    run_pass(
        &mut compositor,
        &mut stack,
        &mut surface,
        &mut rasterizer,
        &mut recorder,
        synced,
    );

    // 6. The host invalidates everything (e.g. the surface was recreated).
    run_pass(
        &mut compositor,
        &mut stack,
        &mut surface,
        &mut rasterizer,
        &mut recorder,
        ComposeRequest {
            sync_viewports: true,
            invalidate: true,
        },
    );

    // -- replay + report ----------------------------------------------------
    let mut pretty = PrettyPrintSink::new(Box::new(std::io::stdout()));
    replay(recorder.as_bytes(), &mut pretty);

    let path = "compose_report.json";
    let file = File::create(path).expect("failed to create compose_report.json");
    let mut writer = BufWriter::new(file);
    coreg_debug::report::export(recorder.as_bytes(), &mut writer)
        .expect("failed to write the pass report");

    let passes = decode(recorder.as_bytes())
        .filter(|e| matches!(e, RecordedEvent::PassEnd(_)))
        .count();
    let lit = surface
        .unmultiplied_rgba()
        .chunks_exact(4)
        .filter(|px| px[..3].iter().any(|&c| c > 0))
        .count();
    let total = (SURFACE_SIZE * SURFACE_SIZE) as usize;
    println!(
        "Wrote {path} ({passes} passes, {lit}/{total} pixels lit, {} pixmap refreshes)",
        rasterizer.refreshes(),
    );
}

/// Runs one composite pass, recording its trace events.
fn run_pass(
    compositor: &mut Compositor,
    stack: &mut LayerStack,
    surface: &mut SoftSurface,
    rasterizer: &mut StagedRasterizer,
    recorder: &mut RecorderSink,
    request: ComposeRequest,
) {
    let mut tracer = Tracer::new(recorder);
    compositor
        .compose(stack, surface, rasterizer, request, &mut tracer)
        .expect("composite pass failed");
}

/// Replays a binary recording into a sink, one event at a time.
fn replay(bytes: &[u8], sink: &mut dyn TraceSink) {
    for event in decode(bytes) {
        match event {
            RecordedEvent::PassBegin(e) => sink.on_pass_begin(&e),
            RecordedEvent::Snapshot(e) => sink.on_snapshot(&e),
            RecordedEvent::Rescale(e) => sink.on_rescale(&e),
            RecordedEvent::Sync(e) => sink.on_sync(&e),
            RecordedEvent::Draw(e) => sink.on_draw(&e),
            RecordedEvent::Skip(e) => sink.on_skip(&e),
            RecordedEvent::PassEnd(e) => sink.on_pass_end(&e),
        }
    }
}

/// Stages a diagonal grayscale ramp, standing in for windowed CT pixels.
fn stage_ct(rasterizer: &mut StagedRasterizer, layer: LayerId, width: u32, height: u32) {
    let mut samples = Vec::with_capacity((width * height) as usize);
    let mut shade: u8 = 0;
    for _ in 0..width * height {
        samples.push(shade);
        shade = shade.wrapping_add(3);
    }
    let source = StagedSource::gray8(width, height, samples).expect("CT staging");
    rasterizer.stage(layer, source);
}

/// Stages a warm color ramp with straight alpha, standing in for
/// colormapped PET uptake.
fn stage_pet(rasterizer: &mut StagedRasterizer, layer: LayerId, width: u32, height: u32) {
    let mut samples = Vec::with_capacity((width * height * 4) as usize);
    let mut heat: u8 = 0;
    for _ in 0..width * height {
        samples.extend_from_slice(&[heat, heat / 3, 0, 160]);
        heat = heat.wrapping_add(5);
    }
    let source = StagedSource::rgba8(width, height, samples).expect("PET staging");
    rasterizer.stage(layer, source);
}
