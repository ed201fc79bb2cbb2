// Copyright 2026 the Coreg Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Image descriptors and source-identifier parsing.
//!
//! A layer references its image through an [`ImageDescriptor`]: pixel
//! dimensions, physical pixel spacing, a color-vs-grayscale flag, and an
//! optional [`SourceId`]. Pixel data itself lives behind the rasterizer seam
//! (an imaging pipeline, a decoder, a test fixture) and is never stored here.
//!
//! Source identifiers are URL-like strings whose scheme encodes how the
//! image was produced. Reformatted acquisitions use the scheme grammar
//! `<modality>mpr<plane>` — for example `ptmprsagittal://series/42` names a
//! sagittal multi-planar reformat of a PET series. [`SourceId::reformat`]
//! parses that grammar; [`ImageDescriptor::is_fusion_overlay`] uses it to
//! decide whether a layer is drawn with the fusion transform
//! (see [`fusion`](crate::fusion)).

use alloc::string::String;

/// Acquisition modality encoded in a reformat scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Modality {
    /// Computed tomography.
    Ct,
    /// Magnetic resonance.
    Mr,
    /// Positron emission tomography.
    Pt,
}

/// Anatomical plane of a multi-planar reformat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Plane {
    /// Transverse plane (the native acquisition plane).
    Axial,
    /// Side-to-side plane.
    Sagittal,
    /// Front-to-back plane.
    Coronal,
}

/// A parsed reformat scheme: which modality was reformatted, and onto which
/// plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Reformat {
    /// Source modality.
    pub modality: Modality,
    /// Reformat plane.
    pub plane: Plane,
}

/// An image source identifier.
///
/// Opaque to everything except the scheme prefix. Layers whose images carry
/// no source identifier (dynamically generated or synthetic images) are not
/// spacing-comparable and are skipped by
/// [`rescale`](crate::layer::LayerStack::rescale).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SourceId(pub String);

impl SourceId {
    /// Creates a source identifier from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the scheme portion (the text before `://`), if present.
    #[must_use]
    pub fn scheme(&self) -> Option<&str> {
        self.0.split_once("://").map(|(scheme, _)| scheme)
    }

    /// Parses the scheme as a `<modality>mpr<plane>` reformat.
    ///
    /// Schemes are expected in lowercase; anything that does not match the
    /// grammar exactly is not a recognized reformat and yields `None`.
    #[must_use]
    pub fn reformat(&self) -> Option<Reformat> {
        let scheme = self.scheme()?;
        let (modality, rest) = if let Some(rest) = scheme.strip_prefix("ct") {
            (Modality::Ct, rest)
        } else if let Some(rest) = scheme.strip_prefix("mr") {
            (Modality::Mr, rest)
        } else if let Some(rest) = scheme.strip_prefix("pt") {
            (Modality::Pt, rest)
        } else {
            return None;
        };
        let plane = match rest.strip_prefix("mpr")? {
            "axial" => Plane::Axial,
            "sagittal" => Plane::Sagittal,
            "coronal" => Plane::Coronal,
            _ => return None,
        };
        Some(Reformat { modality, plane })
    }
}

/// Geometry and interpretation of a layer's image.
///
/// Spacings are physical distances between adjacent pixel centers, in
/// millimeters: `row_spacing` between rows (vertical step), `column_spacing`
/// between columns (horizontal step). Anisotropic spacing
/// (`row_spacing != column_spacing`) is common in reformatted series and is
/// corrected for during transform construction.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageDescriptor {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Physical distance between adjacent rows, in mm.
    pub row_spacing: f64,
    /// Physical distance between adjacent columns, in mm.
    pub column_spacing: f64,
    /// Whether the image carries color pixels (as opposed to grayscale
    /// samples that are windowed at rasterization time).
    pub color: bool,
    /// Source identifier, if the image came from an addressable source.
    pub source: Option<SourceId>,
}

impl ImageDescriptor {
    /// Creates a grayscale descriptor with square 1 mm pixels and no source.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            row_spacing: 1.0,
            column_spacing: 1.0,
            color: false,
            source: None,
        }
    }

    /// Physical width of the image in mm.
    #[inline]
    #[must_use]
    pub fn physical_width(&self) -> f64 {
        f64::from(self.width) * self.column_spacing
    }

    /// Physical height of the image in mm.
    #[inline]
    #[must_use]
    pub fn physical_height(&self) -> f64 {
        f64::from(self.height) * self.row_spacing
    }

    /// Whether this image is a non-axial reformat of a functional modality,
    /// i.e. whether the layer must be drawn with the fusion transform rather
    /// than the standard display transform.
    #[must_use]
    pub fn is_fusion_overlay(&self) -> bool {
        self.source
            .as_ref()
            .and_then(SourceId::reformat)
            .is_some_and(|r| r.modality == Modality::Pt && r.plane != Plane::Axial)
    }
}
