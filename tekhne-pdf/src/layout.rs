// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Fixed A4 page geometry.
//!
//! All distances are PDF points measured top-down from the upper page edge;
//! conversion into printpdf's bottom-up millimetre coordinates happens at
//! the draw calls.

use printpdf::Mm;

pub(crate) const PAGE_WIDTH: f64 = 595.0;
pub(crate) const PAGE_HEIGHT: f64 = 842.0;
pub(crate) const MARGIN_X: f64 = 40.0;
pub(crate) const TOP_OFFSET: f64 = 50.0;

pub(crate) const IMAGE_MAX_WIDTH: f64 = PAGE_WIDTH - 2.0 * MARGIN_X;
pub(crate) const IMAGE_MAX_HEIGHT: f64 = 200.0;

/// Vertical space a step must be able to start in: room for its title, its
/// description line and a worst-case image.
pub(crate) const STEP_RESERVE: f64 = IMAGE_MAX_HEIGHT + 100.0;

const MM_PER_PT: f64 = 25.4 / 72.0;

/// Convert a point distance into printpdf millimetres.
pub(crate) fn mm(points: f64) -> Mm {
    Mm((points * MM_PER_PT) as f32)
}

/// Baseline position of a top-down cursor value.
pub(crate) fn baseline(y: f64) -> Mm {
    mm(PAGE_HEIGHT - y)
}

/// Uniform scale factor that fits a `width` x `height` pixel image inside
/// the image box, preserving the aspect ratio.
pub(crate) fn fit_scale(width: u32, height: u32) -> f64 {
    let w = f64::from(width);
    let h = f64::from(height);
    (IMAGE_MAX_WIDTH / w).min(IMAGE_MAX_HEIGHT / h)
}
