//! Resize planning: pure dimension math, no pixels involved.

use super::params::ResizeBounds;
use super::probe::ProbedMetadata;

/// Decide whether the probed image needs a resize.
///
/// Returns the bounding box only when one is configured and the source
/// exceeds it in width or in height. Images that already fit are never
/// upscaled.
pub fn plan(probed: &ProbedMetadata, bounds: Option<ResizeBounds>) -> Option<ResizeBounds> {
    let bounds = bounds?;
    (probed.width > bounds.width || probed.height > bounds.height).then_some(bounds)
}

/// Dimensions of a fit-inside ("contain") resize of `source` into `bounds`.
///
/// Aspect ratio is preserved; neither side exceeds the box and neither side
/// drops below one pixel.
pub fn fit_inside(source: (u32, u32), bounds: ResizeBounds) -> (u32, u32) {
    let (src_w, src_h) = source;
    if src_w <= bounds.width && src_h <= bounds.height {
        return source;
    }

    let scale = f64::min(
        bounds.width as f64 / src_w as f64,
        bounds.height as f64 / src_h as f64,
    );
    let w = ((src_w as f64 * scale).round() as u32).clamp(1, bounds.width.max(1));
    let h = ((src_h as f64 * scale).round() as u32).clamp(1, bounds.height.max(1));
    (w, h)
}
