use std::sync::Arc;

use winit::window::Window;

/// Host display density source, read each time display settings are applied.
pub trait PixelDensity {
    /// Physical pixels per logical pixel.
    fn pixel_ratio(&self) -> f64;
}

/// A density that never changes. Useful for headless and off-screen hosts.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FixedDensity(pub f64);

impl Default for FixedDensity {
    fn default() -> Self {
        Self(1.0)
    }
}

impl PixelDensity for FixedDensity {
    fn pixel_ratio(&self) -> f64 {
        self.0
    }
}

impl PixelDensity for Window {
    fn pixel_ratio(&self) -> f64 {
        self.scale_factor()
    }
}

impl<D: PixelDensity + ?Sized> PixelDensity for Arc<D> {
    fn pixel_ratio(&self) -> f64 {
        (**self).pixel_ratio()
    }
}

impl<D: PixelDensity + ?Sized> PixelDensity for Box<D> {
    fn pixel_ratio(&self) -> f64 {
        (**self).pixel_ratio()
    }
}

/// Replaces unusable ratios (NaN, infinite, zero, negative) with 1.0.
pub fn sanitize_pixel_ratio(ratio: f64) -> f64 {
    if ratio.is_finite() && ratio > 0.0 {
        ratio
    } else {
        log::warn!("ignoring invalid device pixel ratio {ratio}; using 1.0");
        1.0
    }
}
