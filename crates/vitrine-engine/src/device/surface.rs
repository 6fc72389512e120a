//! Format, alpha, sample-count and buffer-size selection.
//!
//! Kept free of GPU objects so the decisions can be tested headless.

use winit::dpi::{LogicalSize, PhysicalSize};

use crate::display::OutputEncoding;

/// Returns the variant of `format` that matches `encoding`.
///
/// Formats without an sRGB twin are returned unchanged.
pub fn encoded_format(format: wgpu::TextureFormat, encoding: OutputEncoding) -> wgpu::TextureFormat {
    match encoding {
        OutputEncoding::Srgb => format.add_srgb_suffix(),
        OutputEncoding::Linear => format.remove_srgb_suffix(),
    }
}

/// Encoding a format applies on write. Formats without an sRGB variant are linear.
pub fn format_encoding(format: wgpu::TextureFormat) -> OutputEncoding {
    if format.remove_srgb_suffix() != format {
        OutputEncoding::Srgb
    } else {
        OutputEncoding::Linear
    }
}

fn has_srgb_twin(format: wgpu::TextureFormat) -> bool {
    format.add_srgb_suffix() != format.remove_srgb_suffix()
}

/// Surface configuration format and view formats needed to render as `format`.
///
/// When the surface cannot be configured with `format` directly, it is
/// configured with the other-encoding twin and `format` becomes a view format.
pub(crate) fn surface_formats(
    supported: &[wgpu::TextureFormat],
    format: wgpu::TextureFormat,
) -> (wgpu::TextureFormat, Vec<wgpu::TextureFormat>) {
    if supported.contains(&format) {
        return (format, vec![]);
    }

    let twin = match format_encoding(format) {
        OutputEncoding::Srgb => format.remove_srgb_suffix(),
        OutputEncoding::Linear => format.add_srgb_suffix(),
    };
    if twin != format && supported.contains(&twin) {
        (twin, vec![format])
    } else {
        (format, vec![])
    }
}

pub(crate) fn choose_surface_format(
    supported: &[wgpu::TextureFormat],
    encoding: OutputEncoding,
) -> Option<wgpu::TextureFormat> {
    if supported.is_empty() {
        return None;
    }

    let preferred = match encoding {
        OutputEncoding::Srgb => [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ],
        OutputEncoding::Linear => [
            wgpu::TextureFormat::Bgra8Unorm,
            wgpu::TextureFormat::Rgba8Unorm,
        ],
    };
    for f in preferred {
        if supported.contains(&f) {
            return Some(f);
        }
    }

    // A format with an sRGB twin can honor either encoding through a view format.
    supported
        .iter()
        .copied()
        .find(|f| format_encoding(*f) == encoding && has_srgb_twin(*f))
        .or_else(|| supported.iter().copied().find(|f| has_srgb_twin(*f)))
        .or(Some(supported[0]))
}

pub(crate) fn choose_alpha_mode(
    supported: &[wgpu::CompositeAlphaMode],
    alpha: bool,
) -> wgpu::CompositeAlphaMode {
    let preferred: &[wgpu::CompositeAlphaMode] = if alpha {
        &[
            wgpu::CompositeAlphaMode::PreMultiplied,
            wgpu::CompositeAlphaMode::PostMultiplied,
        ]
    } else {
        &[wgpu::CompositeAlphaMode::Opaque]
    };

    preferred
        .iter()
        .copied()
        .find(|m| supported.contains(m))
        .or_else(|| supported.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// Picks the highest supported sample count not above `requested`.
pub(crate) fn choose_sample_count(
    antialias: bool,
    requested: u32,
    supported: impl Fn(u32) -> bool,
) -> u32 {
    if !antialias {
        return 1;
    }

    [16, 8, 4, 2]
        .into_iter()
        .filter(|&n| n <= requested)
        .find(|&n| supported(n))
        .unwrap_or(1)
}

/// Drawing-buffer size for a logical size at a pixel ratio. Never zero.
pub fn drawing_buffer_size(logical: LogicalSize<f64>, pixel_ratio: f64) -> PhysicalSize<u32> {
    let scale = |v: f64| ((v * pixel_ratio).round() as u32).max(1);
    PhysicalSize::new(scale(logical.width), scale(logical.height))
}

/// [`drawing_buffer_size`] clamped to the device's texture limit.
pub(crate) fn fit_drawing_buffer(
    logical: LogicalSize<f64>,
    pixel_ratio: f64,
    max_dimension: u32,
) -> PhysicalSize<u32> {
    let size = drawing_buffer_size(logical, pixel_ratio);
    let max = max_dimension.max(1);
    if size.width <= max && size.height <= max {
        return size;
    }

    log::warn!(
        "drawing buffer {}x{} exceeds device limit {max}; clamping",
        size.width,
        size.height
    );
    PhysicalSize::new(size.width.min(max), size.height.min(max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::TextureFormat as F;

    // ── encoded_format ────────────────────────────────────────────────────

    #[test]
    fn srgb_encoding_adds_suffix() {
        assert_eq!(encoded_format(F::Bgra8Unorm, OutputEncoding::Srgb), F::Bgra8UnormSrgb);
        assert_eq!(encoded_format(F::Rgba8UnormSrgb, OutputEncoding::Srgb), F::Rgba8UnormSrgb);
    }

    #[test]
    fn linear_encoding_removes_suffix() {
        assert_eq!(encoded_format(F::Rgba8UnormSrgb, OutputEncoding::Linear), F::Rgba8Unorm);
    }

    #[test]
    fn formats_without_srgb_twin_are_unchanged() {
        assert_eq!(encoded_format(F::Rgba16Float, OutputEncoding::Srgb), F::Rgba16Float);
    }

    // ── choose_surface_format ─────────────────────────────────────────────

    #[test]
    fn empty_capabilities_yield_none() {
        assert_eq!(choose_surface_format(&[], OutputEncoding::Srgb), None);
    }

    #[test]
    fn prefers_bgra_srgb() {
        let caps = [F::Rgba8UnormSrgb, F::Bgra8Unorm, F::Bgra8UnormSrgb];
        assert_eq!(
            choose_surface_format(&caps, OutputEncoding::Srgb),
            Some(F::Bgra8UnormSrgb)
        );
    }

    #[test]
    fn linear_picks_plain_variant() {
        let caps = [F::Bgra8UnormSrgb, F::Bgra8Unorm];
        assert_eq!(
            choose_surface_format(&caps, OutputEncoding::Linear),
            Some(F::Bgra8Unorm)
        );
    }

    #[test]
    fn linear_only_surface_keeps_twin_capable_format() {
        assert_eq!(
            choose_surface_format(&[F::Rgba8Unorm], OutputEncoding::Srgb),
            Some(F::Rgba8Unorm)
        );
        assert_eq!(
            choose_surface_format(&[F::Rgba16Float, F::Rgb10a2Unorm, F::Bgra8Unorm], OutputEncoding::Srgb),
            Some(F::Bgra8Unorm)
        );
    }

    #[test]
    fn falls_back_to_first_format() {
        let caps = [F::Rgb10a2Unorm];
        assert_eq!(
            choose_surface_format(&caps, OutputEncoding::Srgb),
            Some(F::Rgb10a2Unorm)
        );
    }

    // ── format_encoding / surface_formats ─────────────────────────────────

    #[test]
    fn encoding_of_formats() {
        assert_eq!(format_encoding(F::Bgra8UnormSrgb), OutputEncoding::Srgb);
        assert_eq!(format_encoding(F::Bgra8Unorm), OutputEncoding::Linear);
        assert_eq!(format_encoding(F::Rgba16Float), OutputEncoding::Linear);
    }

    #[test]
    fn supported_format_is_configured_directly() {
        let (config, views) = surface_formats(&[F::Bgra8UnormSrgb], F::Bgra8UnormSrgb);
        assert_eq!(config, F::Bgra8UnormSrgb);
        assert!(views.is_empty());
    }

    #[test]
    fn srgb_on_linear_only_surface_uses_view_format() {
        let chosen = choose_surface_format(&[F::Rgba8Unorm], OutputEncoding::Srgb).unwrap();
        let format = encoded_format(chosen, OutputEncoding::Srgb);
        assert_eq!(format_encoding(format), OutputEncoding::Srgb);

        let (config, views) = surface_formats(&[F::Rgba8Unorm], format);
        assert_eq!(config, F::Rgba8Unorm);
        assert_eq!(views, vec![F::Rgba8UnormSrgb]);
    }

    #[test]
    fn linear_on_srgb_only_surface_uses_view_format() {
        let (config, views) = surface_formats(&[F::Bgra8UnormSrgb], F::Bgra8Unorm);
        assert_eq!(config, F::Bgra8UnormSrgb);
        assert_eq!(views, vec![F::Bgra8Unorm]);
    }

    // ── choose_alpha_mode ─────────────────────────────────────────────────

    #[test]
    fn alpha_prefers_premultiplied() {
        use wgpu::CompositeAlphaMode as A;
        let caps = [A::Opaque, A::PostMultiplied, A::PreMultiplied];
        assert_eq!(choose_alpha_mode(&caps, true), A::PreMultiplied);
    }

    #[test]
    fn alpha_without_blending_support_uses_first() {
        use wgpu::CompositeAlphaMode as A;
        assert_eq!(choose_alpha_mode(&[A::Opaque], true), A::Opaque);
    }

    #[test]
    fn opaque_requested() {
        use wgpu::CompositeAlphaMode as A;
        assert_eq!(choose_alpha_mode(&[A::PreMultiplied, A::Opaque], false), A::Opaque);
    }

    #[test]
    fn no_alpha_modes_is_auto() {
        assert_eq!(choose_alpha_mode(&[], true), wgpu::CompositeAlphaMode::Auto);
    }

    // ── choose_sample_count ───────────────────────────────────────────────

    #[test]
    fn antialias_off_is_single_sample() {
        assert_eq!(choose_sample_count(false, 4, |_| true), 1);
    }

    #[test]
    fn requested_count_when_supported() {
        assert_eq!(choose_sample_count(true, 4, |_| true), 4);
    }

    #[test]
    fn steps_down_to_supported_count() {
        assert_eq!(choose_sample_count(true, 8, |n| n <= 2), 2);
    }

    #[test]
    fn unsupported_msaa_is_single_sample() {
        assert_eq!(choose_sample_count(true, 4, |_| false), 1);
    }

    // ── drawing_buffer_size ───────────────────────────────────────────────

    #[test]
    fn buffer_scales_by_ratio() {
        let size = drawing_buffer_size(LogicalSize::new(800.0, 600.0), 2.0);
        assert_eq!(size, PhysicalSize::new(1600, 1200));
    }

    #[test]
    fn fractional_ratio_rounds() {
        let size = drawing_buffer_size(LogicalSize::new(101.0, 33.0), 1.5);
        assert_eq!(size, PhysicalSize::new(152, 50));
    }

    #[test]
    fn buffer_is_never_zero() {
        let size = drawing_buffer_size(LogicalSize::new(0.0, 0.2), 1.0);
        assert_eq!(size, PhysicalSize::new(1, 1));
    }

    #[test]
    fn buffer_within_limit_is_unchanged() {
        let size = fit_drawing_buffer(LogicalSize::new(4096.0, 10.0), 2.0, 8192);
        assert_eq!(size, PhysicalSize::new(8192, 20));
    }

    #[test]
    fn oversized_buffer_is_clamped_to_limit() {
        let size = fit_drawing_buffer(LogicalSize::new(6000.0, 10.0), 2.0, 8192);
        assert_eq!(size, PhysicalSize::new(8192, 20));

        let size = fit_drawing_buffer(LogicalSize::new(9000.0, 9000.0), 1.0, 8192);
        assert_eq!(size, PhysicalSize::new(8192, 8192));
    }
}
