use super::density::{sanitize_pixel_ratio, PixelDensity};

/// Transfer function applied when writing final pixel colors.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum OutputEncoding {
    /// Colors are written as-is.
    Linear,
    /// Colors are gamma encoded (sRGB) on write.
    #[default]
    Srgb,
}

/// Settings reapplied to the renderer every time it is handed out.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DisplayConfig {
    pub output_encoding: OutputEncoding,
    pub shadow_map_enabled: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            output_encoding: OutputEncoding::Srgb,
            shadow_map_enabled: true,
        }
    }
}

/// Renderer properties that may change after creation.
pub trait DisplaySettings {
    fn set_output_encoding(&mut self, encoding: OutputEncoding);
    fn set_shadow_map_enabled(&mut self, enabled: bool);
    fn set_pixel_ratio(&mut self, ratio: f64);
}

/// Applies `config` and the host's current pixel density to `renderer`.
///
/// Applying the same values twice is a no-op for the renderer.
pub fn apply_display_config<R>(renderer: &mut R, config: &DisplayConfig, density: &dyn PixelDensity)
where
    R: DisplaySettings + ?Sized,
{
    renderer.set_output_encoding(config.output_encoding);
    renderer.set_shadow_map_enabled(config.shadow_map_enabled);
    renderer.set_pixel_ratio(sanitize_pixel_ratio(density.pixel_ratio()));
}
