/// Options fixed when a renderer context is created.
///
/// Changing these requires a new renderer; the provider never rebuilds one.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ContextOptions {
    /// Composite the drawing buffer with its alpha channel.
    ///
    /// When off, an opaque composite mode is preferred and clears are forced to
    /// alpha 1.0.
    pub alpha: bool,

    /// Multisample the color buffer.
    pub antialias: bool,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            alpha: true,
            antialias: true,
        }
    }
}

/// Initialization parameters for a renderer.
///
/// Display settings (encoding, shadow map, pixel ratio) are not part of this
/// structure; they are applied after creation and may change at any time.
#[derive(Debug, Clone)]
pub struct RendererInit {
    pub context: ContextOptions,

    /// Present mode (swap behavior) for window targets.
    ///
    /// FIFO is supported everywhere.
    pub present_mode: wgpu::PresentMode,

    pub power_preference: wgpu::PowerPreference,

    /// Required wgpu features.
    ///
    /// Favor an empty set for portability unless a feature is strictly necessary.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,

    /// Desired maximum frame latency for window surfaces. A hint only.
    pub desired_maximum_frame_latency: u32,

    /// MSAA sample count used when `context.antialias` is set.
    ///
    /// Falls back to the next supported count (down to 1) for the target format.
    pub msaa_samples: u32,

    /// Edge length, in texels, of the square shadow-map atlas.
    pub shadow_map_size: u32,
}

impl Default for RendererInit {
    fn default() -> Self {
        Self {
            context: ContextOptions::default(),
            present_mode: wgpu::PresentMode::Fifo,
            power_preference: wgpu::PowerPreference::HighPerformance,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
            msaa_samples: 4,
            shadow_map_size: 2048,
        }
    }
}
