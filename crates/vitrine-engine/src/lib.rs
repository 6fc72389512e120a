//! Vitrine engine crate.
//!
//! Hands out a single wgpu renderer, created lazily for the first draw target it
//! is given and reconfigured for the host display every time it is requested.

pub mod device;
pub mod display;
pub mod logging;
pub mod provider;
pub mod renderer;

pub use device::{ContextOptions, DrawTarget, OffscreenTarget, RendererInit, TargetId};
pub use display::{apply_display_config, DisplayConfig, DisplaySettings, OutputEncoding, PixelDensity};
pub use provider::{RendererBackend, RendererProvider, WgpuBackend};
pub use renderer::Renderer;
