//! Display settings that are reapplied to a renderer on every hand-out.
//!
//! Creation-time options live in `device`; everything here may change while the
//! renderer is alive.

mod density;
mod settings;

pub use density::{sanitize_pixel_ratio, FixedDensity, PixelDensity};
pub use settings::{apply_display_config, DisplayConfig, DisplaySettings, OutputEncoding};
