//! wgpu-backed renderer handle.
//!
//! Owns the device, the draw target it was created for, and the buffers that
//! depend on display settings (MSAA color, shadow atlas).

mod buffers;
mod handle;

pub use handle::Renderer;
