//! GPU device + draw target management.
//!
//! This module is responsible for:
//! - creation options for renderer contexts
//! - the on-screen / off-screen surfaces a renderer binds to
//! - acquiring the wgpu Adapter/Device/Queue
//! - format, alpha and sample-count selection
//! - surface error classification

mod error;
mod frame;
mod gpu;
mod init;
pub(crate) mod surface;
mod target;

pub use error::{classify_surface_error, SurfaceErrorAction};
pub use frame::RenderFrame;
pub(crate) use gpu::{create_instance, Gpu};
pub use init::{ContextOptions, RendererInit};
pub use surface::{drawing_buffer_size, encoded_format, format_encoding};
pub use target::{DrawTarget, OffscreenTarget, TargetId};
