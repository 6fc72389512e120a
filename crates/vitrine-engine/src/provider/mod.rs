//! Lazily created renderer, owned by the caller.
//!
//! A `RendererProvider` replaces a process-wide renderer global: whoever owns the
//! provider owns the renderer's lifetime, and every hand-out goes through
//! `get_or_create`, which reapplies the display configuration.

mod backend;
#[allow(clippy::module_inception)]
mod provider;

pub use backend::{RendererBackend, WgpuBackend};
pub use provider::RendererProvider;
