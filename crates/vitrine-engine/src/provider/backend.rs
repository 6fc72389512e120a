use std::fmt;

use anyhow::Result;

use crate::device::{DrawTarget, RendererInit};
use crate::display::DisplaySettings;
use crate::renderer::Renderer;

/// Constructs renderers for a provider.
pub trait RendererBackend {
    /// Surface handle a renderer is bound to at creation.
    type Target: fmt::Debug;

    type Renderer: DisplaySettings;

    fn create(&mut self, target: Self::Target) -> Result<Self::Renderer>;
}

/// Production backend: wgpu renderers created with a fixed [`RendererInit`].
#[derive(Debug, Clone, Default)]
pub struct WgpuBackend {
    init: RendererInit,
}

impl WgpuBackend {
    pub fn new(init: RendererInit) -> Self {
        Self { init }
    }

    pub fn init(&self) -> &RendererInit {
        &self.init
    }
}

impl RendererBackend for WgpuBackend {
    type Target = DrawTarget;
    type Renderer = Renderer;

    fn create(&mut self, target: DrawTarget) -> Result<Renderer> {
        pollster::block_on(Renderer::new(target, &self.init))
    }
}
