use anyhow::{Context, Result};

use crate::device::{ContextOptions, RendererInit};
use crate::display::{apply_display_config, DisplayConfig, PixelDensity};

use super::backend::{RendererBackend, WgpuBackend};

/// Owns at most one renderer and hands it out with display settings reapplied.
///
/// The renderer is created on the first [`get_or_create`](Self::get_or_create)
/// and bound to the target passed to that call. Targets passed afterwards are
/// dropped: the renderer keeps drawing into its original surface.
pub struct RendererProvider<B: RendererBackend = WgpuBackend> {
    backend: B,
    density: Box<dyn PixelDensity>,
    display: DisplayConfig,
    renderer: Option<B::Renderer>,
}

impl RendererProvider<WgpuBackend> {
    /// Provider backed by wgpu. `density` is the host display, read on every hand-out.
    ///
    /// Renderers are always created with alpha and antialiasing enabled;
    /// `init.context` is replaced. Build a [`WgpuBackend`] and use
    /// [`new`](Self::new) for other context options.
    pub fn wgpu(mut init: RendererInit, density: impl PixelDensity + 'static) -> Self {
        let context = ContextOptions::default();
        if init.context != context {
            log::debug!("overriding context options {:?} with {context:?}", init.context);
        }
        init.context = context;
        Self::new(WgpuBackend::new(init), density)
    }
}

impl<B: RendererBackend> RendererProvider<B> {
    pub fn new(backend: B, density: impl PixelDensity + 'static) -> Self {
        Self {
            backend,
            density: Box::new(density),
            display: DisplayConfig::default(),
            renderer: None,
        }
    }

    /// Replaces the settings reapplied on every hand-out.
    pub fn with_display_config(mut self, config: DisplayConfig) -> Self {
        self.display = config;
        self
    }

    pub fn display_config(&self) -> DisplayConfig {
        self.display
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn is_initialized(&self) -> bool {
        self.renderer.is_some()
    }

    /// Returns the renderer, creating it bound to `target` if none exists yet.
    ///
    /// Display settings are reapplied on every call. When a renderer already
    /// exists `target` is ignored, even if it differs from the bound surface.
    /// A failed creation leaves the provider empty; the next call retries.
    pub fn get_or_create(&mut self, target: B::Target) -> Result<&mut B::Renderer> {
        let renderer = match self.renderer.take() {
            Some(renderer) => {
                log::debug!("renderer exists; ignoring draw target {target:?}");
                renderer
            }
            None => {
                log::debug!("creating renderer for {target:?}");
                self.backend
                    .create(target)
                    .context("failed to create renderer")?
            }
        };

        let renderer = self.renderer.insert(renderer);
        apply_display_config(renderer, &self.display, &*self.density);
        Ok(renderer)
    }

    /// Reapplies display settings without a target. `None` before the first creation.
    pub fn apply_display_config(&mut self) -> Option<&mut B::Renderer> {
        let renderer = self.renderer.as_mut()?;
        apply_display_config(renderer, &self.display, &*self.density);
        Some(renderer)
    }

    pub fn renderer(&self) -> Option<&B::Renderer> {
        self.renderer.as_ref()
    }

    pub fn renderer_mut(&mut self) -> Option<&mut B::Renderer> {
        self.renderer.as_mut()
    }

    /// Releases the renderer. The next `get_or_create` builds a new one.
    pub fn take(&mut self) -> Option<B::Renderer> {
        self.renderer.take()
    }
}
