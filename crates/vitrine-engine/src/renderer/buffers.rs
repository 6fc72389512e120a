use winit::dpi::PhysicalSize;

/// A 2D color texture owned by the renderer (off-screen target or MSAA buffer).
pub(crate) struct ColorBuffer {
    texture: wgpu::Texture,
}

impl ColorBuffer {
    pub(crate) fn new(
        device: &wgpu::Device,
        label: &str,
        format: wgpu::TextureFormat,
        size: PhysicalSize<u32>,
        sample_count: u32,
        usage: wgpu::TextureUsages,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size.width.max(1),
                height: size.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });

        Self { texture }
    }

    pub(crate) fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    pub(crate) fn view(&self) -> wgpu::TextureView {
        self.texture
            .create_view(&wgpu::TextureViewDescriptor::default())
    }
}

/// Square depth atlas used by shadow passes.
///
/// The texture only exists while shadow mapping is enabled.
pub(crate) struct ShadowMap {
    enabled: bool,
    size: u32,
    atlas: Option<(wgpu::Texture, wgpu::TextureView)>,
}

impl ShadowMap {
    pub(crate) const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    pub(crate) fn new(size: u32) -> Self {
        Self {
            enabled: false,
            size: size.max(1),
            atlas: None,
        }
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn size(&self) -> u32 {
        self.size
    }

    pub(crate) fn view(&self) -> Option<&wgpu::TextureView> {
        self.atlas.as_ref().map(|(_, view)| view)
    }

    pub(crate) fn set_enabled(&mut self, device: &wgpu::Device, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;

        if !enabled {
            self.atlas = None;
            log::debug!("shadow map released");
            return;
        }

        let max = device.limits().max_texture_dimension_2d;
        if self.size > max {
            log::warn!("shadow map size {} exceeds device limit {max}; clamping", self.size);
            self.size = max;
        }

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("vitrine shadow map"),
            size: wgpu::Extent3d {
                width: self.size,
                height: self.size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        log::debug!("shadow map allocated ({0}x{0})", self.size);
        self.atlas = Some((texture, view));
    }
}
