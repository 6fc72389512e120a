use std::sync::Arc;

use anyhow::{Context, Result};
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::window::Window;

use crate::device::surface::{
    choose_alpha_mode, choose_sample_count, choose_surface_format, fit_drawing_buffer,
    surface_formats,
};
use crate::device::{
    classify_surface_error, create_instance, encoded_format, format_encoding, ContextOptions,
    DrawTarget, Gpu, OffscreenTarget, RenderFrame, RendererInit, SurfaceErrorAction, TargetId,
};
use crate::display::{sanitize_pixel_ratio, DisplaySettings, OutputEncoding};

use super::buffers::{ColorBuffer, ShadowMap};

const OFFSCREEN_BASE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Surface the renderer draws into.
enum Binding {
    Window {
        window: Arc<Window>,
        surface: wgpu::Surface<'static>,
        config: wgpu::SurfaceConfiguration,
        /// Formats the surface accepts directly.
        supported: Vec<wgpu::TextureFormat>,
    },
    Offscreen {
        target: OffscreenTarget,
        color: ColorBuffer,
    },
}

/// GPU renderer handle bound to one draw target for its whole lifetime.
///
/// Alpha and antialiasing are fixed at creation. Output encoding, shadow mapping
/// and pixel ratio are changed through [`DisplaySettings`]; setters that leave the
/// effective format and drawing-buffer size untouched do not touch GPU resources.
///
/// The reported output encoding is always that of the active render format.
/// The drawing buffer is clamped to the device's 2D texture limit.
pub struct Renderer {
    gpu: Gpu,
    binding: Binding,
    target_id: TargetId,

    options: ContextOptions,
    alpha_mode: wgpu::CompositeAlphaMode,
    /// Format pipelines render to (view format of the drawing buffer).
    /// Determines the reported output encoding.
    format: wgpu::TextureFormat,
    requested_samples: u32,
    sample_count: u32,
    msaa: Option<ColorBuffer>,

    shadow_map: ShadowMap,
    pixel_ratio: f64,
    logical_size: LogicalSize<f64>,
    buffer_size: PhysicalSize<u32>,
    max_dimension: u32,

    /// Outlives the surface; fields drop in declaration order.
    _instance: wgpu::Instance,
}

impl Renderer {
    /// Creates a renderer bound to `target`.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu. Fails when the
    /// target has zero size or no usable GPU context can be acquired.
    pub async fn new(target: DrawTarget, init: &RendererInit) -> Result<Self> {
        let logical_size = target.logical_size();
        anyhow::ensure!(
            logical_size.width > 0.0 && logical_size.height > 0.0,
            "draw target has zero size"
        );

        let target_id = target.id();
        let encoding = OutputEncoding::default();
        let instance = create_instance();

        let (gpu, binding, format, alpha_mode, pixel_ratio, buffer_size) = match target {
            DrawTarget::Window(window) => {
                let surface = instance
                    .create_surface(window.clone())
                    .context("failed to create wgpu surface")?;

                let gpu = Gpu::new(&instance, Some(&surface), init).await?;

                // Window density until the first display config says otherwise.
                let pixel_ratio = window.scale_factor();
                let buffer_size =
                    fit_drawing_buffer(logical_size, pixel_ratio, gpu.max_texture_dimension());

                let caps = surface.get_capabilities(&gpu.adapter);
                let chosen = choose_surface_format(&caps.formats, encoding)
                    .context("no supported surface formats")?;
                let format = encoded_format(chosen, encoding);
                let (config_format, view_formats) = surface_formats(&caps.formats, format);
                let alpha_mode = choose_alpha_mode(&caps.alpha_modes, init.context.alpha);

                let present_mode = if caps.present_modes.contains(&init.present_mode) {
                    init.present_mode
                } else {
                    log::warn!(
                        "present mode {:?} unsupported; using Fifo",
                        init.present_mode
                    );
                    wgpu::PresentMode::Fifo
                };

                let config = wgpu::SurfaceConfiguration {
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    format: config_format,
                    width: buffer_size.width,
                    height: buffer_size.height,
                    present_mode,
                    alpha_mode,
                    view_formats,
                    desired_maximum_frame_latency: init.desired_maximum_frame_latency,
                };
                surface.configure(&gpu.device, &config);

                let binding = Binding::Window {
                    window,
                    surface,
                    config,
                    supported: caps.formats,
                };
                (gpu, binding, format, alpha_mode, pixel_ratio, buffer_size)
            }

            DrawTarget::Offscreen(target) => {
                let gpu = Gpu::new(&instance, None, init).await?;

                let pixel_ratio = 1.0;
                let buffer_size =
                    fit_drawing_buffer(logical_size, pixel_ratio, gpu.max_texture_dimension());

                let format = encoded_format(OFFSCREEN_BASE_FORMAT, encoding);
                // Nothing composites an off-screen target; record what was asked for.
                let alpha_mode = if init.context.alpha {
                    wgpu::CompositeAlphaMode::PreMultiplied
                } else {
                    wgpu::CompositeAlphaMode::Opaque
                };

                let color = offscreen_color(&gpu.device, &target, format, buffer_size);
                let binding = Binding::Offscreen { target, color };
                (gpu, binding, format, alpha_mode, pixel_ratio, buffer_size)
            }
        };

        let sample_count = choose_sample_count(init.context.antialias, init.msaa_samples, |n| {
            gpu.supports_sample_count(format, n)
        });
        if format_encoding(format) != encoding {
            log::warn!("{format:?} cannot be written {encoding:?}; output stays linear");
        }
        if init.context.antialias && sample_count < init.msaa_samples {
            log::warn!(
                "{}x MSAA unsupported for {format:?}; using {sample_count}x",
                init.msaa_samples
            );
        }

        let max_dimension = gpu.max_texture_dimension();
        let mut renderer = Self {
            gpu,
            binding,
            target_id,
            options: init.context,
            alpha_mode,
            format,
            requested_samples: init.msaa_samples,
            sample_count,
            msaa: None,
            shadow_map: ShadowMap::new(init.shadow_map_size),
            pixel_ratio,
            logical_size,
            buffer_size,
            max_dimension,
            _instance: instance,
        };
        renderer.rebuild_msaa();

        log::debug!(
            "renderer created for {target_id} ({}x{}, {format:?}, {sample_count}x MSAA, {alpha_mode:?})",
            buffer_size.width,
            buffer_size.height,
        );

        Ok(renderer)
    }

    /// The surface this renderer was created for. Never changes.
    pub fn bound_target(&self) -> TargetId {
        self.target_id
    }

    pub fn context_options(&self) -> ContextOptions {
        self.options
    }

    /// Encoding applied by the active render format.
    pub fn output_encoding(&self) -> OutputEncoding {
        format_encoding(self.format)
    }

    pub fn shadow_map_enabled(&self) -> bool {
        self.shadow_map.is_enabled()
    }

    /// Edge length of the shadow atlas, in texels.
    pub fn shadow_map_size(&self) -> u32 {
        self.shadow_map.size()
    }

    /// Depth view of the shadow atlas while shadow mapping is enabled.
    pub fn shadow_map_view(&self) -> Option<&wgpu::TextureView> {
        self.shadow_map.view()
    }

    pub fn shadow_map_format(&self) -> wgpu::TextureFormat {
        ShadowMap::FORMAT
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    pub fn logical_size(&self) -> LogicalSize<f64> {
        self.logical_size
    }

    /// Current drawing-buffer size in physical pixels.
    pub fn drawing_buffer_size(&self) -> PhysicalSize<u32> {
        self.buffer_size
    }

    /// Color format pipelines must target.
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn alpha_mode(&self) -> wgpu::CompositeAlphaMode {
        self.alpha_mode
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.gpu.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.gpu.queue
    }

    /// Backing texture of an off-screen target, e.g. for readback.
    pub fn offscreen_texture(&self) -> Option<&wgpu::Texture> {
        match &self.binding {
            Binding::Offscreen { color, .. } => Some(color.texture()),
            Binding::Window { .. } => None,
        }
    }

    /// Sets the logical size of the drawing surface.
    ///
    /// A zero-sized surface (e.g. a minimized window) is recorded but GPU
    /// reconfiguration is deferred until a non-zero size arrives.
    pub fn set_size(&mut self, logical: LogicalSize<f64>) {
        self.logical_size = logical;
        if logical.width <= 0.0 || logical.height <= 0.0 {
            return;
        }
        self.update_buffer_size();
    }

    /// Handles a window resize reported in physical pixels.
    pub fn resize(&mut self, physical: PhysicalSize<u32>) {
        let scale = match &self.binding {
            Binding::Window { window, .. } => window.scale_factor(),
            Binding::Offscreen { .. } => self.pixel_ratio,
        };
        self.set_size(physical.to_logical(scale));
    }

    /// Acquires the next drawing buffer and creates an encoder.
    pub fn begin_frame(&self) -> std::result::Result<RenderFrame, wgpu::SurfaceError> {
        let (surface_texture, view) = match &self.binding {
            Binding::Window { surface, .. } => {
                let surface_texture = surface.get_current_texture()?;
                let view = surface_texture.texture.create_view(&wgpu::TextureViewDescriptor {
                    format: Some(self.format),
                    ..Default::default()
                });
                (Some(surface_texture), view)
            }
            Binding::Offscreen { color, .. } => (None, color.view()),
        };

        let encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("vitrine frame encoder"),
            });

        Ok(RenderFrame {
            surface_texture,
            view,
            msaa_view: self.msaa.as_ref().map(ColorBuffer::view),
            encoder,
        })
    }

    /// Submits the recorded commands and presents window targets.
    pub fn submit(&self, frame: RenderFrame) {
        let RenderFrame {
            surface_texture,
            view,
            msaa_view,
            encoder,
        } = frame;

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        drop(view);
        drop(msaa_view);

        if let Some(surface_texture) = surface_texture {
            if let Binding::Window { window, .. } = &self.binding {
                window.pre_present_notify();
            }
            surface_texture.present();
        }
    }

    /// Converts a `SurfaceError` into a higher-level action, reconfiguring the
    /// surface when it was lost or outdated.
    pub fn handle_surface_error(&mut self, err: wgpu::SurfaceError) -> SurfaceErrorAction {
        let action = classify_surface_error(&err);
        if action == SurfaceErrorAction::Reconfigured {
            log::debug!("surface {err:?}; reconfiguring");
            self.configure_target();
        }
        action
    }

    /// Clears the drawing buffer to `color` and presents it.
    ///
    /// Without alpha support the clear is forced opaque. On surface errors the
    /// frame is dropped and the resulting action returned.
    pub fn clear(&mut self, color: wgpu::Color) -> std::result::Result<(), SurfaceErrorAction> {
        let color = if self.options.alpha {
            color
        } else {
            wgpu::Color { a: 1.0, ..color }
        };

        let mut frame = match self.begin_frame() {
            Ok(f) => f,
            Err(err) => return Err(self.handle_surface_error(err)),
        };

        // Scoped so the pass releases the encoder before submit.
        {
            let (encoder, attachment) = frame.color_pass(wgpu::LoadOp::Clear(color));
            let _rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("vitrine clear"),
                color_attachments: &[Some(attachment)],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }

        self.submit(frame);
        Ok(())
    }

    fn update_buffer_size(&mut self) {
        let size = fit_drawing_buffer(self.logical_size, self.pixel_ratio, self.max_dimension);
        if size == self.buffer_size {
            return;
        }

        log::debug!(
            "drawing buffer {}x{} -> {}x{}",
            self.buffer_size.width,
            self.buffer_size.height,
            size.width,
            size.height
        );
        self.buffer_size = size;
        self.configure_target();
        self.rebuild_msaa();
    }

    /// Pushes format and size into the bound target.
    fn configure_target(&mut self) {
        let device = &self.gpu.device;
        match &mut self.binding {
            Binding::Window {
                surface,
                config,
                supported,
                ..
            } => {
                let (format, view_formats) = surface_formats(supported, self.format);
                config.format = format;
                config.view_formats = view_formats;
                config.width = self.buffer_size.width;
                config.height = self.buffer_size.height;
                surface.configure(device, config);
            }
            Binding::Offscreen { target, color } => {
                *color = offscreen_color(device, target, self.format, self.buffer_size);
            }
        }
    }

    fn rebuild_msaa(&mut self) {
        self.msaa = (self.sample_count > 1).then(|| {
            ColorBuffer::new(
                &self.gpu.device,
                "vitrine msaa color",
                self.format,
                self.buffer_size,
                self.sample_count,
                wgpu::TextureUsages::RENDER_ATTACHMENT,
            )
        });
    }
}

impl DisplaySettings for Renderer {
    fn set_output_encoding(&mut self, encoding: OutputEncoding) {
        let format = encoded_format(self.format, encoding);
        if format == self.format {
            if format_encoding(format) != encoding {
                log::warn!("{format:?} has no {encoding:?} variant; format unchanged");
            }
            return;
        }

        log::debug!("output encoding {encoding:?}: {:?} -> {format:?}", self.format);
        self.format = format;

        let gpu = &self.gpu;
        self.sample_count = choose_sample_count(self.options.antialias, self.requested_samples, |n| {
            gpu.supports_sample_count(format, n)
        });

        self.configure_target();
        self.rebuild_msaa();
    }

    fn set_shadow_map_enabled(&mut self, enabled: bool) {
        self.shadow_map.set_enabled(&self.gpu.device, enabled);
    }

    fn set_pixel_ratio(&mut self, ratio: f64) {
        let ratio = sanitize_pixel_ratio(ratio);
        if ratio == self.pixel_ratio {
            return;
        }
        self.pixel_ratio = ratio;

        if self.logical_size.width > 0.0 && self.logical_size.height > 0.0 {
            self.update_buffer_size();
        }
    }
}

fn offscreen_color(
    device: &wgpu::Device,
    target: &OffscreenTarget,
    format: wgpu::TextureFormat,
    size: PhysicalSize<u32>,
) -> ColorBuffer {
    ColorBuffer::new(
        device,
        target.label.as_deref().unwrap_or("vitrine offscreen color"),
        format,
        size,
        1,
        wgpu::TextureUsages::RENDER_ATTACHMENT
            | wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_SRC,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{apply_display_config, DisplayConfig, FixedDensity};

    /// Off-screen renderer, or `None` when the host has no usable adapter.
    fn headless(width: u32, height: u32) -> Option<Renderer> {
        let target = DrawTarget::from(OffscreenTarget::new(width, height));
        match pollster::block_on(Renderer::new(target, &RendererInit::default())) {
            Ok(renderer) => Some(renderer),
            Err(err) => {
                eprintln!("skipping: no GPU context ({err:#})");
                None
            }
        }
    }

    // ── creation ──────────────────────────────────────────────────────────

    #[test]
    fn zero_sized_target_is_rejected() {
        let target = DrawTarget::from(OffscreenTarget::new(0, 10));
        let err = pollster::block_on(Renderer::new(target, &RendererInit::default()))
            .err()
            .unwrap();
        assert!(err.to_string().contains("zero size"));
    }

    #[test]
    fn created_renderer_reports_its_target() {
        let target = OffscreenTarget::new(64, 32);
        let id = target.id();
        let Ok(renderer) = pollster::block_on(Renderer::new(target.into(), &RendererInit::default()))
        else {
            return;
        };

        assert_eq!(renderer.bound_target(), id);
        assert_eq!(renderer.drawing_buffer_size(), PhysicalSize::new(64, 32));
        assert_eq!(renderer.output_encoding(), OutputEncoding::Srgb);
        assert_eq!(renderer.format(), wgpu::TextureFormat::Rgba8UnormSrgb);
        assert!(!renderer.shadow_map_enabled());
        assert!(renderer.context_options().alpha);
    }

    // ── display settings ──────────────────────────────────────────────────

    #[test]
    fn shadow_atlas_follows_enabled_flag() {
        let Some(mut r) = headless(16, 16) else { return };

        r.set_shadow_map_enabled(true);
        assert!(r.shadow_map_enabled());
        assert!(r.shadow_map_view().is_some());

        r.set_shadow_map_enabled(false);
        assert!(!r.shadow_map_enabled());
        assert!(r.shadow_map_view().is_none());
    }

    #[test]
    fn encoding_switches_render_format() {
        let Some(mut r) = headless(16, 16) else { return };

        r.set_output_encoding(OutputEncoding::Linear);
        assert_eq!(r.format(), wgpu::TextureFormat::Rgba8Unorm);
        assert_eq!(r.output_encoding(), OutputEncoding::Linear);

        r.set_output_encoding(OutputEncoding::Srgb);
        assert_eq!(r.format(), wgpu::TextureFormat::Rgba8UnormSrgb);
        assert_eq!(r.output_encoding(), OutputEncoding::Srgb);
    }

    #[test]
    fn pixel_ratio_scales_drawing_buffer() {
        let Some(mut r) = headless(64, 32) else { return };

        r.set_pixel_ratio(2.0);
        assert_eq!(r.pixel_ratio(), 2.0);
        assert_eq!(r.drawing_buffer_size(), PhysicalSize::new(128, 64));
        let texture = r.offscreen_texture().unwrap();
        assert_eq!((texture.width(), texture.height()), (128, 64));
    }

    #[test]
    fn unchanged_settings_leave_buffers_alone() {
        let Some(mut r) = headless(64, 32) else { return };
        apply_display_config(&mut r, &DisplayConfig::default(), &FixedDensity(1.5));
        let (format, size) = (r.format(), r.drawing_buffer_size());

        apply_display_config(&mut r, &DisplayConfig::default(), &FixedDensity(1.5));
        assert_eq!(r.format(), format);
        assert_eq!(r.drawing_buffer_size(), size);
        assert!(r.shadow_map_enabled());
    }

    #[test]
    fn oversized_buffer_is_clamped_to_device_limit() {
        let Some(mut r) = headless(6000, 10) else { return };
        let max = r.device().limits().max_texture_dimension_2d;

        r.set_pixel_ratio(2.0);
        let size = r.drawing_buffer_size();
        assert_eq!(size.width, 12000.min(max));
        assert_eq!(size.height, 20);

        let texture = r.offscreen_texture().unwrap();
        assert!(texture.width() <= max);
    }

    #[test]
    fn resize_keeps_binding() {
        let Some(mut r) = headless(64, 32) else { return };
        let id = r.bound_target();

        r.set_size(LogicalSize::new(100.0, 50.0));
        assert_eq!(r.drawing_buffer_size(), PhysicalSize::new(100, 50));

        // Zero size is recorded but the buffer is kept.
        r.set_size(LogicalSize::new(0.0, 50.0));
        assert_eq!(r.drawing_buffer_size(), PhysicalSize::new(100, 50));
        assert_eq!(r.bound_target(), id);
    }

    // ── frames ────────────────────────────────────────────────────────────

    #[test]
    fn clear_succeeds_on_offscreen_target() {
        let Some(mut r) = headless(8, 8) else { return };
        apply_display_config(&mut r, &DisplayConfig::default(), &FixedDensity(2.0));
        assert_eq!(r.clear(wgpu::Color::BLACK), Ok(()));
    }
}
