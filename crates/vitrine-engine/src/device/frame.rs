/// Represents a single acquired frame.
///
/// This object is short-lived and must be submitted promptly. Holding a window
/// surface texture prevents acquisition of subsequent frames.
pub struct RenderFrame {
    /// Present for window targets; presented on submit.
    pub(crate) surface_texture: Option<wgpu::SurfaceTexture>,

    /// Single-sampled view of the drawing buffer.
    pub view: wgpu::TextureView,

    /// Multisampled color view, when antialiasing is active.
    pub msaa_view: Option<wgpu::TextureView>,

    pub encoder: wgpu::CommandEncoder,
}

impl RenderFrame {
    /// Encoder plus a color attachment targeting this frame, resolving MSAA
    /// when present.
    pub fn color_pass(
        &mut self,
        load: wgpu::LoadOp<wgpu::Color>,
    ) -> (&mut wgpu::CommandEncoder, wgpu::RenderPassColorAttachment<'_>) {
        let (view, resolve_target) = match &self.msaa_view {
            Some(msaa) => (msaa, Some(&self.view)),
            None => (&self.view, None),
        };

        let attachment = wgpu::RenderPassColorAttachment {
            view,
            resolve_target,
            ops: wgpu::Operations {
                load,
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        };

        (&mut self.encoder, attachment)
    }
}
