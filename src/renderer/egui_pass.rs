use egui_wgpu::{Renderer as EguiRenderer, ScreenDescriptor};

/// Tessellated UI ready to be drawn over the scene.
pub struct EguiPaint<'a> {
    pub painter: &'a mut EguiRenderer,
    pub paint_jobs: &'a [egui::ClippedPrimitive],
    pub screen: &'a ScreenDescriptor,
}

/// Records the UI pass on top of `view`. Returns the command buffers egui needs submitted first.
pub fn encode(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    encoder: &mut wgpu::CommandEncoder,
    view: &wgpu::TextureView,
    paint: EguiPaint<'_>,
) -> Vec<wgpu::CommandBuffer> {
    let extra_cmd = paint.painter.update_buffers(device, queue, encoder, paint.paint_jobs, paint.screen);
    let mut pass = encoder
        .begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Egui Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations { load: wgpu::LoadOp::Load, store: wgpu::StoreOp::Store },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        })
        .forget_lifetime();
    paint.painter.render(&mut pass, paint.paint_jobs, paint.screen);
    extra_cmd
}
