use anyhow::{Context, Result};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::Window;

use crate::config::WindowConfig;
use crate::ecs::{GridHelper, MeshInstance, SceneGraph, SceneLighting};
use crate::mesh::Mesh;
use crate::mesh_registry::MeshRegistry;
use crate::viewport::Viewport;

mod egui_pass;
mod grid_pass;
mod mesh_pass;
mod window_surface;

pub use egui_pass::EguiPaint;
pub use grid_pass::{grid_vertices, GridVertex};
pub use mesh_pass::{batch_instances, MeshBatch, MeshInstanceRaw};
pub use window_surface::{SurfaceFrame, WindowSurface};

use grid_pass::GridPass;
use mesh_pass::MeshPass;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Uploaded vertex and index buffers for one shape.
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct FrameUniform {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    light_dir: [f32; 4],
    light_color: [f32; 4],
    ambient: [f32; 4],
}

/// Everything the GPU needs from the scene for one frame.
#[derive(Clone, Debug)]
pub struct SceneFrame {
    pub view_proj: Mat4,
    pub camera_position: Vec3,
    pub lighting: SceneLighting,
    pub background: Vec3,
    pub instances: Vec<MeshInstance>,
    pub grid: Option<GridHelper>,
}

impl SceneFrame {
    pub fn capture(graph: &SceneGraph, viewport: &Viewport) -> Self {
        let camera_position =
            graph.camera().map(|camera| camera.position).unwrap_or_else(|| viewport.controls.camera().position);
        Self {
            view_proj: viewport.view_projection(),
            camera_position,
            lighting: graph.lighting(),
            background: graph.background(),
            instances: graph.collect_mesh_instances(),
            grid: graph.grid(),
        }
    }

    fn uniform(&self) -> FrameUniform {
        FrameUniform {
            view_proj: self.view_proj.to_cols_array_2d(),
            camera_pos: self.camera_position.extend(1.0).to_array(),
            light_dir: self.lighting.light_direction.extend(0.0).to_array(),
            light_color: self.lighting.light_color.extend(1.0).to_array(),
            ambient: self.lighting.ambient.extend(1.0).to_array(),
        }
    }

    fn clear_color(&self) -> wgpu::Color {
        let [r, g, b] = self.background.to_array().map(f64::from);
        wgpu::Color { r, g, b, a: 1.0 }
    }
}

struct FrameResources {
    buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl FrameResources {
    fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame BGL"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniform Buffer"),
            size: std::mem::size_of::<FrameUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame BG"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry { binding: 0, resource: buffer.as_entire_binding() }],
        });
        Self { buffer, bind_group_layout, bind_group }
    }
}

pub struct Renderer {
    surface: WindowSurface,
    frame: Option<FrameResources>,
    mesh_pass: MeshPass,
    grid_pass: GridPass,
}

impl Renderer {
    pub fn new(window_cfg: &WindowConfig) -> Self {
        Self {
            surface: WindowSurface::new(window_cfg),
            frame: None,
            mesh_pass: MeshPass::new(),
            grid_pass: GridPass::new(),
        }
    }

    pub fn ensure_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        if self.surface.ensure_window(event_loop)? {
            self.init_pipelines()?;
        }
        Ok(())
    }

    fn init_pipelines(&mut self) -> Result<()> {
        let device = self.surface.device()?;
        let format = self.surface.surface_format()?;
        let frame = FrameResources::new(device);
        self.mesh_pass.init_pipeline(device, format, &frame.bind_group_layout);
        self.grid_pass.init_pipeline(device, format, &frame.bind_group_layout);
        self.frame = Some(frame);
        log::info!("[renderer] pipelines ready ({format:?})");
        Ok(())
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.surface.resize(new_size);
    }

    pub fn set_vsync(&mut self, enabled: bool) -> Result<()> {
        self.surface.set_vsync(enabled)
    }

    pub fn window(&self) -> Option<&Window> {
        self.surface.window()
    }

    pub fn device(&self) -> Result<&wgpu::Device> {
        self.surface.device()
    }

    pub fn queue(&self) -> Result<&wgpu::Queue> {
        self.surface.queue()
    }

    pub fn surface_format(&self) -> Result<wgpu::TextureFormat> {
        self.surface.surface_format()
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.surface.size()
    }

    pub fn create_gpu_mesh(&self, mesh: &Mesh) -> Result<GpuMesh> {
        let device = self.surface.device()?;
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh VB"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh IB"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Ok(GpuMesh { vertex_buffer, index_buffer, index_count: mesh.indices.len() as u32 })
    }

    /// Draws grid and meshes, then the UI if given, and presents. A zero-sized window skips the frame.
    pub fn render_frame(
        &mut self,
        registry: &mut MeshRegistry,
        scene: &SceneFrame,
        ui: Option<EguiPaint<'_>>,
    ) -> Result<()> {
        let size = self.surface.size();
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }
        let (raw_instances, batches) = batch_instances(&scene.instances);
        for batch in &batches {
            registry.ensure_gpu(batch.shape, self)?;
        }

        let frame = self.surface.acquire_surface_frame()?;
        let device = self.surface.device()?;
        let queue = self.surface.queue()?;
        let depth_view = self.surface.depth_view()?;
        let frame_res = self.frame.as_ref().context("Frame resources missing")?;

        queue.write_buffer(&frame_res.buffer, 0, bytemuck::bytes_of(&scene.uniform()));
        self.mesh_pass.upload_instances(device, queue, &raw_instances)?;
        self.grid_pass.sync(device, scene.grid);

        let mut encoder =
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("Scene Encoder") });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: frame.view(),
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(scene.clear_color()),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            self.grid_pass.encode_pass(&mut pass, &frame_res.bind_group)?;
            self.mesh_pass.encode_pass(&mut pass, &frame_res.bind_group, &batches, registry)?;
        }

        let mut command_buffers = match ui {
            Some(paint) => egui_pass::encode(device, queue, &mut encoder, frame.view(), paint),
            None => Vec::new(),
        };
        command_buffers.push(encoder.finish());
        queue.submit(command_buffers);
        frame.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewportConfig;
    use crate::shape::ShapeKind;
    use crate::viewport::populate_scene;

    #[test]
    fn frame_uniform_matches_shader_layout() {
        assert_eq!(std::mem::size_of::<FrameUniform>(), 128);
    }

    #[test]
    fn scene_frame_captures_meshes_and_furniture() {
        let config = ViewportConfig::default();
        let mut graph = SceneGraph::new();
        populate_scene(&mut graph, &config);
        graph.attach((
            crate::ecs::MeshId(uuid::Uuid::new_v4()),
            crate::ecs::ShapeRef(ShapeKind::Octahedron),
            crate::ecs::Transform3D::from_translation(Vec3::new(1.0, 2.0, 3.0)),
        ));
        let viewport = Viewport::new(&config, PhysicalSize::new(800, 600));
        let frame = SceneFrame::capture(&graph, &viewport);
        assert_eq!(frame.instances.len(), 1);
        assert_eq!(frame.instances[0].shape, ShapeKind::Octahedron);
        assert_eq!(frame.grid, graph.grid());
        assert_eq!(frame.camera_position, Vec3::new(0.0, 10.0, -30.0));
        assert_eq!(frame.view_proj, viewport.view_projection());
        let clear = frame.clear_color();
        assert_eq!(clear.a, 1.0);
        assert!((clear.r - graph.background().x as f64).abs() < 1e-9);
        assert_eq!(frame.uniform().light_dir[3], 0.0);
    }
}
