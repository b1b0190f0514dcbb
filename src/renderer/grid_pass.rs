use anyhow::{Context, Result};
use wgpu::util::DeviceExt;

use super::DEPTH_FORMAT;
use crate::ecs::GridHelper;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GridVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl GridVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GridVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Line-list vertices for a square grid on the XZ plane centred at the origin. The two lines
/// through the centre use `center_color`.
pub fn grid_vertices(grid: &GridHelper) -> Vec<GridVertex> {
    let divisions = grid.divisions.max(1);
    let center = divisions / 2;
    let step = grid.size / divisions as f32;
    let half = grid.size / 2.0;
    let mut vertices = Vec::with_capacity((divisions as usize + 1) * 4);
    for i in 0..=divisions {
        let k = -half + i as f32 * step;
        let color = if i == center { grid.center_color } else { grid.line_color }.to_array();
        vertices.push(GridVertex { position: [-half, 0.0, k], color });
        vertices.push(GridVertex { position: [half, 0.0, k], color });
        vertices.push(GridVertex { position: [k, 0.0, -half], color });
        vertices.push(GridVertex { position: [k, 0.0, half], color });
    }
    vertices
}

#[derive(Default)]
pub(super) struct GridPass {
    pipeline: Option<wgpu::RenderPipeline>,
    vertex_buffer: Option<wgpu::Buffer>,
    vertex_count: u32,
    current: Option<GridHelper>,
}

impl GridPass {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn init_pipeline(
        &mut self,
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        frame_bgl: &wgpu::BindGroupLayout,
    ) {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Grid Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../assets/shaders/grid.wgsl").into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Grid Pipeline Layout"),
            bind_group_layouts: &[frame_bgl],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Grid Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[GridVertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState { topology: wgpu::PrimitiveTopology::LineList, ..Default::default() },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });
        self.pipeline = Some(pipeline);
    }

    /// Rebuilds the line buffer when the grid helper changed or was removed.
    pub fn sync(&mut self, device: &wgpu::Device, grid: Option<GridHelper>) {
        if self.current == grid {
            return;
        }
        self.current = grid;
        match grid {
            Some(grid) => {
                let vertices = grid_vertices(&grid);
                self.vertex_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Grid VB"),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                }));
                self.vertex_count = vertices.len() as u32;
            }
            None => {
                self.vertex_buffer = None;
                self.vertex_count = 0;
            }
        }
    }

    pub fn encode_pass(&self, pass: &mut wgpu::RenderPass<'_>, frame_bg: &wgpu::BindGroup) -> Result<()> {
        let Some(vertex_buffer) = self.vertex_buffer.as_ref() else {
            return Ok(());
        };
        pass.set_pipeline(self.pipeline.as_ref().context("Grid pipeline missing")?);
        pass.set_bind_group(0, frame_bg, &[]);
        pass.set_vertex_buffer(0, vertex_buffer.slice(..));
        pass.draw(0..self.vertex_count, 0..1);
        Ok(())
    }
}
