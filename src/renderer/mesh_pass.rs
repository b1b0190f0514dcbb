use std::ops::Range;

use anyhow::{Context, Result};

use super::DEPTH_FORMAT;
use crate::ecs::MeshInstance;
use crate::mesh::MeshVertex;
use crate::mesh_registry::MeshRegistry;
use crate::shape::ShapeKind;

const INITIAL_INSTANCE_CAPACITY: usize = 256;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshInstanceRaw {
    pub model: [[f32; 4]; 4],
    pub base_color: [f32; 4],
}

impl MeshInstanceRaw {
    const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x4,
    ];

    pub fn from_instance(instance: &MeshInstance) -> Self {
        Self { model: instance.model.to_cols_array_2d(), base_color: instance.base_color.extend(1.0).to_array() }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshInstanceRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Contiguous run of instances sharing one shape's geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshBatch {
    pub shape: ShapeKind,
    pub instances: Range<u32>,
}

/// Orders instances by shape so each shape is one instanced draw.
pub fn batch_instances(instances: &[MeshInstance]) -> (Vec<MeshInstanceRaw>, Vec<MeshBatch>) {
    let mut sorted: Vec<&MeshInstance> = instances.iter().collect();
    sorted.sort_by_key(|instance| instance.shape);

    let mut raw = Vec::with_capacity(sorted.len());
    let mut batches: Vec<MeshBatch> = Vec::new();
    for instance in sorted {
        let index = raw.len() as u32;
        raw.push(MeshInstanceRaw::from_instance(instance));
        match batches.last_mut() {
            Some(batch) if batch.shape == instance.shape => batch.instances.end = index + 1,
            _ => batches.push(MeshBatch { shape: instance.shape, instances: index..index + 1 }),
        }
    }
    (raw, batches)
}

#[derive(Default)]
pub(super) struct MeshPass {
    pipeline: Option<wgpu::RenderPipeline>,
    instance_buffer: Option<wgpu::Buffer>,
    instance_capacity: usize,
}

impl MeshPass {
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
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../assets/shaders/mesh.wgsl").into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[frame_bgl],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Mesh Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[MeshVertex::layout(), MeshInstanceRaw::layout()],
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
            // Flat shapes are seen from both sides; the shader flips back-face normals.
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });
        self.pipeline = Some(pipeline);
    }

    pub fn upload_instances(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        instances: &[MeshInstanceRaw],
    ) -> Result<()> {
        if instances.is_empty() {
            return Ok(());
        }
        self.ensure_instance_capacity(device, instances.len());
        let buffer = self.instance_buffer.as_ref().context("Mesh instance buffer missing")?;
        queue.write_buffer(buffer, 0, bytemuck::cast_slice(instances));
        Ok(())
    }

    pub fn encode_pass(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        frame_bg: &wgpu::BindGroup,
        batches: &[MeshBatch],
        registry: &MeshRegistry,
    ) -> Result<()> {
        if batches.is_empty() {
            return Ok(());
        }
        pass.set_pipeline(self.pipeline.as_ref().context("Mesh pipeline missing")?);
        pass.set_bind_group(0, frame_bg, &[]);
        let instance_buffer = self.instance_buffer.as_ref().context("Mesh instance buffer missing")?;
        pass.set_vertex_buffer(1, instance_buffer.slice(..));
        for batch in batches {
            let Some(gpu) = registry.gpu_mesh(batch.shape) else {
                log::warn!("[renderer] no uploaded geometry for {}", batch.shape);
                continue;
            };
            pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
            pass.set_index_buffer(gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..gpu.index_count, 0, batch.instances.clone());
        }
        Ok(())
    }

    fn ensure_instance_capacity(&mut self, device: &wgpu::Device, count: usize) {
        let required = count.max(1);
        if self.instance_capacity >= required && self.instance_buffer.is_some() {
            return;
        }
        let mut new_cap = self.instance_capacity.max(INITIAL_INSTANCE_CAPACITY);
        while new_cap < required {
            new_cap *= 2;
        }
        self.instance_buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Mesh Instance Buffer"),
            size: (new_cap * std::mem::size_of::<MeshInstanceRaw>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.instance_capacity = new_cap;
    }
}
