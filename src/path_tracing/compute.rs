// src/path_tracing/compute.rs
// Compute pipeline for the path-tracing kernel: bind group layouts,
// pipeline creation and per-frame dispatch. Every resource gets its own
// binding index; the layout here is the single source of truth the WGSL
// kernel is written against.
// RELEVANT FILES:src/shaders/pt_kernel.wgsl,src/path_tracing/mod.rs,src/path_tracing/gpu_types.rs

use crate::error::{RenderError, RenderResult};

const PT_KERNEL_WGSL: &str = include_str!("../shaders/pt_kernel.wgsl");

/// Workgroup size, must match @workgroup_size in the kernel.
pub const WORKGROUP_SIZE: u32 = 8;

pub struct KernelPipeline {
    pipeline: wgpu::ComputePipeline,
    pub uniform_layout: wgpu::BindGroupLayout,
    pub scene_layout: wgpu::BindGroupLayout,
    pub output_layout: wgpu::BindGroupLayout,
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

impl KernelPipeline {
    pub fn new(device: &wgpu::Device) -> RenderResult<Self> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("pt-kernel"),
            source: wgpu::ShaderSource::Wgsl(PT_KERNEL_WGSL.into()),
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("pt-bgl-uniforms"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        // binding 0..3: spheres, triangles, bvh nodes, triangle indices;
        // binding 4: perf counters (the only writable buffer).
        let scene_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("pt-bgl-scene"),
            entries: &[
                storage_entry(0, true),
                storage_entry(1, true),
                storage_entry(2, true),
                storage_entry(3, true),
                storage_entry(4, false),
            ],
        });

        let output_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("pt-bgl-output"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::StorageTexture {
                    access: wgpu::StorageTextureAccess::WriteOnly,
                    format: wgpu::TextureFormat::Rgba16Float,
                    view_dimension: wgpu::TextureViewDimension::D2,
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pt-pipeline-layout"),
            bind_group_layouts: &[&uniform_layout, &scene_layout, &output_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("pt-compute"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: "main",
        });

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(RenderError::shader(format!("kernel pipeline: {err}")));
        }

        Ok(Self {
            pipeline,
            uniform_layout,
            scene_layout,
            output_layout,
        })
    }

    pub fn create_uniform_bind_group(
        &self,
        device: &wgpu::Device,
        uniforms: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("pt-bg-uniforms"),
            layout: &self.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms.as_entire_binding(),
            }],
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_scene_bind_group(
        &self,
        device: &wgpu::Device,
        spheres: &wgpu::Buffer,
        triangles: &wgpu::Buffer,
        nodes: &wgpu::Buffer,
        indices: &wgpu::Buffer,
        counters: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        fn entry(binding: u32, buffer: &wgpu::Buffer) -> wgpu::BindGroupEntry<'_> {
            wgpu::BindGroupEntry {
                binding,
                resource: buffer.as_entire_binding(),
            }
        }
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("pt-bg-scene"),
            layout: &self.scene_layout,
            entries: &[
                entry(0, spheres),
                entry(1, triangles),
                entry(2, nodes),
                entry(3, indices),
                entry(4, counters),
            ],
        })
    }

    pub fn create_output_bind_group(
        &self,
        device: &wgpu::Device,
        estimate_view: &wgpu::TextureView,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("pt-bg-output"),
            layout: &self.output_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(estimate_view),
            }],
        })
    }

    /// Record one compute pass covering the full image.
    pub fn record(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        uniform_bg: &wgpu::BindGroup,
        scene_bg: &wgpu::BindGroup,
        output_bg: &wgpu::BindGroup,
        width: u32,
        height: u32,
    ) {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("pt-cpass"),
            ..Default::default()
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, uniform_bg, &[]);
        pass.set_bind_group(1, scene_bg, &[]);
        pass.set_bind_group(2, output_bg, &[]);
        let gx = (width + WORKGROUP_SIZE - 1) / WORKGROUP_SIZE;
        let gy = (height + WORKGROUP_SIZE - 1) / WORKGROUP_SIZE;
        pass.dispatch_workgroups(gx, gy, 1);
    }
}
