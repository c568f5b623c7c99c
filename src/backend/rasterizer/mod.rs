//! wgpu rasterizer backend

mod shader;

pub use shader::SCENE_SHADER;

use crate::backend::traits::*;
use crate::backend::types::*;
use crate::math::Matrix4x4;
use crate::scene::{FrameSnapshot, MatrixConvention, RasterTransforms};
use crate::staging::{DrawRange, GpuMaterial, StagedScene};
use bytemuck::{Pod, Zeroable};
use std::sync::Arc;
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
/// Requested MSAA sample count; lowered to what the adapter supports
const MSAA_SAMPLES: u32 = 8;

/// Per-frame uniform block, column-major as WGSL expects
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct FrameUniforms {
    mvp: [f32; 16],
    model_view: [f32; 16],
    normal_matrix: [f32; 16],
}

impl Default for FrameUniforms {
    fn default() -> Self {
        let identity = Matrix4x4::IDENTITY.to_cols_array();
        Self {
            mvp: identity,
            model_view: identity,
            normal_matrix: identity,
        }
    }
}

impl MatrixSink for FrameUniforms {
    fn upload_matrix(
        &mut self,
        name: &str,
        data: &[f32; 16],
        transpose: bool,
    ) -> BackendResult<()> {
        let target = match name {
            RasterTransforms::MVP => &mut self.mvp,
            RasterTransforms::MODEL_VIEW => &mut self.model_view,
            RasterTransforms::NORMAL_MATRIX => &mut self.normal_matrix,
            _ => return Err(BackendError::UnknownUniform(name.to_string())),
        };
        *target = if transpose {
            Matrix4x4::from_rows_array(*data).to_cols_array()
        } else {
            *data
        };
        Ok(())
    }
}

/// GPU copy of a staged scene
struct GpuScene {
    handle: SceneHandle,
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
    scene_bind_group: wgpu::BindGroup,
    texture_bind_groups: Vec<wgpu::BindGroup>,
    draw_ranges: Vec<DrawRange>,
    material_textures: Vec<u32>,
    // Kept alive for the bind groups
    _material_buffer: wgpu::Buffer,
    _textures: Vec<wgpu::Texture>,
}

/// Rasterizes the staged scene into a window surface
pub struct Rasterizer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_config: wgpu::SurfaceConfiguration,
    sample_count: u32,
    // None when rendering single-sampled straight into the surface
    msaa_view: Option<wgpu::TextureView>,
    depth_view: wgpu::TextureView,
    pipeline: wgpu::RenderPipeline,
    scene_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    uniform_buffer: wgpu::Buffer,
    uniforms: FrameUniforms,
    clear_color: wgpu::Color,
    scene: Option<GpuScene>,
    next_scene_id: u64,
}

impl Rasterizer {
    pub fn new(window: Arc<winit::window::Window>, vsync: bool) -> BackendResult<Self> {
        pollster::block_on(Self::new_async(window, vsync))
    }

    pub async fn new_async(window: Arc<winit::window::Window>, vsync: bool) -> BackendResult<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            flags: instance_flags(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| BackendError::SurfaceCreationFailed(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| BackendError::InitializationFailed("No suitable adapter found".into()))?;

        let adapter_info = adapter.get_info();
        log::info!(
            "Selected GPU: {} ({:?} backend)",
            adapter_info.name,
            adapter_info.backend
        );

        // Needed for sample counts beyond the guaranteed 4x
        let required_features =
            adapter.features() & wgpu::Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Rasterizer Device"),
                    required_features,
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await
            .map_err(|e| BackendError::DeviceCreationFailed(e.to_string()))?;
        device.on_uncaptured_error(Box::new(|error| {
            log::error!("wgpu: {}", error);
        }));

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| {
                BackendError::SurfaceCreationFailed("Surface reports no formats".into())
            })?;

        let present_mode = if vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let (width, height) = clamp_to_limits(&device, size.width, size.height);
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let format_flags = |format: wgpu::TextureFormat| {
            if required_features.is_empty() {
                format.guaranteed_format_features(device.features()).flags
            } else {
                adapter.get_texture_format_features(format).flags
            }
        };
        let sample_count = pick_sample_count(MSAA_SAMPLES, |count| {
            format_flags(surface_format).sample_count_supported(count)
                && format_flags(DEPTH_FORMAT).sample_count_supported(count)
        });
        log::info!(
            "Surface configured: {}x{} {:?}, {:?}, {}x MSAA",
            width,
            height,
            surface_format,
            present_mode,
            sample_count
        );

        let scene_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Texture Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            }],
        });

        let pipeline = create_pipeline(
            &device,
            surface_format,
            sample_count,
            &scene_layout,
            &texture_layout,
        );

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Diffuse Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let uniforms = FrameUniforms::default();
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame Uniforms"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let msaa_view = create_msaa_view(&device, surface_format, width, height, sample_count);
        let depth_view = create_depth_view(&device, width, height, sample_count);

        Ok(Self {
            surface,
            device,
            queue,
            surface_config,
            sample_count,
            msaa_view,
            depth_view,
            pipeline,
            scene_layout,
            texture_layout,
            sampler,
            uniform_buffer,
            uniforms,
            clear_color: wgpu::Color {
                r: 0.2,
                g: 0.3,
                b: 0.3,
                a: 1.0,
            },
            scene: None,
            next_scene_id: 1,
        })
    }

    pub fn set_clear_color(&mut self, rgba: [f32; 4]) {
        self.clear_color = wgpu::Color {
            r: rgba[0] as f64,
            g: rgba[1] as f64,
            b: rgba[2] as f64,
            a: rgba[3] as f64,
        };
    }

    pub fn surface_size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    fn upload_texture(&self, data: &crate::resources::TextureData) -> wgpu::Texture {
        let size = wgpu::Extent3d {
            width: data.width.max(1),
            height: data.height.max(1),
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(data.name.as_str()),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: convert_texture_format(data.format),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &data.data,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(data.format.bytes_per_pixel() * size.width),
                rows_per_image: Some(size.height),
            },
            size,
        );
        texture
    }
}

impl RenderBackend for Rasterizer {
    fn name(&self) -> &'static str {
        "wgpu rasterizer"
    }

    fn stage(&mut self, staged: &StagedScene) -> BackendResult<SceneHandle> {
        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Scene Vertices"),
                contents: staged.vertex_bytes(),
                usage: wgpu::BufferUsages::VERTEX,
            });

        // A storage binding cannot be empty
        let fallback = [GpuMaterial::zeroed()];
        let material_bytes = if staged.materials.is_empty() {
            bytemuck::cast_slice(&fallback)
        } else {
            staged.material_bytes()
        };
        let material_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Scene Materials"),
                contents: material_bytes,
                usage: wgpu::BufferUsages::STORAGE,
            });

        let scene_bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: &self.scene_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: material_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let textures: Vec<wgpu::Texture> = staged
            .textures
            .iter()
            .map(|data| self.upload_texture(data))
            .collect();
        let texture_bind_groups = textures
            .iter()
            .map(|texture| {
                let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
                self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("Texture Bind Group"),
                    layout: &self.texture_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&view),
                    }],
                })
            })
            .collect();

        let handle = SceneHandle(self.next_scene_id);
        self.next_scene_id += 1;

        log::info!(
            "Rasterizer staged {} vertices, {} draw ranges, {} textures",
            staged.vertex_count(),
            staged.draw_ranges.len(),
            textures.len()
        );

        self.scene = Some(GpuScene {
            handle,
            vertex_buffer,
            vertex_count: staged.vertex_count(),
            scene_bind_group,
            texture_bind_groups,
            draw_ranges: staged.draw_ranges.clone(),
            material_textures: staged.materials.iter().map(|m| m.texture_index).collect(),
            _material_buffer: material_buffer,
            _textures: textures,
        });
        Ok(handle)
    }

    fn resize(&mut self, width: u32, height: u32) -> BackendResult<(u32, u32)> {
        if width == 0 || height == 0 {
            return Ok(self.surface_size());
        }
        let (width, height) = clamp_to_limits(&self.device, width, height);
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
        self.msaa_view = create_msaa_view(
            &self.device,
            self.surface_config.format,
            width,
            height,
            self.sample_count,
        );
        self.depth_view = create_depth_view(&self.device, width, height, self.sample_count);
        log::debug!("Rasterizer resized to {}x{}", width, height);
        Ok((width, height))
    }

    fn render_frame(&mut self, frame: &FrameSnapshot) -> BackendResult<FrameOutput> {
        let scene = self.scene.as_ref().ok_or(BackendError::NotStaged)?;

        frame
            .raster_zero_to_one()
            .upload(&mut self.uniforms, MatrixConvention::ColumnMajor)?;
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms));

        let output = self.surface.get_current_texture().map_err(|e| match e {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => BackendError::SurfaceLost,
            wgpu::SurfaceError::OutOfMemory => BackendError::OutOfMemory,
            _ => BackendError::AcquireImageFailed(e.to_string()),
        })?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        let (target, resolve_target) = match &self.msaa_view {
            Some(msaa_view) => (msaa_view, Some(&view)),
            None => (&view, None),
        };

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if scene.vertex_count > 0 {
                pass.set_pipeline(&self.pipeline);
                pass.set_bind_group(0, &scene.scene_bind_group, &[]);
                pass.set_vertex_buffer(0, scene.vertex_buffer.slice(..));

                for range in &scene.draw_ranges {
                    let slot = scene
                        .material_textures
                        .get(range.material_index as usize)
                        .copied()
                        .unwrap_or(StagedScene::FALLBACK_TEXTURE);
                    let Some(textures) = scene.texture_bind_groups.get(slot as usize) else {
                        continue;
                    };
                    pass.set_bind_group(1, textures, &[]);
                    pass.draw(range.vertices(), 0..1);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        log::trace!(
            "Frame {} presented (scene {:?})",
            frame.frame_index(),
            scene.handle
        );
        Ok(FrameOutput::Presented)
    }
}

fn clamp_to_limits(device: &wgpu::Device, width: u32, height: u32) -> (u32, u32) {
    let max_size = device.limits().max_texture_dimension_2d;
    if width > max_size || height > max_size {
        let scale = (max_size as f32 / width as f32).min(max_size as f32 / height as f32);
        (
            ((width as f32 * scale) as u32).max(1),
            ((height as f32 * scale) as u32).max(1),
        )
    } else {
        (width.max(1), height.max(1))
    }
}

/// Validation and debug labels in debug builds; uncaptured errors are logged
fn instance_flags() -> wgpu::InstanceFlags {
    let mut flags = wgpu::InstanceFlags::empty();
    if cfg!(debug_assertions) {
        flags |= wgpu::InstanceFlags::VALIDATION;
        flags |= wgpu::InstanceFlags::DEBUG;
    }
    flags
}

/// Highest sample count up to `preferred` that `supported` accepts, else 1
fn pick_sample_count(preferred: u32, supported: impl Fn(u32) -> bool) -> u32 {
    [16, 8, 4, 2]
        .into_iter()
        .filter(|&count| count <= preferred)
        .find(|&count| supported(count))
        .unwrap_or(1)
}

fn create_msaa_view(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
    sample_count: u32,
) -> Option<wgpu::TextureView> {
    if sample_count <= 1 {
        return None;
    }
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("MSAA Color Target"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    Some(texture.create_view(&wgpu::TextureViewDescriptor::default()))
}

fn create_depth_view(
    device: &wgpu::Device,
    width: u32,
    height: u32,
    sample_count: u32,
) -> wgpu::TextureView {
    device
        .create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Buffer"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
        .create_view(&wgpu::TextureViewDescriptor::default())
}

fn create_pipeline(
    device: &wgpu::Device,
    surface_format: wgpu::TextureFormat,
    sample_count: u32,
    scene_layout: &wgpu::BindGroupLayout,
    texture_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Scene Shader"),
        source: wgpu::ShaderSource::Wgsl(SCENE_SHADER.into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Scene Pipeline Layout"),
        bind_group_layouts: &[scene_layout, texture_layout],
        push_constant_ranges: &[],
    });

    let layout = crate::staging::StagedVertex::layout();
    let attributes: Vec<wgpu::VertexAttribute> = layout
        .attributes
        .iter()
        .map(|a| wgpu::VertexAttribute {
            format: convert_vertex_format(a.format),
            offset: a.offset,
            shader_location: a.location,
        })
        .collect();
    let vertex_buffer = wgpu::VertexBufferLayout {
        array_stride: layout.array_stride,
        step_mode: match layout.step_mode {
            VertexStepMode::Vertex => wgpu::VertexStepMode::Vertex,
            VertexStepMode::Instance => wgpu::VertexStepMode::Instance,
        },
        attributes: &attributes,
    };

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Scene Pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: "vs_main",
            buffers: &[vertex_buffer],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // OBJ files do not guarantee consistent winding
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: sample_count,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}

fn convert_texture_format(format: TextureFormat) -> wgpu::TextureFormat {
    match format {
        TextureFormat::Rgba8Unorm => wgpu::TextureFormat::Rgba8Unorm,
        TextureFormat::Rgba8UnormSrgb => wgpu::TextureFormat::Rgba8UnormSrgb,
    }
}

fn convert_vertex_format(format: VertexFormat) -> wgpu::VertexFormat {
    match format {
        VertexFormat::Float32 => wgpu::VertexFormat::Float32,
        VertexFormat::Float32x2 => wgpu::VertexFormat::Float32x2,
        VertexFormat::Float32x3 => wgpu::VertexFormat::Float32x3,
        VertexFormat::Float32x4 => wgpu::VertexFormat::Float32x4,
        VertexFormat::Uint32 => wgpu::VertexFormat::Uint32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vector3;

    #[test]
    fn uniform_sink_transposes_for_wgsl() {
        let m = Matrix4x4::from_translation(Vector3::new(1.0, 2.0, 3.0));
        let mut uniforms = FrameUniforms::default();
        uniforms.upload_matrix("mvp", m.data(), true).unwrap();
        // Column-major: translation lives in the last four floats
        assert_eq!(&uniforms.mvp[12..15], &[1.0, 2.0, 3.0]);
        assert_eq!(uniforms.model_view, Matrix4x4::IDENTITY.to_cols_array());
    }

    #[test]
    fn unknown_uniform_is_rejected() {
        let mut uniforms = FrameUniforms::default();
        let result = uniforms.upload_matrix("projection", Matrix4x4::IDENTITY.data(), true);
        assert!(matches!(result, Err(BackendError::UnknownUniform(_))));
    }

    #[test]
    fn sample_count_falls_back_to_supported() {
        assert_eq!(pick_sample_count(MSAA_SAMPLES, |_| true), 8);
        assert_eq!(pick_sample_count(MSAA_SAMPLES, |n| n == 1 || n == 4), 4);
        assert_eq!(pick_sample_count(MSAA_SAMPLES, |n| n == 1), 1);
        assert_eq!(pick_sample_count(1, |_| true), 1);
    }

    #[test]
    fn debug_builds_enable_validation() {
        let flags = instance_flags();
        assert_eq!(
            flags.contains(wgpu::InstanceFlags::VALIDATION | wgpu::InstanceFlags::DEBUG),
            cfg!(debug_assertions)
        );
    }

    #[test]
    fn shader_declares_every_vertex_location() {
        for attribute in crate::staging::StagedVertex::layout().attributes {
            let needle = format!("@location({})", attribute.location);
            assert!(SCENE_SHADER.contains(&needle), "missing {needle}");
        }
    }
}
