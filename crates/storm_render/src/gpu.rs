//! wgpu hardware back end
//!
//! One texture per image. Every sprite becomes an instance of a shared quad
//! and the vertex shader applies its rotation, so rotating costs nothing on
//! the CPU. Consecutive sprites that share a texture are drawn with a single
//! instanced call; draw order is still population order. The overlay label
//! is re-uploaded every frame and drawn last, in the top-left corner.

use crate::raster::rotate_rgba;
use crate::text::{OverlayFont, OVERLAY_BACKGROUND, OVERLAY_PX, OVERLAY_TEXT};
use glam::Vec2;
use image::RgbaImage;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use storm_core::{ImageHandle, Renderer, RendererError};
use tracing::{info, warn};
use wgpu::util::DeviceExt;
use winit::window::Window;

const INITIAL_INSTANCE_CAPACITY: usize = 1024;
const TITLE_REFRESH: Duration = Duration::from_millis(250);
const CLEAR_COLOR: wgpu::Color = wgpu::Color::BLACK;

// ============================================================================
// GPU data layouts
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct SpriteInstance {
    center: [f32; 2],
    size: [f32; 2],
    angle: f32,
}

impl SpriteInstance {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2, 2 => Float32];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Globals {
    view_size: [f32; 2],
    _pad: [f32; 2],
}

struct GpuImage {
    // CPU copy kept only for images that may be rotated into cache variants.
    source: Option<RgbaImage>,
    width: u32,
    height: u32,
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

/// A run of consecutive instances drawn with the same texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Batch {
    image: ImageHandle,
    count: u32,
}

/// Extend the last run when it uses `image`, otherwise start a new one.
fn push_batched(batches: &mut Vec<Batch>, image: ImageHandle) {
    match batches.last_mut() {
        Some(batch) if batch.image == image => batch.count += 1,
        _ => batches.push(Batch { image, count: 1 }),
    }
}

/// Startup options for the hardware back end.
#[derive(Debug, Clone)]
pub struct GpuSettings {
    pub backends: wgpu::Backends,
    pub vsync: bool,
    /// Size of the simulation space mapped onto the whole surface.
    pub view_size: Vec2,
    pub title: String,
}

// ============================================================================
// Renderer
// ============================================================================

pub struct GpuRenderer {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    globals_bind_group: wgpu::BindGroup,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    images: Vec<GpuImage>,
    instances: Vec<SpriteInstance>,
    batches: Vec<Batch>,
    adapter_label: String,
    overlay_font: OverlayFont,
    overlay_image: Option<ImageHandle>,
    title: String,
    title_refreshed: Option<Instant>,
    suspended: bool,
}

impl GpuRenderer {
    /// Create a device and surface for `window`. Blocks until the adapter
    /// and device are ready.
    pub fn new(window: Arc<Window>, settings: &GpuSettings) -> Result<Self, RendererError> {
        pollster::block_on(Self::new_async(window, settings))
    }

    async fn new_async(window: Arc<Window>, settings: &GpuSettings) -> Result<Self, RendererError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: settings.backends,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| RendererError::Surface(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| RendererError::Device(format!("no adapter for backends {:?}", settings.backends)))?;

        let adapter_info = adapter.get_info();
        let adapter_label = format!("{:?}", adapter_info.backend);
        info!(
            adapter = %adapter_info.name,
            backend = %adapter_label,
            driver = %adapter_info.driver,
            "graphics adapter selected"
        );

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Storm Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits()),
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await
            .map_err(|e| RendererError::Device(e.to_string()))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(wgpu::TextureFormat::is_srgb)
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| RendererError::Surface("surface reports no supported formats".to_string()))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: if settings.vsync {
                wgpu::PresentMode::Fifo
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Sprite Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/sprite.wgsl").into()),
        });

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globals Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Sprite Texture Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let globals = Globals {
            view_size: settings.view_size.to_array(),
            _pad: [0.0; 2],
        };
        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Globals Buffer"),
            contents: bytemuck::bytes_of(&globals),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Globals Bind Group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Sprite Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sprite Pipeline Layout"),
            bind_group_layouts: &[&globals_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Sprite Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[SpriteInstance::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        let instance_buffer = create_instance_buffer(&device, INITIAL_INSTANCE_CAPACITY);

        let renderer = Self {
            window,
            surface,
            device,
            queue,
            config,
            pipeline,
            texture_layout,
            sampler,
            globals_bind_group,
            instance_buffer,
            instance_capacity: INITIAL_INSTANCE_CAPACITY,
            images: Vec::new(),
            instances: Vec::new(),
            batches: Vec::new(),
            adapter_label,
            overlay_font: OverlayFont::embedded(OVERLAY_PX)?,
            overlay_image: None,
            title: settings.title.clone(),
            title_refreshed: None,
            suspended: size.width == 0 || size.height == 0,
        };
        renderer.window.set_title(&format!("{} ({})", renderer.title, renderer.adapter_label));
        Ok(renderer)
    }

    /// Backend wgpu ended up on (e.g. "Vulkan").
    pub fn adapter_label(&self) -> &str {
        &self.adapter_label
    }

    /// Show `text` after the title and backend name, at most every 250 ms.
    pub fn update_title(&mut self, text: &str) {
        let due = self.title_refreshed.map_or(true, |at| at.elapsed() >= TITLE_REFRESH);
        if due {
            self.window
                .set_title(&format!("{} ({}) - {}", self.title, self.adapter_label, text));
            self.title_refreshed = Some(Instant::now());
        }
    }

    /// Upload pixels as a new texture without keeping a CPU copy.
    pub fn upload_rgba(&mut self, rgba: &RgbaImage) -> ImageHandle {
        let image = self.create_image(rgba, None);
        self.push_image(image)
    }

    /// Replace the pixels of an existing texture, recreating it when the
    /// size changed.
    pub fn write_rgba(&mut self, handle: ImageHandle, rgba: &RgbaImage) -> Result<(), RendererError> {
        let current = self
            .images
            .get(handle.index())
            .ok_or(RendererError::UnknownImage(handle))?;

        if current.width == rgba.width() && current.height == rgba.height() && rgba.width() > 0 && rgba.height() > 0 {
            write_texture(&self.queue, &current.texture, rgba);
        } else {
            let replacement = self.create_image(rgba, None);
            self.images[handle.index()] = replacement;
        }
        Ok(())
    }

    fn push_image(&mut self, image: GpuImage) -> ImageHandle {
        self.images.push(image);
        ImageHandle::from_index(self.images.len() as u32 - 1)
    }

    fn create_image(&self, rgba: &RgbaImage, source: Option<RgbaImage>) -> GpuImage {
        // Textures cannot be empty; a zero-sized bitmap becomes one clear texel.
        let placeholder;
        let pixels = if rgba.width() == 0 || rgba.height() == 0 {
            placeholder = RgbaImage::new(1, 1);
            &placeholder
        } else {
            rgba
        };
        let (width, height) = pixels.dimensions();

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Sprite Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        write_texture(&self.queue, &texture, pixels);

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Sprite Texture Bind Group"),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        GpuImage {
            source,
            width,
            height,
            texture,
            bind_group,
        }
    }

    fn ensure_instance_capacity(&mut self) {
        if self.instances.len() > self.instance_capacity {
            self.instance_capacity = self.instances.len().next_power_of_two();
            self.instance_buffer = create_instance_buffer(&self.device, self.instance_capacity);
        }
    }

    fn acquire_frame(&mut self) -> Result<wgpu::SurfaceTexture, RendererError> {
        match self.surface.get_current_texture() {
            Ok(frame) => Ok(frame),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                self.surface
                    .get_current_texture()
                    .map_err(|e| RendererError::Surface(e.to_string()))
            }
            Err(e) => Err(RendererError::Surface(e.to_string())),
        }
    }
}

impl Renderer for GpuRenderer {
    fn name(&self) -> &str {
        "gpu"
    }

    fn load_image(&mut self, path: &Path) -> Result<ImageHandle, RendererError> {
        let rgba = image::open(path)
            .map_err(|e| RendererError::ImageLoad {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
            .to_rgba8();
        let image = self.create_image(&rgba, Some(rgba.clone()));
        Ok(self.push_image(image))
    }

    fn rotate_image(&mut self, image: ImageHandle, degrees: f32) -> Result<ImageHandle, RendererError> {
        let source = self
            .images
            .get(image.index())
            .and_then(|img| img.source.as_ref())
            .ok_or(RendererError::UnknownImage(image))?;
        let rotated = rotate_rgba(source, degrees);
        Ok(self.upload_rgba(&rotated))
    }

    fn image_size(&self, image: ImageHandle) -> Option<(u32, u32)> {
        self.images.get(image.index()).map(|img| (img.width, img.height))
    }

    fn begin_frame(&mut self) -> Result<(), RendererError> {
        self.instances.clear();
        self.batches.clear();
        Ok(())
    }

    fn draw_image(&mut self, image: ImageHandle, position: Vec2, angle_degrees: f32) -> Result<(), RendererError> {
        let gpu_image = self.images.get(image.index()).ok_or(RendererError::UnknownImage(image))?;
        self.instances.push(SpriteInstance {
            center: position.to_array(),
            size: [gpu_image.width as f32, gpu_image.height as f32],
            angle: angle_degrees.to_radians(),
        });

        push_batched(&mut self.batches, image);
        Ok(())
    }

    fn draw_overlay(&mut self, text: &str) -> Result<(), RendererError> {
        self.update_title(text);

        let label = self
            .overlay_font
            .render_label(text, OVERLAY_TEXT, OVERLAY_BACKGROUND);
        let handle = match self.overlay_image {
            Some(handle) => {
                self.write_rgba(handle, &label)?;
                handle
            }
            None => {
                let handle = self.upload_rgba(&label);
                self.overlay_image = Some(handle);
                handle
            }
        };
        let center = Vec2::new(label.width() as f32, label.height() as f32) * 0.5;
        self.draw_image(handle, center, 0.0)
    }

    fn present(&mut self) -> Result<(), RendererError> {
        if self.suspended {
            return Ok(());
        }

        self.ensure_instance_capacity();
        if !self.instances.is_empty() {
            self.queue
                .write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&self.instances));
        }

        let output = self.acquire_frame()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Sprite Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Sprite Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.globals_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.instance_buffer.slice(..));

            let mut first = 0u32;
            for batch in &self.batches {
                let image = self
                    .images
                    .get(batch.image.index())
                    .ok_or(RendererError::UnknownImage(batch.image))?;
                render_pass.set_bind_group(1, &image.bind_group, &[]);
                render_pass.draw(0..6, first..first + batch.count);
                first += batch.count;
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), RendererError> {
        self.suspended = width == 0 || height == 0;
        if !self.suspended {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
        Ok(())
    }
}

fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Sprite Instance Buffer"),
        size: (std::mem::size_of::<SpriteInstance>() * capacity) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn write_texture(queue: &wgpu::Queue, texture: &wgpu::Texture, rgba: &RgbaImage) {
    let (width, height) = rgba.dimensions();
    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        rgba.as_raw(),
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_layout_matches_shader() {
        // center (8) + size (8) + angle (4), no padding
        assert_eq!(std::mem::size_of::<SpriteInstance>(), 20);
        assert_eq!(SpriteInstance::ATTRIBUTES[1].offset, 8);
        assert_eq!(SpriteInstance::ATTRIBUTES[2].offset, 16);
        assert_eq!(std::mem::size_of::<Globals>(), 16);
    }

    #[test]
    fn test_batches_follow_draw_order() {
        let a = ImageHandle::from_index(0);
        let b = ImageHandle::from_index(1);
        let mut batches = Vec::new();

        for image in [a, a, b, a, a, a, b, b] {
            push_batched(&mut batches, image);
        }

        assert_eq!(
            batches,
            vec![
                Batch { image: a, count: 2 },
                Batch { image: b, count: 1 },
                Batch { image: a, count: 3 },
                Batch { image: b, count: 2 },
            ]
        );
        assert_eq!(batches.iter().map(|b| b.count).sum::<u32>(), 8);
    }
}
