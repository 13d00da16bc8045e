//! WebGPU block pipeline
//!
//! Blocks never move once revealed, so their instances are appended to one
//! preallocated buffer and only the group transform changes per frame.

use glam::Vec2;
use wgpu::util::DeviceExt;

use super::RenderError;
use super::vertex::{BlockInstance, Globals};
use crate::CanvasSize;
use crate::settings::Rgba;

/// Vertices per block quad (two triangles)
const QUAD_VERTICES: u32 = 6;

/// Block render state
pub struct BlockRenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub pipeline: wgpu::RenderPipeline,

    globals_buffer: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,

    /// Instances already uploaded
    instance_count: u32,
    /// Instances the buffer can hold
    capacity: u32,
    /// Drawn since the last present
    pending: Vec<BlockInstance>,
    overflow_logged: bool,

    globals: Globals,
    background: wgpu::Color,
    /// Canvas size in CSS pixels
    pub size: CanvasSize,
    /// Physical pixels per CSS pixel
    pixel_ratio: f64,
}

/// Convert a theme color into a clear color
fn clear_color(color: Rgba) -> wgpu::Color {
    wgpu::Color {
        r: color[0] as f64,
        g: color[1] as f64,
        b: color[2] as f64,
        a: color[3] as f64,
    }
}

/// Physical surface size for a CSS size (never zero)
fn physical_size(size: CanvasSize, pixel_ratio: f64) -> (u32, u32) {
    let w = ((size.width as f64 * pixel_ratio).round() as u32).max(1);
    let h = ((size.height as f64 * pixel_ratio).round() as u32).max(1);
    (w, h)
}

/// New physical surface size if `size` at `pixel_ratio` no longer matches
/// the configured one
fn reconfigured_size(current: (u32, u32), size: CanvasSize, pixel_ratio: f64) -> Option<(u32, u32)> {
    let target = physical_size(size, pixel_ratio);
    (target != current).then_some(target)
}

impl BlockRenderState {
    /// Create the device, configure the surface and build the pipeline.
    ///
    /// `capacity` is the most blocks that will ever be drawn.
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        size: CanvasSize,
        pixel_ratio: f64,
        capacity: u32,
        background: Rgba,
    ) -> Result<Self, RenderError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("prime-spiral-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);

        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(RenderError::UnsupportedSurface)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let (width, height) = physical_size(size, pixel_ratio);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        log::info!("Surface config: {}x{}, format {:?}", width, height, surface_format);
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("block_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let center = size.center();
        let globals = Globals {
            resolution: [size.width as f32, size.height as f32],
            pivot: center.into(),
            center: center.into(),
            scale: 1.0,
            _pad: 0.0,
        };
        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals"),
            contents: bytemuck::bytes_of(&globals),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let capacity = capacity.max(1);
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("blocks"),
            size: (std::mem::size_of::<BlockInstance>() * capacity as usize) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("block_bind_group_layout"),
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

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("block_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("block_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("block_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[BlockInstance::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            globals_buffer,
            instance_buffer,
            bind_group,
            instance_count: 0,
            capacity,
            pending: Vec::new(),
            overflow_logged: false,
            globals,
            background: clear_color(background),
            size,
            pixel_ratio,
        })
    }

    /// Blocks uploaded so far
    pub fn block_count(&self) -> u32 {
        self.instance_count
    }

    pub fn push_block(&mut self, block: BlockInstance) {
        self.pending.push(block);
    }

    pub fn set_pivot(&mut self, pivot: Vec2) {
        self.globals.pivot = pivot.into();
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.globals.scale = scale;
    }

    /// Current group transform
    pub fn globals(&self) -> &Globals {
        &self.globals
    }

    /// Track a new device pixel ratio. The surface is reconfigured right away
    /// when the physical size changes, even if the CSS size did not.
    pub fn set_pixel_ratio(&mut self, pixel_ratio: f64) {
        if !(pixel_ratio.is_finite() && pixel_ratio > 0.0) {
            return;
        }
        self.pixel_ratio = pixel_ratio;
        let current = (self.config.width, self.config.height);
        if let Some((width, height)) = reconfigured_size(current, self.size, pixel_ratio) {
            log::debug!("Pixel ratio {} -> surface {}x{}", pixel_ratio, width, height);
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    pub fn resize(&mut self, size: CanvasSize) {
        if size.is_empty() {
            return;
        }
        self.size = size;
        let (width, height) = physical_size(size, self.pixel_ratio);
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        self.globals.resolution = [size.width as f32, size.height as f32];
        self.globals.center = size.center().into();
    }

    /// Upload pending blocks and draw everything
    pub fn render(&mut self) -> Result<(), RenderError> {
        self.flush_pending();
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&self.globals));

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                // Reconfigure and draw again next frame; uploaded blocks are kept
                log::warn!("Surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface timeout, skipping frame");
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(RenderError::OutOfMemory),
            Err(e) => return Err(e.into()),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.background),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if self.instance_count > 0 {
                render_pass.set_pipeline(&self.pipeline);
                render_pass.set_bind_group(0, &self.bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.instance_buffer.slice(..));
                render_pass.draw(0..QUAD_VERTICES, 0..self.instance_count);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn flush_pending(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let room = (self.capacity - self.instance_count) as usize;
        if self.pending.len() > room && !self.overflow_logged {
            log::warn!("Block buffer full at {} blocks, dropping the rest", self.capacity);
            self.overflow_logged = true;
        }
        let take = self.pending.len().min(room);
        if take > 0 {
            let offset = (std::mem::size_of::<BlockInstance>() * self.instance_count as usize) as u64;
            self.queue.write_buffer(
                &self.instance_buffer,
                offset,
                bytemuck::cast_slice(&self.pending[..take]),
            );
            self.instance_count += take as u32;
        }
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physical_size() {
        assert_eq!(physical_size(CanvasSize::new(800, 600), 2.0), (1600, 1200));
        assert_eq!(physical_size(CanvasSize::new(0, 600), 1.0), (1, 600));
        assert_eq!(physical_size(CanvasSize::new(333, 100), 1.5), (500, 150));
    }

    #[test]
    fn test_pixel_ratio_change_alone_reconfigures() {
        let size = CanvasSize::new(800, 600);
        let configured = physical_size(size, 1.0);
        assert_eq!(reconfigured_size(configured, size, 2.0), Some((1600, 1200)));
        assert_eq!(reconfigured_size(configured, size, 1.0), None);
        assert_eq!(reconfigured_size((1600, 1200), size, 2.0), None);
    }

    #[test]
    fn test_clear_color() {
        let c = clear_color([0.0, 0.5, 1.0, 1.0]);
        assert_eq!((c.r, c.g, c.b, c.a), (0.0, 0.5, 1.0, 1.0));
    }
}
