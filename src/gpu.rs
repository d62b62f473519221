//! wgpu backend: turns recorded display lists into one instanced draw.
//!
//! Every circle and line becomes a quad. The fragment shader measures the
//! distance to the shape's core segment (a circle is a segment of length
//! zero) and blends an antialiased core with an exponential glow.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use tracing::{debug, warn};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::{
    canvas::{DisplayList, DrawCommand, SurfaceSize},
    config::Color,
    error::{Error, Result},
};

const DOT_SHADER: &str = r#"
struct Viewport {
    size: vec2<f32>,
    _pad: vec2<f32>,
};

@group(0) @binding(0) var<uniform> viewport: Viewport;

struct Instance {
    @location(0) a: vec2<f32>,
    @location(1) b: vec2<f32>,
    @location(2) color: vec4<f32>,
    @location(3) shape: vec4<f32>,
};

struct VsOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) pixel: vec2<f32>,
    @location(1) @interpolate(flat) a: vec2<f32>,
    @location(2) @interpolate(flat) b: vec2<f32>,
    @location(3) @interpolate(flat) color: vec4<f32>,
    @location(4) @interpolate(flat) shape: vec4<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) index: u32, inst: Instance) -> VsOut {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(0.0, 0.0),
        vec2<f32>(1.0, 0.0),
        vec2<f32>(0.0, 1.0),
        vec2<f32>(0.0, 1.0),
        vec2<f32>(1.0, 0.0),
        vec2<f32>(1.0, 1.0),
    );
    // radius + glow + one pixel of antialiasing
    let reach = vec2<f32>(inst.shape.x + inst.shape.y + 1.0);
    let lo = min(inst.a, inst.b) - reach;
    let hi = max(inst.a, inst.b) + reach;
    let pixel = mix(lo, hi, corners[index]);
    let ndc = vec2<f32>(
        pixel.x / viewport.size.x * 2.0 - 1.0,
        1.0 - pixel.y / viewport.size.y * 2.0,
    );

    var out: VsOut;
    out.clip = vec4<f32>(ndc, 0.0, 1.0);
    out.pixel = pixel;
    out.a = inst.a;
    out.b = inst.b;
    out.color = inst.color;
    out.shape = inst.shape;
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    let ab = in.b - in.a;
    let len2 = dot(ab, ab);
    var t = 0.0;
    if (len2 > 0.0) {
        t = clamp(dot(in.pixel - in.a, ab) / len2, 0.0, 1.0);
    }
    let d = length(in.pixel - (in.a + ab * t));
    let radius = in.shape.x;
    let glow = in.shape.y;

    let core = 1.0 - smoothstep(radius - 0.5, radius + 0.5, d);
    var halo = 0.0;
    if (glow > 0.0) {
        halo = exp(-max(d - radius, 0.0) / (glow * 0.5)) * 0.5;
    }
    let alpha = max(core, halo) * in.color.a;
    if (alpha <= 0.002) {
        discard;
    }
    return vec4<f32>(in.color.rgb, alpha);
}
"#;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DotInstance {
    pub a: [f32; 2],
    pub b: [f32; 2],
    pub color: [f32; 4],
    /// radius (or half line width), glow, unused, unused
    pub shape: [f32; 4],
}

impl DotInstance {
    const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x2,
        1 => Float32x2,
        2 => Float32x4,
        3 => Float32x4
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

impl From<&DrawCommand> for DotInstance {
    fn from(command: &DrawCommand) -> Self {
        match command {
            DrawCommand::Circle { center, radius, paint } => Self {
                a: [center.x, center.y],
                b: [center.x, center.y],
                color: paint.color.to_rgba(paint.alpha),
                shape: [*radius, paint.glow, 0.0, 0.0],
            },
            DrawCommand::Line { from, to, paint } => Self {
                a: [from.x, from.y],
                b: [to.x, to.y],
                color: paint.color.to_rgba(paint.alpha),
                shape: [paint.line_width * 0.5, paint.glow, 0.0, 0.0],
            },
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct ViewportUniform {
    size: [f32; 2],
    _pad: [f32; 2],
}

pub struct DotPipeline {
    pipeline: wgpu::RenderPipeline,
    viewport_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    instance_buffer: wgpu::Buffer,
    capacity: usize,
    instances: Vec<DotInstance>,
}

impl DotPipeline {
    const INITIAL_CAPACITY: usize = 512;

    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Dot shader"),
            source: wgpu::ShaderSource::Wgsl(DOT_SHADER.into()),
        });

        let viewport_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Dot viewport"),
            contents: bytemuck::bytes_of(&ViewportUniform { size: [1.0, 1.0], _pad: [0.0; 2] }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Dot bind group layout"),
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
            label: Some("Dot bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: viewport_buffer.as_entire_binding(),
            }],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Dot pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Dot pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[DotInstance::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let instance_buffer = Self::create_instance_buffer(device, Self::INITIAL_CAPACITY);
        Self {
            pipeline,
            viewport_buffer,
            bind_group,
            instance_buffer,
            capacity: Self::INITIAL_CAPACITY,
            instances: Vec::with_capacity(Self::INITIAL_CAPACITY),
        }
    }

    fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Dot instances"),
            size: (capacity * std::mem::size_of::<DotInstance>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Uploads the commands of every list, in order, and the viewport.
    pub fn prepare(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, lists: &[&DisplayList], viewport: SurfaceSize) {
        self.instances.clear();
        self.instances.extend(lists.iter().flat_map(|list| list.commands().iter().map(DotInstance::from)));

        if self.instances.len() > self.capacity {
            self.capacity = self.instances.len().next_power_of_two();
            self.instance_buffer = Self::create_instance_buffer(device, self.capacity);
            debug!(capacity = self.capacity, "grew dot instance buffer");
        }
        if !self.instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&self.instances));
        }
        let uniform = ViewportUniform {
            size: [viewport.width.max(1.0), viewport.height.max(1.0)],
            _pad: [0.0; 2],
        };
        queue.write_buffer(&self.viewport_buffer, 0, bytemuck::bytes_of(&uniform));
    }

    pub fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        if self.instances.is_empty() {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.instance_buffer.slice(..));
        pass.draw(0..6, 0..self.instances.len() as u32);
    }
}

/// Window surface plus the dot pipeline.
pub struct Gpu {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    dots: DotPipeline,
}

impl Gpu {
    pub fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window)
            .map_err(|e| Error::ContextUnavailable(e.to_string()))?;
        let adapter = futures::executor::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| Error::ContextUnavailable("no compatible gpu adapter".to_string()))?;
        debug!(adapter = %adapter.get_info().name, "using adapter");

        let (device, queue) = futures::executor::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Starfall device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits()),
            },
            None,
        ))
        .map_err(|e| Error::ContextUnavailable(e.to_string()))?;

        let caps = surface.get_capabilities(&adapter);
        // Colours are already sRGB encoded, like a 2d canvas expects.
        let format = caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .ok_or_else(|| Error::ContextUnavailable("surface supports no formats".to_string()))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps.alpha_modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        let dots = DotPipeline::new(&device, format);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            dots,
        })
    }

    /// Reconfigures the swapchain; zero sizes (minimised) are skipped.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Clears to `background` and draws the lists back to front. The
    /// viewport comes from the first list that has been sized.
    pub fn render(&mut self, lists: &[&DisplayList], window_viewport: SurfaceSize, background: Color) -> Result<()> {
        let viewport = viewport_for(lists, window_viewport);
        self.dots.prepare(&self.device, &self.queue, lists, viewport);

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            },
            Err(wgpu::SurfaceError::OutOfMemory) => {
                return Err(Error::ContextUnavailable("gpu out of memory".to_string()));
            },
            Err(e) => {
                warn!(error = ?e, "skipping frame");
                return Ok(());
            },
        };
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render encoder"),
        });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Particle pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: background.r as f64,
                            g: background.g as f64,
                            b: background.b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                ..Default::default()
            });
            self.dots.draw(&mut pass);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

/// Viewport in CSS pixels: the first sized list wins, otherwise the
/// window's logical size.
pub fn viewport_for(lists: &[&DisplayList], window_viewport: SurfaceSize) -> SurfaceSize {
    lists.iter().find_map(|list| list.size()).unwrap_or(window_viewport)
}
