//! Desktop host: one winit window, any number of particle fields layered on
//! it, painted through [`Gpu`].

use std::{sync::Arc, time::Instant};

use tracing::{error, info, warn};
use winit::{
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::{Window, WindowBuilder},
};

use crate::{
    canvas::{DisplayList, SurfaceSize},
    config::Color,
    error::{Error, Result},
    field::ParticleField,
    gpu::Gpu,
    renderer::{FieldRenderer, Host},
    schedule::FrameToken,
};

/// Frames are delivered through `RedrawRequested`; each host remembers the
/// one token its renderer is waiting for.
pub struct WindowHost {
    window: Arc<Window>,
    gpu_ready: bool,
    next_token: u64,
    pending: Option<FrameToken>,
    resize_subscribed: bool,
}

impl WindowHost {
    pub fn new(window: Arc<Window>, gpu_ready: bool) -> Self {
        Self {
            window,
            gpu_ready,
            next_token: 0,
            pending: None,
            resize_subscribed: false,
        }
    }

    /// Hands out the requested frame, if any, once the window redraws.
    pub fn take_due_frame(&mut self) -> Option<FrameToken> {
        self.pending.take()
    }

    pub fn wants_resize(&self) -> bool {
        self.resize_subscribed
    }
}

/// Logical size of the window plus its scale factor.
pub fn viewport_of(window: &Window) -> SurfaceSize {
    let size = window.inner_size();
    let scale = window.scale_factor() as f32;
    SurfaceSize::with_pixel_ratio(size.width as f32 / scale, size.height as f32 / scale, scale)
}

impl Host for WindowHost {
    type Canvas = DisplayList;

    fn viewport(&self) -> SurfaceSize {
        viewport_of(&self.window)
    }

    fn acquire_canvas(&mut self) -> Result<DisplayList> {
        if self.gpu_ready {
            Ok(DisplayList::new())
        } else {
            Err(Error::ContextUnavailable("gpu was not initialised".to_string()))
        }
    }

    fn request_frame(&mut self) -> FrameToken {
        let token = FrameToken(self.next_token);
        self.next_token += 1;
        self.pending = Some(token);
        self.window.request_redraw();
        token
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        if self.pending == Some(token) {
            self.pending = None;
        }
    }

    fn subscribe_resize(&mut self) {
        self.resize_subscribed = true;
    }

    fn unsubscribe_resize(&mut self) {
        self.resize_subscribed = false;
    }
}

pub struct NativeOptions {
    pub title: String,
    pub background: Color,
    /// Drawn in order, the first one at the back.
    pub fields: Vec<ParticleField>,
}

pub fn run(options: NativeOptions) -> Result<()> {
    let event_loop = EventLoop::new().map_err(|e| Error::Window(e.to_string()))?;
    let window = WindowBuilder::new()
        .with_title(&options.title)
        .build(&event_loop)
        .map_err(|e| Error::Window(e.to_string()))?;
    let window = Arc::new(window);

    let mut gpu = match Gpu::new(window.clone()) {
        Ok(gpu) => Some(gpu),
        Err(err) => {
            warn!(%err, "rendering disabled");
            None
        },
    };
    let mut renderers: Vec<FieldRenderer<WindowHost>> = options
        .fields
        .into_iter()
        .map(|field| FieldRenderer::new(WindowHost::new(window.clone(), gpu.is_some()), field))
        .collect();
    for renderer in &mut renderers {
        renderer.start();
    }
    info!(fields = renderers.len(), "window open");

    let background = options.background;
    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent { event, window_id } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    for renderer in &mut renderers {
                        renderer.stop();
                    }
                    elwt.exit();
                },
                WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                    let physical = window.inner_size();
                    if physical.width == 0 || physical.height == 0 {
                        return;
                    }
                    if let Some(gpu) = gpu.as_mut() {
                        gpu.resize(physical.width, physical.height);
                    }
                    let viewport = viewport_of(&window);
                    let now = Instant::now();
                    for renderer in &mut renderers {
                        if renderer.host().wants_resize() {
                            renderer.on_resize(viewport, now);
                        }
                    }
                },
                WindowEvent::RedrawRequested => {
                    for renderer in &mut renderers {
                        if let Some(token) = renderer.host_mut().take_due_frame() {
                            renderer.on_frame(token);
                        }
                    }
                    if let Some(gpu) = gpu.as_mut() {
                        let lists: Vec<&DisplayList> = renderers.iter().filter_map(|r| r.canvas()).collect();
                        if let Err(err) = gpu.render(&lists, viewport_of(&window), background) {
                            error!(%err, "render failed");
                            for renderer in &mut renderers {
                                renderer.stop();
                            }
                            elwt.exit();
                        }
                    }
                },
                _ => {},
            },
            Event::AboutToWait => {
                let now = Instant::now();
                for renderer in &mut renderers {
                    renderer.on_timer(now);
                }
                match renderers.iter().filter_map(|r| r.next_deadline()).min() {
                    Some(deadline) => elwt.set_control_flow(ControlFlow::WaitUntil(deadline)),
                    None => elwt.set_control_flow(ControlFlow::Wait),
                }
            },
            _ => {},
        })
        .map_err(|e| Error::Window(e.to_string()))
}
